//! Grid-locked player motion.
//!
//! A small state machine drives the first-person camera: discrete grid
//! semantics (turn 90 degrees, step one cell, bounce off a wall) animated as
//! continuous interpolation sliced across frames. Every increment scales by
//! `dt` and every terminal tick clamps to the exact target, so the camera is
//! always grid-aligned when standing, at any frame rate.

use crate::audio::{AudioSink, SoundEffect};
use crate::camera::CameraRig;
use crate::direction::Direction;
use crate::dungeon_map::DungeonMap;
use crate::input::InputSnapshot;
use glam::{Vec2, Vec3};
use log::debug;
use std::f32::consts::FRAC_PI_2;

/// What the player is doing this frame. Exactly one state is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Standing,
    TurningLeft,
    TurningRight,
    MovingForward,
    MovingBackward,
    BumpingForward,
    BumpingBackward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turning {
    Left,
    Right,
}

/// The motion state machine. Owns the player's discrete facing and the
/// progress counters of the in-flight transition; drives the camera rig.
pub struct Mover {
    state: MotionState,
    facing: Direction,
    radians_rotated: f32,
    move_progress: f32,
    wall_bumped: bool,
}

impl Mover {
    pub fn new(facing: Direction) -> Self {
        Self {
            state: MotionState::Standing,
            facing,
            radians_rotated: 0.0,
            move_progress: 0.0,
            wall_bumped: false,
        }
    }

    /// Place the camera at the map's start cell and face the start direction.
    pub fn at_start<C: CameraRig>(map: &DungeonMap, camera: &mut C) -> Self {
        camera.set_position(map.start_position());
        camera.set_target(map.start_position() + map.start_facing().vector());
        Self::new(map.start_facing())
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_standing(&self) -> bool {
        self.state == MotionState::Standing
    }

    /// Advance the machine by one frame: sample input (only honored while
    /// standing), then continue whatever transition is in flight.
    pub fn update<C: CameraRig, A: AudioSink>(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        map: &DungeonMap,
        camera: &mut C,
        audio: &mut A,
    ) {
        self.handle_input(input, map, camera, audio);

        match self.state {
            MotionState::Standing => {}
            MotionState::TurningLeft => self.turn(dt, map.turn_speed(), Turning::Left, camera),
            MotionState::TurningRight => self.turn(dt, map.turn_speed(), Turning::Right, camera),
            MotionState::MovingForward => self.step(dt, map, self.facing, camera),
            MotionState::MovingBackward => self.step(dt, map, self.facing.reverse(), camera),
            MotionState::BumpingForward => self.bump(dt, map, self.facing, camera),
            MotionState::BumpingBackward => self.bump(dt, map, self.facing.reverse(), camera),
        }
    }

    /// Input while mid-transition is dropped on purpose: commands only latch
    /// from Standing, which debounces held keys into one action per cell.
    fn handle_input<C: CameraRig, A: AudioSink>(
        &mut self,
        input: &InputSnapshot,
        map: &DungeonMap,
        camera: &C,
        audio: &mut A,
    ) {
        if !self.is_standing() {
            return;
        }

        if input.turn_left {
            audio.play_effect(SoundEffect::Turn);
            self.state = MotionState::TurningLeft;
        } else if input.turn_right {
            audio.play_effect(SoundEffect::Turn);
            self.state = MotionState::TurningRight;
        } else if input.move_forward {
            if self.is_move_valid(map, camera, self.facing) {
                audio.play_effect(SoundEffect::Move);
                self.state = MotionState::MovingForward;
            } else {
                audio.play_effect(SoundEffect::WallBump);
                self.state = MotionState::BumpingForward;
            }
        } else if input.move_backward {
            if self.is_move_valid(map, camera, self.facing.reverse()) {
                audio.play_effect(SoundEffect::Move);
                self.state = MotionState::MovingBackward;
            } else {
                audio.play_effect(SoundEffect::WallBump);
                self.state = MotionState::BumpingBackward;
            }
        }
    }

    /// Checked once, at the Standing transition. A committed move always
    /// completes; walls are static.
    fn is_move_valid<C: CameraRig>(&self, map: &DungeonMap, camera: &C, direction: Direction) -> bool {
        let probe = camera.position() + direction.vector() * map.scaling();
        if map.is_blocked(Vec2::new(probe.x, probe.z)) {
            debug!("move {:?} blocked by wall", direction);
            return false;
        }
        true
    }

    fn turn<C: CameraRig>(&mut self, dt: f32, turn_speed: f32, turning: Turning, camera: &mut C) {
        let angle = FRAC_PI_2 * dt / turn_speed;

        if self.radians_rotated + angle >= FRAC_PI_2 {
            // Snap to the new facing so no partial rotation accumulates
            self.facing = match turning {
                Turning::Left => self.facing.left(),
                Turning::Right => self.facing.right(),
            };
            camera.set_target(camera.position() + self.facing.vector());
            self.state = MotionState::Standing;
            self.radians_rotated = 0.0;
        } else {
            let signed = match turning {
                Turning::Left => angle,
                Turning::Right => -angle,
            };
            rotate_camera(camera, signed);
            self.radians_rotated += angle;
        }
    }

    fn step<C: CameraRig>(&mut self, dt: f32, map: &DungeonMap, direction: Direction, camera: &mut C) {
        let step = map.scaling() * dt / map.move_speed();

        if self.move_progress + step >= map.scaling() {
            // Clamp so total displacement is exactly one cell
            translate_camera(camera, direction.vector() * (map.scaling() - self.move_progress));
            self.state = MotionState::Standing;
            self.move_progress = 0.0;
        } else {
            translate_camera(camera, direction.vector() * step);
            self.move_progress += step;
        }
    }

    fn bump<C: CameraRig>(&mut self, dt: f32, map: &DungeonMap, direction: Direction, camera: &mut C) {
        let distance = map.bump_distance();
        let step = distance * dt / map.bump_speed();

        if !self.wall_bumped {
            // Outbound leg, toward the wall
            if self.move_progress + step >= distance {
                translate_camera(camera, direction.vector() * (distance - self.move_progress));
                self.move_progress = 0.0;
                self.wall_bumped = true;
            } else {
                translate_camera(camera, direction.vector() * step);
                self.move_progress += step;
            }
        } else {
            // Return leg, back to the cell we never left
            if self.move_progress + step >= distance {
                translate_camera(camera, -direction.vector() * (distance - self.move_progress));
                self.state = MotionState::Standing;
                self.move_progress = 0.0;
                self.wall_bumped = false;
            } else {
                translate_camera(camera, -direction.vector() * step);
                self.move_progress += step;
            }
        }
    }
}

/// Move position and look target together.
fn translate_camera<C: CameraRig>(camera: &mut C, displacement: Vec3) {
    camera.set_position(camera.position() + displacement);
    camera.set_target(camera.target() + displacement);
}

/// Rotate the look target around the camera position by `angle` radians in
/// the XZ plane (positive is counter-clockwise, matching `Direction::left`).
fn rotate_camera<C: CameraRig>(camera: &mut C, angle: f32) {
    let position = camera.position();
    let look = camera.target() - position;
    let current = look.z.atan2(look.x);
    let next = current + angle;
    camera.set_target(position + Vec3::new(next.cos(), 0.0, next.sin()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::camera::LookAtCamera;
    use crate::input::{InputAction, InputSnapshot};

    fn test_map() -> DungeonMap {
        // 4x4, open 2x2 center, walls around it
        DungeonMap::from_json_str(
            r#"{
                "width": 4,
                "height": 4,
                "scaling": 10.0,
                "start": { "x": 1, "y": 1, "facing": "east" },
                "move_speed": 0.5,
                "turn_speed": 0.3,
                "bump_speed": 0.15,
                "bump_distance": 2.0,
                "walls": [
                    [1, 1, 1, 1],
                    [1, 0, 0, 1],
                    [1, 0, 0, 1],
                    [1, 1, 1, 1]
                ],
                "floor": [
                    [0, 0, 0, 0],
                    [0, 0, 0, 0],
                    [0, 0, 0, 0],
                    [0, 0, 0, 0]
                ],
                "ceiling": [
                    [0, 0, 0, 0],
                    [0, 0, 0, 0],
                    [0, 0, 0, 0],
                    [0, 0, 0, 0]
                ]
            }"#,
        )
        .unwrap()
    }

    fn setup() -> (DungeonMap, LookAtCamera, Mover) {
        let map = test_map();
        let mut camera = LookAtCamera::default();
        let mover = Mover::at_start(&map, &mut camera);
        (map, camera, mover)
    }

    /// Hold an action for one frame, then run idle frames until standing.
    fn run_action(
        mover: &mut Mover,
        map: &DungeonMap,
        camera: &mut LookAtCamera,
        action: InputAction,
        dt: f32,
    ) {
        let mut audio = NullAudio;
        mover.update(dt, &InputSnapshot::holding(action), map, camera, &mut audio);
        let idle = InputSnapshot::idle();
        for _ in 0..10_000 {
            if mover.is_standing() {
                return;
            }
            mover.update(dt, &idle, map, camera, &mut audio);
        }
        panic!("transition never completed");
    }

    #[test]
    fn test_starts_standing_at_map_start() {
        let (map, camera, mover) = setup();
        assert_eq!(mover.state(), MotionState::Standing);
        assert_eq!(mover.facing(), Direction::East);
        assert_eq!(camera.position(), map.start_position());
    }

    #[test]
    fn test_completed_left_turn_updates_facing() {
        let (map, mut camera, mut mover) = setup();
        run_action(&mut mover, &map, &mut camera, InputAction::TurnLeft, 1.0 / 60.0);
        assert_eq!(mover.facing(), Direction::North);
        assert_eq!(mover.state(), MotionState::Standing);
        // Look target snapped exactly to the new facing
        let look = camera.target() - camera.position();
        assert!((look - Direction::North.vector()).length() < 1e-6);
    }

    #[test]
    fn test_left_then_right_restores_facing() {
        let (map, mut camera, mut mover) = setup();
        run_action(&mut mover, &map, &mut camera, InputAction::TurnLeft, 1.0 / 60.0);
        run_action(&mut mover, &map, &mut camera, InputAction::TurnRight, 1.0 / 60.0);
        assert_eq!(mover.facing(), Direction::East);
    }

    #[test]
    fn test_move_forward_displaces_exactly_one_cell() {
        let (map, mut camera, mut mover) = setup();
        let before = camera.position();
        run_action(&mut mover, &map, &mut camera, InputAction::MoveForward, 1.0 / 60.0);
        let displacement = camera.position() - before;
        assert!((displacement.length() - map.scaling()).abs() < 1e-4);
        assert!((displacement - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_move_is_frame_rate_independent() {
        let mut finals = Vec::new();
        for dt in [1.0 / 30.0, 1.0 / 60.0, 1.0 / 144.0] {
            let (map, mut camera, mut mover) = setup();
            run_action(&mut mover, &map, &mut camera, InputAction::MoveForward, dt);
            finals.push(camera.position());
        }
        for pair in finals.windows(2) {
            assert!(
                (pair[0] - pair[1]).length() < 1e-3,
                "final positions diverge: {:?}",
                finals
            );
        }
    }

    #[test]
    fn test_many_moves_do_not_drift() {
        let (map, mut camera, mut mover) = setup();
        let start = camera.position();
        // Pace back and forth along the open corridor 50 times
        for _ in 0..50 {
            run_action(&mut mover, &map, &mut camera, InputAction::MoveForward, 1.0 / 144.0);
            run_action(&mut mover, &map, &mut camera, InputAction::MoveBackward, 1.0 / 144.0);
        }
        assert!((camera.position() - start).length() < 1e-2);
    }

    #[test]
    fn test_blocked_move_bumps_and_returns_exactly() {
        let (map, mut camera, mut mover) = setup();
        // Facing east from (1,1): cell (2,1) is open, so turn to face north
        // toward the wall at (1,0)... start facing east; reverse (west) hits
        // the wall at (0,1) immediately.
        let before = camera.position();
        let mut audio = NullAudio;
        mover.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::MoveBackward),
            &map,
            &mut camera,
            &mut audio,
        );
        assert_eq!(mover.state(), MotionState::BumpingBackward);
        let idle = InputSnapshot::idle();
        for _ in 0..10_000 {
            if mover.is_standing() {
                break;
            }
            mover.update(1.0 / 60.0, &idle, &map, &mut camera, &mut audio);
        }
        assert!(mover.is_standing());
        assert!((camera.position() - before).length() < 1e-4);
    }

    #[test]
    fn test_input_ignored_while_transitioning() {
        let (map, mut camera, mut mover) = setup();
        let mut audio = NullAudio;
        let forward = InputSnapshot::holding(InputAction::MoveForward);
        mover.update(1.0 / 60.0, &forward, &map, &mut camera, &mut audio);
        assert_eq!(mover.state(), MotionState::MovingForward);

        // A turn request mid-move must be dropped, not queued
        let turn = InputSnapshot::holding(InputAction::TurnLeft);
        mover.update(1.0 / 60.0, &turn, &map, &mut camera, &mut audio);
        assert_eq!(mover.state(), MotionState::MovingForward);
        assert_eq!(mover.facing(), Direction::East);
    }

    #[test]
    fn test_committed_move_completes() {
        // Collision is only checked at the transition; once moving, the
        // machine finishes the cell even if inputs keep arriving.
        let (map, mut camera, mut mover) = setup();
        let mut audio = NullAudio;
        let forward = InputSnapshot::holding(InputAction::MoveForward);
        let before = camera.position();
        for _ in 0..10_000 {
            mover.update(1.0 / 60.0, &forward, &map, &mut camera, &mut audio);
            if mover.is_standing() && camera.position() != before {
                break;
            }
        }
        let displacement = camera.position() - before;
        assert!((displacement.x - map.scaling()).abs() < 1e-3);
    }

    #[test]
    fn test_transition_sounds() {
        #[derive(Default)]
        struct Recorder(Vec<SoundEffect>);
        impl AudioSink for Recorder {
            fn play_effect(&mut self, effect: SoundEffect) {
                self.0.push(effect);
            }
            fn play_music(&mut self, _track: crate::audio::MusicTrack) {}
            fn stop_music(&mut self, _track: crate::audio::MusicTrack) {}
        }

        let (map, mut camera, mut mover) = setup();
        let mut audio = Recorder::default();
        mover.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::TurnLeft),
            &map,
            &mut camera,
            &mut audio,
        );
        assert_eq!(audio.0, vec![SoundEffect::Turn]);

        // Blocked backward move plays the bump cue, not the move cue
        let mut mover = Mover::new(Direction::West);
        camera.set_position(map.start_position());
        camera.set_target(map.start_position() + Direction::West.vector());
        mover.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::MoveForward),
            &map,
            &mut camera,
            &mut audio,
        );
        assert_eq!(audio.0, vec![SoundEffect::Turn, SoundEffect::WallBump]);
    }

    #[test]
    fn test_partial_turn_rotates_look_target() {
        let (map, mut camera, mut mover) = setup();
        let mut audio = NullAudio;
        // The latching frame already advances the turn by one tick
        mover.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::TurnLeft),
            &map,
            &mut camera,
            &mut audio,
        );

        let look = camera.target() - camera.position();
        let angle = look.z.atan2(look.x);
        let expected = FRAC_PI_2 * (1.0 / 60.0) / map.turn_speed();
        assert!((angle - expected).abs() < 1e-4);
        // Facing only changes when the turn completes
        assert_eq!(mover.facing(), Direction::East);
    }
}
