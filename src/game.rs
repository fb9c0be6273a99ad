//! Frame-level orchestration: one game, two mutually exclusive modes.
//!
//! Dungeon exploration and battle never run in the same frame. `Game` owns
//! the world, the map, and whichever state machine is active, and routes the
//! per-frame update to exactly one of them. Camera and audio are borrowed
//! for the duration of a call and never retained.

use crate::audio::{AudioSink, MusicTrack};
use crate::battle::{Battle, BattleCommand, BattleOutcome};
use crate::camera::CameraRig;
use crate::dungeon_map::DungeonMap;
use crate::events::EventQueue;
use crate::input::InputSnapshot;
use crate::movement::Mover;
use hecs::{Entity, World};
use log::info;

/// Which state machine owns the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dungeon,
    Battle,
}

pub struct Game {
    map: DungeonMap,
    world: World,
    mover: Mover,
    battle: Option<Battle>,
    mode: Mode,
    events: EventQueue,
    quit: bool,
}

impl Game {
    /// Start in dungeon mode at the map's start cell, with the dungeon
    /// track playing.
    pub fn new<C: CameraRig, A: AudioSink>(
        map: DungeonMap,
        camera: &mut C,
        audio: &mut A,
    ) -> Self {
        let mover = Mover::at_start(&map, camera);
        audio.play_music(MusicTrack::Dungeon);
        Self {
            map,
            world: World::new(),
            mover,
            battle: None,
            mode: Mode::Dungeon,
            events: EventQueue::new(),
            quit: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    pub fn mover(&self) -> &Mover {
        &self.mover
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Events emitted since the last drain. Collaborators consume these at
    /// the end of the frame.
    pub fn events(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Advance the active mode by `dt` seconds.
    pub fn update<C: CameraRig, A: AudioSink>(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        camera: &mut C,
        audio: &mut A,
    ) {
        if input.exit_game {
            self.quit = true;
        }

        match self.mode {
            Mode::Dungeon => {
                self.mover.update(dt, input, &self.map, camera, audio);
            }
            Mode::Battle => {
                let outcome = match &mut self.battle {
                    Some(battle) => battle.advance(
                        &mut self.world,
                        &mut rand::thread_rng(),
                        &mut self.events,
                    ),
                    None => BattleOutcome::Victory,
                };
                if outcome != BattleOutcome::Ongoing {
                    info!("battle over: {:?}", outcome);
                    self.leave_battle(audio);
                }
            }
        }
    }

    /// Switch to battle mode with the given parties. Roster order fixes
    /// turn-order tie breaking for the whole battle.
    pub fn start_battle<A: AudioSink>(
        &mut self,
        players: &[Entity],
        enemies: &[Entity],
        audio: &mut A,
    ) {
        self.battle = Some(Battle::new(&self.world, players, enemies));
        self.mode = Mode::Battle;
        audio.stop_music(MusicTrack::Dungeon);
        audio.play_music(MusicTrack::Battle);
    }

    /// Forward a UI command to the battle. Ignored in dungeon mode.
    pub fn battle_command(&mut self, cmd: BattleCommand) {
        if let Some(battle) = &mut self.battle {
            battle.command(&self.world, &mut rand::thread_rng(), cmd);
        }
    }

    fn leave_battle<A: AudioSink>(&mut self, audio: &mut A) {
        self.battle = None;
        self.mode = Mode::Dungeon;
        audio.stop_music(MusicTrack::Battle);
        audio.play_music(MusicTrack::Dungeon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, SoundEffect};
    use crate::battle::Phase;
    use crate::camera::LookAtCamera;
    use crate::components::{spawn_enemy_unit, spawn_player_unit};
    use crate::direction::Direction;
    use crate::input::{InputAction, InputSnapshot};

    fn test_map() -> DungeonMap {
        DungeonMap::from_json_str(
            r#"{
                "width": 3,
                "height": 3,
                "scaling": 10.0,
                "start": { "x": 1, "y": 1, "facing": "north" },
                "walls": [[1,1,1],[1,0,1],[1,1,1]],
                "floor": [[0,0,0],[0,0,0],[0,0,0]],
                "ceiling": [[0,0,0],[0,0,0],[0,0,0]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_starts_in_dungeon_mode_with_music() {
        #[derive(Default)]
        struct Recorder(Vec<MusicTrack>);
        impl AudioSink for Recorder {
            fn play_effect(&mut self, _effect: SoundEffect) {}
            fn play_music(&mut self, track: MusicTrack) {
                self.0.push(track);
            }
            fn stop_music(&mut self, _track: MusicTrack) {}
        }

        let mut camera = LookAtCamera::default();
        let mut audio = Recorder::default();
        let game = Game::new(test_map(), &mut camera, &mut audio);
        assert_eq!(game.mode(), Mode::Dungeon);
        assert!(!game.should_quit());
        assert_eq!(audio.0, vec![MusicTrack::Dungeon]);
        assert_eq!(game.mover().facing(), Direction::North);
    }

    #[test]
    fn test_exit_input_raises_quit_flag() {
        let mut camera = LookAtCamera::default();
        let mut audio = NullAudio;
        let mut game = Game::new(test_map(), &mut camera, &mut audio);
        game.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::ExitGame),
            &mut camera,
            &mut audio,
        );
        assert!(game.should_quit());
    }

    #[test]
    fn test_battle_mode_blocks_dungeon_movement() {
        let mut camera = LookAtCamera::default();
        let mut audio = NullAudio;
        let mut game = Game::new(test_map(), &mut camera, &mut audio);

        let hero = spawn_player_unit(game.world_mut(), "hero", 5, 3, 20, vec![]);
        let slime = spawn_enemy_unit(game.world_mut(), "slime", 2, 1, 6);
        game.start_battle(&[hero], &[slime], &mut audio);
        assert_eq!(game.mode(), Mode::Battle);

        let before = camera.position();
        game.update(
            1.0 / 60.0,
            &InputSnapshot::holding(InputAction::MoveForward),
            &mut camera,
            &mut audio,
        );
        // Movement input has no effect while the battle machine owns the frame
        assert_eq!(camera.position(), before);
        assert_eq!(game.mover().state(), crate::movement::MotionState::Standing);
    }

    #[test]
    fn test_victory_returns_to_dungeon_mode() {
        let mut camera = LookAtCamera::default();
        let mut audio = NullAudio;
        let mut game = Game::new(test_map(), &mut camera, &mut audio);

        let hero = spawn_player_unit(game.world_mut(), "hero", 5, 10, 20, vec![]);
        let slime = spawn_enemy_unit(game.world_mut(), "slime", 2, 1, 6);
        game.start_battle(&[hero], &[slime], &mut audio);

        let idle = InputSnapshot::idle();
        for _ in 0..50 {
            if game.mode() == Mode::Dungeon {
                break;
            }
            let hero_choosing = game
                .battle()
                .map(|b| b.acting_unit() == Some(hero) && b.phase() == Phase::Main)
                .unwrap_or(false);
            if hero_choosing {
                game.battle_command(BattleCommand::Attack);
                game.battle_command(BattleCommand::ChooseTarget(slime));
            }
            game.update(1.0 / 60.0, &idle, &mut camera, &mut audio);
        }
        assert_eq!(game.mode(), Mode::Dungeon);
        assert!(game.battle().is_none());
    }
}
