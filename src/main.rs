//! Headless demo: load a map, walk a scripted route, then fight one battle.
//!
//! Useful for smoke-testing the core without a renderer. Pass a map path as
//! the first argument, or run with no arguments for the built-in demo map.

use grid_crawler::audio::NullAudio;
use grid_crawler::battle::Phase;
use grid_crawler::components::{spawn_enemy_unit, spawn_player_unit, Skill};
use grid_crawler::events::GameEvent;
use grid_crawler::{
    BattleCommand, CameraRig, DungeonMap, Game, InputAction, InputSnapshot, LookAtCamera, Mode,
};
use std::path::Path;

const DEMO_MAP: &str = r#"{
    "width": 5,
    "height": 5,
    "scaling": 10.0,
    "start": { "x": 1, "y": 1, "facing": "east" },
    "walls": [
        [1, 1, 1, 1, 1],
        [1, 0, 0, 0, 1],
        [1, 0, 1, 0, 1],
        [1, 0, 0, 0, 1],
        [1, 1, 1, 1, 1]
    ],
    "floor": [
        [0, 0, 0, 0, 0],
        [0, 1, 1, 1, 0],
        [0, 1, 0, 1, 0],
        [0, 1, 1, 1, 0],
        [0, 0, 0, 0, 0]
    ],
    "ceiling": [
        [0, 0, 0, 0, 0],
        [0, 1, 1, 1, 0],
        [0, 1, 0, 1, 0],
        [0, 1, 1, 1, 0],
        [0, 0, 0, 0, 0]
    ]
}"#;

const DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let map = match std::env::args().nth(1) {
        Some(path) => DungeonMap::load(Path::new(&path))?,
        None => DungeonMap::from_json_str(DEMO_MAP)?,
    };

    let mut camera = LookAtCamera::default();
    let mut audio = NullAudio;
    let mut game = Game::new(map, &mut camera, &mut audio);

    println!("start: {}", describe(&camera));

    // Step east, turn to face south, then bump the wall twice
    let route = [
        InputAction::MoveForward,
        InputAction::TurnRight,
        InputAction::MoveForward,
        InputAction::MoveForward,
    ];
    for action in route {
        perform(&mut game, &mut camera, action);
        println!("after {:?}: {}", action, describe(&camera));
    }

    // One battle: hero and mage against a pair of slimes
    let hero = spawn_player_unit(
        game.world_mut(),
        "hero",
        7,
        4,
        24,
        vec![Skill::new("fireball", 9)],
    );
    let mage = spawn_player_unit(game.world_mut(), "mage", 4, 2, 14, vec![]);
    let slime_a = spawn_enemy_unit(game.world_mut(), "slime A", 3, 2, 10);
    let slime_b = spawn_enemy_unit(game.world_mut(), "slime B", 3, 2, 10);
    game.start_battle(&[hero, mage], &[slime_a, slime_b], &mut audio);
    println!("battle started");

    let idle = InputSnapshot::idle();
    let mut frames = 0;
    while game.mode() == Mode::Battle && frames < 10_000 {
        let choosing = game
            .battle()
            .map(|b| b.phase() == Phase::Main && b.acting_unit().is_some())
            .unwrap_or(false);
        if choosing {
            // Everyone piles onto the first slime still standing
            let target = [slime_a, slime_b].into_iter().find(|&e| {
                game.world()
                    .get::<&grid_crawler::components::Health>(e)
                    .map(|h| h.is_alive())
                    .unwrap_or(false)
            });
            if let Some(target) = target {
                game.battle_command(BattleCommand::Attack);
                game.battle_command(BattleCommand::ChooseTarget(target));
            }
        }
        game.update(DT, &idle, &mut camera, &mut audio);
        for event in game.events().drain() {
            match event {
                GameEvent::AttackHit { damage, .. } => println!("  hit for {}", damage),
                GameEvent::UnitDied { .. } => println!("  a unit fell"),
                GameEvent::RoundStarted { round } => println!("round {}", round),
                GameEvent::UnitGuarded { .. } => println!("  guard up"),
            }
        }
        frames += 1;
    }
    println!("back to the dungeon: {}", describe(&camera));

    Ok(())
}

/// Hold one action for a frame, then idle until the transition finishes.
fn perform(game: &mut Game, camera: &mut LookAtCamera, action: InputAction) {
    let mut audio = NullAudio;
    game.update(DT, &InputSnapshot::holding(action), camera, &mut audio);
    let idle = InputSnapshot::idle();
    while !game.mover().is_standing() {
        game.update(DT, &idle, camera, &mut audio);
    }
}

fn describe(camera: &LookAtCamera) -> String {
    let p = camera.position();
    format!("({:.1}, {:.1}) facing {:?}", p.x, p.z, camera.target() - p)
}
