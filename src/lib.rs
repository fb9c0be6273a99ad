//! Player-movement and turn-based combat core for a first-person,
//! grid-locked dungeon crawler.
//!
//! Two state machines do the real work: [`movement::Mover`] animates
//! discrete grid motion (turning, stepping, wall bumps) as continuous camera
//! interpolation, and [`battle::Battle`] schedules combatants by speed and
//! buffers their actions with undo. Rendering, audio output, and input
//! collection live behind the narrow seams in [`camera`], [`audio`], and
//! [`input`]; any frontend that implements them can host the core.

pub mod audio;
pub mod battle;
pub mod camera;
pub mod components;
pub mod constants;
pub mod direction;
pub mod dungeon_map;
pub mod events;
pub mod game;
pub mod input;
pub mod movement;

pub use battle::{Battle, BattleCommand, BattleOutcome, Phase};
pub use camera::{CameraRig, LookAtCamera};
pub use direction::Direction;
pub use dungeon_map::DungeonMap;
pub use game::{Game, Mode};
pub use input::{InputAction, InputSnapshot, Keybinds};
pub use movement::{MotionState, Mover};
