//! Input bindings and the per-frame input snapshot.
//!
//! The core never subscribes to toolkit events. A frontend owns the raw key
//! state and turns it into an `InputSnapshot` once per frame; the snapshot is
//! all the movement machine ever sees.

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// The logical actions the core responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
    ExitGame,
}

/// Physical-key bindings for the logical actions. Configuration, not logic:
/// construct one, adjust fields, hand it to the frontend.
#[derive(Debug, Clone, Copy)]
pub struct Keybinds {
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub exit_game: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            turn_left: KeyCode::ArrowLeft,
            turn_right: KeyCode::ArrowRight,
            move_forward: KeyCode::ArrowUp,
            move_backward: KeyCode::ArrowDown,
            exit_game: KeyCode::Escape,
        }
    }
}

impl Keybinds {
    /// Resolve the currently held keys into a snapshot of logical actions.
    pub fn snapshot(&self, keys_down: &HashSet<KeyCode>) -> InputSnapshot {
        InputSnapshot {
            turn_left: keys_down.contains(&self.turn_left),
            turn_right: keys_down.contains(&self.turn_right),
            move_forward: keys_down.contains(&self.move_forward),
            move_backward: keys_down.contains(&self.move_backward),
            exit_game: keys_down.contains(&self.exit_game),
        }
    }
}

/// Which logical actions are held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub turn_left: bool,
    pub turn_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    pub exit_game: bool,
}

impl InputSnapshot {
    /// Snapshot with nothing held.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Snapshot with exactly one action held. Handy for scripted playback.
    pub fn holding(action: InputAction) -> Self {
        let mut snapshot = Self::default();
        match action {
            InputAction::TurnLeft => snapshot.turn_left = true,
            InputAction::TurnRight => snapshot.turn_right = true,
            InputAction::MoveForward => snapshot.move_forward = true,
            InputAction::MoveBackward => snapshot.move_backward = true,
            InputAction::ExitGame => snapshot.exit_game = true,
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_maps_held_keys() {
        let binds = Keybinds::default();
        let mut keys = HashSet::new();
        keys.insert(KeyCode::ArrowUp);
        keys.insert(KeyCode::ArrowLeft);

        let snapshot = binds.snapshot(&keys);
        assert!(snapshot.move_forward);
        assert!(snapshot.turn_left);
        assert!(!snapshot.turn_right);
        assert!(!snapshot.move_backward);
        assert!(!snapshot.exit_game);
    }

    #[test]
    fn test_rebound_key_is_honored() {
        let binds = Keybinds {
            move_forward: KeyCode::KeyW,
            ..Keybinds::default()
        };
        let mut keys = HashSet::new();
        keys.insert(KeyCode::KeyW);

        let snapshot = binds.snapshot(&keys);
        assert!(snapshot.move_forward);
        // The old default no longer triggers anything
        keys.clear();
        keys.insert(KeyCode::ArrowUp);
        assert_eq!(binds.snapshot(&keys), InputSnapshot::idle());
    }

    #[test]
    fn test_holding_sets_exactly_one_flag() {
        let snapshot = InputSnapshot::holding(InputAction::TurnRight);
        assert!(snapshot.turn_right);
        assert!(!snapshot.turn_left && !snapshot.move_forward && !snapshot.move_backward);
    }
}
