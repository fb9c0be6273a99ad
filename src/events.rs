//! Game event queue for decoupled communication with collaborators.
//!
//! Battle resolution emits events; audio, UI, and logging react to them
//! without the scheduler knowing they exist. Drained once per frame.

use hecs::Entity;

/// Events emitted during battle resolution.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// An attack or skill connected
    AttackHit {
        attacker: Entity,
        target: Entity,
        damage: i32,
    },
    /// A unit raised its guard
    UnitGuarded { unit: Entity },
    /// A unit's health reached zero
    UnitDied { unit: Entity },
    /// A new round began
    RoundStarted { round: u32 },
}

/// Simple event queue - events are pushed during update, processed at end of frame
#[derive(Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
