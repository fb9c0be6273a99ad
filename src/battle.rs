//! Turn-based battle scheduling.
//!
//! Units take turn slots in descending speed order (stable on ties). Player
//! units buffer their chosen actions; enemy actions are generated
//! automatically and slotted in ahead of the player's for the round. Once
//! a round executes, its actions resolve one per frame, FIFO, and an action
//! that has resolved can never be undone.

use crate::components::{Combatant, EnemyAi, Guarding, Health, PlayerControlled, SkillSet};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use hecs::{Entity, World};
use log::debug;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Where the battle UI currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing what the acting unit does
    Main,
    /// Browsing the acting unit's skill list
    SelectingSkill,
    /// Picking a target for the chosen attack or skill
    SelectingTarget,
    /// Resolving queued actions, one per frame
    ExecutingActions,
    /// Waiting for the player to confirm ending the turn early
    ConfirmEndTurn,
}

/// How the battle stands after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Ongoing,
    Victory,
    Defeat,
}

/// Player-facing commands, one per UI interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleCommand {
    Attack,
    OpenSkills,
    ChooseSkill(usize),
    ChooseTarget(Entity),
    Defend,
    EndTurn,
    Confirm,
    Undo,
}

/// What a queued action does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Attack { target: Entity },
    UseSkill { skill: usize, target: Entity },
    Defend,
}

/// A buffered combat intent. Consumed exactly once by `execute_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub actor: Entity,
    pub kind: ActionKind,
}

/// Heap entry for the turn order. Higher speed pops first; equal speeds pop
/// in roster order.
#[derive(Debug, Clone, Copy)]
struct QueuedUnit {
    entity: Entity,
    speed: i32,
    seq: usize,
}

impl PartialEq for QueuedUnit {
    fn eq(&self, other: &Self) -> bool {
        self.speed == other.speed && self.seq == other.seq
    }
}

impl Eq for QueuedUnit {}

impl PartialOrd for QueuedUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: fastest first, then earliest roster slot
        self.speed
            .cmp(&other.speed)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The battle scheduler: turn order, pending actions, and the phase machine
/// the UI talks to.
pub struct Battle {
    phase: Phase,
    /// All participants in insertion order (players first, then enemies).
    /// Turn-order ties and enemy action order both follow this list.
    roster: Vec<Entity>,
    turn_queue: BinaryHeap<QueuedUnit>,
    pending: VecDeque<Action>,
    /// Insertion cursor keeping auto-generated enemy actions ahead of player
    /// actions without reversing the enemies' own order.
    enemy_front: usize,
    acting_unit: Option<Entity>,
    selected_skill: Option<usize>,
    round: u32,
}

impl Battle {
    pub fn new(world: &World, players: &[Entity], enemies: &[Entity]) -> Self {
        let mut battle = Self {
            phase: Phase::Main,
            roster: players.iter().chain(enemies.iter()).copied().collect(),
            turn_queue: BinaryHeap::new(),
            pending: VecDeque::new(),
            enemy_front: 0,
            acting_unit: None,
            selected_skill: None,
            round: 1,
        };
        battle.refill_queue(world);
        battle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The player unit currently choosing an action, if any.
    pub fn acting_unit(&self) -> Option<Entity> {
        self.acting_unit
    }

    pub fn selected_skill(&self) -> Option<usize> {
        self.selected_skill
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &Action> {
        self.pending.iter()
    }

    /// Rebuild the turn order from scratch: every living roster unit, keyed
    /// by speed. Re-derived rather than patched so death and revival can
    /// never leave stale entries behind.
    pub fn refill_queue(&mut self, world: &World) {
        self.turn_queue.clear();
        for (seq, &entity) in self.roster.iter().enumerate() {
            if !is_alive(world, entity) {
                continue;
            }
            let Ok(combatant) = world.get::<&Combatant>(entity) else {
                continue;
            };
            self.turn_queue.push(QueuedUnit {
                entity,
                speed: combatant.speed,
                seq,
            });
        }
    }

    /// Append a buffered action. FIFO within the round.
    pub fn enqueue_action(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    /// Generate an attack for every living enemy that has not already
    /// queued one, inserted ahead of all player actions in roster order.
    pub fn add_enemy_actions<R: Rng>(&mut self, world: &World, rng: &mut R) {
        let enemies: Vec<Entity> = self
            .roster
            .iter()
            .copied()
            .filter(|&e| world.get::<&EnemyAi>(e).is_ok() && is_alive(world, e))
            .collect();
        for enemy in enemies {
            if self.pending.iter().any(|a| a.actor == enemy) {
                continue;
            }
            self.queue_enemy_action(world, rng, enemy);
        }
    }

    /// Advance the battle by one frame. Seats the next actor while choices
    /// are open; resolves one action per frame while executing.
    pub fn advance<R: Rng>(
        &mut self,
        world: &mut World,
        rng: &mut R,
        events: &mut EventQueue,
    ) -> BattleOutcome {
        match self.phase {
            Phase::Main => {
                if self.acting_unit.is_none() {
                    self.seat_next_actor(world, rng);
                }
            }
            // Waiting on player commands
            Phase::SelectingSkill | Phase::SelectingTarget | Phase::ConfirmEndTurn => {}
            Phase::ExecutingActions => {
                self.execute_next(world, events);
                if self.pending.is_empty() {
                    let outcome = self.outcome(world);
                    if outcome != BattleOutcome::Ongoing {
                        return outcome;
                    }
                    self.end_round(world, events);
                }
            }
        }
        self.outcome(world)
    }

    /// Apply a player command. Commands that make no sense in the current
    /// phase are dropped, matching the movement machine's input debouncing.
    pub fn command<R: Rng>(&mut self, world: &World, rng: &mut R, cmd: BattleCommand) {
        match (self.phase, cmd) {
            (Phase::Main, BattleCommand::Attack) if self.acting_unit.is_some() => {
                self.selected_skill = None;
                self.phase = Phase::SelectingTarget;
            }
            (Phase::Main, BattleCommand::OpenSkills) if self.acting_unit.is_some() => {
                self.phase = Phase::SelectingSkill;
            }
            (Phase::Main, BattleCommand::Defend) => {
                if let Some(actor) = self.acting_unit.take() {
                    self.enqueue_action(Action {
                        actor,
                        kind: ActionKind::Defend,
                    });
                }
            }
            (Phase::Main, BattleCommand::EndTurn) => {
                self.phase = Phase::ConfirmEndTurn;
            }
            (Phase::Main, BattleCommand::Undo) => {
                self.undo(world);
            }
            (Phase::SelectingSkill, BattleCommand::ChooseSkill(index)) => {
                let valid = self
                    .acting_unit
                    .and_then(|actor| world.get::<&SkillSet>(actor).ok().map(|s| index < s.skills.len()))
                    .unwrap_or(false);
                if valid {
                    self.selected_skill = Some(index);
                    self.phase = Phase::SelectingTarget;
                }
            }
            (Phase::SelectingSkill, BattleCommand::Undo) => {
                self.phase = Phase::Main;
            }
            (Phase::SelectingTarget, BattleCommand::ChooseTarget(target)) => {
                if let Some(actor) = self.acting_unit.take() {
                    let kind = match self.selected_skill.take() {
                        Some(skill) => ActionKind::UseSkill { skill, target },
                        None => ActionKind::Attack { target },
                    };
                    self.enqueue_action(Action { actor, kind });
                    self.phase = Phase::Main;
                }
            }
            (Phase::SelectingTarget, BattleCommand::Undo) => {
                // Back to choosing; the skill choice is forgotten
                self.selected_skill = None;
                self.phase = Phase::Main;
            }
            (Phase::ConfirmEndTurn, BattleCommand::Confirm) => {
                self.add_enemy_actions(world, rng);
                self.turn_queue.clear();
                self.acting_unit = None;
                self.selected_skill = None;
                self.phase = Phase::ExecutingActions;
            }
            (Phase::ConfirmEndTurn, BattleCommand::Undo) => {
                self.phase = Phase::Main;
            }
            _ => {
                debug!("ignoring {:?} during {:?}", cmd, self.phase);
            }
        }
    }

    /// Pop and resolve the head action. Empty queue is a no-op; a dead
    /// actor's action fizzles.
    pub fn execute_next(&mut self, world: &mut World, events: &mut EventQueue) {
        let Some(action) = self.pending.pop_front() else {
            return;
        };
        self.enemy_front = self.enemy_front.saturating_sub(1);

        if !is_alive(world, action.actor) {
            debug!("dropping action of dead actor {:?}", action.actor);
            return;
        }

        match action.kind {
            ActionKind::Defend => {
                let _ = world.insert_one(action.actor, Guarding);
                events.push(GameEvent::UnitGuarded {
                    unit: action.actor,
                });
            }
            ActionKind::Attack { target } => {
                let power = world
                    .get::<&Combatant>(action.actor)
                    .map(|c| c.attack)
                    .unwrap_or(0);
                self.apply_damage(world, action.actor, target, power, events);
            }
            ActionKind::UseSkill { skill, target } => {
                let power = world
                    .get::<&SkillSet>(action.actor)
                    .ok()
                    .and_then(|s| s.skills.get(skill).map(|sk| sk.power));
                let Some(power) = power else {
                    debug!("skill index {} no longer exists, action fizzles", skill);
                    return;
                };
                self.apply_damage(world, action.actor, target, power, events);
            }
        }
    }

    /// Undo, scoped by phase. Executed actions are beyond reach by
    /// construction: they have already left the pending queue.
    pub fn undo(&mut self, world: &World) {
        match self.phase {
            Phase::Main => {
                let last_player_action = self
                    .pending
                    .iter()
                    .rposition(|a| world.get::<&PlayerControlled>(a.actor).is_ok());
                let Some(index) = last_player_action else {
                    return;
                };
                let Some(action) = self.pending.remove(index) else {
                    return;
                };
                // The unit that was choosing goes back into the order; the
                // undone unit chooses again
                if let Some(current) = self.acting_unit.take() {
                    self.requeue_unit(world, current);
                }
                self.acting_unit = Some(action.actor);
                self.selected_skill = None;
            }
            Phase::SelectingSkill | Phase::SelectingTarget | Phase::ConfirmEndTurn => {
                self.selected_skill = None;
                self.phase = Phase::Main;
            }
            // Resolved actions are irreversible
            Phase::ExecutingActions => {}
        }
    }

    /// Victory once no enemy lives, defeat once no player unit does.
    pub fn outcome(&self, world: &World) -> BattleOutcome {
        let mut players_alive = false;
        let mut enemies_alive = false;
        for &entity in &self.roster {
            if !is_alive(world, entity) {
                continue;
            }
            if world.get::<&PlayerControlled>(entity).is_ok() {
                players_alive = true;
            } else {
                enemies_alive = true;
            }
        }
        if !players_alive {
            BattleOutcome::Defeat
        } else if !enemies_alive {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Ongoing
        }
    }

    fn seat_next_actor<R: Rng>(&mut self, world: &World, rng: &mut R) {
        while let Some(queued) = self.turn_queue.pop() {
            if !is_alive(world, queued.entity) {
                continue;
            }
            if world.get::<&EnemyAi>(queued.entity).is_ok() {
                // Enemies act on their slot without waiting for input
                self.queue_enemy_action(world, rng, queued.entity);
                continue;
            }
            self.acting_unit = Some(queued.entity);
            return;
        }
        // Every unit has had its slot; run the round
        self.phase = Phase::ExecutingActions;
    }

    fn queue_enemy_action<R: Rng>(&mut self, world: &World, rng: &mut R, enemy: Entity) {
        let targets: Vec<Entity> = self
            .roster
            .iter()
            .copied()
            .filter(|&e| world.get::<&PlayerControlled>(e).is_ok() && is_alive(world, e))
            .collect();
        if targets.is_empty() {
            return;
        }
        let target = targets[rng.gen_range(0..targets.len())];
        self.pending.insert(
            self.enemy_front,
            Action {
                actor: enemy,
                kind: ActionKind::Attack { target },
            },
        );
        self.enemy_front += 1;
    }

    fn apply_damage(
        &mut self,
        world: &mut World,
        attacker: Entity,
        target: Entity,
        power: i32,
        events: &mut EventQueue,
    ) {
        if !is_alive(world, target) {
            debug!("target {:?} already down, attack fizzles", target);
            return;
        }
        let guarded = world.get::<&Guarding>(target).is_ok();
        let damage = if guarded {
            (power / GUARD_DAMAGE_DIVISOR).max(MIN_DAMAGE)
        } else {
            power.max(MIN_DAMAGE)
        };

        let mut died = false;
        if let Ok(mut health) = world.get::<&mut Health>(target) {
            health.damage(damage);
            died = !health.is_alive();
        }

        events.push(GameEvent::AttackHit {
            attacker,
            target,
            damage,
        });
        if died {
            events.push(GameEvent::UnitDied { unit: target });
            // Turn order re-derives so the dead unit's slot disappears
            self.refill_queue(world);
        }
    }

    fn end_round(&mut self, world: &mut World, events: &mut EventQueue) {
        // Guard wears off at the round boundary
        let guarding: Vec<Entity> = self
            .roster
            .iter()
            .copied()
            .filter(|&e| world.get::<&Guarding>(e).is_ok())
            .collect();
        for entity in guarding {
            let _ = world.remove_one::<Guarding>(entity);
        }

        self.round += 1;
        self.enemy_front = 0;
        self.acting_unit = None;
        self.selected_skill = None;
        self.refill_queue(world);
        self.phase = Phase::Main;
        events.push(GameEvent::RoundStarted { round: self.round });
    }

    fn requeue_unit(&mut self, world: &World, entity: Entity) {
        let Some(seq) = self.roster.iter().position(|&e| e == entity) else {
            return;
        };
        let Ok(combatant) = world.get::<&Combatant>(entity) else {
            return;
        };
        self.turn_queue.push(QueuedUnit {
            entity,
            speed: combatant.speed,
            seq,
        });
    }
}

fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| h.is_alive())
        .unwrap_or(false)
}
