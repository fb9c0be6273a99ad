//! Battle-unit components.
//!
//! Combatants are hecs entities: shared stat components plus a marker for
//! which side controls them. The battle scheduler holds entity ids only.

use hecs::{Entity, World};

/// Core combat stats shared by both sides.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    /// Turn-order key; faster units act earlier each round.
    pub speed: i32,
    /// Damage dealt by a basic attack.
    pub attack: i32,
}

impl Combatant {
    pub fn new(name: &str, speed: i32, attack: i32) -> Self {
        Self {
            name: name.to_string(),
            speed,
            attack,
        }
    }
}

/// Health component
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// A named special move with its own damage.
#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub power: i32,
}

impl Skill {
    pub fn new(name: &str, power: i32) -> Self {
        Self {
            name: name.to_string(),
            power,
        }
    }
}

/// The skills a unit can pick from instead of a basic attack.
#[derive(Debug, Clone, Default)]
pub struct SkillSet {
    pub skills: Vec<Skill>,
}

/// Marker: this unit takes orders from the player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerControlled;

/// Marker: this unit picks its own actions.
#[derive(Debug, Clone, Copy)]
pub struct EnemyAi;

/// Marker: unit is guarding until the end of the round; incoming damage is
/// halved while present.
#[derive(Debug, Clone, Copy)]
pub struct Guarding;

/// Spawn a player-party unit.
pub fn spawn_player_unit(
    world: &mut World,
    name: &str,
    speed: i32,
    attack: i32,
    hp: i32,
    skills: Vec<Skill>,
) -> Entity {
    world.spawn((
        Combatant::new(name, speed, attack),
        Health::new(hp),
        SkillSet { skills },
        PlayerControlled,
    ))
}

/// Spawn an enemy unit.
pub fn spawn_enemy_unit(world: &mut World, name: &str, speed: i32, attack: i32, hp: i32) -> Entity {
    world.spawn((
        Combatant::new(name, speed, attack),
        Health::new(hp),
        SkillSet::default(),
        EnemyAi,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero_and_max() {
        let mut health = Health::new(10);
        health.damage(25);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
        health.heal(100);
        assert_eq!(health.current, 10);
        assert!(health.is_alive());
    }

    #[test]
    fn test_spawned_units_carry_their_side_marker() {
        let mut world = World::new();
        let hero = spawn_player_unit(&mut world, "hero", 5, 3, 20, vec![]);
        let slime = spawn_enemy_unit(&mut world, "slime", 2, 1, 6);

        assert!(world.get::<&PlayerControlled>(hero).is_ok());
        assert!(world.get::<&EnemyAi>(hero).is_err());
        assert!(world.get::<&EnemyAi>(slime).is_ok());
        assert_eq!(world.get::<&Combatant>(slime).unwrap().speed, 2);
    }
}
