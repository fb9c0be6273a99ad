//! Compass directions on the dungeon grid.
//!
//! The player only ever faces one of the four cardinal directions; turning
//! and stepping are defined in terms of this closed set. Vectors live in the
//! XZ plane (Y is up and never moves).

use glam::Vec3;
use serde::Deserialize;

/// One of the four cardinal facings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit vector in world space. East is +X, North is +Z.
    pub fn vector(self) -> Vec3 {
        match self {
            Direction::North => Vec3::new(0.0, 0.0, 1.0),
            Direction::South => Vec3::new(0.0, 0.0, -1.0),
            Direction::East => Vec3::new(1.0, 0.0, 0.0),
            Direction::West => Vec3::new(-1.0, 0.0, 0.0),
        }
    }

    /// Grid-cell step (dx, dy) matching `vector` under the world-to-grid mapping.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Facing after a 90 degree counter-clockwise turn.
    pub fn left(self) -> Self {
        match self {
            Direction::East => Direction::North,
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
        }
    }

    /// Facing after a 90 degree clockwise turn.
    pub fn right(self) -> Self {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    /// Opposite facing.
    pub fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[test]
    fn test_left_right_inverse() {
        for d in ALL {
            assert_eq!(d.right().left(), d);
            assert_eq!(d.left().right(), d);
        }
    }

    #[test]
    fn test_reverse_involution() {
        for d in ALL {
            assert_eq!(d.reverse().reverse(), d);
            assert_ne!(d.reverse(), d);
        }
    }

    #[test]
    fn test_vectors_are_unit_length_and_planar() {
        for d in ALL {
            let v = d.vector();
            assert!((v.length() - 1.0).abs() < 1e-6);
            assert_eq!(v.y, 0.0);
        }
    }

    #[test]
    fn test_delta_matches_vector() {
        for d in ALL {
            let v = d.vector();
            let (dx, dy) = d.delta();
            assert_eq!(dx as f32, v.x);
            assert_eq!(dy as f32, v.z);
        }
    }

    #[test]
    fn test_left_is_quarter_turn_ccw() {
        // atan2 angle must grow by pi/2 per left turn
        for d in ALL {
            let a = d.vector();
            let b = d.left().vector();
            let cross = a.x * b.z - a.z * b.x;
            assert!((cross - 1.0).abs() < 1e-6);
        }
    }
}
