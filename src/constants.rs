//! Tuning constants and map-header fallbacks.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! The movement values are only defaults; a map file can override them.

/// Seconds to traverse one grid cell (map header fallback)
pub const DEFAULT_MOVE_SPEED: f32 = 0.5;
/// Seconds to complete a 90 degree turn (map header fallback)
pub const DEFAULT_TURN_SPEED: f32 = 0.3;
/// Seconds for one leg of a wall bump (map header fallback)
pub const DEFAULT_BUMP_SPEED: f32 = 0.15;
/// World units travelled into the wall before bouncing back (map header fallback)
pub const DEFAULT_BUMP_DISTANCE: f32 = 2.0;
/// Eye height above the floor in world units (map header fallback)
pub const DEFAULT_CAMERA_HEIGHT: f32 = 5.0;

/// Incoming damage divisor while a unit is guarding
pub const GUARD_DAMAGE_DIVISOR: i32 = 2;
/// Damage floor so a resolved hit never deals zero
pub const MIN_DAMAGE: i32 = 1;
