//! Dungeon map loading and walkability queries.
//!
//! A map is a JSON document with one object: grid dimensions, three layers of
//! integer cell codes (walls, floor, ceiling), the start cell and facing, and
//! the movement tuning for this dungeon. Everything is validated up front;
//! a `DungeonMap` that exists is internally consistent and never changes.

use crate::constants::*;
use crate::direction::Direction;
use glam::{Vec2, Vec3};
use log::info;
use serde::Deserialize;
use std::path::Path;

fn default_move_speed() -> f32 {
    DEFAULT_MOVE_SPEED
}
fn default_turn_speed() -> f32 {
    DEFAULT_TURN_SPEED
}
fn default_bump_speed() -> f32 {
    DEFAULT_BUMP_SPEED
}
fn default_bump_distance() -> f32 {
    DEFAULT_BUMP_DISTANCE
}
fn default_camera_height() -> f32 {
    DEFAULT_CAMERA_HEIGHT
}

/// Start cell in grid coordinates, plus the initial facing.
#[derive(Deserialize)]
struct StartCell {
    x: usize,
    y: usize,
    facing: Direction,
}

/// Raw map file format.
#[derive(Deserialize)]
struct MapFile {
    width: usize,
    height: usize,
    scaling: f32,
    #[serde(default = "default_camera_height")]
    camera_height: f32,
    start: StartCell,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_turn_speed")]
    turn_speed: f32,
    #[serde(default = "default_bump_speed")]
    bump_speed: f32,
    #[serde(default = "default_bump_distance")]
    bump_distance: f32,
    walls: Vec<Vec<i32>>,
    floor: Vec<Vec<i32>>,
    ceiling: Vec<Vec<i32>>,
}

/// The dungeon layout and its movement tuning. Immutable after load.
#[derive(Debug)]
pub struct DungeonMap {
    width: usize,
    height: usize,
    walls: Vec<Vec<i32>>,
    floor: Vec<Vec<i32>>,
    ceiling: Vec<Vec<i32>>,
    start_position: Vec3,
    start_facing: Direction,
    scaling: f32,
    move_speed: f32,
    turn_speed: f32,
    bump_speed: f32,
    bump_distance: f32,
}

impl DungeonMap {
    /// Load a map from a JSON file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let map = Self::from_json_str(&json)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(map)
    }

    /// Parse and validate a map from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let raw: MapFile =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse map: {}", e))?;

        if raw.width == 0 || raw.height == 0 {
            return Err(format!(
                "Map dimensions must be positive, got {}x{}",
                raw.width, raw.height
            ));
        }
        if raw.scaling <= 0.0 {
            return Err(format!("Map scaling must be positive, got {}", raw.scaling));
        }
        for (speed, name) in [
            (raw.move_speed, "move_speed"),
            (raw.turn_speed, "turn_speed"),
            (raw.bump_speed, "bump_speed"),
            (raw.bump_distance, "bump_distance"),
        ] {
            if speed <= 0.0 {
                return Err(format!("Map {} must be positive, got {}", name, speed));
            }
        }

        for (layer, name) in [
            (&raw.walls, "walls"),
            (&raw.floor, "floor"),
            (&raw.ceiling, "ceiling"),
        ] {
            if layer.len() != raw.height {
                return Err(format!(
                    "Layer {} has {} rows, expected {}",
                    name,
                    layer.len(),
                    raw.height
                ));
            }
            for (y, row) in layer.iter().enumerate() {
                if row.len() != raw.width {
                    return Err(format!(
                        "Layer {} row {} has {} cells, expected {}",
                        name,
                        y,
                        row.len(),
                        raw.width
                    ));
                }
            }
        }

        if raw.start.x >= raw.width || raw.start.y >= raw.height {
            return Err(format!(
                "Start cell ({}, {}) is outside the {}x{} grid",
                raw.start.x, raw.start.y, raw.width, raw.height
            ));
        }
        if raw.walls[raw.start.y][raw.start.x] != 0 {
            return Err(format!(
                "Start cell ({}, {}) is inside a wall",
                raw.start.x, raw.start.y
            ));
        }

        // Eye point at the center of the start cell
        let start_position = Vec3::new(
            (raw.start.x as f32 + 0.5) * raw.scaling,
            raw.camera_height,
            (raw.start.y as f32 + 0.5) * raw.scaling,
        );

        info!(
            "loaded {}x{} dungeon, start cell ({}, {}) facing {:?}",
            raw.width, raw.height, raw.start.x, raw.start.y, raw.start.facing
        );

        Ok(Self {
            width: raw.width,
            height: raw.height,
            walls: raw.walls,
            floor: raw.floor,
            ceiling: raw.ceiling,
            start_position,
            start_facing: raw.start.facing,
            scaling: raw.scaling,
            move_speed: raw.move_speed,
            turn_speed: raw.turn_speed,
            bump_speed: raw.bump_speed,
            bump_distance: raw.bump_distance,
        })
    }

    /// Whether the wall layer blocks the given world-space XZ position.
    /// Anything outside the grid counts as blocked.
    pub fn is_blocked(&self, world: Vec2) -> bool {
        let gx = (world.x / self.scaling).floor();
        let gy = (world.y / self.scaling).floor();
        if gx < 0.0 || gy < 0.0 || gx >= self.width as f32 || gy >= self.height as f32 {
            return true;
        }
        self.walls[gy as usize][gx as usize] != 0
    }

    pub fn wall_at(&self, x: i32, y: i32) -> Option<i32> {
        self.cell(&self.walls, x, y)
    }

    pub fn floor_at(&self, x: i32, y: i32) -> Option<i32> {
        self.cell(&self.floor, x, y)
    }

    pub fn ceiling_at(&self, x: i32, y: i32) -> Option<i32> {
        self.cell(&self.ceiling, x, y)
    }

    fn cell(&self, layer: &[Vec<i32>], x: i32, y: i32) -> Option<i32> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(layer[y as usize][x as usize])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// World-space eye point at the center of the start cell.
    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    pub fn start_facing(&self) -> Direction {
        self.start_facing
    }

    /// Grid-cell edge length in world units.
    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    /// Seconds to traverse one cell.
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Seconds per 90 degree turn.
    pub fn turn_speed(&self) -> f32 {
        self.turn_speed
    }

    /// Seconds per wall-bump leg.
    pub fn bump_speed(&self) -> f32 {
        self.bump_speed
    }

    /// World units travelled into the wall before bouncing back.
    pub fn bump_distance(&self) -> f32 {
        self.bump_distance
    }
}
