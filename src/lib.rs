//! Neon Drift - A falling-object dodge/collect arcade game
//!
//! Core modules:
//! - `sim`: Simulation (spawning, maze generation, collisions, run state)
//! - `engine`: Frame loop and run state machine driving the simulation
//! - `renderer`: Canvas drawing of the current state
//! - `audio`: Procedural Web Audio cues and music
//! - `platform`: Input source abstraction
//! - `settings`: Player preferences

pub mod audio;
pub mod engine;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{AudioSink, Engine, GameOverNotice, RunPhase, ScoreSink};
pub use settings::Settings;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    /// Distance of the player above the bottom edge in the falling modes
    pub const PLAYER_BOTTOM_OFFSET: f32 = 150.0;
    /// Easing gain toward the pointer target (per second)
    pub const PLAYER_EASE: f32 = 15.0;
    /// Per-frame velocity retention for the drifting (maze) controller
    pub const PLAYER_FRICTION: f32 = 0.9;
    /// Reference frame rate for per-frame constants
    pub const FRAME_RATE: f32 = 60.0;
    /// Positions kept in the player trail
    pub const PLAYER_TRAIL_LENGTH: usize = 10;
    /// Alpha lost per second by player trail points
    pub const PLAYER_TRAIL_FADE: f32 = 5.0;

    /// Power-ups
    pub const POWERUP_DURATION: f32 = 5.0;
    pub const MAGNET_RANGE: f32 = 150.0;
    pub const MAGNET_PULL_SPEED: f32 = 500.0;

    /// Scoring and feedback
    pub const COLLECT_POINTS: u32 = 10;
    pub const SHAKE_COLLECT: f32 = 5.0;
    pub const SHAKE_SHIELD_BREAK: f32 = 10.0;
    pub const SHAKE_DEATH: f32 = 20.0;
    /// Shake lost per second
    pub const SHAKE_DECAY: f32 = 30.0;
    /// Delay between the fatal hit and the game-over notification (ms)
    pub const GAME_OVER_DELAY_MS: f64 = 500.0;

    /// Falling world
    pub const NORMAL_START_SPEED: f32 = 300.0;
    pub const HARDCORE_START_SPEED: f32 = 500.0;
    pub const NORMAL_ACCEL: f32 = 10.0;
    pub const HARDCORE_ACCEL: f32 = 20.0;
    pub const NORMAL_SPAWN_INTERVAL: f32 = 0.8;
    pub const HARDCORE_SPAWN_INTERVAL: f32 = 0.5;
    /// Speed at which the difficulty multiplier is exactly 1
    pub const BASELINE_SPEED: f32 = 300.0;
    pub const SPAWN_Y: f32 = -50.0;
    pub const SPAWN_MARGIN: f32 = 30.0;
    /// Entities are pruned this far below the bottom edge
    pub const PRUNE_MARGIN: f32 = 100.0;
    pub const POWERUP_CHANCE: f32 = 0.05;
    pub const OBSTACLE_CHANCE: f32 = 0.40;
    pub const OBSTACLE_MIN_WIDTH: f32 = 60.0;
    pub const OBSTACLE_MAX_WIDTH: f32 = 100.0;
    pub const OBSTACLE_HEIGHT: f32 = 20.0;
    pub const COLLECTIBLE_RADIUS: f32 = 10.0;
    pub const POWERUP_RADIUS: f32 = 15.0;
    /// Scroll distance covered by one biome
    pub const BIOME_LENGTH: f32 = 5000.0;

    /// Maze
    pub const MAZE_CELL: f32 = 50.0;
    pub const MAZE_CHUNK_ROWS: usize = 10;
    pub const MAZE_INITIAL_CHUNKS: u64 = 3;
    pub const MAZE_SCROLL_SPEED: f32 = 100.0;
    pub const MAZE_CORRIDOR_FRACTION: f32 = 0.6;
    pub const MAZE_MIN_CORRIDOR: usize = 3;
    pub const MAZE_BLOCK_CHANCE: f32 = 0.1;
    pub const MAZE_COLLECTIBLES_PER_CHUNK: usize = 5;
    pub const MAZE_MAGNET_CHANCE: f64 = 0.6;
    pub const MAZE_COLLECTIBLE_RADIUS: f32 = 8.0;
    pub const MAZE_POWERUP_RADIUS: f32 = 12.0;
    pub const MAZE_TRAIL_LENGTH: usize = 15;

    /// Particles
    pub const MAX_PARTICLES: usize = 512;
    pub const PARTICLE_DECAY: f32 = 2.0;
    pub const BURST_COLLECT: usize = 15;
    pub const BURST_POWERUP: usize = 20;
    pub const BURST_SHIELD: usize = 30;
    pub const BURST_DEATH: usize = 50;
}

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const CYAN: Rgb = Rgb(0x00, 0xff, 0xff);
    pub const YELLOW: Rgb = Rgb(0xff, 0xff, 0x00);
    pub const RED: Rgb = Rgb(0xff, 0x00, 0x00);

    /// CSS `rgba()` string with the given alpha
    pub fn css(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.0, self.1, self.2, alpha.clamp(0.0, 1.0))
    }
}

/// An axis-aligned rectangle stored by center and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Rectangle anchored at its top-left corner
    pub fn from_corner(min: Vec2, size: Vec2) -> Self {
        Self {
            center: min + size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }

    /// Point inside (or on the border of) the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}
