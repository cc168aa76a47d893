//! Game state and core simulation types
//!
//! Everything a run needs to advance lives here; the stage (falling world or
//! maze) is chosen once when the state is created.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::ParticleSystem;
use super::stage::Stage;
use crate::consts::*;
use crate::{Rect, Rgb};

/// Game mode, fixed for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Falling obstacles, gentle acceleration
    #[default]
    Normal,
    /// Faster start, faster ramp, shorter spawn interval
    Hardcore,
    /// Scrolling maze, no fatal collisions
    Zen,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "NORMAL",
            GameMode::Hardcore => "HARDCORE",
            GameMode::Zen => "ZEN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "hardcore" => Some(GameMode::Hardcore),
            "zen" => Some(GameMode::Zen),
            _ => None,
        }
    }

    /// Whether touching an obstacle can end the run
    pub fn has_fatal_obstacles(&self) -> bool {
        !matches!(self, GameMode::Zen)
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting in the main menu
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended by a fatal collision
    GameOver,
}

/// Canvas dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A color theme for the falling world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biome {
    pub name: &'static str,
    pub background: Rgb,
    pub obstacle: Rgb,
    pub collectible: Rgb,
}

/// Biomes in the order they are visited
pub const BIOMES: [Biome; 3] = [
    Biome {
        name: "Neon Cyber",
        background: Rgb(0x05, 0x05, 0x05),
        obstacle: Rgb(0xff, 0x00, 0x55),
        collectible: Rgb(0x00, 0xff, 0x00),
    },
    Biome {
        name: "Sunset",
        background: Rgb(0x1a, 0x00, 0x1a),
        obstacle: Rgb(0xff, 0x99, 0x00),
        collectible: Rgb(0x00, 0xff, 0xff),
    },
    Biome {
        name: "Toxic",
        background: Rgb(0x00, 0x1a, 0x1a),
        obstacle: Rgb(0xff, 0x00, 0xff),
        collectible: Rgb(0xff, 0xff, 0x00),
    },
];

/// Biome index for a cumulative scroll distance
pub fn biome_index(distance: f32) -> usize {
    (distance.max(0.0) / BIOME_LENGTH).floor() as usize % BIOMES.len()
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Absorbs one obstacle hit
    Shield,
    /// Pulls nearby collectibles toward the player
    Magnet,
}

impl PowerUpKind {
    /// Glyph drawn on the pickup
    pub fn glyph(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "S",
            PowerUpKind::Magnet => "M",
        }
    }
}

/// A rectangular hazard (falling block or maze wall)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub color: Rgb,
}

/// A circular score pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    /// Set once when picked up, never cleared
    pub collected: bool,
}

impl Collectible {
    pub fn new(pos: Vec2, radius: f32, color: Rgb) -> Self {
        Self {
            pos,
            radius,
            color,
            collected: false,
        }
    }
}

/// Maze wall tint
pub const WALL_COLOR: Rgb = Rgb::CYAN;
/// Maze collectible tint
pub const PICKUP_COLOR: Rgb = Rgb::YELLOW;
/// Power-up tint in every mode
pub const POWERUP_COLOR: Rgb = Rgb::WHITE;

/// A circular power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
    /// Set once when picked up, never cleared
    pub collected: bool,
}

impl PowerUp {
    pub fn new(pos: Vec2, radius: f32, kind: PowerUpKind) -> Self {
        Self {
            pos,
            radius,
            kind,
            collected: false,
        }
    }
}

/// Countdown for a timed power-up. Active exactly while time remains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimer {
    remaining: f32,
}

impl PowerUpTimer {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Start (or restart) the timer; repeat pickups reset rather than stack
    pub fn activate(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// End the effect immediately
    pub fn consume(&mut self) {
        self.remaining = 0.0;
    }

    /// Count down; returns true on the tick the effect runs out
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            return true;
        }
        false
    }
}

/// Trail point for rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// How the player follows the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steering {
    /// Horizontal easing toward the pointer, fixed height
    Ease,
    /// Velocity with friction on both axes
    Drift,
}

/// The player's orb
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Where the pointer wants the player to be
    pub target: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub steering: Steering,
    pub shield: PowerUpTimer,
    pub magnet: PowerUpTimer,
    /// Recent positions, oldest first
    pub trail: VecDeque<TrailPoint>,
}

impl Player {
    pub fn new(mode: GameMode, viewport: Viewport) -> Self {
        let (pos, steering) = match mode {
            GameMode::Zen => (viewport.center(), Steering::Drift),
            GameMode::Normal | GameMode::Hardcore => (
                Vec2::new(
                    viewport.width / 2.0,
                    viewport.height - PLAYER_BOTTOM_OFFSET,
                ),
                Steering::Ease,
            ),
        };
        Self {
            pos,
            target: pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            steering,
            shield: PowerUpTimer::default(),
            magnet: PowerUpTimer::default(),
            trail: VecDeque::with_capacity(PLAYER_TRAIL_LENGTH + 1),
        }
    }

    pub fn shield_active(&self) -> bool {
        self.shield.is_active()
    }

    pub fn magnet_active(&self) -> bool {
        self.magnet.is_active()
    }

    /// Point the player at a pointer position. Easing only follows x.
    pub fn set_target(&mut self, pointer: Vec2) {
        match self.steering {
            Steering::Ease => self.target.x = pointer.x,
            Steering::Drift => self.target = pointer,
        }
    }

    /// Activate a power-up effect
    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Shield => self.shield.activate(POWERUP_DURATION),
            PowerUpKind::Magnet => self.magnet.activate(POWERUP_DURATION),
        }
    }

    /// Integrate position, clamp to the canvas, and count down power-ups
    pub fn update(&mut self, dt: f32, viewport: Viewport) {
        match self.steering {
            Steering::Ease => {
                self.pos.x += (self.target.x - self.pos.x) * PLAYER_EASE * dt;
            }
            Steering::Drift => {
                let frames = dt * FRAME_RATE;
                self.vel += (self.target - self.pos) * PLAYER_EASE * dt;
                self.vel *= PLAYER_FRICTION.powf(frames);
                self.pos += self.vel * frames;
            }
        }
        self.clamp_to(viewport);

        if self.shield.tick(dt) {
            log::debug!("Shield expired");
        }
        if self.magnet.tick(dt) {
            log::debug!("Magnet expired");
        }

        self.trail.push_back(TrailPoint {
            pos: self.pos,
            alpha: 1.0,
        });
        if self.trail.len() > PLAYER_TRAIL_LENGTH {
            self.trail.pop_front();
        }
        for point in self.trail.iter_mut() {
            point.alpha -= PLAYER_TRAIL_FADE * dt;
        }
    }

    fn clamp_to(&mut self, viewport: Viewport) {
        let (min_x, max_x) = (self.radius, viewport.width - self.radius);
        if self.pos.x < min_x {
            self.pos.x = min_x;
            self.vel.x = 0.0;
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x = 0.0;
        }

        if self.steering == Steering::Drift {
            let (min_y, max_y) = (self.radius, viewport.height - self.radius);
            if self.pos.y < min_y {
                self.pos.y = min_y;
                self.vel.y = 0.0;
            } else if self.pos.y > max_y {
                self.pos.y = max_y;
                self.vel.y = 0.0;
            }
        }
    }
}

/// Audio cues raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Collect,
    PowerUp,
    Explosion,
}

/// Events emitted during a tick, drained by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Score changed to the given total
    ScoreChanged(u32),
    /// A sound should play
    Sound(SoundCue),
    /// The player hit an obstacle without a shield
    Died { score: u32 },
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub mode: GameMode,
    pub phase: RunPhase,
    pub viewport: Viewport,
    /// Gameplay RNG (spawning and maze generation only)
    pub rng: Pcg32,
    pub player: Player,
    /// Falling world or maze, fixed at creation
    pub stage: Stage,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub score: u32,
    /// Camera shake magnitude (pixels)
    pub shake: f32,
    /// Seconds of play
    pub elapsed: f32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run in the given mode
    pub fn new(mode: GameMode, viewport: Viewport, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stage = Stage::new(mode, viewport, &mut rng);
        Self {
            seed,
            mode,
            phase: RunPhase::Playing,
            viewport,
            rng,
            player: Player::new(mode, viewport),
            stage,
            particles: ParticleSystem::new(seed),
            score: 0,
            shake: 0.0,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_up_timer_flag_tracks_remaining() {
        let mut timer = PowerUpTimer::default();
        assert!(!timer.is_active());

        timer.activate(POWERUP_DURATION);
        assert!(timer.is_active());

        // Runs out exactly once
        assert!(!timer.tick(4.9));
        assert!(timer.is_active());
        assert!(timer.tick(0.2));
        assert!(!timer.is_active());
        assert_eq!(timer.remaining(), 0.0);
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn test_power_up_pickup_resets_instead_of_stacking() {
        let mut player = Player::new(GameMode::Normal, Viewport::new(400.0, 800.0));
        player.apply_power_up(PowerUpKind::Magnet);
        player.update(3.0, Viewport::new(400.0, 800.0));
        player.apply_power_up(PowerUpKind::Magnet);
        assert!((player.magnet.remaining() - POWERUP_DURATION).abs() < 1e-6);
    }

    #[test]
    fn test_easing_moves_toward_target_and_clamps() {
        let viewport = Viewport::new(400.0, 800.0);
        let mut player = Player::new(GameMode::Normal, viewport);
        let start_y = player.pos.y;

        player.set_target(Vec2::new(300.0, 10.0));
        player.update(1.0 / 60.0, viewport);
        assert!(player.pos.x > 200.0 && player.pos.x < 300.0);
        // Easing never moves vertically
        assert_eq!(player.pos.y, start_y);

        player.set_target(Vec2::new(-500.0, 0.0));
        for _ in 0..120 {
            player.update(1.0 / 60.0, viewport);
        }
        assert_eq!(player.pos.x, player.radius);
    }

    #[test]
    fn test_drift_clamp_zeroes_velocity() {
        let viewport = Viewport::new(400.0, 800.0);
        let mut player = Player::new(GameMode::Zen, viewport);
        assert_eq!(player.pos, viewport.center());

        player.set_target(Vec2::new(200.0, 5000.0));
        for _ in 0..600 {
            player.update(1.0 / 60.0, viewport);
        }
        assert_eq!(player.pos.y, viewport.height - player.radius);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_trail_is_bounded() {
        let viewport = Viewport::new(400.0, 800.0);
        let mut player = Player::new(GameMode::Normal, viewport);
        for _ in 0..50 {
            player.update(1.0 / 60.0, viewport);
        }
        assert_eq!(player.trail.len(), PLAYER_TRAIL_LENGTH);
    }

    #[test]
    fn test_biome_cycles_with_distance() {
        assert_eq!(biome_index(0.0), 0);
        assert_eq!(biome_index(4999.0), 0);
        assert_eq!(biome_index(5000.0), 1);
        assert_eq!(biome_index(12_000.0), 2);
        assert_eq!(biome_index(15_000.0), 0);
    }
}
