//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (one gameplay stream, one cosmetic stream)
//! - Explicit `dt` for every timer
//! - No rendering or platform dependencies

pub mod collision;
pub mod maze;
pub mod particles;
pub mod stage;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{circle_rect_overlap, circles_overlap, magnet_pull};
pub use maze::{Chunk, Corridor, Maze};
pub use particles::{Particle, ParticleSystem};
pub use stage::Stage;
pub use state::{
    BIOMES, Biome, Collectible, GameEvent, GameMode, GameState, Obstacle, PICKUP_COLOR,
    POWERUP_COLOR, Player, PowerUp, PowerUpKind, PowerUpTimer, RunPhase, SoundCue, Steering,
    TrailPoint, Viewport, WALL_COLOR, biome_index,
};
pub use tick::{TickInput, tick};
pub use world::World;
