//! The playfield of a run: falling world or scrolling maze
//!
//! Picked once from the game mode so the rest of the simulation never has to
//! branch on the mode to find entities.

use rand_pcg::Pcg32;

use super::maze::Maze;
use super::state::{BIOMES, Biome, Collectible, GameMode, Obstacle, PowerUp, Viewport};
use super::world::World;

#[derive(Debug, Clone)]
pub enum Stage {
    World(World),
    Maze(Maze),
}

impl Stage {
    pub fn new(mode: GameMode, viewport: Viewport, rng: &mut Pcg32) -> Self {
        match mode {
            GameMode::Zen => Stage::Maze(Maze::new(viewport, rng)),
            GameMode::Normal | GameMode::Hardcore => Stage::World(World::new(mode, viewport)),
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        match self {
            Stage::World(world) => world.update(dt, rng),
            Stage::Maze(maze) => maze.update(dt, rng),
        }
    }

    pub fn collectibles(&self) -> &[Collectible] {
        match self {
            Stage::World(world) => &world.collectibles,
            Stage::Maze(maze) => &maze.collectibles,
        }
    }

    pub fn collectibles_mut(&mut self) -> &mut [Collectible] {
        match self {
            Stage::World(world) => &mut world.collectibles,
            Stage::Maze(maze) => &mut maze.collectibles,
        }
    }

    pub fn powerups(&self) -> &[PowerUp] {
        match self {
            Stage::World(world) => &world.powerups,
            Stage::Maze(maze) => &maze.powerups,
        }
    }

    pub fn powerups_mut(&mut self) -> &mut [PowerUp] {
        match self {
            Stage::World(world) => &mut world.powerups,
            Stage::Maze(maze) => &mut maze.powerups,
        }
    }

    /// Rectangles the player can hit: falling blocks or maze walls
    pub fn obstacles(&self) -> &[Obstacle] {
        match self {
            Stage::World(world) => &world.obstacles,
            Stage::Maze(maze) => &maze.walls,
        }
    }

    /// Drop a falling obstacle from the live list. Maze walls are fixed
    /// geometry and are never removed.
    pub fn remove_obstacle(&mut self, index: usize) -> Option<Obstacle> {
        match self {
            Stage::World(world) if index < world.obstacles.len() => {
                Some(world.obstacles.remove(index))
            }
            _ => None,
        }
    }

    /// Cumulative scroll distance
    pub fn distance(&self) -> f32 {
        match self {
            Stage::World(world) => world.distance,
            Stage::Maze(maze) => maze.distance,
        }
    }

    /// Active color theme
    pub fn biome(&self) -> &'static Biome {
        match self {
            Stage::World(world) => world.biome(),
            Stage::Maze(_) => &BIOMES[0],
        }
    }

    pub fn as_world(&self) -> Option<&World> {
        match self {
            Stage::World(world) => Some(world),
            Stage::Maze(_) => None,
        }
    }

    pub fn as_maze(&self) -> Option<&Maze> {
        match self {
            Stage::Maze(maze) => Some(maze),
            Stage::World(_) => None,
        }
    }
}
