//! Scrolling maze for Zen mode
//!
//! The corridor is built from chunks of 10 rows of 50 px cells. Chunks are
//! generated below the viewport as the maze scrolls up and dropped once they
//! have scrolled a full screen above it.
//!
//! Entities live in flat screen-space lists. Chunks are appended in index
//! order and evicted from the front, so each chunk owns a contiguous run at
//! the start of every list once older chunks are gone.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    Collectible, Obstacle, PICKUP_COLOR, PowerUp, PowerUpKind, TrailPoint, Viewport, WALL_COLOR,
};
use crate::consts::*;
use crate::Rect;

/// Bookkeeping for one generated slice of corridor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    /// Monotonic, never reused
    pub index: u64,
    /// Top edge in maze space (index * chunk height)
    pub origin_y: f32,
    pub walls: usize,
    pub collectibles: usize,
    pub powerups: usize,
}

impl Chunk {
    /// Top edge on screen for a given scroll offset
    pub fn screen_top(&self, scroll_y: f32) -> f32 {
        self.origin_y - scroll_y
    }

    /// Bottom edge on screen for a given scroll offset
    pub fn screen_bottom(&self, scroll_y: f32) -> f32 {
        self.origin_y + chunk_height() - scroll_y
    }
}

/// Height of a chunk in pixels
pub fn chunk_height() -> f32 {
    MAZE_CELL * MAZE_CHUNK_ROWS as f32
}

/// Column layout of the corridor for a canvas width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corridor {
    pub cols: usize,
    pub start_col: usize,
    pub width: usize,
}

impl Corridor {
    pub fn for_width(canvas_width: f32) -> Self {
        let cols = (canvas_width / MAZE_CELL).floor().max(0.0) as usize;
        let width = ((cols as f32 * MAZE_CORRIDOR_FRACTION).floor() as usize).max(MAZE_MIN_CORRIDOR);
        let start_col = cols.saturating_sub(width) / 2;
        Self {
            cols,
            start_col,
            width,
        }
    }

    /// First column past the corridor
    pub fn end_col(&self) -> usize {
        self.start_col + self.width
    }
}

#[derive(Debug, Clone)]
pub struct Maze {
    pub viewport: Viewport,
    pub corridor: Corridor,
    /// How far the maze has scrolled (pixels)
    pub scroll_y: f32,
    /// Cumulative scroll distance (pixels)
    pub distance: f32,
    /// Live chunks, ascending index
    pub chunks: VecDeque<Chunk>,
    pub walls: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub powerups: Vec<PowerUp>,
    /// Recent player positions, oldest first
    pub trail: VecDeque<TrailPoint>,
}

impl Maze {
    pub fn new(viewport: Viewport, rng: &mut Pcg32) -> Self {
        let mut maze = Self {
            viewport,
            corridor: Corridor::for_width(viewport.width),
            scroll_y: 0.0,
            distance: 0.0,
            chunks: VecDeque::new(),
            walls: Vec::new(),
            collectibles: Vec::new(),
            powerups: Vec::new(),
            trail: VecDeque::with_capacity(MAZE_TRAIL_LENGTH + 1),
        };
        for index in 0..MAZE_INITIAL_CHUNKS {
            maze.generate_chunk(index, rng);
        }
        maze
    }

    /// Scroll, generate ahead, evict behind
    pub fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        let delta = MAZE_SCROLL_SPEED * dt;
        self.scroll_y += delta;
        self.distance += delta;

        for wall in self.walls.iter_mut() {
            wall.rect.center.y -= delta;
        }
        for c in self.collectibles.iter_mut() {
            c.pos.y -= delta;
        }
        for p in self.powerups.iter_mut() {
            p.pos.y -= delta;
        }

        if let Some(last) = self.chunks.back().copied() {
            if last.screen_top(self.scroll_y) < self.viewport.height * 2.0 {
                self.generate_chunk(last.index + 1, rng);
            }
        }

        while let Some(first) = self.chunks.front().copied() {
            if first.screen_bottom(self.scroll_y) > -self.viewport.height {
                break;
            }
            self.chunks.pop_front();
            self.walls.drain(..first.walls);
            self.collectibles.drain(..first.collectibles);
            self.powerups.drain(..first.powerups);
            log::debug!("Evicted maze chunk {}", first.index);
        }
    }

    /// Record a player position for the trail
    pub fn add_trail_point(&mut self, pos: Vec2) {
        self.trail.push_back(TrailPoint { pos, alpha: 1.0 });
        if self.trail.len() > MAZE_TRAIL_LENGTH {
            self.trail.pop_front();
        }
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.alpha = i as f32 / len;
        }
    }

    fn generate_chunk(&mut self, index: u64, rng: &mut Pcg32) {
        let origin_y = index as f32 * chunk_height();
        // Local y 0 of this chunk on screen
        let top = origin_y - self.scroll_y;
        let Corridor {
            cols,
            start_col,
            width,
        } = self.corridor;
        let end_col = self.corridor.end_col();

        let walls_before = self.walls.len();
        for row in 0..MAZE_CHUNK_ROWS {
            let y = top + row as f32 * MAZE_CELL;
            for col in (0..start_col).chain(end_col..cols) {
                self.push_wall(col, y);
            }

            let roll: f32 = rng.random();
            if roll < MAZE_BLOCK_CHANCE && row > 2 && row < 8 {
                let col = start_col + rng.random_range(0..width.max(1));
                self.push_wall(col, y);
            }
        }

        let collectibles_before = self.collectibles.len();
        for _ in 0..MAZE_COLLECTIBLES_PER_CHUNK {
            let pos = self.random_corridor_point(top, rng);
            self.collectibles
                .push(Collectible::new(pos, MAZE_COLLECTIBLE_RADIUS, PICKUP_COLOR));
        }

        let powerups_before = self.powerups.len();
        if rng.random_bool(MAZE_MAGNET_CHANCE) {
            let pos = self.random_corridor_point(top, rng);
            self.powerups
                .push(PowerUp::new(pos, MAZE_POWERUP_RADIUS, PowerUpKind::Magnet));
        }

        let chunk = Chunk {
            index,
            origin_y,
            walls: self.walls.len() - walls_before,
            collectibles: self.collectibles.len() - collectibles_before,
            powerups: self.powerups.len() - powerups_before,
        };
        log::debug!(
            "Generated maze chunk {} ({} walls, {} power-ups)",
            index,
            chunk.walls,
            chunk.powerups
        );
        self.chunks.push_back(chunk);
    }

    fn push_wall(&mut self, col: usize, y: f32) {
        self.walls.push(Obstacle {
            rect: Rect::from_corner(
                Vec2::new(col as f32 * MAZE_CELL, y),
                Vec2::splat(MAZE_CELL),
            ),
            color: WALL_COLOR,
        });
    }

    /// Random cell-centered point inside the corridor, one cell in from its edges
    fn random_corridor_point(&self, top: f32, rng: &mut Pcg32) -> Vec2 {
        let inner = self.corridor.width.saturating_sub(2) as f32;
        let col = self.corridor.start_col as f32 + 1.0 + rng.random::<f32>() * inner;
        let row = 1.0 + rng.random::<f32>() * (MAZE_CHUNK_ROWS - 2) as f32;
        Vec2::new(
            col * MAZE_CELL + MAZE_CELL / 2.0,
            top + row * MAZE_CELL + MAZE_CELL / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn maze(seed: u64) -> (Maze, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let maze = Maze::new(Viewport::new(400.0, 800.0), &mut rng);
        (maze, rng)
    }

    #[test]
    fn test_corridor_is_centered() {
        let corridor = Corridor::for_width(400.0);
        assert_eq!(corridor.cols, 8);
        assert_eq!(corridor.width, 4);
        assert_eq!(corridor.start_col, 2);

        // Narrow screens still get three columns
        let narrow = Corridor::for_width(200.0);
        assert_eq!(narrow.width, 3);
    }

    #[test]
    fn test_initial_chunks() {
        let (maze, _) = maze(1);
        let indices: Vec<u64> = maze.chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(maze.collectibles.len(), 15);
        // Side walls: 4 columns x 10 rows per chunk, plus occasional blocks
        assert!(maze.walls.len() >= 3 * 40);
        let counted: usize = maze.chunks.iter().map(|c| c.walls).sum();
        assert_eq!(counted, maze.walls.len());
    }

    #[test]
    fn test_pickups_stay_inside_corridor() {
        let (maze, _) = maze(5);
        let left = 3.0 * MAZE_CELL;
        let right = 5.0 * MAZE_CELL + MAZE_CELL;
        for c in &maze.collectibles {
            assert!(c.pos.x >= left && c.pos.x <= right, "x = {}", c.pos.x);
        }
        for p in &maze.powerups {
            assert_eq!(p.kind, PowerUpKind::Magnet);
        }
    }

    #[test]
    fn test_scroll_moves_elements_up() {
        let (mut maze, mut rng) = maze(2);
        let before = maze.walls[0].rect.center.y;
        maze.update(0.5, &mut rng);
        assert!((maze.scroll_y - 50.0).abs() < 1e-4);
        assert!((maze.walls[0].rect.center.y - (before - 50.0)).abs() < 1e-3);
    }

    #[test]
    fn test_generates_ahead_and_evicts_behind() {
        let (mut maze, mut rng) = maze(3);
        let dt = 1.0 / 60.0;
        // Scroll 60 seconds = 6000 px, 12 chunks
        for _ in 0..3600 {
            maze.update(dt, &mut rng);
        }
        let first = maze.chunks.front().copied().unwrap();
        let last = maze.chunks.back().copied().unwrap();
        assert!(first.index > 0);
        assert!(first.screen_bottom(maze.scroll_y) > -maze.viewport.height);
        assert!(last.screen_top(maze.scroll_y) >= maze.viewport.height * 2.0 - chunk_height());

        let walls: usize = maze.chunks.iter().map(|c| c.walls).sum();
        let pickups: usize = maze.chunks.iter().map(|c| c.collectibles).sum();
        assert_eq!(walls, maze.walls.len());
        assert_eq!(pickups, maze.collectibles.len());
    }

    #[test]
    fn test_trail_alpha_rises_with_recency() {
        let (mut maze, _) = maze(4);
        for i in 0..20 {
            maze.add_trail_point(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(maze.trail.len(), MAZE_TRAIL_LENGTH);
        assert_eq!(maze.trail[0].alpha, 0.0);
        assert_eq!(maze.trail.front().unwrap().pos.x, 5.0);
        let alphas: Vec<f32> = maze.trail.iter().map(|p| p.alpha).collect();
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
    }
}
