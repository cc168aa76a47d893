//! Falling world for the Normal and Hardcore modes
//!
//! A spawn timer drops one entity at a time above the screen. The world speed
//! ramps up forever, which shortens the spawn interval as it goes.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    BIOMES, Biome, Collectible, GameMode, Obstacle, PowerUp, PowerUpKind, Viewport, biome_index,
};
use crate::consts::*;
use crate::Rect;

/// Live entities of the falling world
#[derive(Debug, Clone)]
pub struct World {
    pub mode: GameMode,
    pub viewport: Viewport,
    /// Fall speed (pixels/second)
    pub speed: f32,
    /// Seconds until the next spawn
    pub spawn_timer: f32,
    /// Cumulative fall distance (pixels)
    pub distance: f32,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub powerups: Vec<PowerUp>,
}

impl World {
    pub fn new(mode: GameMode, viewport: Viewport) -> Self {
        let speed = match mode {
            GameMode::Hardcore => HARDCORE_START_SPEED,
            _ => NORMAL_START_SPEED,
        };
        Self {
            mode,
            viewport,
            speed,
            spawn_timer: 0.0,
            distance: 0.0,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            powerups: Vec::new(),
        }
    }

    /// Speed gained per second
    pub fn acceleration(&self) -> f32 {
        match self.mode {
            GameMode::Hardcore => HARDCORE_ACCEL,
            _ => NORMAL_ACCEL,
        }
    }

    /// Spawn interval at the reference speed
    pub fn base_interval(&self) -> f32 {
        match self.mode {
            GameMode::Hardcore => HARDCORE_SPAWN_INTERVAL,
            _ => NORMAL_SPAWN_INTERVAL,
        }
    }

    /// `1 + (speed - 300) / 1000`
    pub fn difficulty(&self) -> f32 {
        1.0 + (self.speed - BASELINE_SPEED) / 1000.0
    }

    /// Seconds between spawns at the current speed
    pub fn spawn_interval(&self) -> f32 {
        self.base_interval() / self.difficulty()
    }

    pub fn biome(&self) -> &'static Biome {
        &BIOMES[biome_index(self.distance)]
    }

    /// Accelerate, spawn when due, move everything down and prune
    pub fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        self.speed += self.acceleration() * dt;
        self.distance += self.speed * dt;

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(rng);
            self.spawn_timer = self.spawn_interval();
        }

        let fall = self.speed * dt;
        let floor = self.viewport.height + PRUNE_MARGIN;
        self.obstacles.retain_mut(|o| {
            o.rect.center.y += fall;
            o.rect.center.y < floor
        });
        self.collectibles.retain_mut(|c| {
            c.pos.y += fall;
            c.pos.y < floor
        });
        self.powerups.retain_mut(|p| {
            p.pos.y += fall;
            p.pos.y < floor
        });
    }

    /// Spawn exactly one entity above the screen
    pub fn spawn(&mut self, rng: &mut Pcg32) {
        let roll: f32 = rng.random();
        let max_x = (self.viewport.width - SPAWN_MARGIN).max(SPAWN_MARGIN + 1.0);
        let x = rng.random_range(SPAWN_MARGIN..max_x);
        let pos = Vec2::new(x, SPAWN_Y);
        let biome = self.biome();

        if roll < POWERUP_CHANCE {
            let kind = if rng.random_bool(0.5) {
                PowerUpKind::Shield
            } else {
                PowerUpKind::Magnet
            };
            log::debug!("Spawned {:?} power-up at x={:.0}", kind, x);
            self.powerups.push(PowerUp::new(pos, POWERUP_RADIUS, kind));
        } else if roll < OBSTACLE_CHANCE {
            let width = rng.random_range(OBSTACLE_MIN_WIDTH..OBSTACLE_MAX_WIDTH);
            self.obstacles.push(Obstacle {
                rect: Rect::new(pos, Vec2::new(width, OBSTACLE_HEIGHT)),
                color: biome.obstacle,
            });
        } else {
            self.collectibles
                .push(Collectible::new(pos, COLLECTIBLE_RADIUS, biome.collectible));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;
    use rand::SeedableRng;

    fn viewport() -> Viewport {
        Viewport::new(400.0, 800.0)
    }

    #[test]
    fn test_normal_speed_ramp() {
        let mut world = World::new(GameMode::Normal, viewport());
        let mut rng = Pcg32::seed_from_u64(1);
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            world.update(dt, &mut rng);
        }
        // 10 seconds at +10 px/s²
        assert!((world.speed - 400.0).abs() < 0.01);
        let expected = 0.8 / (1.0 + 100.0 / 1000.0);
        assert!((world.spawn_interval() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_hardcore_starts_faster() {
        let world = World::new(GameMode::Hardcore, viewport());
        assert_eq!(world.speed, HARDCORE_START_SPEED);
        assert_eq!(world.acceleration(), HARDCORE_ACCEL);
        assert!((world.spawn_interval() - 0.5 / 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_first_tick_spawns_one_entity() {
        let mut world = World::new(GameMode::Normal, viewport());
        let mut rng = Pcg32::seed_from_u64(42);
        world.update(1.0 / 60.0, &mut rng);

        let total = world.obstacles.len() + world.collectibles.len() + world.powerups.len();
        assert_eq!(total, 1);
        assert!(world.spawn_timer > 0.0);
    }

    #[test]
    fn test_spawned_entities_respect_bounds() {
        let mut world = World::new(GameMode::Normal, viewport());
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..500 {
            world.spawn(&mut rng);
        }
        for o in &world.obstacles {
            assert!(o.rect.size.x >= OBSTACLE_MIN_WIDTH && o.rect.size.x < OBSTACLE_MAX_WIDTH);
            assert_eq!(o.rect.size.y, OBSTACLE_HEIGHT);
            assert_eq!(o.rect.center.y, SPAWN_Y);
        }
        let xs = world
            .collectibles
            .iter()
            .map(|c| c.pos.x)
            .chain(world.powerups.iter().map(|p| p.pos.x));
        for x in xs {
            assert!((SPAWN_MARGIN..400.0 - SPAWN_MARGIN).contains(&x));
        }
        // Roughly 60% collectibles
        assert!(world.collectibles.len() > 250);
        assert!(!world.obstacles.is_empty());
    }

    #[test]
    fn test_spawn_shares_follow_roll_thresholds() {
        let mut world = World::new(GameMode::Normal, viewport());
        let mut rng = Pcg32::seed_from_u64(2024);
        let total = 5000;
        for _ in 0..total {
            world.spawn(&mut rng);
        }

        let share = |n: usize| n as f32 / total as f32;
        let powerups = share(world.powerups.len());
        let obstacles = share(world.obstacles.len());
        let collectibles = share(world.collectibles.len());
        assert!((powerups - 0.05).abs() < 0.02, "power-ups {powerups}");
        assert!((obstacles - 0.35).abs() < 0.02, "obstacles {obstacles}");
        assert!((collectibles - 0.60).abs() < 0.02, "collectibles {collectibles}");

        let shields = world
            .powerups
            .iter()
            .filter(|p| p.kind == PowerUpKind::Shield)
            .count();
        assert!(shields > 0);
        assert!(shields < world.powerups.len());
        assert!(world.powerups.iter().all(|p| p.radius == POWERUP_RADIUS));
    }

    #[test]
    fn test_entities_pruned_below_screen() {
        let mut world = World::new(GameMode::Normal, viewport());
        let mut rng = Pcg32::seed_from_u64(3);
        world.spawn_timer = 100.0;
        world
            .collectibles
            .push(Collectible::new(Vec2::new(100.0, 895.0), 10.0, Rgb::WHITE));
        world
            .collectibles
            .push(Collectible::new(Vec2::new(100.0, 100.0), 10.0, Rgb::WHITE));

        // 300 px/s for 1/60 s moves 5 px: 895 -> 900 reaches the prune line
        world.update(1.0 / 60.0, &mut rng);
        assert_eq!(world.collectibles.len(), 1);
        assert!(world.collectibles[0].pos.y > 100.0);
    }
}
