//! Cosmetic particle bursts
//!
//! Particles never touch gameplay. They draw from their own RNG stream so a
//! burst cannot shift what the spawner or maze generator produce next.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Rgb;
use crate::consts::{MAX_PARTICLES, PARTICLE_DECAY};

/// Offset mixed into the run seed for the cosmetic stream
const FX_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    /// 1 at birth, removed at 0
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
    /// Upper bound on live particles (0 disables bursts)
    pub limit: usize,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            limit: MAX_PARTICLES,
            rng: Pcg32::seed_from_u64(seed ^ FX_STREAM),
        }
    }

    /// Emit `count` particles radiating from `pos` in random directions
    pub fn spawn(&mut self, pos: Vec2, color: Rgb, count: usize) {
        let room = self.limit.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let speed = self.rng.random_range(50.0..150.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                color,
                life: 1.0,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut() {
            p.pos += p.vel * dt;
            p.life -= PARTICLE_DECAY * dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Random value in [-0.5, 0.5) from the cosmetic stream
    pub fn jitter(&mut self) -> f32 {
        self.rng.random::<f32>() - 0.5
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
