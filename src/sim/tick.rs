//! Per-frame simulation step
//!
//! Advances the player, the stage and the particles by `dt`, then resolves
//! collisions against the moved state.

use glam::Vec2;

use super::collision;
use super::stage::Stage;
use super::state::{GameState, RunPhase};
use crate::consts::SHAKE_DECAY;

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch position in canvas pixels
    pub pointer: Option<Vec2>,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != RunPhase::Playing {
        return;
    }
    state.elapsed += dt;

    if let Some(pointer) = input.pointer {
        state.player.set_target(pointer);
    }
    state.player.update(dt, state.viewport);

    state.stage.update(dt, &mut state.rng);
    if let Stage::Maze(maze) = &mut state.stage {
        maze.add_trail_point(state.player.pos);
    }

    state.particles.update(dt);

    if state.shake > 0.0 {
        state.shake = (state.shake - SHAKE_DECAY * dt).max(0.0);
    }

    collision::resolve(state, dt);
}
