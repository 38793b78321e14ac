//! Scripted player input for headless runs.
//!
//! ## Priority Order
//! 1. Back away from the nearest enemy when it gets too close
//! 2. Cast the first ready skill whose range covers it
//! 3. Close to a comfortable casting distance

use bevy::prelude::*;

use crate::simulation::components::Faction;
use crate::simulation::geometry;
use crate::simulation::Simulation;

/// Kite when an enemy is closer than this
const KITE_DISTANCE: f32 = 90.0;
/// Approach when the nearest enemy is farther than this
const ENGAGE_DISTANCE: f32 = 220.0;

/// Move the player and cast skills for one tick.
pub fn drive_player(sim: &mut Simulation, dt: f32) {
    if !sim.player.base.alive {
        return;
    }
    let position = sim.player.base.position;
    let Some((_, enemy_position)) = sim.nearest_of_faction(position, Faction::Enemy) else {
        sim.move_player(Vec2::ZERO, dt);
        return;
    };
    let distance = geometry::distance(position, enemy_position);

    let ready_slot = sim
        .player
        .state
        .skills
        .iter()
        .position(|slot| {
            slot.is_ready()
                && slot.kind.range() >= distance
                && sim.player.state.mana >= slot.kind.mana_cost()
        });
    if let Some(slot) = ready_slot {
        sim.cast_skill(slot, enemy_position);
    }

    let direction = if distance < KITE_DISTANCE {
        geometry::direction(enemy_position, position)
    } else if distance > ENGAGE_DISTANCE {
        geometry::direction(position, enemy_position)
    } else {
        Vec2::ZERO
    };
    sim.move_player(direction, dt);
}
