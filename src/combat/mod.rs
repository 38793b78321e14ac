//! Combat system
//!
//! Wires the simulation core into a bevy `App`:
//! - Damage events and results shared by every damage source
//! - Combat logging
//! - The fixed-step driver that advances the `Simulation` resource

use bevy::prelude::*;

pub mod events;
pub mod log;

use crate::simulation::constants::TICK_RATE;
use crate::simulation::Simulation;

/// Plugin for the combat simulation.
///
/// The `Simulation` resource itself is inserted by whoever sets up the run
/// (headless mode, tests); the driver only runs once it exists.
pub struct CombatSimPlugin;

impl Plugin for CombatSimPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_RATE))
            .init_resource::<SimulationSpeed>()
            .add_systems(
                FixedUpdate,
                advance_simulation.run_if(resource_exists::<Simulation>),
            );
    }
}

/// Advance the simulation by one fixed step, scaled by the speed control.
pub fn advance_simulation(
    time: Res<Time<Fixed>>,
    speed: Res<SimulationSpeed>,
    mut sim: ResMut<Simulation>,
) {
    if speed.is_paused() {
        return;
    }
    sim.tick(time.delta_secs() * speed.multiplier);
}

/// Controls the speed of the combat simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = half speed, 1.0 = normal, 2.0 = double, 3.0 = triple)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn half_speed(&mut self) {
        self.multiplier = 0.5;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn double_speed(&mut self) {
        self.multiplier = 2.0;
    }

    pub fn triple_speed(&mut self) {
        self.multiplier = 3.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}
