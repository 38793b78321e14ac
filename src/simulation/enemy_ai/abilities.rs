//! Enemy ability kinds and the three-phase ability lifecycle.
//!
//! Every ability runs Telegraph → Execute → Recovery. Phase lengths come from a
//! static table keyed by [`AbilityKind`]; damage, range and cooldown come from the
//! content registry. [`ActiveAbility::advance`] is pure timing: it reports when the
//! effect must fire and when phases change, and the executors do the rest.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::simulation::components::ActorId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Melee chaser: leap at the target
    Lunge,
    /// Ranged spitter: fan of poisoned projectiles
    SpitVolley,
    /// Tank: area slam at the snapshotted target point, roots
    GroundSlam,
    /// Blinker: teleport beside the target and strike
    Blink,
    /// Hazard generator: lob a damaging pool
    ToxicPool,
    /// Boss: charge along a line
    BossCharge,
    /// Boss: ring of projectiles
    Barrage,
    /// Boss: several fire hazards around the target
    Eruption,
    /// Boss: spawn minions
    SummonBrood,
    /// Boss: large area stun
    Quake,
}

/// Fixed phase lengths for one ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityTiming {
    pub telegraph: f32,
    pub execute: f32,
    pub recovery: f32,
    /// Execute progress (0..=1) at which the effect lands
    pub effect_at: f32,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 10] = [
        AbilityKind::Lunge,
        AbilityKind::SpitVolley,
        AbilityKind::GroundSlam,
        AbilityKind::Blink,
        AbilityKind::ToxicPool,
        AbilityKind::BossCharge,
        AbilityKind::Barrage,
        AbilityKind::Eruption,
        AbilityKind::SummonBrood,
        AbilityKind::Quake,
    ];

    pub const fn timing(self) -> AbilityTiming {
        match self {
            AbilityKind::Lunge => AbilityTiming { telegraph: 0.4, execute: 0.25, recovery: 0.4, effect_at: 0.5 },
            AbilityKind::SpitVolley => AbilityTiming { telegraph: 0.5, execute: 0.3, recovery: 0.5, effect_at: 0.0 },
            AbilityKind::GroundSlam => AbilityTiming { telegraph: 0.8, execute: 0.2, recovery: 0.7, effect_at: 1.0 },
            AbilityKind::Blink => AbilityTiming { telegraph: 0.3, execute: 0.15, recovery: 0.35, effect_at: 0.5 },
            AbilityKind::ToxicPool => AbilityTiming { telegraph: 0.6, execute: 0.2, recovery: 0.6, effect_at: 0.5 },
            AbilityKind::BossCharge => AbilityTiming { telegraph: 0.7, execute: 0.5, recovery: 0.8, effect_at: 0.6 },
            AbilityKind::Barrage => AbilityTiming { telegraph: 0.9, execute: 0.4, recovery: 0.9, effect_at: 0.0 },
            AbilityKind::Eruption => AbilityTiming { telegraph: 1.0, execute: 0.3, recovery: 1.0, effect_at: 0.5 },
            AbilityKind::SummonBrood => AbilityTiming { telegraph: 1.2, execute: 0.3, recovery: 1.0, effect_at: 1.0 },
            AbilityKind::Quake => AbilityTiming { telegraph: 1.1, execute: 0.2, recovery: 1.2, effect_at: 1.0 },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AbilityKind::Lunge => "Lunge",
            AbilityKind::SpitVolley => "Spit Volley",
            AbilityKind::GroundSlam => "Ground Slam",
            AbilityKind::Blink => "Blink Strike",
            AbilityKind::ToxicPool => "Toxic Pool",
            AbilityKind::BossCharge => "Charge",
            AbilityKind::Barrage => "Barrage",
            AbilityKind::Eruption => "Eruption",
            AbilityKind::SummonBrood => "Summon Brood",
            AbilityKind::Quake => "Quake",
        }
    }

    /// Abilities that move the caster during execute.
    pub fn is_movement(self) -> bool {
        matches!(self, AbilityKind::Lunge | AbilityKind::BossCharge)
    }

    /// Whether execute needs the start snapshot as well as the target snapshot.
    pub fn needs_start_position(self) -> bool {
        self.is_movement()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AbilityPhase {
    Telegraph,
    Execute,
    Recovery,
}

/// What happened during one call to [`ActiveAbility::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseStep {
    pub entered_execute: bool,
    pub fire_effect: bool,
    pub entered_recovery: bool,
    pub finished: bool,
}

/// An ability in flight on one enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveAbility {
    pub kind: AbilityKind,
    pub phase: AbilityPhase,
    pub phase_remaining: f32,
    pub phase_elapsed: f32,
    pub target_pos: Option<Vec2>,
    pub start_pos: Option<Vec2>,
    /// Telegraph progress 0..=1 for presentation
    pub windup: f32,
    pub effect_applied: bool,
    /// Actor stunned by this ability; its stun is cleared when the ability ends
    pub stunned_target: Option<ActorId>,
}

impl ActiveAbility {
    pub fn new(kind: AbilityKind, target_pos: Option<Vec2>, start_pos: Option<Vec2>) -> Self {
        Self {
            kind,
            phase: AbilityPhase::Telegraph,
            phase_remaining: kind.timing().telegraph,
            phase_elapsed: 0.0,
            target_pos,
            start_pos,
            windup: 0.0,
            effect_applied: false,
            stunned_target: None,
        }
    }

    /// Progress through the execute phase, 0 outside it.
    pub fn execute_progress(&self) -> f32 {
        if self.phase != AbilityPhase::Execute {
            return 0.0;
        }
        let duration = self.kind.timing().execute;
        if duration <= 0.0 {
            1.0
        } else {
            (self.phase_elapsed / duration).clamp(0.0, 1.0)
        }
    }

    fn enter(&mut self, phase: AbilityPhase, duration: f32) {
        self.phase = phase;
        self.phase_elapsed = 0.0;
        self.phase_remaining = duration;
    }

    /// Advance phase timers by `dt`.
    ///
    /// The effect never fires during telegraph. In execute it fires once when
    /// progress reaches the ability's threshold, or on the last execute frame at
    /// the latest.
    pub fn advance(&mut self, dt: f32) -> PhaseStep {
        let timing = self.kind.timing();
        let mut step = PhaseStep::default();
        let mut carry = dt;

        // Time past the end of a phase is spent in the next one.
        while carry > 0.0 && !step.finished {
            self.phase_elapsed += carry;
            self.phase_remaining -= carry;
            carry = 0.0;

            match self.phase {
                AbilityPhase::Telegraph => {
                    self.windup = if timing.telegraph > 0.0 {
                        (self.phase_elapsed / timing.telegraph).min(1.0)
                    } else {
                        1.0
                    };
                    if self.phase_remaining <= 0.0 {
                        carry = -self.phase_remaining;
                        self.windup = 1.0;
                        self.enter(AbilityPhase::Execute, timing.execute);
                        step.entered_execute = true;
                    }
                }
                AbilityPhase::Execute => {
                    let ending = self.phase_remaining <= 0.0;
                    if !self.effect_applied && (self.execute_progress() >= timing.effect_at || ending) {
                        self.effect_applied = true;
                        step.fire_effect = true;
                    }
                    if ending {
                        carry = -self.phase_remaining;
                        self.enter(AbilityPhase::Recovery, timing.recovery);
                        step.entered_recovery = true;
                    }
                }
                AbilityPhase::Recovery => {
                    if self.phase_remaining <= 0.0 {
                        step.finished = true;
                    }
                }
            }
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_all_timings_positive() {
        for kind in AbilityKind::ALL {
            let t = kind.timing();
            assert!(t.telegraph > 0.0, "{:?} telegraph", kind);
            assert!(t.execute > 0.0, "{:?} execute", kind);
            assert!(t.recovery > 0.0, "{:?} recovery", kind);
            assert!((0.0..=1.0).contains(&t.effect_at), "{:?} effect_at", kind);
        }
    }

    #[test]
    fn test_windup_rises_linearly() {
        let mut ability = ActiveAbility::new(AbilityKind::Lunge, Some(Vec2::ZERO), Some(Vec2::ZERO));
        ability.advance(0.1);
        assert!((ability.windup - 0.25).abs() < 1e-4);
        ability.advance(0.1);
        assert!((ability.windup - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_effect_fires_once_after_telegraph() {
        let mut ability = ActiveAbility::new(AbilityKind::Lunge, Some(Vec2::ZERO), Some(Vec2::ZERO));
        let mut elapsed = 0.0;
        let mut fired_at = None;
        let mut fire_count = 0;
        while elapsed < 2.0 {
            let step = ability.advance(DT);
            elapsed += DT;
            if step.fire_effect {
                fire_count += 1;
                fired_at.get_or_insert(elapsed);
            }
            if step.finished {
                break;
            }
        }
        let timing = AbilityKind::Lunge.timing();
        let fired_at = fired_at.expect("effect should fire");
        assert_eq!(fire_count, 1);
        assert!(fired_at >= timing.telegraph);
        assert!(fired_at <= timing.telegraph + timing.execute + DT);
    }

    #[test]
    fn test_end_of_execute_forces_effect() {
        let mut ability = ActiveAbility::new(AbilityKind::GroundSlam, Some(Vec2::ZERO), None);
        let timing = AbilityKind::GroundSlam.timing();
        let step = ability.advance(timing.telegraph + 0.001);
        assert!(step.entered_execute);
        let step = ability.advance(timing.execute + 0.001);
        assert!(step.fire_effect);
        assert!(step.entered_recovery);
        let step = ability.advance(timing.recovery + 0.001);
        assert!(step.finished);
    }

    #[test]
    fn test_overshoot_carries_into_next_phase() {
        let timing = AbilityKind::Lunge.timing();
        let mut ability = ActiveAbility::new(AbilityKind::Lunge, Some(Vec2::ZERO), Some(Vec2::ZERO));

        // One large step lands past the effect point of execute
        let step = ability.advance(timing.telegraph + timing.execute * 0.6);
        assert!(step.entered_execute);
        assert_eq!(ability.phase, AbilityPhase::Execute);
        assert!((ability.execute_progress() - 0.6).abs() < 1e-4);
        assert!(step.fire_effect, "effect threshold reached within the same step");

        let mut ability = ActiveAbility::new(AbilityKind::Lunge, Some(Vec2::ZERO), Some(Vec2::ZERO));
        let step = ability.advance(timing.telegraph + timing.execute + timing.recovery + 0.01);
        assert!(step.entered_execute && step.fire_effect && step.entered_recovery && step.finished);
    }
}
