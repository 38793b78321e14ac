//! Hazard Generator AI Module
//!
//! ## Priority Order
//! 1. Toxic Pool (lobbed at the target's current spot)
//! 2. Back off when the target is close
//! 3. Close distance if out of range
//! 4. Strafe

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};

const KITE_DISTANCE: f32 = 120.0;

pub struct HazardGeneratorAI;

impl ArchetypeAI for HazardGeneratorAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };

        if ctx.can_use(AbilityKind::ToxicPool) {
            return EnemyDecision::StartAbility {
                ability: AbilityKind::ToxicPool,
                target_pos: Some(target.position),
                start_pos: None,
            };
        }

        let distance = ctx.distance_to_target().unwrap_or(f32::MAX);
        if distance < KITE_DISTANCE {
            return EnemyDecision::MoveAway(target.position);
        }
        if !ctx.ability_in_range(AbilityKind::ToxicPool) {
            return EnemyDecision::MoveToward(target.position);
        }

        EnemyDecision::Strafe {
            around: target.position,
            clockwise: ctx.self_id.0 % 2 == 1,
        }
    }
}
