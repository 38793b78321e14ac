//! Blinker AI Module
//!
//! ## Priority Order
//! 1. Blink Strike (teleport to the far side of the target)
//! 2. Basic attack
//! 3. Chase

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};
use crate::simulation::geometry;

pub struct BlinkerAI;

impl ArchetypeAI for BlinkerAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };

        if ctx.can_use(AbilityKind::Blink) {
            let behind = geometry::direction(ctx.position, target.position);
            let landing = target.position + behind * (target.radius + ctx.radius);
            return EnemyDecision::StartAbility {
                ability: AbilityKind::Blink,
                target_pos: Some(landing),
                start_pos: Some(ctx.position),
            };
        }

        if ctx.in_attack_range() {
            return EnemyDecision::BasicAttack { target: target.id };
        }

        EnemyDecision::MoveToward(target.position)
    }
}
