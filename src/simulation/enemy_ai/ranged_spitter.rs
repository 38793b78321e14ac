//! Ranged Spitter AI Module
//!
//! ## Priority Order
//! 1. Back off when the target is too close
//! 2. Spit Volley (in range)
//! 3. Close distance if out of range
//! 4. Strafe around the target while the volley recharges

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};

/// Kite when closer than this
const KITE_DISTANCE: f32 = 140.0;

pub struct RangedSpitterAI;

impl ArchetypeAI for RangedSpitterAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };
        let distance = ctx.distance_to_target().unwrap_or(f32::MAX);

        if distance < KITE_DISTANCE {
            return EnemyDecision::MoveAway(target.position);
        }

        if ctx.can_use(AbilityKind::SpitVolley) {
            return EnemyDecision::StartAbility {
                ability: AbilityKind::SpitVolley,
                target_pos: Some(target.position),
                start_pos: None,
            };
        }

        if !ctx.ability_in_range(AbilityKind::SpitVolley) {
            return EnemyDecision::MoveToward(target.position);
        }

        EnemyDecision::Strafe {
            around: target.position,
            clockwise: ctx.self_id.0 % 2 == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::components::{Archetype, EnemyState};
    use crate::simulation::enemy_ai::tests::{context, definition};

    #[test]
    fn test_kites_when_crowded() {
        let enemy = EnemyState::new("test", Archetype::RangedSpitter);
        let def = definition(Archetype::RangedSpitter, &[(AbilityKind::SpitVolley, 300.0)]);
        let ctx = context(&enemy, &def, 60.0);
        assert!(matches!(
            RangedSpitterAI.decide_action(&ctx),
            EnemyDecision::MoveAway(_)
        ));
    }

    #[test]
    fn test_strafes_while_volley_recharges() {
        let mut enemy = EnemyState::new("test", Archetype::RangedSpitter);
        enemy.cooldowns.insert(AbilityKind::SpitVolley, 1.5);
        let def = definition(Archetype::RangedSpitter, &[(AbilityKind::SpitVolley, 300.0)]);
        let ctx = context(&enemy, &def, 200.0);
        assert!(matches!(
            RangedSpitterAI.decide_action(&ctx),
            EnemyDecision::Strafe { .. }
        ));
    }
}
