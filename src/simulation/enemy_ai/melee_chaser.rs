//! Melee Chaser AI Module
//!
//! ## Priority Order
//! 1. Lunge (gap closer when the target is in lunge range but out of reach)
//! 2. Basic attack (in reach)
//! 3. Chase

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};

pub struct MeleeChaserAI;

impl ArchetypeAI for MeleeChaserAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };

        if ctx.in_attack_range() {
            return EnemyDecision::BasicAttack { target: target.id };
        }

        if ctx.can_use(AbilityKind::Lunge) {
            return EnemyDecision::StartAbility {
                ability: AbilityKind::Lunge,
                target_pos: Some(target.position),
                start_pos: Some(ctx.position),
            };
        }

        EnemyDecision::MoveToward(target.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::components::{Archetype, EnemyState};
    use crate::simulation::enemy_ai::tests::{context, definition};

    #[test]
    fn test_lunges_from_mid_range() {
        let enemy = EnemyState::new("test", Archetype::MeleeChaser);
        let def = definition(Archetype::MeleeChaser, &[(AbilityKind::Lunge, 150.0)]);
        let ctx = context(&enemy, &def, 120.0);
        assert!(matches!(
            MeleeChaserAI.decide_action(&ctx),
            EnemyDecision::StartAbility { ability: AbilityKind::Lunge, .. }
        ));
    }

    #[test]
    fn test_attacks_in_reach() {
        let mut enemy = EnemyState::new("test", Archetype::MeleeChaser);
        enemy.attack_range = 20.0;
        let def = definition(Archetype::MeleeChaser, &[(AbilityKind::Lunge, 150.0)]);
        let ctx = context(&enemy, &def, 30.0);
        assert!(matches!(
            MeleeChaserAI.decide_action(&ctx),
            EnemyDecision::BasicAttack { .. }
        ));
    }
}
