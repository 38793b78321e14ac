//! Tank AI Module
//!
//! ## Priority Order
//! 1. Ground Slam (target inside slam range)
//! 2. Basic attack
//! 3. Chase

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};

pub struct TankAI;

impl ArchetypeAI for TankAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };

        if ctx.can_use(AbilityKind::GroundSlam) {
            return EnemyDecision::StartAbility {
                ability: AbilityKind::GroundSlam,
                target_pos: Some(target.position),
                start_pos: None,
            };
        }

        if ctx.in_attack_range() {
            return EnemyDecision::BasicAttack { target: target.id };
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
    fn test_slams_inside_range() {
        let enemy = EnemyState::new("test", Archetype::Tank);
        let def = definition(Archetype::Tank, &[(AbilityKind::GroundSlam, 80.0)]);
        let ctx = context(&enemy, &def, 60.0);
        assert!(matches!(
            TankAI.decide_action(&ctx),
            EnemyDecision::StartAbility {
                ability: AbilityKind::GroundSlam,
                ..
            }
        ));
    }

    #[test]
    fn test_swings_or_chases_while_slam_recharges() {
        let mut enemy = EnemyState::new("test", Archetype::Tank);
        enemy.cooldowns.insert(AbilityKind::GroundSlam, 3.0);
        let def = definition(Archetype::Tank, &[(AbilityKind::GroundSlam, 80.0)]);

        let close = context(&enemy, &def, 20.0);
        assert!(matches!(TankAI.decide_action(&close), EnemyDecision::BasicAttack { .. }));
        let far = context(&enemy, &def, 60.0);
        assert!(matches!(TankAI.decide_action(&far), EnemyDecision::MoveToward(_)));
    }
}
