//! Player skill casting.

use bevy::prelude::*;

use super::combat_core::{self, AreaAttack};
use super::components::*;
use super::constants::*;
use super::geometry;
use super::projectiles;
use super::status_effects;
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageTag, DamageType};
use crate::combat::log::CombatLogEventType;

/// Half-angle of the cleave arc, in radians
const CLEAVE_HALF_ARC: f32 = 1.05;
const BOLT_SPEED: f32 = 480.0;
const BOLT_LIFETIME: f32 = 1.2;
const NOVA_SLOW_STACKS: u32 = 2;
const NOVA_SLOW_DURATION: f32 = 2.0;
const MAX_WOLVES: usize = 3;
const WOLF_HEALTH: f32 = 40.0;
const WOLF_DURATION: f32 = 20.0;
const CLOUD_RADIUS: f32 = 70.0;
const CLOUD_DURATION: f32 = 5.0;

impl Simulation {
    /// Cast the skill in `slot` toward the world point `aim`.
    ///
    /// Returns false without spending anything when the player cannot act, the
    /// slot is empty or cooling down, mana is short, or the skill has no valid
    /// use (wolf cap reached).
    pub fn cast_skill(&mut self, slot: usize, aim: Vec2) -> bool {
        if !self.player.base.alive || !self.player.base.status.can_act() {
            return false;
        }
        let Some(skill) = self.player.state.skills.get(slot).cloned() else {
            return false;
        };
        let kind = skill.kind;
        if !skill.is_ready() || self.player.state.mana < kind.mana_cost() {
            return false;
        }
        if kind == SkillKind::CallWolf && self.living_summon_count(ActorId::PLAYER) >= MAX_WOLVES {
            return false;
        }

        let cooldown = effective_cooldown(kind.base_cooldown(), self.player.state.cooldown_reduction());
        let state = &mut self.player.state;
        state.mana -= kind.mana_cost();
        state.skills[slot].cooldown_remaining = cooldown;

        let origin = self.player.base.position;
        let aim_dir = geometry::direction(origin, aim);
        self.player.base.facing = geometry::facing_angle(aim_dir);
        self.player.base.animation = AnimationState::Casting;

        self.combat_log.record(
            CombatLogEventType::AbilityUsed,
            "Player",
            None,
            None,
            format!("Player casts {}", kind.name()),
        );

        match kind {
            SkillKind::Cleave => self.cleave(origin, aim_dir),
            SkillKind::ArcaneBolt => {
                let bolt = self.spawn_projectile(
                    ActorId::PLAYER,
                    kind.name(),
                    origin,
                    aim_dir * BOLT_SPEED,
                    kind.base_damage(),
                    DamageType::Arcane,
                    BOLT_LIFETIME,
                );
                if let Some(projectile) = projectiles::projectile_mut(self, bolt) {
                    projectile.piercing = true;
                }
            }
            SkillKind::FrostNova => {
                let nova = AreaAttack::new(
                    ActorId::PLAYER,
                    Faction::Enemy,
                    origin,
                    kind.range(),
                    kind.base_damage(),
                    DamageType::Frost,
                )
                .named(kind.name());
                for hit in combat_core::resolve_area(self, &nova, None) {
                    status_effects::apply(
                        self,
                        hit,
                        StatusKind::Slow,
                        NOVA_SLOW_STACKS,
                        NOVA_SLOW_DURATION,
                        ActorId::PLAYER,
                    );
                }
            }
            SkillKind::CallWolf => {
                let angle = self.rng.random_range(0.0, std::f32::consts::TAU);
                let at = geometry::point_on_ring(origin, SUMMON_FOLLOW_DISTANCE, angle);
                self.spawn_summon(ActorId::PLAYER, "Wolf", at, WOLF_HEALTH, kind.base_damage(), WOLF_DURATION);
            }
            SkillKind::PoisonCloud => {
                let reach = geometry::distance(origin, aim).min(kind.range());
                let at = origin + aim_dir * reach;
                let spec = HazardSpec {
                    effect: HazardEffect::Damage,
                    damage_type: DamageType::Poison,
                    amount: kind.base_damage(),
                    tick_interval: 0.5,
                    duration: CLOUD_DURATION,
                    radius: CLOUD_RADIUS,
                };
                self.spawn_hazard(ActorId::PLAYER, kind.name(), at, spec, false);
            }
        }
        true
    }

    /// Melee arc: every enemy within reach and inside the arc takes one hit.
    fn cleave(&mut self, origin: Vec2, aim_dir: Vec2) {
        let kind = SkillKind::Cleave;
        let targets: Vec<ActorId> = self
            .targets_in_radius(origin, kind.range(), Faction::Enemy)
            .into_iter()
            .filter(|id| {
                self.position_of(*id).is_some_and(|p| {
                    let to_target = geometry::direction(origin, p);
                    to_target == Vec2::ZERO || aim_dir.angle_to(to_target).abs() <= CLEAVE_HALF_ARC
                })
            })
            .collect();

        for target in targets {
            let event = DamageEvent::physical(ActorId::PLAYER, target, kind.base_damage())
                .with_tag(DamageTag::Melee)
                .named(kind.name());
            combat_core::resolve(self, event, None);
        }
    }
}
