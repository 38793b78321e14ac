//! Player loadout: skills, passives, items.
//!
//! The level-up, loot and meld systems own these collections and edit them
//! between encounters. The combat core only reads them to compute modifiers.

use serde::{Deserialize, Serialize};

use crate::simulation::constants::MIN_ABILITY_COOLDOWN;

/// Passive traits picked up during a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Passive {
    /// On hit: add poison stacks
    VenomBlade { stacks: u32 },
    /// On hit: add bleed stacks
    Serrated { stacks: u32 },
    /// On hit: add slow stacks
    FrostTouch { stacks: u32, duration: f32 },
    /// On hit: make the target brittle if it isn't already
    Shatter { duration: f32 },
    /// On hit: weaken the target
    Hex { duration: f32 },
    /// On hit: heal for a fraction of damage dealt
    Lifesteal { fraction: f32 },
    /// On hit: burst damage when the target ends below a health fraction
    Executioner { threshold: f32, damage: f32 },
    /// On kill: stacking global damage bonus
    Bloodlust { per_stack: f32, max_stacks: u32 },
    /// On kill: spread the victim's poison to nearby enemies
    Contagion { radius: f32 },
    /// On debuff applied: bonus damage
    Cruelty { damage: f32 },
    /// On area damage: expose every actor hit
    Aftershock { duration: f32 },
    /// Summons gain damage per other living summon
    PackLeader { per_ally: f32 },
    /// A lone summon deals multiplied damage
    LoneWolf { multiplier: f32 },
}

/// Items equipped during a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// Reflect flat damage to melee/projectile attackers
    ThornMail { damage: f32 },
    /// Reflect a fraction of damage taken
    MirrorShield { fraction: f32 },
    /// Grant a shield when health drops under a fraction
    Aegis { threshold: f32, amount: f32 },
    /// Retaliation pulse around the player when hit
    StormHeart { radius: f32, damage: f32 },
    /// Summon damage bonus (fraction)
    SummonCollar { bonus: f32 },
    /// Bonus damage against marked targets (fraction)
    HuntersMark { bonus: f32 },
    /// Leave a poison cloud where an enemy dies
    CorpseBloom { damage: f32, duration: f32, radius: f32 },
    /// Skill cooldown reduction (fraction)
    Hourglass { reduction: f32 },
}

/// Player skills.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SkillKind {
    /// Melee arc in front of the player
    Cleave,
    /// Piercing projectile
    ArcaneBolt,
    /// Area burst around the player that slows
    FrostNova,
    /// Summon a wolf companion
    CallWolf,
    /// Poison hazard at the aim point
    PoisonCloud,
}

impl SkillKind {
    pub fn name(self) -> &'static str {
        match self {
            SkillKind::Cleave => "Cleave",
            SkillKind::ArcaneBolt => "Arcane Bolt",
            SkillKind::FrostNova => "Frost Nova",
            SkillKind::CallWolf => "Call Wolf",
            SkillKind::PoisonCloud => "Poison Cloud",
        }
    }

    pub fn base_cooldown(self) -> f32 {
        match self {
            SkillKind::Cleave => 0.6,
            SkillKind::ArcaneBolt => 0.9,
            SkillKind::FrostNova => 6.0,
            SkillKind::CallWolf => 12.0,
            SkillKind::PoisonCloud => 8.0,
        }
    }

    pub fn mana_cost(self) -> f32 {
        match self {
            SkillKind::Cleave => 0.0,
            SkillKind::ArcaneBolt => 4.0,
            SkillKind::FrostNova => 15.0,
            SkillKind::CallWolf => 25.0,
            SkillKind::PoisonCloud => 18.0,
        }
    }

    pub fn base_damage(self) -> f32 {
        match self {
            SkillKind::Cleave => 14.0,
            SkillKind::ArcaneBolt => 10.0,
            SkillKind::FrostNova => 12.0,
            SkillKind::CallWolf => 6.0,
            SkillKind::PoisonCloud => 4.0,
        }
    }

    /// Distance at which the autopilot considers the skill usable.
    pub fn range(self) -> f32 {
        match self {
            SkillKind::Cleave => 70.0,
            SkillKind::ArcaneBolt => 420.0,
            SkillKind::FrostNova => 110.0,
            SkillKind::CallWolf => f32::INFINITY,
            SkillKind::PoisonCloud => 300.0,
        }
    }
}

/// An equipped skill and its cooldown tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillSlot {
    pub kind: SkillKind,
    pub cooldown_remaining: f32,
}

impl SkillSlot {
    pub fn new(kind: SkillKind) -> Self {
        Self {
            kind,
            cooldown_remaining: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }
}

/// Apply a cooldown reduction fraction, never going below the global minimum.
pub fn effective_cooldown(base: f32, reduction: f32) -> f32 {
    (base * (1.0 - reduction.clamp(0.0, 1.0))).max(MIN_ABILITY_COOLDOWN)
}
