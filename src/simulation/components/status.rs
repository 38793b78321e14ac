//! Status effect record carried by every actor.
//!
//! Each status is an explicit stack/duration pair instead of ad-hoc fields.
//! Bookkeeping rules (stacking, refresh, decay) live in `status_effects`.

use serde::{Deserialize, Serialize};

use super::ActorId;
use crate::simulation::constants::*;

/// Status effect kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StatusKind {
    /// Stacking damage per turn, never decays
    Poison,
    /// Damage equal to stacks per turn, loses one stack each turn
    Bleed,
    /// Movement slow per stack, timed
    Slow,
    /// Next hit taken is amplified, then cleared
    Brittle,
    /// Hits taken are amplified while active
    Exposed,
    /// Outgoing damage reduced while active
    Weaken,
    /// Cannot move while active
    Root,
    /// Cannot act; cleared by whoever applied it
    Stun,
}

impl StatusKind {
    pub const ALL: [StatusKind; 8] = [
        StatusKind::Poison,
        StatusKind::Bleed,
        StatusKind::Slow,
        StatusKind::Brittle,
        StatusKind::Exposed,
        StatusKind::Weaken,
        StatusKind::Root,
        StatusKind::Stun,
    ];

    /// Hard stack cap for this kind.
    pub fn max_stacks(self) -> u32 {
        match self {
            StatusKind::Poison => MAX_POISON_STACKS,
            StatusKind::Bleed => MAX_BLEED_STACKS,
            StatusKind::Slow => MAX_SLOW_STACKS,
            StatusKind::Brittle => MAX_BRITTLE_STACKS,
            StatusKind::Exposed => MAX_EXPOSED_STACKS,
            StatusKind::Weaken => MAX_WEAKEN_STACKS,
            StatusKind::Root => MAX_ROOT_STACKS,
            StatusKind::Stun => 1,
        }
    }

    /// Statuses that count down a duration in `tick`.
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            StatusKind::Slow
                | StatusKind::Brittle
                | StatusKind::Exposed
                | StatusKind::Weaken
                | StatusKind::Root
        )
    }

    /// Statuses handled by the periodic `process` pass.
    pub fn is_periodic(self) -> bool {
        matches!(self, StatusKind::Poison | StatusKind::Bleed)
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusKind::Poison => "Poison",
            StatusKind::Bleed => "Bleed",
            StatusKind::Slow => "Slow",
            StatusKind::Brittle => "Brittle",
            StatusKind::Exposed => "Exposed",
            StatusKind::Weaken => "Weaken",
            StatusKind::Root => "Root",
            StatusKind::Stun => "Stun",
        }
    }
}

/// Stack count plus remaining duration (unused for untimed kinds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSlot {
    pub stacks: u32,
    pub remaining: f32,
}

impl StatusSlot {
    pub fn is_active(&self) -> bool {
        self.stacks > 0
    }

    pub fn clear(&mut self) {
        self.stacks = 0;
        self.remaining = 0.0;
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub poison: StatusSlot,
    pub bleed: StatusSlot,
    pub slow: StatusSlot,
    pub brittle: StatusSlot,
    pub exposed: StatusSlot,
    pub weaken: StatusSlot,
    pub root: StatusSlot,
    pub stunned: bool,
    /// Last actor to apply poison (periodic damage attribution)
    pub poison_source: Option<ActorId>,
    /// Last actor to apply bleed
    pub bleed_source: Option<ActorId>,
}

impl StatusEffects {
    pub fn slot(&self, kind: StatusKind) -> Option<&StatusSlot> {
        match kind {
            StatusKind::Poison => Some(&self.poison),
            StatusKind::Bleed => Some(&self.bleed),
            StatusKind::Slow => Some(&self.slow),
            StatusKind::Brittle => Some(&self.brittle),
            StatusKind::Exposed => Some(&self.exposed),
            StatusKind::Weaken => Some(&self.weaken),
            StatusKind::Root => Some(&self.root),
            StatusKind::Stun => None,
        }
    }

    pub fn slot_mut(&mut self, kind: StatusKind) -> Option<&mut StatusSlot> {
        match kind {
            StatusKind::Poison => Some(&mut self.poison),
            StatusKind::Bleed => Some(&mut self.bleed),
            StatusKind::Slow => Some(&mut self.slow),
            StatusKind::Brittle => Some(&mut self.brittle),
            StatusKind::Exposed => Some(&mut self.exposed),
            StatusKind::Weaken => Some(&mut self.weaken),
            StatusKind::Root => Some(&mut self.root),
            StatusKind::Stun => None,
        }
    }

    pub fn stacks(&self, kind: StatusKind) -> u32 {
        match kind {
            StatusKind::Stun => u32::from(self.stunned),
            _ => self.slot(kind).map_or(0, |s| s.stacks),
        }
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.stacks(kind) > 0
    }

    pub fn clear(&mut self, kind: StatusKind) {
        match kind {
            StatusKind::Stun => self.stunned = false,
            _ => {
                if let Some(slot) = self.slot_mut(kind) {
                    slot.clear();
                }
                match kind {
                    StatusKind::Poison => self.poison_source = None,
                    StatusKind::Bleed => self.bleed_source = None,
                    _ => {}
                }
            }
        }
    }

    pub fn clear_stun(&mut self) {
        self.stunned = false;
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Movement speed multiplier from slow/root/stun.
    pub fn speed_multiplier(&self) -> f32 {
        if self.stunned || self.root.is_active() {
            return 0.0;
        }
        (1.0 - SLOW_PER_STACK * self.slow.stacks as f32).max(MIN_SLOW_MULTIPLIER)
    }

    pub fn can_act(&self) -> bool {
        !self.stunned
    }

    pub fn can_move(&self) -> bool {
        !self.stunned && !self.root.is_active()
    }

    /// Any harmful status currently active.
    pub fn debuff_count(&self) -> usize {
        StatusKind::ALL.iter().filter(|k| self.has(**k)).count()
    }
}
