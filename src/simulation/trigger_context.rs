//! Trigger Context
//!
//! One context is created per externally-initiated damage event and threaded by
//! `&mut` through every nested pipeline call made while resolving that event.
//! It bounds reactive fan-out three ways:
//! - total handlers fired (`depth`, monotonic within the event)
//! - handlers fired per [`TriggerKind`]
//! - new actors created (`spawns`)
//!
//! Contexts are never stored on the simulation; they are dropped when the
//! outermost `resolve` call returns.

use bevy::log::debug;
use serde::{Deserialize, Serialize};

use super::constants::{MAX_CHAIN_DEPTH, MAX_REPEATS_PER_KIND, MAX_SPAWNS_PER_EVENT};

/// Kinds of reactive triggers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Attacker-attributed, after damage lands
    OnHit,
    /// Defender-attributed, after damage lands and the defender survives
    OnDamageTaken,
    /// Attacker-attributed, after the target dies
    OnKill,
    /// Target-attributed, after it dies
    OnDeath,
    /// Fired when an on-hit effect applies a debuff
    OnDebuffApplied,
    /// Fired once per area pulse that hit at least one actor
    OnAreaDamage,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 6] = [
        TriggerKind::OnHit,
        TriggerKind::OnDamageTaken,
        TriggerKind::OnKill,
        TriggerKind::OnDeath,
        TriggerKind::OnDebuffApplied,
        TriggerKind::OnAreaDamage,
    ];

    fn index(self) -> usize {
        match self {
            TriggerKind::OnHit => 0,
            TriggerKind::OnDamageTaken => 1,
            TriggerKind::OnKill => 2,
            TriggerKind::OnDeath => 3,
            TriggerKind::OnDebuffApplied => 4,
            TriggerKind::OnAreaDamage => 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    depth: u32,
    fired: [u32; 6],
    spawns: u32,
    suppressed: u32,
}

impl TriggerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn spawns(&self) -> u32 {
        self.spawns
    }

    /// Trigger attempts refused by a cap during this event.
    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }

    pub fn times_fired(&self, kind: TriggerKind) -> u32 {
        self.fired[kind.index()]
    }

    pub fn can_trigger(&self, kind: TriggerKind) -> bool {
        self.depth < MAX_CHAIN_DEPTH && self.fired[kind.index()] < MAX_REPEATS_PER_KIND
    }

    /// Must be called immediately before running the handler for `kind`.
    pub fn record_trigger(&mut self, kind: TriggerKind) {
        self.depth += 1;
        self.fired[kind.index()] += 1;
    }

    pub fn can_spawn(&self) -> bool {
        self.spawns < MAX_SPAWNS_PER_EVENT
    }

    pub fn record_spawn(&mut self) {
        self.spawns += 1;
    }

    /// Check-and-record in one step, then hand the context to `handler`.
    ///
    /// Returns `false` (and runs nothing) when a cap refuses the trigger.
    pub fn fire<F>(&mut self, kind: TriggerKind, handler: F) -> bool
    where
        F: FnOnce(&mut TriggerContext),
    {
        if !self.can_trigger(kind) {
            self.suppressed += 1;
            debug!("{:?} suppressed at depth {}", kind, self.depth);
            return false;
        }
        self.record_trigger(kind);
        handler(self);
        true
    }

    /// Reserve one spawn slot. Returns `false` once the event's cap is reached.
    pub fn try_spawn(&mut self) -> bool {
        if !self.can_spawn() {
            self.suppressed += 1;
            debug!("Spawn refused after {} spawns", self.spawns);
            return false;
        }
        self.record_spawn();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_allows_every_kind() {
        let ctx = TriggerContext::new();
        for kind in TriggerKind::ALL {
            assert!(ctx.can_trigger(kind));
        }
        assert!(ctx.can_spawn());
    }

    #[test]
    fn test_repeat_cap_per_kind() {
        let mut ctx = TriggerContext::new();
        for _ in 0..MAX_REPEATS_PER_KIND {
            assert!(ctx.fire(TriggerKind::OnHit, |_| {}));
        }
        assert!(!ctx.can_trigger(TriggerKind::OnHit));
        assert!(ctx.can_trigger(TriggerKind::OnKill));
    }

    #[test]
    fn test_depth_cap_spans_kinds() {
        let mut ctx = TriggerContext::new();
        let mut fired = 0;
        for kind in TriggerKind::ALL {
            if ctx.fire(kind, |_| {}) {
                fired += 1;
            }
        }
        assert_eq!(fired, MAX_CHAIN_DEPTH);
        assert_eq!(ctx.depth(), MAX_CHAIN_DEPTH);
        assert_eq!(ctx.suppressed(), TriggerKind::ALL.len() as u32 - MAX_CHAIN_DEPTH);
    }

    #[test]
    fn test_nested_fire_shares_budget() {
        let mut ctx = TriggerContext::new();
        let mut runs = 0;
        ctx.fire(TriggerKind::OnHit, |ctx| {
            runs += 1;
            ctx.fire(TriggerKind::OnHit, |ctx| {
                runs += 1;
                let nested = ctx.fire(TriggerKind::OnHit, |_| {});
                assert!(!nested, "third OnHit must be refused");
            });
        });
        assert_eq!(runs, 2);
    }

    #[test]
    fn test_spawn_cap() {
        let mut ctx = TriggerContext::new();
        let granted = (0..20).filter(|_| ctx.try_spawn()).count() as u32;
        assert_eq!(granted, MAX_SPAWNS_PER_EVENT);
        assert!(!ctx.can_spawn());
    }
}
