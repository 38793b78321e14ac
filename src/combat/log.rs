//! Combat logging
//!
//! The structured narrative of what the pipeline did. Only the most recent
//! [`COMBAT_LOG_CAPACITY`] entries are kept; the oldest are dropped first.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::simulation::constants::COMBAT_LOG_CAPACITY;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Timestamp in simulation time (seconds since the run started)
    pub timestamp: f32,
    /// The type of event
    pub kind: CombatLogEventType,
    /// Who caused it
    pub source: String,
    /// Who it happened to, if anyone
    pub target: Option<String>,
    /// Damage, healing, stacks, etc.
    pub value: Option<f32>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatLogEventType {
    Damage,
    /// Hit avoided by invulnerability
    Dodge,
    /// Damage soaked by a shield
    Absorb,
    Healing,
    AbilityUsed,
    AuraApplied,
    AuraRemoved,
    Death,
    /// Boss phase transition
    PhaseChange,
    Spawn,
    /// Run event (start, end, etc.)
    MatchEvent,
}

/// The combat log storing recent events
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatLog {
    entries: VecDeque<CombatLogEntry>,
    /// Current simulation time, stamped onto new entries
    pub match_time: f32,
    /// Entries dropped because of the capacity limit
    pub dropped: usize,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
        self.dropped = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries.iter()
    }

    fn push(&mut self, entry: CombatLogEntry) {
        if self.entries.len() >= COMBAT_LOG_CAPACITY {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }

    /// Add an entry with full structured data
    pub fn record(
        &mut self,
        kind: CombatLogEventType,
        source: impl Into<String>,
        target: Option<String>,
        value: Option<f32>,
        message: String,
    ) {
        let timestamp = self.match_time;
        self.push(CombatLogEntry {
            timestamp,
            kind,
            source: source.into(),
            target,
            value,
            message,
        });
    }

    /// Add a free-form entry with no source actor
    pub fn log(&mut self, kind: CombatLogEventType, message: String) {
        self.record(kind, "run", None, None, message);
    }

    pub fn log_damage(&mut self, source: String, target: String, amount: f32, message: String) {
        self.record(CombatLogEventType::Damage, source, Some(target), Some(amount), message);
    }

    pub fn log_healing(&mut self, source: String, target: String, amount: f32, message: String) {
        self.record(CombatLogEventType::Healing, source, Some(target), Some(amount), message);
    }

    pub fn log_death(&mut self, victim: String, killer: Option<String>, message: String) {
        self.record(CombatLogEventType::Death, victim, killer, None, message);
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, kind: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries.iter().filter(|e| e.kind == kind).collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).collect()
    }

    pub fn total_damage_dealt(&self, source: &str) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.kind == CombatLogEventType::Damage && e.source == source)
            .filter_map(|e| e.value)
            .sum()
    }

    pub fn total_damage_taken(&self, target: &str) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.kind == CombatLogEventType::Damage && e.target.as_deref() == Some(target))
            .filter_map(|e| e.value)
            .sum()
    }

    /// Deaths credited to `killer`
    pub fn kill_count(&self, killer: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == CombatLogEventType::Death && e.target.as_deref() == Some(killer))
            .count()
    }

    /// Damage totals grouped by source
    pub fn damage_by_source(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.filter_by_type(CombatLogEventType::Damage) {
            *totals.entry(entry.source.clone()).or_insert(0.0) += entry.value.unwrap_or(0.0);
        }
        totals
    }

    /// Write the log as pretty JSON. Returns the path written.
    pub fn save_to_file(&self, path: Option<&str>) -> Result<String, String> {
        let filename = path
            .map(str::to_string)
            .unwrap_or_else(|| format!("combat_log_{:.0}.json", self.match_time * 1000.0));
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))?;
        std::fs::write(&filename, json).map_err(|e| format!("Failed to write {}: {}", filename, e))?;
        info!("Combat log written to {}", filename);
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_capped() {
        let mut log = CombatLog::default();
        for i in 0..(COMBAT_LOG_CAPACITY + 25) {
            log.log(CombatLogEventType::MatchEvent, format!("event {}", i));
        }
        assert_eq!(log.len(), COMBAT_LOG_CAPACITY);
        assert_eq!(log.dropped, 25);
        let first = log.entries().next().map(|e| e.message.clone());
        assert_eq!(first.as_deref(), Some("event 25"));
    }

    #[test]
    fn test_recent_keeps_order() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEventType::MatchEvent, format!("{}", i));
        }
        let recent: Vec<_> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(recent, vec!["3", "4"]);
    }
}
