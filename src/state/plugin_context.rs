//! Short-lived plugin selection memory
//!
//! A selection answered from the plugin menu is remembered for a window
//! (five minutes by default). Expiry is lazy: it is checked when the entry
//! is read and the stale entry is dropped then.

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, warn};
use crate::models::{Plugin, UserId};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::logging::log_context_change;

/// How long a selection stays valid
pub const DEFAULT_EXPIRY_SECONDS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginContextEntry {
    pub user_id: UserId,
    pub plugin: Plugin,
    /// Command that triggered the selection
    pub source_command: String,
    pub timestamp: DateTime<Utc>,
}

/// Owner of every user's plugin selection
#[derive(Debug)]
pub struct PluginContextManager {
    entries: DashMap<UserId, PluginContextEntry>,
    expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl PluginContextManager {
    pub fn new(expiry: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            expiry,
            clock,
        }
    }

    /// Five-minute window on the wall clock
    pub fn with_defaults() -> Self {
        Self::new(Duration::seconds(DEFAULT_EXPIRY_SECONDS), Arc::new(SystemClock))
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Store a selection given as raw text (`v3`, `v6` or `both`).
    /// Returns `false` without touching prior state if the value is invalid.
    pub fn set_context(&self, user_id: UserId, plugin: &str, source_command: &str) -> bool {
        match plugin.parse::<Plugin>() {
            Ok(plugin) => {
                self.set_plugin(user_id, plugin, source_command);
                true
            }
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Rejected plugin context");
                false
            }
        }
    }

    /// Store a selection, replacing any previous one and refreshing its timestamp
    pub fn set_plugin(&self, user_id: UserId, plugin: Plugin, source_command: &str) {
        let entry = PluginContextEntry {
            user_id,
            plugin,
            source_command: source_command.to_string(),
            timestamp: self.clock.now(),
        };
        self.entries.insert(user_id, entry);
        log_context_change(user_id, Some(plugin), Some(source_command));
    }

    /// The user's plugin if the selection is still inside its window
    pub fn get_context(&self, user_id: UserId) -> Option<Plugin> {
        self.get_entry(user_id).map(|entry| entry.plugin)
    }

    /// The full entry if still inside its window; a stale entry is removed
    pub fn get_entry(&self, user_id: UserId) -> Option<PluginContextEntry> {
        let now = self.clock.now();

        let entry = self.entries.get(&user_id).map(|e| e.value().clone())?;
        if self.is_fresh(&entry, now) {
            return Some(entry);
        }

        // Only drop the entry we judged stale; a concurrent refresh survives.
        let removed = self
            .entries
            .remove_if(&user_id, |_, current| current.timestamp == entry.timestamp)
            .is_some();
        if removed {
            debug!(user_id = user_id, plugin = entry.plugin.as_str(), "Plugin context expired");
        }
        None
    }

    pub fn clear_context(&self, user_id: UserId) {
        if self.entries.remove(&user_id).is_some() {
            log_context_change(user_id, None, None);
        }
    }

    pub fn has_active_context(&self, user_id: UserId) -> bool {
        self.get_context(user_id).is_some()
    }

    /// Number of selections still inside their window
    pub fn active_count(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| self.is_fresh(e.value(), now)).count()
    }

    fn is_fresh(&self, entry: &PluginContextEntry, now: DateTime<Utc>) -> bool {
        now - entry.timestamp <= self.expiry
    }
}

impl Default for PluginContextManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    fn manager() -> (PluginContextManager, ManualClock) {
        let clock = ManualClock::starting_now();
        let manager = PluginContextManager::new(
            Duration::seconds(DEFAULT_EXPIRY_SECONDS),
            Arc::new(clock.clone()),
        );
        (manager, clock)
    }

    #[test]
    fn test_round_trip_and_expiry() {
        let (manager, clock) = manager();

        assert!(manager.set_context(42, "v3", "buy"));
        assert_eq!(manager.get_context(42), Some(Plugin::V3));

        clock.advance(Duration::seconds(301));
        assert_eq!(manager.get_context(42), None);
        assert!(!manager.has_active_context(42));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let (manager, clock) = manager();
        manager.set_plugin(1, Plugin::V6, "positions");

        clock.advance(Duration::seconds(300));
        assert_eq!(manager.get_context(1), Some(Plugin::V6));

        clock.advance(Duration::seconds(1));
        assert_eq!(manager.get_context(1), None);
    }

    #[test]
    fn test_invalid_value_leaves_prior_state() {
        let (manager, _clock) = manager();
        manager.set_plugin(42, Plugin::Both, "pnl");

        assert!(!manager.set_context(42, "bogus", "buy"));
        assert_eq!(manager.get_context(42), Some(Plugin::Both));

        assert!(!manager.set_context(43, "", "buy"));
        assert_eq!(manager.get_context(43), None);
    }

    #[test]
    fn test_reset_refreshes_timestamp() {
        let (manager, clock) = manager();
        manager.set_plugin(9, Plugin::V3, "buy");

        clock.advance(Duration::seconds(200));
        manager.set_plugin(9, Plugin::V6, "sell");
        clock.advance(Duration::seconds(200));

        let entry = manager.get_entry(9).unwrap();
        assert_eq!(entry.plugin, Plugin::V6);
        assert_eq!(entry.source_command, "sell");
    }

    #[test]
    fn test_clear_context() {
        let (manager, _clock) = manager();
        manager.set_plugin(5, Plugin::V3, "positions");

        manager.clear_context(5);
        manager.clear_context(5);

        assert!(!manager.has_active_context(5));
    }

    #[test]
    fn test_active_count_ignores_stale_entries() {
        let (manager, clock) = manager();
        manager.set_plugin(1, Plugin::V3, "buy");
        clock.advance(Duration::seconds(250));
        manager.set_plugin(2, Plugin::V6, "sell");
        clock.advance(Duration::seconds(100));

        assert_eq!(manager.active_count(), 1);
    }
}
