//! Per-user wizard state
//!
//! Every user gets a private [`ConversationState`] scratchpad plus a stable
//! event lock. Both live in one slot per user so the lock handed out by
//! [`ConversationStateManager::get_lock`] never changes identity, even
//! after the state is cleared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use crate::models::UserId;

/// Lock serializing whole events for one user
pub type UserLock = Arc<tokio::sync::Mutex<()>>;

/// Wizard progress for a single user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationState {
    pub user_id: UserId,
    /// Wizard command; `None` means idle
    pub command: Option<String>,
    pub step: usize,
    /// Collected parameters in insertion order
    pub data: Map<String, Value>,
    pub breadcrumb: Vec<String>,
}

impl ConversationState {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            command: None,
            step: 0,
            data: Map::new(),
            breadcrumb: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.command.is_none()
    }

    /// Check if the user is inside the given wizard
    pub fn is_in_flow(&self, command: &str) -> bool {
        self.command.as_deref() == Some(command)
    }

    /// Reset to a fresh wizard for `command`
    pub fn start(&mut self, command: &str) {
        *self = Self::new(self.user_id);
        self.command = Some(command.to_string());
    }

    /// Reset to idle
    pub fn reset(&mut self) {
        *self = Self::new(self.user_id);
    }

    /// Set a parameter; re-adding a key replaces the value in place
    pub fn add_data(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Remove a parameter without disturbing the order of the others
    pub fn remove_data(&mut self, key: &str) {
        self.data.retain(|k, _| k != key);
    }

    pub fn next_step(&mut self) {
        self.step += 1;
    }

    pub fn previous_step(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn add_breadcrumb(&mut self, label: &str) {
        self.breadcrumb.push(label.to_string());
    }

    pub fn truncate_breadcrumb(&mut self, len: usize) {
        self.breadcrumb.truncate(len);
    }

    /// Collected parameters rendered as display strings, in order
    pub fn summary_pairs(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(key, value)| (key.clone(), value_to_display(value)))
            .collect()
    }
}

/// Render a collected value without JSON quoting
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug)]
struct UserSlot {
    state: Mutex<ConversationState>,
    lock: UserLock,
}

impl UserSlot {
    fn new(user_id: UserId) -> Self {
        Self {
            state: Mutex::new(ConversationState::new(user_id)),
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// Snapshot of wizard activity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationStats {
    pub tracked_users: usize,
    pub active_flows: usize,
    pub flows_by_command: HashMap<String, usize>,
}

/// Owner of every user's wizard state
#[derive(Debug, Default)]
pub struct ConversationStateManager {
    slots: DashMap<UserId, Arc<UserSlot>>,
}

impl ConversationStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, user_id: UserId) -> Arc<UserSlot> {
        Arc::clone(
            &self
                .slots
                .entry(user_id)
                .or_insert_with(|| Arc::new(UserSlot::new(user_id))),
        )
    }

    /// Get a snapshot of the user's state, creating an idle one if needed
    pub fn get_state(&self, user_id: UserId) -> ConversationState {
        self.update_flow(user_id, |state| state.clone())
    }

    /// Start a wizard, discarding whatever the user had in flight
    pub fn start_flow(&self, user_id: UserId, command: &str) -> ConversationState {
        let state = self.update_flow(user_id, |state| {
            state.start(command);
            state.clone()
        });
        debug!(user_id = user_id, command = command, "Flow started");
        state
    }

    /// Run `mutator` against the user's state with exclusive access.
    ///
    /// The mutator must not call back into this manager for the same user.
    pub fn update_flow<F, R>(&self, user_id: UserId, mutator: F) -> R
    where
        F: FnOnce(&mut ConversationState) -> R,
    {
        let slot = self.slot(user_id);
        let mut state = slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        mutator(&mut state)
    }

    pub fn add_data(&self, user_id: UserId, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.update_flow(user_id, |state| state.add_data(key, value));
    }

    pub fn next_step(&self, user_id: UserId) {
        self.update_flow(user_id, ConversationState::next_step);
    }

    pub fn add_breadcrumb(&self, user_id: UserId, label: &str) {
        self.update_flow(user_id, |state| state.add_breadcrumb(label));
    }

    /// Reset the user to idle. The user's lock is kept.
    pub fn clear_state(&self, user_id: UserId) {
        if let Some(slot) = self.slots.get(&user_id).map(|s| Arc::clone(s.value())) {
            slot.state.lock().unwrap_or_else(PoisonError::into_inner).reset();
            debug!(user_id = user_id, "Conversation state cleared");
        }
    }

    /// Finish the wizard and return the final state
    pub fn complete_flow(&self, user_id: UserId) -> ConversationState {
        let finished = self.update_flow(user_id, |state| {
            let finished = state.clone();
            state.reset();
            finished
        });
        debug!(user_id = user_id, command = ?finished.command, "Flow completed");
        finished
    }

    /// The user's event lock; identical for repeated calls
    pub fn get_lock(&self, user_id: UserId) -> UserLock {
        Arc::clone(&self.slot(user_id).lock)
    }

    pub fn stats(&self) -> ConversationStats {
        let slots: Vec<Arc<UserSlot>> = self.slots.iter().map(|e| Arc::clone(e.value())).collect();

        let mut stats = ConversationStats {
            tracked_users: slots.len(),
            ..Default::default()
        };

        for slot in slots {
            let state = slot.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(command) = &state.command {
                stats.active_flows += 1;
                *stats.flows_by_command.entry(command.clone()).or_insert(0) += 1;
            }
        }

        stats
    }
}
