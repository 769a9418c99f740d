//! Access control middleware
//!
//! Restricts the bot to the users listed in `bot.allowed_user_ids` and to
//! their private chats. An empty list leaves the bot open to everyone.

use std::collections::HashSet;
use tracing::debug;
use crate::config::BotConfig;
use crate::models::UserId;
use crate::utils::errors::{TradePilotError, Result};
use crate::utils::logging::log_access_denied;

#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed: HashSet<UserId>,
}

impl AccessGuard {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            allowed: config.allowed_user_ids.iter().copied().collect(),
        }
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn is_allowed(&self, user_id: UserId) -> bool {
        !self.is_restricted() || self.allowed.contains(&user_id)
    }

    /// Replies go to `ChatId(user_id)`, so only the user's private chat
    /// (whose id equals the user id) is served.
    pub fn check_chat(&self, user_id: UserId, chat_id: i64, what: &str) -> Result<()> {
        if chat_id != user_id {
            debug!(user_id = user_id, chat_id = chat_id, event = what, "Ignoring event outside private chat");
            return Err(TradePilotError::PermissionDenied(
                format!("Chat {} is not the private chat of user {}", chat_id, user_id)
            ));
        }
        self.check(user_id, what)
    }

    /// Check access for an event; `what` names the event for the log
    pub fn check(&self, user_id: UserId, what: &str) -> Result<()> {
        if self.is_allowed(user_id) {
            debug!(user_id = user_id, event = what, "Access granted");
            Ok(())
        } else {
            log_access_denied(user_id, what);
            Err(TradePilotError::PermissionDenied(
                format!("User {} is not allowed to use this bot", user_id)
            ))
        }
    }
}
