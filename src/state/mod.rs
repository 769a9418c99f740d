//! State management module
//!
//! This module owns the per-user in-memory state: wizard progress and the
//! remembered plugin selection.

pub mod conversation;
pub mod flows;
pub mod plugin_context;

// Re-export commonly used state components
pub use conversation::{ConversationState, ConversationStateManager, ConversationStats, UserLock};
pub use flows::{FlowDefinition, FlowRegistry, FlowStep};
pub use plugin_context::{PluginContextEntry, PluginContextManager, DEFAULT_EXPIRY_SECONDS};
