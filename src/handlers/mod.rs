//! Bot handlers module
//!
//! This module contains the event handling core, organized by type:
//! - Command handling: classification, interception and execution
//! - Callback handling: routing of inline keyboard presses
//! - Wizards: button-driven parameter collection

pub mod callbacks;
pub mod commands;
pub mod flow;

// Re-export commonly used handler types
pub use callbacks::{CallbackHandler, CallbackOutcome, CallbackRouter};
pub use commands::{CommandClass, CommandInterceptor, CommandOutcome, CommandPipeline, CommandTable, InterceptState};
pub use flow::{FlowCallbackHandler, FlowEngine, FlowExecutor};
