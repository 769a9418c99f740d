//! Utility modules
//!
//! This module contains common utilities used throughout the application,
//! including error handling, logging setup, and the injectable clock.

pub mod clock;
pub mod errors;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{TradePilotError, Result};
