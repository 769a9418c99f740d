//! Test helpers module
//!
//! This module provides a unified test context wiring a dispatcher to
//! recording collaborators and a manual clock.

#![allow(dead_code)]

pub mod test_context;

pub use test_context::*;
