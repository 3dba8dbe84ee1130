//! Core types and utilities for aria
//!
//! This crate provides configuration, logging, the injected clock and the
//! in-memory conversation store shared by the other aria components.

pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
