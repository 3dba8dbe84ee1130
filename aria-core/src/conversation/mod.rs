//! Short-lived conversation memory
//!
//! Histories live only in process memory, are capped per client and are
//! forgotten after a period of inactivity by a periodic sweep.

pub mod entry;
pub mod store;
pub mod sweeper;

pub use entry::{ConversationEntry, ConversationHistory, Role};
pub use store::ConversationStore;
pub use sweeper::SweepService;

/// Maximum entries kept per client
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Idle time after which a conversation is forgotten (hours)
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Period of the eviction sweep (minutes)
pub const DEFAULT_SWEEP_INTERVAL_MINUTES: u64 = 60;

/// Largest accepted retention window (one year)
pub const MAX_RETENTION_HOURS: u64 = 24 * 365;

/// Largest accepted sweep period (one week)
pub const MAX_SWEEP_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
