//! Scheduler module
//!
//! Handles scheduled tasks, currently just the periodic series stats
//! refresh loop.

mod refresh_loop;

pub use refresh_loop::RefreshScheduler;
