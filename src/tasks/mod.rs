//! Background Tasks Module
//!
//! - TTL cleanup: sweeps expired entries out of the in-memory store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
