//! Durable storage contracts: namespace snapshots and preference records.

pub mod prefs;
pub mod snapshot;
