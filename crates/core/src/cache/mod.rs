//! In-memory, day-stamped caches for scraped snapshots.
//!
//! Each data kind gets one slot holding at most one payload together with the
//! calendar date it was stored. A slot is fresh only on that same date; there
//! is no other eviction. Nothing is persisted, a restart starts cold.

pub mod slot;

pub use slot::DaySlot;
