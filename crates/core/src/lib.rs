//! Core types and shared functionality for the AMAP bot.
//!
//! This crate provides:
//! - Domain model (baskets, contracts)
//! - In-memory day-stamped cache slots
//! - Calendar helpers and the basket date resolver
//! - Contract change detection
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod calendar;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;

pub use cache::DaySlot;
pub use calendar::{Clock, DateResolver, FixedClock, MonthNames, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use diff::{ChangeKind, ContractChange, ContractDelta, diff_contracts};
pub use error::Error;
pub use model::{BasketDay, BasketSnapshot, Contract, ContractSnapshot};
