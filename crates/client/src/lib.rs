//! Client code for the AMAP site.
//!
//! This crate provides the authenticated fetch session, HTML extraction of
//! baskets and contracts, and the cached service shared by the bot and CLI.

pub mod extract;
pub mod fetch;
pub mod service;

pub use extract::{extract_basket, extract_contracts};
pub use fetch::{Credentials, FetchConfig, HttpTransport, Page, Session, SiteUrls, Transport};
pub use service::{AmapService, SetupError};
