//! cdp-admin
//!
//! Data core of the archive admin front end: typed models hydrated from
//! document snapshots, one query service per collection, document store
//! adapters, and the filter popup state machine.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod filters;
pub mod ports;
pub mod services;

pub use config::FirebaseConfig;
pub use error::{AppError, Result};
