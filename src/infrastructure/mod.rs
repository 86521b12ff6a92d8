//! Infrastructure layer providing external service integrations.
//!
//! This module contains the key-value backends, the record repository
//! bound to them, CSV export, and process configuration and logging.

pub mod config;
pub mod export;
pub mod logging;
pub mod persistence;
pub mod store;

pub use config::*;
pub use export::*;
pub use logging::*;
pub use persistence::*;
pub use store::*;
