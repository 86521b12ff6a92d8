//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain, infrastructure and
//! presentation layers: it owns the form state and runs the register,
//! refresh, clear and export actions.

pub mod state;

pub use state::*;
