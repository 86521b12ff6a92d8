//! regdesk - Terminal User Registration Library
//!
//! A single-screen terminal form that registers users (name and email),
//! keeps them in local key-value storage, lists them and clears them.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
