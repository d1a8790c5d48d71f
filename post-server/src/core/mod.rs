//! Core module - configuration, lifecycle and errors
//!
//! - [`Config`] - server configuration
//! - [`PostServer`] - explicitly owned service object with load/save lifecycle
//! - [`ServerError`] - lifecycle errors

pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{JoinOutcome, PostServer};
