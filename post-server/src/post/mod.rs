//! Post workflows: post, receive, cancel, listings, player registry
//!
//! Built on [`OrdersManager`](crate::orders::OrdersManager); game access
//! goes through [`GameHost`].

pub mod error;
pub mod host;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use host::{GameHost, Notice};
pub use service::PostService;
