//! # Blog Core
//!
//! The domain layer of the blog backend.
//! This crate contains posts, users and the ports the infrastructure implements,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
