//! Core types and trait definitions for the meetup backend.
//!
//! This crate has no HTTP or database dependencies.
//! The store and the REST layer both depend on it.

pub mod error;
pub mod event;
pub mod identity;
pub mod meet;
pub mod relationship;
pub mod repository;
pub mod user;

pub use error::{Error, Result};
pub use identity::{Identity, Role};
