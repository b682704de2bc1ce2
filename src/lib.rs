//! Core library for a blog application: the user/post domain model, the
//! persistence contract over SQLite, ownership checks for post mutation, and
//! the profile-image ingestion pipeline.
//!
//! The presentation layer (routing, templating, sessions) is deliberately
//! absent. Callers authenticate the acting principal themselves, hand this
//! crate already-parsed field values, and get back domain values or a
//! [`DomainError`] describing a distinct, user-actionable failure.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod media;

pub use domain::error::DomainError;
