//! Core type definitions for Stowage.
//!
//! This crate defines the identity primitives shared by every layer of a
//! composite asset:
//! - Container and sub-object identifiers (UUID v7)
//! - [`TypeKey`], the qualified name that stands in for a runtime type
//!
//! Behavioral types (descriptors, the registry, reconciliation) live in
//! `stowage-model` and `stowage-container`.

mod ids;
mod type_key;

pub use ids::{ContainerId, ObjectId};
pub use type_key::TypeKey;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid type key: {0:?}")]
    InvalidTypeKey(String),
}
