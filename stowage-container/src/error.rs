//! Error types for the container engine.
//!
//! Only contract violations and backend failures are errors. A type that
//! may not be added is reported as a [`crate::Rejection`] value instead.

use stowage_model::{ObjectId, TypeKey};
use thiserror::Error;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors that can occur in container operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A lookup was asked for a type that is neither a sub-object type nor
    /// an interface.
    #[error("invalid lookup type '{type_key}': {reason}")]
    InvalidLookupType { type_key: TypeKey, reason: String },

    #[error("unknown type: {0}")]
    UnknownType(TypeKey),

    #[error("type registered twice: {0}")]
    DuplicateType(TypeKey),

    #[error("invalid descriptor for '{type_key}': {reason}")]
    InvalidDescriptor { type_key: TypeKey, reason: String },

    #[error("invalid filter '{name}' on '{container}': {reason}")]
    InvalidFilter {
        container: TypeKey,
        name: String,
        reason: String,
    },

    #[error("type hierarchy of '{type_key}' exceeds {limit} levels")]
    HierarchyTooDeep { type_key: TypeKey, limit: usize },

    #[error("type hierarchy of '{type_key}' is cyclic")]
    HierarchyCycle { type_key: TypeKey },

    #[error("sub-object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Types(#[from] stowage_types::Error),
}
