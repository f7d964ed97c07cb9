//! Composite asset containers for Stowage.
//!
//! A [`Container`] owns an ordered list of references to sub-objects that a
//! [`StorageGateway`] keeps, unordered, next to it. Storage can change behind
//! the container's back, so the list is rebuilt by reconciliation:
//!
//! - [`reconcile`]: keeps surviving items in place, appends newly stored
//!   items in discovery order, drops items storage no longer has
//! - [`move_item`]: the only explicit reordering primitive
//! - [`TypeConstraintEvaluator`]: decides which types may be added
//!   (category rules, single-instance types, per-container filter chains)
//! - [`TypeRegistry`] / [`TypeCatalog`]: precomputed type metadata (ancestor
//!   chains, interfaces, toggle fields, sorted filter chains)
//! - [`ContainerSession`]: the editor-facing facade tying it together
//!
//! Everything runs synchronously on the caller's thread. A session assumes it
//! is the only writer of the containers it is handed.

mod config;
mod constraint;
mod container;
mod error;
mod lookup;
mod menu;
mod order;
mod reconcile;
mod registry;
mod session;
mod storage;
mod toggle;

pub use config::{ContainerConfig, NamingStyle};
pub use constraint::{Admission, FilterContext, Rejection, TypeConstraintEvaluator};
pub use container::{Container, MissingItem};
pub use error::{ContainerError, ContainerResult};
pub use menu::MenuItem;
pub use order::move_item;
pub use reconcile::{Reconciliation, SyncReport, reconcile};
pub use registry::{
    DEFAULT_MAX_HIERARCHY_DEPTH, FilterEntry, FilterFn, TypeCatalog, TypeRegistry,
    TypeRegistryBuilder,
};
pub use session::{AddOutcome, ContainerSession, MoveOutcome};
pub use storage::{MemoryStorage, StorageGateway};
pub use toggle::{ToggleHandle, aggregate_enabled, discover_toggle_fields, set_aggregate_enabled};

pub use stowage_model::{
    ContainerId, MenuEntry, ObjectId, SubObject, SubObjectKind, SubObjectRef, ToggleField,
    TypeCategory, TypeDescriptor, TypeKey,
};
