//! Sub-object model for Stowage.
//!
//! Defines the plain data that the container engine reasons about:
//! - [`SubObject`]: a stored item (id, type key, name, JSON payload)
//! - [`SubObjectRef`]: the identity handle a container keeps in its item list
//! - [`TypeDescriptor`]: declares a type's category, parent, interfaces,
//!   toggle fields and add-menu entry
//! - [`SubObjectKind`]: ties a Rust type to its [`TypeKey`] for typed lookups
//!
//! Nothing here knows about ordering or storage; see `stowage-container`.

mod descriptor;
mod kind;
mod object;
mod reference;

pub use descriptor::{MenuEntry, ToggleField, TypeCategory, TypeDescriptor};
pub use kind::SubObjectKind;
pub use object::SubObject;
pub use reference::SubObjectRef;
pub use stowage_types::{ContainerId, ObjectId, TypeKey};
