//! Reconciliation of a container's ordered item list with storage.
//!
//! Storage reports an unordered set of stored sub-objects; the container
//! keeps the order. [`reconcile`] merges the two:
//! - items still in storage keep their relative order
//! - stored items the list does not know are appended, in the order storage
//!   reported them, and reported as added
//! - items storage no longer has (and unresolved entries) are dropped
//!
//! Reconciling an already reconciled list against the same snapshot is a
//! no-op with nothing added.

use std::collections::{HashMap, HashSet};
use stowage_model::{ObjectId, SubObjectRef};

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub items: Vec<SubObjectRef>,
    pub report: SyncReport,
}

/// What a sync changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Newly discovered items, in the order they were appended.
    pub added: Vec<SubObjectRef>,
    /// Dropped entries in their former order; `None` for unresolved ones.
    pub removed: Vec<Option<SubObjectRef>>,
}

impl SyncReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Merges `current` (the container's list) with `snapshot` (storage).
///
/// Survivors take the type key storage reports, so a retyped object is
/// picked up without moving. Duplicate entries collapse onto their first
/// position. Runs in O(n + m).
pub fn reconcile(current: &[Option<SubObjectRef>], snapshot: &[SubObjectRef]) -> Reconciliation {
    let mut stored: HashMap<ObjectId, &SubObjectRef> = HashMap::with_capacity(snapshot.len());
    for reference in snapshot {
        stored.entry(reference.id()).or_insert(reference);
    }

    let mut placed: HashSet<ObjectId> = HashSet::with_capacity(snapshot.len());
    let mut items = Vec::with_capacity(snapshot.len());
    let mut report = SyncReport::default();

    for slot in current {
        match slot {
            Some(reference) => match stored.get(&reference.id()) {
                Some(fresh) => {
                    if placed.insert(reference.id()) {
                        items.push((*fresh).clone());
                    }
                }
                None => report.removed.push(Some(reference.clone())),
            },
            None => report.removed.push(None),
        }
    }

    for reference in snapshot {
        if placed.insert(reference.id()) {
            items.push(reference.clone());
            report.added.push(reference.clone());
        }
    }

    Reconciliation { items, report }
}
