//! Type constraints: which sub-object types a container will accept.
//!
//! `can_add` checks, in order and stopping at the first failure:
//! 1. the type is a registered, concrete, non-generic sub-object type and is
//!    not (and does not derive from) a container type
//! 2. if the type is marked `disallow_multiple`, no instance of it or a
//!    subtype is already in the container
//! 3. the container type's filter chain keeps the type
//!
//! # Reentrancy
//!
//! Filters receive a [`FilterContext`] and may call [`FilterContext::can_add`]
//! to ask about other types. While a chain runs, the evaluator's guard flag
//! is set and any nested `can_add` skips step 3 (answering for steps 1-2
//! only). Without the guard, a filter that consults `can_add` would run the
//! chain again, which would call the filter again, without end.

use crate::container::Container;
use crate::registry::TypeRegistry;
use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use stowage_model::{SubObjectRef, TypeCategory, TypeKey};
use tracing::{debug, trace};

/// Why a type may not be added to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownType(TypeKey),
    NotSubObject {
        type_key: TypeKey,
        category: TypeCategory,
    },
    Abstract(TypeKey),
    Generic(TypeKey),
    NestedContainer(TypeKey),
    BrokenHierarchy(TypeKey),
    AlreadyPresent {
        type_key: TypeKey,
        existing: SubObjectRef,
    },
    FilteredOut {
        type_key: TypeKey,
        /// The filter that removed the type; `None` when it was dropped by
        /// the post-chain cleanup.
        filter: Option<String>,
    },
}

impl Rejection {
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        match self {
            Self::UnknownType(key)
            | Self::Abstract(key)
            | Self::Generic(key)
            | Self::NestedContainer(key)
            | Self::BrokenHierarchy(key) => key,
            Self::NotSubObject { type_key, .. }
            | Self::AlreadyPresent { type_key, .. }
            | Self::FilteredOut { type_key, .. } => type_key,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(key) => write!(f, "'{key}' is not a registered type"),
            Self::NotSubObject { type_key, category } => {
                write!(f, "'{type_key}' is a {category:?} type, not a sub-object type")
            }
            Self::Abstract(key) => write!(f, "'{key}' is abstract and cannot be created"),
            Self::Generic(key) => write!(f, "'{key}' is generic and cannot be created"),
            Self::NestedContainer(key) => {
                write!(f, "'{key}' is a container; containers cannot be nested")
            }
            Self::BrokenHierarchy(key) => {
                write!(f, "the type hierarchy of '{key}' is broken")
            }
            Self::AlreadyPresent { type_key, existing } => write!(
                f,
                "'{type_key}' allows only one instance per container and {} already exists",
                existing.id()
            ),
            Self::FilteredOut {
                type_key,
                filter: Some(filter),
            } => write!(f, "'{type_key}' is not accepted by this container ({filter})"),
            Self::FilteredOut {
                type_key,
                filter: None,
            } => write!(f, "'{type_key}' is not accepted by this container"),
        }
    }
}

/// The answer to "may this type be added?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected(Rejection),
}

impl Admission {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Allowed => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    /// Human-readable reason for display, `None` when allowed.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.rejection().map(ToString::to_string)
    }
}

/// What a filter sees while it runs.
pub struct FilterContext<'a> {
    registry: &'a TypeRegistry,
    container: &'a Container,
    evaluator: &'a TypeConstraintEvaluator,
}

impl<'a> FilterContext<'a> {
    #[must_use]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[must_use]
    pub fn container(&self) -> &'a Container {
        self.container
    }

    /// Whether `candidate` is `target`, derives from it, or implements it.
    #[must_use]
    pub fn is_assignable(&self, candidate: &TypeKey, target: &TypeKey) -> bool {
        self.registry.is_assignable(candidate, target)
    }

    /// Nested admission check. The filter chain stage is skipped here.
    #[must_use]
    pub fn can_add(&self, type_key: &TypeKey) -> Admission {
        self.evaluator
            .can_add(self.registry, self.container, type_key)
    }

    /// Nested filtering. Only the post-chain cleanup runs here.
    pub fn filter_types(&self, candidates: &mut Vec<TypeKey>) {
        self.evaluator
            .filter_types(self.registry, self.container, candidates);
    }
}

/// Evaluates type constraints for one editing session.
///
/// Holds the reentrancy guard described in the module docs. It is a plain
/// `Cell`: an evaluator belongs to a single session on a single thread.
#[derive(Debug, Default)]
pub struct TypeConstraintEvaluator {
    filtering: Cell<bool>,
}

/// Sets the guard for its lifetime and restores the previous value after,
/// also when a filter panics.
struct ChainGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> ChainGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl TypeConstraintEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a filter chain is running on this evaluator.
    #[must_use]
    pub fn is_filtering(&self) -> bool {
        self.filtering.get()
    }

    /// Decides whether `type_key` may be added to `container`.
    pub fn can_add(
        &self,
        registry: &TypeRegistry,
        container: &Container,
        type_key: &TypeKey,
    ) -> Admission {
        if let Err(rejection) = check_structure(registry, type_key) {
            return Admission::Rejected(rejection);
        }

        let disallow_multiple = registry
            .descriptor(type_key)
            .is_some_and(|d| d.disallow_multiple);
        if disallow_multiple {
            let existing = container
                .references()
                .find(|r| registry.is_assignable(r.type_key(), type_key));
            if let Some(existing) = existing {
                return Admission::Rejected(Rejection::AlreadyPresent {
                    type_key: type_key.clone(),
                    existing: existing.clone(),
                });
            }
        }

        if self.filtering.get() {
            trace!(type_key = %type_key, "Nested admission check, filter chain skipped");
            return Admission::Allowed;
        }

        let mut candidates = vec![type_key.clone()];
        let removed_by = self.run_chain(registry, container, &mut candidates, Some(type_key));
        if candidates.contains(type_key) {
            Admission::Allowed
        } else {
            Admission::Rejected(Rejection::FilteredOut {
                type_key: type_key.clone(),
                filter: removed_by,
            })
        }
    }

    /// Runs the container type's filter chain over `candidates`, then drops
    /// anything that is not a registered sub-object type, plus duplicates.
    ///
    /// Called from inside a running chain, only the cleanup is applied.
    pub fn filter_types(
        &self,
        registry: &TypeRegistry,
        container: &Container,
        candidates: &mut Vec<TypeKey>,
    ) {
        if self.filtering.get() {
            debug!(
                container_type = %container.type_key(),
                "filter_types called from a running filter chain, chain skipped"
            );
            retain_valid(registry, candidates);
            return;
        }
        self.run_chain(registry, container, candidates, None);
    }

    /// Returns the name of the first filter after which `watch` was no
    /// longer among the candidates.
    fn run_chain(
        &self,
        registry: &TypeRegistry,
        container: &Container,
        candidates: &mut Vec<TypeKey>,
        watch: Option<&TypeKey>,
    ) -> Option<String> {
        let _guard = ChainGuard::enter(&self.filtering);
        let ctx = FilterContext {
            registry,
            container,
            evaluator: self,
        };

        let mut removed_by = None;
        for entry in registry.filters_for(container.type_key()) {
            entry.apply(&ctx, candidates);
            trace!(
                filter = entry.qualified_name(),
                priority = entry.priority(),
                remaining = candidates.len(),
                "Applied type filter"
            );
            if let Some(watched) = watch {
                if removed_by.is_none() && !candidates.contains(watched) {
                    removed_by = Some(entry.qualified_name().to_string());
                }
            }
        }

        retain_valid(registry, candidates);
        removed_by
    }
}

fn check_structure(registry: &TypeRegistry, type_key: &TypeKey) -> Result<(), Rejection> {
    let Some(descriptor) = registry.descriptor(type_key) else {
        return Err(Rejection::UnknownType(type_key.clone()));
    };
    match descriptor.category {
        TypeCategory::SubObject => {}
        TypeCategory::Container => return Err(Rejection::NestedContainer(type_key.clone())),
        category => {
            return Err(Rejection::NotSubObject {
                type_key: type_key.clone(),
                category,
            });
        }
    }
    if descriptor.is_abstract {
        return Err(Rejection::Abstract(type_key.clone()));
    }
    if descriptor.is_generic {
        return Err(Rejection::Generic(type_key.clone()));
    }
    match registry.is_container_type(type_key) {
        Ok(false) => Ok(()),
        Ok(true) => Err(Rejection::NestedContainer(type_key.clone())),
        Err(_) => Err(Rejection::BrokenHierarchy(type_key.clone())),
    }
}

fn retain_valid(registry: &TypeRegistry, candidates: &mut Vec<TypeKey>) {
    let mut seen = HashSet::new();
    candidates.retain(|key| {
        registry.category(key) == Some(TypeCategory::SubObject) && seen.insert(key.clone())
    });
}
