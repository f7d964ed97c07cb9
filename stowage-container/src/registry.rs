//! Type registry: precomputed metadata for every registered type.
//!
//! Built once from [`TypeDescriptor`]s and filter entries, then shared
//! read-only. Per type it caches:
//! - the ancestor chain (nearest parent first), bounded by a depth limit
//! - every interface the type implements, directly or through ancestors
//! - the flattened toggle fields of the type and its ancestors
//!
//! Per container type it caches the filter chain, sorted by priority and
//! then by qualified name so evaluation order never depends on
//! registration order.
//!
//! A broken hierarchy (cyclic, or deeper than the limit) does not fail the
//! build. It is logged and recorded; operations that need the chain report
//! [`ContainerError::HierarchyTooDeep`] / [`ContainerError::HierarchyCycle`]
//! or fall back to exact-type behavior.

use crate::constraint::FilterContext;
use crate::error::{ContainerError, ContainerResult};
use crate::toggle::ToggleHandle;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use stowage_model::{TypeCategory, TypeDescriptor, TypeKey};
use tracing::{debug, error};

/// Default bound on ancestor chain length.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 64;

/// A filter callback: narrows the candidate type list in place.
pub type FilterFn = Arc<dyn Fn(&FilterContext<'_>, &mut Vec<TypeKey>) + Send + Sync>;

/// One stage of a container type's filter chain.
#[derive(Clone)]
pub struct FilterEntry {
    priority: i32,
    qualified_name: String,
    filter: FilterFn,
}

impl FilterEntry {
    /// `qualified_name` identifies the filter (e.g. `"food::FruitBasket::only_fruit"`)
    /// and breaks priority ties. Lower priority runs first.
    pub fn new<F>(priority: i32, qualified_name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&FilterContext<'_>, &mut Vec<TypeKey>) + Send + Sync + 'static,
    {
        Self {
            priority,
            qualified_name: qualified_name.into(),
            filter: Arc::new(filter),
        }
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub(crate) fn apply(&self, ctx: &FilterContext<'_>, candidates: &mut Vec<TypeKey>) {
        (self.filter)(ctx, candidates);
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("priority", &self.priority)
            .field("qualified_name", &self.qualified_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum Ancestry {
    Chain(Vec<TypeKey>),
    TooDeep,
    Cyclic,
}

#[derive(Debug)]
struct RegisteredType {
    descriptor: TypeDescriptor,
    ancestry: Ancestry,
    interfaces: HashSet<TypeKey>,
    toggles: Vec<ToggleHandle>,
}

/// Immutable, precomputed type metadata. Share it behind an `Arc`.
#[derive(Debug)]
pub struct TypeRegistry {
    types: HashMap<TypeKey, RegisteredType>,
    /// Registration order, for deterministic enumeration.
    order: Vec<TypeKey>,
    filters: HashMap<TypeKey, Vec<FilterEntry>>,
    max_depth: usize,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    #[must_use]
    pub fn descriptor(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key).map(|t| &t.descriptor)
    }

    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    #[must_use]
    pub fn category(&self, key: &TypeKey) -> Option<TypeCategory> {
        self.descriptor(key).map(|d| d.category)
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().filter_map(|key| self.descriptor(key))
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Ancestors of `key`, nearest parent first. Unregistered keys have none.
    pub fn ancestors(&self, key: &TypeKey) -> ContainerResult<&[TypeKey]> {
        let Some(registered) = self.types.get(key) else {
            return Ok(&[]);
        };
        match &registered.ancestry {
            Ancestry::Chain(chain) => Ok(chain),
            Ancestry::TooDeep => Err(ContainerError::HierarchyTooDeep {
                type_key: key.clone(),
                limit: self.max_depth,
            }),
            Ancestry::Cyclic => Err(ContainerError::HierarchyCycle {
                type_key: key.clone(),
            }),
        }
    }

    /// True when `candidate` is `target`, derives from it, or implements it.
    ///
    /// A candidate with a broken hierarchy only matches itself.
    #[must_use]
    pub fn is_assignable(&self, candidate: &TypeKey, target: &TypeKey) -> bool {
        if candidate == target {
            return true;
        }
        let Some(registered) = self.types.get(candidate) else {
            return false;
        };
        match &registered.ancestry {
            Ancestry::Chain(chain) => {
                chain.contains(target) || registered.interfaces.contains(target)
            }
            Ancestry::TooDeep | Ancestry::Cyclic => false,
        }
    }

    /// True when `key` is a container type or derives from one.
    pub fn is_container_type(&self, key: &TypeKey) -> ContainerResult<bool> {
        if self.category(key) == Some(TypeCategory::Container) {
            return Ok(true);
        }
        Ok(self
            .ancestors(key)?
            .iter()
            .any(|a| self.category(a) == Some(TypeCategory::Container)))
    }

    /// Toggle fields of `key` and its ancestors, most-derived level first.
    /// Unregistered types have none.
    pub fn toggle_fields(&self, key: &TypeKey) -> ContainerResult<&[ToggleHandle]> {
        self.ancestors(key)?;
        Ok(self
            .types
            .get(key)
            .map(|t| t.toggles.as_slice())
            .unwrap_or_default())
    }

    /// The filter chain declared on exactly this container type, in
    /// evaluation order. Chains of parent container types are not inherited.
    #[must_use]
    pub fn filters_for(&self, container_type: &TypeKey) -> &[FilterEntry] {
        self.filters
            .get(container_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Collects descriptors and filters, validates them, and builds a registry.
#[derive(Debug, Clone)]
pub struct TypeRegistryBuilder {
    descriptors: Vec<TypeDescriptor>,
    filters: Vec<(TypeKey, FilterEntry)>,
    max_depth: usize,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            filters: Vec::new(),
            max_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }

    #[must_use]
    pub fn max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    #[must_use]
    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    #[must_use]
    pub fn register_filter(mut self, container_type: TypeKey, entry: FilterEntry) -> Self {
        self.filters.push((container_type, entry));
        self
    }

    pub fn build(self) -> ContainerResult<TypeRegistry> {
        let mut by_key: HashMap<TypeKey, TypeDescriptor> = HashMap::new();
        let mut order = Vec::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            if by_key.contains_key(&descriptor.key) {
                return Err(ContainerError::DuplicateType(descriptor.key));
            }
            order.push(descriptor.key.clone());
            by_key.insert(descriptor.key.clone(), descriptor);
        }

        for descriptor in by_key.values() {
            validate_descriptor(descriptor, &by_key)?;
        }

        let ancestries: HashMap<TypeKey, Ancestry> = by_key
            .keys()
            .map(|key| (key.clone(), resolve_ancestry(key, &by_key, self.max_depth)))
            .collect();

        let mut types = HashMap::with_capacity(by_key.len());
        for key in &order {
            let ancestry = ancestries[key].clone();
            let (interfaces, toggles) = match &ancestry {
                Ancestry::Chain(chain) => (
                    collect_interfaces(key, chain, &by_key, &ancestries),
                    collect_toggles(key, chain, &by_key),
                ),
                broken => {
                    error!(
                        type_key = %key,
                        limit = self.max_depth,
                        "Broken type hierarchy ({:?}); traversals over it are disabled",
                        broken
                    );
                    (HashSet::new(), Vec::new())
                }
            };
            let descriptor = by_key[key].clone();
            types.insert(
                key.clone(),
                RegisteredType {
                    descriptor,
                    ancestry,
                    interfaces,
                    toggles,
                },
            );
        }

        let mut filters: HashMap<TypeKey, Vec<FilterEntry>> = HashMap::new();
        for (container, entry) in self.filters {
            validate_filter(&container, &entry, &by_key)?;
            let chain = filters.entry(container.clone()).or_default();
            if chain
                .iter()
                .any(|e| e.qualified_name == entry.qualified_name)
            {
                return Err(ContainerError::InvalidFilter {
                    container,
                    name: entry.qualified_name,
                    reason: "qualified name declared twice".to_string(),
                });
            }
            chain.push(entry);
        }
        for chain in filters.values_mut() {
            chain.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| a.qualified_name.cmp(&b.qualified_name))
            });
        }

        debug!(
            types = types.len(),
            filter_chains = filters.len(),
            "Type registry built"
        );

        Ok(TypeRegistry {
            types,
            order,
            filters,
            max_depth: self.max_depth,
        })
    }
}

fn invalid(descriptor: &TypeDescriptor, reason: impl Into<String>) -> ContainerError {
    ContainerError::InvalidDescriptor {
        type_key: descriptor.key.clone(),
        reason: reason.into(),
    }
}

fn validate_descriptor(
    descriptor: &TypeDescriptor,
    by_key: &HashMap<TypeKey, TypeDescriptor>,
) -> ContainerResult<()> {
    if let Some(parent) = &descriptor.parent {
        if !by_key.contains_key(parent) {
            return Err(invalid(descriptor, format!("unknown parent type '{parent}'")));
        }
    }

    for interface in &descriptor.interfaces {
        match by_key.get(interface).map(|d| d.category) {
            Some(TypeCategory::Interface) => {}
            Some(other) => {
                return Err(invalid(
                    descriptor,
                    format!("'{interface}' is {other:?}, not an interface"),
                ));
            }
            None => {
                return Err(invalid(descriptor, format!("unknown interface '{interface}'")));
            }
        }
    }

    for toggle in &descriptor.toggles {
        if !toggle.pointer.starts_with('/') {
            return Err(invalid(
                descriptor,
                format!("toggle pointer {:?} must start with '/'", toggle.pointer),
            ));
        }
        match descriptor.defaults.pointer(&toggle.pointer) {
            None | Some(serde_json::Value::Bool(_)) => {}
            Some(other) => {
                return Err(invalid(
                    descriptor,
                    format!("toggle {:?} defaults to non-boolean {other}", toggle.pointer),
                ));
            }
        }
    }

    if let Some(owner) = &descriptor.owner_field {
        if !owner.starts_with('/') {
            return Err(invalid(
                descriptor,
                format!("owner field {owner:?} must start with '/'"),
            ));
        }
    }

    if !(descriptor.defaults.is_null() || descriptor.defaults.is_object()) {
        return Err(invalid(descriptor, "defaults must be a JSON object"));
    }

    Ok(())
}

fn validate_filter(
    container: &TypeKey,
    entry: &FilterEntry,
    by_key: &HashMap<TypeKey, TypeDescriptor>,
) -> ContainerResult<()> {
    let fail = |reason: &str| ContainerError::InvalidFilter {
        container: container.clone(),
        name: entry.qualified_name.clone(),
        reason: reason.to_string(),
    };
    if entry.qualified_name.trim().is_empty() {
        return Err(fail("qualified name is empty"));
    }
    match by_key.get(container).map(|d| d.category) {
        Some(TypeCategory::Container) => Ok(()),
        Some(_) => Err(fail("filters can only be declared on container types")),
        None => Err(fail("container type is not registered")),
    }
}

/// Walks parent links iteratively, bounded by `max_depth`.
fn resolve_ancestry(
    key: &TypeKey,
    by_key: &HashMap<TypeKey, TypeDescriptor>,
    max_depth: usize,
) -> Ancestry {
    let mut chain = Vec::new();
    let mut seen: HashSet<&TypeKey> = HashSet::from([key]);
    let mut current = by_key.get(key).and_then(|d| d.parent.as_ref());
    while let Some(parent) = current {
        if !seen.insert(parent) {
            return Ancestry::Cyclic;
        }
        if chain.len() == max_depth {
            return Ancestry::TooDeep;
        }
        chain.push(parent.clone());
        current = by_key.get(parent).and_then(|d| d.parent.as_ref());
    }
    Ancestry::Chain(chain)
}

/// Interfaces implemented by `key` or its ancestors, closed over interface
/// inheritance: both an interface's parents and the interfaces it declares.
fn collect_interfaces(
    key: &TypeKey,
    chain: &[TypeKey],
    by_key: &HashMap<TypeKey, TypeDescriptor>,
    ancestries: &HashMap<TypeKey, Ancestry>,
) -> HashSet<TypeKey> {
    let mut pending: Vec<&TypeKey> = std::iter::once(key)
        .chain(chain)
        .filter_map(|level| by_key.get(level))
        .flat_map(|d| d.interfaces.iter())
        .collect();

    let mut interfaces = HashSet::new();
    while let Some(interface) = pending.pop() {
        if !interfaces.insert(interface.clone()) {
            continue;
        }
        if let Some(Ancestry::Chain(parents)) = ancestries.get(interface) {
            pending.extend(parents);
        }
        if let Some(descriptor) = by_key.get(interface) {
            pending.extend(&descriptor.interfaces);
        }
    }
    interfaces
}

fn collect_toggles(
    key: &TypeKey,
    chain: &[TypeKey],
    by_key: &HashMap<TypeKey, TypeDescriptor>,
) -> Vec<ToggleHandle> {
    let mut seen = HashSet::new();
    let mut toggles = Vec::new();
    for level in std::iter::once(key).chain(chain) {
        let Some(descriptor) = by_key.get(level) else {
            continue;
        };
        for toggle in &descriptor.toggles {
            if seen.insert(toggle.pointer.as_str()) {
                toggles.push(ToggleHandle::new(level.clone(), toggle.pointer.clone()));
            }
        }
    }
    toggles
}

#[derive(Debug)]
struct CatalogState {
    descriptors: Vec<TypeDescriptor>,
    filters: Vec<(TypeKey, FilterEntry)>,
    max_depth: usize,
    built: Option<Arc<TypeRegistry>>,
}

/// The mutable, process-wide face of the registry.
///
/// Registering or replacing a type or filter invalidates the cached
/// registry; the next [`TypeCatalog::registry`] call rebuilds it. Sessions
/// holding an older `Arc<TypeRegistry>` keep working against the snapshot
/// they were given.
#[derive(Debug)]
pub struct TypeCatalog {
    state: RwLock<CatalogState>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_HIERARCHY_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                descriptors: Vec::new(),
                filters: Vec::new(),
                max_depth,
                built: None,
            }),
        }
    }

    /// Adds a type, replacing any descriptor registered under the same key.
    pub fn register(&self, descriptor: TypeDescriptor) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match state
            .descriptors
            .iter_mut()
            .find(|d| d.key == descriptor.key)
        {
            Some(existing) => *existing = descriptor,
            None => state.descriptors.push(descriptor),
        }
        state.built = None;
    }

    /// Adds a filter, replacing any filter with the same qualified name on
    /// the same container type.
    pub fn register_filter(&self, container_type: TypeKey, entry: FilterEntry) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.filters.retain(|(container, existing)| {
            !(container == &container_type && existing.qualified_name == entry.qualified_name)
        });
        state.filters.push((container_type, entry));
        state.built = None;
    }

    /// Removes a type and every filter declared on it.
    pub fn unregister(&self, key: &TypeKey) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.descriptors.len();
        state.descriptors.retain(|d| &d.key != key);
        state.filters.retain(|(container, _)| container != key);
        let removed = state.descriptors.len() != before;
        if removed {
            state.built = None;
        }
        removed
    }

    /// Drops the cached registry without changing the type set.
    pub fn invalidate(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .built = None;
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .built
            .is_some()
    }

    /// Returns the current registry, building it on first use.
    pub fn registry(&self) -> ContainerResult<Arc<TypeRegistry>> {
        if let Some(built) = &self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .built
        {
            return Ok(Arc::clone(built));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(built) = &state.built {
            return Ok(Arc::clone(built));
        }
        let mut builder = TypeRegistryBuilder::new().max_hierarchy_depth(state.max_depth);
        for descriptor in &state.descriptors {
            builder = builder.register(descriptor.clone());
        }
        for (container, entry) in &state.filters {
            builder = builder.register_filter(container.clone(), entry.clone());
        }
        let registry = Arc::new(builder.build()?);
        state.built = Some(Arc::clone(&registry));
        Ok(registry)
    }
}
