//! SetterStore - the registry of binding declarations.
//!
//! This module provides [`SetterStore`], which holds every adapter, renamed
//! setter, conversion and untaggable declaration visible to the module being
//! compiled, grouped by attribute or type key.
//!
//! # Storage Model
//!
//! - **Adapters**: attribute -> [`AccessorKey`] -> adapter method
//! - **Renamed setters**: attribute -> target type -> method
//! - **Conversions**: from type -> to type -> conversion method
//! - **Multi-attribute adapters**: [`MultiAttributeAdapterKey`] -> adapter method
//! - **Untaggable types**: view type -> declaring type
//!
//! Every value records the type that declared it. That owner is what
//! [`SetterStore::clear`] matches on when a class is reprocessed.
//!
//! All tables are ordered maps so that iteration, and therefore resolution and
//! the persisted bytes, depend only on table contents and never on insertion
//! history.
//!
//! # Rounds
//!
//! Duplicate detection is scoped to a round: an adapter key that arrived with
//! a merged snapshot may be redeclared by the current module (the new mapping
//! replaces it), but declaring the same key twice between two calls to
//! [`SetterStore::begin_round`] is an error.
//!
//! # Thread Safety
//!
//! `SetterStore` is **not thread-safe**. Registration for a module happens on a
//! single task per round and resolution only reads after that round's
//! additions are complete. Hosts that may register concurrently must wrap the
//! store in a lock (see `BindingSession` in the root crate).

use std::collections::BTreeMap;

use attrbind_core::{AttributeName, MethodDescriptor, RegistrationError, TypeRef};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keys::{AccessorKey, MultiAttributeAdapterKey};

/// The five tables of a store, in their current (persisted) shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTables {
    pub adapter_methods: BTreeMap<AttributeName, BTreeMap<AccessorKey, MethodDescriptor>>,
    pub renamed_methods: BTreeMap<AttributeName, BTreeMap<TypeRef, MethodDescriptor>>,
    pub conversion_methods: BTreeMap<TypeRef, BTreeMap<TypeRef, MethodDescriptor>>,
    pub multi_value_adapters: BTreeMap<MultiAttributeAdapterKey, MethodDescriptor>,
    pub untaggable_types: BTreeMap<TypeRef, TypeRef>,
}

impl StoreTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every table is empty.
    pub fn is_empty(&self) -> bool {
        self.adapter_methods.is_empty()
            && self.renamed_methods.is_empty()
            && self.conversion_methods.is_empty()
            && self.multi_value_adapters.is_empty()
            && self.untaggable_types.is_empty()
    }

    /// Total number of entries across all tables.
    pub fn entry_count(&self) -> usize {
        self.adapter_methods.values().map(BTreeMap::len).sum::<usize>()
            + self.renamed_methods.values().map(BTreeMap::len).sum::<usize>()
            + self.conversion_methods.values().map(BTreeMap::len).sum::<usize>()
            + self.multi_value_adapters.len()
            + self.untaggable_types.len()
    }

    /// Union `source` into `self`. On key collisions the existing mapping wins.
    pub fn merge(&mut self, source: StoreTables) {
        merge_nested(&mut self.adapter_methods, source.adapter_methods);
        merge_nested(&mut self.renamed_methods, source.renamed_methods);
        merge_nested(&mut self.conversion_methods, source.conversion_methods);
        for (key, method) in source.multi_value_adapters {
            self.multi_value_adapters.entry(key).or_insert(method);
        }
        for (view, owner) in source.untaggable_types {
            self.untaggable_types.entry(view).or_insert(owner);
        }
    }

    /// Remove every entry whose owning declaration is in `owners`.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self, owners: &FxHashSet<TypeRef>) -> usize {
        let mut removed = 0;
        removed += clear_nested(&mut self.adapter_methods, owners);
        removed += clear_nested(&mut self.renamed_methods, owners);
        removed += clear_nested(&mut self.conversion_methods, owners);

        let before = self.multi_value_adapters.len();
        self.multi_value_adapters
            .retain(|_, method| !owners.contains(&method.declaring_type));
        removed += before - self.multi_value_adapters.len();

        let before = self.untaggable_types.len();
        self.untaggable_types
            .retain(|_, owner| !owners.contains(owner));
        removed += before - self.untaggable_types.len();

        removed
    }
}

fn merge_nested<K: Ord, V: Ord>(
    target: &mut BTreeMap<K, BTreeMap<V, MethodDescriptor>>,
    source: BTreeMap<K, BTreeMap<V, MethodDescriptor>>,
) {
    for (key, values) in source {
        let existing = target.entry(key).or_default();
        for (inner, method) in values {
            existing.entry(inner).or_insert(method);
        }
    }
}

fn clear_nested<K: Ord, V: Ord>(
    table: &mut BTreeMap<K, BTreeMap<V, MethodDescriptor>>,
    owners: &FxHashSet<TypeRef>,
) -> usize {
    let mut removed = 0;
    table.retain(|_, values| {
        let before = values.len();
        values.retain(|_, method| !owners.contains(&method.declaring_type));
        removed += before - values.len();
        !values.is_empty()
    });
    removed
}

/// Keys declared since the last [`SetterStore::begin_round`].
#[derive(Debug, Default)]
struct RoundState {
    adapters: FxHashSet<(AttributeName, AccessorKey)>,
    multi_adapters: FxHashSet<MultiAttributeAdapterKey>,
}

/// Registry of binding declarations for one compilation.
#[derive(Debug, Default)]
pub struct SetterStore {
    tables: StoreTables,
    round: RoundState,
}

impl SetterStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-loaded tables (for example a merged snapshot).
    pub fn from_tables(tables: StoreTables) -> Self {
        Self {
            tables,
            round: RoundState::default(),
        }
    }

    /// The current tables.
    pub fn tables(&self) -> &StoreTables {
        &self.tables
    }

    /// Consume the store, returning its tables.
    pub fn into_tables(self) -> StoreTables {
        self.tables
    }

    // ==========================================================================
    // Rounds and incremental invalidation
    // ==========================================================================

    /// Start a new processing round; duplicate detection restarts.
    pub fn begin_round(&mut self) {
        self.round = RoundState::default();
    }

    /// Remove every entry declared by one of `owners`.
    ///
    /// Must be called before re-adding the declarations of classes that are
    /// reprocessed this round. Entries of all other owners are untouched.
    pub fn clear(&mut self, owners: &FxHashSet<TypeRef>) -> usize {
        let removed = self.tables.clear(owners);
        let tables = &self.tables;
        self.round.adapters.retain(|(attribute, key)| {
            tables
                .adapter_methods
                .get(attribute)
                .is_some_and(|adapters| adapters.contains_key(key))
        });
        self.round
            .multi_adapters
            .retain(|key| tables.multi_value_adapters.contains_key(key));
        debug!(owners = owners.len(), removed, "STORE clear");
        removed
    }

    /// Union a dependency's tables into this store; existing mappings win.
    pub fn merge(&mut self, source: StoreTables) {
        self.tables.merge(source);
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a single-attribute adapter.
    ///
    /// Fails with [`RegistrationError::DuplicateAdapter`] when the same
    /// attribute and key were already declared this round.
    pub fn add_adapter(
        &mut self,
        attribute: &str,
        view_type: TypeRef,
        value_type: TypeRef,
        method: MethodDescriptor,
    ) -> Result<(), RegistrationError> {
        let attribute = AttributeName::new(attribute);
        let key = AccessorKey::new(view_type, value_type);
        debug!(%attribute, %key, %method, "STORE addBindingAdapter");

        let round_key = (attribute.clone(), key.clone());
        if self.round.adapters.contains(&round_key) {
            return Err(RegistrationError::DuplicateAdapter {
                attribute: attribute.to_string(),
                view_type: key.view_type.to_string(),
                value_type: key.value_type.to_string(),
                method: method.to_string(),
            });
        }
        self.round.adapters.insert(round_key);
        self.tables
            .adapter_methods
            .entry(attribute)
            .or_default()
            .insert(key, method);
        Ok(())
    }

    /// Map `attribute` on `declaring_type` (and its descendants) to a
    /// differently named setter. Replaces any earlier mapping for the pair.
    pub fn add_renamed_setter(
        &mut self,
        attribute: &str,
        declaring_type: TypeRef,
        method: MethodDescriptor,
    ) {
        let attribute = AttributeName::new(attribute);
        debug!(%attribute, %declaring_type, %method, "STORE addRenamedMethod");
        self.tables
            .renamed_methods
            .entry(attribute)
            .or_default()
            .insert(declaring_type, method);
    }

    /// Register a conversion from `from` to `to`. Last write wins.
    pub fn add_conversion(&mut self, from: TypeRef, to: TypeRef, method: MethodDescriptor) {
        debug!(%from, %to, %method, "STORE addConversionMethod");
        self.tables
            .conversion_methods
            .entry(from)
            .or_default()
            .insert(to, method);
    }

    /// Register a multi-attribute adapter.
    ///
    /// `parameter_types` are the adapter's value parameters, positionally
    /// matching `attributes`.
    pub fn add_multi_attribute_adapter<S: AsRef<str>>(
        &mut self,
        view_type: TypeRef,
        attributes: &[S],
        parameter_types: Vec<TypeRef>,
        method: MethodDescriptor,
    ) -> Result<(), RegistrationError> {
        let key = MultiAttributeAdapterKey::new(view_type, attributes, parameter_types);
        debug!(attributes = key.len(), %key, %method, "STORE add multi-value BindingAdapter");

        if self.round.multi_adapters.contains(&key) {
            return Err(RegistrationError::DuplicateMultiAttributeAdapter {
                attributes: key.attributes().iter().map(ToString::to_string).collect(),
                view_type: key.view_type().to_string(),
                method: method.to_string(),
            });
        }
        self.round.multi_adapters.insert(key.clone());
        // Remove first so an equal key declared in another order replaces the stored one.
        self.tables.multi_value_adapters.remove(&key);
        self.tables.multi_value_adapters.insert(key, method);
        Ok(())
    }

    /// Exclude `types` from automatic view tagging.
    pub fn add_untaggable(&mut self, types: &[TypeRef], declaring_type: TypeRef) {
        debug!(count = types.len(), %declaring_type, "STORE addUntaggableTypes");
        for ty in types {
            self.tables
                .untaggable_types
                .insert(ty.clone(), declaring_type.clone());
        }
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Whether `view_type` is excluded from view tagging.
    pub fn is_untaggable(&self, view_type: &TypeRef) -> bool {
        self.tables.untaggable_types.contains_key(view_type)
    }

    /// Adapters registered for `attribute`.
    pub fn adapters(&self, attribute: &AttributeName) -> Option<&BTreeMap<AccessorKey, MethodDescriptor>> {
        self.tables.adapter_methods.get(attribute)
    }

    /// Renamed setters registered for `attribute`, keyed by target type.
    pub fn renamed_setters(
        &self,
        attribute: &AttributeName,
    ) -> Option<&BTreeMap<TypeRef, MethodDescriptor>> {
        self.tables.renamed_methods.get(attribute)
    }

    /// All conversions, keyed by source type then target type.
    pub fn conversions(&self) -> &BTreeMap<TypeRef, BTreeMap<TypeRef, MethodDescriptor>> {
        &self.tables.conversion_methods
    }

    /// All multi-attribute adapters.
    pub fn multi_attribute_adapters(
        &self,
    ) -> &BTreeMap<MultiAttributeAdapterKey, MethodDescriptor> {
        &self.tables.multi_value_adapters
    }
}
