//! BindingSession - the registry for one compilation invocation.
//!
//! A session is opened once per invocation: it loads and merges every
//! snapshot visible from the module being compiled, accepts one
//! [`RoundDeclarations`] per processing round, writes the module's snapshot
//! after each round and answers resolution queries in between.
//!
//! # Thread Safety
//!
//! The store sits behind one `RwLock`. Rounds take the write lock for their
//! whole clear/register/save sequence; resolution takes the read lock, so it
//! always observes a completed round.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use attrbind_compiler::{CallExpression, ResolutionContext};
use attrbind_core::{BindingError, Diagnostics, ImportAliases, TypeModel, TypeRef};
use attrbind_registry::snapshot::write_snapshot;
use attrbind_registry::{ModuleGraph, RoundDeclarations, SetterStore, StoreTables};
use tracing::info;

use crate::config::BindingConfig;

/// Process-scoped registry context.
#[derive(Debug)]
pub struct BindingSession {
    config: BindingConfig,
    store: RwLock<SetterStore>,
}

impl BindingSession {
    /// Open a session, merging the snapshots of the configured module and
    /// everything it depends on in `graph`.
    ///
    /// Missing or unreadable snapshots contribute nothing.
    pub fn open(config: BindingConfig, graph: &ModuleGraph) -> Result<Self, BindingError> {
        config.validate()?;
        let tables = config
            .snapshot_layout()
            .load_merged(graph, &config.module_name);
        info!(
            module = %config.module_name,
            entries = tables.entry_count(),
            "opened binding session"
        );
        Ok(Self::with_tables(config, tables))
    }

    /// A session over already-loaded tables. Nothing is read from disk.
    pub fn with_tables(config: BindingConfig, tables: StoreTables) -> Self {
        Self {
            config,
            store: RwLock::new(SetterStore::from_tables(tables)),
        }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, SetterStore> {
        self.store.read().expect("setter store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, SetterStore> {
        self.store.write().expect("setter store lock poisoned")
    }

    /// Run one processing round and persist the result.
    ///
    /// Declaration problems are returned as diagnostics; only a failure to
    /// write the snapshot is an error.
    pub fn process_round(&self, round: &RoundDeclarations) -> Result<Diagnostics, BindingError> {
        let mut store = self.write();
        let diagnostics = store.process_round(round);
        let path = self.config.snapshot_path();
        write_snapshot(&path, store.tables())?;
        info!(
            module = %self.config.module_name,
            path = %path.display(),
            entries = store.tables().entry_count(),
            errors = diagnostics.error_count(),
            "saved setter store"
        );
        Ok(diagnostics)
    }

    /// Run `f` against a resolution context over the current tables.
    pub fn with_context<M, R>(
        &self,
        model: &M,
        imports: ImportAliases,
        f: impl FnOnce(&ResolutionContext<'_, M>) -> R,
    ) -> R
    where
        M: TypeModel + ?Sized,
    {
        let store = self.read();
        let ctx = ResolutionContext::new(&store, model)
            .with_imports(imports)
            .with_min_api(self.config.min_platform_version);
        f(&ctx)
    }

    /// Resolve one attribute. See [`attrbind_compiler::resolve_setter`].
    pub fn resolve_setter<M: TypeModel + ?Sized>(
        &self,
        model: &M,
        attribute: &str,
        view_type: &TypeRef,
        value_type: &TypeRef,
        diagnostics: &mut Diagnostics,
    ) -> CallExpression {
        self.with_context(model, ImportAliases::default(), |ctx| {
            ctx.resolve_setter(attribute, view_type, value_type, diagnostics)
        })
    }

    /// Resolve every attribute bound on one view.
    /// See [`attrbind_compiler::resolve_multi_attribute`].
    pub fn resolve_multi_attribute<M: TypeModel + ?Sized, S: AsRef<str>>(
        &self,
        model: &M,
        attributes: &[S],
        view_type: &TypeRef,
        value_types: &[TypeRef],
        diagnostics: &mut Diagnostics,
    ) -> Vec<CallExpression> {
        self.with_context(model, ImportAliases::default(), |ctx| {
            ctx.resolve_multi_attribute(attributes, view_type, value_types, diagnostics)
        })
    }

    pub fn is_untaggable(&self, view_type: &TypeRef) -> bool {
        self.read().is_untaggable(view_type)
    }

    /// A copy of the current tables.
    pub fn tables(&self) -> StoreTables {
        self.read().tables().clone()
    }

    /// End the session, returning its tables.
    pub fn close(self) -> StoreTables {
        let store = self
            .store
            .into_inner()
            .expect("setter store lock poisoned");
        info!(module = %self.config.module_name, "closed binding session");
        store.into_tables()
    }
}
