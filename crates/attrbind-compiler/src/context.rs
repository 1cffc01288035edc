//! ResolutionContext - what a resolution query runs against.

use attrbind_core::{Diagnostics, ImportAliases, MIN_PLATFORM_VERSION, TypeModel, TypeRef};
use attrbind_registry::SetterStore;

use crate::call::CallExpression;
use crate::{cover, overload};

/// A registry, a type model and the import aliases of one binding expression.
///
/// Cheap to build; hosts usually create one per layout or per expression.
pub struct ResolutionContext<'a, M: TypeModel + ?Sized> {
    store: &'a SetterStore,
    model: &'a M,
    imports: ImportAliases,
    min_api: u32,
}

impl<'a, M: TypeModel + ?Sized> ResolutionContext<'a, M> {
    pub fn new(store: &'a SetterStore, model: &'a M) -> Self {
        Self {
            store,
            model,
            imports: ImportAliases::default(),
            min_api: MIN_PLATFORM_VERSION,
        }
    }

    /// Resolve short names in registry keys through `imports`.
    pub fn with_imports(mut self, imports: ImportAliases) -> Self {
        self.imports = imports;
        self
    }

    /// Platform version reported by calls that do not inherit one from a method.
    pub fn with_min_api(mut self, min_api: u32) -> Self {
        self.min_api = min_api;
        self
    }

    #[inline]
    pub fn store(&self) -> &'a SetterStore {
        self.store
    }

    #[inline]
    pub fn model(&self) -> &'a M {
        self.model
    }

    #[inline]
    pub fn min_api(&self) -> u32 {
        self.min_api
    }

    /// A registry type with import aliases applied.
    pub fn qualify(&self, ty: &TypeRef) -> TypeRef {
        if self.imports.is_empty() {
            ty.clone()
        } else {
            ty.with_imports(&self.imports)
        }
    }

    /// See [`overload::resolve_setter`].
    pub fn resolve_setter(
        &self,
        attribute: &str,
        view_type: &TypeRef,
        value_type: &TypeRef,
        diagnostics: &mut Diagnostics,
    ) -> CallExpression {
        overload::resolve_setter(self, attribute, view_type, value_type, diagnostics)
    }

    /// See [`cover::resolve_multi_attribute`].
    pub fn resolve_multi_attribute<S: AsRef<str>>(
        &self,
        attributes: &[S],
        view_type: &TypeRef,
        value_types: &[TypeRef],
        diagnostics: &mut Diagnostics,
    ) -> Vec<CallExpression> {
        cover::resolve_multi_attribute(self, attributes, view_type, value_types, diagnostics)
    }

    /// Whether `view_type` is excluded from automatic view tagging.
    pub fn is_untaggable(&self, view_type: &TypeRef) -> bool {
        self.store.is_untaggable(view_type)
    }
}
