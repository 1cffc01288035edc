//! Build-time resolution of attribute bindings to setter calls.
//!
//! Given an attribute bound in a UI description, the view type it is set on
//! and the static type of the bound value, `attrbind` decides which call
//! implements the binding: an instance setter, a registered adapter, a renamed
//! method or a multi-attribute adapter, with conversions and casts applied.
//! Declarations are kept in a registry that is persisted per module and merged
//! across module dependencies for incremental builds.
//!
//! # Crates
//!
//! - [`attrbind_core`]: type references, attribute names, the [`TypeModel`]
//!   trait, errors and diagnostics
//! - [`attrbind_registry`]: the [`SetterStore`], declaration validation and snapshots
//! - [`attrbind_compiler`]: setter resolution and [`CallExpression`]s
//!
//! This crate adds [`BindingConfig`] and [`BindingSession`], which tie those
//! together for one compilation invocation.

pub mod config;
pub mod session;

pub use config::{BindingConfig, ConfigError};
pub use session::BindingSession;

pub use attrbind_compiler::{CallExpression, ResolutionContext, ValueMatch, ValueWrapper};
pub use attrbind_core::{
    AttributeName, BindingError, Diagnostic, DiagnosticKind, Diagnostics, ImportAliases, Location,
    MethodDescriptor, MethodInfo, MethodModifiers, PrimitiveKind, StaticTypeModel, TypeModel,
    TypeRef,
};
pub use attrbind_registry::{
    AdapterDeclaration, ConversionDeclaration, DeclaredMethod, ModuleGraph,
    RenamedSetterDeclaration, RoundDeclarations, SetterStore, StoreTables, UntaggableDeclaration,
};
