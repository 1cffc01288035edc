//! Core types shared by the attribute binding crates.
//!
//! - [`TypeRef`] / [`PrimitiveKind`]: opaque host type identifiers
//! - [`AttributeName`]: namespace-stripped attribute names
//! - [`MethodDescriptor`] / [`MethodInfo`]: method identities and signatures
//! - [`TypeModel`]: the reflection capability the resolver depends on
//! - [`StaticTypeModel`]: an in-memory `TypeModel`
//! - error types and the [`Diagnostics`] collector

mod attribute;
mod diagnostics;
mod error;
mod location;
mod method;
mod static_model;
mod type_model;
mod type_ref;

pub use attribute::{AttributeName, DEFAULT_NAMESPACE};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{BindingError, MalformedDeclaration, RegistrationError, RenderError, SnapshotError};
pub use location::Location;
pub use method::{MIN_PLATFORM_VERSION, MethodDescriptor, MethodInfo, MethodModifiers};
pub use static_model::StaticTypeModel;
pub use type_model::{ImportAliases, TypeModel};
pub use type_ref::{PrimitiveKind, TypeRef};
