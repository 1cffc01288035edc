//! Setter resolution for attribute bindings.
//!
//! This crate turns `(attribute, view type, value type)` triples into call
//! expressions using the declarations held by a
//! [`SetterStore`](attrbind_registry::SetterStore).
//!
//! - [`conversion`]: how a value reaches a parameter, and how well
//! - [`overload`]: single-attribute resolution
//! - [`cover`]: greedy multi-attribute adapter covering
//! - [`call`]: the resulting [`CallExpression`]s and their rendering
//!
//! # Example
//!
//! ```
//! use attrbind_compiler::ResolutionContext;
//! use attrbind_core::{Diagnostics, StaticTypeModel, TypeRef};
//! use attrbind_registry::SetterStore;
//!
//! let mut model = StaticTypeModel::standard();
//! model
//!     .add_class("TextView", None)
//!     .add_setter("TextView", "setText", TypeRef::declared("String"));
//! let store = SetterStore::new();
//!
//! let ctx = ResolutionContext::new(&store, &model);
//! let mut diagnostics = Diagnostics::new();
//! let call = ctx.resolve_setter(
//!     "android:text",
//!     &TypeRef::declared("TextView"),
//!     &TypeRef::declared("String"),
//!     &mut diagnostics,
//! );
//! assert_eq!(call.render("view", &["name"]).unwrap(), "view.setText(name)");
//! ```

pub mod call;
pub mod context;
pub mod conversion;
pub mod cover;
pub mod overload;

pub use call::{CallExpression, ValueWrapper};
pub use context::ResolutionContext;
pub use conversion::{ValueMatch, ValueRank};
pub use cover::resolve_multi_attribute;
pub use overload::resolve_setter;
