//! Reflection over the host type system.
//!
//! The resolver never inspects types itself. Every question about ancestry,
//! boxing or available methods goes through a [`TypeModel`] supplied by the
//! caller, which lets the same engine run against a compiler's symbol tables,
//! a classpath index or the in-memory [`StaticTypeModel`](crate::StaticTypeModel).

use rustc_hash::FxHashMap;

use crate::{MethodInfo, TypeRef};

/// Short-name to qualified-name aliases in effect for one binding expression.
pub type ImportAliases = FxHashMap<String, String>;

/// Capability interface over the host type system.
pub trait TypeModel {
    /// Whether a value of type `source` may be assigned to `target`.
    ///
    /// Must be reflexive. Primitives are only assignable to themselves.
    fn is_assignable_from(&self, target: &TypeRef, source: &TypeRef) -> bool;

    /// The boxed form of a primitive; any other type is returned unchanged.
    fn boxed(&self, ty: &TypeRef) -> TypeRef;

    /// Length of the longest supertype path from `ty`, counting superclasses
    /// and implemented interfaces alike.
    ///
    /// Only relative order matters: a subtype must report a greater depth
    /// than every type it is assignable to, interfaces included. Resolution
    /// uses this to prefer the narrower of two accepting parameter types.
    fn ancestor_depth(&self, ty: &TypeRef) -> usize;

    /// Methods named `name` taking exactly `arity` parameters that are
    /// callable on an instance of `owner`, including inherited ones.
    ///
    /// Overridden methods are reported once, by their most-derived
    /// declaration.
    fn methods(&self, owner: &TypeRef, name: &str, arity: usize) -> Vec<MethodInfo>;

    /// Whether `ty` is a generated data-binding container whose setters may
    /// resolve dynamically.
    fn is_binding_container(&self, ty: &TypeRef) -> bool;

    /// The erasure of a generic type. Non-generic models return `ty` as is.
    fn erasure(&self, ty: &TypeRef) -> TypeRef {
        ty.clone()
    }

    /// Whether `a` and `b` differ only by boxing.
    fn is_boxing_conversion(&self, a: &TypeRef, b: &TypeRef) -> bool {
        a.is_primitive() != b.is_primitive() && self.boxed(a) == self.boxed(b)
    }
}

impl<M: TypeModel + ?Sized> TypeModel for &M {
    fn is_assignable_from(&self, target: &TypeRef, source: &TypeRef) -> bool {
        (**self).is_assignable_from(target, source)
    }

    fn boxed(&self, ty: &TypeRef) -> TypeRef {
        (**self).boxed(ty)
    }

    fn ancestor_depth(&self, ty: &TypeRef) -> usize {
        (**self).ancestor_depth(ty)
    }

    fn methods(&self, owner: &TypeRef, name: &str, arity: usize) -> Vec<MethodInfo> {
        (**self).methods(owner, name, arity)
    }

    fn is_binding_container(&self, ty: &TypeRef) -> bool {
        (**self).is_binding_container(ty)
    }

    fn erasure(&self, ty: &TypeRef) -> TypeRef {
        (**self).erasure(ty)
    }

    fn is_boxing_conversion(&self, a: &TypeRef, b: &TypeRef) -> bool {
        (**self).is_boxing_conversion(a, b)
    }
}
