//! Value-to-parameter matching.
//!
//! Decides whether a value of some static type can be passed to a parameter,
//! and how good that match is. Both setter resolution and multi-attribute
//! covering rank candidates by these results.
//!
//! ## Match Priority
//!
//! Matches are checked in this order, best first:
//! 1. Exact (identical types)
//! 2. Boxing or unboxing
//! 3. Primitive widening on `byte < char < short < int < long < float < double`
//! 4. Assignability (parameter is an ancestor of the value type)
//! 5. A registered conversion method
//! 6. Unchecked cast (object values to object parameters only)

use std::cmp::Reverse;

use attrbind_core::{MethodDescriptor, PrimitiveKind, TypeModel, TypeRef};

use crate::context::ResolutionContext;

/// How a value reaches a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMatch {
    /// Identical types.
    Exact,

    /// The types differ only by boxing.
    Boxing,

    /// Implicit primitive widening by `distance` ladder steps.
    Widening { distance: u8 },

    /// The parameter is an ancestor of the value type.
    Assignable {
        /// Ancestor depth of the parameter type; deeper is narrower.
        depth: usize,
    },

    /// A registered conversion method produces the parameter type.
    Converted(MethodDescriptor),

    /// The value is cast to the parameter type.
    Cast,
}

/// Total order over [`ValueMatch`] quality. Smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueRank {
    Exact,
    Boxing,
    Widening(u8),
    Assignable(Reverse<usize>),
    Converted,
    Cast,
}

impl ValueMatch {
    pub fn rank(&self) -> ValueRank {
        match self {
            ValueMatch::Exact => ValueRank::Exact,
            ValueMatch::Boxing => ValueRank::Boxing,
            ValueMatch::Widening { distance } => ValueRank::Widening(*distance),
            ValueMatch::Assignable { depth } => ValueRank::Assignable(Reverse(*depth)),
            ValueMatch::Converted(_) => ValueRank::Converted,
            ValueMatch::Cast => ValueRank::Cast,
        }
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        matches!(self, ValueMatch::Exact)
    }
}

/// The primitive whose box is `ty`, or `ty` itself if it is primitive.
pub fn unboxed<M: TypeModel + ?Sized>(model: &M, ty: &TypeRef) -> Option<PrimitiveKind> {
    if let Some(kind) = ty.primitive() {
        return Some(kind);
    }
    PrimitiveKind::ALL
        .iter()
        .copied()
        .filter(|kind| *kind != PrimitiveKind::Void)
        .find(|kind| model.boxed(&TypeRef::Primitive(*kind)) == *ty)
}

/// Widening distance from `value` to `param`, looking through boxes.
pub fn widening_distance<M: TypeModel + ?Sized>(
    model: &M,
    value: &TypeRef,
    param: &TypeRef,
) -> Option<u8> {
    if value.is_object() && param.is_object() {
        return None;
    }
    let from = unboxed(model, value)?;
    let to = unboxed(model, param)?;
    from.widening_distance(to)
}

/// Classify how `value` can be passed to `param`.
///
/// Returns `None` when the value cannot be passed at all.
pub fn classify<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    value: &TypeRef,
    param: &TypeRef,
) -> Option<ValueMatch> {
    let model = ctx.model();
    if value == param {
        return Some(ValueMatch::Exact);
    }
    if model.is_boxing_conversion(param, value) {
        return Some(ValueMatch::Boxing);
    }
    if let Some(distance) = widening_distance(model, value, param) {
        return Some(ValueMatch::Widening { distance });
    }
    if model.is_assignable_from(param, value) {
        return Some(ValueMatch::Assignable {
            depth: model.ancestor_depth(param),
        });
    }
    if let Some(method) = find_conversion(ctx, value, param) {
        return Some(ValueMatch::Converted(method.clone()));
    }
    if value.is_object() && !param.is_primitive() {
        return Some(ValueMatch::Cast);
    }
    None
}

/// Whether a value of type `from` can stand where `to` is expected without a
/// conversion method.
fn usable_as<M: TypeModel + ?Sized>(model: &M, from: &TypeRef, to: &TypeRef) -> bool {
    from == to || model.is_boxing_conversion(from, to) || model.is_assignable_from(to, from)
}

/// Find a registered conversion from `from` to `to`.
///
/// An entry keyed exactly `(from, to)` wins. Otherwise the first entry, in
/// table order, whose source accepts `from` and whose result is usable as `to`.
pub fn find_conversion<'s, M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'s, M>,
    from: &TypeRef,
    to: &TypeRef,
) -> Option<&'s MethodDescriptor> {
    let conversions = ctx.store().conversions();
    if let Some(method) = conversions.get(from).and_then(|targets| targets.get(to)) {
        return Some(method);
    }

    let model = ctx.model();
    conversions
        .iter()
        .filter(|(source, _)| usable_as(model, from, &ctx.qualify(source)))
        .flat_map(|(_, targets)| targets.iter())
        .find(|(target, _)| usable_as(model, &ctx.qualify(target), to))
        .map(|(_, method)| method)
}
