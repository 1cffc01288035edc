//! Multi-attribute adapter covering.
//!
//! Given every attribute bound on one view, picks multi-attribute adapters
//! that together consume as many of them as possible, then resolves what is
//! left one attribute at a time.
//!
//! Selection is greedy: candidates are sorted once, the best is accepted, and
//! every candidate sharing an attribute with it is discarded. This is
//! deterministic and quadratic at worst, but does not always find the cover
//! that consumes the most attributes.

use std::cmp::Reverse;

use attrbind_core::{AttributeName, Diagnostic, Diagnostics, MethodDescriptor, TypeModel, TypeRef};
use attrbind_registry::MultiAttributeAdapterKey;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::call::{CallExpression, ValueWrapper};
use crate::context::ResolutionContext;
use crate::conversion::{ValueMatch, ValueRank, classify};

/// A multi-attribute adapter that accepts the declared values.
#[derive(Debug, Clone)]
pub struct CoverCandidate<'s> {
    pub key: &'s MultiAttributeAdapterKey,
    pub adapter: &'s MethodDescriptor,
    /// Per-parameter matches, in the adapter's parameter order.
    pub matches: Vec<ValueMatch>,
    pub view_depth: usize,
}

type CoverKey<'s> = (
    Reverse<usize>,
    Reverse<usize>,
    Vec<&'s AttributeName>,
    Vec<ValueRank>,
    &'s MethodDescriptor,
);

impl<'s> CoverCandidate<'s> {
    /// Total order: more attributes, then deeper view, then attribute names,
    /// then per-attribute match quality in attribute-name order, then adapter.
    fn sort_key(&self) -> CoverKey<'s> {
        let key = self.key;
        let (names, ranks): (Vec<&'s AttributeName>, Vec<ValueRank>) = key
            .sorted_bindings()
            .filter_map(|(attribute, _)| {
                key.index_of(attribute)
                    .map(|index| (attribute, self.matches[index].rank()))
            })
            .unzip();
        (
            Reverse(key.len()),
            Reverse(self.view_depth),
            names,
            ranks,
            self.adapter,
        )
    }

    fn conflicts_with(&self, consumed: &FxHashSet<&AttributeName>) -> bool {
        self.key.attributes().iter().any(|a| consumed.contains(a))
    }

    fn into_call(self, min_api: u32) -> CallExpression {
        let wrappers = self
            .matches
            .iter()
            .zip(self.key.parameter_types())
            .map(|(value_match, param)| match value_match {
                ValueMatch::Converted(method) => ValueWrapper::Convert(method.clone()),
                ValueMatch::Cast => ValueWrapper::Cast(param.clone()),
                _ => ValueWrapper::None,
            })
            .collect();
        CallExpression::MultiAdapter {
            attributes: self.key.attributes().to_vec(),
            adapter: self.adapter.clone(),
            wrappers,
            min_api,
        }
    }
}

/// Every registered multi-attribute adapter usable for the declared set.
///
/// An adapter qualifies when its view type accepts `view_type`, every
/// attribute it requires is declared, and every declared value reaches its
/// parameter by any [`ValueMatch`].
pub fn matching_candidates<'s, M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'s, M>,
    attributes: &[AttributeName],
    view_type: &TypeRef,
    value_types: &[TypeRef],
) -> Vec<CoverCandidate<'s>> {
    let model = ctx.model();
    let mut candidates = Vec::new();

    'adapters: for (key, adapter) in ctx.store().multi_attribute_adapters() {
        if key.len() > attributes.len() {
            continue;
        }
        let adapter_view = ctx.qualify(key.view_type());
        if !model.is_assignable_from(&adapter_view, view_type) {
            continue;
        }

        let mut matches: Vec<Option<ValueMatch>> = vec![None; key.len()];
        for (attribute, value_type) in attributes.iter().zip(value_types) {
            let Some(index) = key.index_of(attribute) else {
                continue;
            };
            let param = ctx.qualify(&key.parameter_types()[index]);
            match classify(ctx, value_type, &param) {
                Some(value_match) => matches[index] = Some(value_match),
                None => continue 'adapters,
            }
        }

        let Some(matches) = matches.into_iter().collect::<Option<Vec<_>>>() else {
            continue;
        };
        candidates.push(CoverCandidate {
            key,
            adapter,
            matches,
            view_depth: model.ancestor_depth(&adapter_view),
        });
    }
    candidates
}

/// Greedily select non-overlapping candidates, best first.
pub fn select_cover(mut candidates: Vec<CoverCandidate<'_>>) -> Vec<CoverCandidate<'_>> {
    candidates.sort_by_cached_key(CoverCandidate::sort_key);

    let mut consumed = FxHashSet::default();
    let mut accepted = Vec::new();
    for candidate in candidates {
        if candidate.conflicts_with(&consumed) {
            continue;
        }
        consumed.extend(candidate.key.attributes());
        accepted.push(candidate);
    }
    accepted
}

/// Resolve every attribute bound on one view.
///
/// `attributes` and `value_types` are parallel. The result lists the accepted
/// multi-attribute calls in selection order, followed by one single-attribute
/// call per uncovered attribute in declaration order.
///
/// Lists of different lengths produce no calls and an error diagnostic.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_multi_attribute<M: TypeModel + ?Sized, S: AsRef<str>>(
    ctx: &ResolutionContext<'_, M>,
    attributes: &[S],
    view_type: &TypeRef,
    value_types: &[TypeRef],
    diagnostics: &mut Diagnostics,
) -> Vec<CallExpression> {
    if attributes.len() != value_types.len() {
        diagnostics.push(Diagnostic::error(format!(
            "Cannot resolve bindings on {view_type}: {} attribute(s) but {} value type(s).",
            attributes.len(),
            value_types.len()
        )));
        return Vec::new();
    }
    let names: Vec<AttributeName> = attributes
        .iter()
        .map(|a| AttributeName::new(a.as_ref()))
        .collect();

    let candidates = matching_candidates(ctx, &names, view_type, value_types);
    let matched = candidates.len();
    let accepted = select_cover(candidates);

    let covered: FxHashSet<AttributeName> = accepted
        .iter()
        .flat_map(|candidate| candidate.key.attributes().iter().cloned())
        .collect();
    let mut calls: Vec<CallExpression> = accepted
        .into_iter()
        .map(|candidate| candidate.into_call(ctx.min_api()))
        .collect();

    for ((raw, name), value_type) in attributes.iter().zip(&names).zip(value_types) {
        if !covered.contains(name) {
            calls.push(ctx.resolve_setter(raw.as_ref(), view_type, value_type, diagnostics));
        }
    }

    debug!(
        %view_type,
        attributes = names.len(),
        matched,
        covered = covered.len(),
        calls = calls.len(),
        "resolved multi-attribute bindings"
    );
    calls
}
