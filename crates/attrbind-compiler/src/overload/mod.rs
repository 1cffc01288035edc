//! Setter resolution for a single attribute.
//!
//! Selects the call that implements one attribute on one view type for one
//! value type, choosing between instance methods on the view and registered
//! adapters.
//!
//! ## Algorithm
//!
//! 1. Collect direct candidates: void single-parameter methods on the view
//!    (or an ancestor) named by a renamed-setter mapping, the conventional
//!    `setX` name, or the bare attribute name
//! 2. Collect adapter candidates: registered adapters for the attribute whose
//!    view type accepts the view
//! 3. Classify each candidate's parameter against the value type
//!    (see [`crate::conversion`]) and drop those that cannot accept it
//! 4. Rank and select (see [`find_best_match`])
//! 5. Attach a conversion or cast wrapper if the selected match needs one
//!
//! When nothing matches, a fallback call to the conventional setter name is
//! produced and an error diagnostic is reported unless the view is a binding
//! container.

mod ranking;

pub use ranking::find_best_match;

use attrbind_core::{
    AttributeName, Diagnostic, Diagnostics, MethodDescriptor, MethodInfo, TypeModel, TypeRef,
};
use tracing::debug;

use crate::call::{CallExpression, ValueWrapper};
use crate::context::ResolutionContext;
use crate::conversion::{ValueMatch, classify};

/// What a candidate calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetterTarget {
    /// An instance method on the view.
    Direct(MethodInfo),
    /// A registered static adapter.
    Adapter(MethodDescriptor),
}

/// A candidate that accepts the value.
#[derive(Debug, Clone)]
pub struct SetterMatch {
    pub target: SetterTarget,
    /// The parameter the value is passed to.
    pub param: TypeRef,
    pub value_match: ValueMatch,
    /// Ancestor depth of the view type the candidate is declared for.
    pub view_depth: usize,
    /// Discovery order, the final tie-breaker.
    pub sequence: usize,
}

impl SetterMatch {
    fn wrapper(&self) -> ValueWrapper {
        match &self.value_match {
            ValueMatch::Converted(method) => ValueWrapper::Convert(method.clone()),
            ValueMatch::Cast => ValueWrapper::Cast(self.param.clone()),
            _ => ValueWrapper::None,
        }
    }
}

/// Resolve the call implementing `attribute` on `view_type` for a value of
/// `value_type`.
///
/// Never fails: unresolved attributes produce a [`CallExpression::Fallback`]
/// and, unless the view is a binding container, an error in `diagnostics`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_setter<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    attribute: &str,
    view_type: &TypeRef,
    value_type: &TypeRef,
    diagnostics: &mut Diagnostics,
) -> CallExpression {
    let attribute = AttributeName::new(attribute);

    let mut candidates = direct_candidates(ctx, &attribute, view_type, value_type);
    let first_adapter = candidates.len();
    candidates.extend(adapter_candidates(
        ctx,
        &attribute,
        view_type,
        value_type,
        first_adapter,
    ));

    let call = match find_best_match(&candidates) {
        Some(best) => into_call(ctx, attribute, best),
        None => {
            if !ctx.model().is_binding_container(view_type) {
                diagnostics.push(Diagnostic::error(format!(
                    "Cannot find the setter for attribute '{attribute}' on {view_type}."
                )));
            }
            CallExpression::Fallback {
                method_name: attribute.default_setter(),
                attribute,
                min_api: ctx.min_api(),
            }
        }
    };
    debug!(%view_type, %value_type, candidates = candidates.len(), ?call, "resolved setter");
    call
}

fn into_call<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    attribute: AttributeName,
    best: &SetterMatch,
) -> CallExpression {
    let wrapper = best.wrapper();
    match &best.target {
        SetterTarget::Direct(method) => CallExpression::Direct {
            attribute,
            method_name: method.name.clone(),
            wrapper,
            min_api: method.min_api,
        },
        SetterTarget::Adapter(adapter) => CallExpression::Adapter {
            attribute,
            adapter: adapter.clone(),
            wrapper,
            min_api: ctx.min_api(),
        },
    }
}

/// Method names tried on the view, in order: the most specific applicable
/// renamed setter, the conventional setter, the bare local name.
fn setter_names<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    attribute: &AttributeName,
    view_type: &TypeRef,
) -> Vec<String> {
    let model = ctx.model();
    let mut names = Vec::with_capacity(3);

    if let Some(renamed) = ctx.store().renamed_setters(attribute) {
        let mut best: Option<(usize, &MethodDescriptor)> = None;
        for (target, method) in renamed {
            let target = ctx.qualify(target);
            if !model.is_assignable_from(&target, view_type) {
                continue;
            }
            let depth = model.ancestor_depth(&target);
            if best.is_none_or(|(best_depth, _)| depth > best_depth) {
                best = Some((depth, method));
            }
        }
        if let Some((_, method)) = best {
            names.push(method.method_name.clone());
        }
    }

    for name in [attribute.default_setter(), attribute.local_name().to_string()] {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn direct_candidates<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    attribute: &AttributeName,
    view_type: &TypeRef,
    value_type: &TypeRef,
) -> Vec<SetterMatch> {
    let model = ctx.model();
    let erased = model.erasure(view_type);
    let (lookup_view, argument) = if erased != *view_type {
        (erased, model.erasure(value_type))
    } else {
        (view_type.clone(), value_type.clone())
    };

    let mut candidates = Vec::new();
    for name in setter_names(ctx, attribute, &lookup_view) {
        for method in model.methods(&lookup_view, &name, 1) {
            if !method.is_void() {
                continue;
            }
            let [param] = method.params.as_slice() else {
                continue;
            };
            let Some(value_match) = classify(ctx, &argument, param) else {
                continue;
            };
            candidates.push(SetterMatch {
                param: param.clone(),
                value_match,
                view_depth: model.ancestor_depth(&method.declaring_type),
                sequence: candidates.len(),
                target: SetterTarget::Direct(method),
            });
        }
    }
    candidates
}

fn adapter_candidates<M: TypeModel + ?Sized>(
    ctx: &ResolutionContext<'_, M>,
    attribute: &AttributeName,
    view_type: &TypeRef,
    value_type: &TypeRef,
    first_sequence: usize,
) -> Vec<SetterMatch> {
    let Some(adapters) = ctx.store().adapters(attribute) else {
        return Vec::new();
    };
    let model = ctx.model();

    let mut candidates = Vec::new();
    for (key, adapter) in adapters {
        let adapter_view = ctx.qualify(&key.view_type);
        if !model.is_assignable_from(&adapter_view, view_type) {
            continue;
        }
        let param = ctx.qualify(&key.value_type);
        let Some(value_match) = classify(ctx, value_type, &param) else {
            continue;
        };
        candidates.push(SetterMatch {
            target: SetterTarget::Adapter(adapter.clone()),
            param,
            value_match,
            view_depth: model.ancestor_depth(&adapter_view),
            sequence: first_sequence + candidates.len(),
        });
    }
    candidates
}
