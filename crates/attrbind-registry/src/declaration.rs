//! Declarations handed over by the scanner, and their validation.
//!
//! Scanning source annotations is the host's job. What arrives here is one
//! [`RoundDeclarations`] per processing round: the adapters, conversions,
//! renamed setters and untaggable lists found in the classes compiled this
//! round. [`SetterStore::process_round`] validates them, purges stale entries of
//! their owning classes and registers them, reporting every problem as a
//! diagnostic instead of aborting.

use attrbind_core::{
    AttributeName, Diagnostic, Diagnostics, Location, MalformedDeclaration, MethodDescriptor,
    MethodInfo, RegistrationError, TypeRef,
};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::store::SetterStore;

/// A method found by the scanner, with where it was declared.
#[derive(Debug, Clone)]
pub struct DeclaredMethod {
    pub info: MethodInfo,
    pub location: Location,
}

impl DeclaredMethod {
    pub fn new(info: MethodInfo, location: Location) -> Self {
        Self { info, location }
    }

    /// The class that declares the method.
    pub fn owner(&self) -> &TypeRef {
        &self.info.declaring_type
    }

    fn require_public_static(&self, what: &str) -> Result<(), MalformedDeclaration> {
        if self.info.is_public() && self.info.is_static() {
            Ok(())
        } else {
            Err(MalformedDeclaration::new(
                self.location.clone(),
                format!("{what} is only allowed on public static methods: {}", self.info.name),
            ))
        }
    }
}

/// A binding adapter: one or more attributes bound through a static method
/// taking the view followed by one value per attribute.
///
/// The method may instead take the view followed by all old values and then
/// all new values, in which case parameter `i` and `i + n` must share a type.
#[derive(Debug, Clone)]
pub struct AdapterDeclaration {
    pub attributes: Vec<String>,
    pub method: DeclaredMethod,
}

/// A static single-argument method converting one value type into another.
#[derive(Debug, Clone)]
pub struct ConversionDeclaration {
    pub method: DeclaredMethod,
}

/// Maps an attribute on `target_type` to the instance method `method_name`.
#[derive(Debug, Clone)]
pub struct RenamedSetterDeclaration {
    /// Class carrying the declaration.
    pub owner: TypeRef,
    pub attribute: String,
    pub target_type: TypeRef,
    pub method_name: String,
    pub location: Location,
}

/// View types that must not receive automatic identity tags.
#[derive(Debug, Clone)]
pub struct UntaggableDeclaration {
    /// Class carrying the declaration.
    pub owner: TypeRef,
    pub view_types: Vec<TypeRef>,
    pub location: Location,
}

/// Everything the scanner found in one processing round.
#[derive(Debug, Clone, Default)]
pub struct RoundDeclarations {
    pub adapters: Vec<AdapterDeclaration>,
    pub conversions: Vec<ConversionDeclaration>,
    pub renamed_setters: Vec<RenamedSetterDeclaration>,
    pub untaggable: Vec<UntaggableDeclaration>,
}

impl RoundDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classes whose declarations are (re)processed this round.
    pub fn owner_classes(&self) -> FxHashSet<TypeRef> {
        let mut owners = FxHashSet::default();
        owners.extend(self.adapters.iter().map(|a| a.method.owner().clone()));
        owners.extend(self.conversions.iter().map(|c| c.method.owner().clone()));
        owners.extend(self.renamed_setters.iter().map(|r| r.owner.clone()));
        owners.extend(self.untaggable.iter().map(|u| u.owner.clone()));
        owners
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
            && self.conversions.is_empty()
            && self.renamed_setters.is_empty()
            && self.untaggable.is_empty()
    }
}

/// An adapter that passed validation.
#[derive(Debug, PartialEq)]
struct ValidAdapter {
    view_type: TypeRef,
    value_types: Vec<TypeRef>,
}

fn validate_adapter(decl: &AdapterDeclaration) -> Result<ValidAdapter, MalformedDeclaration> {
    let method = &decl.method;
    method.require_public_static("@BindingAdapter")?;

    let attributes = decl.attributes.len();
    if attributes == 0 {
        return Err(MalformedDeclaration::new(
            method.location.clone(),
            format!("binding adapter requires at least one attribute: {}", method.info.name),
        ));
    }

    let mut seen = FxHashSet::default();
    for attribute in &decl.attributes {
        if !seen.insert(AttributeName::new(attribute)) {
            return Err(MalformedDeclaration::new(
                method.location.clone(),
                format!("binding adapter {} lists attribute '{attribute}' twice", method.info.name),
            ));
        }
    }

    let params = &method.info.params;
    if params.len() == 1 + 2 * attributes {
        for i in 1..=attributes {
            if params[i] != params[i + attributes] {
                return Err(MalformedDeclaration::new(
                    method.location.clone(),
                    format!(
                        "binding adapter {}: old values should be followed by new values. \
                         Parameter {} must be the same type as parameter {}.",
                        method.info.name,
                        i + 1,
                        i + attributes + 1
                    ),
                ));
            }
        }
    } else if params.len() != 1 + attributes {
        return Err(MalformedDeclaration::new(
            method.location.clone(),
            format!(
                "binding adapter {} has {} attributes and {} parameters. \
                 There should be {} or {} parameters.",
                method.info.name,
                attributes,
                params.len(),
                attributes + 1,
                attributes * 2 + 1
            ),
        ));
    }

    Ok(ValidAdapter {
        view_type: params[0].clone(),
        value_types: params[1..=attributes].to_vec(),
    })
}

fn validate_conversion(
    decl: &ConversionDeclaration,
) -> Result<(TypeRef, TypeRef), MalformedDeclaration> {
    let method = &decl.method;
    method.require_public_static("@BindingConversion")?;
    if method.info.params.len() != 1 {
        return Err(MalformedDeclaration::new(
            method.location.clone(),
            format!("binding conversion should have one parameter: {}", method.info.name),
        ));
    }
    match &method.info.return_type {
        Some(to) if !to.is_void() => Ok((method.info.params[0].clone(), to.clone())),
        _ => Err(MalformedDeclaration::new(
            method.location.clone(),
            format!("binding conversion must return a value: {}", method.info.name),
        )),
    }
}

fn warn_namespace(attribute: &str, location: &Location, diagnostics: &mut Diagnostics) {
    if AttributeName::has_ignored_namespace(attribute) {
        warn!(attribute, "application namespace will be ignored");
        diagnostics.push(
            Diagnostic::warning(format!(
                "Application namespace for attribute {attribute} will be ignored."
            ))
            .at(location.clone()),
        );
    }
}

impl SetterStore {
    /// Validate and register an adapter declaration.
    pub fn register_adapter(&mut self, decl: &AdapterDeclaration) -> Result<(), RegistrationError> {
        let ValidAdapter {
            view_type,
            mut value_types,
        } = validate_adapter(decl)?;
        let method = decl.method.info.descriptor();
        if let [attribute] = decl.attributes.as_slice() {
            let value_type = value_types.swap_remove(0);
            self.add_adapter(attribute, view_type, value_type, method)
        } else {
            self.add_multi_attribute_adapter(view_type, &decl.attributes, value_types, method)
        }
    }

    /// Validate and register a conversion declaration.
    pub fn register_conversion(
        &mut self,
        decl: &ConversionDeclaration,
    ) -> Result<(), RegistrationError> {
        let (from, to) = validate_conversion(decl)?;
        self.add_conversion(from, to, decl.method.info.descriptor());
        Ok(())
    }

    /// Register a renamed setter declaration.
    pub fn register_renamed_setter(&mut self, decl: &RenamedSetterDeclaration) {
        let method = MethodDescriptor::new(decl.owner.clone(), decl.method_name.clone());
        self.add_renamed_setter(&decl.attribute, decl.target_type.clone(), method);
    }

    /// Register an untaggable declaration.
    pub fn register_untaggable(&mut self, decl: &UntaggableDeclaration) {
        self.add_untaggable(&decl.view_types, decl.owner.clone());
    }

    /// Run one processing round.
    ///
    /// Starts a new round, clears every entry owned by a class declaring
    /// something this round, then registers all declarations. Rejected
    /// declarations become error diagnostics; the others still register.
    pub fn process_round(&mut self, round: &RoundDeclarations) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.begin_round();
        self.clear(&round.owner_classes());

        for adapter in &round.adapters {
            for attribute in &adapter.attributes {
                warn_namespace(attribute, &adapter.method.location, &mut diagnostics);
            }
            if let Err(err) = self.register_adapter(adapter) {
                warn!(error = %err, "rejected binding adapter");
                diagnostics.push(Diagnostic::from(&err).at(adapter.method.location.clone()));
            }
        }
        for renamed in &round.renamed_setters {
            warn_namespace(&renamed.attribute, &renamed.location, &mut diagnostics);
            self.register_renamed_setter(renamed);
        }
        for conversion in &round.conversions {
            match self.register_conversion(conversion) {
                Ok(()) => diagnostics.push(
                    Diagnostic::info(format!("added conversion: {}", conversion.method.info.name))
                        .at(conversion.method.location.clone()),
                ),
                Err(err) => {
                    warn!(error = %err, "rejected binding conversion");
                    diagnostics.push(Diagnostic::from(&err).at(conversion.method.location.clone()));
                }
            }
        }
        for untaggable in &round.untaggable {
            self.register_untaggable(untaggable);
        }

        debug!(
            entries = self.tables().entry_count(),
            errors = diagnostics.error_count(),
            "STORE round processed"
        );
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrbind_core::{DiagnosticKind, MethodModifiers, PrimitiveKind};

    fn ty(name: &str) -> TypeRef {
        TypeRef::parse(name)
    }

    fn static_method(owner: &str, name: &str, params: &[&str], ret: Option<&str>) -> DeclaredMethod {
        let mut info = MethodInfo::setter(ty(owner), name, params.iter().map(|p| ty(p)).collect());
        info.modifiers = MethodModifiers::PUBLIC | MethodModifiers::STATIC;
        info.return_type = ret.map(ty);
        DeclaredMethod::new(info, Location::new(format!("{owner}#{name}"), 10, 5))
    }

    fn adapter(attributes: &[&str], method: DeclaredMethod) -> AdapterDeclaration {
        AdapterDeclaration {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            method,
        }
    }

    #[test]
    fn single_attribute_adapter_registers() {
        let mut store = SetterStore::new();
        let decl = adapter(
            &["app:imageUrl"],
            static_method("Adapters", "loadImage", &["ImageView", "String"], None),
        );
        store.register_adapter(&decl).unwrap();

        let adapters = store.adapters(&AttributeName::new("imageUrl")).unwrap();
        let (key, method) = adapters.iter().next().unwrap();
        assert_eq!(key.view_type, ty("ImageView"));
        assert_eq!(key.value_type, ty("String"));
        assert_eq!(method.method_name, "loadImage");
    }

    #[test]
    fn old_and_new_value_adapter_uses_first_half() {
        let mut store = SetterStore::new();
        let decl = adapter(
            &["padding"],
            static_method("Adapters", "setPadding", &["View", "int", "int"], None),
        );
        store.register_adapter(&decl).unwrap();
        let adapters = store.adapters(&AttributeName::new("padding")).unwrap();
        assert_eq!(adapters.keys().next().unwrap().value_type, TypeRef::from(PrimitiveKind::Int));
    }

    #[test]
    fn mismatched_old_and_new_values_are_malformed() {
        let mut store = SetterStore::new();
        let decl = adapter(
            &["a", "b"],
            static_method("Adapters", "bind", &["View", "int", "String", "int", "int"], None),
        );
        let err = store.register_adapter(&decl).unwrap_err();
        assert!(matches!(err, RegistrationError::Malformed(_)));
        assert!(err.to_string().contains("Parameter 3 must be the same type as parameter 5"));
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let mut store = SetterStore::new();
        let decl = adapter(
            &["a", "b"],
            static_method("Adapters", "bind", &["View", "int"], None),
        );
        let err = store.register_adapter(&decl).unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(10));
    }

    #[test]
    fn non_static_adapter_is_malformed() {
        let mut store = SetterStore::new();
        let mut method = static_method("Adapters", "bind", &["View", "int"], None);
        method.info.modifiers = MethodModifiers::PUBLIC;
        let err = store.register_adapter(&adapter(&["a"], method)).unwrap_err();
        assert!(matches!(err, RegistrationError::Malformed(_)));
    }

    #[test]
    fn void_conversion_is_malformed() {
        let mut store = SetterStore::new();
        let decl = ConversionDeclaration {
            method: static_method("Conversions", "convert", &["int"], None),
        };
        assert!(store.register_conversion(&decl).is_err());

        let decl = ConversionDeclaration {
            method: static_method("Conversions", "convert", &["int", "int"], Some("Drawable")),
        };
        assert!(store.register_conversion(&decl).is_err());
        assert!(store.conversions().is_empty());
    }

    #[test]
    fn multi_attribute_adapter_registers() {
        let mut store = SetterStore::new();
        let decl = adapter(
            &["url", "error"],
            static_method("Adapters", "load", &["ImageView", "String", "Drawable"], None),
        );
        store.register_adapter(&decl).unwrap();
        let (key, _) = store.multi_attribute_adapters().iter().next().unwrap();
        assert_eq!(key.parameter_for(&AttributeName::new("error")), Some(&ty("Drawable")));
    }

    #[test]
    fn process_round_reports_and_continues() {
        let mut store = SetterStore::new();
        let mut round = RoundDeclarations::new();
        round.adapters.push(adapter(
            &["app:src"],
            static_method("Adapters", "first", &["ImageView", "String"], None),
        ));
        round.adapters.push(adapter(
            &["src"],
            static_method("Adapters", "second", &["ImageView", "String"], None),
        ));
        round.conversions.push(ConversionDeclaration {
            method: static_method("Conversions", "toDrawable", &["int"], Some("Drawable")),
        });
        round.untaggable.push(UntaggableDeclaration {
            owner: ty("Adapters"),
            view_types: vec![ty("Fragment")],
            location: Location::element("Adapters"),
        });

        let diagnostics = store.process_round(&round);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Info));
        assert_eq!(store.adapters(&AttributeName::new("src")).unwrap().len(), 1);
        assert!(store.is_untaggable(&ty("Fragment")));
        assert_eq!(store.conversions().len(), 1);
    }

    #[test]
    fn process_round_replaces_stale_declarations() {
        let mut store = SetterStore::new();
        let mut round = RoundDeclarations::new();
        round.adapters.push(adapter(
            &["src"],
            static_method("Adapters", "old", &["ImageView", "Uri"], None),
        ));
        store.process_round(&round);

        let mut round = RoundDeclarations::new();
        round.adapters.push(adapter(
            &["src"],
            static_method("Adapters", "new", &["ImageView", "String"], None),
        ));
        let diagnostics = store.process_round(&round);
        assert!(!diagnostics.has_errors());

        let adapters = store.adapters(&AttributeName::new("src")).unwrap();
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters.values().next().unwrap().method_name, "new");
    }

    #[test]
    fn owner_classes_cover_every_declaration_kind() {
        let mut round = RoundDeclarations::new();
        round.adapters.push(adapter(
            &["src"],
            static_method("A", "bind", &["ImageView", "String"], None),
        ));
        round.conversions.push(ConversionDeclaration {
            method: static_method("B", "convert", &["int"], Some("Drawable")),
        });
        round.renamed_setters.push(RenamedSetterDeclaration {
            owner: ty("C"),
            attribute: "android:tint".into(),
            target_type: ty("ImageView"),
            method_name: "setImageTintList".into(),
            location: Location::element("C"),
        });
        round.untaggable.push(UntaggableDeclaration {
            owner: ty("D"),
            view_types: vec![],
            location: Location::element("D"),
        });
        let owners = round.owner_classes();
        for owner in ["A", "B", "C", "D"] {
            assert!(owners.contains(&ty(owner)));
        }
    }
}
