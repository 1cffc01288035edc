//! Integration tests for setter resolution and multi-attribute covering.


use attrbind::*;
use test_harness::*;

// =============================================================================
// Single attributes
// =============================================================================

#[test]
fn text_on_text_view_is_a_direct_call() {
    let model = widget_model();
    let store = SetterStore::new();

    let (call, diagnostics) = resolve(&store, &model, "android:text", "TextView", "String");
    assert!(diagnostics.is_empty());
    assert_eq!(
        call,
        CallExpression::Direct {
            attribute: AttributeName::new("android:text"),
            method_name: "setText".into(),
            wrapper: ValueWrapper::None,
            min_api: 1,
        }
    );
    assert_eq!(call.render("this.title", &["user.name"]).unwrap(), "this.title.setText(user.name)");
}

#[test]
fn image_url_resolves_to_adapter() {
    let model = widget_model();
    let mut round = RoundDeclarations::new();
    round.adapters.push(adapter(
        &["app:imageUrl"],
        "ImageAdapters",
        "loadImage",
        &["ImageView", "String"],
    ));
    let store = store_with(&round);

    let (call, diagnostics) = resolve(&store, &model, "app:imageUrl", "ImageButton", "String");
    assert!(diagnostics.is_empty());
    assert!(matches!(call, CallExpression::Adapter { .. }));
    assert_eq!(
        call.render("avatar", &["user.photo"]).unwrap(),
        "ImageAdapters.loadImage(avatar, user.photo)"
    );
}

#[test]
fn registered_conversion_wraps_direct_call() {
    let model = widget_model();
    let mut round = RoundDeclarations::new();
    round.conversions.push(conversion("Converters", "convertColorToDrawable", "Integer", "Drawable"));
    let store = store_with(&round);

    let (call, diagnostics) = resolve(&store, &model, "app:background", "View", "Integer");
    assert!(diagnostics.is_empty());
    assert!(matches!(call, CallExpression::Direct { .. }));
    assert_eq!(
        call.render("root", &["color"]).unwrap(),
        "root.setBackground(Converters.convertColorToDrawable(color))"
    );
}

#[test]
fn exact_direct_method_is_never_displaced() {
    let model = widget_model();
    let mut round = RoundDeclarations::new();
    round.adapters.push(adapter(&["textSize"], "A", "exact", &["Button", "float"]));
    round.adapters.push(adapter(&["textSize"], "A", "boxed", &["Button", "Float"]));
    round.conversions.push(conversion("C", "identity", "float", "float"));
    let store = store_with(&round);

    let (call, _) = resolve(&store, &model, "textSize", "Button", "float");
    assert_eq!(call.method_name(), "setTextSize");
    assert!(matches!(
        call,
        CallExpression::Direct {
            wrapper: ValueWrapper::None,
            ..
        }
    ));
}

#[test]
fn renamed_setter_redirects_to_another_method() {
    let mut model = widget_model();
    model.add_setter("ImageView", "setImageTintList", ty("ColorStateList"));
    let mut round = RoundDeclarations::new();
    round.renamed_setters.push(renamed("ImageViewBindings", "android:tint", "ImageView", "setImageTintList"));
    let store = store_with(&round);

    let (call, _) = resolve(&store, &model, "android:tint", "ImageButton", "ColorStateList");
    assert_eq!(call.render("v", &["tint"]).unwrap(), "v.setImageTintList(tint)");
}

#[test]
fn unresolved_attribute_falls_back_with_error() {
    let model = widget_model();
    let store = SetterStore::new();

    let (call, diagnostics) = resolve(&store, &model, "app:fancyBorder", "Button", "int");
    assert!(call.is_fallback());
    assert_eq!(call.render("b", &["1"]).unwrap(), "b.setFancyBorder(1)");
    assert_eq!(diagnostics.error_count(), 1);

    let (_, diagnostics) = resolve(&store, &model, "app:fancyBorder", "ViewDataBinding", "int");
    assert!(diagnostics.is_empty());
}

#[test]
fn resolution_is_deterministic_across_registration_order() {
    let model = widget_model();
    let declarations = vec![
        adapter(&["hint"], "A", "onView", &["View", "CharSequence"]),
        adapter(&["hint"], "B", "onTextView", &["TextView", "Object"]),
        adapter(&["hint"], "C", "onEditText", &["EditText", "CharSequence"]),
        adapter(&["hint"], "D", "boxed", &["TextView", "Integer"]),
    ];

    let mut forward = RoundDeclarations::new();
    forward.adapters = declarations.clone();
    let mut backward = RoundDeclarations::new();
    backward.adapters = declarations.into_iter().rev().collect();

    let forward = store_with(&forward);
    let backward = store_with(&backward);

    for (view, value) in [("Button", "String"), ("EditText", "String"), ("View", "int"), ("TextView", "Object")] {
        let (a, _) = resolve(&forward, &model, "hint", view, value);
        let (b, _) = resolve(&backward, &model, "hint", view, value);
        let (again, _) = resolve(&forward, &model, "hint", view, value);
        assert_eq!(a, b, "{view} / {value}");
        assert_eq!(a, again);
    }

    let (call, _) = resolve(&forward, &model, "hint", "EditText", "String");
    assert_eq!(call.method_name(), "onEditText");
    let (call, _) = resolve(&forward, &model, "hint", "Button", "String");
    assert_eq!(call.method_name(), "onTextView");
}

#[test]
fn import_aliases_qualify_registry_keys() {
    let mut model = StaticTypeModel::standard();
    model
        .add_class("android.widget.ImageView", None)
        .add_class("android.net.Uri", None);
    let mut store = SetterStore::new();
    store
        .add_adapter(
            "imageUri",
            ty("ImageView"),
            ty("Uri"),
            MethodDescriptor::new(ty("Adapters"), "loadUri"),
        )
        .unwrap();

    let mut imports = ImportAliases::default();
    imports.insert("ImageView".into(), "android.widget.ImageView".into());
    imports.insert("Uri".into(), "android.net.Uri".into());
    let ctx = ResolutionContext::new(&store, &model).with_imports(imports);

    let mut diagnostics = Diagnostics::new();
    let call = ctx.resolve_setter(
        "imageUri",
        &ty("android.widget.ImageView"),
        &ty("android.net.Uri"),
        &mut diagnostics,
    );
    assert_eq!(call.method_name(), "loadUri");
    assert!(diagnostics.is_empty());
}

// =============================================================================
// Multiple attributes
// =============================================================================

fn resolve_all(store: &SetterStore, model: &StaticTypeModel, view: &str, bindings: &[(&str, &str)]) -> Vec<CallExpression> {
    let attributes: Vec<&str> = bindings.iter().map(|(a, _)| *a).collect();
    let values: Vec<TypeRef> = bindings.iter().map(|(_, v)| ty(v)).collect();
    let ctx = ResolutionContext::new(store, model);
    let mut diagnostics = Diagnostics::new();
    ctx.resolve_multi_attribute(&attributes, &ty(view), &values, &mut diagnostics)
}

#[test]
fn overlapping_adapters_consume_each_attribute_once() {
    let mut model = widget_model();
    model.add_setter("View", "setC", ty("int"));
    let mut round = RoundDeclarations::new();
    round.adapters.push(adapter(&["a", "b"], "Pair", "ab", &["View", "int", "int"]));
    round.adapters.push(adapter(&["b", "c"], "Pair", "bc", &["View", "int", "int"]));
    let store = store_with(&round);

    let calls = resolve_all(&store, &model, "Button", &[("a", "int"), ("b", "int"), ("c", "int")]);
    assert_eq!(calls.len(), 2);

    let multi: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, CallExpression::MultiAdapter { .. }))
        .collect();
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0].arity(), 2);

    let mut seen = Vec::new();
    for call in &calls {
        for attribute in call.attributes() {
            assert!(!seen.contains(attribute), "{attribute} bound twice");
            seen.push(attribute.clone());
        }
    }
    assert_eq!(seen.len(), 3);

    let single = calls.iter().find(|c| c.arity() == 1).unwrap();
    assert_eq!(single.attributes(), &[AttributeName::new("c")]);
    assert_eq!(single.method_name(), "setC");
}

#[test]
fn adapter_with_unmatched_value_is_not_used() {
    let model = widget_model();
    let mut round = RoundDeclarations::new();
    round.adapters.push(adapter(
        &["src", "placeholder"],
        "ImageAdapters",
        "load",
        &["ImageView", "String", "Drawable"],
    ));
    let store = store_with(&round);

    let calls = resolve_all(&store, &model, "ImageView", &[("src", "String"), ("placeholder", "int")]);
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.arity() == 1));
}

#[test]
fn multi_adapter_applies_conversions_and_casts() {
    let model = widget_model();
    let mut round = RoundDeclarations::new();
    round.adapters.push(adapter(
        &["app:src", "app:placeholder"],
        "ImageAdapters",
        "load",
        &["ImageView", "String", "Drawable"],
    ));
    round.conversions.push(conversion("Converters", "toDrawable", "int", "Drawable"));
    let store = store_with(&round);

    let calls = resolve_all(
        &store,
        &model,
        "ImageButton",
        &[("placeholder", "int"), ("src", "Object")],
    );
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].render("v", &["s", "p"]).unwrap(),
        "ImageAdapters.load(v, (String) s, Converters.toDrawable(p))"
    );
    assert_eq!(
        calls[0].render("v", &["s"]),
        Err(attrbind_core::RenderError::ArityMismatch {
            call: "load".into(),
            expected: 2,
            found: 1,
        })
    );
}

#[test]
fn multi_attribute_resolution_is_deterministic() {
    let model = widget_model();
    let adapters = vec![
        adapter(&["a", "b"], "P", "ab", &["View", "int", "int"]),
        adapter(&["b", "c"], "P", "bc", &["TextView", "long", "long"]),
        adapter(&["a", "c"], "P", "ac", &["View", "Integer", "int"]),
        adapter(&["a", "b", "c", "d"], "P", "abcd", &["View", "int", "int", "int", "int"]),
    ];
    let mut forward = RoundDeclarations::new();
    forward.adapters = adapters.clone();
    let mut backward = RoundDeclarations::new();
    backward.adapters = adapters.into_iter().rev().collect();

    let bindings = [("c", "int"), ("a", "int"), ("b", "int")];
    let a = resolve_all(&store_with(&forward), &model, "Button", &bindings);
    let b = resolve_all(&store_with(&backward), &model, "Button", &bindings);
    assert_eq!(a, b);
    // TextView is deeper than View, so bc wins the two-attribute tie.
    assert_eq!(a[0].method_name(), "bc");
}
