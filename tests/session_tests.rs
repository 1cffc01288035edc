//! Integration tests for sessions: snapshots on disk, rounds and module merging.


use std::fs;

use attrbind::*;
use tempfile::tempdir;
use test_harness::*;

fn image_url_round(owner: &str, method: &str) -> RoundDeclarations {
    let mut round = RoundDeclarations::new();
    round
        .adapters
        .push(adapter(&["app:imageUrl"], owner, method, &["ImageView", "String"]));
    round
}

fn single_module(name: &str) -> ModuleGraph {
    let mut graph = ModuleGraph::new();
    graph.add_module(name);
    graph
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn round_is_persisted_and_restored() {
    let dir = tempdir().unwrap();
    let config = BindingConfig::new("app", dir.path());
    let graph = single_module("app");

    let session = BindingSession::open(config.clone(), &graph).unwrap();
    let diagnostics = session.process_round(&image_url_round("ImageAdapters", "loadImage")).unwrap();
    assert!(!diagnostics.has_errors());
    assert!(config.snapshot_path().exists());
    let saved = session.close();

    let reopened = BindingSession::open(config, &graph).unwrap();
    assert_eq!(reopened.tables(), saved);

    let model = widget_model();
    let mut diagnostics = Diagnostics::new();
    let call = reopened.resolve_setter(&model, "app:imageUrl", &ty("ImageView"), &ty("String"), &mut diagnostics);
    assert_eq!(call.method_name(), "loadImage");
}

#[test]
fn repeated_round_is_idempotent() {
    let dir = tempdir().unwrap();
    let config = BindingConfig::new("app", dir.path());
    let session = BindingSession::open(config.clone(), &single_module("app")).unwrap();

    let mut round = image_url_round("ImageAdapters", "loadImage");
    round.conversions.push(conversion("Converters", "toDrawable", "int", "Drawable"));
    round.untaggable.push(untaggable("ImageAdapters", &["Fragment"]));

    session.process_round(&round).unwrap();
    let first_tables = session.tables();
    let first_bytes = fs::read(config.snapshot_path()).unwrap();

    let diagnostics = session.process_round(&round).unwrap();
    assert!(!diagnostics.has_errors(), "{diagnostics}");
    assert_eq!(session.tables(), first_tables);
    assert_eq!(fs::read(config.snapshot_path()).unwrap(), first_bytes);
}

#[test]
fn duplicate_adapter_within_a_round_is_reported() {
    let dir = tempdir().unwrap();
    let session = BindingSession::open(BindingConfig::new("app", dir.path()), &single_module("app")).unwrap();

    let mut round = image_url_round("First", "load");
    round.adapters.extend(image_url_round("Second", "load").adapters);
    let diagnostics = session.process_round(&round).unwrap();
    assert_eq!(diagnostics.error_count(), 1);
}

// =============================================================================
// Module dependencies
// =============================================================================

#[test]
fn nearer_module_wins_on_shared_keys() {
    let dir = tempdir().unwrap();
    let model = widget_model();

    let lib = BindingSession::open(BindingConfig::new("lib", dir.path()), &single_module("lib")).unwrap();
    lib.process_round(&image_url_round("LibAdapters", "load")).unwrap();
    drop(lib);

    let mut graph = ModuleGraph::new();
    graph.add_dependency("app", "lib");
    let app = BindingSession::open(BindingConfig::new("app", dir.path()), &graph).unwrap();

    let mut diagnostics = Diagnostics::new();
    let inherited = app.resolve_setter(&model, "app:imageUrl", &ty("ImageView"), &ty("String"), &mut diagnostics);
    assert_eq!(inherited.render("v", &["url"]).unwrap(), "LibAdapters.load(v, url)");

    // Redeclaring a key that arrived from a dependency is not a duplicate.
    let diagnostics = app.process_round(&image_url_round("AppAdapters", "load")).unwrap();
    assert!(!diagnostics.has_errors(), "{diagnostics}");
    drop(app);

    let app = BindingSession::open(BindingConfig::new("app", dir.path()), &graph).unwrap();
    let mut diagnostics = Diagnostics::new();
    let call = app.resolve_setter(&model, "app:imageUrl", &ty("ImageView"), &ty("String"), &mut diagnostics);
    assert_eq!(call.render("v", &["url"]).unwrap(), "AppAdapters.load(v, url)");
}

#[test]
fn corrupt_dependency_snapshot_is_ignored() {
    let dir = tempdir().unwrap();
    let config = BindingConfig::new("app", dir.path());
    fs::write(config.snapshot_layout().path_for("lib"), b"not a snapshot").unwrap();

    let mut graph = ModuleGraph::new();
    graph.add_dependency("app", "lib");
    let session = BindingSession::open(config, &graph).unwrap();
    assert!(session.tables().is_empty());
}

#[test]
fn missing_module_name_is_rejected() {
    let dir = tempdir().unwrap();
    let err = BindingSession::open(BindingConfig::new("  ", dir.path()), &ModuleGraph::new()).unwrap_err();
    assert!(matches!(err, BindingError::Config(_)));
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn untaggable_views_are_reported() {
    let session = BindingSession::with_tables(BindingConfig::new("app", "."), StoreTables::new());
    assert!(!session.is_untaggable(&ty("Fragment")));

    let mut store = SetterStore::from_tables(session.close());
    store.register_untaggable(&untaggable("Fragments", &["Fragment", "DialogFragment"]));
    let session = BindingSession::with_tables(BindingConfig::new("app", "."), store.into_tables());
    assert!(session.is_untaggable(&ty("DialogFragment")));
    assert!(!session.is_untaggable(&ty("View")));
}

#[test]
fn configured_platform_version_reaches_adapter_calls() {
    let config = BindingConfig::from_toml_str(
        r#"
        module_name = "app"
        min_platform_version = 14
        "#,
    )
    .unwrap();
    let store = store_with(&image_url_round("ImageAdapters", "loadImage"));
    let session = BindingSession::with_tables(config, store.into_tables());
    let model = widget_model();

    let mut diagnostics = Diagnostics::new();
    let call = session.resolve_setter(&model, "imageUrl", &ty("ImageButton"), &ty("String"), &mut diagnostics);
    assert!(matches!(call, CallExpression::Adapter { .. }));
    assert_eq!(call.min_api(), 14);

    // Direct calls keep the method's own version.
    let call = session.resolve_setter(&model, "android:text", &ty("TextView"), &ty("String"), &mut diagnostics);
    assert_eq!(call.min_api(), 1);
}

#[test]
fn config_file_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("attrbind.toml");
    fs::write(
        &path,
        r#"
        module_name = "feature"
        snapshot_suffix = ".store"
        "#,
    )
    .unwrap();

    let config = BindingConfig::load(&path).unwrap();
    assert_eq!(config.module_name, "feature");
    assert_eq!(config.snapshot_path(), std::path::Path::new(".").join("feature.store"));

    let missing = BindingConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));
}
