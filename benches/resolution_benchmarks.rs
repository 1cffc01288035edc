//! Benchmarks for setter resolution and snapshot persistence.
//!
//! Workloads:
//! - Single attributes against deep view hierarchies with many adapters
//! - Multi-attribute covering with overlapping adapters
//! - Snapshot encode/decode of a populated store
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use attrbind::{
    Diagnostics, MethodDescriptor, ResolutionContext, SetterStore, StaticTypeModel, TypeRef,
};
use attrbind_registry::snapshot;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn ty(name: &str) -> TypeRef {
    TypeRef::parse(name)
}

/// `View0 <- View1 <- ... <- View{depth-1}`, each level with a `setText(String)`
/// overload taking its own value type.
fn hierarchy(depth: usize) -> StaticTypeModel {
    let mut model = StaticTypeModel::standard();
    model.add_class("View0", None);
    for level in 1..depth {
        model.add_class(&format!("View{level}"), Some(&format!("View{}", level - 1)));
    }
    for level in 0..depth {
        model.add_class(&format!("Value{level}"), None);
        model.add_setter(&format!("View{level}"), "setText", ty(&format!("Value{level}")));
    }
    model
}

/// One adapter per (view level, attribute), plus conversions.
fn populated_store(depth: usize, attributes: usize) -> SetterStore {
    let mut store = SetterStore::new();
    for level in 0..depth {
        for attribute in 0..attributes {
            let _ = store.add_adapter(
                &format!("app:attr{attribute}"),
                ty(&format!("View{level}")),
                ty("String"),
                MethodDescriptor::new(ty("Adapters"), format!("bind{level}_{attribute}")),
            );
        }
        store.add_conversion(
            ty("int"),
            ty(&format!("Value{level}")),
            MethodDescriptor::new(ty("Converters"), format!("toValue{level}")),
        );
    }
    store
}

fn single_attribute_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("resolve/single");

    for depth in [4usize, 16, 64] {
        let model = hierarchy(depth);
        let store = populated_store(depth, 8);
        let view = ty(&format!("View{}", depth - 1));

        group.bench_with_input(BenchmarkId::new("adapter", depth), &depth, |b, _| {
            let ctx = ResolutionContext::new(&store, &model);
            b.iter(|| {
                let mut diagnostics = Diagnostics::new();
                let call =
                    ctx.resolve_setter(black_box("app:attr3"), &view, &ty("String"), &mut diagnostics);
                end_profiling_frame();
                black_box(call)
            });
        });

        group.bench_with_input(BenchmarkId::new("conversion", depth), &depth, |b, _| {
            let ctx = ResolutionContext::new(&store, &model);
            b.iter(|| {
                let mut diagnostics = Diagnostics::new();
                let call = ctx.resolve_setter(black_box("text"), &view, &ty("int"), &mut diagnostics);
                end_profiling_frame();
                black_box(call)
            });
        });
    }
    group.finish();
}

fn multi_attribute_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("resolve/multi");

    for attributes in [4usize, 8, 16] {
        let model = hierarchy(4);
        let mut store = populated_store(4, attributes);
        let names: Vec<String> = (0..attributes).map(|i| format!("attr{i}")).collect();
        // Overlapping windows of three attributes.
        for start in 0..attributes.saturating_sub(2) {
            let window = &names[start..start + 3];
            let _ = store.add_multi_attribute_adapter(
                ty("View0"),
                window,
                vec![ty("String"); 3],
                MethodDescriptor::new(ty("Adapters"), format!("window{start}")),
            );
        }
        let values = vec![ty("String"); attributes];
        let view = ty("View3");

        group.throughput(Throughput::Elements(attributes as u64));
        group.bench_with_input(BenchmarkId::new("windows", attributes), &attributes, |b, _| {
            let ctx = ResolutionContext::new(&store, &model);
            b.iter(|| {
                let mut diagnostics = Diagnostics::new();
                let calls = ctx.resolve_multi_attribute(&names, &view, &values, &mut diagnostics);
                end_profiling_frame();
                black_box(calls)
            });
        });
    }
    group.finish();
}

fn snapshot_benchmarks(c: &mut Criterion) {
    let tables = populated_store(64, 32).into_tables();
    let bytes = snapshot::encode(&tables).unwrap();

    let mut group = c.benchmark_group("snapshot");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| b.iter(|| snapshot::encode(black_box(&tables)).unwrap()));
    group.bench_function("decode", |b| b.iter(|| snapshot::decode(black_box(&bytes)).unwrap()));
    group.finish();
}

criterion_group!(
    benches,
    single_attribute_benchmarks,
    multi_attribute_benchmarks,
    snapshot_benchmarks
);
criterion_main!(benches);
