use criterion::{Criterion, black_box, criterion_group, criterion_main};
use extfile_core::{ComposeSelectors, ContentKind, NamingMode, TreePosition, derive_path};

fn derive_path_benchmark(c: &mut Criterion) {
    let position = TreePosition::project("Billing API")
        .with_suite("Invoices")
        .with_case("Create: draft*")
        .with_step("POST /invoices")
        .with_assertion("Status is 201");
    let script = ContentKind::script();
    let request = ContentKind::request();
    let selectors = ComposeSelectors {
        project: true,
        case: true,
        ..ComposeSelectors::default()
    };

    c.bench_function("derive_path AUTO", |b| {
        b.iter(|| derive_path(NamingMode::Auto, black_box(&position), &script, selectors, None))
    });
    c.bench_function("derive_path COMPOSED", |b| {
        b.iter(|| derive_path(NamingMode::Composed, black_box(&position), &request, selectors, None))
    });
    c.bench_function("derive_path MANUAL", |b| {
        b.iter(|| {
            derive_path(
                NamingMode::Manual,
                black_box(&position),
                &script,
                selectors,
                Some("shared/../scripts/check?.groovy"),
            )
        })
    });
}

criterion_group!(benches, derive_path_benchmark);
criterion_main!(benches);
