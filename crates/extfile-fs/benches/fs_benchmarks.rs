use criterion::{Criterion, black_box, criterion_group, criterion_main};
use extfile_fs::{ExternalFileStore, NormalizedPath, WriteMode, io};
use tempfile::tempdir;

fn write_atomic_benchmark(c: &mut Criterion) {
    c.bench_function("io::write_atomic", |b| {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("T-request.xml"));
        let content = "<soap:Envelope/>".as_bytes();

        b.iter(|| {
            io::write_atomic(black_box(&path), black_box(content)).unwrap();
        })
    });
}

fn store_write_benchmark(c: &mut Criterion) {
    c.bench_function("store::write (clean skip)", |b| {
        let dir = tempdir().unwrap();
        let store = ExternalFileStore::new(NormalizedPath::new(dir.path()));
        let path = store.resolve("P/S/C/T-request.xml");
        store
            .write(&path, "<soap/>", WriteMode { dirty: true, normalize_line_breaks: false })
            .unwrap();

        b.iter(|| {
            store
                .write(black_box(&path), "<soap/>", WriteMode::default())
                .unwrap();
        })
    });
}

fn locate_benchmark(c: &mut Criterion) {
    c.bench_function("io::locate (normalization fallback)", |b| {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("cafe\u{301}.groovy"), "x").unwrap();
        let path = NormalizedPath::new(dir.path().join("caf\u{e9}.groovy"));

        b.iter(|| {
            assert!(io::locate(black_box(&path)).is_some());
        })
    });
}

criterion_group!(
    benches,
    write_atomic_benchmark,
    store_write_benchmark,
    locate_benchmark
);
criterion_main!(benches);
