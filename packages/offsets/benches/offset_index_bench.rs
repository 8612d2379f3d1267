use bdoc_offsets::OffsetIndex;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_text(repeat: usize) -> String {
    "This is a simple 💩 document. It has two sentences.\n".repeat(repeat)
}

fn build_small_index(c: &mut Criterion) {
    let text = sample_text(1);

    c.bench_function("build_small_index", |b| {
        b.iter(|| OffsetIndex::build(black_box(&text)))
    });
}

fn build_large_index(c: &mut Criterion) {
    let text = sample_text(10_000);

    c.bench_function("build_large_index", |b| {
        b.iter(|| OffsetIndex::build(black_box(&text)))
    });
}

fn convert_every_offset(c: &mut Criterion) {
    let text = sample_text(1_000);
    let index = OffsetIndex::build(&text);

    c.bench_function("convert_every_offset", |b| {
        b.iter(|| {
            for offset in 0..=index.unit_len() {
                let point = index.to_code_point(black_box(offset)).unwrap_or(0);
                black_box(index.to_code_unit(point).unwrap_or(0));
            }
        })
    });
}

criterion_group!(
    benches,
    build_small_index,
    build_large_index,
    convert_every_offset
);
criterion_main!(benches);
