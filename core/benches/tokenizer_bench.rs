use criterion::{criterion_group, criterion_main, Criterion};
use scholardex_core::tokenizer::tokenize;

const SAMPLE: &str = "The quick brown fox jumps over the lazy dog. \
    Running, runners, and the runner's run all stem to the same root. \
    Pack my box with five dozen liquor jugs, and e-mail a@b if #tag matters.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenize(SAMPLE)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
