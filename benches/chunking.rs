use criterion::{Criterion, black_box, criterion_group, criterion_main};

use studyrag::services::WordChunker;

fn synthetic_chapter(words: usize) -> String {
    (0..words)
        .map(|i| format!("word{}", i % 97))
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_chunking(c: &mut Criterion) {
    let text = synthetic_chapter(50_000);
    let chunker = WordChunker::new(500, 50).unwrap();

    c.bench_function("chunk_50k_words", |b| {
        b.iter(|| chunker.chunk(black_box(&text)))
    });

    let small = synthetic_chapter(2_000);
    c.bench_function("chunk_2k_words", |b| {
        b.iter(|| chunker.chunk(black_box(&small)))
    });
}

criterion_group!(benches, bench_chunking);
criterion_main!(benches);
