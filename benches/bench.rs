//! Criterion benchmarks for the Tessera engine.
//!
//! Covers bigram tokenization, index commits (sequential and parallel
//! tokenization) and query evaluation.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use tessera::analysis::tokenizer::{BigramTokenizer, Tokenizer};
use tessera::config::StoreConfig;
use tessera::index::builder::SnapshotBuilder;
use tessera::store::CollectionStore;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<(String, String)> {
    let words = [
        "全文", "检索", "引擎", "开源", "工具包", "软件", "基金会", "项目", "索引", "查询",
        "程序库", "信息", "搜索", "架构", "Lucene", "Java", "文本", "分析", "语言", "接口",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 20 + (i % 40);
        let mut text = String::new();
        for j in 0..doc_length {
            let word_idx = (i * 7 + j * 13) % words.len();
            text.push_str(words[word_idx]);
        }
        documents.push((format!("doc-{i:06}"), text));
    }

    documents
}

/// Benchmark bigram tokenization.
fn bench_tokenization(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenization");

    let tokenizer = BigramTokenizer::new();
    let documents = generate_test_documents(1000);

    group.bench_function("tokenize_single_document", |b| {
        b.iter(|| {
            let terms = tokenizer.terms(black_box(&documents[0].1));
            black_box(terms)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("tokenize_batch_documents", |b| {
        b.iter(|| {
            for (_, text) in documents.iter().take(100) {
                let _ = black_box(tokenizer.terms(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark snapshot construction.
fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    group.sample_size(20);

    let tokenizer = BigramTokenizer::new();
    let documents = generate_test_documents(5000);

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("build_sequential", |b| {
        let builder = SnapshotBuilder::new(&tokenizer).with_parallel_threshold(usize::MAX);
        b.iter(|| black_box(builder.build(black_box(&documents), 1)))
    });

    group.bench_function("build_parallel", |b| {
        let builder = SnapshotBuilder::new(&tokenizer).with_parallel_threshold(1);
        b.iter(|| black_box(builder.build(black_box(&documents), 1)))
    });

    group.finish();
}

/// Benchmark query evaluation through the store.
fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let store = CollectionStore::open(StoreConfig::default()).unwrap();
    for (id, text) in generate_test_documents(5000) {
        store.source("bench", &id, &text).unwrap();
    }
    store.index("bench").unwrap();

    group.bench_function("two_words", |b| {
        b.iter(|| black_box(store.query("bench", black_box(["全文", "开源"]), 1024)))
    });

    group.bench_function("long_word", |b| {
        b.iter(|| black_box(store.query("bench", black_box(["检索引擎开源"]), 1024)))
    });

    group.bench_function("single_scalar", |b| {
        b.iter(|| black_box(store.query("bench", black_box(["源"]), 1024)))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| black_box(store.query("bench", black_box(["不存在"]), 1024)))
    });

    group.finish();
}

criterion_group!(benches, bench_tokenization, bench_commit, bench_query);
criterion_main!(benches);
