use criterion::{criterion_group, criterion_main, Criterion};
use termstore_core::{Client, MemoryStore, Operator};

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
];

fn build_client() -> Client<MemoryStore> {
    let client = Client::new(MemoryStore::new(), "bench");
    for i in 0..2_000usize {
        let text: Vec<&str> = (0..12).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
        client.index(&text.join(" "), &i.to_string()).expect("index");
    }
    client
}

fn bench_query(c: &mut Criterion) {
    let client = build_client();
    c.bench_function("query_and", |b| b.iter(|| client.query("alpha delta golf", Operator::And)));
    c.bench_function("query_or", |b| b.iter(|| client.query("alpha delta golf", Operator::Or)));
}

criterion_group!(benches, bench_query);
criterion_main!(benches);
