use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edit_core::history::History;
use edit_core::search::SearchContext;
use std::io::Cursor;

fn build_haystack() -> Vec<u8> {
    let mut text = Vec::new();
    for i in 0..2000 {
        text.extend_from_slice(format!("Prefix match_{i} Suffix\n").as_bytes());
    }
    text
}

fn search_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_execution");

    group.bench_function("find_literal_near_start", |b| {
        let haystack = build_haystack();
        let history = History::new(haystack.len() as i64);
        b.iter(|| {
            let mut source = Cursor::new(haystack.clone());
            let mut ctx = SearchContext::new(b"match_5", 0, haystack.len() as i64, false, false).unwrap();
            black_box(ctx.next_match(0, history.table(), &mut source).unwrap());
        })
    });

    group.bench_function("find_literal_near_end", |b| {
        let haystack = build_haystack();
        let history = History::new(haystack.len() as i64);
        b.iter(|| {
            let mut source = Cursor::new(haystack.clone());
            let mut ctx = SearchContext::new(b"match_1999", 0, haystack.len() as i64, false, false).unwrap();
            black_box(ctx.next_match(0, history.table(), &mut source).unwrap());
        })
    });

    group.bench_function("reverse_find_from_end", |b| {
        let haystack = build_haystack();
        let history = History::new(haystack.len() as i64);
        b.iter(|| {
            let mut source = Cursor::new(haystack.clone());
            let mut ctx = SearchContext::new(b"match_10", 0, haystack.len() as i64, false, true).unwrap();
            black_box(ctx.next_match(0, history.table(), &mut source).unwrap());
        })
    });

    group.finish();
}

criterion_group!(benches, search_execution);
criterion_main!(benches);
