//! Benchmarks for the text and markdown conversion engine.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use twinpad::convert::{markdown_to_text, text_to_markdown};

fn note_text(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 5 {
            0 => format!("SECTION {i}"),
            1 => format!("- item {i}"),
            2 => format!("{i}. step"),
            3 => String::new(),
            _ => format!("plain sentence number {i} with some words"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_text_to_markdown(c: &mut Criterion) {
    let small = "HELLO WORLD\n- item one\n* item two\nplain line";
    let large = note_text(2000);
    c.bench_function("text_to_markdown_small", |b| {
        b.iter(|| text_to_markdown(black_box(small)))
    });
    c.bench_function("text_to_markdown_large", |b| {
        b.iter(|| text_to_markdown(black_box(&large)))
    });
}

fn bench_markdown_to_text(c: &mut Criterion) {
    let small = "## Title\n**bold** and *italic* and `code`\n[link](http://x)";
    let large = text_to_markdown(&note_text(2000)).replace("step", "**step** [ref](http://x)");
    c.bench_function("markdown_to_text_small", |b| {
        b.iter(|| markdown_to_text(black_box(small)))
    });
    c.bench_function("markdown_to_text_large", |b| {
        b.iter(|| markdown_to_text(black_box(&large)))
    });
}

criterion_group!(benches, bench_text_to_markdown, bench_markdown_to_text);
criterion_main!(benches);
