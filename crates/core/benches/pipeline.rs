use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pagemark_core::{Mode, convert};

fn synthetic_page(paragraphs: usize) -> String {
    let para = "<p>Benchmark prose paragraph, with commas, clauses, and enough words \
                to exercise the density scoring, the link analysis, and the renderer, \
                over and over again.</p>";
    format!(
        r#"<html><body>
            <nav class="nav-menu"><a href="https://example.com/">Home</a></nav>
            <article>{}</article>
            <div class="footer"><a href="https://example.com/c">Contact</a></div>
        </body></html>"#,
        para.repeat(paragraphs)
    )
}

fn bench_convert(c: &mut Criterion) {
    let small = synthetic_page(10);
    let large = synthetic_page(200);

    c.bench_function("convert_summary_small", |b| {
        b.iter(|| convert(black_box(&small), Mode::Summary))
    });
    c.bench_function("convert_summary_large", |b| {
        b.iter(|| convert(black_box(&large), Mode::Summary))
    });
    c.bench_function("convert_detailed_large", |b| {
        b.iter(|| convert(black_box(&large), Mode::Detailed))
    });
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
