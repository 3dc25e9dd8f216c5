use attercop::text::Standardizer;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn standardize(c: &mut Criterion) {
    let texts: Vec<String> = [
        "RT @handle: Check this out!! https://t.co/abc123 &amp; more \u{1f602}\u{1f602}",
        "Looooove the new update\u{2026} so goooood \u{1f4af} #blessed #winning",
        "@user1 @user2 wrote: \u{201c}quoted text\u{201d} at http://example.com/a?b=c",
        "plain tweet with nothing special in it at all.",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let standardizer = Standardizer::StandardizeAnonymize;
    c.bench_function("standardize_anonymize", |b| {
        b.iter(|| {
            for text in &texts {
                standardizer.apply(black_box(text));
            }
        })
    });
}

criterion_group!(benches, standardize);
criterion_main!(benches);
