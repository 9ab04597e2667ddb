use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quoll::{parse, Interpreter, Scanner};

const PROGRAM: &str = r#"
    (def person {:name "Ann" :greet #(core/str "Hi " %)})
    (def names ["a" "b" "c" "d"])
    (let [greeting (.greet person (.-name person))
          joined (.join names ",")]
      [greeting joined (.toUpperCase joined)])
"#;

fn reader_benchmark(c: &mut Criterion) {
    c.bench_function("read program", |b| {
        b.iter(|| Scanner::new(black_box(PROGRAM)).scan_document())
    });
}

fn parser_benchmark(c: &mut Criterion) {
    c.bench_function("parse program", |b| b.iter(|| parse(black_box(PROGRAM))));
}

fn evaluation_benchmark(c: &mut Criterion) {
    let interpreter = Interpreter::new();
    let document = parse(PROGRAM).document;

    c.bench_function("evaluate program", |b| {
        b.iter(|| tokio_test::block_on(interpreter.evaluate(black_box(&document))).is_ok())
    });
}

criterion_group!(
    benches,
    reader_benchmark,
    parser_benchmark,
    evaluation_benchmark
);
criterion_main!(benches);
