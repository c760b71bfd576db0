use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mispli::{Evaluator, Scanner};

fn lexer_benchmark(c: &mut Criterion) {
    let source = r#"
        (defun fib (n)
          (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))
        (setq items '(1 2.5 "three" four (5 . 6)))
    "#;

    c.bench_function("tokenize simple program", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(black_box(source));
            scanner.scan_tokens().unwrap()
        })
    });
}

fn evaluator_benchmark(c: &mut Criterion) {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str("(defun fib (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))")
        .unwrap();
    let call = evaluator.read("(fib 15)").unwrap();

    c.bench_function("recursive fib 15", |b| {
        b.iter(|| evaluator.execute(black_box(&call)).unwrap())
    });

    let mut evaluator = Evaluator::new();
    let expand = evaluator
        .read("(let ((n 0)) (while (< n 100) (incf n)) n)")
        .unwrap();

    c.bench_function("macro expansion in loop", |b| {
        b.iter(|| evaluator.execute(black_box(&expand)).unwrap())
    });
}

criterion_group!(benches, lexer_benchmark, evaluator_benchmark);
criterion_main!(benches);
