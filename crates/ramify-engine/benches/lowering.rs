use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ramify_engine::{parse_source, Compiler, Lexer, LoweringOptions};

/// A function with `depth` nested conditionals, each with an else branch
fn nested_source(depth: usize) -> String {
    let mut src = String::from("def f(a: f64, b: f64):\n    one = constant(1.0)\n");
    for level in 0..depth {
        let pad = "    ".repeat(level + 1);
        src.push_str(&format!("{pad}if a < b:\n{pad}    m = alloca([{n}, {n}], f64)\n", n = level + 2));
    }
    for level in (0..depth).rev() {
        let pad = "    ".repeat(level + 1);
        src.push_str(&format!("{pad}else:\n{pad}    x = a * b + one\n"));
    }
    src
}

/// `count` sibling conditionals at the top level
fn sibling_source(count: usize) -> String {
    let mut src = String::from("def f(a: si64, b: si64):\n");
    for i in 0..count {
        src.push_str(&format!("    if a < b + {i}:\n        c = a * {i}\n"));
    }
    src
}

fn bench_lex(c: &mut Criterion) {
    let source = sibling_source(64);
    c.bench_function("lex_siblings_64", |b| {
        b.iter(|| Lexer::new(black_box(&source)).tokenize().unwrap());
    });
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");
    for depth in [1usize, 4, 16] {
        let source = nested_source(depth);
        let ast = parse_source(&source).unwrap();
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("lower", depth), &ast, |b, ast| {
            b.iter(|| {
                ramify_engine::lower_module(black_box(ast), &LoweringOptions::default()).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let compiler = Compiler::default();
    for count in [8usize, 64] {
        let source = sibling_source(count);
        group.bench_with_input(BenchmarkId::new("siblings", count), &source, |b, source| {
            b.iter(|| compiler.emit(black_box(source)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lex, bench_nested, bench_end_to_end);
criterion_main!(benches);
