use criterion::{black_box, criterion_group, criterion_main, Criterion};
use confex::{Context, EvalOptions, Program};

fn make_script(terms: usize) -> String {
    let term = "max(lookup(sensor.temp), 18) * 2";
    vec![term; terms].join(" + ")
}

fn bench_eval(c: &mut Criterion) {
    let small = make_script(1);
    let large = make_script(200);
    let opts = EvalOptions::default();
    let ctx = Context::from_json_str(r#"{"sensor": {"temp": 21.5}}"#).unwrap();

    let mut g = c.benchmark_group("confex");

    g.bench_function("compile_small", |b| {
        b.iter(|| Program::compile(black_box(&small), &opts))
    });
    g.bench_function("compile_large", |b| {
        b.iter(|| Program::compile(black_box(&large), &opts))
    });

    let program = Program::compile(&large, &opts).unwrap();
    g.bench_function("run_large", |b| {
        b.iter(|| program.run(black_box(&ctx), &opts))
    });
    g.bench_function("compile_and_run_small", |b| {
        b.iter(|| confex::evaluate_with(black_box(&small), &ctx, &opts))
    });

    g.finish();
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
