use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stoch::{EvalConfig, Poly, evaluate, parse_program, run};

const WALK: &str = "
    init ([0, 10], [0, 10]);
    iter {
        rotation(5, 5, 360 / 7) or translation((x + 1) ^ 2 - x ^ 2 - 2 * x, -1);
        rotation(0, 0, y - y + 3)
    }
";

fn bench_poly_pow(c: &mut Criterion) {
    let mut base = Poly::var('x');
    base.add(Poly::var('y')).unwrap();
    base.add(Poly::one()).unwrap();

    c.bench_function("poly_pow_trinomial_12", |b| {
        b.iter(|| {
            let mut p = base.duplicate().unwrap();
            p.pow(black_box(Poly::constant(12.0))).unwrap();
            p
        })
    });
}

fn bench_parse_and_run(c: &mut Criterion) {
    let config = EvalConfig::new().with_seed(7);

    c.bench_function("run_random_walk", |b| {
        b.iter(|| run(black_box(WALK), black_box(&config)).unwrap())
    });
}

fn bench_evaluate_prepared(c: &mut Criterion) {
    let program = parse_program(WALK).unwrap();
    let config = EvalConfig::new().with_seed(7).with_iter_max(1000);

    c.bench_function("evaluate_prepared_walk", |b| {
        b.iter(|| evaluate(black_box(&program), black_box(&config)).unwrap())
    });
}

criterion_group!(
    hot_paths,
    bench_poly_pow,
    bench_parse_and_run,
    bench_evaluate_prepared
);
criterion_main!(hot_paths);
