//! Black-box integration tests for stoch
//!
//! These tests exercise the full parse → transform → eval pipeline.

use stoch::{
    ErrorKind, EvalConfig, EvalError, Evaluator, Point, PolyError, Program, StochError,
    parse_program, run, sexp,
};

const EPS: f64 = 1e-9;

fn config() -> EvalConfig {
    EvalConfig::new().with_seed(1234)
}

fn run_ok(src: &str) -> Point {
    run(src, &config()).unwrap()
}

fn eval_err(src: &str) -> EvalError {
    match run(src, &config()) {
        Err(StochError::Eval(e)) => e,
        other => panic!("expected eval error, got {other:?}"),
    }
}

fn traced(program: &Program, cfg: &EvalConfig) -> (Point, Vec<String>) {
    let mut lines = Vec::new();
    let point = Evaluator::new(program, cfg)
        .with_trace_sink(|line| lines.push(line.to_string()))
        .run()
        .unwrap();
    (point, lines)
}

fn assert_close(point: Point, x: f64, y: f64) {
    assert!(
        (point.x - x).abs() < EPS && (point.y - y).abs() < EPS,
        "expected ({x}, {y}), got ({}, {})",
        point.x,
        point.y
    );
}

// ============ End to end ============

#[test]
fn translate_from_fixed_start() {
    assert_eq!(
        run_ok("init ([0, 0], [0, 0]); translation(3, 4)"),
        Point { x: 3.0, y: 4.0 }
    );
}

#[test]
fn rotate_then_translate() {
    let point = run_ok("init ([1, 1], [0, 0]); rotation(0, 0, 90); translation(1, 1)");
    assert_close(point, 1.0, 2.0);
}

#[test]
fn trailing_semicolon_and_comments() {
    let src = "
        # start at the origin
        init ([0, 0], [0, 0]);
        translation(1, 2); # move
    ";
    assert_eq!(run_ok(src), Point { x: 1.0, y: 2.0 });
}

#[test]
fn arithmetic_arguments() {
    let point = run_ok("init ([0, 0], [0, 0]); translation(2 ^ 3 - 1, -(4 / 2) * 3)");
    assert_close(point, 7.0, -6.0);
}

#[test]
fn sample_stays_in_region() {
    for seed in 0..50 {
        let point = run("init ([-1, 2], [10, 20])", &EvalConfig::new().with_seed(seed)).unwrap();
        assert!((-1.0..2.0).contains(&point.x), "seed {seed}: {point:?}");
        assert!((10.0..20.0).contains(&point.y), "seed {seed}: {point:?}");
    }
}

#[test]
fn reversed_bounds_sample_between_them() {
    for seed in 0..200 {
        let point = run("init ([2, -1], [20, 10])", &EvalConfig::new().with_seed(seed)).unwrap();
        assert!(point.x > -1.0 && point.x <= 2.0, "seed {seed}: {point:?}");
        assert!(point.y > 10.0 && point.y <= 20.0, "seed {seed}: {point:?}");
    }
}

#[test]
fn degenerate_region_is_exact() {
    for seed in 0..20 {
        let cfg = EvalConfig::new().with_seed(seed);
        assert_eq!(run("init ([5, 5], [-3, -3])", &cfg).unwrap(), Point { x: 5.0, y: -3.0 });

        let point = run("init ([1.5, 1.5], [0, 4])", &cfg).unwrap();
        assert_eq!(point.x, 1.5);
        assert!((0.0..4.0).contains(&point.y));
    }
}

#[test]
fn reinit_resamples() {
    let point = run_ok("init ([0, 0], [0, 0]); translation(5, 5); init ([1, 1], [2, 2])");
    assert_eq!(point, Point { x: 1.0, y: 2.0 });
}

// ============ Symbolic cancellation ============

#[test]
fn cancelling_placeholders_are_numbers() {
    let point = run_ok("init ([0, 0], [0, 0]); translation(x - x + 1, y ^ 0)");
    assert_eq!(point, Point { x: 1.0, y: 1.0 });

    let point = run_ok("init ([0, 0], [0, 0]); translation((x + 1) * (x - 1) - x ^ 2, 0)");
    assert_close(point, -1.0, 0.0);
}

#[test]
fn bare_placeholder_is_rejected() {
    let err = eval_err("init ([0, 0], [0, 0]); translation(x, 0)");
    assert_eq!(err.kind(), ErrorKind::NonNumericArgument);
    assert_eq!(
        err.to_string(),
        "evaluation of '(var x)' results in a non-number '1 x'"
    );
}

#[test]
fn placeholder_in_region_is_rejected() {
    let err = eval_err("init ([y, 1], [0, 1])");
    assert_eq!(err.kind(), ErrorKind::NonNumericArgument);
}

// ============ Polynomial errors ============

#[test]
fn division_by_zero() {
    let err = eval_err("init ([0, 0], [0, 0]); translation(1 / (2 - 2), 0)");
    assert_eq!(
        err,
        EvalError::Polynomial {
            expr: "(/ (num 1)(- (num 2)(num 2)))".to_string(),
            source: PolyError::DivisionByZero,
        }
    );
}

#[test]
fn unsupported_polynomial_operations() {
    let cases = [
        ("1 / x", PolyError::DivisionByPolynomial),
        ("2 ^ x", PolyError::ExponentiationByPolynomial),
        ("x ^ 0.5", PolyError::FractionalExponentOnPolynomial),
        ("x ^ -1", PolyError::NegativeExponentOnPolynomial),
    ];
    for (arg, expected) in cases {
        let src = format!("init ([0, 0], [0, 0]); translation({arg}, 0)");
        match eval_err(&src) {
            EvalError::Polynomial { source, .. } => assert_eq!(source, expected, "{arg}"),
            other => panic!("{arg}: unexpected {other:?}"),
        }
    }
}

// ============ Init gating ============

#[test]
fn constructs_before_init_fail() {
    for (src, construct) in [
        ("translation(1, 1)", "translation"),
        ("rotation(0, 0, 90)", "rotation"),
        ("translation(1, 0) or translation(0, 1)", "or"),
        ("iter { translation(1, 0) }", "iter"),
    ] {
        let err = eval_err(src);
        assert_eq!(err, EvalError::UninitializedUse { construct });
        assert_eq!(err.to_string(), format!("{construct} used before init"));
    }
}

#[test]
fn init_inside_branch_enables_rest() {
    let src = "init ([0, 0], [0, 0]); { init ([1, 1], [1, 1]) or init ([2, 2], [2, 2]) }; translation(1, 1)";
    let point = run_ok(src);
    assert!(point == Point { x: 2.0, y: 2.0 } || point == Point { x: 3.0, y: 3.0 });
}

// ============ Randomness ============

#[test]
fn same_seed_same_result() {
    let src = "init ([0, 100], [0, 100]); iter { rotation(0, 0, 15) or translation(1, -1) }";
    let cfg = EvalConfig::new().with_seed(99);
    let a = run(src, &cfg).unwrap();
    let b = run(src, &cfg).unwrap();
    assert_eq!(a.x.to_bits(), b.x.to_bits());
    assert_eq!(a.y.to_bits(), b.y.to_bits());
}

#[test]
fn same_seed_same_trace() {
    let program =
        parse_program("init ([0, 5], [0, 5]); iter { translation(1, 0) or rotation(0, 0, 45) }")
            .unwrap();
    let cfg = EvalConfig::new().with_seed(5).with_verbose(true).with_iter_max(20);
    let traces: Vec<Vec<String>> = (0..2).map(|_| traced(&program, &cfg).1).collect();
    assert!(!traces[0].is_empty());
    assert_eq!(traces[0], traces[1]);
}

#[test]
fn iteration_reaches_both_bounds() {
    let src = "init ([0, 0], [0, 0]); iter { translation(1, 0) }";
    let counts: Vec<f64> = (0..400)
        .map(|seed| run(src, &EvalConfig::new().with_seed(seed).with_iter_max(3)).unwrap().x)
        .collect();
    assert!(counts.contains(&0.0));
    assert!(counts.contains(&3.0));
}

#[test]
fn or_takes_both_sides_across_seeds() {
    let src = "init ([0, 0], [0, 0]); translation(1, 0) or translation(0, 1)";
    let mut left = false;
    let mut right = false;
    for seed in 0..64 {
        match run(src, &EvalConfig::new().with_seed(seed)).unwrap() {
            Point { x, .. } if x == 1.0 => left = true,
            Point { y, .. } if y == 1.0 => right = true,
            other => panic!("seed {seed}: {other:?}"),
        }
    }
    assert!(left && right);
}

#[test]
fn iteration_respects_cap() {
    let src = "init ([0, 0], [0, 0]); iter { translation(1, 0) }";
    for seed in 0..32 {
        let cfg = EvalConfig::new().with_seed(seed).with_iter_max(5);
        let point = run(src, &cfg).unwrap();
        assert!((0.0..=5.0).contains(&point.x), "seed {seed}: {point:?}");
        assert_eq!(point.x.fract(), 0.0);
    }
}

#[test]
fn failing_body_stops_iteration() {
    let cfg = config().with_iter_max(1000);
    // Only fails when the body runs at least once
    let src = "init ([0, 0], [0, 0]); iter { translation(x, 0) }";
    for seed in 0..8 {
        let cfg = cfg.clone().with_seed(seed);
        match run(src, &cfg) {
            Ok(point) => assert_eq!(point, Point { x: 0.0, y: 0.0 }),
            Err(StochError::Eval(e)) => assert_eq!(e.kind(), ErrorKind::NonNumericArgument),
            Err(other) => panic!("{other:?}"),
        }
    }
}

// ============ Verbose trace ============

#[test]
fn verbose_trace_records_each_step() {
    let program =
        parse_program("init ([0, 0], [0, 0]); iter { translation(1, 0) }; rotation(0, 0, 90)")
            .unwrap();
    let cfg = config().with_verbose(true).with_iter_max(3);
    let (_, trace) = traced(&program, &cfg);
    assert!(trace[0].starts_with("Initialize in region [0.000000, 0.000000] x [0.000000, 0.000000]"));
    assert!(trace[1].starts_with("Iterate "));
    let translations = trace.iter().filter(|l| l.starts_with("Translate +(")).count();
    assert!(translations <= 3);
    assert!(trace.last().unwrap().starts_with("Rotate @(0.000000, 0.000000, 90.000000deg)"));
}

#[test]
fn trace_shows_reversed_region_bounds_as_written() {
    let program = parse_program("init ([2, 2], [1, 0])").unwrap();
    let (point, trace) = traced(&program, &config().with_verbose(true));
    assert!(point.y > 0.0 && point.y <= 1.0);
    assert!(trace[0].starts_with("Initialize in region [2.000000, 2.000000] x [1.000000, 0.000000]: "));
}

// ============ Long programs ============

#[test]
fn long_straight_line_program() {
    let mut src = String::from("init ([0, 0], [0, 0]);\n");
    for _ in 0..50_000 {
        src.push_str("translation(1, 0);\n");
    }
    let program = parse_program(&src).unwrap();
    assert!(sexp(program.arena(), program.root()).starts_with("(sequence (init "));
    let point = stoch::evaluate(&program, &config()).unwrap();
    assert_eq!(point, Point { x: 50_000.0, y: 0.0 });
}

#[test]
fn long_program_failure_is_classified() {
    let mut src = String::from("init ([0, 0], [0, 0]);");
    src.push_str(&"translation(1, 0);".repeat(50_000));
    src.push_str("translation(y, 0)");
    assert_eq!(eval_err(&src).kind(), ErrorKind::NonNumericArgument);
}

// ============ Parsing ============

#[test]
fn overflowing_literal_is_a_parse_error() {
    let err = run("init ([0, 0], [0, 0]); translation(1e400, 0)", &config()).unwrap_err();
    assert!(matches!(err, StochError::Parse(_)));
}

#[test]
fn parse_error_is_reported() {
    let err = run("init ([0, 0], [0, 0]); translation(1,", &config()).unwrap_err();
    assert!(matches!(err, StochError::Parse(_)));
    assert!(err.to_string().starts_with("parse error: "));
}

#[test]
fn debug_sexp() {
    let program = parse_program("init ([0, 1], [0, 1]); translation(1, 0) or rotation(1, 0, 90)").unwrap();
    assert_eq!(
        sexp(program.arena(), program.root()),
        "(sequence (init (region (interval (num 0)(num 1))(interval (num 0)(num 1))))\
         (or (translation (num 1)(num 0))(rotation (num 1)(num 0)(num 90))))"
    );
}
