//! Interpreter that walks a core program against a 2D point
//!
//! Arithmetic arguments are reduced through the polynomial engine and must
//! come out as plain numbers. Random decisions (`or`, `iter`, region
//! sampling) all draw from one seeded source owned by the evaluator, so a
//! run is reproducible from its seed.

use thiserror::Error;

use crate::ast::core::{AstArena, Expr, ExprId, Program as Node, ProgramId, RegionId};
use crate::ast::{BinOp, UnaryOp};
use crate::poly::{Poly, PolyError};
use crate::pretty::sexp;
use crate::rng::RandomSource;
use crate::transform::Program;

pub const DEFAULT_ITER_MAX: u32 = 300;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{construct} used before init")]
    UninitializedUse { construct: &'static str },

    #[error("evaluation of '{expr}' results in a non-number '{poly}'")]
    NonNumericArgument { expr: String, poly: String },

    #[error("evaluation of '{expr}' failed: {source}")]
    Polynomial {
        expr: String,
        #[source]
        source: PolyError,
    },
}

/// Coarse classification of an [`EvalError`], one per failure outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UninitializedUse,
    NonNumericArgument,
    PolynomialError,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UninitializedUse { .. } => ErrorKind::UninitializedUse,
            EvalError::NonNumericArgument { .. } => ErrorKind::NonNumericArgument,
            EvalError::Polynomial { .. } => ErrorKind::PolynomialError,
        }
    }
}

type Result<T> = std::result::Result<T, EvalError>;

/// Mutable point state of one run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Env {
    pub initialized: bool,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Evaluation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Upper bound (inclusive) on the repetition count drawn by `iter`
    pub iter_max: u32,
    /// Record a trace line for every transform, choice, iteration and sample
    pub verbose: bool,
    pub seed: u64,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self {
            iter_max: DEFAULT_ITER_MAX,
            verbose: false,
            seed: 0,
        }
    }

    pub fn with_iter_max(mut self, iter_max: u32) -> Self {
        self.iter_max = iter_max;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a program once from a fresh environment
pub fn evaluate(program: &Program, config: &EvalConfig) -> Result<Point> {
    Evaluator::new(program, config).run()
}

/// Receives each verbose trace line as soon as it happens
pub type TraceSink<'a> = Box<dyn FnMut(&str) + 'a>;

/// Tree-walking evaluator. One instance per run.
pub struct Evaluator<'a> {
    program: &'a Program,
    env: Env,
    iter_max: u32,
    verbose: bool,
    rng: RandomSource,
    sink: Option<TraceSink<'a>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a Program, config: &EvalConfig) -> Self {
        Self {
            program,
            env: Env::default(),
            iter_max: config.iter_max,
            verbose: config.verbose,
            rng: RandomSource::new(config.seed),
            sink: None,
        }
    }

    /// Stream verbose trace lines to `sink`. Lines are only produced when
    /// the config enables `verbose`.
    pub fn with_trace_sink(mut self, sink: impl FnMut(&str) + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Execute the program and report the final point
    pub fn run(&mut self) -> Result<Point> {
        let program = self.program;
        self.exec(program.root())?;
        Ok(Point {
            x: self.env.x,
            y: self.env.y,
        })
    }

    fn exec(&mut self, node: &ProgramId) -> Result<()> {
        let program = self.program;
        let arena = program.arena();
        // Sequences nest to the right; walk the spine instead of recursing
        let mut node = node;
        while let Node::Sequence(first, second) = &arena[node] {
            self.exec(first)?;
            node = second;
        }

        match &arena[node] {
            Node::Init(region) => {
                self.env.initialized = true;
                self.sample_region(region)
            }
            Node::Translation(u, v) => {
                self.require_init("translation")?;
                let u = resolve(arena, u)?;
                let v = resolve(arena, v)?;
                self.env.x += u;
                self.env.y += v;

                let Env { x, y, .. } = self.env;
                self.step(|| format!("Translate +({u:.6}, {v:.6}) -> ({x:.6}, {y:.6})"));
                Ok(())
            }
            Node::Rotation(u, v, theta) => {
                self.require_init("rotation")?;
                let u = resolve(arena, u)?;
                let v = resolve(arena, v)?;
                let theta = resolve(arena, theta)?;

                // Rotate about the pivot (u, v)
                let (s, c) = theta.to_radians().sin_cos();
                let dx = self.env.x - u;
                let dy = self.env.y - v;
                self.env.x = dx * c - dy * s + u;
                self.env.y = dx * s + dy * c + v;

                let Env { x, y, .. } = self.env;
                self.step(|| format!("Rotate @({u:.6}, {v:.6}, {theta:.6}deg) -> ({x:.6}, {y:.6})"));
                Ok(())
            }
            // Unwound by the loop above
            Node::Sequence(..) => self.exec(node),
            Node::Or(left, right) => {
                self.require_init("or")?;
                let pick_right = self.rng.uniform_int(2) == 1;
                self.step(|| {
                    format!("OR selected {}", if pick_right { "right" } else { "left" })
                });
                if pick_right {
                    self.exec(right)
                } else {
                    self.exec(left)
                }
            }
            Node::Iter(body) => {
                self.require_init("iter")?;
                let count = self.rng.uniform_int(u64::from(self.iter_max) + 1);
                self.step(|| format!("Iterate {count} times"));
                for _ in 0..count {
                    self.exec(body)?;
                }
                Ok(())
            }
        }
    }

    fn sample_region(&mut self, region: &RegionId) -> Result<()> {
        let program = self.program;
        let arena = program.arena();
        let region = &arena[region];
        let (x_iv, y_iv) = (&arena[&region.x], &arena[&region.y]);
        let xs = resolve(arena, &x_iv.lo)?;
        let xe = resolve(arena, &x_iv.hi)?;
        let ys = resolve(arena, &y_iv.lo)?;
        let ye = resolve(arena, &y_iv.hi)?;

        let x = self.rng.uniform_real(xs, xe);
        let y = self.rng.uniform_real(ys, ye);
        self.env.x = x;
        self.env.y = y;

        self.step(|| {
            format!(
                "Initialize in region [{xs:.6}, {xe:.6}] x [{ys:.6}, {ye:.6}]: ({x:.6}, {y:.6})"
            )
        });
        Ok(())
    }

    fn require_init(&self, construct: &'static str) -> Result<()> {
        if self.env.initialized {
            Ok(())
        } else {
            Err(EvalError::UninitializedUse { construct })
        }
    }

    fn step(&mut self, line: impl FnOnce() -> String) {
        if self.verbose {
            let line = line();
            log::debug!("{line}");
            if let Some(sink) = self.sink.as_mut() {
                sink(&line);
            }
        }
    }
}

/// Reduce an arithmetic subtree to a number.
///
/// Fails if the polynomial engine rejects an operation, or if the result
/// still contains a symbol.
pub fn resolve(arena: &AstArena, expr: &ExprId) -> Result<f64> {
    let poly = reduce(arena, expr).map_err(|source| EvalError::Polynomial {
        expr: sexp(arena, expr),
        source,
    })?;
    match poly.as_scalar() {
        Some(value) => {
            log::trace!("{} = {value}", sexp(arena, expr));
            Ok(value)
        }
        None => Err(EvalError::NonNumericArgument {
            expr: sexp(arena, expr),
            poly: poly.to_string(),
        }),
    }
}

fn reduce(arena: &AstArena, expr: &ExprId) -> std::result::Result<Poly, PolyError> {
    match &arena[expr] {
        Expr::Num(value) => Ok(Poly::constant(*value)),
        Expr::Var(symbol) => Ok(Poly::var(symbol.as_char())),
        Expr::BinaryOp(op, lhs, rhs) => {
            let mut acc = reduce(arena, lhs)?;
            let rhs = reduce(arena, rhs)?;
            match op {
                BinOp::Add => acc.add(rhs)?,
                BinOp::Sub => acc.sub(rhs)?,
                BinOp::Mul => acc.mul(rhs)?,
                BinOp::Div => acc.div(rhs)?,
                BinOp::Pow => acc.pow(rhs)?,
            }
            Ok(acc)
        }
        Expr::UnaryOp(UnaryOp::Neg, operand) => {
            let mut acc = reduce(arena, operand)?;
            acc.neg();
            Ok(acc)
        }
    }
}
