//! Stoch - a small language for stochastic 2D point transforms
//!
//! A program starts by sampling a point from a rectangular region, then
//! moves it with translations and rotations. `or` picks one of two branches
//! at random and `iter { .. }` repeats its body a random number of times.
//! Arithmetic arguments may mention the placeholders `x` and `y` as long as
//! they cancel, e.g. `x - x` or `y ^ 0`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stoch::{run, EvalConfig};
//!
//! let config = EvalConfig::new().with_seed(42);
//! let point = run("init ([0, 0], [0, 0]); translation(3, 4)", &config)?;
//! assert_eq!((point.x, point.y), (3.0, 4.0));
//! ```
//!
//! ## Step by step
//!
//! ```ignore
//! use stoch::{parse_program, sexp, Evaluator, EvalConfig};
//!
//! let program = parse_program("init ([0, 1], [0, 1]); iter { rotation(0, 0, 90) }")?;
//! println!("{}", sexp(program.arena(), program.root()));
//!
//! let config = EvalConfig::new().with_verbose(true);
//! let point = Evaluator::new(&program, &config)
//!     .with_trace_sink(|line| eprintln!("{line}"))
//!     .run()?;
//! ```

mod ast;
mod eval;
mod parse;
mod poly;
mod pretty;
mod rng;
mod transform;

use thiserror::Error;

// ============ Primary Public API ============

pub use ast::core::{AstArena, ExprId, IntervalId, ProgramId, RegionId};
pub use ast::{BinOp, Symbol, UnaryOp};
pub use eval::{
    DEFAULT_ITER_MAX, Env, ErrorKind, EvalConfig, EvalError, Evaluator, Point, TraceSink, evaluate,
    resolve,
};
pub use parse::ParseError;
pub use poly::{Poly, PolyError};
pub use pretty::sexp;
pub use rng::RandomSource;
pub use transform::Program;

/// Parse and lower a program into its arena form
pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let surface = parse::parse(src)?;
    Ok(transform::transform(surface))
}

/// Run a program once and return the final point
pub fn run(src: &str, config: &EvalConfig) -> Result<Point, StochError> {
    let program = parse_program(src)?;
    let point = eval::evaluate(&program, config)?;
    Ok(point)
}

// ============ Errors ============

#[derive(Error, Debug)]
pub enum StochError {
    #[error("parse error: {0}")]
    Parse(#[from] parse::ParseError),
    #[error(transparent)]
    Eval(#[from] eval::EvalError),
}

// ============ Advanced: AST Access ============

/// Low-level AST and polynomial types (for custom front ends or introspection)
pub mod advanced {
    pub use crate::ast::core::{
        Expr as CoreExpr, Interval as CoreInterval, Program as CoreProgram, Region as CoreRegion,
    };
    pub use crate::ast::surface::{
        Command, Expr as SurfaceExpr, Interval as SurfaceInterval, Region as SurfaceRegion,
    };
    pub use crate::parse::parse;
    pub use crate::poly::{Factor, Monomial, Term};
    pub use crate::pretty::{ToSexp, format_num};
    pub use crate::transform::transform;
}
