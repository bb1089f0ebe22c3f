//! Pretty printing for the transform language
//!
//! Two renderers:
//! - S-expressions over the core arena, for `-p` diagnostics and error messages
//! - `Display` for the surface AST, producing source text that parses back
//!   to the same tree

use std::fmt::{self, Display, Write};

use crate::ast::core::{AstArena, Expr, ExprId, IntervalId, Program, ProgramId, RegionId};
use crate::ast::surface::{Command, Expr as SurfaceExpr, Interval, Region};
use crate::ast::{BinOp, Symbol, UnaryOp};

// ============ S-expressions (core) ============

/// A core node that can be rendered as a fully parenthesized prefix form.
pub trait ToSexp {
    fn write_sexp(&self, arena: &AstArena, out: &mut String);
}

/// Render any subtree, e.g. `(rotation (num 1)(num 0)(num 90))`.
pub fn sexp<N: ToSexp + ?Sized>(arena: &AstArena, node: &N) -> String {
    let mut out = String::new();
    node.write_sexp(arena, &mut out);
    out
}

fn write_node(out: &mut String, keyword: &str, arena: &AstArena, children: &[&dyn ToSexp]) {
    out.push('(');
    out.push_str(keyword);
    out.push(' ');
    for child in children {
        child.write_sexp(arena, out);
    }
    out.push(')');
}

impl ToSexp for ProgramId {
    fn write_sexp(&self, arena: &AstArena, out: &mut String) {
        match &arena[self] {
            Program::Init(region) => write_node(out, "init", arena, &[region]),
            Program::Translation(u, v) => write_node(out, "translation", arena, &[u, v]),
            Program::Rotation(u, v, theta) => {
                write_node(out, "rotation", arena, &[u, v, theta]);
            }
            Program::Sequence(..) => write_sequence_spine(self, arena, out),
            Program::Or(p1, p2) => write_node(out, "or", arena, &[p1, p2]),
            Program::Iter(body) => write_node(out, "iter", arena, &[body]),
        }
    }
}

// `(sequence a (sequence b c))`, walking the right spine in a loop
fn write_sequence_spine<'a>(mut node: &'a ProgramId, arena: &'a AstArena, out: &mut String) {
    let mut open = 0usize;
    while let Program::Sequence(first, second) = &arena[node] {
        out.push_str("(sequence ");
        first.write_sexp(arena, out);
        node = second;
        open += 1;
    }
    node.write_sexp(arena, out);
    for _ in 0..open {
        out.push(')');
    }
}

impl ToSexp for RegionId {
    fn write_sexp(&self, arena: &AstArena, out: &mut String) {
        let region = &arena[self];
        write_node(out, "region", arena, &[&region.x, &region.y]);
    }
}

impl ToSexp for IntervalId {
    fn write_sexp(&self, arena: &AstArena, out: &mut String) {
        let interval = &arena[self];
        write_node(out, "interval", arena, &[&interval.lo, &interval.hi]);
    }
}

impl ToSexp for ExprId {
    fn write_sexp(&self, arena: &AstArena, out: &mut String) {
        match &arena[self] {
            Expr::BinaryOp(op, lhs, rhs) => write_node(out, op.symbol(), arena, &[lhs, rhs]),
            Expr::UnaryOp(UnaryOp::Neg, operand) => write_node(out, "-", arena, &[operand]),
            Expr::Num(value) => {
                out.push_str("(num ");
                out.push_str(&format_num(*value));
                out.push(')');
            }
            Expr::Var(symbol) => {
                out.push_str("(var ");
                out.push(symbol.as_char());
                out.push(')');
            }
        }
    }
}

/// Integral values without decimals, small values fixed-point, the rest in
/// C-style scientific notation.
pub fn format_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else if value.abs() < 10000.0 {
        format!("{value:.6}")
    } else {
        scientific(value)
    }
}

// `1.234560e+04` rather than Rust's `1.23456e4`.
fn scientific(value: f64) -> String {
    let rendered = format!("{value:.6e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => rendered,
        },
        None => rendered,
    }
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }
}

// ============ Display (surface) ============

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_char('-'),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.as_char())
    }
}

impl Display for SurfaceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceExpr::Num(value) => write!(f, "{value}"),
            SurfaceExpr::Var(symbol) => write!(f, "{symbol}"),
            SurfaceExpr::BinaryOp(lhs, op, rhs) => {
                // `-x ^ 2` would reparse as `-(x ^ 2)`
                let needs_parens_lhs = matches!(lhs.as_ref(), SurfaceExpr::BinaryOp(..))
                    || (*op == BinOp::Pow && matches!(lhs.as_ref(), SurfaceExpr::UnaryOp(..)));
                let needs_parens_rhs = matches!(rhs.as_ref(), SurfaceExpr::BinaryOp(..));

                if needs_parens_lhs {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {op} ")?;
                if needs_parens_rhs {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
            SurfaceExpr::UnaryOp(op, operand) => {
                if matches!(operand.as_ref(), SurfaceExpr::BinaryOp(..)) {
                    write!(f, "{op}({operand})")
                } else {
                    write!(f, "{op}{operand}")
                }
            }
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Init(region) => write!(f, "init {region}"),
            Command::Translation(u, v) => write!(f, "translation({u}, {v})"),
            Command::Rotation(u, v, theta) => write!(f, "rotation({u}, {v}, {theta})"),
            Command::Sequence(first, rest) => {
                write_statement(f, first)?;
                for statement in rest {
                    f.write_str("; ")?;
                    write_statement(f, statement)?;
                }
                Ok(())
            }
            Command::Or(left, right) => {
                write_choice_operand(f, left, false)?;
                write!(f, " or ")?;
                write_choice_operand(f, right, true)
            }
            Command::Iter(body) => write!(f, "iter {{ {body} }}"),
        }
    }
}

// A nested sequence only survives reparsing inside a block.
fn write_statement(f: &mut fmt::Formatter<'_>, cmd: &Command) -> fmt::Result {
    if matches!(cmd, Command::Sequence(..)) {
        write!(f, "{{ {cmd} }}")
    } else {
        write!(f, "{cmd}")
    }
}

// `or` binds tighter than `;` and nests to the left.
fn write_choice_operand(f: &mut fmt::Formatter<'_>, cmd: &Command, is_right: bool) -> fmt::Result {
    let needs_block = match cmd {
        Command::Sequence(..) => true,
        Command::Or(..) => is_right,
        _ => false,
    };
    if needs_block {
        write!(f, "{{ {cmd} }}")
    } else {
        write!(f, "{cmd}")
    }
}
