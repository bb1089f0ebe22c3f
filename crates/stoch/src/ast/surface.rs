//! Surface AST - what the parser produces
//!
//! A plain boxed tree. `{ ... }` grouping leaves no node behind, it only
//! shapes how `;` and `or` nest.

use super::{BinOp, Symbol, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `init ([xs, xe], [ys, ye])`
    Init(Region),

    /// `translation(u, v)`
    Translation(Expr, Expr),

    /// `rotation(u, v, theta)`, theta in degrees
    Rotation(Expr, Expr, Expr),

    /// `p1; p2; ...`: the first statement, then the rest in order. Kept
    /// flat so long programs never nest deeply.
    Sequence(Box<Command>, Vec<Command>),

    /// `p1 or p2`
    Or(Box<Command>, Box<Command>),

    /// `iter { body }`
    Iter(Box<Command>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub x: Interval,
    pub y: Interval,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lo: Expr,
    pub hi: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: `3`, `0.5`, `1e3`
    Num(f64),

    /// `x` or `y`
    Var(Symbol),

    /// Binary operation: `a + b`, `a ^ b`
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),

    /// Unary operation: `-a`
    UnaryOp(UnaryOp, Box<Expr>),
}
