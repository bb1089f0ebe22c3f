//! Core AST - what eval consumes
//!
//! All nodes live in an [`AstArena`] and are addressed by typed handles.
//! Handles are neither `Copy` nor `Clone`: a constructor takes its children
//! by value, so every node has at most one parent and the whole structure
//! stays a tree. Dropping the arena releases every node at once.

use std::ops::Index;

use super::{BinOp, Symbol, UnaryOp};

/// Handle to a program node (`init`, `translation`, `rotation`, `sequence`, `or`, `iter`).
#[derive(Debug, PartialEq, Eq)]
pub struct ProgramId(usize);

/// Handle to a `region` node.
#[derive(Debug, PartialEq, Eq)]
pub struct RegionId(usize);

/// Handle to an `interval` node.
#[derive(Debug, PartialEq, Eq)]
pub struct IntervalId(usize);

/// Handle to an arithmetic node.
#[derive(Debug, PartialEq, Eq)]
pub struct ExprId(usize);

#[derive(Debug, PartialEq)]
pub enum Program {
    Init(RegionId),
    Translation(ExprId, ExprId),
    /// Pivot `(u, v)` and angle in degrees
    Rotation(ExprId, ExprId, ExprId),
    Sequence(ProgramId, ProgramId),
    Or(ProgramId, ProgramId),
    Iter(ProgramId),
}

#[derive(Debug, PartialEq)]
pub struct Region {
    pub x: IntervalId,
    pub y: IntervalId,
}

#[derive(Debug, PartialEq)]
pub struct Interval {
    pub lo: ExprId,
    pub hi: ExprId,
}

#[derive(Debug, PartialEq)]
pub enum Expr {
    BinaryOp(BinOp, ExprId, ExprId),
    UnaryOp(UnaryOp, ExprId),
    Num(f64),
    Var(Symbol),
}

/// Append-only storage for every node of one parsed program.
#[derive(Debug, Default)]
pub struct AstArena {
    programs: Vec<Program>,
    regions: Vec<Region>,
    intervals: Vec<Interval>,
    exprs: Vec<Expr>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes held, across all node families.
    pub fn len(&self) -> usize {
        self.programs.len() + self.regions.len() + self.intervals.len() + self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Program constructors ===

    pub fn init(&mut self, region: RegionId) -> ProgramId {
        self.push_program(Program::Init(region))
    }

    pub fn translation(&mut self, u: ExprId, v: ExprId) -> ProgramId {
        self.push_program(Program::Translation(u, v))
    }

    pub fn rotation(&mut self, u: ExprId, v: ExprId, theta: ExprId) -> ProgramId {
        self.push_program(Program::Rotation(u, v, theta))
    }

    pub fn sequence(&mut self, first: ProgramId, second: ProgramId) -> ProgramId {
        self.push_program(Program::Sequence(first, second))
    }

    pub fn or(&mut self, left: ProgramId, right: ProgramId) -> ProgramId {
        self.push_program(Program::Or(left, right))
    }

    pub fn iter(&mut self, body: ProgramId) -> ProgramId {
        self.push_program(Program::Iter(body))
    }

    // === Region / interval constructors ===

    pub fn region(&mut self, x: IntervalId, y: IntervalId) -> RegionId {
        self.regions.push(Region { x, y });
        RegionId(self.regions.len() - 1)
    }

    pub fn interval(&mut self, lo: ExprId, hi: ExprId) -> IntervalId {
        self.intervals.push(Interval { lo, hi });
        IntervalId(self.intervals.len() - 1)
    }

    // === Arithmetic constructors ===

    pub fn binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.push_expr(Expr::BinaryOp(op, lhs, rhs))
    }

    pub fn neg(&mut self, operand: ExprId) -> ExprId {
        self.push_expr(Expr::UnaryOp(UnaryOp::Neg, operand))
    }

    pub fn num(&mut self, value: f64) -> ExprId {
        self.push_expr(Expr::Num(value))
    }

    pub fn var(&mut self, symbol: Symbol) -> ExprId {
        self.push_expr(Expr::Var(symbol))
    }

    fn push_program(&mut self, node: Program) -> ProgramId {
        self.programs.push(node);
        ProgramId(self.programs.len() - 1)
    }

    fn push_expr(&mut self, node: Expr) -> ExprId {
        self.exprs.push(node);
        ExprId(self.exprs.len() - 1)
    }
}

impl Index<&ProgramId> for AstArena {
    type Output = Program;

    fn index(&self, id: &ProgramId) -> &Program {
        &self.programs[id.0]
    }
}

impl Index<&RegionId> for AstArena {
    type Output = Region;

    fn index(&self, id: &RegionId) -> &Region {
        &self.regions[id.0]
    }
}

impl Index<&IntervalId> for AstArena {
    type Output = Interval;

    fn index(&self, id: &IntervalId) -> &Interval {
        &self.intervals[id.0]
    }
}

impl Index<&ExprId> for AstArena {
    type Output = Expr;

    fn index(&self, id: &ExprId) -> &Expr {
        &self.exprs[id.0]
    }
}
