//! Lower the surface AST into the core arena
//!
//! Every surface node becomes exactly one arena node; block grouping has
//! already been resolved by the parser.

use crate::ast::core::{AstArena, ExprId, IntervalId, ProgramId, RegionId};
use crate::ast::UnaryOp;
use crate::ast::surface::{Command, Expr, Interval, Region};

/// A lowered program: the arena that owns every node, plus the root.
///
/// Only built by lowering, so the root always belongs to the arena.
#[derive(Debug)]
pub struct Program {
    arena: AstArena,
    root: ProgramId,
}

impl Program {
    pub(crate) fn new(arena: AstArena, root: ProgramId) -> Self {
        Self { arena, root }
    }

    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    pub fn root(&self) -> &ProgramId {
        &self.root
    }
}

/// Transform a surface program into a core program
pub fn transform(cmd: Command) -> Program {
    let mut arena = AstArena::new();
    let root = lower_command(cmd, &mut arena);
    Program::new(arena, root)
}

fn lower_command(cmd: Command, arena: &mut AstArena) -> ProgramId {
    match cmd {
        Command::Init(region) => {
            let region = lower_region(region, arena);
            arena.init(region)
        }
        Command::Translation(u, v) => {
            let u = lower_expr(u, arena);
            let v = lower_expr(v, arena);
            arena.translation(u, v)
        }
        Command::Rotation(u, v, theta) => {
            let u = lower_expr(u, arena);
            let v = lower_expr(v, arena);
            let theta = lower_expr(theta, arena);
            arena.rotation(u, v, theta)
        }
        Command::Sequence(first, rest) => lower_sequence(*first, rest, arena),
        Command::Or(left, right) => {
            let left = lower_command(*left, arena);
            let right = lower_command(*right, arena);
            arena.or(left, right)
        }
        Command::Iter(body) => {
            let body = lower_command(*body, arena);
            arena.iter(body)
        }
    }
}

// `a; b; c` -> Sequence(a, Sequence(b, c)), built from the end
fn lower_sequence(first: Command, rest: Vec<Command>, arena: &mut AstArena) -> ProgramId {
    let first = lower_command(first, arena);
    let mut rest: Vec<ProgramId> = rest
        .into_iter()
        .map(|statement| lower_command(statement, arena))
        .collect();

    let Some(mut tail) = rest.pop() else {
        return first;
    };
    while let Some(statement) = rest.pop() {
        tail = arena.sequence(statement, tail);
    }
    arena.sequence(first, tail)
}

fn lower_region(region: Region, arena: &mut AstArena) -> RegionId {
    let x = lower_interval(region.x, arena);
    let y = lower_interval(region.y, arena);
    arena.region(x, y)
}

fn lower_interval(interval: Interval, arena: &mut AstArena) -> IntervalId {
    let lo = lower_expr(interval.lo, arena);
    let hi = lower_expr(interval.hi, arena);
    arena.interval(lo, hi)
}

fn lower_expr(expr: Expr, arena: &mut AstArena) -> ExprId {
    match expr {
        Expr::Num(value) => arena.num(value),
        Expr::Var(symbol) => arena.var(symbol),
        Expr::BinaryOp(lhs, op, rhs) => {
            let lhs = lower_expr(*lhs, arena);
            let rhs = lower_expr(*rhs, arena);
            arena.binary(op, lhs, rhs)
        }
        Expr::UnaryOp(UnaryOp::Neg, operand) => {
            let operand = lower_expr(*operand, arena);
            arena.neg(operand)
        }
    }
}
