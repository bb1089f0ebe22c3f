//! AST types for the transform language
//!
//! Split into:
//! - `surface`: What the parser produces (boxed tree, keeps source grouping)
//! - `core`: What eval consumes (arena of nodes addressed by typed handles)

pub mod core;
pub mod surface;

// Shared types used by both surface and core ASTs

/// One of the two symbolic placeholders usable in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    X,
    Y,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::X => 'x',
            Symbol::Y => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}
