//! Parser for transform-language programs
//!
//! Produces surface::Command which is then lowered into the core arena before eval.

use winnow::ascii::{digit1, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated_pair};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use crate::ast::surface::{Command, Expr, Interval, Region};
use crate::ast::{BinOp, Symbol, UnaryOp};

type PResult<T> = winnow::ModalResult<T>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {}, offset {})",
            self.message, self.line, self.column, self.offset
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse a whole program from source text
pub fn parse(input: &str) -> Result<Command, ParseError> {
    let mut stream = input;
    match (ws, sequence, ws)
        .map(|(_, cmd, _)| cmd)
        .parse_next(&mut stream)
    {
        Ok(parsed) => {
            if stream.is_empty() {
                Ok(parsed)
            } else {
                let offset = input.len() - stream.len();
                Err(build_parse_error(
                    "unexpected trailing input".to_string(),
                    input,
                    offset,
                ))
            }
        }
        Err(e) => {
            let offset = input.len().saturating_sub(stream.len());
            let message = match e.into_inner() {
                Ok(ctx) if !ctx.to_string().is_empty() => ctx.to_string().replace('\n', "; "),
                Ok(_) => "invalid syntax".to_string(),
                Err(_) => "incomplete input".to_string(),
            };
            Err(build_parse_error(message, input, offset))
        }
    }
}

fn build_parse_error(message: String, input: &str, offset: usize) -> ParseError {
    let (line, column) = offset_to_line_column(input, offset);
    ParseError {
        message,
        offset,
        line,
        column,
    }
}

fn offset_to_line_column(input: &str, offset: usize) -> (usize, usize) {
    let bounded = offset.min(input.len());
    let mut line = 1usize;
    let mut column = 1usize;

    for ch in input[..bounded].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

// ============ Commands (`;` binds loosest, then `or`) ============

fn sequence(input: &mut &str) -> PResult<Command> {
    let first = choice.parse_next(input)?;
    let rest: Vec<Command> = repeat(0.., preceded((ws, ';'), choice)).parse_next(input)?;
    opt((ws, ';')).void().parse_next(input)?;
    if rest.is_empty() {
        Ok(first)
    } else {
        Ok(Command::Sequence(Box::new(first), rest))
    }
}

fn choice(input: &mut &str) -> PResult<Command> {
    let first = command.parse_next(input)?;
    let rest: Vec<Command> =
        repeat(0.., preceded((ws, keyword("or")), command)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, r| {
        Command::Or(Box::new(l), Box::new(r))
    }))
}

fn command(input: &mut &str) -> PResult<Command> {
    preceded(
        ws,
        alt((init_cmd, translation_cmd, rotation_cmd, iter_cmd, block)),
    )
    .parse_next(input)
}

fn init_cmd(input: &mut &str) -> PResult<Command> {
    preceded(keyword("init"), region)
        .map(Command::Init)
        .parse_next(input)
}

fn translation_cmd(input: &mut &str) -> PResult<Command> {
    preceded(
        (keyword("translation"), ws),
        delimited('(', separated_pair(expr, comma, expr), (ws, ')')),
    )
    .map(|(u, v)| Command::Translation(u, v))
    .parse_next(input)
}

fn rotation_cmd(input: &mut &str) -> PResult<Command> {
    preceded(
        (keyword("rotation"), ws),
        delimited('(', (expr, comma, expr, comma, expr), (ws, ')')),
    )
    .map(|(u, _, v, _, theta)| Command::Rotation(u, v, theta))
    .parse_next(input)
}

fn iter_cmd(input: &mut &str) -> PResult<Command> {
    preceded(keyword("iter"), block)
        .map(|body| Command::Iter(Box::new(body)))
        .parse_next(input)
}

fn block(input: &mut &str) -> PResult<Command> {
    delimited((ws, '{'), sequence, (ws, '}')).parse_next(input)
}

fn region(input: &mut &str) -> PResult<Region> {
    delimited(
        (ws, '('),
        separated_pair(interval, comma, interval),
        (ws, ')'),
    )
    .map(|(x, y)| Region { x, y })
    .parse_next(input)
}

fn interval(input: &mut &str) -> PResult<Interval> {
    delimited((ws, '['), separated_pair(expr, comma, expr), (ws, ']'))
        .map(|(lo, hi)| Interval { lo, hi })
        .parse_next(input)
}

// ============ Arithmetic (handles precedence) ============

fn expr(input: &mut &str) -> PResult<Expr> {
    let first = term.parse_next(input)?;
    let rest: Vec<(BinOp, Expr)> =
        repeat(0.., (ws, add_op, ws, term).map(|(_, op, _, e)| (op, e))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, (op, r)| {
        Expr::BinaryOp(Box::new(l), op, Box::new(r))
    }))
}

fn add_op(input: &mut &str) -> PResult<BinOp> {
    alt(('+'.value(BinOp::Add), '-'.value(BinOp::Sub))).parse_next(input)
}

fn term(input: &mut &str) -> PResult<Expr> {
    let first = unary_expr.parse_next(input)?;
    let rest: Vec<(BinOp, Expr)> = repeat(
        0..,
        (ws, mul_op, ws, unary_expr).map(|(_, op, _, e)| (op, e)),
    )
    .parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, (op, r)| {
        Expr::BinaryOp(Box::new(l), op, Box::new(r))
    }))
}

fn mul_op(input: &mut &str) -> PResult<BinOp> {
    alt(('*'.value(BinOp::Mul), '/'.value(BinOp::Div))).parse_next(input)
}

fn unary_expr(input: &mut &str) -> PResult<Expr> {
    alt((
        preceded((ws, '-', ws), unary_expr).map(|e| Expr::UnaryOp(UnaryOp::Neg, Box::new(e))),
        power_expr,
    ))
    .parse_next(input)
}

// `^` is right-associative and binds tighter than unary minus on its left
fn power_expr(input: &mut &str) -> PResult<Expr> {
    let base = primary.parse_next(input)?;
    let exponent = opt(preceded((ws, '^', ws), unary_expr)).parse_next(input)?;
    Ok(match exponent {
        Some(exp) => Expr::BinaryOp(Box::new(base), BinOp::Pow, Box::new(exp)),
        None => base,
    })
}

fn primary(input: &mut &str) -> PResult<Expr> {
    preceded(ws, alt((paren_expr, number, variable))).parse_next(input)
}

fn paren_expr(input: &mut &str) -> PResult<Expr> {
    delimited(('(', ws), expr, (ws, ')')).parse_next(input)
}

fn variable(input: &mut &str) -> PResult<Expr> {
    ident
        .verify_map(|name: &str| match name {
            "x" => Some(Symbol::X),
            "y" => Some(Symbol::Y),
            _ => None,
        })
        .map(Expr::Var)
        .parse_next(input)
}

fn number(input: &mut &str) -> PResult<Expr> {
    (
        digit1,
        opt(('.', digit1)),
        opt((
            one_of(|c: char| c == 'e' || c == 'E'),
            opt(one_of(|c: char| c == '+' || c == '-')),
            digit1,
        )),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        // `1e400` would become infinity
        .verify(|value: &f64| value.is_finite())
        .map(Expr::Num)
        .parse_next(input)
}

// ============ Identifiers ============

fn ident<'a>(input: &mut &'a str) -> PResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// A whole identifier equal to `kw`, so `iterate` never matches `iter`
fn keyword<'a>(kw: &'static str) -> impl FnMut(&mut &'a str) -> PResult<&'a str> {
    move |input: &mut &'a str| ident.verify(|name: &str| name == kw).parse_next(input)
}

// ============ Whitespace ============

fn comma(input: &mut &str) -> PResult<()> {
    (ws, ',', ws).void().parse_next(input)
}

/// Whitespace and `#` line comments
fn ws(input: &mut &str) -> PResult<()> {
    repeat(0.., alt((multispace1.void(), comment))).parse_next(input)
}

fn comment(input: &mut &str) -> PResult<()> {
    ('#', take_till(0.., |c: char| c == '\n'))
        .void()
        .parse_next(input)
}

// ============ Sanity Tests ============
// End-to-end behaviour is covered in tests/integration.rs
