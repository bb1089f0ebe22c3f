//! Sparse multivariate polynomials over `f64`.
//!
//! Arithmetic sub-expressions are reduced through this engine so that
//! symbolic terms can cancel (`x - x` is `0`, `x ^ 0` is `1`) before the
//! evaluator demands a plain number.
//!
//! A polynomial is a list of terms in strictly decreasing monomial order.
//! Each monomial is a list of factors in strictly decreasing factor order
//! with distinct symbols and powers of at least one. No term has a zero
//! coefficient, except the single term of the canonical zero.
//!
//! Binary operations take the right operand by value: its terms are either
//! moved into the result or dropped, and the caller cannot touch it again.

use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyError {
    #[error("failed to allocate memory")]
    AllocationFailure,

    #[error("division by zero")]
    DivisionByZero,

    #[error("division by a polynomial is not supported")]
    DivisionByPolynomial,

    #[error("exponentiation with a polynomial is not supported")]
    ExponentiationByPolynomial,

    #[error("exponentiation of a polynomial by a real number is not supported")]
    FractionalExponentOnPolynomial,

    #[error("exponentiation of a polynomial by a negative integer is not supported")]
    NegativeExponentOnPolynomial,

    #[error("exponent out of range")]
    ExponentOutOfRange,
}

impl From<TryReserveError> for PolyError {
    fn from(_: TryReserveError) -> Self {
        PolyError::AllocationFailure
    }
}

type Result<T> = std::result::Result<T, PolyError>;

/// Every integer below this is exactly representable as an `f64`.
const PRECISE_MAX: f64 = (1u64 << f64::MANTISSA_DIGITS) as f64;

// ============ Factors and monomials ============

/// One `symbol^power` factor of a monomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Factor {
    symbol: char,
    power: u64,
}

impl Factor {
    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn power(&self) -> u64 {
        self.power
    }
}

/// Symbols rank reverse-lexicographically (`x` > `y`), then higher powers first.
impl Ord for Factor {
    fn cmp(&self, other: &Self) -> Ordering {
        symbol_rank(self.symbol, other.symbol).then(self.power.cmp(&other.power))
    }
}

impl PartialOrd for Factor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn symbol_rank(a: char, b: char) -> Ordering {
    b.cmp(&a)
}

/// A product of factors. The empty monomial is the constant `1` and ranks lowest.
///
/// Ordering compares factor by factor; when one chain is a prefix of the
/// other, the shorter chain is smaller.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monomial(Vec<Factor>);

impl Monomial {
    pub fn one() -> Self {
        Self(Vec::new())
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn factors(&self) -> &[Factor] {
        &self.0
    }

    fn is_canonical(&self) -> bool {
        self.0.iter().all(|f| f.power > 0)
            && self
                .0
                .windows(2)
                .all(|w| symbol_rank(w[0].symbol, w[1].symbol) == Ordering::Greater)
    }

    fn duplicate(&self) -> Result<Self> {
        let mut factors = Vec::new();
        factors.try_reserve_exact(self.0.len())?;
        factors.extend_from_slice(&self.0);
        Ok(Self(factors))
    }

    /// Merge two sorted factor chains; matching symbols add their powers.
    fn mul_assign(&mut self, other: &Monomial) -> Result<()> {
        let mut merged = Vec::new();
        merged.try_reserve_exact(self.0.len() + other.0.len())?;

        let mut lhs = self.0.iter().copied().peekable();
        let mut rhs = other.0.iter().copied().peekable();
        loop {
            let rank = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => symbol_rank(a.symbol, b.symbol),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => break,
            };
            let factor = match rank {
                Ordering::Greater => lhs.next(),
                Ordering::Less => rhs.next(),
                Ordering::Equal => match (lhs.next(), rhs.next()) {
                    (Some(a), Some(b)) => Some(Factor {
                        symbol: a.symbol,
                        power: a
                            .power
                            .checked_add(b.power)
                            .ok_or(PolyError::ExponentOutOfRange)?,
                    }),
                    _ => None,
                },
            };
            merged.extend(factor);
        }

        self.0 = merged;
        Ok(())
    }
}

// ============ Terms ============

/// One summand: a coefficient times a monomial.
#[derive(Debug, PartialEq)]
pub struct Term {
    coeff: f64,
    monomial: Monomial,
}

impl Term {
    fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            monomial: Monomial::one(),
        }
    }

    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    pub fn monomial(&self) -> &Monomial {
        &self.monomial
    }

    fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            coeff: self.coeff,
            monomial: self.monomial.duplicate()?,
        })
    }
}

// ============ Polynomials ============

/// A polynomial in canonical form. Never empty.
#[derive(Debug, PartialEq)]
pub struct Poly {
    terms: Vec<Term>,
}

impl Default for Poly {
    fn default() -> Self {
        Self::zero()
    }
}

impl Poly {
    /// The canonical zero: one term with coefficient 0 and no factors.
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    pub fn one() -> Self {
        Self::constant(1.0)
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: vec![Term::constant(value)],
        }
    }

    /// The polynomial `symbol`, i.e. `1 * symbol^1`.
    pub fn var(symbol: char) -> Self {
        Self {
            terms: vec![Term {
                coeff: 1.0,
                monomial: Monomial(vec![Factor { symbol, power: 1 }]),
            }],
        }
    }

    /// A single-term polynomial from `(symbol, power)` pairs in any order.
    /// Repeated symbols multiply together; zero powers are dropped.
    pub fn monomial(coeff: f64, factors: &[(char, u64)]) -> Result<Self> {
        if coeff == 0.0 {
            return Ok(Self::zero());
        }
        let mut monomial = Monomial::one();
        for &(symbol, power) in factors.iter().filter(|(_, power)| *power > 0) {
            monomial.mul_assign(&Monomial(vec![Factor { symbol, power }]))?;
        }
        Ok(Self {
            terms: vec![Term { coeff, monomial }],
        })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// True iff this is a single term with no factors, i.e. a plain number.
    pub fn is_numeric(&self) -> bool {
        matches!(self.terms.as_slice(), [term] if term.monomial.is_one())
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self.terms.as_slice() {
            [term] if term.monomial.is_one() => Some(term.coeff),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_scalar() == Some(0.0)
    }

    /// Checks every structural invariant of the canonical form.
    pub fn is_canonical(&self) -> bool {
        match self.terms.as_slice() {
            [] => false,
            [only] if only.coeff == 0.0 => only.monomial.is_one(),
            terms => {
                terms
                    .iter()
                    .all(|t| t.coeff != 0.0 && t.monomial.is_canonical())
                    && terms.windows(2).all(|w| w[0].monomial > w[1].monomial)
            }
        }
    }

    /// Total order: monomials of corresponding terms first, then
    /// coefficients, then the remaining terms. A polynomial that runs out of
    /// terms first is the smaller one.
    pub fn compare(&self, other: &Self) -> Ordering {
        for (a, b) in self.terms.iter().zip(&other.terms) {
            let ord = a
                .monomial
                .cmp(&b.monomial)
                .then(a.coeff.total_cmp(&b.coeff));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.terms.len().cmp(&other.terms.len())
    }

    /// Deep copy, including every monomial.
    pub fn duplicate(&self) -> Result<Self> {
        let mut terms = Vec::new();
        terms.try_reserve_exact(self.terms.len())?;
        for term in &self.terms {
            terms.push(term.duplicate()?);
        }
        Ok(Self { terms })
    }

    /// `self += src`, as a merge of two sorted term lists.
    pub fn add(&mut self, src: Poly) -> Result<()> {
        let mut merged = Vec::new();
        merged.try_reserve_exact(self.terms.len() + src.terms.len())?;

        let mut lhs = std::mem::take(&mut self.terms).into_iter().peekable();
        let mut rhs = src.terms.into_iter().peekable();
        loop {
            let order = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => a.monomial.cmp(&b.monomial),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => break,
            };
            let term = match order {
                Ordering::Greater => lhs.next(),
                Ordering::Less => rhs.next(),
                Ordering::Equal => lhs.next().zip(rhs.next()).map(|(mut a, b)| {
                    a.coeff += b.coeff;
                    a
                }),
            };
            merged.extend(term);
        }

        self.terms = merged;
        self.strip_zeros()
    }

    /// `self -= src`
    pub fn sub(&mut self, mut src: Poly) -> Result<()> {
        src.neg();
        self.add(src)
    }

    /// `self *= src` by the distributive law.
    ///
    /// Every term of `src` but the last multiplies a fresh copy of the
    /// original `self`; the last one reuses it. On error `self` is left as
    /// the canonical zero.
    pub fn mul(&mut self, src: Poly) -> Result<()> {
        let mut base = std::mem::take(self);
        let mut factors = src.terms;
        let Some(last) = factors.pop() else {
            return Ok(());
        };

        let mut product: Option<Poly> = None;
        for factor in &factors {
            let mut partial = base.duplicate()?;
            partial.scale(factor)?;
            accumulate(&mut product, partial)?;
        }
        base.scale(&last)?;
        accumulate(&mut product, base)?;

        if let Some(product) = product {
            *self = product;
        }
        self.strip_zeros()
    }

    /// `self /= src`; `src` must be a non-zero number.
    pub fn div(&mut self, src: Poly) -> Result<()> {
        let divisor = src.as_scalar().ok_or(PolyError::DivisionByPolynomial)?;
        if divisor == 0.0 {
            return Err(PolyError::DivisionByZero);
        }
        for term in &mut self.terms {
            term.coeff /= divisor;
        }
        self.strip_zeros()
    }

    /// `self ^= src`; `src` must be a number.
    ///
    /// A numeric base takes any real exponent. Any other base needs an exponent
    /// that is a non-negative integer below 2^53.
    pub fn pow(&mut self, src: Poly) -> Result<()> {
        let exponent = src
            .as_scalar()
            .ok_or(PolyError::ExponentiationByPolynomial)?;

        if let [term] = self.terms.as_mut_slice()
            && term.monomial.is_one()
        {
            term.coeff = term.coeff.powf(exponent);
            return Ok(());
        }

        if exponent != exponent.floor() {
            return Err(PolyError::FractionalExponentOnPolynomial);
        }
        if exponent < 0.0 {
            return Err(PolyError::NegativeExponentOnPolynomial);
        }
        if exponent >= PRECISE_MAX {
            return Err(PolyError::ExponentOutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let exponent = exponent as u64;
        if exponent == 0 {
            *self = Self::one();
            return Ok(());
        }
        self.ipow(exponent)
    }

    /// Flips the sign of every coefficient.
    pub fn neg(&mut self) {
        for term in &mut self.terms {
            term.coeff = -term.coeff;
        }
    }

    // Square-and-multiply; `exponent` is at least 1.
    fn ipow(&mut self, exponent: u64) -> Result<()> {
        if exponent < 2 {
            return Ok(());
        }
        let factor = if exponent % 2 == 1 {
            let factor = self.duplicate()?;
            self.ipow(exponent - 1)?;
            factor
        } else {
            self.ipow(exponent / 2)?;
            self.duplicate()?
        };
        self.mul(factor)
    }

    // Multiplies every term by one term. Monomial order is preserved.
    fn scale(&mut self, factor: &Term) -> Result<()> {
        for term in &mut self.terms {
            term.coeff *= factor.coeff;
            if !factor.monomial.is_one() {
                term.monomial.mul_assign(&factor.monomial)?;
            }
        }
        Ok(())
    }

    // Drops zero terms; an all-zero result becomes the canonical zero.
    fn strip_zeros(&mut self) -> Result<()> {
        self.terms.retain(|t| t.coeff != 0.0);
        if self.terms.is_empty() {
            self.terms.try_reserve_exact(1)?;
            self.terms.push(Term::constant(0.0));
        }
        Ok(())
    }
}

fn accumulate(product: &mut Option<Poly>, partial: Poly) -> Result<()> {
    match product {
        Some(acc) => acc.add(partial),
        None => {
            *product = Some(partial);
            Ok(())
        }
    }
}

// ============ Display ============

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.power == 1 {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}^{}", self.symbol, self.power)
        }
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", term.coeff)?;
            for factor in term.monomial.factors() {
                write!(f, " {factor}")?;
            }
        }
        Ok(())
    }
}
