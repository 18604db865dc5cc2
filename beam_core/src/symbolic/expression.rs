//! The exact rational-function expression type.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::atom::{Argument, Atom, Func, PI_SYMBOL, POSITION_SYMBOL};
use super::polynomial::{Monomial, Polynomial, MAX_COEFFICIENT_BITS, MAX_EXPONENT};
use super::{parser, Bindings, ExpressionError, ExpressionResult};

/// Exact quotient of two Laurent polynomials.
///
/// The denominator carries no monomial factor (those live in the numerator
/// as negative exponents) and its lexicographically leading coefficient is
/// one. When either side divides the other exactly, the quotient is stored
/// instead. Equality is semantic: `a == b` when `a - b` is identically zero.
#[derive(Debug, Clone)]
pub struct Expression {
    num: Polynomial,
    den: Polynomial,
}

impl Expression {
    // =========================================================================
    // Construction
    // =========================================================================

    pub fn zero() -> Self {
        Expression {
            num: Polynomial::zero(),
            den: Polynomial::one(),
        }
    }

    pub fn one() -> Self {
        Self::integer(1)
    }

    pub fn integer(value: i64) -> Self {
        Self::rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn rational(value: BigRational) -> Self {
        Self::from_polynomial(Polynomial::constant(value))
    }

    pub fn symbol(name: &str) -> Self {
        Self::from_atom(Atom::symbol(name))
    }

    /// The position variable `x`
    pub fn position() -> Self {
        Self::from_atom(Atom::position())
    }

    pub fn pi() -> Self {
        Self::symbol(PI_SYMBOL)
    }

    /// Solver unknown tagged `tag` (displayed as `$tag`)
    pub fn unknown(tag: impl fmt::Display) -> Self {
        Self::from_atom(Atom::unknown(tag))
    }

    pub fn from_atom(atom: Atom) -> Self {
        Self::from_polynomial(Polynomial::atom(atom))
    }

    pub fn from_polynomial(num: Polynomial) -> Self {
        Expression {
            num,
            den: Polynomial::one(),
        }
    }

    pub(crate) fn from_term(monomial: Monomial, coefficient: BigRational) -> Self {
        Self::from_polynomial(Polynomial::term(monomial, coefficient))
    }

    /// `num / den`, reduced. Fails when `den` is zero.
    pub fn from_parts(num: Polynomial, den: Polynomial) -> ExpressionResult<Self> {
        if den.is_zero() {
            return Err(ExpressionError::DivisionByZero {
                expression: format!("({})/(0)", Self::from_polynomial(num)),
            });
        }
        Ok(Self::reduce(num, den))
    }

    /// Rebuild from parts produced by [`Expression::into_parts`]
    pub(crate) fn from_reduced_parts(num: Polynomial, den: Polynomial) -> Self {
        Expression { num, den }
    }

    pub(crate) fn into_parts(self) -> (Polynomial, Polynomial) {
        (self.num, self.den)
    }

    /// Normal form of `num / den`; `den` must be non-zero.
    fn reduce(num: Polynomial, den: Polynomial) -> Self {
        if num.is_zero() {
            return Self::zero();
        }
        if den.is_one() {
            return Expression { num, den };
        }

        let content = den.monomial_content().inverse();
        let mut num = num.mul_monomial(&content);
        let mut den = den.mul_monomial(&content);

        if let Some(lead) = den.leading_term().map(|(_, c)| c.clone()) {
            if !lead.is_one() {
                let inv = lead.recip();
                num = num.scale(&inv);
                den = den.scale(&inv);
            }
        }
        if den.is_one() {
            return Expression { num, den };
        }

        if let Some(quotient) = num.exact_div(&den) {
            return Self::from_polynomial(quotient);
        }
        if !num.is_monomial() {
            if let Some(quotient) = den.exact_div(&num) {
                return Self::reduce(Polynomial::one(), quotient);
            }
        }
        Expression { num, den }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn numerator(&self) -> &Polynomial {
        &self.num
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// Exact value when the expression is a rational constant
    pub fn as_rational(&self) -> Option<BigRational> {
        let num = self.num.constant_value()?;
        let den = self.den.constant_value()?;
        Some(num / den)
    }

    /// Exact value when the expression is an integer constant
    pub fn as_integer(&self) -> Option<i64> {
        let value = self.as_rational()?;
        if value.is_integer() {
            value.to_integer().to_i64()
        } else {
            None
        }
    }

    pub fn depends_on_x(&self) -> bool {
        self.num.depends_on_x() || self.den.depends_on_x()
    }

    /// True when `target` occurs anywhere in the expression
    pub fn contains(&self, target: &Atom) -> bool {
        self.num.contains(target) || self.den.contains(target)
    }

    pub fn contains_unknowns(&self) -> bool {
        self.atoms().iter().any(Atom::is_unknown)
    }

    /// Distinct top-level atoms of numerator and denominator
    pub fn atoms(&self) -> BTreeSet<Atom> {
        self.num.atoms().chain(self.den.atoms()).cloned().collect()
    }

    /// User symbols the expression depends on, `pi` excluded
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        for atom in self.atoms() {
            collect_symbols(&atom, &mut symbols);
        }
        symbols
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    pub fn checked_div(&self, rhs: &Expression) -> ExpressionResult<Expression> {
        if rhs.is_zero() {
            return Err(ExpressionError::DivisionByZero {
                expression: format!("({})/(0)", self),
            });
        }
        Ok(Self::reduce(&self.num * &rhs.den, &self.den * &rhs.num))
    }

    pub fn recip(&self) -> ExpressionResult<Expression> {
        Expression::one().checked_div(self)
    }

    /// Integer power; negative powers of zero fail.
    ///
    /// Powers whose exponents or coefficients would outgrow
    /// [`MAX_EXPONENT`] or [`MAX_COEFFICIENT_BITS`] are `Unsupported`.
    pub fn pow(&self, k: i32) -> ExpressionResult<Expression> {
        let magnitude = k.unsigned_abs();
        let exponent_fits = i32::try_from(magnitude)
            .ok()
            .and_then(|m| self.max_exponent().checked_mul(m))
            .is_some_and(|e| e <= MAX_EXPONENT)
            && magnitude <= MAX_EXPONENT.unsigned_abs();
        let bits_fit =
            self.coefficient_bits().saturating_mul(u64::from(magnitude)) <= MAX_COEFFICIENT_BITS;
        if !exponent_fits || !bits_fit {
            return Err(ExpressionError::unsupported(format!("power {}", k), self));
        }

        let base = if k < 0 { self.recip()? } else { self.clone() };
        if base.num.is_monomial() && base.den.is_one() {
            // Laurent monomials can carry negative exponents directly
            if let Some((m, c)) = base.num.terms().next() {
                let coefficient = num_traits::pow(c.clone(), magnitude as usize);
                return Ok(Self::from_term(m.pow(magnitude as i32), coefficient));
            }
        }
        Ok(Self::reduce(base.num.pow(magnitude), base.den.pow(magnitude)))
    }

    /// Largest exponent magnitude of any atom in numerator or denominator
    pub fn max_exponent(&self) -> i32 {
        self.num.max_exponent().max(self.den.max_exponent())
    }

    /// Widest coefficient numerator or denominator, in bits
    fn coefficient_bits(&self) -> u64 {
        self.num.coefficient_bits().max(self.den.coefficient_bits())
    }

    /// Fails when a product or quotient pushed an exponent past [`MAX_EXPONENT`]
    pub(crate) fn bounded(self) -> ExpressionResult<Expression> {
        if self.max_exponent() > MAX_EXPONENT {
            return Err(ExpressionError::unsupported(
                format!("exponent above {}", MAX_EXPONENT),
                &self,
            ));
        }
        Ok(self)
    }

    /// Multiply by an exact rational constant
    pub fn scale(&self, factor: &BigRational) -> Expression {
        Expression {
            num: self.num.scale(factor),
            den: self.den.clone(),
        }
        .normalized_zero()
    }

    fn normalized_zero(self) -> Expression {
        if self.num.is_zero() {
            Self::zero()
        } else {
            self
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `func(argument)` where `argument` must be linear in `x`.
    ///
    /// `sin`, `cos` and `exp` of zero, and `sin`/`cos` at multiples of
    /// `pi/6` where the value is rational, collapse to their exact values.
    pub fn function(func: Func, argument: &Expression) -> ExpressionResult<Expression> {
        let (slope, offset) = argument.split_linear().ok_or_else(|| {
            ExpressionError::unsupported(
                format!("argument of {} (must be linear in x)", func),
                argument,
            )
        })?;
        if slope.is_zero() {
            if let Some(value) = canonical_value(func, &offset) {
                return Ok(value);
            }
        }
        Ok(Self::from_atom(Atom::Function(func, Argument::new(slope, offset))))
    }

    /// Decompose into `slope * x + offset` with x-free parts
    pub(crate) fn split_linear(&self) -> Option<(Expression, Expression)> {
        if self.den.depends_on_x() {
            return None;
        }
        let x = Atom::position();
        let mut slope = Polynomial::zero();
        let mut offset = Polynomial::zero();
        for (m, c) in self.num.terms() {
            let rest = m.without(&x);
            if rest.factors().any(|(a, _)| a.depends_on_x()) {
                return None;
            }
            match m.exponent(&x) {
                0 => offset.add_term(rest, c.clone()),
                1 => slope.add_term(rest, c.clone()),
                _ => return None,
            }
        }
        Some((
            Self::reduce(slope, self.den.clone()),
            Self::reduce(offset, self.den.clone()),
        ))
    }

    // =========================================================================
    // Substitution and evaluation
    // =========================================================================

    /// Replace every occurrence of `target` by `value`.
    pub fn substitute(&self, target: &Atom, value: &Expression) -> ExpressionResult<Expression> {
        if !self.contains(target) {
            return Ok(self.clone());
        }
        let num = substitute_polynomial(&self.num, target, value)?;
        let den = substitute_polynomial(&self.den, target, value)?;
        num.checked_div(&den)
    }

    /// Replace the user symbol `name` by `value`
    pub fn subs(&self, name: &str, value: &Expression) -> ExpressionResult<Expression> {
        self.substitute(&Atom::symbol(name), value)
    }

    /// Replace the position variable `x` by `value`
    pub fn subs_x(&self, value: &Expression) -> ExpressionResult<Expression> {
        self.substitute(&Atom::position(), value)
    }

    /// Numeric value under `bindings`
    pub fn evaluate(&self, bindings: &Bindings) -> ExpressionResult<f64> {
        let num = evaluate_polynomial(&self.num, bindings)?;
        let den = evaluate_polynomial(&self.den, bindings)?;
        Ok(num / den)
    }

    /// Numeric value at position `x`
    pub fn evaluate_at(&self, x: f64, bindings: &Bindings) -> ExpressionResult<f64> {
        let bindings = bindings.clone().with(POSITION_SYMBOL, x);
        self.evaluate(&bindings)
    }
}

fn collect_symbols(atom: &Atom, symbols: &mut BTreeSet<String>) {
    match atom {
        Atom::Symbol(name) => {
            if name != PI_SYMBOL {
                symbols.insert(name.clone());
            }
        }
        Atom::Unknown(_) => {}
        Atom::Function(_, arg) => {
            if arg.depends_on_x() {
                symbols.insert(POSITION_SYMBOL.to_string());
            }
            symbols.extend(arg.slope().free_symbols());
            symbols.extend(arg.offset().free_symbols());
        }
    }
}

/// Exact value of `func(offset)` for the handful of canonical offsets
fn canonical_value(func: Func, offset: &Expression) -> Option<Expression> {
    if offset.is_zero() {
        return Some(match func {
            Func::Sin => Expression::zero(),
            Func::Cos | Func::Exp => Expression::one(),
        });
    }
    if func == Func::Exp || !offset.den.is_one() || !offset.num.is_monomial() {
        return None;
    }
    let (m, c) = offset.num.terms().next()?;
    if *m != Monomial::power(Atom::symbol(PI_SYMBOL), 1) {
        return None;
    }
    // offset = c*pi, measured in twelfths of pi; cos(t) = sin(t + pi/2)
    let twelfths = c * BigRational::from_integer(BigInt::from(12));
    if !twelfths.is_integer() {
        return None;
    }
    let shift = if func == Func::Cos { 6 } else { 0 };
    let turn = BigInt::from(24);
    let t: BigInt = ((twelfths.to_integer() + shift) % &turn + &turn) % &turn;
    let (numer, denom) = match t.to_i64()? {
        0 | 12 => (0, 1),
        6 => (1, 1),
        18 => (-1, 1),
        2 | 10 => (1, 2),
        14 | 22 => (-1, 2),
        _ => return None,
    };
    Some(Expression::rational(BigRational::new(
        BigInt::from(numer),
        BigInt::from(denom),
    )))
}

fn substitute_polynomial(
    p: &Polynomial,
    target: &Atom,
    value: &Expression,
) -> ExpressionResult<Expression> {
    let mut total = Expression::zero();
    for (m, c) in p.terms() {
        let mut factor = Expression::one();
        let mut untouched = Monomial::one();
        for (atom, e) in m.factors() {
            if atom == target {
                factor = &factor * &value.pow(e)?;
            } else if let Atom::Function(func, arg) = atom {
                if arg.contains(target) {
                    let argument = arg.to_expression().substitute(target, value)?;
                    factor = &factor * &Expression::function(*func, &argument)?.pow(e)?;
                } else {
                    untouched = untouched.mul(&Monomial::power(atom.clone(), e));
                }
            } else {
                untouched = untouched.mul(&Monomial::power(atom.clone(), e));
            }
        }
        total = &total + &(&factor * &Expression::from_term(untouched, c.clone()));
    }
    Ok(total)
}

fn evaluate_polynomial(p: &Polynomial, bindings: &Bindings) -> ExpressionResult<f64> {
    let mut total = 0.0;
    for (m, c) in p.terms() {
        let mut term = c.to_f64().unwrap_or(f64::NAN);
        for (atom, e) in m.factors() {
            term *= evaluate_atom(atom, bindings)?.powi(e);
        }
        total += term;
    }
    Ok(total)
}

fn evaluate_atom(atom: &Atom, bindings: &Bindings) -> ExpressionResult<f64> {
    match atom {
        Atom::Symbol(name) => bindings.get(name),
        Atom::Unknown(name) => Err(ExpressionError::UnboundSymbol { name: name.clone() }),
        Atom::Function(func, arg) => {
            let mut u = arg.offset().evaluate(bindings)?;
            if arg.depends_on_x() {
                u += arg.slope().evaluate(bindings)? * bindings.get(POSITION_SYMBOL)?;
            }
            Ok(func.apply(u))
        }
    }
}

// =============================================================================
// Operators
// =============================================================================

fn add_expressions(a: &Expression, b: &Expression) -> Expression {
    if a.is_zero() {
        return b.clone();
    }
    if b.is_zero() {
        return a.clone();
    }
    if a.den == b.den {
        return Expression::reduce(&a.num + &b.num, a.den.clone());
    }
    if b.den.is_one() {
        return Expression::reduce(&a.num + &(&b.num * &a.den), a.den.clone());
    }
    if a.den.is_one() {
        return Expression::reduce(&(&a.num * &b.den) + &b.num, b.den.clone());
    }
    if let Some(q) = b.den.exact_div(&a.den) {
        return Expression::reduce(&(&a.num * &q) + &b.num, b.den.clone());
    }
    if let Some(q) = a.den.exact_div(&b.den) {
        return Expression::reduce(&a.num + &(&b.num * &q), a.den.clone());
    }
    Expression::reduce(
        &(&a.num * &b.den) + &(&b.num * &a.den),
        &a.den * &b.den,
    )
}

fn mul_expressions(a: &Expression, b: &Expression) -> Expression {
    if a.is_zero() || b.is_zero() {
        return Expression::zero();
    }
    if a.den.is_one() && b.den.is_one() {
        return Expression::from_polynomial(&a.num * &b.num);
    }
    Expression::reduce(&a.num * &b.num, &a.den * &b.den)
}

fn sub_expressions(a: &Expression, b: &Expression) -> Expression {
    add_expressions(a, &-b)
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident, $func:ident) => {
        impl<'a, 'b> $imp<&'b Expression> for &'a Expression {
            type Output = Expression;
            fn $method(self, rhs: &'b Expression) -> Expression {
                $func(self, rhs)
            }
        }

        impl $imp<Expression> for Expression {
            type Output = Expression;
            fn $method(self, rhs: Expression) -> Expression {
                $func(&self, &rhs)
            }
        }

        impl<'a> $imp<&'a Expression> for Expression {
            type Output = Expression;
            fn $method(self, rhs: &'a Expression) -> Expression {
                $func(&self, rhs)
            }
        }

        impl<'a> $imp<Expression> for &'a Expression {
            type Output = Expression;
            fn $method(self, rhs: Expression) -> Expression {
                $func(self, &rhs)
            }
        }
    };
}

forward_binop!(Add, add, add_expressions);
forward_binop!(Sub, sub, sub_expressions);
forward_binop!(Mul, mul, mul_expressions);

impl<'a> Neg for &'a Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        -&self
    }
}

impl std::iter::Sum for Expression {
    fn sum<I: Iterator<Item = Expression>>(iter: I) -> Expression {
        iter.fold(Expression::zero(), |acc, e| &acc + &e)
    }
}

impl<'a> std::iter::Sum<&'a Expression> for Expression {
    fn sum<I: Iterator<Item = &'a Expression>>(iter: I) -> Expression {
        iter.fold(Expression::zero(), |acc, e| &acc + e)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        if self.den == other.den {
            return self.num == other.num;
        }
        (&(&self.num * &other.den) - &(&other.num * &self.den)).is_zero()
    }
}

impl Eq for Expression {}

impl Default for Expression {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::integer(value)
    }
}

impl From<BigRational> for Expression {
    fn from(value: BigRational) -> Self {
        Expression::rational(value)
    }
}

// =============================================================================
// Display, parsing, serde
// =============================================================================

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            return write!(f, "{}", format_polynomial(&self.num));
        }
        let num = format_polynomial(&self.num);
        if self.num.len() > 1 {
            write!(f, "({})/({})", num, format_polynomial(&self.den))
        } else {
            write!(f, "{}/({})", num, format_polynomial(&self.den))
        }
    }
}

/// Terms ordered by descending power of `x`
fn format_polynomial(p: &Polynomial) -> String {
    if p.is_zero() {
        return "0".to_string();
    }
    let x = Atom::position();
    let mut terms: Vec<_> = p.terms().collect();
    terms.sort_by(|a, b| b.0.exponent(&x).cmp(&a.0.exponent(&x)));

    let mut out = String::new();
    for (i, (m, c)) in terms.into_iter().enumerate() {
        let negative = c.is_negative();
        match (i, negative) {
            (0, true) => out.push('-'),
            (0, false) => {}
            (_, true) => out.push_str(" - "),
            (_, false) => out.push_str(" + "),
        }
        out.push_str(&format_term(m, &c.abs()));
    }
    out
}

fn format_term(m: &Monomial, magnitude: &BigRational) -> String {
    let mut upper: Vec<String> = Vec::new();
    let mut lower: Vec<String> = Vec::new();
    for (atom, e) in m.factors() {
        let power = if e.abs() == 1 {
            atom.to_string()
        } else {
            format!("{}**{}", atom, e.abs())
        };
        if e > 0 {
            upper.push(power);
        } else {
            lower.push(power);
        }
    }
    if !magnitude.numer().is_one() || upper.is_empty() {
        upper.insert(0, magnitude.numer().to_string());
    }
    if !magnitude.denom().is_one() {
        lower.insert(0, magnitude.denom().to_string());
    }

    let mut out = upper.join("*");
    match lower.len() {
        0 => {}
        1 => {
            out.push('/');
            out.push_str(&lower[0]);
        }
        _ => {
            out.push_str("/(");
            out.push_str(&lower.join("*"));
            out.push(')');
        }
    }
    out
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// IntoExpression
// =============================================================================

/// Anything the beam builder accepts as a coordinate or a value.
pub trait IntoExpression {
    fn into_expression(self) -> ExpressionResult<Expression>;
}

impl IntoExpression for Expression {
    fn into_expression(self) -> ExpressionResult<Expression> {
        Ok(self)
    }
}

impl IntoExpression for &Expression {
    fn into_expression(self) -> ExpressionResult<Expression> {
        Ok(self.clone())
    }
}

impl IntoExpression for &str {
    fn into_expression(self) -> ExpressionResult<Expression> {
        self.parse()
    }
}

impl IntoExpression for String {
    fn into_expression(self) -> ExpressionResult<Expression> {
        self.parse()
    }
}

impl IntoExpression for &String {
    fn into_expression(self) -> ExpressionResult<Expression> {
        self.parse()
    }
}

impl IntoExpression for i32 {
    fn into_expression(self) -> ExpressionResult<Expression> {
        Ok(Expression::integer(i64::from(self)))
    }
}

impl IntoExpression for i64 {
    fn into_expression(self) -> ExpressionResult<Expression> {
        Ok(Expression::integer(self))
    }
}

impl IntoExpression for u32 {
    fn into_expression(self) -> ExpressionResult<Expression> {
        Ok(Expression::integer(i64::from(self)))
    }
}

/// Floats go through their shortest decimal representation, so `0.1`
/// becomes exactly `1/10`.
impl IntoExpression for f64 {
    fn into_expression(self) -> ExpressionResult<Expression> {
        if !self.is_finite() {
            return Err(ExpressionError::parse(self.to_string(), 0, "value is not finite"));
        }
        format!("{:?}", self).parse()
    }
}
