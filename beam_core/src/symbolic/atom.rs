//! Polynomial variables: symbols, unknowns and transcendental functions.

use std::fmt;

use super::expression::Expression;
use super::polynomial::Polynomial;

/// Name of the position variable along the beam axis
pub const POSITION_SYMBOL: &str = "x";

/// Name of the symbol evaluated as π
pub const PI_SYMBOL: &str = "pi";

/// Transcendental functions accepted in load expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Exp,
}

impl Func {
    /// Name as written in expressions
    pub fn name(&self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Exp => "exp",
        }
    }

    /// Numeric value at `u`
    pub fn apply(&self, u: f64) -> f64 {
        match self {
            Func::Sin => u.sin(),
            Func::Cos => u.cos(),
            Func::Exp => u.exp(),
        }
    }

    /// Derivative with respect to the argument, as `(sign, function)`
    pub(crate) fn derivative(&self) -> (i64, Func) {
        match self {
            Func::Sin => (1, Func::Cos),
            Func::Cos => (-1, Func::Sin),
            Func::Exp => (1, Func::Exp),
        }
    }

    /// `order`-th antiderivative with respect to the argument, as `(sign, function)`
    pub(crate) fn antiderivative(&self, order: usize) -> (i64, Func) {
        const SIN: [(i64, Func); 4] = [(-1, Func::Cos), (-1, Func::Sin), (1, Func::Cos), (1, Func::Sin)];
        const COS: [(i64, Func); 4] = [(1, Func::Sin), (-1, Func::Cos), (-1, Func::Sin), (1, Func::Cos)];
        let index = (order.max(1) - 1) % 4;
        match self {
            Func::Sin => SIN[index],
            Func::Cos => COS[index],
            Func::Exp => (1, Func::Exp),
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Argument `slope * x + offset` of a function atom.
///
/// Slope and offset are stored as reduced numerator/denominator pairs and
/// never contain `x`, so structurally equal arguments compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Argument {
    slope: (Polynomial, Polynomial),
    offset: (Polynomial, Polynomial),
}

impl Argument {
    pub(crate) fn new(slope: Expression, offset: Expression) -> Self {
        Argument {
            slope: slope.into_parts(),
            offset: offset.into_parts(),
        }
    }

    /// Coefficient of `x`
    pub fn slope(&self) -> Expression {
        Expression::from_reduced_parts(self.slope.0.clone(), self.slope.1.clone())
    }

    /// Constant part
    pub fn offset(&self) -> Expression {
        Expression::from_reduced_parts(self.offset.0.clone(), self.offset.1.clone())
    }

    /// Whole argument as an expression in `x`
    pub fn to_expression(&self) -> Expression {
        &(&self.slope() * &Expression::position()) + &self.offset()
    }

    /// True when the argument varies along the beam
    pub fn depends_on_x(&self) -> bool {
        !self.slope.0.is_zero()
    }

    pub(crate) fn contains(&self, target: &Atom) -> bool {
        if target.is_position() && self.depends_on_x() {
            return true;
        }
        [&self.slope.0, &self.slope.1, &self.offset.0, &self.offset.1]
            .iter()
            .any(|p| p.contains(target))
    }
}

/// A variable of the polynomial ring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    /// User symbol, including `x` and `pi`
    Symbol(String),
    /// Solver unknown; names start with `$` so they never clash with input
    Unknown(String),
    /// `sin`, `cos` or `exp` of a linear argument
    Function(Func, Argument),
}

impl Atom {
    pub fn symbol(name: impl Into<String>) -> Self {
        Atom::Symbol(name.into())
    }

    /// Solver unknown with the given tag, e.g. `R3`
    pub fn unknown(tag: impl fmt::Display) -> Self {
        Atom::Unknown(format!("${}", tag))
    }

    pub fn position() -> Self {
        Atom::Symbol(POSITION_SYMBOL.to_string())
    }

    pub fn is_position(&self) -> bool {
        matches!(self, Atom::Symbol(name) if name == POSITION_SYMBOL)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Atom::Unknown(_))
    }

    /// True when the atom varies with `x`
    pub fn depends_on_x(&self) -> bool {
        match self {
            Atom::Symbol(_) => self.is_position(),
            Atom::Unknown(_) => false,
            Atom::Function(_, arg) => arg.depends_on_x(),
        }
    }

    /// True when `target` is this atom or appears inside its argument
    pub fn contains(&self, target: &Atom) -> bool {
        if self == target {
            return true;
        }
        match self {
            Atom::Function(_, arg) => arg.contains(target),
            _ => false,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(name) | Atom::Unknown(name) => write!(f, "{}", name),
            Atom::Function(func, arg) => write!(f, "{}({})", func, arg.to_expression()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_cannot_be_parsed() {
        let unknown = Atom::unknown("R0");
        assert_eq!(unknown.to_string(), "$R0");
        assert!("$R0".parse::<Expression>().is_err());
    }

    #[test]
    fn test_antiderivative_cycle() {
        assert_eq!(Func::Sin.antiderivative(1), (-1, Func::Cos));
        assert_eq!(Func::Sin.antiderivative(5), (-1, Func::Cos));
        assert_eq!(Func::Cos.antiderivative(2), (-1, Func::Cos));
        assert_eq!(Func::Exp.antiderivative(3), (1, Func::Exp));
    }

    #[test]
    fn test_function_atom_dependence() {
        let load: Expression = "sin(pi*x/L)".parse().unwrap();
        let atom = load.atoms().into_iter().next().unwrap();
        assert!(atom.depends_on_x());
        assert!(atom.contains(&Atom::symbol("L")));
        assert!(!atom.contains(&Atom::symbol("P")));
        assert_eq!(atom.to_string(), "sin(pi*x/L)");
    }
}
