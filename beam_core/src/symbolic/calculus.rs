//! Integration and differentiation with respect to the position variable.
//!
//! Integration is closed over the load class the solver accepts:
//! polynomials in `x` and products `x^n * f(a*x + b)` with `f` one of
//! `sin`, `cos`, `exp`. Anything else is reported as unsupported rather
//! than approximated.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use super::atom::{Argument, Atom, Func};
use super::expression::Expression;
use super::polynomial::{Monomial, Polynomial, MAX_EXPONENT};
use super::{ExpressionError, ExpressionResult};

impl Expression {
    /// Antiderivative in `x` with zero constant of integration.
    pub fn integrate(&self) -> ExpressionResult<Expression> {
        if self.denominator().depends_on_x() {
            return Err(ExpressionError::unsupported("integrand", self));
        }
        let mut total = Expression::zero();
        for (m, c) in self.numerator().terms() {
            let term = integrate_term(m, c)?
                .ok_or_else(|| ExpressionError::unsupported("integrand", self))?;
            total = &total + &term;
        }
        total.checked_div(&Expression::from_polynomial(self.denominator().clone()))
    }

    /// `∫ self dx` from `lower` to `upper`
    pub fn definite_integral(&self, lower: &Expression, upper: &Expression) -> ExpressionResult<Expression> {
        let antiderivative = self.integrate()?;
        Ok(antiderivative.subs_x(upper)? - antiderivative.subs_x(lower)?)
    }

    /// Derivative in `x`.
    pub fn differentiate(&self) -> ExpressionResult<Expression> {
        let num = differentiate_polynomial(self.numerator());
        if !self.denominator().depends_on_x() {
            return num.checked_div(&Expression::from_polynomial(self.denominator().clone()));
        }
        let den = Expression::from_polynomial(self.denominator().clone());
        let den_prime = differentiate_polynomial(self.denominator());
        let top = &num * &den - &Expression::from_polynomial(self.numerator().clone()) * &den_prime;
        top.checked_div(&(&den * &den))
    }
}

/// `Ok(None)` when the term is outside the supported class.
fn integrate_term(m: &Monomial, c: &BigRational) -> ExpressionResult<Option<Expression>> {
    let x = Atom::position();
    let n = m.exponent(&x);
    if n < 0 {
        return Ok(None);
    }

    let mut kernel: Option<(Func, &Argument)> = None;
    let mut rest = Monomial::one();
    for (atom, e) in m.factors() {
        match atom {
            a if a.is_position() => {}
            Atom::Function(func, arg) if arg.depends_on_x() => {
                if e != 1 || kernel.is_some() {
                    return Ok(None);
                }
                kernel = Some((*func, arg));
            }
            _ => rest = rest.mul(&Monomial::power(atom.clone(), e)),
        }
    }
    let coefficient = Expression::from_term(rest, c.clone());

    let (func, arg) = match kernel {
        None => {
            let next = n
                .checked_add(1)
                .filter(|e| *e <= MAX_EXPONENT)
                .ok_or_else(|| {
                    ExpressionError::unsupported("integrand", Expression::from_term(m.clone(), c.clone()))
                })?;
            let raised = Monomial::power(x, next);
            let factor = BigRational::new(BigInt::one(), BigInt::from(next));
            return Ok(Some(&coefficient * &Expression::from_term(raised, factor)));
        }
        Some(k) => k,
    };

    // Repeated integration by parts:
    // ∫ x^n f(u) dx = Σ_k (-1)^k n!/(n-k)! x^(n-k) F_(k+1)(u) / a^(k+1)
    let a_inv = arg.slope().recip()?;
    let mut a_power = a_inv.clone();
    let mut falling = BigInt::one();
    let mut sum = Expression::zero();
    for k in 0..=n {
        if k > 0 {
            falling *= BigInt::from(n - k + 1);
            a_power = &a_power * &a_inv;
        }
        let (sign, antiderivative) = func.antiderivative(k as usize + 1);
        let sign = if k % 2 == 1 { -sign } else { sign };
        let scalar = BigRational::from_integer(&falling * BigInt::from(sign));
        let x_power = Monomial::power(x.clone(), n - k);
        let f = Expression::from_atom(Atom::Function(antiderivative, arg.clone()));
        sum = &sum + &(&(&Expression::from_term(x_power, scalar) * &f) * &a_power);
    }
    Ok(Some(&coefficient * &sum))
}

fn differentiate_polynomial(p: &Polynomial) -> Expression {
    let mut total = Expression::zero();
    for (m, c) in p.terms() {
        for (atom, e) in m.factors() {
            let inner = match atom {
                a if a.is_position() => Expression::one(),
                Atom::Function(func, arg) if arg.depends_on_x() => {
                    let (sign, derivative) = func.derivative();
                    let f = Expression::from_atom(Atom::Function(derivative, arg.clone()));
                    &(&f * &arg.slope()) * &Expression::integer(sign)
                }
                _ => continue,
            };
            let reduced = m.mul(&Monomial::power(atom.clone(), -1));
            let scalar = c * BigRational::from_integer(BigInt::from(e));
            total = &total + &(&Expression::from_term(reduced, scalar) * &inner);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(s: &str) -> Expression {
        s.parse().unwrap()
    }

    #[test]
    fn test_integrate_polynomial() {
        assert_eq!(expr("-P").integrate().unwrap(), expr("-P*x"));
        assert_eq!(expr("5*x").integrate().unwrap(), expr("5*x**2/2"));
        assert_eq!(
            expr("(-L*P + P*x)/(E*I)").integrate().unwrap(),
            expr("-L*P*x/(E*I) + P*x**2/(2*E*I)")
        );
    }

    #[test]
    fn test_integrate_sine() {
        let q = expr("sin(pi*x/L)");
        assert_eq!(q.integrate().unwrap(), expr("-L*cos(pi*x/L)/pi"));
        let magnitude = q.definite_integral(&expr("0"), &expr("L")).unwrap();
        assert_eq!(magnitude, expr("2*L/pi"));
    }

    #[test]
    fn test_integrate_by_parts() {
        // ∫ x sin(x) = sin(x) - x cos(x)
        let f = expr("x*sin(x)").integrate().unwrap();
        assert_eq!(f, expr("sin(x) - x*cos(x)"));
        assert_eq!(f.differentiate().unwrap(), expr("x*sin(x)"));

        // ∫ x^2 exp(2x) = exp(2x) (x^2/2 - x/2 + 1/4)
        let g = expr("x**2*exp(2*x)").integrate().unwrap();
        assert_eq!(g, expr("exp(2*x)*(x**2/2 - x/2 + 1/4)"));
    }

    #[test]
    fn test_first_moment_of_sine_load() {
        let moment = expr("x*sin(pi*x/L)").definite_integral(&expr("0"), &expr("L")).unwrap();
        assert_eq!(moment, expr("L**2/pi"));
    }

    #[test]
    fn test_unsupported_integrands() {
        for text in ["1/x", "sin(x)**2", "sin(x)*cos(x)", "1/(x + 1)"] {
            let err = expr(text).integrate().unwrap_err();
            assert!(matches!(err, ExpressionError::Unsupported { .. }), "{}", text);
        }
    }

    #[test]
    fn test_differentiate() {
        assert_eq!(expr("x**3/6 - L*x").differentiate().unwrap(), expr("x**2/2 - L"));
        assert_eq!(expr("cos(2*x)").differentiate().unwrap(), expr("-2*sin(2*x)"));
        assert_eq!(expr("1/(x + 1)").differentiate().unwrap(), expr("-1/(x + 1)**2"));
        assert!(expr("E*I").differentiate().unwrap().is_zero());
    }
}
