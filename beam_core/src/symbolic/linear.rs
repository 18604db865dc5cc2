//! Exact solution of linear systems with symbolic coefficients.
//!
//! Elimination is fraction-free (Bareiss): every update divides by the
//! previous pivot, and that division is exact, so coefficients stay
//! polynomial instead of growing nested fractions.

use std::collections::BTreeMap;

use log::trace;

use super::atom::Atom;
use super::expression::Expression;
use super::polynomial::Polynomial;
use super::{ExpressionError, ExpressionResult};

/// Values found for each unknown, in the order the unknowns were given.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    values: Vec<(Atom, Expression)>,
}

impl Solution {
    pub fn get(&self, unknown: &Atom) -> Option<&Expression> {
        self.values.iter().find(|(a, _)| a == unknown).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Expression)> {
        self.values.iter().map(|(a, v)| (a, v))
    }

    /// Substitute every solved unknown into `expression`
    pub fn apply(&self, expression: &Expression) -> ExpressionResult<Expression> {
        let mut result = expression.clone();
        for (unknown, value) in &self.values {
            if result.contains(unknown) {
                result = result.substitute(unknown, value)?;
            }
        }
        Ok(result)
    }
}

/// Solve `equations = 0` for `unknowns`.
///
/// Every equation must be linear in the unknowns (no products of unknowns,
/// no unknown in a denominator of a term). The system must be square and
/// non-singular.
pub fn solve_linear_system(equations: &[Expression], unknowns: &[Atom]) -> ExpressionResult<Solution> {
    if equations.len() != unknowns.len() {
        return Err(ExpressionError::CountMismatch {
            equations: equations.len(),
            unknowns: unknowns.len(),
        });
    }
    let n = unknowns.len();
    if n == 0 {
        return Ok(Solution::default());
    }

    let index: BTreeMap<&Atom, usize> = unknowns.iter().enumerate().map(|(i, a)| (a, i)).collect();
    let mut matrix = equations
        .iter()
        .map(|eq| linear_row(eq, &index))
        .collect::<ExpressionResult<Vec<_>>>()?;

    // Forward elimination
    let mut previous = Expression::one();
    for k in 0..n {
        let pivot_row = (k..n)
            .filter(|&r| !matrix[r][k].is_zero())
            .min_by_key(|&r| matrix[r][k].numerator().len() + matrix[r][k].denominator().len())
            .ok_or(ExpressionError::Singular { unknowns: n })?;
        matrix.swap(k, pivot_row);

        for i in (k + 1)..n {
            for j in (k + 1)..=n {
                let updated = &matrix[k][k] * &matrix[i][j] - &matrix[i][k] * &matrix[k][j];
                matrix[i][j] = updated.checked_div(&previous)?;
            }
            matrix[i][k] = Expression::zero();
        }
        previous = matrix[k][k].clone();
        trace!("eliminated column {} of {}", k + 1, n);
    }

    // Back substitution on y_i = x_i * det, which stays polynomial
    let det = previous;
    let mut scaled = vec![Expression::zero(); n];
    for i in (0..n).rev() {
        let mut acc = &matrix[i][n] * &det;
        for j in (i + 1)..n {
            acc = acc - &matrix[i][j] * &scaled[j];
        }
        scaled[i] = acc.checked_div(&matrix[i][i])?;
    }

    let values = unknowns
        .iter()
        .zip(scaled)
        .map(|(u, y)| Ok((u.clone(), y.checked_div(&det)?)))
        .collect::<ExpressionResult<Vec<_>>>()?;
    Ok(Solution { values })
}

/// Coefficients of one equation followed by its right-hand side.
fn linear_row(equation: &Expression, index: &BTreeMap<&Atom, usize>) -> ExpressionResult<Vec<Expression>> {
    let non_linear = || ExpressionError::NonLinear {
        equation: equation.to_string(),
    };
    if index.keys().any(|u| equation.denominator().contains(u)) {
        return Err(non_linear());
    }

    let n = index.len();
    let mut coefficients = vec![Polynomial::zero(); n];
    let mut constant = Polynomial::zero();
    for (m, c) in equation.numerator().terms() {
        let mut found = None;
        for (atom, e) in m.factors() {
            if let Some(&i) = index.get(atom) {
                if e != 1 || found.is_some() {
                    return Err(non_linear());
                }
                found = Some((i, atom));
            } else if index.keys().any(|u| atom.contains(u)) {
                return Err(non_linear());
            }
        }
        match found {
            Some((i, atom)) => coefficients[i].add_term(m.without(atom), c.clone()),
            None => constant.add_term(m.clone(), c.clone()),
        }
    }

    let mut row: Vec<Expression> = coefficients.into_iter().map(Expression::from_polynomial).collect();
    row.push(-Expression::from_polynomial(constant));
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(s: &str) -> Expression {
        s.parse().unwrap()
    }

    #[test]
    fn test_two_by_two() {
        let a = Atom::unknown("a");
        let b = Atom::unknown("b");
        let ea = Expression::from_atom(a.clone());
        let eb = Expression::from_atom(b.clone());
        // a + b - P = 0, a*L - P*L/2 = 0
        let equations = vec![
            &ea + &eb - expr("P"),
            &ea * &expr("L") - expr("P*L/2"),
        ];
        let solution = solve_linear_system(&equations, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(solution.get(&a).unwrap(), &expr("P/2"));
        assert_eq!(solution.get(&b).unwrap(), &expr("P/2"));
    }

    #[test]
    fn test_symbolic_pivots() {
        let r = Atom::unknown("r");
        let w = Atom::unknown("w");
        let er = Expression::from_atom(r.clone());
        let ew = Expression::from_atom(w.clone());
        // r + k*w = 0, 48*E*I*w + L**3*(P - r) = 0  (midspan spring on a simple span)
        let equations = vec![
            &er + &(&expr("k") * &ew),
            &(&expr("48*E*I") * &ew) + &(&expr("L**3") * &(expr("P") - &er)),
        ];
        let solution = solve_linear_system(&equations, &[r.clone(), w]).unwrap();
        assert_eq!(solution.get(&r).unwrap(), &expr("k*P*L**3/(48*E*I + k*L**3)"));
    }

    #[test]
    fn test_apply_substitutes_all_unknowns() {
        let a = Atom::unknown("a");
        let ea = Expression::from_atom(a.clone());
        let solution = solve_linear_system(&[&ea - &expr("2*L")], &[a.clone()]).unwrap();
        let curve = &ea * &expr("x");
        assert_eq!(solution.apply(&curve).unwrap(), expr("2*L*x"));
    }

    #[test]
    fn test_failures() {
        let a = Atom::unknown("a");
        let b = Atom::unknown("b");
        let ea = Expression::from_atom(a.clone());
        let eb = Expression::from_atom(b.clone());

        let err = solve_linear_system(&[ea.clone()], &[a.clone(), b.clone()]).unwrap_err();
        assert_eq!(err, ExpressionError::CountMismatch { equations: 1, unknowns: 2 });

        let err = solve_linear_system(&[&ea * &ea], &[a.clone()]).unwrap_err();
        assert!(matches!(err, ExpressionError::NonLinear { .. }));

        let err = solve_linear_system(&[&ea * &eb, eb.clone()], &[a.clone(), b.clone()]).unwrap_err();
        assert!(matches!(err, ExpressionError::NonLinear { .. }));

        let err = solve_linear_system(&[&ea + &eb - expr("1"), &(&ea + &eb) * &expr("2")], &[a, b]).unwrap_err();
        assert_eq!(err, ExpressionError::Singular { unknowns: 2 });
    }
}
