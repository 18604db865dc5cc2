//! Multivariate Laurent polynomials with exact rational coefficients.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use num_rational::BigRational;
use num_traits::{One, Zero};

use super::atom::Atom;

/// Largest exponent magnitude any atom may reach
pub const MAX_EXPONENT: i32 = 1024;

/// Largest coefficient width, in bits, a power may produce
pub const MAX_COEFFICIENT_BITS: u64 = 1 << 16;

// =============================================================================
// Monomial
// =============================================================================

/// Product of atoms raised to non-zero integer exponents.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<Atom, i32>);

impl Monomial {
    pub fn one() -> Self {
        Monomial(BTreeMap::new())
    }

    pub fn power(atom: Atom, exponent: i32) -> Self {
        let mut factors = BTreeMap::new();
        if exponent != 0 {
            factors.insert(atom, exponent);
        }
        Monomial(factors)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn exponent(&self, atom: &Atom) -> i32 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    pub fn factors(&self) -> impl Iterator<Item = (&Atom, i32)> {
        self.0.iter().map(|(a, e)| (a, *e))
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut factors = self.0.clone();
        for (atom, exponent) in &other.0 {
            let entry = factors.entry(atom.clone()).or_insert(0);
            *entry = entry.saturating_add(*exponent);
            if *entry == 0 {
                factors.remove(atom);
            }
        }
        Monomial(factors)
    }

    pub fn inverse(&self) -> Monomial {
        Monomial(self.0.iter().map(|(a, e)| (a.clone(), -e)).collect())
    }

    pub fn pow(&self, k: i32) -> Monomial {
        if k == 0 {
            return Monomial::one();
        }
        Monomial(self.0.iter().map(|(a, e)| (a.clone(), e.saturating_mul(k))).collect())
    }

    /// Largest exponent magnitude over all atoms
    pub fn max_exponent(&self) -> i32 {
        self.0.values().map(|e| e.saturating_abs()).max().unwrap_or(0)
    }

    /// Monomial with `atom` removed
    pub fn without(&self, atom: &Atom) -> Monomial {
        let mut factors = self.0.clone();
        factors.remove(atom);
        Monomial(factors)
    }

    /// Exponent-wise minimum, treating absent atoms as exponent zero
    pub fn meet(&self, other: &Monomial) -> Monomial {
        let mut factors = BTreeMap::new();
        for (atom, &e) in &self.0 {
            let m = e.min(other.exponent(atom));
            if m != 0 {
                factors.insert(atom.clone(), m);
            }
        }
        for (atom, &e) in &other.0 {
            if !self.0.contains_key(atom) && e < 0 {
                factors.insert(atom.clone(), e);
            }
        }
        Monomial(factors)
    }

    /// True when every exponent of `self` is at most the one in `other`
    pub fn divides(&self, other: &Monomial) -> bool {
        self.0.iter().all(|(a, &e)| e <= other.exponent(a))
    }

    /// Lexicographic monomial order; the smallest atom is most significant.
    pub fn lex_cmp(&self, other: &Monomial) -> Ordering {
        let mut a = self.0.iter().peekable();
        let mut b = other.0.iter().peekable();
        loop {
            match (a.peek().copied(), b.peek().copied()) {
                (None, None) => return Ordering::Equal,
                (Some((_, ea)), None) => return ea.cmp(&0),
                (None, Some((_, eb))) => return 0.cmp(eb),
                (Some((ka, ea)), Some((kb, eb))) => match ka.cmp(kb) {
                    Ordering::Less => return ea.cmp(&0),
                    Ordering::Greater => return 0.cmp(eb),
                    Ordering::Equal => {
                        if ea != eb {
                            return ea.cmp(eb);
                        }
                        a.next();
                        b.next();
                    }
                },
            }
        }
    }
}

// =============================================================================
// Polynomial
// =============================================================================

/// Sum of monomials with non-zero rational coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::term(Monomial::one(), value)
    }

    pub fn term(monomial: Monomial, coefficient: BigRational) -> Self {
        let mut p = Self::zero();
        p.add_term(monomial, coefficient);
        p
    }

    pub fn atom(atom: Atom) -> Self {
        Self::term(Monomial::power(atom, 1), BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.terms.len() == 1
            && self
                .terms
                .get(&Monomial::one())
                .is_some_and(|c| c.is_one())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    /// Value of a constant polynomial
    pub fn constant_value(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::one()).cloned(),
            _ => None,
        }
    }

    pub fn is_monomial(&self) -> bool {
        self.terms.len() == 1
    }

    pub fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(coefficient);
            }
        }
    }

    pub fn scale(&self, factor: &BigRational) -> Polynomial {
        if factor.is_zero() {
            return Polynomial::zero();
        }
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c * factor)).collect(),
        }
    }

    pub fn mul_monomial(&self, monomial: &Monomial) -> Polynomial {
        if monomial.is_one() {
            return self.clone();
        }
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.mul(monomial), c.clone())).collect(),
        }
    }

    /// Largest exponent magnitude over all terms
    pub fn max_exponent(&self) -> i32 {
        self.terms.keys().map(Monomial::max_exponent).max().unwrap_or(0)
    }

    /// Widest numerator or denominator among the coefficients, in bits
    pub fn coefficient_bits(&self) -> u64 {
        self.terms
            .values()
            .map(|c| c.numer().bits().max(c.denom().bits()))
            .max()
            .unwrap_or(0)
    }

    pub fn pow(&self, k: u32) -> Polynomial {
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                result = &result * &base;
            }
            k >>= 1;
            if k > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Largest monomial factor shared by all terms (Laurent exponents allowed)
    pub fn monomial_content(&self) -> Monomial {
        let mut iter = self.terms.keys();
        let first = match iter.next() {
            Some(m) => m.clone(),
            None => return Monomial::one(),
        };
        iter.fold(first, |acc, m| acc.meet(m))
    }

    /// Leading term under [`Monomial::lex_cmp`]
    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().max_by(|a, b| a.0.lex_cmp(b.0))
    }

    /// True when `target` occurs anywhere, including inside function arguments
    pub fn contains(&self, target: &Atom) -> bool {
        self.terms
            .keys()
            .any(|m| m.factors().any(|(a, _)| a.contains(target)))
    }

    pub fn depends_on_x(&self) -> bool {
        self.terms
            .keys()
            .any(|m| m.factors().any(|(a, _)| a.depends_on_x()))
    }

    /// Every atom that appears in some term
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.terms.keys().flat_map(|m| m.factors().map(|(a, _)| a))
    }

    /// Exact quotient `self / divisor`, or `None` when it leaves a remainder.
    ///
    /// Monomial content is split off both sides first so that the remaining
    /// division runs on ordinary polynomials.
    pub fn exact_div(&self, divisor: &Polynomial) -> Option<Polynomial> {
        if divisor.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Polynomial::zero());
        }

        let content = divisor.monomial_content().inverse();
        let divisor = divisor.mul_monomial(&content);
        let dividend = self.mul_monomial(&content);

        if let Some(c) = divisor.constant_value() {
            return Some(dividend.scale(&c.recip()));
        }

        let shift = dividend.monomial_content();
        let mut remainder = dividend.mul_monomial(&shift.inverse());
        let (lead_m, lead_c) = divisor.leading_term()?;
        let lead_inv = lead_m.inverse();

        let mut quotient = Polynomial::zero();
        while !remainder.is_zero() {
            let (rm, rc) = remainder.leading_term()?;
            if !lead_m.divides(rm) {
                return None;
            }
            let qm = rm.mul(&lead_inv);
            let qc = rc / lead_c;
            remainder = &remainder - &divisor.mul_monomial(&qm).scale(&qc);
            quotient.add_term(qm, qc);
        }
        Some(quotient.mul_monomial(&shift))
    }
}

impl<'a, 'b> Add<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &'b Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (m, c) in &rhs.terms {
            result.add_term(m.clone(), c.clone());
        }
        result
    }
}

impl<'a, 'b> Sub<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'b Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (m, c) in &rhs.terms {
            result.add_term(m.clone(), -c);
        }
        result
    }
}

impl<'a, 'b> Mul<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'b Polynomial) -> Polynomial {
        let mut result = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                result.add_term(ma.mul(mb), ca * cb);
            }
        }
        result
    }
}

impl<'a> Neg for &'a Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn sym(name: &str) -> Polynomial {
        Polynomial::atom(Atom::symbol(name))
    }

    fn int(n: i64) -> Polynomial {
        Polynomial::constant(BigRational::from_integer(BigInt::from(n)))
    }

    #[test]
    fn test_cancelling_terms_are_removed() {
        let a = &sym("x") + &sym("L");
        let b = &a - &sym("x");
        assert_eq!(b, sym("L"));
        assert!((&a - &a).is_zero());
    }

    #[test]
    fn test_monomial_content_with_negative_exponents() {
        let e_inv = Polynomial::term(Monomial::power(Atom::symbol("E"), -1), BigRational::one());
        let p = &(&sym("x") * &e_inv) + &(&sym("L") * &e_inv);
        let content = p.monomial_content();
        assert_eq!(content.exponent(&Atom::symbol("E")), -1);
        assert_eq!(content.exponent(&Atom::symbol("x")), 0);
    }

    #[test]
    fn test_exact_division() {
        // (x + 1)(x - L) / (x - L) = x + 1
        let a = &sym("x") + &int(1);
        let b = &sym("x") - &sym("L");
        let product = &a * &b;
        assert_eq!(product.exact_div(&b), Some(a.clone()));
        assert_eq!(product.exact_div(&a), Some(b.clone()));

        // x^2 + 1 is not divisible by x + 1
        let c = &sym("x").pow(2) + &int(1);
        assert_eq!(c.exact_div(&a), None);
    }

    #[test]
    fn test_exact_division_by_monomial_multiple() {
        // 6 E I x / (2 E) = 3 I x
        let num = &(&(&int(6) * &sym("E")) * &sym("I")) * &sym("x");
        let den = &int(2) * &sym("E");
        let expected = &(&int(3) * &sym("I")) * &sym("x");
        assert_eq!(num.exact_div(&den), Some(expected));
    }

    #[test]
    fn test_lex_order_is_multiplicative() {
        let x = Monomial::power(Atom::symbol("x"), 1);
        let l = Monomial::power(Atom::symbol("L"), 1);
        assert_eq!(l.lex_cmp(&x), Ordering::Greater);
        assert_eq!(l.mul(&x).lex_cmp(&x.mul(&x)), Ordering::Greater);
        assert_eq!(Monomial::one().lex_cmp(&x), Ordering::Less);
    }
}
