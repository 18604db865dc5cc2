//! Recursive-descent parser for expression text.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('**' | '^') unary)?
//! primary := number | name | name '(' sum ')' | '(' sum ')'
//! ```
//!
//! Exponents must reduce to integer constants. Multiplication is never
//! implicit: `2L` is an error, `2*L` is not.

use std::collections::HashMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Pow;
use once_cell::sync::Lazy;

use super::atom::Func;
use super::expression::Expression;
use super::{ExpressionError, ExpressionResult};

/// Largest power of ten a decimal literal may carry
const MAX_DECIMAL_SHIFT: u64 = 1000;

static FUNCTIONS: Lazy<HashMap<&'static str, Func>> = Lazy::new(|| {
    [Func::Sin, Func::Cos, Func::Exp]
        .into_iter()
        .map(|f| (f.name(), f))
        .collect()
});

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigRational),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    LParen,
    RParen,
}

/// Parse `input` into an [`Expression`].
pub fn parse(input: &str) -> ExpressionResult<Expression> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };
    let expression = parser.sum()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expression),
        Some((token, at)) => Err(ExpressionError::parse(
            input,
            *at,
            format!("unexpected {:?}", token),
        )),
    }
}

fn tokenize(input: &str) -> ExpressionResult<Vec<(Token, usize)>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '^' => Token::Power,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    i += 1;
                    Token::Power
                } else {
                    Token::Star
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, next) = read_number(input, &chars, i)?;
                tokens.push((Token::Number(value), start));
                i = next;
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push((Token::Name(chars[start..i].iter().collect()), start));
                continue;
            }
            other => {
                return Err(ExpressionError::parse(
                    input,
                    i,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push((token, start));
        i += 1;
    }
    Ok(tokens)
}

/// Decimal literal, optionally with an exponent, converted exactly.
fn read_number(input: &str, chars: &[char], start: usize) -> ExpressionResult<(BigRational, usize)> {
    let mut i = start;
    let mut digits = String::new();
    let mut fraction_digits: i64 = 0;
    let mut seen_point = false;

    while i < chars.len() {
        match chars[i] {
            d if d.is_ascii_digit() => {
                digits.push(d);
                if seen_point {
                    fraction_digits += 1;
                }
            }
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        i += 1;
    }
    if digits.is_empty() {
        return Err(ExpressionError::parse(input, start, "malformed number"));
    }

    let mut exponent: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let negative = match chars.get(j) {
            Some('-') => {
                j += 1;
                true
            }
            Some('+') => {
                j += 1;
                false
            }
            _ => false,
        };
        let exp_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            let text: String = chars[exp_start..j].iter().collect();
            let value: i64 = text
                .parse()
                .map_err(|_| ExpressionError::parse(input, exp_start, "exponent out of range"))?;
            exponent = if negative { -value } else { value };
            i = j;
        }
    }

    let mantissa: BigInt = digits
        .parse()
        .map_err(|_| ExpressionError::parse(input, start, "malformed number"))?;
    let shift = exponent.saturating_sub(fraction_digits);
    if shift.unsigned_abs() > MAX_DECIMAL_SHIFT {
        return Err(ExpressionError::parse(input, start, "exponent out of range"));
    }
    let ten = BigInt::from(10);
    let power: BigInt = Pow::pow(&ten, shift.unsigned_abs());
    let value = if shift >= 0 {
        BigRational::from_integer(mantissa * power)
    } else {
        BigRational::new(mantissa, power)
    };
    Ok((value, i))
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, at)| *at)
            .unwrap_or(self.input.len())
    }

    fn error(&self, reason: impl Into<String>) -> ExpressionError {
        ExpressionError::parse(self.input, self.position(), reason)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn sum(&mut self) -> ExpressionResult<Expression> {
        let mut value = self.product()?;
        loop {
            if self.eat(&Token::Plus) {
                value = value + self.product()?;
            } else if self.eat(&Token::Minus) {
                value = value - self.product()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn product(&mut self) -> ExpressionResult<Expression> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value = (value * self.unary()?).bounded()?;
            } else if self.eat(&Token::Slash) {
                let divisor = self.unary()?;
                value = value.checked_div(&divisor)?.bounded()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> ExpressionResult<Expression> {
        if self.eat(&Token::Minus) {
            return Ok(-self.unary()?);
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> ExpressionResult<Expression> {
        let base = self.primary()?;
        if !self.eat(&Token::Power) {
            return Ok(base);
        }
        let at = self.position();
        let exponent = self.unary()?;
        let k = exponent
            .as_integer()
            .and_then(|k| i32::try_from(k).ok())
            .ok_or_else(|| ExpressionError::parse(self.input, at, "exponent must be an integer constant"))?;
        base.pow(k)
    }

    fn primary(&mut self) -> ExpressionResult<Expression> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| self.error("unexpected end of input"))?;
        match token {
            Token::Number(value) => {
                self.pos += 1;
                Ok(Expression::rational(value))
            }
            Token::Name(name) => {
                self.pos += 1;
                if let Some(func) = FUNCTIONS.get(name.as_str()) {
                    if !self.eat(&Token::LParen) {
                        return Err(self.error(format!("expected '(' after {}", name)));
                    }
                    let argument = self.sum()?;
                    if !self.eat(&Token::RParen) {
                        return Err(self.error("expected ')'"));
                    }
                    return Expression::function(*func, &argument);
                }
                if self.peek() == Some(&Token::LParen) {
                    return Err(self.error(format!("unknown function '{}'", name)));
                }
                Ok(Expression::symbol(&name))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.sum()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            other => Err(self.error(format!("unexpected {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expression {
        Expression::integer(n)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse("1 + 2*3").unwrap(), int(7));
        assert_eq!(parse("(1 + 2)*3").unwrap(), int(9));
        assert_eq!(parse("2**3**2").unwrap(), int(512));
        assert_eq!(parse("-2^2").unwrap(), int(-4));
        assert_eq!(parse("2^-1").unwrap(), parse("1/2").unwrap());
        assert_eq!(parse("8/4/2").unwrap(), int(1));
    }

    #[test]
    fn test_decimal_numbers_are_exact() {
        assert_eq!(parse("0.5").unwrap(), parse("1/2").unwrap());
        assert_eq!(parse("1e-6").unwrap(), parse("1/1000000").unwrap());
        assert_eq!(parse("2.5E2").unwrap(), int(250));
        assert_eq!(parse(".25").unwrap(), parse("1/4").unwrap());
        assert_eq!(parse("345.31375").unwrap(), parse("34531375/100000").unwrap());
    }

    #[test]
    fn test_symbols_and_functions() {
        let e = parse("q_0*sin(pi*x/L)").unwrap();
        assert!(e.free_symbols().contains("q_0"));
        assert!(e.depends_on_x());
    }

    #[test]
    fn test_errors_report_position() {
        match parse("2*L)").unwrap_err() {
            ExpressionError::Parse { position, .. } => assert_eq!(position, 3),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse("").is_err());
        assert!(parse("2L").is_err());
        assert!(parse("tan(x)").is_err());
        assert!(parse("x**L").is_err());
        assert!(parse("x**0.5").is_err());
        assert!(parse("1/0").is_err());
        assert!(parse("L $").is_err());
    }

    #[test]
    fn test_oversized_powers_are_rejected() {
        let unsupported = |text: &str| {
            matches!(parse(text), Err(ExpressionError::Unsupported { .. }))
        };
        assert!(unsupported("(x**65536)**65536"));
        assert!(unsupported("x**2000000000"));
        assert!(unsupported("(x**512)**4"));
        assert!(unsupported("x**1000*x**1000"));
        assert!(unsupported("(2**1024)**1024"));
        assert!(matches!(
            parse("1e999999999"),
            Err(ExpressionError::Parse { .. })
        ));

        // The limit itself is fine, integrating past it is not
        let top = parse("x**1024").unwrap();
        assert_eq!(top.max_exponent(), 1024);
        assert!(top.integrate().is_err());
        assert_eq!(parse("(x**32)**32").unwrap(), top);
        assert_eq!(parse("1e300/1e299").unwrap(), int(10));
    }
}
