//! Arithmetic expression parser and evaluator for the `calculate` tool.
//!
//! A small recursive-descent evaluator over a fixed grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := ('-' | '+') factor | power
//! power   := primary ('^' factor)?          (right-associative)
//! primary := number | name | name '(' args ')' | '(' expr ')'
//! args    := expr (',' expr)*
//! ```
//!
//! Only a closed allow-list of names is accepted: the functions `abs`,
//! `round`, `min`, `max`, `pow`, `sum` and the constants `pi` and `e`.
//! Everything else is rejected, which keeps the accepted language auditable
//! — there is no general-purpose evaluator behind this.

use thiserror::Error;

/// Value of the `pi` constant exposed to expressions.
const PI: f64 = 3.14159;

/// Value of the `e` constant exposed to expressions.
const E: f64 = 2.71828;

/// Errors produced while evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// The expression does not match the grammar.
    #[error("syntax error at position {pos}: {message}")]
    Syntax {
        /// Byte offset into the expression.
        pos: usize,
        /// What went wrong.
        message: String,
    },

    /// Division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// A name outside the allow-list was used.
    #[error("unknown name '{0}'")]
    UnknownName(String),

    /// A known function was called with the wrong number of arguments.
    #[error("{name}() expects {expected} argument(s), got {got}")]
    WrongArity {
        /// The function name.
        name: String,
        /// Human-readable expected count ("1", "2", "at least 1").
        expected: String,
        /// The number of arguments supplied.
        got: usize,
    },
}

/// Evaluates an arithmetic expression.
///
/// # Errors
///
/// Returns a [`CalcError`] for syntax errors, division by zero, names
/// outside the allow-list, and wrong argument counts.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.peek() {
        (Token::Eof, _) => Ok(value),
        (tok, pos) => Err(CalcError::Syntax {
            pos,
            message: format!("unexpected {}", tok.describe()),
        }),
    }
}

/// Formats an evaluated value the way the `calculate` tool reports it.
///
/// Integral results print without a fractional part (`17`, not `17.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)] // range-checked before the cast
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Name(name) => format!("name '{name}'"),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::Caret => "'^'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Eof => "end of expression".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, CalcError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '^' => {
                tokens.push((Token::Caret, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut seen_dot = false;
                let mut seen_digit = false;
                while i < bytes.len() {
                    match bytes[i] as char {
                        '0'..='9' => {
                            seen_digit = true;
                            i += 1;
                        }
                        '.' if !seen_dot => {
                            seen_dot = true;
                            i += 1;
                        }
                        _ => break,
                    }
                }
                if !seen_digit {
                    return Err(CalcError::Syntax {
                        pos: start,
                        message: "malformed number".to_string(),
                    });
                }
                let text = &input[start..i];
                let value: f64 = text.parse().map_err(|_| CalcError::Syntax {
                    pos: start,
                    message: format!("malformed number '{text}'"),
                })?;
                tokens.push((Token::Number(value), start));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
                {
                    i += 1;
                }
                tokens.push((Token::Name(input[start..i].to_string()), start));
            }
            _ => {
                return Err(CalcError::Syntax {
                    pos: i,
                    message: format!("unexpected character '{c}'"),
                })
            }
        }
    }

    tokens.push((Token::Eof, input.len()));
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> (Token, usize) {
        self.tokens[self.pos].clone()
    }

    fn advance(&mut self) -> (Token, usize) {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), CalcError> {
        let (tok, pos) = self.advance();
        if &tok == expected {
            Ok(())
        } else {
            Err(CalcError::Syntax {
                pos,
                message: format!("expected {what}, found {}", tok.describe()),
            })
        }
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            match self.peek().0 {
                Token::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        loop {
            match self.peek().0 {
                Token::Star => {
                    self.advance();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.peek().0 {
            Token::Minus => {
                self.advance();
                Ok(-self.factor()?)
            }
            Token::Plus => {
                self.advance();
                self.factor()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek().0 == Token::Caret {
            self.advance();
            // Right-associative; the exponent may carry a unary sign.
            let exponent = self.factor()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        let (tok, pos) = self.advance();
        match tok {
            Token::Number(n) => Ok(n),
            Token::LParen => {
                let value = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(value)
            }
            Token::Name(name) => self.name(&name, pos),
            other => Err(CalcError::Syntax {
                pos,
                message: format!("expected a value, found {}", other.describe()),
            }),
        }
    }

    fn name(&mut self, name: &str, pos: usize) -> Result<f64, CalcError> {
        match name {
            "pi" => return Ok(PI),
            "e" => return Ok(E),
            _ => {}
        }

        if !matches!(name, "abs" | "round" | "min" | "max" | "pow" | "sum") {
            return Err(CalcError::UnknownName(name.to_string()));
        }

        if self.peek().0 != Token::LParen {
            return Err(CalcError::Syntax {
                pos,
                message: format!("expected '(' after '{name}'"),
            });
        }
        self.advance();

        let mut args = vec![self.expr()?];
        while self.peek().0 == Token::Comma {
            self.advance();
            args.push(self.expr()?);
        }
        self.expect(&Token::RParen, "')'")?;

        apply(name, &args)
    }
}

fn apply(name: &str, args: &[f64]) -> Result<f64, CalcError> {
    let arity = |expected: &str| CalcError::WrongArity {
        name: name.to_string(),
        expected: expected.to_string(),
        got: args.len(),
    };

    match name {
        "abs" => match args {
            [x] => Ok(x.abs()),
            _ => Err(arity("1")),
        },
        "round" => match args {
            [x] => Ok(x.round()),
            _ => Err(arity("1")),
        },
        "pow" => match args {
            [base, exp] => Ok(base.powf(*exp)),
            _ => Err(arity("2")),
        },
        "min" => args
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| arity("at least 1")),
        "max" => args
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| arity("at least 1")),
        "sum" => Ok(args.iter().sum()),
        _ => Err(CalcError::UnknownName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> f64 {
        evaluate(expr).unwrap()
    }

    #[test]
    fn precedence() {
        assert!((eval("10 + 5 * 2 - 3") - 17.0).abs() < f64::EPSILON);
        assert!((eval("(10 + 5) * 2") - 30.0).abs() < f64::EPSILON);
        assert!((eval("2 + 2") - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn power_right_associative() {
        // 2 ^ 3 ^ 2 = 2 ^ 9 = 512
        assert!((eval("2 ^ 3 ^ 2") - 512.0).abs() < f64::EPSILON);
        assert!((eval("2 ^ 10") - 1024.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unary_minus() {
        assert!((eval("-3 + 5") - 2.0).abs() < f64::EPSILON);
        assert!((eval("2 * -4") - -8.0).abs() < f64::EPSILON);
        // Unary minus binds looser than power: -2^2 = -(2^2)
        assert!((eval("-2 ^ 2") - -4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn functions() {
        assert!((eval("abs(-5)") - 5.0).abs() < f64::EPSILON);
        assert!((eval("round(2.6)") - 3.0).abs() < f64::EPSILON);
        assert!((eval("min(3, 1, 2)") - 1.0).abs() < f64::EPSILON);
        assert!((eval("max(3, 1, 2)") - 3.0).abs() < f64::EPSILON);
        assert!((eval("pow(2, 8)") - 256.0).abs() < f64::EPSILON);
        assert!((eval("sum(1, 2, 3, 4)") - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn constants() {
        assert!((eval("pi") - 3.14159).abs() < f64::EPSILON);
        assert!((eval("e") - 2.71828).abs() < f64::EPSILON);
        assert!((eval("2 * pi") - 6.28318).abs() < 1e-9);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1/0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("5 / (2 - 2)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            evaluate("import_os"),
            Err(CalcError::UnknownName("import_os".to_string()))
        );
        assert_eq!(
            evaluate("sqrt(2)"),
            Err(CalcError::UnknownName("sqrt".to_string()))
        );
    }

    #[test]
    fn wrong_arity() {
        assert!(matches!(
            evaluate("abs(1, 2)"),
            Err(CalcError::WrongArity { .. })
        ));
        assert!(matches!(
            evaluate("pow(2)"),
            Err(CalcError::WrongArity { .. })
        ));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(evaluate("1 +"), Err(CalcError::Syntax { .. })));
        assert!(matches!(evaluate("(1 + 2"), Err(CalcError::Syntax { .. })));
        assert!(matches!(evaluate("1 $ 2"), Err(CalcError::Syntax { .. })));
        assert!(matches!(evaluate("1 2"), Err(CalcError::Syntax { .. })));
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(17.0), "17");
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(-8.0), "-8");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(6.28318), "6.28318");
    }
}
