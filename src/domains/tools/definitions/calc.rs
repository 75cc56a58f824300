//! Calculator capability.
//!
//! Evaluates arithmetic expressions with a small recursive-descent parser.
//! Supports `+ - * / %`, `^` or `**` for powers (right associative),
//! unary signs, parentheses, the constants `pi` and `e`, and a fixed set of
//! single-argument functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateParams {
    /// Expression to evaluate, e.g. `2 + 2 * 3`.
    pub expression: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateOutput {
    pub result: Value,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Arithmetic evaluation.
pub struct Calculator;

impl Calculator {
    pub const EVALUATE_DESCRIPTION: &'static str = "Evaluate an arithmetic expression. Supports + - * / % ^, \
         parentheses, pi, e, and sqrt, abs, sin, cos, tan, ln, log10, exp, floor, ceil, round.";

    #[instrument(skip_all, fields(expression = %params.expression))]
    async fn evaluate(_ctx: ToolContext, params: EvaluateParams) -> Result<EvaluateOutput, ToolError> {
        let value = evaluate(&params.expression).map_err(ToolError::invalid_request)?;
        info!("Evaluated expression to {}", value);
        Ok(EvaluateOutput {
            result: number_value(value),
        })
    }
}

impl Capability for Calculator {
    const NAMESPACE: Option<&'static str> = Some("calc");
    const DESCRIPTION: &'static str = "Arithmetic evaluation";

    fn operations() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new("evaluate", Self::EVALUATE_DESCRIPTION, Self::evaluate)
                .param(
                    ParamSpec::new("expression", TypeSpec::String)
                        .describe("Arithmetic expression, e.g. `(1 + 2) * sqrt(16)`"),
                )
                .returns(TypeSpec::object([ParamSpec::new("result", TypeSpec::Number)])),
        ]
    }
}

/// Integral results are reported as JSON integers.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

// ============================================================================
// Evaluator
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else if (d == 'e' || d == 'E') && !literal.contains(['e', 'E']) {
                        // Exponent only when followed by a digit or sign
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        match lookahead.peek() {
                            Some(n) if n.is_ascii_digit() || *n == '+' || *n == '-' => {
                                literal.push(d);
                                chars.next();
                                if let Some(&sign) = chars.peek().filter(|s| **s == '+' || **s == '-') {
                                    literal.push(sign);
                                    chars.next();
                                }
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

/// Longest accepted expression, in bytes.
const MAX_EXPRESSION_LEN: usize = 4096;

/// Deepest accepted nesting of signs, powers, parentheses and calls.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of input", expected)),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                Some(Token::Percent) => {
                    self.next();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("modulo by zero".to_string());
                    }
                    value = value.rem_euclid(divisor);
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.next();
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('^' unary)?
    fn power(&mut self) -> Result<f64, String> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.next();
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary := number | constant | ident '(' expr ')' | '(' expr ')'
    fn primary(&mut self) -> Result<f64, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => {
                    self.expect(Token::LParen)?;
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    apply_function(&name, arg)
                }
            },
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

fn apply_function(name: &str, arg: f64) -> Result<f64, String> {
    let value = match name {
        "sqrt" if arg < 0.0 => return Err("sqrt of a negative number".to_string()),
        "sqrt" => arg.sqrt(),
        "abs" => arg.abs(),
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "tan" => arg.tan(),
        "ln" | "log" if arg <= 0.0 => return Err(format!("{} of a non-positive number", name)),
        "ln" | "log" => arg.ln(),
        "log10" if arg <= 0.0 => return Err("log10 of a non-positive number".to_string()),
        "log10" => arg.log10(),
        "exp" => arg.exp(),
        "floor" => arg.floor(),
        "ceil" => arg.ceil(),
        "round" => arg.round(),
        _ => return Err(format!("unknown function '{}'", name)),
    };
    Ok(value)
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(format!(
            "expression longer than {} characters",
            MAX_EXPRESSION_LEN
        ));
    }
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err("expression is empty".to_string());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(format!("unexpected token {:?}", token));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 2 * 3").unwrap(), 8.0);
        assert_eq!(evaluate("(2 + 2) * 3").unwrap(), 12.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(evaluate("2 ** 10").unwrap(), 1024.0);
        assert_eq!(evaluate("7 % 3").unwrap(), 1.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(evaluate("sqrt(16) + abs(-2)").unwrap(), 6.0);
        assert!((evaluate("sin(pi / 2)").unwrap() - 1.0).abs() < 1e-12);
        assert!((evaluate("ln(e)").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(evaluate("round(2.5) + floor(1.9)").unwrap(), 4.0);
        assert_eq!(evaluate("1.5e2").unwrap(), 150.0);
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1 / 0").unwrap_err(), "division by zero");
        assert!(evaluate("").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("nope(3)").is_err());
        assert!(evaluate("2 & 3").is_err());
        assert!(evaluate("sqrt(-1)").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let signs = format!("{}1", "-".repeat(100_000));
        assert!(evaluate(&signs).is_err());

        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(evaluate(&parens).is_err());

        let nested = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(evaluate(&nested).unwrap_err(), "expression nested too deeply");

        let powers = vec!["1"; 1000].join("^");
        assert_eq!(evaluate(&powers).unwrap_err(), "expression nested too deeply");

        assert_eq!(evaluate(&format!("{}1{}", "(".repeat(100), ")".repeat(100))).unwrap(), 1.0);
        assert_eq!(evaluate("--1").unwrap(), 1.0);
    }

    #[test]
    fn test_integral_results_are_integers() {
        assert_eq!(number_value(8.0), json!(8));
        assert_eq!(number_value(0.5), json!(0.5));
    }
}
