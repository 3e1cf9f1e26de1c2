//! Built-in tools offered to the model by the demo binary

use std::f64::consts::{E, PI};

use chrono::Utc;
use vero_core::{Result, Tool};

pub fn builtin_tools() -> Result<Vec<Tool>> {
    Ok(vec![calculator()?, datetime()?])
}

/// `calculate(expression: string)`
pub fn calculator() -> Result<Tool> {
    Tool::builder("calculate")
        .description(
            "Evaluate a mathematical expression. Supports + - * / % ^ (or **), parentheses, \
             sqrt, sin, cos, tan, exp, ln, log10, abs, floor, ceil, round, pi and e.",
        )
        .required::<String>("expression")
        .param_description("expression", "Expression to evaluate, e.g. '2 + 2' or 'sqrt(16) * 3'")
        .sync_function(|args| {
            let expression: String = args.get("expression")?;
            let value = evaluate_expression(&expression).map_err(anyhow::Error::msg)?;
            Ok(format!("{expression} = {value}"))
        })
        .build()
}

/// `datetime(format: string = "human")`
pub fn datetime() -> Result<Tool> {
    Tool::builder("datetime")
        .description("Get the current UTC date and time")
        .optional("format", "human")
        .param_description("format", "Output format: 'iso', 'human', or 'unix'")
        .sync_function(|args| {
            let format: String = args.get("format")?;
            let now = Utc::now();
            match format.as_str() {
                "iso" => Ok(now.to_rfc3339()),
                "unix" => Ok(now.timestamp().to_string()),
                "human" => Ok(now.format("%A, %B %d, %Y at %H:%M:%S UTC").to_string()),
                other => anyhow::bail!("unknown format '{other}'; use iso, human or unix"),
            }
        })
        .build()
}

/// Evaluate an arithmetic expression
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/' | '%') unary)*
/// unary   := ('-' | '+') unary | power
/// power   := primary (('^' | '**') unary)?
/// primary := number | constant | function '(' expr ')' | '(' expr ')'
/// ```
pub fn evaluate_expression(expr: &str) -> std::result::Result<f64, String> {
    let mut parser = Parser { src: expr, pos: 0 };
    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(format!("Unexpected '{}' at position {}", char::from(c), parser.pos));
    }
    if !value.is_finite() {
        return Err("Result is not a finite number".into());
    }
    Ok(value)
}

type Eval = std::result::Result<f64, String>;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&mut self) -> Option<u8> {
        let src = self.src;
        let bytes = src.as_bytes();
        while bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        bytes.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_pow(&mut self) -> bool {
        if self.eat(b'^') {
            return true;
        }
        let src = self.src;
        if src.as_bytes()[self.pos..].starts_with(b"**") {
            self.pos += 2;
            return true;
        }
        false
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while src.as_bytes().get(self.pos).is_some_and(|c| pred(*c)) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn expr(&mut self) -> Eval {
        let mut value = self.term()?;
        loop {
            if self.eat(b'+') {
                value += self.term()?;
            } else if self.eat(b'-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Eval {
        let mut value = self.unary()?;
        loop {
            if self.eat(b'*') {
                value *= self.unary()?;
            } else if self.eat(b'/') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err("Division by zero".into());
                }
                value /= divisor;
            } else if self.eat(b'%') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err("Modulo by zero".into());
                }
                value %= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Eval {
        if self.eat(b'-') {
            return Ok(-self.unary()?);
        }
        if self.eat(b'+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Eval {
        let base = self.primary()?;
        if self.eat_pow() {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Eval {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.close_paren()?;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => {
                let text = self.take_while(|c| c.is_ascii_digit() || c == b'.');
                text.parse().map_err(|e| format!("Parse error: {e}"))
            }
            Some(c) if c.is_ascii_alphabetic() => self.named(),
            Some(c) => Err(format!("Unexpected '{}' at position {}", char::from(c), self.pos)),
            None => Err("Unexpected end of expression".into()),
        }
    }

    fn named(&mut self) -> Eval {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_').to_string();
        match name.as_str() {
            "pi" => return Ok(PI),
            "e" => return Ok(E),
            _ => {}
        }
        if !self.eat(b'(') {
            return Err(format!("Unknown name '{name}'"));
        }
        let arg = self.expr()?;
        self.close_paren()?;

        match name.as_str() {
            "sqrt" if arg < 0.0 => Err("Square root of a negative number".into()),
            "sqrt" => Ok(arg.sqrt()),
            "sin" => Ok(arg.sin()),
            "cos" => Ok(arg.cos()),
            "tan" => Ok(arg.tan()),
            "exp" => Ok(arg.exp()),
            "ln" | "log" if arg <= 0.0 => Err("Logarithm of a non-positive number".into()),
            "ln" | "log" => Ok(arg.ln()),
            "log10" if arg <= 0.0 => Err("Logarithm of a non-positive number".into()),
            "log10" => Ok(arg.log10()),
            "abs" => Ok(arg.abs()),
            "floor" => Ok(arg.floor()),
            "ceil" => Ok(arg.ceil()),
            "round" => Ok(arg.round()),
            _ => Err(format!("Unknown function '{name}'")),
        }
    }

    fn close_paren(&mut self) -> std::result::Result<(), String> {
        if self.eat(b')') {
            Ok(())
        } else {
            Err("Missing closing parenthesis".into())
        }
    }
}
