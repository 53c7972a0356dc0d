use anyhow::{bail, Result};

/// Significant digits kept when showing a result.
const DISPLAY_PRECISION: usize = 12;

/// Deepest run of nested parentheses and unary signs accepted.
const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match literal.parse::<f64>() {
                    Ok(value) => tokens.push(Token::Number(value)),
                    Err(_) => bail!("Invalid number '{}' at position {}", literal, pos),
                }
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' | '−' => Token::Minus,
                    '*' | '×' => Token::Star,
                    '/' | '÷' => Token::Slash,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => bail!("Unexpected character '{}' at position {}", other, pos),
                };
                tokens.push(token);
                chars.next();
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent evaluator over `expr := term (('+'|'-') term)*`,
/// `term := factor (('*'|'/') factor)*`,
/// `factor := ('+'|'-') factor | number | '(' expr ')'`.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.next();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.next();
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    bail!("Division by zero");
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        if self.depth >= MAX_NESTING {
            bail!("Expression nested too deeply (max {})", MAX_NESTING);
        }
        self.depth += 1;
        let value = self.unary_or_atom();
        self.depth -= 1;
        value
    }

    fn unary_or_atom(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => bail!("Missing closing parenthesis"),
                }
            }
            Some(token) => bail!("Unexpected {:?}", token),
            None => bail!("Unexpected end of expression"),
        }
    }
}

/// Evaluate an arithmetic expression of numbers, `+ - * /` and parentheses.
pub fn evaluate(input: &str) -> Result<f64> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        bail!("Empty expression");
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        bail!("Unexpected {:?} after end of expression", token);
    }
    if !value.is_finite() {
        bail!("Result is not a finite number");
    }
    Ok(value)
}

/// Round to 12 significant digits and print the shortest decimal form,
/// so `0.7 * 0.8` shows as `0.56`.
pub fn format_number(value: f64) -> String {
    let rounded: f64 = format!("{:.*e}", DISPLAY_PRECISION - 1, value)
        .parse()
        .unwrap_or(value);
    // avoid "-0"
    (rounded + 0.0).to_string()
}
