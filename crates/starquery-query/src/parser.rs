//! Recursive-descent parser for the query language
//!
//! ```text
//! expr    := primary (('+' | '-' | '^') primary)*
//! primary := string | '(' expr ')' | token ['(' [expr (',' expr)*] ')']
//! token   := [A-Za-z0-9_/:.*@-]+
//! string  := '"' (escape | any)* '"'
//! ```
//!
//! All operators share one precedence level and associate to the left.
//! A token directly followed by `(` is a call, otherwise a file pattern.

use crate::ast::{Expr, SetOp};
use crate::error::{SyntaxError, SyntaxErrorKind};

/// Parse a complete query string
pub fn parse(query: &str) -> Result<Expr, SyntaxError> {
    let mut parser = Parser { input: query, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(expr),
        Some(')') => Err(parser.error(SyntaxErrorKind::UnmatchedCloseParen)),
        Some(c) => Err(parser.error(SyntaxErrorKind::UnexpectedChar(c))),
    }
}

struct Parser<'a> {
    input: &'a str,
    /// Byte offset into `input`
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.pos, kind)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump(c);
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            let Some(op) = self.peek().and_then(SetOp::from_char) else {
                return Ok(left);
            };
            self.bump(op.symbol());
            let right = self.parse_primary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error(SyntaxErrorKind::UnexpectedEof)),
            Some('"') => self.parse_string(),
            Some('(') => {
                self.bump('(');
                let expr = self.parse_expr()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.error(SyntaxErrorKind::ExpectedCloseParen));
                }
                self.bump(')');
                Ok(expr)
            }
            Some(_) => self.parse_token(),
        }
    }

    fn parse_token(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_token_char(c) {
                break;
            }
            self.bump(c);
        }
        if self.pos == start {
            return Err(self.error(SyntaxErrorKind::ExpectedIdentifier));
        }
        let token = &self.input[start..self.pos];

        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.bump('(');
            let args = self.parse_args()?;
            return Ok(Expr::call(token, args));
        }
        Ok(Expr::pattern(token))
    }

    /// Arguments after the opening `(`, including the closing `)`
    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump(')');
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(SyntaxErrorKind::ExpectedCloseParen)),
                Some(')') => {
                    self.bump(')');
                    return Ok(args);
                }
                Some(',') => self.bump(','),
                Some(_) => return Err(self.error(SyntaxErrorKind::ExpectedCommaOrParen)),
            }
        }
    }

    fn parse_string(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.pos;
        self.bump('"');

        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.bump(c);
            match c {
                '"' => return Ok(Expr::Str(value)),
                '\\' => {
                    let Some(next) = self.peek() else {
                        break;
                    };
                    self.bump(next);
                    value.push(match next {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                _ => value.push(c),
            }
        }
        Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedString))
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | ':' | '.' | '*' | '@' | '-')
}
