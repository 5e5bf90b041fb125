//! Query errors

use std::fmt;
use thiserror::Error;

/// What went wrong while parsing a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedEof,
    UnexpectedChar(char),
    /// A `(` was never closed
    ExpectedCloseParen,
    /// Inside an argument list, neither `,` nor `)` followed an argument
    ExpectedCommaOrParen,
    /// A `)` with no matching `(`
    UnmatchedCloseParen,
    ExpectedIdentifier,
    UnterminatedString,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            SyntaxErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            SyntaxErrorKind::ExpectedCloseParen => f.write_str("expected ')'"),
            SyntaxErrorKind::ExpectedCommaOrParen => f.write_str("expected ')' or ','"),
            SyntaxErrorKind::UnmatchedCloseParen => f.write_str("unmatched ')'"),
            SyntaxErrorKind::ExpectedIdentifier => f.write_str("expected identifier or pattern"),
            SyntaxErrorKind::UnterminatedString => f.write_str("unterminated string literal"),
        }
    }
}

/// Query parse failure with the byte offset it was detected at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct SyntaxError {
    pub position: usize,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(position: usize, kind: SyntaxErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Query parse or evaluation error
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("parse error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}() requires exactly {expected} {}, got {got}", arguments(.expected))]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("{function}(): {message}")]
    ArgumentType { function: String, message: String },

    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Index(#[from] starquery_core::Error),
}

pub type Result<T> = std::result::Result<T, QueryError>;

fn arguments(n: &usize) -> &'static str {
    if *n == 1 {
        "argument"
    } else {
        "arguments"
    }
}
