//! Query AST

use std::fmt;

/// Set operator of a binary expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// `+`
    Union,
    /// `-`
    Difference,
    /// `^`
    Intersection,
}

impl SetOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(SetOp::Union),
            '-' => Some(SetOp::Difference),
            '^' => Some(SetOp::Intersection),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            SetOp::Union => '+',
            SetOp::Difference => '-',
            SetOp::Intersection => '^',
        }
    }
}

/// A parsed query expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Bare file pattern such as `//...` or `*.star`
    Pattern(String),
    /// Double-quoted string, already unescaped
    Str(String),
    /// `name(arg, ...)`
    Call { function: String, args: Vec<Expr> },
    /// `left OP right`
    Binary {
        op: SetOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn pattern(p: impl Into<String>) -> Self {
        Expr::Pattern(p.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Str(s.into())
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function: function.into(),
            args,
        }
    }

    pub fn binary(op: SetOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Short name of the node kind, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Pattern(_) => "pattern",
            Expr::Str(_) => "string",
            Expr::Call { .. } => "function call",
            Expr::Binary { .. } => "set expression",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Pattern(p) => f.write_str(p),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}
