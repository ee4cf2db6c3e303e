//! Expression nodes
//!
//! The closed set of expression variants produced by the parser. Every variant
//! carries its source span; consumers dispatch with exhaustive matches so that
//! adding a variant forces every consumer to be updated.

use serde::{Deserialize, Serialize};

use crate::ast::span::Span;

/// An identifier with its source span
///
/// Identifier names are either plain (`[a-zA-Z][a-zA-Z0-9_]*`) or numeric
/// token references (`$` followed by digits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }

    /// An identifier without a source position, for synthesized trees
    pub fn synthetic(name: impl Into<String>) -> Self {
        Ident::new(name, Span::SYNTHETIC)
    }
}

/// Arithmetic binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Comparison operators, including `=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparatorOp {
    Eq,
    Lt,
    Le,
    Ge,
    Gt,
}

/// The direction a strict or non-strict inequality points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Less,
    Greater,
}

impl ComparatorOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparatorOp::Eq => "=",
            ComparatorOp::Lt => "<",
            ComparatorOp::Le => "<=",
            ComparatorOp::Ge => ">=",
            ComparatorOp::Gt => ">",
        }
    }

    /// `None` for `=`, which has no direction and can never chain
    pub fn direction(&self) -> Option<Direction> {
        match self {
            ComparatorOp::Eq => None,
            ComparatorOp::Lt | ComparatorOp::Le => Some(Direction::Less),
            ComparatorOp::Ge | ComparatorOp::Gt => Some(Direction::Greater),
        }
    }
}

/// The three repeated operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatedOp {
    Sum,
    Product,
    Integral,
}

impl RepeatedOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            RepeatedOp::Sum => "sum",
            RepeatedOp::Product => "product",
            RepeatedOp::Integral => "integral",
        }
    }
}

/// A `variable = value` binding inside a list comprehension or `with` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub variable: Ident,
    pub value: Expr,
    pub span: Span,
}

/// One branch of a piecewise expression
///
/// A branch without a value (`{x > 1}`) implicitly evaluates to 1 where the
/// condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseBranch {
    pub condition: Expr,
    pub value: Option<Expr>,
    pub span: Span,
}

/// The closed set of expression node shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    Identifier(Ident),
    Str {
        value: String,
        span: Span,
    },
    List {
        elements: Vec<Expr>,
        span: Span,
    },
    /// `[a, b ... c, d]`: element lists on either side of the ellipsis
    Range {
        start: Vec<Expr>,
        end: Vec<Expr>,
        span: Span,
    },
    ListComprehension {
        body: Box<Expr>,
        assignments: Vec<AssignmentEntry>,
        span: Span,
    },
    /// `body with a = 1, b = 2`
    Substitution {
        body: Box<Expr>,
        assignments: Vec<AssignmentEntry>,
        span: Span,
    },
    Piecewise {
        branches: Vec<PiecewiseBranch>,
        otherwise: Option<Box<Expr>>,
        span: Span,
    },
    /// Unary minus
    Negative {
        arg: Box<Expr>,
        span: Span,
    },
    /// Postfix `!`
    Factorial {
        arg: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Comparator {
        op: ComparatorOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// `a < b < c`; both operators are guaranteed to point the same direction
    DoubleInequality {
        left: Box<Expr>,
        left_op: ComparatorOp,
        middle: Box<Expr>,
        right_op: ComparatorOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Top-level `~` denotes a regression when it appears as a statement body
    Regression {
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: Ident,
        span: Span,
    },
    ListAccess {
        list: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    /// `f''(x)`: a call through one or more primes, recording derivative order
    Prime {
        callee: Ident,
        order: usize,
        args: Vec<Expr>,
        span: Span,
    },
    /// `(d/d x) body`
    Derivative {
        variable: Ident,
        body: Box<Expr>,
        span: Span,
    },
    /// `a -> a + 1`
    UpdateRule {
        variable: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    /// Comma, right-associative; `parenthesized` distinguishes the point
    /// literal `(1, 2)` from a bare action sequence `a -> 1, b -> 2`
    Sequence {
        left: Box<Expr>,
        right: Box<Expr>,
        parenthesized: bool,
        span: Span,
    },
    /// `|x|`
    Norm {
        arg: Box<Expr>,
        span: Span,
    },
    /// `sum n = (1 ... 5) of n ^ 2` and the product/integral forms
    Repeated {
        op: RepeatedOp,
        variable: Ident,
        start: Box<Expr>,
        end: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Str { span, .. }
            | Expr::List { span, .. }
            | Expr::Range { span, .. }
            | Expr::ListComprehension { span, .. }
            | Expr::Substitution { span, .. }
            | Expr::Piecewise { span, .. }
            | Expr::Negative { span, .. }
            | Expr::Factorial { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Comparator { span, .. }
            | Expr::DoubleInequality { span, .. }
            | Expr::Regression { span, .. }
            | Expr::Member { span, .. }
            | Expr::ListAccess { span, .. }
            | Expr::Call { span, .. }
            | Expr::Prime { span, .. }
            | Expr::Derivative { span, .. }
            | Expr::UpdateRule { span, .. }
            | Expr::Sequence { span, .. }
            | Expr::Norm { span, .. }
            | Expr::Repeated { span, .. } => *span,
            Expr::Identifier(ident) => ident.span,
        }
    }

    /// A number literal without a source position
    pub fn number(value: f64) -> Expr {
        Expr::Number {
            value,
            span: Span::SYNTHETIC,
        }
    }

    /// A string literal without a source position
    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Str {
            value: value.into(),
            span: Span::SYNTHETIC,
        }
    }

    /// An identifier expression without a source position
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier(Ident::synthetic(name))
    }
}
