//! Canonical expression tree
//!
//! Mirrors the host calculator's parsed-expression shape: piecewise is a
//! nested condition/consequent/alternate chain rather than a branch list,
//! point literals and action sequences are distinct nodes, and `.x`/`.y`
//! are a dedicated ordered-pair accessor. All spans are gone; this is the
//! interchange form for expression content in the semantic state.

use serde::{Deserialize, Serialize};

use crate::ast::{BinaryOp, ComparatorOp, RepeatedOp};

/// The two components of an ordered pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coordinate {
    X,
    Y,
}

impl Coordinate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Coordinate::X => "x",
            Coordinate::Y => "y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonExpr {
    Number(f64),
    Identifier(String),
    List(Vec<CanonExpr>),
    Range {
        start: Vec<CanonExpr>,
        end: Vec<CanonExpr>,
    },
    ListComprehension {
        body: Box<CanonExpr>,
        assignments: Vec<(String, CanonExpr)>,
    },
    Substitution {
        body: Box<CanonExpr>,
        assignments: Vec<(String, CanonExpr)>,
    },
    /// Nested piecewise; a missing alternate means "undefined elsewhere"
    Piecewise {
        condition: Box<CanonExpr>,
        consequent: Box<CanonExpr>,
        alternate: Option<Box<CanonExpr>>,
    },
    Negative(Box<CanonExpr>),
    Factorial(Box<CanonExpr>),
    Binary {
        op: BinaryOp,
        left: Box<CanonExpr>,
        right: Box<CanonExpr>,
    },
    Comparator {
        op: ComparatorOp,
        left: Box<CanonExpr>,
        right: Box<CanonExpr>,
    },
    DoubleInequality {
        left: Box<CanonExpr>,
        left_op: ComparatorOp,
        middle: Box<CanonExpr>,
        right_op: ComparatorOp,
        right: Box<CanonExpr>,
    },
    /// `p.x` / `p.y`
    OrderedPairAccess {
        point: Box<CanonExpr>,
        coordinate: Coordinate,
    },
    /// `obj.name` for any other property
    DotAccess {
        object: Box<CanonExpr>,
        property: String,
    },
    /// `obj.name(args)`
    DotCall {
        object: Box<CanonExpr>,
        method: String,
        args: Vec<CanonExpr>,
    },
    ListAccess {
        list: Box<CanonExpr>,
        index: Box<CanonExpr>,
    },
    Call {
        callee: Box<CanonExpr>,
        args: Vec<CanonExpr>,
    },
    Prime {
        callee: String,
        order: usize,
        args: Vec<CanonExpr>,
    },
    Derivative {
        variable: String,
        body: Box<CanonExpr>,
    },
    UpdateRule {
        variable: String,
        value: Box<CanonExpr>,
    },
    /// `(x, y)` point literal
    Point {
        x: Box<CanonExpr>,
        y: Box<CanonExpr>,
    },
    /// Bare comma sequence of actions
    Seq {
        left: Box<CanonExpr>,
        right: Box<CanonExpr>,
    },
    Norm(Box<CanonExpr>),
    /// `left ~ right`; only meaningful at the top of a statement body
    Regression {
        left: Box<CanonExpr>,
        right: Box<CanonExpr>,
    },
    Repeated {
        op: RepeatedOp,
        variable: String,
        start: Box<CanonExpr>,
        end: Box<CanonExpr>,
        body: Box<CanonExpr>,
    },
}

impl CanonExpr {
    pub fn number(value: f64) -> CanonExpr {
        CanonExpr::Number(value)
    }

    pub fn ident(name: impl Into<String>) -> CanonExpr {
        CanonExpr::Identifier(name.into())
    }
}
