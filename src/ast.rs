//! AST definitions for the Text Mode language
//!
//! This module provides the core Abstract Syntax Tree definitions: source
//! spans, the closed expression node family, and the closed statement node
//! family, along with a normalization helper used by the round-trip tests.
//!
//! There is a single node family for both the "with positions" and "without
//! positions" flavors of the tree: nodes built by the reverse mapping
//! (canonical expression -> AST) carry [`Span::SYNTHETIC`] instead of a real
//! source range.

pub mod expr;
pub mod span;
pub mod statement;

pub use expr::{
    AssignmentEntry, BinaryOp, ComparatorOp, Direction, Expr, Ident, PiecewiseBranch, RepeatedOp,
};
pub use span::Span;
pub use statement::{
    ExprStatement, FolderStatement, ImageStatement, MappingEntry, Program, RegressionParameters,
    SettingsStatement, Statement, StyleMapping, StyleValueNode, TableStatement, TextStatement,
    TickerStatement,
};
