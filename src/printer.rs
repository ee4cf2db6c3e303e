//! Pretty-printer: AST back to Text Mode source
//!
//! Printing is the inverse of parsing: for any program the parser produces,
//! the printed text re-parses to the same program (up to ids and spans).
//! Layout is computed over a small document algebra ([`doc`]); which children
//! need parentheses is decided by [`parens`] from the same binding-power table
//! the parser climbs.

pub mod doc;
pub mod parens;
pub mod print;

pub use doc::{render, Doc, PrintOptions, MAX_WIDTH};
pub use print::{print_expr, print_program, print_statement};
