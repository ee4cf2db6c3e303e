//! # textmode
//!
//! A two-way compiler between Text Mode, a line-oriented textual language for
//! graphing-calculator documents, and the calculator's own document model.
//!
//! The forward pipeline lexes and parses Text Mode source into an AST, hydrates
//! per-statement style mappings against declarative schemas, lowers the result
//! to a canonical semantic document, and serializes that document to the host
//! calculator's persisted wire format. The reverse pipeline regenerates Text
//! Mode source from a live wire document via a pretty-printer that inverts
//! parsing exactly.
//!
//! The top-level entry points live in the [pipeline] module: [`pipeline::parse`],
//! [`pipeline::compile`] and [`pipeline::decompile`].

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod printer;
pub mod semantic;
pub mod style;
pub mod wire;

pub use diagnostics::{Diagnostic, Severity};
pub use pipeline::{compile, decompile, parse, CompileResult, ParseResult};
