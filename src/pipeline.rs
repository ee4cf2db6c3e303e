//! Top-level entry points for both compiler directions
//!
//! [`compile`] runs the full forward pipeline (lex, parse, hydrate, lower,
//! encode) and never panics: any internal panic is caught and surfaced as a
//! single Error diagnostic with empty output. [`decompile`] runs the reverse
//! pipeline from a live wire document to printed source.

use std::panic::{self, AssertUnwindSafe};

use crate::ast::Program;
use crate::diagnostics::{has_errors, Diagnostic};
use crate::parser::ids::IdRange;
pub use crate::parser::ParseResult;
use crate::printer::{print_program, PrintOptions};
use crate::semantic::{program_to_semantic, semantic_to_program};
use crate::wire::{semantic_to_wire, wire_to_semantic, LatexParser, WireState};

/// Everything the forward pipeline produces
///
/// `program` is present whenever parsing ran at all (statements that failed
/// are simply missing from it); `wire` is present only when no stage reported
/// an Error.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub wire: Option<WireState>,
    pub program: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse only; see [`crate::parser::parse`]
pub fn parse(source: &str, id_hints: &[IdRange]) -> ParseResult {
    crate::parser::parse(source, id_hints)
}

/// Compile Text Mode source to a wire document
pub fn compile(source: &str, id_hints: &[IdRange]) -> CompileResult {
    let guarded = panic::catch_unwind(AssertUnwindSafe(|| compile_inner(source, id_hints)));
    match guarded {
        Ok(result) => result,
        Err(_) => CompileResult {
            wire: None,
            program: None,
            diagnostics: vec![Diagnostic::error("internal error while compiling", None)],
        },
    }
}

fn compile_inner(source: &str, id_hints: &[IdRange]) -> CompileResult {
    let parsed = crate::parser::parse(source, id_hints);
    let mut diagnostics = parsed.diagnostics;

    let lowered = program_to_semantic(&parsed.program);
    diagnostics.extend(lowered.diagnostics);

    let wire = if has_errors(&diagnostics) {
        None
    } else {
        lowered.state.as_ref().map(semantic_to_wire)
    };

    CompileResult {
        wire,
        program: Some(parsed.program),
        diagnostics,
    }
}

/// Regenerate Text Mode source from a wire document
///
/// Expression strings inside the document are parsed by the caller-supplied
/// `latex_parser`; each string it rejects costs one diagnostic and drops that
/// expression's formula, never the whole document.
pub fn decompile(
    wire: &WireState,
    latex_parser: &dyn LatexParser,
    options: &PrintOptions,
) -> (String, Vec<Diagnostic>) {
    let (state, diagnostics) = wire_to_semantic(wire, latex_parser);
    let program = semantic_to_program(&state);
    (print_program(&program, options), diagnostics)
}
