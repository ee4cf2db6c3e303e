//! Lexer module for the Text Mode language
//!
//! Tokenization runs in two stages, mirroring the rest of the pipeline:
//! 1. Raw tokenization with the logos lexer ([`lexer_impl::tokenize`]),
//!    producing tokens paired with byte spans and invalid-character
//!    diagnostics.
//! 2. A separator transformation ([`transformations::collapse_separators`])
//!    that turns semicolons and runs of two-or-more newlines into a single
//!    `Separator` token and drops lone newlines. After this pass the parser
//!    sees exactly one statement-terminator token kind.

pub mod lexer_impl;
pub mod tokens;
pub mod transformations;

pub use lexer_impl::tokenize;
pub use tokens::Token;

use crate::ast::Span;
use crate::diagnostics::Diagnostic;

/// Tokenize source text and apply the separator transformation
pub fn lex(source: &str) -> (Vec<(Token, Span)>, Vec<Diagnostic>) {
    let (raw, diagnostics) = tokenize(source);
    (transformations::collapse_separators(raw), diagnostics)
}
