//! The host calculator's persisted document format
//!
//! [`types`] mirrors the host's JSON schema (camelCase, version-tagged,
//! tolerant of unknown fields on input). [`encode`] flattens the semantic
//! state into it; [`decode`] reverses the trip with the help of a
//! caller-supplied parser for the host's expression-string syntax.
//! Extension-only flags ride along in a hidden metadata item ([`metadata`]).

pub mod decode;
pub mod encode;
pub mod latex;
pub mod metadata;
pub mod types;

pub use decode::wire_to_semantic;
pub use encode::semantic_to_wire;
pub use types::WireState;

use crate::semantic::CanonExpr;

/// The host's live parser for its own expression-string syntax.
///
/// Supplied by the embedding application; never implemented here. Tests use
/// a minimal stub.
pub trait LatexParser {
    fn parse_latex(&self, latex: &str) -> Result<CanonExpr, String>;
}
