//! The canonical, syntax-independent document model
//!
//! [`state::SemanticState`] is the meeting point of the two compiler
//! directions: lowering builds it from the parsed tree, the wire layer
//! serializes it to the host document, and [`raise`] turns it back into
//! surface syntax for the pretty-printer. Expression content is carried as
//! [`canonical::CanonExpr`], mirroring the host calculator's own parsed
//! expression shape.

pub mod canonical;
pub mod color;
pub mod lower;
pub mod raise;
pub mod state;

pub use canonical::{CanonExpr, Coordinate};
pub use lower::{expr_to_canonical, program_to_semantic, LowerResult};
pub use raise::{canonical_to_expr, semantic_to_program};
pub use state::{SemanticItem, SemanticState};
