//! Style schema and hydration for `@{...}` mappings
//!
//! Every statement kind has a declarative [`schema::Schema`] describing the
//! style properties it accepts and a defaults table. [`hydrate::hydrate`]
//! validates a parsed style mapping against the schema, substitutes defaults
//! for absent keys, and statically evaluates primitive values with the
//! restricted interpreter in [`eval`]. The result is a fully-resolved
//! [`value::StyleValue`] with every schema key present (explicit value or
//! default), except optional nested schemas which may stay unset.

pub mod defaults;
pub mod eval;
pub mod hydrate;
pub mod schema;
pub mod value;

pub use eval::{static_eval, ConstValue};
pub use hydrate::hydrate;
pub use schema::{Schema, SchemaType};
pub use value::{StyleProp, StyleValue};
