//! Declarative style schemas
//!
//! A schema maps property names to the value category they require. Nested
//! schemas may be optional (left unset when absent), fill their defaults when
//! absent, or additionally accept a statically-evaluable boolean
//! (`or_bool`, used by `lines: true` style shorthands).

/// The value category a style property requires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaType {
    Number,
    Boolean,
    Str,
    /// Raw expression passed through hydration unevaluated
    Expr,
    /// Like `Expr`, but understood as a color by lowering
    Color,
    /// A string drawn from a fixed set
    Enum(&'static [&'static str]),
    /// A fixed-length numeric vector
    NumVec(usize),
    Nested {
        schema: &'static Schema,
        /// Substitute the whole defaults sub-map when the key is absent
        fill_defaults: bool,
        /// Additionally accept a statically-evaluable boolean
        or_bool: bool,
    },
}

/// An ordered property-name -> type table
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub entries: &'static [(&'static str, SchemaType)],
}

impl Schema {
    pub fn get(&self, key: &str) -> Option<&SchemaType> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, ty)| ty)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
