//! Hydrated style values
//!
//! A [`StyleValue`] is the fully-resolved configuration object produced by
//! hydration: a map from property name to resolved [`StyleProp`]. The same
//! type doubles as the defaults table for each statement kind.

use std::collections::BTreeMap;

use crate::ast::Expr;

/// One resolved style property
#[derive(Debug, Clone, PartialEq)]
pub enum StyleProp {
    Number(f64),
    Bool(bool),
    Str(String),
    NumVec(Vec<f64>),
    /// Passed through unevaluated (`expr` and `color` schema types)
    Expr(Expr),
    /// A hydrated nested mapping
    Map(StyleValue),
}

/// A fully-resolved configuration object matching a schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleValue {
    entries: BTreeMap<String, StyleProp>,
}

impl StyleValue {
    pub fn new() -> Self {
        StyleValue::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, prop: StyleProp) {
        self.entries.insert(key.into(), prop);
    }

    /// Builder form of [`insert`](Self::insert), used by the defaults tables
    pub fn with(mut self, key: impl Into<String>, prop: StyleProp) -> Self {
        self.insert(key, prop);
        self
    }

    pub fn get(&self, key: &str) -> Option<&StyleProp> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(StyleProp::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(StyleProp::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(StyleProp::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn expr(&self, key: &str) -> Option<&Expr> {
        match self.get(key) {
            Some(StyleProp::Expr(e)) => Some(e),
            _ => None,
        }
    }

    pub fn map(&self, key: &str) -> Option<&StyleValue> {
        match self.get(key) {
            Some(StyleProp::Map(m)) => Some(m),
            _ => None,
        }
    }
}
