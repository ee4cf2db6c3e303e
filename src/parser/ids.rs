//! Incremental statement-id bookkeeping
//!
//! The caller (an editor integration) owns a list of `(span, id)` ranges from
//! the previous parse. During a re-parse, a statement whose span intersects a
//! pending range reuses that range's id (consuming the range); any other
//! statement gets a fresh numeric id that collides with nothing already issued
//! or still pending. The `IdContext` is a mutable arena owned by the parser's
//! state object, passed by reference through the recursive-descent calls.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::Span;

/// A prior statement span and the id it carried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdRange {
    pub from: usize,
    pub to: usize,
    pub id: String,
}

/// Mutable id-assignment state for one parse
#[derive(Debug, Clone)]
pub struct IdContext {
    pending: Vec<IdRange>,
    issued: HashSet<String>,
    counter: u64,
}

impl IdContext {
    pub fn new(pending: Vec<IdRange>) -> Self {
        IdContext {
            pending,
            issued: HashSet::new(),
            counter: 0,
        }
    }

    /// Assign an id for a statement covering `span`
    pub fn assign(&mut self, span: Span) -> String {
        let reused = self
            .pending
            .iter()
            .position(|range| span.intersects(range.from, range.to));
        if let Some(index) = reused {
            let range = self.pending.remove(index);
            self.issued.insert(range.id.clone());
            return range.id;
        }
        loop {
            self.counter += 1;
            let candidate = self.counter.to_string();
            let still_pending = self.pending.iter().any(|range| range.id == candidate);
            if !still_pending && !self.issued.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Replace an issued id with an explicit one from an `id:` style entry
    pub fn replace(&mut self, old: &str, new: &str) {
        self.issued.remove(old);
        self.issued.insert(new.to_string());
    }
}

/// Validity rule for explicit `id:` overrides: at least one non-digit
/// character, and not in the reserved `__` namespace
pub fn valid_explicit_id(id: &str) -> bool {
    !id.is_empty() && !id.starts_with("__") && id.chars().any(|c| !c.is_ascii_digit())
}
