//! Byte-offset source spans
//!
//! Spans are half-open byte ranges into the original source text. Child node
//! spans are always contained in their parent's span. Nodes synthesized by the
//! reverse mapping (wire document -> AST) carry [`Span::SYNTHETIC`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open byte range `start..end` into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The span carried by nodes that were not produced from source text
    pub const SYNTHETIC: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if this span overlaps the half-open range `from..to`
    pub fn intersects(&self, from: usize, to: usize) -> bool {
        self.start < to && from < self.end
    }

    pub fn is_synthetic(&self) -> bool {
        *self == Span::SYNTHETIC
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover() {
        assert_eq!(Span::new(2, 5).to(Span::new(4, 9)), Span::new(2, 9));
        assert_eq!(Span::new(4, 9).to(Span::new(2, 5)), Span::new(2, 9));
    }

    #[test]
    fn test_contains() {
        assert!(Span::new(0, 10).contains(&Span::new(3, 7)));
        assert!(!Span::new(3, 7).contains(&Span::new(0, 10)));
    }

    #[test]
    fn test_intersects() {
        assert!(Span::new(3, 7).intersects(5, 12));
        assert!(!Span::new(3, 7).intersects(7, 12));
        assert!(!Span::new(3, 7).intersects(0, 3));
    }
}
