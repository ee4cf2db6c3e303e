//! Binding powers for the precedence-climbing parser
//!
//! A strictly ordered tier list, low to high. An infix or postfix form
//! continues the current expression only when its tier is greater than the
//! `min_bp` the surrounding call passed down. Exponentiation parses its right
//! operand at `POW - 1`, which makes `^` right-associative while keeping the
//! left side's other uses left-associative; tiers are spaced by 2 so that
//! trick never collides with a neighboring tier.
//!
//! The pretty-printer's parenthesization predicate
//! ([`crate::printer::parens`]) reads the same table; anything it leaves
//! unparenthesized re-parses to the same nesting under these tiers.

pub const TOP: u8 = 0;
/// Trailing `@{...}` style and `#{...}` regression-parameter blocks
pub const META: u8 = 2;
/// Comma
pub const SEQ: u8 = 4;
/// The five comparators and double inequalities
pub const REL: u8 = 6;
/// Regression `~`
pub const SIM: u8 = 8;
/// Update rule `->`
pub const UPDATE: u8 = 10;
/// `with` substitution
pub const SUBST: u8 = 12;
/// `(d/d x)` and the repeated-operator bodies
pub const DERIV: u8 = 14;
pub const ADD: u8 = 16;
pub const MUL: u8 = 18;
/// Unary minus
pub const PREFIX: u8 = 20;
pub const POW: u8 = 22;
/// Factorial and prime
pub const POSTFIX: u8 = 24;
pub const CALL: u8 = 26;
/// `expr[...]`
pub const ACCESS: u8 = 28;
/// `expr.name`
pub const MEMBER: u8 = 30;
/// Self-delimiting nodes: literals, lists, piecewise, norms
pub const ATOM: u8 = u8::MAX;
