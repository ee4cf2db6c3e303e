//! Parenthesization: which children must be wrapped to re-parse as themselves
//!
//! Each operand slot in the printed output corresponds to a `parse_expr(bp)`
//! call in the parser; a child left bare re-parses to the same nesting exactly
//! when its own binding power exceeds that slot's power. The printer passes
//! the slot power from [`crate::parser::binding`] and this module compares.
//!
//! The comparison is slightly conservative for prefix forms: a unary minus in
//! an operand slot of `^` gets redundant parentheses (`2 ^ (-3)`). Redundant
//! parentheses never change the re-parsed tree.

use crate::ast::{BinaryOp, Expr};
use crate::parser::binding;

/// The binding tier of an expression's outermost form
pub fn binding_power(expr: &Expr) -> u8 {
    match expr {
        // a negative literal prints with a leading minus and binds like one
        Expr::Number { value, .. } if value.is_sign_negative() => binding::PREFIX,
        Expr::Number { .. }
        | Expr::Str { .. }
        | Expr::Identifier(_)
        | Expr::List { .. }
        | Expr::Range { .. }
        | Expr::ListComprehension { .. }
        | Expr::Piecewise { .. }
        | Expr::Norm { .. } => binding::ATOM,
        Expr::Sequence { parenthesized, .. } => {
            if *parenthesized {
                binding::ATOM
            } else {
                binding::SEQ
            }
        }
        Expr::Comparator { .. } | Expr::DoubleInequality { .. } => binding::REL,
        Expr::Regression { .. } => binding::SIM,
        Expr::UpdateRule { .. } => binding::UPDATE,
        Expr::Substitution { .. } => binding::SUBST,
        Expr::Derivative { .. } | Expr::Repeated { .. } => binding::DERIV,
        Expr::Binary { op, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub => binding::ADD,
            BinaryOp::Mul | BinaryOp::Div => binding::MUL,
            BinaryOp::Pow => binding::POW,
        },
        Expr::Negative { .. } => binding::PREFIX,
        Expr::Factorial { .. } | Expr::Prime { .. } => binding::POSTFIX,
        Expr::Call { .. } => binding::CALL,
        Expr::ListAccess { .. } => binding::ACCESS,
        Expr::Member { .. } => binding::MEMBER,
    }
}

/// True when `child` printed in a slot of power `slot_bp` needs parentheses
pub fn needs_parens(child: &Expr, slot_bp: u8) -> bool {
    binding_power(child) <= slot_bp
}
