//! Restricted static evaluator for style property values
//!
//! Style properties other than `expr`/`color` must resolve at compile time.
//! The evaluator accepts number and string literals, negation of numbers,
//! lists of numbers, and a small table of named constants. Anything else is
//! an error. List evaluation records an error per bad element but substitutes
//! a zero placeholder so the remaining elements still get checked.

use crate::ast::Expr;
use crate::diagnostics::Diagnostic;

/// A statically-evaluated style value
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Number(f64),
    Bool(bool),
    Str(String),
    NumVec(Vec<f64>),
}

impl ConstValue {
    pub fn category(&self) -> &'static str {
        match self {
            ConstValue::Number(_) => "a number",
            ConstValue::Bool(_) => "a boolean",
            ConstValue::Str(_) => "a string",
            ConstValue::NumVec(_) => "a list of numbers",
        }
    }
}

fn constant(name: &str) -> Option<ConstValue> {
    let value = match name {
        "true" => ConstValue::Bool(true),
        "false" => ConstValue::Bool(false),
        "pi" => ConstValue::Number(std::f64::consts::PI),
        "tau" => ConstValue::Number(std::f64::consts::TAU),
        "e" => ConstValue::Number(std::f64::consts::E),
        "infty" => ConstValue::Number(f64::INFINITY),
        _ => return None,
    };
    Some(value)
}

/// Evaluate `expr` in the static style context.
///
/// Returns `None` after recording an error when the expression is outside
/// the static subset.
pub fn static_eval(expr: &Expr, diagnostics: &mut Vec<Diagnostic>) -> Option<ConstValue> {
    match expr {
        Expr::Number { value, .. } => Some(ConstValue::Number(*value)),
        Expr::Str { value, .. } => Some(ConstValue::Str(value.clone())),
        Expr::Identifier(ident) => match constant(&ident.name) {
            Some(value) => Some(value),
            None => {
                diagnostics.push(Diagnostic::error(
                    format!("'{}' is not a constant", ident.name),
                    ident.span,
                ));
                None
            }
        },
        Expr::Negative { arg, .. } => match static_eval(arg, diagnostics)? {
            ConstValue::Number(n) => Some(ConstValue::Number(-n)),
            other => {
                diagnostics.push(Diagnostic::error(
                    format!("cannot negate {}", other.category()),
                    arg.span(),
                ));
                None
            }
        },
        Expr::List { elements, .. } => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                match static_eval(element, diagnostics) {
                    Some(ConstValue::Number(n)) => values.push(n),
                    Some(other) => {
                        diagnostics.push(Diagnostic::error(
                            format!("list elements must be numbers, found {}", other.category()),
                            element.span(),
                        ));
                        values.push(0.0);
                    }
                    // error already recorded; keep checking siblings
                    None => values.push(0.0),
                }
            }
            Some(ConstValue::NumVec(values))
        }
        other => {
            diagnostics.push(Diagnostic::error(
                "expression cannot be evaluated in a style mapping",
                other.span(),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Span};

    fn eval(expr: &Expr) -> (Option<ConstValue>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let value = static_eval(expr, &mut diagnostics);
        (value, diagnostics)
    }

    #[test]
    fn test_literals_and_constants() {
        let (value, diagnostics) = eval(&Expr::number(2.5));
        assert_eq!(value, Some(ConstValue::Number(2.5)));
        assert!(diagnostics.is_empty());

        let (value, _) = eval(&Expr::ident("true"));
        assert_eq!(value, Some(ConstValue::Bool(true)));

        let (value, _) = eval(&Expr::ident("pi"));
        assert_eq!(value, Some(ConstValue::Number(std::f64::consts::PI)));
    }

    #[test]
    fn test_negated_number() {
        let expr = Expr::Negative {
            arg: Box::new(Expr::number(4.0)),
            span: Span::SYNTHETIC,
        };
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, Some(ConstValue::Number(-4.0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_identifier_is_error() {
        let (value, diagnostics) = eval(&Expr::ident("x"));
        assert_eq!(value, None);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("not a constant"));
    }

    #[test]
    fn test_list_with_bad_element_uses_placeholder() {
        let expr = Expr::List {
            elements: vec![Expr::number(1.0), Expr::ident("x"), Expr::number(3.0)],
            span: Span::SYNTHETIC,
        };
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, Some(ConstValue::NumVec(vec![1.0, 0.0, 3.0])));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_arbitrary_expression_rejected() {
        let expr = Expr::Binary {
            op: crate::ast::BinaryOp::Add,
            left: Box::new(Expr::number(1.0)),
            right: Box::new(Expr::number(2.0)),
            span: Span::SYNTHETIC,
        };
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, None);
        assert_eq!(diagnostics.len(), 1);
    }
}
