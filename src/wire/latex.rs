//! Canonical expression to host expression-string rendering
//!
//! Produces the host's linear LaTeX-like notation. Parenthesization here is
//! conservative: operands are wrapped whenever their precedence is below what
//! the position requires, which the host's parser accepts without change.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ast::{BinaryOp, ComparatorOp, RepeatedOp};
use crate::semantic::canonical::{CanonExpr, Coordinate};

/// Identifier names that render as bare LaTeX commands
static COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sin", "cos", "tan", "csc", "sec", "cot", "arcsin", "arccos", "arctan", "sinh", "cosh",
        "tanh", "ln", "log", "exp", "pi", "tau", "theta", "alpha", "beta", "gamma", "delta",
        "epsilon", "lambda", "mu", "sigma", "phi", "omega", "infty",
    ]
    .into_iter()
    .collect()
});

// binding strengths, loosest to tightest
const PREC_SEQ: u8 = 0;
const PREC_CMP: u8 = 1;
const PREC_ADD: u8 = 2;
const PREC_MUL: u8 = 3;
const PREC_NEG: u8 = 4;
const PREC_POW: u8 = 5;
const PREC_POSTFIX: u8 = 6;
const PREC_ATOM: u8 = 7;

pub fn latex_of(canon: &CanonExpr) -> String {
    render(canon)
}

pub fn format_number(value: f64) -> String {
    if value.is_infinite() {
        if value < 0.0 {
            return "-\\infty".to_string();
        }
        return "\\infty".to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-6..1e18).contains(&abs) {
        let s = format!("{value:e}");
        if let Some((mantissa, exponent)) = s.split_once('e') {
            return format!("{mantissa}\\times10^{{{exponent}}}");
        }
    }
    format!("{value}")
}

pub fn identifier(name: &str) -> String {
    if let Some((head, tail)) = name.split_once('_') {
        return format!("{head}_{{{tail}}}");
    }
    if COMMANDS.contains(name) {
        return format!("\\{name}");
    }
    if name.chars().count() <= 1 || name.starts_with('$') {
        return name.to_string();
    }
    let mut chars = name.chars();
    let head = chars.next().unwrap_or_default();
    format!("{head}_{{{}}}", chars.as_str())
}

fn precedence(canon: &CanonExpr) -> u8 {
    match canon {
        CanonExpr::Seq { .. } | CanonExpr::UpdateRule { .. } => PREC_SEQ,
        CanonExpr::Comparator { .. }
        | CanonExpr::DoubleInequality { .. }
        | CanonExpr::Regression { .. }
        | CanonExpr::Substitution { .. } => PREC_CMP,
        CanonExpr::Binary { op, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
            BinaryOp::Mul => PREC_MUL,
            BinaryOp::Pow => PREC_POW,
            // \frac is visually atomic
            BinaryOp::Div => PREC_ATOM,
        },
        CanonExpr::Negative(_) => PREC_NEG,
        CanonExpr::Repeated { .. } | CanonExpr::Derivative { .. } => PREC_MUL,
        CanonExpr::Factorial(_)
        | CanonExpr::OrderedPairAccess { .. }
        | CanonExpr::DotAccess { .. }
        | CanonExpr::DotCall { .. }
        | CanonExpr::ListAccess { .. }
        | CanonExpr::Call { .. }
        | CanonExpr::Prime { .. } => PREC_POSTFIX,
        CanonExpr::Number(n) if *n < 0.0 => PREC_NEG,
        CanonExpr::Number(_)
        | CanonExpr::Identifier(_)
        | CanonExpr::List(_)
        | CanonExpr::Range { .. }
        | CanonExpr::ListComprehension { .. }
        | CanonExpr::Piecewise { .. }
        | CanonExpr::Point { .. }
        | CanonExpr::Norm(_) => PREC_ATOM,
    }
}

fn child(canon: &CanonExpr, min: u8) -> String {
    if precedence(canon) < min {
        format!("\\left({}\\right)", render(canon))
    } else {
        render(canon)
    }
}

fn comparator(op: ComparatorOp) -> &'static str {
    match op {
        ComparatorOp::Eq => "=",
        ComparatorOp::Lt => "<",
        ComparatorOp::Le => "\\le ",
        ComparatorOp::Ge => "\\ge ",
        ComparatorOp::Gt => ">",
    }
}

fn join(exprs: &[CanonExpr]) -> String {
    exprs.iter().map(render).collect::<Vec<_>>().join(",")
}

fn assignments(entries: &[(String, CanonExpr)]) -> String {
    entries
        .iter()
        .map(|(name, value)| format!("{}={}", identifier(name), render(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn render(canon: &CanonExpr) -> String {
    match canon {
        CanonExpr::Number(value) => format_number(*value),
        CanonExpr::Identifier(name) => identifier(name),
        CanonExpr::List(elements) => format!("\\left[{}\\right]", join(elements)),
        CanonExpr::Range { start, end } => {
            format!("\\left[{},...,{}\\right]", join(start), join(end))
        }
        CanonExpr::ListComprehension { body, assignments: entries } => format!(
            "\\left[{}\\operatorname{{for}}{}\\right]",
            render(body),
            assignments(entries)
        ),
        CanonExpr::Substitution { body, assignments: entries } => format!(
            "{}\\operatorname{{with}}{}",
            child(body, PREC_CMP),
            assignments(entries)
        ),
        CanonExpr::Piecewise { .. } => {
            let mut parts = Vec::new();
            let mut current = canon;
            loop {
                let CanonExpr::Piecewise {
                    condition,
                    consequent,
                    alternate,
                } = current
                else {
                    parts.push(render(current));
                    break;
                };
                match consequent.as_ref() {
                    CanonExpr::Number(n) if *n == 1.0 => parts.push(render(condition)),
                    other => parts.push(format!("{}:{}", render(condition), render(other))),
                }
                match alternate {
                    Some(next) => current = next,
                    None => break,
                }
            }
            format!("\\left\\{{{}\\right\\}}", parts.join(","))
        }
        CanonExpr::Negative(arg) => format!("-{}", child(arg, PREC_POW)),
        CanonExpr::Factorial(arg) => format!("{}!", child(arg, PREC_ATOM)),
        CanonExpr::Binary { op, left, right } => match op {
            BinaryOp::Add => format!("{}+{}", child(left, PREC_ADD), child(right, PREC_ADD + 1)),
            BinaryOp::Sub => format!("{}-{}", child(left, PREC_ADD), child(right, PREC_ADD + 1)),
            BinaryOp::Mul => format!(
                "{}\\cdot {}",
                child(left, PREC_MUL),
                child(right, PREC_MUL + 1)
            ),
            BinaryOp::Div => format!("\\frac{{{}}}{{{}}}", render(left), render(right)),
            BinaryOp::Pow => format!("{}^{{{}}}", child(left, PREC_POSTFIX), render(right)),
        },
        CanonExpr::Comparator { op, left, right } => format!(
            "{}{}{}",
            child(left, PREC_ADD),
            comparator(*op),
            child(right, PREC_ADD)
        ),
        CanonExpr::DoubleInequality {
            left,
            left_op,
            middle,
            right_op,
            right,
        } => format!(
            "{}{}{}{}{}",
            child(left, PREC_ADD),
            comparator(*left_op),
            child(middle, PREC_ADD),
            comparator(*right_op),
            child(right, PREC_ADD)
        ),
        CanonExpr::OrderedPairAccess { point, coordinate } => {
            let name = match coordinate {
                Coordinate::X => "x",
                Coordinate::Y => "y",
            };
            format!("{}.{}", child(point, PREC_POSTFIX), name)
        }
        CanonExpr::DotAccess { object, property } => format!(
            "{}.\\operatorname{{{}}}",
            child(object, PREC_POSTFIX),
            property
        ),
        CanonExpr::DotCall {
            object,
            method,
            args,
        } => format!(
            "{}.\\operatorname{{{}}}\\left({}\\right)",
            child(object, PREC_POSTFIX),
            method,
            join(args)
        ),
        CanonExpr::ListAccess { list, index } => format!(
            "{}\\left[{}\\right]",
            child(list, PREC_POSTFIX),
            render(index)
        ),
        CanonExpr::Call { callee, args } => format!(
            "{}\\left({}\\right)",
            child(callee, PREC_POSTFIX),
            join(args)
        ),
        CanonExpr::Prime {
            callee,
            order,
            args,
        } => format!(
            "{}{}\\left({}\\right)",
            identifier(callee),
            "'".repeat(*order),
            join(args)
        ),
        CanonExpr::Derivative { variable, body } => format!(
            "\\frac{{d}}{{d{}}}{}",
            identifier(variable),
            child(body, PREC_POW)
        ),
        CanonExpr::UpdateRule { variable, value } => {
            format!("{}\\to {}", identifier(variable), child(value, PREC_CMP))
        }
        CanonExpr::Point { x, y } => format!("\\left({},{}\\right)", render(x), render(y)),
        CanonExpr::Seq { left, right } => format!("{},{}", render(left), render(right)),
        CanonExpr::Norm(arg) => format!("\\left|{}\\right|", render(arg)),
        CanonExpr::Regression { left, right } => {
            format!("{}\\sim {}", child(left, PREC_ADD), child(right, PREC_ADD))
        }
        CanonExpr::Repeated {
            op,
            variable,
            start,
            end,
            body,
        } => {
            let body = child(body, PREC_MUL + 1);
            match op {
                RepeatedOp::Sum => format!(
                    "\\sum_{{{}={}}}^{{{}}}{}",
                    identifier(variable),
                    render(start),
                    render(end),
                    body
                ),
                RepeatedOp::Product => format!(
                    "\\prod_{{{}={}}}^{{{}}}{}",
                    identifier(variable),
                    render(start),
                    render(end),
                    body
                ),
                RepeatedOp::Integral => format!(
                    "\\int_{{{}}}^{{{}}}{}d{}",
                    render(start),
                    render(end),
                    body,
                    identifier(variable)
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(source: &str) -> CanonExpr {
        let parsed = crate::parser::parse(source, &[]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let crate::ast::Statement::Expr(statement) = &parsed.program.statements[0] else {
            panic!("expected expression statement");
        };
        let mut diagnostics = Vec::new();
        let canon =
            crate::semantic::lower::expr_to_canonical(&statement.expr, &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        canon
    }

    #[test]
    fn test_identifier_subscripting() {
        assert_eq!(identifier("x"), "x");
        assert_eq!(identifier("ab"), "a_{b}");
        assert_eq!(identifier("a_bc"), "a_{bc}");
        assert_eq!(identifier("theta"), "\\theta");
        assert_eq!(identifier("sin"), "\\sin");
    }

    #[test]
    fn test_division_renders_as_frac() {
        assert_eq!(latex_of(&canon("(a + b) / 2")), "\\frac{a+b}{2}");
    }

    #[test]
    fn test_low_precedence_operand_parenthesized() {
        assert_eq!(
            latex_of(&canon("(a + b) * c")),
            "\\left(a+b\\right)\\cdot c"
        );
        assert_eq!(latex_of(&canon("a * b + c")), "a\\cdot b+c");
    }

    #[test]
    fn test_equation() {
        assert_eq!(latex_of(&canon("y = m * x + b")), "y=m\\cdot x+b");
    }

    #[test]
    fn test_piecewise() {
        assert_eq!(
            latex_of(&canon("{x > 0: 5, 2}")),
            "\\left\\{x>0:5,2\\right\\}"
        );
        assert_eq!(latex_of(&canon("{x > 0}")), "\\left\\{x>0\\right\\}");
    }

    #[test]
    fn test_sum() {
        assert_eq!(
            latex_of(&canon("sum n = (1 ... 5) of n ^ 2")),
            "\\sum_{n=1}^{5}n^{2}"
        );
    }

    #[test]
    fn test_integral() {
        assert_eq!(
            latex_of(&canon("integral x = (0 ... 1) of x ^ 2")),
            "\\int_{0}^{1}x^{2}dx"
        );
    }

    #[test]
    fn test_point_and_range() {
        assert_eq!(latex_of(&canon("(1, 2)")), "\\left(1,2\\right)");
        assert_eq!(latex_of(&canon("[1 ... 9]")), "\\left[1,...,9\\right]");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(250.0), "250");
        assert_eq!(format_number(f64::INFINITY), "\\infty");
    }
}
