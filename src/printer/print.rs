//! Statement and expression printing
//!
//! Each syntactic form is rendered back to the surface syntax that parses to
//! it. Operand slots pass the same binding power the parser would use to
//! re-read them, so [`crate::printer::parens`] adds exactly the parentheses
//! the re-parse needs.

use crate::ast::{
    AssignmentEntry, BinaryOp, Expr, ExprStatement, Program, RegressionParameters, Statement,
    StyleMapping, StyleValueNode,
};
use crate::parser::binding;
use crate::printer::doc::{render, Doc, PrintOptions};
use crate::printer::parens::needs_parens;

/// Print a whole program; statements are separated by blank lines, or by `;`
/// under `suppress_newlines`
pub fn print_program(program: &Program, options: &PrintOptions) -> String {
    if program.statements.is_empty() {
        return String::new();
    }
    let statements = program.statements.iter().map(statement_doc).collect();
    let mut out = render(&Doc::join(statements, Doc::StatementSep), options);
    if !options.suppress_newlines {
        out.push('\n');
    }
    out
}

pub fn print_statement(statement: &Statement, options: &PrintOptions) -> String {
    render(&statement_doc(statement), options)
}

pub fn print_expr(expr: &Expr, options: &PrintOptions) -> String {
    render(&expr_doc(expr), options)
}

fn statement_doc(statement: &Statement) -> Doc {
    match statement {
        Statement::Expr(s) => expr_statement_doc(s),
        Statement::Table(s) => with_style(
            Doc::concat(vec![
                Doc::text("table"),
                Doc::OptionalSpace,
                block_doc(s.columns.iter().map(expr_statement_doc).collect()),
            ]),
            &s.style,
        ),
        Statement::Image(s) => with_style(
            Doc::concat(vec![
                Doc::text("image"),
                Doc::WordBoundary,
                Doc::text(quote(&s.name)),
            ]),
            &s.style,
        ),
        Statement::Text(s) => with_style(Doc::text(quote(&s.text)), &s.style),
        Statement::Folder(s) => with_style(
            Doc::concat(vec![
                Doc::text("folder"),
                Doc::WordBoundary,
                Doc::text(quote(&s.title)),
                Doc::OptionalSpace,
                block_doc(s.children.iter().map(statement_doc).collect()),
            ]),
            &s.style,
        ),
        Statement::Settings(s) => with_style(Doc::text("settings"), &s.style),
        Statement::Ticker(s) => {
            let mut parts = vec![Doc::text("ticker")];
            if let Some(handler) = &s.handler {
                parts.push(Doc::WordBoundary);
                parts.push(expr_doc(handler));
            }
            with_style(Doc::concat(parts), &s.style)
        }
    }
}

fn expr_statement_doc(statement: &ExprStatement) -> Doc {
    let mut parts = vec![expr_doc(&statement.expr)];
    if let Some(parameters) = &statement.parameters {
        parts.push(Doc::OptionalSpace);
        parts.push(parameters_doc(parameters));
    }
    if let Some(style) = &statement.style {
        parts.push(Doc::OptionalSpace);
        parts.push(style_doc(style));
    }
    Doc::concat(parts)
}

fn with_style(body: Doc, style: &Option<StyleMapping>) -> Doc {
    match style {
        Some(mapping) => Doc::concat(vec![body, Doc::OptionalSpace, style_doc(mapping)]),
        None => body,
    }
}

/// A `{ ... }` body whose entries sit on their own blank-line-separated lines
fn block_doc(children: Vec<Doc>) -> Doc {
    if children.is_empty() {
        return Doc::text("{}");
    }
    Doc::concat(vec![
        Doc::text("{"),
        Doc::indent(Doc::concat(vec![
            Doc::HardLine,
            Doc::join(children, Doc::StatementSep),
        ])),
        Doc::HardLine,
        Doc::text("}"),
    ])
}

fn style_doc(mapping: &StyleMapping) -> Doc {
    if mapping.entries.is_empty() {
        return Doc::text("@{}");
    }
    let entries = mapping
        .entries
        .iter()
        .map(|entry| {
            let value = match &entry.value {
                StyleValueNode::Expr(expr) => child(expr, binding::SEQ),
                StyleValueNode::Map(nested) => style_doc(nested),
            };
            Doc::concat(vec![
                Doc::text(entry.property.name.clone()),
                Doc::text(":"),
                Doc::OptionalSpace,
                value,
            ])
        })
        .collect();
    braced_list("@{", entries)
}

fn parameters_doc(parameters: &RegressionParameters) -> Doc {
    if parameters.entries.is_empty() {
        return Doc::text("#{}");
    }
    let entries = parameters
        .entries
        .iter()
        .map(|(name, value)| {
            Doc::concat(vec![
                Doc::text(name.name.clone()),
                Doc::OptionalSpace,
                Doc::text("="),
                Doc::OptionalSpace,
                child(value, binding::SEQ),
            ])
        })
        .collect();
    braced_list("#{", entries)
}

/// `open … }` with comma-separated entries, broken over lines when too wide
fn braced_list(open: &str, entries: Vec<Doc>) -> Doc {
    Doc::group(Doc::concat(vec![
        Doc::text(open),
        Doc::indent(Doc::concat(vec![
            Doc::SoftLine,
            Doc::join(entries, Doc::concat(vec![Doc::text(","), Doc::Line])),
        ])),
        Doc::SoftLine,
        Doc::text("}"),
    ]))
}

/// Render `expr` for a slot the parser re-reads at `slot_bp`
fn child(expr: &Expr, slot_bp: u8) -> Doc {
    let doc = expr_doc(expr);
    if needs_parens(expr, slot_bp) {
        Doc::concat(vec![Doc::text("("), doc, Doc::text(")")])
    } else {
        doc
    }
}

fn expr_doc(expr: &Expr) -> Doc {
    match expr {
        Expr::Number { value, .. } => Doc::text(number_literal(*value)),
        Expr::Str { value, .. } => Doc::text(quote(value)),
        Expr::Identifier(ident) => Doc::text(ident.name.clone()),
        Expr::List { elements, .. } => Doc::concat(vec![
            Doc::text("["),
            comma_separated(elements),
            Doc::text("]"),
        ]),
        Expr::Range { start, end, .. } => Doc::concat(vec![
            Doc::text("["),
            range_inner(start, end),
            Doc::text("]"),
        ]),
        Expr::ListComprehension {
            body, assignments, ..
        } => Doc::concat(vec![
            Doc::text("["),
            child(body, binding::SEQ),
            Doc::WordBoundary,
            Doc::text("for"),
            Doc::WordBoundary,
            assignments_doc(assignments, binding::SEQ),
            Doc::text("]"),
        ]),
        Expr::Substitution {
            body, assignments, ..
        } => Doc::concat(vec![
            child(body, binding::SUBST - 1),
            Doc::WordBoundary,
            Doc::text("with"),
            Doc::WordBoundary,
            assignments_doc(assignments, binding::SUBST),
        ]),
        Expr::Piecewise {
            branches,
            otherwise,
            ..
        } => piecewise_doc(branches, otherwise.as_deref()),
        Expr::Negative { arg, .. } => {
            Doc::concat(vec![Doc::text("-"), child(arg, binding::PREFIX)])
        }
        Expr::Factorial { arg, .. } => {
            Doc::concat(vec![child(arg, binding::POSTFIX - 1), Doc::text("!")])
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            let (left_bp, right_bp) = match op {
                BinaryOp::Add | BinaryOp::Sub => (binding::ADD - 1, binding::ADD),
                BinaryOp::Mul | BinaryOp::Div => (binding::MUL - 1, binding::MUL),
                BinaryOp::Pow => (binding::POW, binding::POW - 1),
            };
            Doc::concat(vec![
                child(left, left_bp),
                Doc::OptionalSpace,
                Doc::text(op.as_str()),
                Doc::OptionalSpace,
                child(right, right_bp),
            ])
        }
        Expr::Comparator {
            op, left, right, ..
        } => Doc::concat(vec![
            child(left, binding::REL),
            Doc::OptionalSpace,
            Doc::text(op.as_str()),
            Doc::OptionalSpace,
            child(right, binding::REL),
        ]),
        Expr::DoubleInequality {
            left,
            left_op,
            middle,
            right_op,
            right,
            ..
        } => Doc::concat(vec![
            child(left, binding::REL),
            Doc::OptionalSpace,
            Doc::text(left_op.as_str()),
            Doc::OptionalSpace,
            child(middle, binding::REL),
            Doc::OptionalSpace,
            Doc::text(right_op.as_str()),
            Doc::OptionalSpace,
            child(right, binding::REL),
        ]),
        Expr::Regression { left, right, .. } => Doc::concat(vec![
            child(left, binding::SIM - 1),
            Doc::OptionalSpace,
            Doc::text("~"),
            Doc::OptionalSpace,
            child(right, binding::SIM),
        ]),
        Expr::Member {
            object, property, ..
        } => Doc::concat(vec![
            child(object, binding::POSTFIX - 1),
            Doc::text("."),
            Doc::text(property.name.clone()),
        ]),
        Expr::ListAccess { list, index, .. } => Doc::concat(vec![
            child(list, binding::POSTFIX - 1),
            Doc::text("["),
            index_doc(index),
            Doc::text("]"),
        ]),
        Expr::Call { callee, args, .. } => Doc::concat(vec![
            child(callee, binding::CALL - 1),
            Doc::text("("),
            comma_separated(args),
            Doc::text(")"),
        ]),
        Expr::Prime {
            callee,
            order,
            args,
            ..
        } => Doc::concat(vec![
            Doc::text(callee.name.clone()),
            Doc::text("'".repeat(*order)),
            Doc::text("("),
            comma_separated(args),
            Doc::text(")"),
        ]),
        Expr::Derivative {
            variable, body, ..
        } => Doc::concat(vec![
            Doc::text("(d/d"),
            Doc::WordBoundary,
            Doc::text(variable.name.clone()),
            Doc::text(")"),
            Doc::OptionalSpace,
            child(body, binding::DERIV),
        ]),
        Expr::UpdateRule {
            variable, value, ..
        } => Doc::concat(vec![
            child(variable, binding::UPDATE - 1),
            Doc::OptionalSpace,
            Doc::text("->"),
            Doc::OptionalSpace,
            child(value, binding::UPDATE),
        ]),
        Expr::Sequence {
            left,
            right,
            parenthesized,
            ..
        } => {
            let inner = Doc::concat(vec![
                child(left, binding::SEQ),
                Doc::text(","),
                Doc::OptionalSpace,
                child(right, binding::SEQ - 1),
            ]);
            if *parenthesized {
                Doc::concat(vec![Doc::text("("), inner, Doc::text(")")])
            } else {
                inner
            }
        }
        Expr::Norm { arg, .. } => {
            Doc::concat(vec![Doc::text("|"), expr_doc(arg), Doc::text("|")])
        }
        Expr::Repeated {
            op,
            variable,
            start,
            end,
            body,
            ..
        } => Doc::concat(vec![
            Doc::text(op.keyword()),
            Doc::WordBoundary,
            Doc::text(variable.name.clone()),
            Doc::OptionalSpace,
            Doc::text("="),
            Doc::OptionalSpace,
            Doc::text("("),
            child(start, binding::SEQ),
            Doc::OptionalSpace,
            Doc::text("..."),
            Doc::OptionalSpace,
            child(end, binding::SEQ),
            Doc::text(")"),
            Doc::WordBoundary,
            Doc::text("of"),
            Doc::WordBoundary,
            child(body, binding::DERIV),
        ]),
    }
}

fn piecewise_doc(branches: &[crate::ast::PiecewiseBranch], otherwise: Option<&Expr>) -> Doc {
    let mut entries = Vec::with_capacity(branches.len() + 1);
    for branch in branches {
        let mut parts = vec![child(&branch.condition, binding::SEQ)];
        match &branch.value {
            Some(value) => {
                parts.push(Doc::text(":"));
                parts.push(Doc::OptionalSpace);
                parts.push(child(value, binding::SEQ));
            }
            // with a final else present, a bare branch would flip the whole
            // block into condition form; spell out the implicit value 1
            None if otherwise.is_some() => {
                parts.push(Doc::text(":"));
                parts.push(Doc::OptionalSpace);
                parts.push(Doc::text("1"));
            }
            None => {}
        }
        entries.push(Doc::concat(parts));
    }
    if let Some(otherwise) = otherwise {
        entries.push(child(otherwise, binding::SEQ));
    }
    Doc::concat(vec![
        Doc::text("{"),
        Doc::join(entries, Doc::concat(vec![Doc::text(","), Doc::OptionalSpace])),
        Doc::text("}"),
    ])
}

/// An access index prints without the wrapping a literal would carry: the
/// bracket pair is already there
fn index_doc(index: &Expr) -> Doc {
    match index {
        Expr::List { elements, .. } if elements.len() >= 2 => comma_separated(elements),
        Expr::Range { start, end, .. } => range_inner(start, end),
        other => child(other, binding::SEQ),
    }
}

fn range_inner(start: &[Expr], end: &[Expr]) -> Doc {
    Doc::concat(vec![
        comma_separated(start),
        Doc::OptionalSpace,
        Doc::text("..."),
        Doc::OptionalSpace,
        comma_separated(end),
    ])
}

fn comma_separated(elements: &[Expr]) -> Doc {
    Doc::join(
        elements.iter().map(|e| child(e, binding::SEQ)).collect(),
        Doc::concat(vec![Doc::text(","), Doc::OptionalSpace]),
    )
}

fn assignments_doc(assignments: &[AssignmentEntry], value_bp: u8) -> Doc {
    Doc::join(
        assignments
            .iter()
            .map(|assignment| {
                Doc::concat(vec![
                    Doc::text(assignment.variable.name.clone()),
                    Doc::OptionalSpace,
                    Doc::text("="),
                    Doc::OptionalSpace,
                    child(&assignment.value, value_bp),
                ])
            })
            .collect(),
        Doc::concat(vec![Doc::text(","), Doc::OptionalSpace]),
    )
}

fn number_literal(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 {
            "infty".to_string()
        } else {
            "-infty".to_string()
        }
    } else {
        format!("{}", value)
    }
}

/// Inverse of the lexer's string unquoting
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparatorOp, PiecewiseBranch, Span};
    use crate::parser::parse;

    fn reprint(source: &str) -> String {
        let result = parse(source, &[]);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        print_program(&result.program, &PrintOptions::default())
    }

    fn reprint_with(source: &str, options: PrintOptions) -> String {
        let result = parse(source, &[]);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        print_program(&result.program, &options)
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(reprint("y=x"), "y = x\n");
    }

    #[test]
    fn test_structural_parens_kept_redundant_dropped() {
        assert_eq!(reprint("(1 + 2) * 3"), "(1 + 2) * 3\n");
        assert_eq!(reprint("1 + (2 * 3)"), "1 + 2 * 3\n");
        assert_eq!(reprint("a - (b - c)"), "a - (b - c)\n");
        assert_eq!(reprint("a / (b / c)"), "a / (b / c)\n");
    }

    #[test]
    fn test_pow_associativity() {
        assert_eq!(reprint("2 ^ 3 ^ 4"), "2 ^ 3 ^ 4\n");
        assert_eq!(reprint("(2 ^ 3) ^ 4"), "(2 ^ 3) ^ 4\n");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(reprint("-x ^ 2"), "-x ^ 2\n");
        assert_eq!(reprint("(-x) ^ 2"), "(-x) ^ 2\n");
        assert_eq!(reprint("-(a * b)"), "-(a * b)\n");
    }

    #[test]
    fn test_double_inequality() {
        assert_eq!(reprint("2 < x < 5"), "2 < x < 5\n");
        assert_eq!(reprint("5 >= x > 2"), "5 >= x > 2\n");
    }

    #[test]
    fn test_comparator_inside_comparator_parenthesized() {
        assert_eq!(reprint("y = (a < b)"), "y = (a < b)\n");
    }

    #[test]
    fn test_piecewise_forms() {
        assert_eq!(reprint("{x > 1: 2, 7}"), "{x > 1: 2, 7}\n");
        assert_eq!(reprint("{x > 1, x < 5}"), "{x > 1, x < 5}\n");
    }

    #[test]
    fn test_piecewise_implicit_value_before_else() {
        // branches: `x > 1` with the implicit value, then an else; the value
        // must print explicitly or the else would read as a second condition
        let expr = Expr::Piecewise {
            branches: vec![PiecewiseBranch {
                condition: Expr::Comparator {
                    op: ComparatorOp::Gt,
                    left: Box::new(Expr::ident("x")),
                    right: Box::new(Expr::number(1.0)),
                    span: Span::SYNTHETIC,
                },
                value: None,
                span: Span::SYNTHETIC,
            }],
            otherwise: Some(Box::new(Expr::number(5.0))),
            span: Span::SYNTHETIC,
        };
        assert_eq!(
            print_expr(&expr, &PrintOptions::default()),
            "{x > 1: 1, 5}"
        );
    }

    #[test]
    fn test_lists_ranges_and_access() {
        assert_eq!(reprint("[1, 2, 3]"), "[1, 2, 3]\n");
        assert_eq!(reprint("[1, 2 ... 9, 10]"), "[1, 2 ... 9, 10]\n");
        assert_eq!(reprint("L[1 ... 3]"), "L[1 ... 3]\n");
        assert_eq!(reprint("L[2]"), "L[2]\n");
        assert_eq!(
            reprint("[x + 1 for x = [1, 2], y = [3]]"),
            "[x + 1 for x = [1, 2], y = [3]]\n"
        );
    }

    #[test]
    fn test_postfix_chains() {
        assert_eq!(reprint("f''(x)!"), "f''(x)!\n");
        assert_eq!(reprint("L[1].x"), "L[1].x\n");
        assert_eq!(reprint("(a + b)!"), "(a + b)!\n");
    }

    #[test]
    fn test_point_and_action_sequence() {
        assert_eq!(reprint("(1, 2)"), "(1, 2)\n");
        assert_eq!(reprint("a -> a + 1, b -> b - 1"), "a -> a + 1, b -> b - 1\n");
        assert_eq!(reprint("(1, 2).x"), "(1, 2).x\n");
    }

    #[test]
    fn test_repeated_and_derivative() {
        assert_eq!(
            reprint("sum n = (1 ... 5) of n ^ 2"),
            "sum n = (1 ... 5) of n ^ 2\n"
        );
        assert_eq!(reprint("(d/d x) x ^ 2 + 1"), "(d/d x) x ^ 2 + 1\n");
    }

    #[test]
    fn test_substitution() {
        assert_eq!(
            reprint("a + b with a = 1, b = 2"),
            "a + b with a = 1, b = 2\n"
        );
    }

    #[test]
    fn test_norm() {
        assert_eq!(reprint("|x - 1|"), "|x - 1|\n");
    }

    #[test]
    fn test_style_mapping_flat() {
        assert_eq!(
            reprint("y = x @{hidden: true, lines: @{width: 4}}"),
            "y = x @{hidden: true, lines: @{width: 4}}\n"
        );
    }

    #[test]
    fn test_style_mapping_breaks_when_wide() {
        let source = "y = x @{label: @{text: \"a very long label that pushes this mapping well past the width limit\"}}";
        let printed = reprint(source);
        assert!(printed.contains("@{\n    "), "{:?}", printed);
    }

    #[test]
    fn test_regression_parameters() {
        assert_eq!(
            reprint("y1 ~ m * x1 + b #{m = 1, b = 2}"),
            "y1 ~ m * x1 + b #{m = 1, b = 2}\n"
        );
    }

    #[test]
    fn test_table_layout() {
        assert_eq!(
            reprint("table { x1 = [1, 2]\n\ny1 = [3, 4] }"),
            "table {\n    x1 = [1, 2]\n\n    y1 = [3, 4]\n}\n"
        );
    }

    #[test]
    fn test_folder_layout() {
        assert_eq!(
            reprint("folder \"f\" { a = 1\n\nb = 2 }"),
            "folder \"f\" {\n    a = 1\n\n    b = 2\n}\n"
        );
    }

    #[test]
    fn test_keyword_statements() {
        assert_eq!(reprint("settings @{degreeMode: true}"), "settings @{degreeMode: true}\n");
        assert_eq!(
            reprint("ticker a -> a + 1 @{minStep: 100}"),
            "ticker a -> a + 1 @{minStep: 100}\n"
        );
        assert_eq!(reprint("image \"i\" @{url: \"u\"}"), "image \"i\" @{url: \"u\"}\n");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(reprint("\"line\\nbreak\""), "\"line\\nbreak\"\n");
        assert_eq!(reprint("\"a\\\"b\""), "\"a\\\"b\"\n");
    }

    #[test]
    fn test_suppressed_output() {
        let options = PrintOptions {
            suppress_spaces: true,
            suppress_newlines: true,
        };
        assert_eq!(reprint_with("y = x\n\nz = x ^ 2", options), "y=x;z=x^2");
        assert_eq!(
            reprint_with("folder \"f\" { a = 1\n\nb = 2 }", options),
            "folder\"f\"{a=1;b=2}"
        );
    }

    #[test]
    fn test_word_boundaries_survive_space_suppression() {
        let options = PrintOptions {
            suppress_spaces: true,
            ..Default::default()
        };
        assert_eq!(
            reprint_with("sum n = (1 ... 5) of n ^ 2", options),
            "sum n=(1...5)of n^2\n"
        );
        assert_eq!(
            reprint_with("a + b with a = 1", options),
            "a+b with a=1\n"
        );
    }

    #[test]
    fn test_reparse_round_trip() {
        let sources = [
            "y = x ^ 2 @{color: \"#2d70b3\", lines: @{width: 4}}",
            "table { x1 = [1, 2]\n\ny1 = x1 + 1 }",
            "folder \"data\" { a = 1\n\n\"a note\" }",
            "y1 ~ m * x1 + b #{m = 1.5}",
            "2 < x < 5; f(x) = {x > 0: x, -x}",
            "A = a -> a + 1\n\nsettings @{squareAxes: false}",
            "ticker A @{minStep: 100}",
        ];
        let all_options = [
            PrintOptions::default(),
            PrintOptions { suppress_spaces: true, suppress_newlines: false },
            PrintOptions { suppress_spaces: false, suppress_newlines: true },
            PrintOptions { suppress_spaces: true, suppress_newlines: true },
        ];
        for source in sources {
            let first = parse(source, &[]);
            assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
            for options in all_options {
                let printed = print_program(&first.program, &options);
                let second = parse(&printed, &[]);
                assert!(
                    second.diagnostics.is_empty(),
                    "reparse of {:?} failed: {:?}",
                    printed,
                    second.diagnostics
                );
                assert_eq!(
                    second.program.normalized(),
                    first.program.normalized(),
                    "round trip changed {:?} via {:?}",
                    source,
                    printed
                );
            }
        }
    }

    #[test]
    fn test_print_is_idempotent() {
        let source = "y = (1 + 2) * 3\n\nfolder \"f\" { z = -x ^ 2 }\n\n{x > 1: 2, 7}";
        let once = reprint(source);
        assert_eq!(reprint(&once), once);
    }

    #[test]
    fn test_empty_program() {
        let result = parse("", &[]);
        assert_eq!(print_program(&result.program, &PrintOptions::default()), "");
    }
}
