//! Print/parse inversion
//!
//! Printing a program and re-parsing the output must reproduce the same
//! program up to ids and spans, under every combination of output options.

use proptest::prelude::*;
use rstest::rstest;

use textmode::ast::{
    BinaryOp, ComparatorOp, Expr, ExprStatement, PiecewiseBranch, Program, Span, Statement,
};
use textmode::parse;
use textmode::printer::{print_program, PrintOptions};

const ALL_OPTIONS: [PrintOptions; 4] = [
    PrintOptions {
        suppress_spaces: false,
        suppress_newlines: false,
    },
    PrintOptions {
        suppress_spaces: true,
        suppress_newlines: false,
    },
    PrintOptions {
        suppress_spaces: false,
        suppress_newlines: true,
    },
    PrintOptions {
        suppress_spaces: true,
        suppress_newlines: true,
    },
];

#[rstest]
#[case::assignment("y = x ^ 2")]
#[case::piecewise("f(x) = {x > 0: x, -x}")]
#[case::bare_condition_piecewise("y = {x > 1}")]
#[case::double_inequality("2 < x < 5")]
#[case::action_sequence("a -> a + 1, b -> b - 1")]
#[case::sum("sum n = (1 ... 5) of n ^ 2")]
#[case::integral("g(x) = integral t = (0 ... x) of t ^ 2")]
#[case::substitution("c = a with a = 2, b = 3")]
#[case::comprehension("L = [i ^ 2 for i = [1 ... 10]]")]
#[case::derivative("(d/d x) x ^ 2")]
#[case::norm("|x - 2| + 1")]
#[case::prime("f''(t)")]
#[case::member("P = (1, 2).x")]
#[case::list_access("A = [1, 2, 3][2]")]
#[case::regression("e1 = y1 ~ m * x1 + b #{m = 2, b = 1}")]
#[case::styled("y = x @{color: \"#2d70b3\", hidden: true}")]
#[case::nested_style("settings @{viewport: @{xmin: 0, xmax: 10}}")]
#[case::folder("folder \"plots\" { y = x\n\n(1, 2) }")]
#[case::table("table { x1 = [1, 2]\n\ny1 = [3, 4] }")]
#[case::image("image \"bg\" @{width: 20, height: 15}")]
#[case::text("\"a note\"")]
#[case::ticker("ticker a -> a + 1")]
fn source_round_trips(#[case] source: &str) {
    let parsed = parse(source, &[]);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let expected = parsed.program.normalized();
    for options in ALL_OPTIONS {
        let printed = print_program(&parsed.program, &options);
        let reparsed = parse(&printed, &[]);
        assert!(
            reparsed.diagnostics.is_empty(),
            "printed {:?} from {:?}: {:?}",
            printed,
            source,
            reparsed.diagnostics
        );
        assert_eq!(reparsed.program.normalized(), expected, "printed {printed:?}");
    }
}

#[rstest]
#[case("y=x^2\n\n\n\nz  =  y+1 // trailing note")]
#[case("f(x)={x>0:x,-x}")]
#[case("folder \"f\" { a = 1; b = 2 }")]
fn formatting_is_idempotent(#[case] source: &str) {
    let options = PrintOptions::default();
    let parsed = parse(source, &[]);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let once = print_program(&parsed.program, &options);
    let again = print_program(&parse(&once, &[]).program, &options);
    assert_eq!(once, again);
}

fn boxed(expr: Expr) -> Box<Expr> {
    Box::new(expr)
}

fn identifier_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["x", "y", "a", "b2", "count"]).prop_map(str::to_string)
}

fn leaf_expr() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0u32..10_000).prop_map(|n| Expr::number(f64::from(n))),
        identifier_name().prop_map(Expr::ident),
    ]
}

fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
        Just(BinaryOp::Pow),
    ]
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    leaf_expr().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (arb_binary_op(), inner.clone(), inner.clone()).prop_map(|(op, left, right)| {
                Expr::Binary {
                    op,
                    left: boxed(left),
                    right: boxed(right),
                    span: Span::SYNTHETIC,
                }
            }),
            inner.clone().prop_map(|arg| Expr::Negative {
                arg: boxed(arg),
                span: Span::SYNTHETIC,
            }),
            inner.clone().prop_map(|arg| Expr::Factorial {
                arg: boxed(arg),
                span: Span::SYNTHETIC,
            }),
            prop::collection::vec(inner.clone(), 0..3).prop_map(|elements| Expr::List {
                elements,
                span: Span::SYNTHETIC,
            }),
            (identifier_name(), prop::collection::vec(inner.clone(), 0..3)).prop_map(
                |(name, args)| Expr::Call {
                    callee: boxed(Expr::ident(name)),
                    args,
                    span: Span::SYNTHETIC,
                }
            ),
            (inner.clone(), inner.clone()).prop_map(|(left, right)| Expr::Sequence {
                left: boxed(left),
                right: boxed(right),
                parenthesized: true,
                span: Span::SYNTHETIC,
            }),
            (inner.clone(), inner.clone(), inner).prop_map(|(scrutinee, value, otherwise)| {
                Expr::Piecewise {
                    branches: vec![PiecewiseBranch {
                        condition: Expr::Comparator {
                            op: ComparatorOp::Gt,
                            left: boxed(scrutinee),
                            right: boxed(Expr::number(0.0)),
                            span: Span::SYNTHETIC,
                        },
                        value: Some(value),
                        span: Span::SYNTHETIC,
                    }],
                    otherwise: Some(boxed(otherwise)),
                    span: Span::SYNTHETIC,
                }
            }),
        ]
    })
}

fn arb_statement() -> impl Strategy<Value = Statement> {
    (identifier_name(), arb_expr()).prop_map(|(name, value)| {
        Statement::Expr(ExprStatement {
            id: String::new(),
            index: 0,
            expr: Expr::Comparator {
                op: ComparatorOp::Eq,
                left: boxed(Expr::ident(name)),
                right: boxed(value),
                span: Span::SYNTHETIC,
            },
            parameters: None,
            style: None,
            span: Span::SYNTHETIC,
        })
    })
}

fn arb_program() -> impl Strategy<Value = Program> {
    prop::collection::vec(arb_statement(), 1..4).prop_map(|statements| Program {
        statements,
        span: Span::SYNTHETIC,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn printed_programs_reparse_identically(program in arb_program()) {
        let expected = program.normalized();
        for options in ALL_OPTIONS {
            let printed = print_program(&program, &options);
            let reparsed = parse(&printed, &[]);
            prop_assert!(
                reparsed.diagnostics.is_empty(),
                "printed {:?}: {:?}",
                printed,
                reparsed.diagnostics
            );
            prop_assert_eq!(reparsed.program.normalized(), expected.clone(), "printed {:?}", printed);
        }
    }

    #[test]
    fn printing_is_stable(program in arb_program()) {
        let options = PrintOptions::default();
        let once = print_program(&program, &options);
        let again = print_program(&parse(&once, &[]).program, &options);
        prop_assert_eq!(once, again);
    }
}
