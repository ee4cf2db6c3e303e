//! End-to-end pipeline coverage: source through the wire document and back

use insta::assert_snapshot;
use rstest::rstest;

use textmode::diagnostics::has_errors;
use textmode::pipeline::{compile, decompile, parse};
use textmode::printer::{print_program, PrintOptions};
use textmode::semantic::CanonExpr;
use textmode::wire::types::WireItem;
use textmode::wire::LatexParser;

#[test]
fn test_minimal_wire_document() {
    let result = compile("1", &[]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let wire = result.wire.expect("wire output");
    let json = serde_json::to_string(&wire).expect("serialize");
    assert_eq!(
        json,
        r##"{"version":11,"graph":{"viewport":{"xmin":-10.0,"ymin":-10.0,"xmax":10.0,"ymax":10.0}},"expressions":{"list":[{"type":"expression","id":"1","latex":"1","color":"#c74440"}]}}"##
    );
}

#[test]
fn test_compact_formatting() {
    let parsed = parse("y  =  x ^ 2\n\n\n\nz = y + 1 // note", &[]);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let options = PrintOptions {
        suppress_spaces: true,
        suppress_newlines: true,
    };
    assert_snapshot!(print_program(&parsed.program, &options), @"y=x^2;z=y+1");
}

#[test]
fn test_default_formatting() {
    let parsed = parse("y=x^2;z=y+1", &[]);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let formatted = print_program(&parsed.program, &PrintOptions::default());
    assert_snapshot!(formatted, @r"
    y = x ^ 2

    z = y + 1
    ");
}

#[test]
fn test_color_cycle_skips_explicit_colors() {
    let result = compile("a = 1\n\nb = 2 @{color: \"#c74440\"}\n\nc = 3", &[]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let wire = result.wire.expect("wire output");
    let colors: Vec<_> = wire
        .expressions
        .list
        .iter()
        .map(|item| {
            let WireItem::Expression(expression) = item else {
                panic!("expected expression");
            };
            expression.color.as_deref().expect("color assigned")
        })
        .collect();
    // the automatic cycle never hands out the explicitly used palette entry
    assert_eq!(colors, vec!["#2d70b3", "#c74440", "#388c46"]);
}

#[test]
fn test_comments_and_spacing_do_not_change_the_wire() {
    let a = compile("y = x // graph it\n\nz = 2", &[]);
    let b = compile("y=x\n\n\n\nz   =   2", &[]);
    assert_eq!(a.wire, b.wire);
    assert!(a.wire.is_some());
}

#[test]
fn test_bad_style_value_is_one_error_naming_the_property() {
    let result = compile("y = x @{points: 7}", &[]);
    let errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == textmode::Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1, "{:?}", result.diagnostics);
    assert!(errors[0].message.contains("points"), "{:?}", errors[0]);
    assert!(result.wire.is_none());
}

#[rstest]
#[case::bad_style_value("y = x @{points: 7}")]
#[case::chain_through_equals("r = 2 < x < 5")]
#[case::mixed_direction_chain("2 < x > 5")]
#[case::unterminated_string("\"oops")]
fn invalid_sources_report_errors_and_suppress_output(#[case] source: &str) {
    let result = compile(source, &[]);
    assert!(has_errors(&result.diagnostics), "{:?}", result.diagnostics);
    assert!(result.wire.is_none());
}

#[test]
fn test_ticker_reaches_the_wire() {
    let result = compile("ticker a -> a + 1", &[]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let wire = result.wire.expect("wire output");
    let ticker = wire.expressions.ticker.expect("ticker");
    assert!(ticker.handler_latex.is_some());
}

struct NumbersOnly;

impl LatexParser for NumbersOnly {
    fn parse_latex(&self, latex: &str) -> Result<CanonExpr, String> {
        latex
            .parse::<f64>()
            .map(CanonExpr::Number)
            .map_err(|_| format!("unsupported: {}", latex))
    }
}

#[test]
fn test_decompile_preserves_document_structure() {
    let compiled = compile("folder \"data\" { 1\n\n2 }", &[]);
    let wire = compiled.wire.expect("wire output");
    let (source, diagnostics) = decompile(&wire, &NumbersOnly, &PrintOptions::default());
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(
        source,
        "folder \"data\" {\n    1 @{color: \"#c74440\"}\n\n    2 @{color: \"#2d70b3\"}\n}\n"
    );
    // and the regenerated source is itself a clean document
    let reparsed = parse(&source, &[]);
    assert!(reparsed.diagnostics.is_empty(), "{:?}", reparsed.diagnostics);
}

#[test]
fn test_unparseable_latex_degrades_per_expression() {
    let compiled = compile("1\n\ny = x", &[]);
    let wire = compiled.wire.expect("wire output");
    let (source, diagnostics) = decompile(&wire, &NumbersOnly, &PrintOptions::default());
    // the stub rejects "y=x"; that costs one diagnostic, not the document
    assert_eq!(diagnostics.len(), 1);
    let reparsed = parse(&source, &[]);
    assert!(reparsed.diagnostics.is_empty(), "{:?}", reparsed.diagnostics);
    assert_eq!(reparsed.program.statements.len(), 2);
}
