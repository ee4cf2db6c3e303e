//! Schema-driven hydration of parsed style mappings
//!
//! Hydration walks a schema, takes the first mapping entry for each key
//! (warning on duplicates), statically evaluates it, and type-checks the
//! result. Absent keys fall back to the defaults table. Unknown keys warn.
//! A type error fails hydration but processing continues so one mapping can
//! report every problem it has.

use crate::ast::{StyleMapping, StyleValueNode};
use crate::diagnostics::Diagnostic;
use crate::style::eval::{static_eval, ConstValue};
use crate::style::schema::{Schema, SchemaType};
use crate::style::value::{StyleProp, StyleValue};

/// Hydrate `mapping` against `schema`, filling absent keys from `defaults`.
///
/// `path` is the dotted prefix for diagnostic messages, empty at the top
/// level. Returns `None` when any entry fails to type-check; warnings alone
/// never fail hydration.
pub fn hydrate(
    mapping: Option<&StyleMapping>,
    defaults: &StyleValue,
    schema: &Schema,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<StyleValue> {
    let mut result = StyleValue::new();
    let mut failed = false;
    let empty_defaults = StyleValue::new();

    for (key, ty) in schema.entries {
        let mut entries = mapping.map(|m| m.entries_named(key));
        let first = entries.as_mut().and_then(|it| it.next());
        if let Some(entries) = entries {
            for extra in entries {
                diagnostics.push(Diagnostic::warning(
                    format!("duplicate property '{path}{key}'"),
                    extra.property.span,
                ));
            }
        }

        let Some(entry) = first else {
            match ty {
                // optional nested mappings stay unset
                SchemaType::Nested {
                    fill_defaults: false,
                    ..
                } => {}
                _ => {
                    if let Some(default) = defaults.get(key) {
                        result.insert(*key, default.clone());
                    }
                }
            }
            continue;
        };

        match ty {
            SchemaType::Nested { schema, or_bool, .. } => match &entry.value {
                StyleValueNode::Map(nested) => {
                    let nested_defaults = defaults.map(key).unwrap_or(&empty_defaults);
                    let nested_path = format!("{path}{key}.");
                    match hydrate(Some(nested), nested_defaults, schema, &nested_path, diagnostics)
                    {
                        Some(value) => result.insert(*key, StyleProp::Map(value)),
                        None => failed = true,
                    }
                }
                StyleValueNode::Expr(expr) => {
                    let before = diagnostics.len();
                    let value = static_eval(expr, diagnostics);
                    if diagnostics.len() > before {
                        failed = true;
                        continue;
                    }
                    match value {
                        Some(ConstValue::Bool(b)) if *or_bool => {
                            result.insert(*key, StyleProp::Bool(b));
                        }
                        _ => {
                            diagnostics.push(Diagnostic::error(
                                if *or_bool {
                                    format!(
                                        "'{path}{key}' expects a nested style mapping or a boolean"
                                    )
                                } else {
                                    format!("'{path}{key}' expects a nested style mapping")
                                },
                                expr.span(),
                            ));
                            failed = true;
                        }
                    }
                }
            },
            SchemaType::Expr | SchemaType::Color => match &entry.value {
                StyleValueNode::Expr(expr) => result.insert(*key, StyleProp::Expr(expr.clone())),
                StyleValueNode::Map(nested) => {
                    diagnostics.push(Diagnostic::error(
                        format!("'{path}{key}' expects an expression"),
                        nested.span,
                    ));
                    failed = true;
                }
            },
            scalar => match &entry.value {
                StyleValueNode::Map(nested) => {
                    diagnostics.push(Diagnostic::error(
                        format!("'{path}{key}' does not take a nested style mapping"),
                        nested.span,
                    ));
                    failed = true;
                }
                StyleValueNode::Expr(expr) => {
                    let before = diagnostics.len();
                    let value = static_eval(expr, diagnostics);
                    if diagnostics.len() > before {
                        failed = true;
                        continue;
                    }
                    match check_scalar(scalar, value, path, key, expr.span(), diagnostics) {
                        Some(prop) => result.insert(*key, prop),
                        None => failed = true,
                    }
                }
            },
        }
    }

    if let Some(mapping) = mapping {
        for entry in &mapping.entries {
            if !schema.contains(&entry.property.name) {
                diagnostics.push(Diagnostic::warning(
                    format!("unknown property '{path}{}'", entry.property.name),
                    entry.property.span,
                ));
            }
        }
    }

    if failed {
        None
    } else {
        Some(result)
    }
}

fn check_scalar(
    ty: &SchemaType,
    value: Option<ConstValue>,
    path: &str,
    key: &str,
    span: crate::ast::Span,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<StyleProp> {
    let value = value?;
    let mismatch = |expected: &str, found: &ConstValue, diagnostics: &mut Vec<Diagnostic>| {
        diagnostics.push(Diagnostic::error(
            format!("'{path}{key}' expects {expected}, found {}", found.category()),
            span,
        ));
        None
    };
    match (ty, value) {
        (SchemaType::Number, ConstValue::Number(n)) => Some(StyleProp::Number(n)),
        (SchemaType::Number, other) => mismatch("a number", &other, diagnostics),
        (SchemaType::Boolean, ConstValue::Bool(b)) => Some(StyleProp::Bool(b)),
        (SchemaType::Boolean, other) => mismatch("a boolean", &other, diagnostics),
        (SchemaType::Str, ConstValue::Str(s)) => Some(StyleProp::Str(s)),
        (SchemaType::Str, other) => mismatch("a string", &other, diagnostics),
        (SchemaType::Enum(options), ConstValue::Str(s)) => {
            if options.contains(&s.as_str()) {
                Some(StyleProp::Str(s))
            } else {
                diagnostics.push(Diagnostic::error(
                    format!("'{path}{key}' expects one of {}", join_options(options)),
                    span,
                ));
                None
            }
        }
        (SchemaType::Enum(options), other) => {
            mismatch(&format!("one of {}", join_options(options)), &other, diagnostics)
        }
        (SchemaType::NumVec(len), ConstValue::NumVec(values)) => {
            if values.len() == *len {
                Some(StyleProp::NumVec(values))
            } else {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "'{path}{key}' expects a list of {len} numbers, found {}",
                        values.len()
                    ),
                    span,
                ));
                None
            }
        }
        (SchemaType::NumVec(len), other) => {
            mismatch(&format!("a list of {len} numbers"), &other, diagnostics)
        }
        // Expr, Color and Nested never reach here
        (_, other) => mismatch("a value", &other, diagnostics),
    }
}

fn join_options(options: &[&str]) -> String {
    options
        .iter()
        .map(|o| format!("'{o}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::defaults::{EXPRESSION_DEFAULTS, EXPRESSION_SCHEMA};

    fn parse_style(source: &str) -> StyleMapping {
        let result = crate::parser::parse(source, &[]);
        assert!(
            result.diagnostics.is_empty(),
            "parse failed: {:?}",
            result.diagnostics
        );
        result.program.statements[0]
            .style()
            .expect("statement has no style mapping")
            .clone()
    }

    fn hydrate_expression(source: &str) -> (Option<StyleValue>, Vec<Diagnostic>) {
        let mapping = parse_style(source);
        let mut diagnostics = Vec::new();
        let value = hydrate(
            Some(&mapping),
            &EXPRESSION_DEFAULTS,
            &EXPRESSION_SCHEMA,
            "",
            &mut diagnostics,
        );
        (value, diagnostics)
    }

    #[test]
    fn test_defaults_fill_absent_keys() {
        let (value, diagnostics) = hydrate_expression("y = x @{hidden: true}");
        assert!(diagnostics.is_empty());
        let value = value.unwrap();
        assert_eq!(value.boolean("hidden"), Some(true));
        assert_eq!(value.boolean("secret"), Some(false));
        assert_eq!(value.number("fill"), Some(0.0));
        // optional nested schema without an explicit value stays unset
        assert!(value.map("lines").is_none());
    }

    #[test]
    fn test_nested_mapping_fills_sibling_defaults() {
        let (value, diagnostics) = hydrate_expression("y = x @{lines: @{width: 5}}");
        assert!(diagnostics.is_empty());
        let lines = value.unwrap().map("lines").cloned().unwrap();
        assert_eq!(lines.number("width"), Some(5.0));
        assert_eq!(lines.string("style"), Some("solid"));
        assert_eq!(lines.number("opacity"), Some(0.9));
    }

    #[test]
    fn test_nested_or_bool_accepts_boolean() {
        let (value, diagnostics) = hydrate_expression("y = x @{points: false}");
        assert!(diagnostics.is_empty());
        assert_eq!(value.unwrap().boolean("points"), Some(false));
    }

    #[test]
    fn test_number_for_nested_key_is_single_error() {
        let (value, diagnostics) = hydrate_expression("y = x @{points: 7}");
        assert!(value.is_none());
        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == crate::diagnostics::Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("points"));
    }

    #[test]
    fn test_unknown_key_warns_but_hydrates() {
        let (value, diagnostics) = hydrate_expression("y = x @{wobble: 1}");
        assert!(value.is_some());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, crate::diagnostics::Severity::Warning);
        assert!(diagnostics[0].message.contains("wobble"));
    }

    #[test]
    fn test_duplicate_key_warns_and_first_wins() {
        let (value, diagnostics) = hydrate_expression("y = x @{fill: 1, fill: 2}");
        let value = value.unwrap();
        assert_eq!(value.number("fill"), Some(1.0));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("duplicate"));
    }

    #[test]
    fn test_type_mismatch_reports_dotted_path() {
        let (value, diagnostics) = hydrate_expression("y = x @{lines: @{width: \"wide\"}}");
        assert!(value.is_none());
        assert!(diagnostics[0].message.contains("lines.width"));
    }

    #[test]
    fn test_enum_rejects_unknown_option() {
        let (value, diagnostics) = hydrate_expression("y = x @{lines: @{style: \"wavy\"}}");
        assert!(value.is_none());
        assert!(diagnostics[0].message.contains("'solid'"));
    }

    #[test]
    fn test_numvec_length_checked() {
        let (value, diagnostics) = hydrate_expression("y = x @{domain: [0, 1, 2]}");
        assert!(value.is_none());
        assert!(diagnostics[0].message.contains("2 numbers"));
    }
}
