//! Canonical to surface-AST raising
//!
//! The reverse of lowering: rebuilds surface expressions and statements (with
//! synthetic spans) from the semantic state so the pretty-printer can render
//! text for a live document. Style mappings are reconstructed with only the
//! properties that differ from the kind's defaults.

use crate::ast::{
    AssignmentEntry, ComparatorOp, Expr, ExprStatement, FolderStatement, Ident, ImageStatement,
    MappingEntry, PiecewiseBranch, Program, RegressionParameters, SettingsStatement, Span,
    Statement, StyleMapping, StyleValueNode, TableStatement, TextStatement, TickerStatement,
};
use crate::semantic::canonical::CanonExpr;
use crate::semantic::state::{
    Color, DragMode, ExpressionItem, FolderItem, ImageItem, Label, LabelOrientation, LineStyle,
    Lines, Points, PointStyle, SemanticItem, SemanticState, Settings, TableColumn, TableItem,
    TextItem, Ticker, Toggle,
};

/// Raise a canonical expression to surface syntax.
///
/// Additionally canonicalizes `c * 10 ^ n` (integer `n`) back to a single
/// scientific-notation number literal.
pub fn canonical_to_expr(canon: &CanonExpr) -> Expr {
    match canon {
        CanonExpr::Number(value) => Expr::number(*value),
        CanonExpr::Identifier(name) => Expr::ident(name.clone()),
        CanonExpr::List(elements) => Expr::List {
            elements: elements.iter().map(canonical_to_expr).collect(),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Range { start, end } => Expr::Range {
            start: start.iter().map(canonical_to_expr).collect(),
            end: end.iter().map(canonical_to_expr).collect(),
            span: Span::SYNTHETIC,
        },
        CanonExpr::ListComprehension { body, assignments } => Expr::ListComprehension {
            body: Box::new(canonical_to_expr(body)),
            assignments: raise_assignments(assignments),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Substitution { body, assignments } => Expr::Substitution {
            body: Box::new(canonical_to_expr(body)),
            assignments: raise_assignments(assignments),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Piecewise { .. } => raise_piecewise(canon),
        CanonExpr::Negative(arg) => Expr::Negative {
            arg: Box::new(canonical_to_expr(arg)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Factorial(arg) => Expr::Factorial {
            arg: Box::new(canonical_to_expr(arg)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Binary { op, left, right } => {
            if let Some(value) = scientific_literal(*op, left, right) {
                return Expr::number(value);
            }
            Expr::Binary {
                op: *op,
                left: Box::new(canonical_to_expr(left)),
                right: Box::new(canonical_to_expr(right)),
                span: Span::SYNTHETIC,
            }
        }
        CanonExpr::Comparator { op, left, right } => Expr::Comparator {
            op: *op,
            left: Box::new(canonical_to_expr(left)),
            right: Box::new(canonical_to_expr(right)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::DoubleInequality {
            left,
            left_op,
            middle,
            right_op,
            right,
        } => Expr::DoubleInequality {
            left: Box::new(canonical_to_expr(left)),
            left_op: *left_op,
            middle: Box::new(canonical_to_expr(middle)),
            right_op: *right_op,
            right: Box::new(canonical_to_expr(right)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::OrderedPairAccess { point, coordinate } => Expr::Member {
            object: Box::new(canonical_to_expr(point)),
            property: Ident::synthetic(coordinate.as_str()),
            span: Span::SYNTHETIC,
        },
        CanonExpr::DotAccess { object, property } => Expr::Member {
            object: Box::new(canonical_to_expr(object)),
            property: Ident::synthetic(property.clone()),
            span: Span::SYNTHETIC,
        },
        CanonExpr::DotCall {
            object,
            method,
            args,
        } => Expr::Call {
            callee: Box::new(Expr::Member {
                object: Box::new(canonical_to_expr(object)),
                property: Ident::synthetic(method.clone()),
                span: Span::SYNTHETIC,
            }),
            args: args.iter().map(canonical_to_expr).collect(),
            span: Span::SYNTHETIC,
        },
        CanonExpr::ListAccess { list, index } => Expr::ListAccess {
            list: Box::new(canonical_to_expr(list)),
            index: Box::new(canonical_to_expr(index)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Call { callee, args } => Expr::Call {
            callee: Box::new(canonical_to_expr(callee)),
            args: args.iter().map(canonical_to_expr).collect(),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Prime {
            callee,
            order,
            args,
        } => Expr::Prime {
            callee: Ident::synthetic(callee.clone()),
            order: *order,
            args: args.iter().map(canonical_to_expr).collect(),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Derivative { variable, body } => Expr::Derivative {
            variable: Ident::synthetic(variable.clone()),
            body: Box::new(canonical_to_expr(body)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::UpdateRule { variable, value } => Expr::UpdateRule {
            variable: Box::new(Expr::ident(variable.clone())),
            value: Box::new(canonical_to_expr(value)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Point { x, y } => Expr::Sequence {
            left: Box::new(canonical_to_expr(x)),
            right: Box::new(canonical_to_expr(y)),
            parenthesized: true,
            span: Span::SYNTHETIC,
        },
        CanonExpr::Seq { left, right } => Expr::Sequence {
            left: Box::new(canonical_to_expr(left)),
            right: Box::new(canonical_to_expr(right)),
            parenthesized: false,
            span: Span::SYNTHETIC,
        },
        CanonExpr::Norm(arg) => Expr::Norm {
            arg: Box::new(canonical_to_expr(arg)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Regression { left, right } => Expr::Regression {
            left: Box::new(canonical_to_expr(left)),
            right: Box::new(canonical_to_expr(right)),
            span: Span::SYNTHETIC,
        },
        CanonExpr::Repeated {
            op,
            variable,
            start,
            end,
            body,
        } => Expr::Repeated {
            op: *op,
            variable: Ident::synthetic(variable.clone()),
            start: Box::new(canonical_to_expr(start)),
            end: Box::new(canonical_to_expr(end)),
            body: Box::new(canonical_to_expr(body)),
            span: Span::SYNTHETIC,
        },
    }
}

fn scientific_literal(op: crate::ast::BinaryOp, left: &CanonExpr, right: &CanonExpr) -> Option<f64> {
    if op != crate::ast::BinaryOp::Mul {
        return None;
    }
    let CanonExpr::Number(mantissa) = left else {
        return None;
    };
    let CanonExpr::Binary {
        op: crate::ast::BinaryOp::Pow,
        left: base,
        right: exponent,
    } = right
    else {
        return None;
    };
    match (base.as_ref(), exponent.as_ref()) {
        (CanonExpr::Number(base), CanonExpr::Number(exp))
            if *base == 10.0 && exp.fract() == 0.0 =>
        {
            Some(mantissa * 10f64.powf(*exp))
        }
        _ => None,
    }
}

fn raise_piecewise(canon: &CanonExpr) -> Expr {
    let mut branches = Vec::new();
    let mut otherwise = None;
    let mut current = canon;
    loop {
        let CanonExpr::Piecewise {
            condition,
            consequent,
            alternate,
        } = current
        else {
            otherwise = Some(Box::new(canonical_to_expr(current)));
            break;
        };
        // a consequent of exactly 1 prints back as a bare condition
        let value = match consequent.as_ref() {
            CanonExpr::Number(n) if *n == 1.0 => None,
            other => Some(canonical_to_expr(other)),
        };
        branches.push(PiecewiseBranch {
            condition: canonical_to_expr(condition),
            value,
            span: Span::SYNTHETIC,
        });
        match alternate {
            Some(next) => current = next,
            None => break,
        }
    }
    Expr::Piecewise {
        branches,
        otherwise,
        span: Span::SYNTHETIC,
    }
}

fn raise_assignments(assignments: &[(String, CanonExpr)]) -> Vec<AssignmentEntry> {
    assignments
        .iter()
        .map(|(name, value)| AssignmentEntry {
            variable: Ident::synthetic(name.clone()),
            value: canonical_to_expr(value),
            span: Span::SYNTHETIC,
        })
        .collect()
}

/// Rebuild a whole surface program from the semantic state.
pub fn semantic_to_program(state: &SemanticState) -> Program {
    let mut raiser = Raiser { next_index: 0 };
    let mut statements = Vec::new();
    if state.settings != Settings::default() {
        statements.push(raiser.raise_settings(&state.settings));
    }
    if let Some(ticker) = &state.ticker {
        statements.push(raiser.raise_ticker(ticker));
    }
    for item in &state.items {
        statements.push(raiser.raise_item(item));
    }
    Program {
        statements,
        span: Span::SYNTHETIC,
    }
}

struct Raiser {
    next_index: usize,
}

impl Raiser {
    fn take_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    fn raise_item(&mut self, item: &SemanticItem) -> Statement {
        match item {
            SemanticItem::Expression(item) => Statement::Expr(self.raise_expression(item)),
            SemanticItem::Table(item) => Statement::Table(self.raise_table(item)),
            SemanticItem::Image(item) => Statement::Image(self.raise_image(item)),
            SemanticItem::Text(item) => Statement::Text(self.raise_text(item)),
            SemanticItem::Folder(item) => Statement::Folder(self.raise_folder(item)),
        }
    }

    fn raise_expression(&mut self, item: &ExpressionItem) -> ExprStatement {
        let index = self.take_index();
        let expr = match &item.expr {
            Some(canon) => {
                let raised = canonical_to_expr(canon);
                match (&item.regression, canon) {
                    (Some(regression), CanonExpr::Regression { .. }) => {
                        match &regression.residual_variable {
                            Some(residual) => Expr::Comparator {
                                op: ComparatorOp::Eq,
                                left: Box::new(Expr::ident(residual.clone())),
                                right: Box::new(raised),
                                span: Span::SYNTHETIC,
                            },
                            None => raised,
                        }
                    }
                    _ => raised,
                }
            }
            None => Expr::number(0.0),
        };

        let mut entries = Vec::new();
        push_color(&mut entries, &item.color);
        push_bool(&mut entries, "hidden", item.hidden, false);
        push_bool(&mut entries, "secret", item.secret, false);
        push_bool(&mut entries, "pinned", item.pinned, false);
        push_bool(&mut entries, "errorHidden", item.error_hidden, false);
        push_bool(&mut entries, "glesmos", item.glesmos, false);
        push_number(&mut entries, "fill", item.fill_opacity, 0.0);
        if let Some(label) = &item.label {
            entries.push(map_entry("label", label_entries(label)));
        }
        push_lines(&mut entries, &item.lines);
        push_points(&mut entries, &item.points);
        if let Some((lo, hi)) = item.domain {
            entries.push(entry(
                "domain",
                Expr::List {
                    elements: vec![Expr::number(lo), Expr::number(hi)],
                    span: Span::SYNTHETIC,
                },
            ));
        }
        if let Some(regression) = &item.regression {
            push_bool(&mut entries, "logMode", regression.log_mode, false);
        }

        let parameters = item.regression.as_ref().and_then(|regression| {
            if regression.parameters.is_empty() {
                return None;
            }
            Some(RegressionParameters {
                entries: regression
                    .parameters
                    .iter()
                    .map(|(name, value)| (Ident::synthetic(name.clone()), Expr::number(*value)))
                    .collect(),
                span: Span::SYNTHETIC,
            })
        });

        ExprStatement {
            id: item.id.clone(),
            index,
            expr,
            parameters,
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_table(&mut self, item: &TableItem) -> TableStatement {
        let index = self.take_index();
        let mut entries = Vec::new();
        push_bool(&mut entries, "secret", item.secret, false);
        push_bool(&mut entries, "pinned", item.pinned, false);
        TableStatement {
            id: item.id.clone(),
            index,
            columns: item
                .columns
                .iter()
                .map(|column| self.raise_column(column))
                .collect(),
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_column(&mut self, column: &TableColumn) -> ExprStatement {
        let index = self.take_index();
        let variable = canonical_to_expr(&column.variable);
        let expr = if column.values.is_empty() {
            variable
        } else {
            Expr::Comparator {
                op: ComparatorOp::Eq,
                left: Box::new(variable),
                right: Box::new(Expr::List {
                    elements: column.values.iter().map(canonical_to_expr).collect(),
                    span: Span::SYNTHETIC,
                }),
                span: Span::SYNTHETIC,
            }
        };
        let mut entries = Vec::new();
        push_color(&mut entries, &column.color);
        push_bool(&mut entries, "hidden", column.hidden, false);
        push_lines(&mut entries, &column.lines);
        push_points(&mut entries, &column.points);
        ExprStatement {
            id: column.id.clone(),
            index,
            expr,
            parameters: None,
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_image(&mut self, item: &ImageItem) -> ImageStatement {
        let index = self.take_index();
        let mut entries = Vec::new();
        if !item.url.is_empty() {
            entries.push(entry("url", Expr::string(item.url.clone())));
        }
        push_number(&mut entries, "width", item.width, 10.0);
        push_number(&mut entries, "height", item.height, 10.0);
        push_number(&mut entries, "angle", item.angle, 0.0);
        push_number(&mut entries, "opacity", item.opacity, 1.0);
        if let Some(center) = &item.center {
            entries.push(entry("center", canonical_to_expr(center)));
        }
        push_bool(&mut entries, "foreground", item.foreground, false);
        push_bool(&mut entries, "draggable", item.draggable, false);
        push_bool(&mut entries, "secret", item.secret, false);
        push_bool(&mut entries, "pinned", item.pinned, false);
        ImageStatement {
            id: item.id.clone(),
            index,
            name: item.name.clone(),
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_text(&mut self, item: &TextItem) -> TextStatement {
        let index = self.take_index();
        let mut entries = Vec::new();
        push_bool(&mut entries, "secret", item.secret, false);
        push_bool(&mut entries, "pinned", item.pinned, false);
        TextStatement {
            id: item.id.clone(),
            index,
            text: item.text.clone(),
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_folder(&mut self, item: &FolderItem) -> FolderStatement {
        let index = self.take_index();
        let mut entries = Vec::new();
        push_bool(&mut entries, "collapsed", item.collapsed, false);
        push_bool(&mut entries, "hidden", item.hidden, false);
        push_bool(&mut entries, "secret", item.secret, false);
        FolderStatement {
            id: item.id.clone(),
            index,
            title: item.title.clone(),
            children: item
                .children
                .iter()
                .map(|child| self.raise_item(child))
                .collect(),
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        }
    }

    fn raise_settings(&mut self, settings: &Settings) -> Statement {
        let index = self.take_index();
        let defaults = Settings::default();
        let mut entries = Vec::new();
        if settings.viewport != defaults.viewport {
            let mut viewport = Vec::new();
            push_number(&mut viewport, "xmin", settings.viewport.xmin, -10.0);
            push_number(&mut viewport, "ymin", settings.viewport.ymin, -10.0);
            push_number(&mut viewport, "xmax", settings.viewport.xmax, 10.0);
            push_number(&mut viewport, "ymax", settings.viewport.ymax, 10.0);
            entries.push(map_entry("viewport", viewport));
        }
        push_bool(&mut entries, "squareAxes", settings.square_axes, true);
        push_bool(&mut entries, "degreeMode", settings.degree_mode, false);
        push_bool(&mut entries, "showGrid", settings.show_grid, true);
        push_bool(&mut entries, "polarMode", settings.polar_mode, false);
        push_str(&mut entries, "xAxisLabel", &settings.x_axis_label, "");
        push_str(&mut entries, "yAxisLabel", &settings.y_axis_label, "");
        push_str(&mut entries, "randomSeed", &settings.random_seed, "");
        Statement::Settings(SettingsStatement {
            id: String::new(),
            index,
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        })
    }

    fn raise_ticker(&mut self, ticker: &Ticker) -> Statement {
        let index = self.take_index();
        let mut entries = Vec::new();
        push_number(&mut entries, "minStep", ticker.min_step, 0.0);
        push_bool(&mut entries, "playing", ticker.playing, false);
        Statement::Ticker(TickerStatement {
            id: ticker.id.clone(),
            index,
            handler: ticker.handler.as_ref().map(canonical_to_expr),
            style: mapping_from(entries),
            span: Span::SYNTHETIC,
        })
    }
}

fn entry(name: &str, value: Expr) -> MappingEntry {
    MappingEntry {
        property: Ident::synthetic(name),
        value: StyleValueNode::Expr(value),
    }
}

fn map_entry(name: &str, entries: Vec<MappingEntry>) -> MappingEntry {
    MappingEntry {
        property: Ident::synthetic(name),
        value: StyleValueNode::Map(StyleMapping {
            entries,
            span: Span::SYNTHETIC,
        }),
    }
}

fn mapping_from(entries: Vec<MappingEntry>) -> Option<StyleMapping> {
    if entries.is_empty() {
        None
    } else {
        Some(StyleMapping {
            entries,
            span: Span::SYNTHETIC,
        })
    }
}

fn push_bool(entries: &mut Vec<MappingEntry>, name: &str, value: bool, default: bool) {
    if value != default {
        entries.push(entry(name, Expr::ident(if value { "true" } else { "false" })));
    }
}

fn push_number(entries: &mut Vec<MappingEntry>, name: &str, value: f64, default: f64) {
    if value != default {
        let expr = if value < 0.0 {
            Expr::Negative {
                arg: Box::new(Expr::number(-value)),
                span: Span::SYNTHETIC,
            }
        } else {
            Expr::number(value)
        };
        entries.push(entry(name, expr));
    }
}

fn push_str(entries: &mut Vec<MappingEntry>, name: &str, value: &str, default: &str) {
    if value != default {
        entries.push(entry(name, Expr::string(value)));
    }
}

fn push_color(entries: &mut Vec<MappingEntry>, color: &Option<Color>) {
    match color {
        Some(Color::Hex(hex)) => entries.push(entry("color", Expr::string(hex.clone()))),
        Some(Color::Latex(expr)) => entries.push(entry("color", canonical_to_expr(expr))),
        None => {}
    }
}

fn push_lines(entries: &mut Vec<MappingEntry>, lines: &Toggle<Lines>) {
    match lines {
        Toggle::Auto => {}
        Toggle::Off => entries.push(entry("lines", Expr::ident("false"))),
        Toggle::On(lines) => {
            let mut nested = Vec::new();
            push_number(&mut nested, "opacity", lines.opacity, 0.9);
            push_number(&mut nested, "width", lines.width, 2.5);
            let style = match lines.style {
                LineStyle::Solid => "solid",
                LineStyle::Dashed => "dashed",
                LineStyle::Dotted => "dotted",
            };
            push_str(&mut nested, "style", style, "solid");
            if nested.is_empty() {
                entries.push(entry("lines", Expr::ident("true")));
            } else {
                entries.push(map_entry("lines", nested));
            }
        }
    }
}

fn push_points(entries: &mut Vec<MappingEntry>, points: &Toggle<Points>) {
    match points {
        Toggle::Auto => {}
        Toggle::Off => entries.push(entry("points", Expr::ident("false"))),
        Toggle::On(points) => {
            let mut nested = Vec::new();
            push_number(&mut nested, "opacity", points.opacity, 0.9);
            push_number(&mut nested, "size", points.size, 9.0);
            let style = match points.style {
                PointStyle::Point => "point",
                PointStyle::Open => "open",
                PointStyle::Cross => "cross",
            };
            push_str(&mut nested, "style", style, "point");
            let drag = match points.drag {
                DragMode::None => "none",
                DragMode::X => "x",
                DragMode::Y => "y",
                DragMode::Xy => "xy",
                DragMode::Auto => "auto",
            };
            push_str(&mut nested, "drag", drag, "auto");
            if nested.is_empty() {
                entries.push(entry("points", Expr::ident("true")));
            } else {
                entries.push(map_entry("points", nested));
            }
        }
    }
}

fn label_entries(label: &Label) -> Vec<MappingEntry> {
    let mut nested = Vec::new();
    push_str(&mut nested, "text", &label.text, "");
    push_number(&mut nested, "size", label.size, 1.0);
    push_number(&mut nested, "angle", label.angle, 0.0);
    let orientation = match label.orientation {
        LabelOrientation::Default => "default",
        LabelOrientation::Center => "center",
        LabelOrientation::Left => "left",
        LabelOrientation::Right => "right",
        LabelOrientation::Above => "above",
        LabelOrientation::Below => "below",
    };
    push_str(&mut nested, "orientation", orientation, "default");
    nested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    #[test]
    fn test_scientific_notation_canonicalized() {
        let canon = CanonExpr::Binary {
            op: BinaryOp::Mul,
            left: Box::new(CanonExpr::Number(2.5)),
            right: Box::new(CanonExpr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(CanonExpr::Number(10.0)),
                right: Box::new(CanonExpr::Number(3.0)),
            }),
        };
        assert_eq!(canonical_to_expr(&canon), Expr::number(2500.0));
    }

    #[test]
    fn test_non_integer_exponent_not_canonicalized() {
        let canon = CanonExpr::Binary {
            op: BinaryOp::Mul,
            left: Box::new(CanonExpr::Number(2.5)),
            right: Box::new(CanonExpr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(CanonExpr::Number(10.0)),
                right: Box::new(CanonExpr::Number(0.5)),
            }),
        };
        assert!(matches!(canonical_to_expr(&canon), Expr::Binary { .. }));
    }

    #[test]
    fn test_piecewise_round_trips_through_canonical() {
        let mut diagnostics = Vec::new();
        let parsed = crate::parser::parse("{x > 0: 5, 2}", &[]);
        // compare shapes, not spans
        let normalized = parsed.program.normalized();
        let crate::ast::Statement::Expr(statement) = &normalized.statements[0] else {
            panic!("expected expression statement");
        };
        let canon =
            crate::semantic::lower::expr_to_canonical(&statement.expr, &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(canonical_to_expr(&canon), statement.expr);
    }

    #[test]
    fn test_ordered_pair_access_raises_to_member() {
        let canon = CanonExpr::OrderedPairAccess {
            point: Box::new(CanonExpr::ident("p")),
            coordinate: crate::semantic::canonical::Coordinate::Y,
        };
        let Expr::Member { property, .. } = canonical_to_expr(&canon) else {
            panic!("expected member access");
        };
        assert_eq!(property.name, "y");
    }
}
