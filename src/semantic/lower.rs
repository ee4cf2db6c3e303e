//! AST to semantic lowering
//!
//! Hydrates each statement's style against its kind's schema, converts the
//! statement body to the canonical expression tree, and assembles the
//! semantic item list. Any Error diagnostic produced here nulls the returned
//! state; diagnostics are always returned in full.

use crate::ast::{
    Expr, ExprStatement, Program, RegressionParameters, Statement, StyleMapping,
};
use crate::diagnostics::{Diagnostic, Severity};
use crate::semantic::canonical::{CanonExpr, Coordinate};
use crate::semantic::color::{assign_colors, DEFAULT_PALETTE};
use crate::semantic::state::{
    Color, DragMode, ExpressionItem, FolderItem, ImageItem, Label, LabelOrientation, LineStyle,
    Lines, Points, PointStyle, RegressionData, SemanticItem, SemanticState, Settings, TableColumn,
    TableItem, TextItem, Ticker, Toggle, Viewport,
};
use crate::style::defaults;
use crate::style::eval::{static_eval, ConstValue};
use crate::style::hydrate;
use crate::style::schema::Schema;
use crate::style::value::{StyleProp, StyleValue};

/// Outcome of lowering a whole program
#[derive(Debug)]
pub struct LowerResult {
    /// `None` when any Error diagnostic was produced
    pub state: Option<SemanticState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn program_to_semantic(program: &Program) -> LowerResult {
    let mut lowerer = Lowerer {
        diagnostics: Vec::new(),
    };
    let mut state = SemanticState::empty();
    let mut seen_settings = false;
    let mut seen_ticker = false;

    for statement in &program.statements {
        match statement {
            Statement::Settings(s) => {
                if seen_settings {
                    lowerer.diagnostics.push(Diagnostic::warning(
                        "duplicate settings statement ignored",
                        s.span,
                    ));
                    continue;
                }
                seen_settings = true;
                if let Some(settings) = lowerer.lower_settings(s.style.as_ref()) {
                    state.settings = settings;
                }
            }
            Statement::Ticker(s) => {
                if seen_ticker {
                    lowerer.diagnostics.push(Diagnostic::warning(
                        "duplicate ticker statement ignored",
                        s.span,
                    ));
                    continue;
                }
                seen_ticker = true;
                state.ticker = lowerer.lower_ticker(s);
            }
            other => {
                if let Some(item) = lowerer.lower_item(other, false) {
                    state.items.push(item);
                }
            }
        }
    }

    assign_colors(&mut state.items, &DEFAULT_PALETTE);

    let failed = lowerer
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error);
    LowerResult {
        state: (!failed).then_some(state),
        diagnostics: lowerer.diagnostics,
    }
}

struct Lowerer {
    diagnostics: Vec<Diagnostic>,
}

impl Lowerer {
    fn hydrate_style(
        &mut self,
        mapping: Option<&StyleMapping>,
        defaults: &StyleValue,
        schema: &Schema,
    ) -> Option<StyleValue> {
        hydrate(mapping, defaults, schema, "", &mut self.diagnostics)
    }

    fn lower_item(&mut self, statement: &Statement, inside_folder: bool) -> Option<SemanticItem> {
        match statement {
            Statement::Expr(s) => self.lower_expr_statement(s).map(SemanticItem::Expression),
            Statement::Table(s) => {
                let style = self.hydrate_style(
                    s.style.as_ref(),
                    &defaults::TABLE_DEFAULTS,
                    &defaults::TABLE_SCHEMA,
                )?;
                let mut columns = Vec::with_capacity(s.columns.len());
                for column in &s.columns {
                    if let Some(column) = self.lower_table_column(column) {
                        columns.push(column);
                    }
                }
                Some(SemanticItem::Table(TableItem {
                    id: s.id.clone(),
                    columns,
                    secret: style.boolean("secret").unwrap_or(false),
                    pinned: style.boolean("pinned").unwrap_or(false),
                }))
            }
            Statement::Image(s) => {
                let style = self.hydrate_style(
                    s.style.as_ref(),
                    &defaults::IMAGE_DEFAULTS,
                    &defaults::IMAGE_SCHEMA,
                )?;
                let center = match style.expr("center") {
                    Some(expr) => Some(self.to_canonical(expr)?),
                    None => None,
                };
                Some(SemanticItem::Image(ImageItem {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    url: style.string("url").unwrap_or_default().to_string(),
                    width: style.number("width").unwrap_or(10.0),
                    height: style.number("height").unwrap_or(10.0),
                    angle: style.number("angle").unwrap_or(0.0),
                    opacity: style.number("opacity").unwrap_or(1.0),
                    center,
                    foreground: style.boolean("foreground").unwrap_or(false),
                    draggable: style.boolean("draggable").unwrap_or(false),
                    secret: style.boolean("secret").unwrap_or(false),
                    pinned: style.boolean("pinned").unwrap_or(false),
                }))
            }
            Statement::Text(s) => {
                let style = self.hydrate_style(
                    s.style.as_ref(),
                    &defaults::TEXT_DEFAULTS,
                    &defaults::TEXT_SCHEMA,
                )?;
                Some(SemanticItem::Text(TextItem {
                    id: s.id.clone(),
                    text: s.text.clone(),
                    secret: style.boolean("secret").unwrap_or(false),
                    pinned: style.boolean("pinned").unwrap_or(false),
                }))
            }
            Statement::Folder(s) => {
                if inside_folder {
                    self.diagnostics.push(Diagnostic::error(
                        "folders cannot be nested inside other folders",
                        s.span,
                    ));
                    return None;
                }
                let style = self.hydrate_style(
                    s.style.as_ref(),
                    &defaults::FOLDER_DEFAULTS,
                    &defaults::FOLDER_SCHEMA,
                )?;
                let mut children = Vec::with_capacity(s.children.len());
                for child in &s.children {
                    match child {
                        Statement::Settings(c) => {
                            self.diagnostics.push(Diagnostic::error(
                                "settings must appear at the top level, not inside a folder",
                                c.span,
                            ));
                        }
                        Statement::Ticker(c) => {
                            self.diagnostics.push(Diagnostic::error(
                                "ticker must appear at the top level, not inside a folder",
                                c.span,
                            ));
                        }
                        other => {
                            if let Some(item) = self.lower_item(other, true) {
                                children.push(item);
                            }
                        }
                    }
                }
                Some(SemanticItem::Folder(FolderItem {
                    id: s.id.clone(),
                    title: s.title.clone(),
                    collapsed: style.boolean("collapsed").unwrap_or(false),
                    hidden: style.boolean("hidden").unwrap_or(false),
                    secret: style.boolean("secret").unwrap_or(false),
                    children,
                }))
            }
            // handled by the program loop
            Statement::Settings(_) | Statement::Ticker(_) => None,
        }
    }

    fn lower_expr_statement(&mut self, s: &ExprStatement) -> Option<ExpressionItem> {
        // A top-level `~`, or `resid = lhs ~ rhs`, switches to regression form
        let (body, residual_variable, is_regression) = match &s.expr {
            Expr::Regression { .. } => (&s.expr, None, true),
            Expr::Comparator {
                op: crate::ast::ComparatorOp::Eq,
                left,
                right,
                ..
            } if matches!(right.as_ref(), Expr::Regression { .. }) => match left.as_ref() {
                Expr::Identifier(ident) => (right.as_ref(), Some(ident.name.clone()), true),
                other => {
                    self.diagnostics.push(Diagnostic::error(
                        "a regression residual must be bound to an identifier",
                        other.span(),
                    ));
                    return None;
                }
            },
            _ => (&s.expr, None, false),
        };

        let (schema, item_defaults): (&Schema, &StyleValue) = if is_regression {
            (&defaults::REGRESSION_SCHEMA, &defaults::REGRESSION_DEFAULTS)
        } else {
            (&defaults::EXPRESSION_SCHEMA, &defaults::EXPRESSION_DEFAULTS)
        };
        let style = self.hydrate_style(s.style.as_ref(), item_defaults, schema)?;

        let regression = if is_regression {
            Some(RegressionData {
                parameters: self.lower_parameters(s.parameters.as_ref()),
                residual_variable,
                log_mode: style.boolean("logMode").unwrap_or(false),
            })
        } else {
            if let Some(parameters) = &s.parameters {
                self.diagnostics.push(Diagnostic::error(
                    "a parameter block is only allowed on a regression",
                    parameters.span,
                ));
            }
            None
        };

        let expr = self.to_canonical(body)?;
        let polar_domain = matches!(
            body,
            Expr::Comparator { left, .. } if matches!(left.as_ref(), Expr::Identifier(i) if i.name == "r")
        );

        Some(ExpressionItem {
            id: s.id.clone(),
            expr: Some(expr),
            color: self.lower_color(&style),
            hidden: style.boolean("hidden").unwrap_or(false),
            secret: style.boolean("secret").unwrap_or(false),
            pinned: style.boolean("pinned").unwrap_or(false),
            error_hidden: style.boolean("errorHidden").unwrap_or(false),
            glesmos: style.boolean("glesmos").unwrap_or(false),
            fill_opacity: style.number("fill").unwrap_or(0.0),
            label: self.lower_label(&style),
            lines: self.lower_lines(&style),
            points: self.lower_points(&style),
            domain: match style.get("domain") {
                Some(StyleProp::NumVec(v)) if v.len() == 2 => Some((v[0], v[1])),
                _ => None,
            },
            polar_domain,
            regression,
        })
    }

    fn lower_parameters(&mut self, parameters: Option<&RegressionParameters>) -> Vec<(String, f64)> {
        let Some(parameters) = parameters else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(parameters.entries.len());
        for (name, value) in &parameters.entries {
            let before = self.diagnostics.len();
            match static_eval(value, &mut self.diagnostics) {
                Some(ConstValue::Number(n)) if self.diagnostics.len() == before => {
                    out.push((name.name.clone(), n));
                }
                Some(other) if self.diagnostics.len() == before => {
                    self.diagnostics.push(Diagnostic::error(
                        format!(
                            "regression parameter '{}' must be a number, found {}",
                            name.name,
                            other.category()
                        ),
                        value.span(),
                    ));
                }
                _ => {}
            }
        }
        out
    }

    fn lower_table_column(&mut self, column: &ExprStatement) -> Option<TableColumn> {
        let style = self.hydrate_style(
            column.style.as_ref(),
            &defaults::COLUMN_DEFAULTS,
            &defaults::COLUMN_SCHEMA,
        )?;
        // `a = [1, 2]` carries explicit cells; any other form only a formula
        let (variable, values) = match &column.expr {
            Expr::Comparator {
                op: crate::ast::ComparatorOp::Eq,
                left,
                right,
                ..
            } if matches!(left.as_ref(), Expr::Identifier(_))
                && matches!(right.as_ref(), Expr::List { .. }) =>
            {
                let variable = self.to_canonical(left)?;
                let Expr::List { elements, .. } = right.as_ref() else {
                    unreachable!()
                };
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.to_canonical(element)?);
                }
                (variable, values)
            }
            other => (self.to_canonical(other)?, Vec::new()),
        };
        Some(TableColumn {
            id: column.id.clone(),
            variable,
            values,
            color: self.lower_color(&style),
            hidden: style.boolean("hidden").unwrap_or(false),
            lines: self.lower_lines(&style),
            points: self.lower_points(&style),
        })
    }

    fn lower_settings(&mut self, style: Option<&StyleMapping>) -> Option<Settings> {
        let style = self.hydrate_style(
            style,
            &defaults::SETTINGS_DEFAULTS,
            &defaults::SETTINGS_SCHEMA,
        )?;
        let viewport = style.map("viewport").map(|v| Viewport {
            xmin: v.number("xmin").unwrap_or(-10.0),
            ymin: v.number("ymin").unwrap_or(-10.0),
            xmax: v.number("xmax").unwrap_or(10.0),
            ymax: v.number("ymax").unwrap_or(10.0),
        });
        Some(Settings {
            viewport: viewport.unwrap_or_default(),
            square_axes: style.boolean("squareAxes").unwrap_or(true),
            degree_mode: style.boolean("degreeMode").unwrap_or(false),
            show_grid: style.boolean("showGrid").unwrap_or(true),
            polar_mode: style.boolean("polarMode").unwrap_or(false),
            x_axis_label: style.string("xAxisLabel").unwrap_or_default().to_string(),
            y_axis_label: style.string("yAxisLabel").unwrap_or_default().to_string(),
            random_seed: style.string("randomSeed").unwrap_or_default().to_string(),
        })
    }

    fn lower_ticker(&mut self, s: &crate::ast::TickerStatement) -> Option<Ticker> {
        let style = self.hydrate_style(
            s.style.as_ref(),
            &defaults::TICKER_DEFAULTS,
            &defaults::TICKER_SCHEMA,
        )?;
        let handler = match &s.handler {
            Some(expr) => Some(self.to_canonical(expr)?),
            None => None,
        };
        Some(Ticker {
            id: s.id.clone(),
            handler,
            min_step: style.number("minStep").unwrap_or(0.0),
            playing: style.boolean("playing").unwrap_or(false),
        })
    }

    fn lower_color(&mut self, style: &StyleValue) -> Option<Color> {
        match style.get("color") {
            Some(StyleProp::Expr(Expr::Str { value, .. })) => Some(Color::Hex(value.clone())),
            Some(StyleProp::Expr(expr)) => self.to_canonical(expr).map(Color::Latex),
            Some(StyleProp::Str(s)) if !s.is_empty() => Some(Color::Hex(s.clone())),
            _ => None,
        }
    }

    fn lower_label(&mut self, style: &StyleValue) -> Option<Label> {
        let label = style.map("label")?;
        let text = label.string("text").unwrap_or_default().to_string();
        Some(Label {
            text,
            size: label.number("size").unwrap_or(1.0),
            angle: label.number("angle").unwrap_or(0.0),
            orientation: match label.string("orientation").unwrap_or("default") {
                "center" => LabelOrientation::Center,
                "left" => LabelOrientation::Left,
                "right" => LabelOrientation::Right,
                "above" => LabelOrientation::Above,
                "below" => LabelOrientation::Below,
                _ => LabelOrientation::Default,
            },
        })
    }

    fn lower_lines(&mut self, style: &StyleValue) -> Toggle<Lines> {
        match style.get("lines") {
            None => Toggle::Auto,
            Some(StyleProp::Bool(false)) => Toggle::Off,
            Some(StyleProp::Bool(true)) => Toggle::On(lines_from(&defaults::LINES_DEFAULTS)),
            Some(StyleProp::Map(map)) => Toggle::On(lines_from(map)),
            _ => Toggle::Auto,
        }
    }

    fn lower_points(&mut self, style: &StyleValue) -> Toggle<Points> {
        match style.get("points") {
            None => Toggle::Auto,
            Some(StyleProp::Bool(false)) => Toggle::Off,
            Some(StyleProp::Bool(true)) => Toggle::On(points_from(&defaults::POINTS_DEFAULTS)),
            Some(StyleProp::Map(map)) => Toggle::On(points_from(map)),
            _ => Toggle::Auto,
        }
    }

    fn to_canonical(&mut self, expr: &Expr) -> Option<CanonExpr> {
        expr_to_canonical(expr, &mut self.diagnostics)
    }
}

fn lines_from(map: &StyleValue) -> Lines {
    Lines {
        opacity: map.number("opacity").unwrap_or(0.9),
        width: map.number("width").unwrap_or(2.5),
        style: match map.string("style").unwrap_or("solid") {
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            _ => LineStyle::Solid,
        },
    }
}

fn points_from(map: &StyleValue) -> Points {
    Points {
        opacity: map.number("opacity").unwrap_or(0.9),
        size: map.number("size").unwrap_or(9.0),
        style: match map.string("style").unwrap_or("point") {
            "open" => PointStyle::Open,
            "cross" => PointStyle::Cross,
            _ => PointStyle::Point,
        },
        drag: match map.string("drag").unwrap_or("auto") {
            "none" => DragMode::None,
            "x" => DragMode::X,
            "y" => DragMode::Y,
            "xy" => DragMode::Xy,
            _ => DragMode::Auto,
        },
    }
}

/// Lower a surface expression to the canonical tree.
///
/// Total over the expression grammar except for string literals and
/// non-identifier update-rule targets, which record an Error and yield `None`.
pub fn expr_to_canonical(expr: &Expr, diagnostics: &mut Vec<Diagnostic>) -> Option<CanonExpr> {
    let lower = |e: &Expr, d: &mut Vec<Diagnostic>| expr_to_canonical(e, d);
    let result = match expr {
        Expr::Number { value, .. } => CanonExpr::Number(*value),
        Expr::Identifier(ident) => CanonExpr::Identifier(ident.name.clone()),
        Expr::Str { span, .. } => {
            diagnostics.push(Diagnostic::error(
                "string literals are not allowed inside expressions",
                *span,
            ));
            return None;
        }
        Expr::List { elements, .. } => {
            CanonExpr::List(lower_all(elements, diagnostics)?)
        }
        Expr::Range { start, end, .. } => CanonExpr::Range {
            start: lower_all(start, diagnostics)?,
            end: lower_all(end, diagnostics)?,
        },
        Expr::ListComprehension {
            body, assignments, ..
        } => CanonExpr::ListComprehension {
            body: Box::new(lower(body, diagnostics)?),
            assignments: lower_assignments(assignments, diagnostics)?,
        },
        Expr::Substitution {
            body, assignments, ..
        } => CanonExpr::Substitution {
            body: Box::new(lower(body, diagnostics)?),
            assignments: lower_assignments(assignments, diagnostics)?,
        },
        Expr::Piecewise {
            branches,
            otherwise,
            ..
        } => {
            // fold the branch list into the host's nested shape, back to front
            let mut acc = match otherwise {
                Some(e) => Some(lower(e, diagnostics)?),
                None => None,
            };
            for branch in branches.iter().rev() {
                let consequent = match &branch.value {
                    Some(value) => lower(value, diagnostics)?,
                    // a bare condition is implicitly 1 where it holds
                    None => CanonExpr::Number(1.0),
                };
                acc = Some(CanonExpr::Piecewise {
                    condition: Box::new(lower(&branch.condition, diagnostics)?),
                    consequent: Box::new(consequent),
                    alternate: acc.map(Box::new),
                });
            }
            acc?
        }
        Expr::Negative { arg, .. } => CanonExpr::Negative(Box::new(lower(arg, diagnostics)?)),
        Expr::Factorial { arg, .. } => CanonExpr::Factorial(Box::new(lower(arg, diagnostics)?)),
        Expr::Binary {
            op, left, right, ..
        } => CanonExpr::Binary {
            op: *op,
            left: Box::new(lower(left, diagnostics)?),
            right: Box::new(lower(right, diagnostics)?),
        },
        Expr::Comparator {
            op, left, right, ..
        } => CanonExpr::Comparator {
            op: *op,
            left: Box::new(lower(left, diagnostics)?),
            right: Box::new(lower(right, diagnostics)?),
        },
        Expr::DoubleInequality {
            left,
            left_op,
            middle,
            right_op,
            right,
            ..
        } => CanonExpr::DoubleInequality {
            left: Box::new(lower(left, diagnostics)?),
            left_op: *left_op,
            middle: Box::new(lower(middle, diagnostics)?),
            right_op: *right_op,
            right: Box::new(lower(right, diagnostics)?),
        },
        Expr::Regression { left, right, .. } => CanonExpr::Regression {
            left: Box::new(lower(left, diagnostics)?),
            right: Box::new(lower(right, diagnostics)?),
        },
        Expr::Member {
            object, property, ..
        } => match property.name.as_str() {
            "x" => CanonExpr::OrderedPairAccess {
                point: Box::new(lower(object, diagnostics)?),
                coordinate: Coordinate::X,
            },
            "y" => CanonExpr::OrderedPairAccess {
                point: Box::new(lower(object, diagnostics)?),
                coordinate: Coordinate::Y,
            },
            _ => CanonExpr::DotAccess {
                object: Box::new(lower(object, diagnostics)?),
                property: property.name.clone(),
            },
        },
        Expr::ListAccess { list, index, .. } => CanonExpr::ListAccess {
            list: Box::new(lower(list, diagnostics)?),
            index: Box::new(lower(index, diagnostics)?),
        },
        Expr::Call { callee, args, .. } => match callee.as_ref() {
            // `factorial(x)` and `x!` share one canonical node
            Expr::Identifier(ident) if ident.name == "factorial" && args.len() == 1 => {
                CanonExpr::Factorial(Box::new(lower(&args[0], diagnostics)?))
            }
            Expr::Member {
                object, property, ..
            } => CanonExpr::DotCall {
                object: Box::new(lower(object, diagnostics)?),
                method: property.name.clone(),
                args: lower_all(args, diagnostics)?,
            },
            other => CanonExpr::Call {
                callee: Box::new(lower(other, diagnostics)?),
                args: lower_all(args, diagnostics)?,
            },
        },
        Expr::Prime {
            callee, order, args, ..
        } => CanonExpr::Prime {
            callee: callee.name.clone(),
            order: *order,
            args: lower_all(args, diagnostics)?,
        },
        Expr::Derivative { variable, body, .. } => CanonExpr::Derivative {
            variable: variable.name.clone(),
            body: Box::new(lower(body, diagnostics)?),
        },
        Expr::UpdateRule {
            variable, value, ..
        } => match variable.as_ref() {
            Expr::Identifier(ident) => CanonExpr::UpdateRule {
                variable: ident.name.clone(),
                value: Box::new(lower(value, diagnostics)?),
            },
            other => {
                diagnostics.push(Diagnostic::error(
                    "the left side of '->' must be an identifier",
                    other.span(),
                ));
                return None;
            }
        },
        Expr::Sequence {
            left,
            right,
            parenthesized,
            ..
        } => {
            if *parenthesized {
                CanonExpr::Point {
                    x: Box::new(lower(left, diagnostics)?),
                    y: Box::new(lower(right, diagnostics)?),
                }
            } else {
                CanonExpr::Seq {
                    left: Box::new(lower(left, diagnostics)?),
                    right: Box::new(lower(right, diagnostics)?),
                }
            }
        }
        Expr::Norm { arg, .. } => CanonExpr::Norm(Box::new(lower(arg, diagnostics)?)),
        Expr::Repeated {
            op,
            variable,
            start,
            end,
            body,
            ..
        } => CanonExpr::Repeated {
            op: *op,
            variable: variable.name.clone(),
            start: Box::new(lower(start, diagnostics)?),
            end: Box::new(lower(end, diagnostics)?),
            body: Box::new(lower(body, diagnostics)?),
        },
    };
    Some(result)
}

fn lower_all(exprs: &[Expr], diagnostics: &mut Vec<Diagnostic>) -> Option<Vec<CanonExpr>> {
    let mut out = Vec::with_capacity(exprs.len());
    for expr in exprs {
        out.push(expr_to_canonical(expr, diagnostics)?);
    }
    Some(out)
}

fn lower_assignments(
    assignments: &[crate::ast::AssignmentEntry],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<(String, CanonExpr)>> {
    let mut out = Vec::with_capacity(assignments.len());
    for entry in assignments {
        out.push((
            entry.variable.name.clone(),
            expr_to_canonical(&entry.value, diagnostics)?,
        ));
    }
    Some(out)
}
