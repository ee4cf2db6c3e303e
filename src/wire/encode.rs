//! Semantic state to wire document

use crate::semantic::state::{
    Color, DragMode, ExpressionItem, FolderItem, ImageItem, LineStyle, Lines, PointStyle, Points,
    SemanticItem, SemanticState, TableColumn, TableItem, TextItem, Toggle,
};
use crate::wire::latex::{format_number, latex_of};
use crate::wire::metadata::{self, ItemMetadata, Metadata, METADATA_FOLDER_ID, METADATA_ID};
use crate::wire::types::{
    WireDomain, WireExpression, WireExpressions, WireFolder, WireGraph, WireImage, WireItem,
    WireState, WireTable, WireTableColumn, WireText, WireTicker, WireViewport, WIRE_VERSION,
};

pub fn semantic_to_wire(state: &SemanticState) -> WireState {
    let mut encoder = Encoder {
        list: Vec::new(),
        metadata: Metadata::default(),
    };
    for item in &state.items {
        encoder.push_item(item, None);
    }
    encoder.append_metadata_items();

    let settings = &state.settings;
    WireState {
        version: WIRE_VERSION,
        random_seed: (!settings.random_seed.is_empty()).then(|| settings.random_seed.clone()),
        graph: WireGraph {
            viewport: WireViewport {
                xmin: settings.viewport.xmin,
                ymin: settings.viewport.ymin,
                xmax: settings.viewport.xmax,
                ymax: settings.viewport.ymax,
            },
            square_axes: (!settings.square_axes).then_some(false),
            degree_mode: settings.degree_mode.then_some(true),
            show_grid: (!settings.show_grid).then_some(false),
            polar_mode: settings.polar_mode.then_some(true),
            x_axis_label: (!settings.x_axis_label.is_empty())
                .then(|| settings.x_axis_label.clone()),
            y_axis_label: (!settings.y_axis_label.is_empty())
                .then(|| settings.y_axis_label.clone()),
        },
        expressions: WireExpressions {
            list: encoder.list,
            ticker: state.ticker.as_ref().map(|ticker| WireTicker {
                handler_latex: ticker.handler.as_ref().map(latex_of),
                min_step_latex: (ticker.min_step != 0.0)
                    .then(|| format_number(ticker.min_step)),
                playing: ticker.playing.then_some(true),
            }),
        },
    }
}

struct Encoder {
    list: Vec<WireItem>,
    metadata: Metadata,
}

impl Encoder {
    fn push_item(&mut self, item: &SemanticItem, folder_id: Option<&str>) {
        match item {
            SemanticItem::Expression(item) => {
                let wire = self.encode_expression(item, folder_id);
                self.list.push(WireItem::Expression(wire));
            }
            SemanticItem::Table(item) => {
                let wire = self.encode_table(item, folder_id);
                self.list.push(WireItem::Table(wire));
            }
            SemanticItem::Image(item) => {
                let wire = self.encode_image(item, folder_id);
                self.list.push(WireItem::Image(wire));
            }
            SemanticItem::Text(item) => {
                let wire = self.encode_text(item, folder_id);
                self.list.push(WireItem::Text(wire));
            }
            SemanticItem::Folder(item) => self.push_folder(item),
        }
    }

    // one level of nesting flattens to folderId back-references
    fn push_folder(&mut self, folder: &FolderItem) {
        self.list.push(WireItem::Folder(WireFolder {
            id: folder.id.clone(),
            title: folder.title.clone(),
            collapsed: folder.collapsed.then_some(true),
            hidden: folder.hidden.then_some(true),
            secret: folder.secret.then_some(true),
        }));
        for child in &folder.children {
            self.push_item(child, Some(&folder.id));
        }
    }

    fn encode_expression(
        &mut self,
        item: &ExpressionItem,
        folder_id: Option<&str>,
    ) -> WireExpression {
        self.metadata.set(
            &item.id,
            ItemMetadata {
                pinned: item.pinned,
                error_hidden: item.error_hidden,
                glesmos: item.glesmos,
            },
        );
        let (color, color_latex) = split_color(&item.color);
        let lines = LineFields::from_toggle(&item.lines);
        let points = PointFields::from_toggle(&item.points);
        let domain = item.domain.map(|(min, max)| WireDomain {
            min: format_number(min),
            max: format_number(max),
        });
        let (parametric_domain, polar_domain) = if item.polar_domain {
            (None, domain)
        } else {
            (domain, None)
        };
        WireExpression {
            id: item.id.clone(),
            folder_id: folder_id.map(str::to_string),
            latex: item.expr.as_ref().map(latex_of),
            color,
            color_latex,
            hidden: item.hidden.then_some(true),
            secret: item.secret.then_some(true),
            fill: (item.fill_opacity != 0.0).then_some(true),
            fill_opacity: (item.fill_opacity != 0.0).then(|| format_number(item.fill_opacity)),
            lines: lines.shown,
            line_opacity: lines.opacity,
            line_width: lines.width,
            line_style: lines.style,
            points: points.shown,
            point_opacity: points.opacity,
            point_size: points.size,
            point_style: points.style,
            drag_mode: points.drag,
            label: item.label.as_ref().map(|label| label.text.clone()),
            show_label: item.label.is_some().then_some(true),
            label_size: item
                .label
                .as_ref()
                .filter(|label| label.size != 1.0)
                .map(|label| format_number(label.size)),
            label_angle: item
                .label
                .as_ref()
                .filter(|label| label.angle != 0.0)
                .map(|label| format_number(label.angle)),
            label_orientation: item.label.as_ref().and_then(|label| {
                use crate::semantic::state::LabelOrientation as O;
                match label.orientation {
                    O::Default => None,
                    O::Center => Some("center".to_string()),
                    O::Left => Some("left".to_string()),
                    O::Right => Some("right".to_string()),
                    O::Above => Some("above".to_string()),
                    O::Below => Some("below".to_string()),
                }
            }),
            parametric_domain,
            polar_domain,
            residual_variable: item
                .regression
                .as_ref()
                .and_then(|r| r.residual_variable.as_deref())
                .map(crate::wire::latex::identifier),
            log_mode: item
                .regression
                .as_ref()
                .and_then(|r| r.log_mode.then_some(true)),
            regression_parameters: item.regression.as_ref().and_then(|r| {
                if r.parameters.is_empty() {
                    return None;
                }
                Some(r.parameters.iter().cloned().collect())
            }),
        }
    }

    fn encode_table(&mut self, item: &TableItem, folder_id: Option<&str>) -> WireTable {
        self.metadata.set(
            &item.id,
            ItemMetadata {
                pinned: item.pinned,
                ..Default::default()
            },
        );
        let rows = item
            .columns
            .iter()
            .map(|column| column.values.len())
            .max()
            .unwrap_or(0)
            .max(1);
        let mut columns: Vec<WireTableColumn> = item
            .columns
            .iter()
            .map(|column| self.encode_column(column, rows))
            .collect();
        // the host format requires at least two columns
        while columns.len() < 2 {
            columns.push(WireTableColumn {
                id: format!("{}-col-{}", item.id, columns.len() + 1),
                latex: String::new(),
                values: vec![String::new(); rows],
                ..Default::default()
            });
        }
        WireTable {
            id: item.id.clone(),
            folder_id: folder_id.map(str::to_string),
            columns,
            secret: item.secret.then_some(true),
        }
    }

    fn encode_column(&mut self, column: &TableColumn, rows: usize) -> WireTableColumn {
        let (color, color_latex) = split_color(&column.color);
        let lines = LineFields::from_toggle(&column.lines);
        let points = PointFields::from_toggle(&column.points);
        let mut values: Vec<String> = column.values.iter().map(latex_of).collect();
        while values.len() < rows {
            values.push(String::new());
        }
        WireTableColumn {
            id: column.id.clone(),
            latex: latex_of(&column.variable),
            values,
            color,
            color_latex,
            hidden: column.hidden.then_some(true),
            lines: lines.shown,
            line_opacity: lines.opacity,
            line_width: lines.width,
            line_style: lines.style,
            points: points.shown,
            point_opacity: points.opacity,
            point_size: points.size,
            point_style: points.style,
            drag_mode: points.drag,
        }
    }

    fn encode_image(&mut self, item: &ImageItem, folder_id: Option<&str>) -> WireImage {
        self.metadata.set(
            &item.id,
            ItemMetadata {
                pinned: item.pinned,
                ..Default::default()
            },
        );
        WireImage {
            id: item.id.clone(),
            folder_id: folder_id.map(str::to_string),
            name: item.name.clone(),
            image_url: item.url.clone(),
            width: Some(format_number(item.width)),
            height: Some(format_number(item.height)),
            angle: (item.angle != 0.0).then(|| format_number(item.angle)),
            opacity: (item.opacity != 1.0).then(|| format_number(item.opacity)),
            center: item.center.as_ref().map(latex_of),
            foreground: item.foreground.then_some(true),
            draggable: item.draggable.then_some(true),
            secret: item.secret.then_some(true),
        }
    }

    fn encode_text(&mut self, item: &TextItem, folder_id: Option<&str>) -> WireText {
        self.metadata.set(
            &item.id,
            ItemMetadata {
                pinned: item.pinned,
                ..Default::default()
            },
        );
        WireText {
            id: item.id.clone(),
            folder_id: folder_id.map(str::to_string),
            text: item.text.clone(),
            secret: item.secret.then_some(true),
        }
    }

    fn append_metadata_items(&mut self) {
        if self.metadata.is_empty() {
            return;
        }
        self.list.push(WireItem::Folder(WireFolder {
            id: METADATA_FOLDER_ID.to_string(),
            title: String::new(),
            collapsed: Some(true),
            hidden: None,
            secret: Some(true),
        }));
        self.list.push(WireItem::Text(WireText {
            id: METADATA_ID.to_string(),
            folder_id: Some(METADATA_FOLDER_ID.to_string()),
            text: metadata::to_text(&self.metadata),
            secret: Some(true),
        }));
    }
}

fn split_color(color: &Option<Color>) -> (Option<String>, Option<String>) {
    match color {
        Some(Color::Hex(hex)) => (Some(hex.clone()), None),
        // computed colors still need a fallback in the plain color field
        Some(Color::Latex(expr)) => (Some("#000000".to_string()), Some(latex_of(expr))),
        None => (None, None),
    }
}

struct LineFields {
    shown: Option<bool>,
    opacity: Option<String>,
    width: Option<String>,
    style: Option<String>,
}

impl LineFields {
    fn from_toggle(toggle: &Toggle<Lines>) -> LineFields {
        match toggle {
            Toggle::Auto => LineFields {
                shown: None,
                opacity: None,
                width: None,
                style: None,
            },
            Toggle::Off => LineFields {
                shown: Some(false),
                opacity: None,
                width: None,
                style: None,
            },
            Toggle::On(lines) => LineFields {
                shown: Some(true),
                opacity: Some(format_number(lines.opacity)),
                width: Some(format_number(lines.width)),
                style: Some(
                    match lines.style {
                        LineStyle::Solid => "SOLID",
                        LineStyle::Dashed => "DASHED",
                        LineStyle::Dotted => "DOTTED",
                    }
                    .to_string(),
                ),
            },
        }
    }
}

struct PointFields {
    shown: Option<bool>,
    opacity: Option<String>,
    size: Option<String>,
    style: Option<String>,
    drag: Option<String>,
}

impl PointFields {
    fn from_toggle(toggle: &Toggle<Points>) -> PointFields {
        match toggle {
            Toggle::Auto => PointFields {
                shown: None,
                opacity: None,
                size: None,
                style: None,
                drag: None,
            },
            Toggle::Off => PointFields {
                shown: Some(false),
                opacity: None,
                size: None,
                style: None,
                drag: None,
            },
            Toggle::On(points) => PointFields {
                shown: Some(true),
                opacity: Some(format_number(points.opacity)),
                size: Some(format_number(points.size)),
                style: Some(
                    match points.style {
                        PointStyle::Point => "POINT",
                        PointStyle::Open => "OPEN",
                        PointStyle::Cross => "CROSS",
                    }
                    .to_string(),
                ),
                drag: match points.drag {
                    DragMode::Auto => None,
                    DragMode::None => Some("NONE".to_string()),
                    DragMode::X => Some("X".to_string()),
                    DragMode::Y => Some("Y".to_string()),
                    DragMode::Xy => Some("XY".to_string()),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::lower::program_to_semantic;

    fn wire_of(source: &str) -> WireState {
        let parsed = crate::parser::parse(source, &[]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let lowered = program_to_semantic(&parsed.program);
        semantic_to_wire(&lowered.state.expect("lowering failed"))
    }

    #[test]
    fn test_single_column_table_padded() {
        let wire = wire_of("table { a = [1] }");
        let WireItem::Table(table) = &wire.expressions.list[0] else {
            panic!("expected table");
        };
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].values, vec!["1".to_string()]);
        assert_eq!(table.columns[1].latex, "");
        assert_eq!(table.columns[1].values, vec!["".to_string()]);
    }

    #[test]
    fn test_empty_table_still_has_a_row() {
        let wire = wire_of("table { a = x ^ 2 }");
        let WireItem::Table(table) = &wire.expressions.list[0] else {
            panic!("expected table");
        };
        for column in &table.columns {
            assert!(!column.values.is_empty());
        }
    }

    #[test]
    fn test_folder_flattens_with_back_references() {
        let wire = wire_of("folder \"stuff\" { y = x\n\n(1, 2) }");
        let ids: Vec<_> = wire.expressions.list.iter().map(WireItem::id).collect();
        assert_eq!(wire.expressions.list.len(), 3);
        let WireItem::Folder(folder) = &wire.expressions.list[0] else {
            panic!("expected folder first, got {ids:?}");
        };
        assert_eq!(folder.title, "stuff");
        assert_eq!(
            wire.expressions.list[1].folder_id(),
            Some(folder.id.as_str())
        );
        assert_eq!(
            wire.expressions.list[2].folder_id(),
            Some(folder.id.as_str())
        );
    }

    #[test]
    fn test_metadata_item_emitted_for_pinned() {
        let wire = wire_of("y = x @{pinned: true}");
        let last = wire.expressions.list.last().expect("empty list");
        let WireItem::Text(text) = last else {
            panic!("expected metadata text item");
        };
        assert_eq!(text.id, METADATA_ID);
        assert_eq!(text.folder_id.as_deref(), Some(METADATA_FOLDER_ID));
        let metadata = metadata::from_text(&text.text);
        let id = wire.expressions.list[0].id().to_string();
        assert!(metadata.get(&id).pinned);
    }

    #[test]
    fn test_no_metadata_item_without_flags() {
        let wire = wire_of("y = x");
        assert_eq!(wire.expressions.list.len(), 1);
    }

    #[test]
    fn test_regression_fields() {
        let wire = wire_of("e1 = y1 ~ m * x1 #{m = 2}");
        let WireItem::Expression(expression) = &wire.expressions.list[0] else {
            panic!("expected expression");
        };
        assert_eq!(expression.residual_variable.as_deref(), Some("e_{1}"));
        let parameters = expression.regression_parameters.as_ref().unwrap();
        assert_eq!(parameters.get("m"), Some(&2.0));
    }

    #[test]
    fn test_polar_domain_field() {
        let wire = wire_of("r = theta @{domain: [0, tau]}");
        let WireItem::Expression(expression) = &wire.expressions.list[0] else {
            panic!("expected expression");
        };
        assert!(expression.polar_domain.is_some());
        assert!(expression.parametric_domain.is_none());
    }
}
