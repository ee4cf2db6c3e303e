//! Wire document to semantic state
//!
//! Re-nests flattened folders, strips table padding, re-hydrates the hidden
//! metadata item, and parses every expression string through the
//! caller-supplied [`LatexParser`]. A string that fails to parse produces an
//! Error diagnostic and drops that item's expression content; nothing here
//! rejects a document outright.

use crate::diagnostics::Diagnostic;
use crate::semantic::canonical::CanonExpr;
use crate::semantic::state::{
    Color, DragMode, ExpressionItem, FolderItem, ImageItem, Label, LabelOrientation, LineStyle,
    Lines, Points, PointStyle, RegressionData, SemanticItem, SemanticState, Settings, TableColumn,
    TableItem, TextItem, Ticker, Toggle, Viewport,
};
use crate::wire::metadata::{self, Metadata, METADATA_FOLDER_ID, METADATA_ID};
use crate::wire::types::{
    WireExpression, WireImage, WireItem, WireState, WireTable, WireTableColumn, WireText,
};
use crate::wire::LatexParser;

pub fn wire_to_semantic(
    wire: &WireState,
    parser: &dyn LatexParser,
) -> (SemanticState, Vec<Diagnostic>) {
    let mut decoder = Decoder {
        parser,
        diagnostics: Vec::new(),
        metadata: find_metadata(wire),
    };

    let mut state = SemanticState::empty();
    state.settings = decode_settings(wire);
    state.ticker = wire.expressions.ticker.as_ref().map(|ticker| Ticker {
        id: String::new(),
        handler: ticker
            .handler_latex
            .as_deref()
            .and_then(|latex| decoder.parse(latex)),
        min_step: ticker
            .min_step_latex
            .as_deref()
            .and_then(parse_f64)
            .unwrap_or(0.0),
        playing: ticker.playing.unwrap_or(false),
    });

    // folders precede their members in the flattened list
    let mut folder_slots: Vec<(String, usize)> = Vec::new();
    for item in &wire.expressions.list {
        if is_metadata_item(item) {
            continue;
        }
        if let WireItem::Folder(folder) = item {
            state
                .items
                .push(SemanticItem::Folder(decoder.decode_folder(folder)));
            folder_slots.push((folder.id.clone(), state.items.len() - 1));
            continue;
        }
        let decoded = decoder.decode_item(item);
        match item
            .folder_id()
            .and_then(|id| folder_slots.iter().find(|(fid, _)| fid == id))
        {
            Some((_, slot)) => {
                let SemanticItem::Folder(folder) = &mut state.items[*slot] else {
                    unreachable!()
                };
                folder.children.push(decoded);
            }
            None => state.items.push(decoded),
        }
    }

    (state, decoder.diagnostics)
}

fn is_metadata_item(item: &WireItem) -> bool {
    item.id() == METADATA_ID
        || item.id() == METADATA_FOLDER_ID
        || item.folder_id() == Some(METADATA_FOLDER_ID)
}

fn find_metadata(wire: &WireState) -> Metadata {
    for item in &wire.expressions.list {
        if let WireItem::Text(text) = item {
            if text.id == METADATA_ID {
                return metadata::from_text(&text.text);
            }
        }
    }
    Metadata::default()
}

fn decode_settings(wire: &WireState) -> Settings {
    let graph = &wire.graph;
    Settings {
        viewport: Viewport {
            xmin: graph.viewport.xmin,
            ymin: graph.viewport.ymin,
            xmax: graph.viewport.xmax,
            ymax: graph.viewport.ymax,
        },
        square_axes: graph.square_axes.unwrap_or(true),
        degree_mode: graph.degree_mode.unwrap_or(false),
        show_grid: graph.show_grid.unwrap_or(true),
        polar_mode: graph.polar_mode.unwrap_or(false),
        x_axis_label: graph.x_axis_label.clone().unwrap_or_default(),
        y_axis_label: graph.y_axis_label.clone().unwrap_or_default(),
        random_seed: wire.random_seed.clone().unwrap_or_default(),
    }
}

/// Recover a surface identifier name from its rendered form:
/// `e_{1}` becomes `e_1`, `\theta` becomes `theta`.
fn plain_identifier(latex: &str) -> String {
    latex
        .chars()
        .filter(|c| !matches!(c, '\\' | '{' | '}'))
        .collect()
}

fn parse_f64(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

struct Decoder<'a> {
    parser: &'a dyn LatexParser,
    diagnostics: Vec<Diagnostic>,
    metadata: Metadata,
}

impl Decoder<'_> {
    fn parse(&mut self, latex: &str) -> Option<CanonExpr> {
        if latex.is_empty() {
            return None;
        }
        match self.parser.parse_latex(latex) {
            Ok(canon) => Some(canon),
            Err(message) => {
                self.diagnostics.push(Diagnostic::error(
                    format!("failed to parse '{latex}': {message}"),
                    None,
                ));
                None
            }
        }
    }

    fn decode_item(&mut self, item: &WireItem) -> SemanticItem {
        match item {
            WireItem::Expression(item) => SemanticItem::Expression(self.decode_expression(item)),
            WireItem::Table(item) => SemanticItem::Table(self.decode_table(item)),
            WireItem::Text(item) => SemanticItem::Text(self.decode_text(item)),
            WireItem::Image(item) => SemanticItem::Image(self.decode_image(item)),
            WireItem::Folder(folder) => SemanticItem::Folder(self.decode_folder(folder)),
        }
    }

    fn decode_folder(&mut self, folder: &crate::wire::types::WireFolder) -> FolderItem {
        FolderItem {
            id: folder.id.clone(),
            title: folder.title.clone(),
            collapsed: folder.collapsed.unwrap_or(false),
            hidden: folder.hidden.unwrap_or(false),
            secret: folder.secret.unwrap_or(false),
            children: Vec::new(),
        }
    }

    fn decode_expression(&mut self, item: &WireExpression) -> ExpressionItem {
        let meta = self.metadata.get(&item.id);
        let expr = item.latex.as_deref().and_then(|latex| self.parse(latex));
        let is_regression = matches!(expr, Some(CanonExpr::Regression { .. }))
            || item.residual_variable.is_some()
            || item.regression_parameters.is_some();
        let regression = is_regression.then(|| RegressionData {
            parameters: item
                .regression_parameters
                .as_ref()
                .map(|p| p.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default(),
            residual_variable: item
                .residual_variable
                .as_deref()
                .map(plain_identifier),
            log_mode: item.log_mode.unwrap_or(false),
        });
        let (domain, polar_domain) = match (&item.parametric_domain, &item.polar_domain) {
            (Some(domain), _) => (decode_domain(domain), false),
            (None, Some(domain)) => (decode_domain(domain), true),
            (None, None) => (None, false),
        };
        ExpressionItem {
            id: item.id.clone(),
            expr,
            color: decode_color(&item.color, &item.color_latex, self),
            hidden: item.hidden.unwrap_or(false),
            secret: item.secret.unwrap_or(false),
            pinned: meta.pinned,
            error_hidden: meta.error_hidden,
            glesmos: meta.glesmos,
            fill_opacity: item.fill_opacity.as_deref().and_then(parse_f64).unwrap_or(0.0),
            label: item.label.as_ref().map(|text| Label {
                text: text.clone(),
                size: item.label_size.as_deref().and_then(parse_f64).unwrap_or(1.0),
                angle: item.label_angle.as_deref().and_then(parse_f64).unwrap_or(0.0),
                orientation: match item.label_orientation.as_deref() {
                    Some("center") => LabelOrientation::Center,
                    Some("left") => LabelOrientation::Left,
                    Some("right") => LabelOrientation::Right,
                    Some("above") => LabelOrientation::Above,
                    Some("below") => LabelOrientation::Below,
                    _ => LabelOrientation::Default,
                },
            }),
            lines: decode_lines(
                item.lines,
                &item.line_opacity,
                &item.line_width,
                &item.line_style,
            ),
            points: decode_points(
                item.points,
                &item.point_opacity,
                &item.point_size,
                &item.point_style,
                &item.drag_mode,
            ),
            domain,
            polar_domain,
            regression,
        }
    }

    fn decode_table(&mut self, item: &WireTable) -> TableItem {
        let meta = self.metadata.get(&item.id);
        let columns = item
            .columns
            .iter()
            // drop the blank padding the host format requires
            .filter(|column| !column.latex.is_empty())
            .map(|column| self.decode_column(column))
            .collect();
        TableItem {
            id: item.id.clone(),
            columns,
            secret: item.secret.unwrap_or(false),
            pinned: meta.pinned,
        }
    }

    fn decode_column(&mut self, column: &WireTableColumn) -> TableColumn {
        let variable = self
            .parse(&column.latex)
            .unwrap_or_else(|| CanonExpr::Identifier(plain_identifier(&column.latex)));
        let values = column
            .values
            .iter()
            .filter(|value| !value.is_empty())
            .filter_map(|value| self.parse(value))
            .collect();
        TableColumn {
            id: column.id.clone(),
            variable,
            values,
            color: decode_color(&column.color, &column.color_latex, self),
            hidden: column.hidden.unwrap_or(false),
            lines: decode_lines(
                column.lines,
                &column.line_opacity,
                &column.line_width,
                &column.line_style,
            ),
            points: decode_points(
                column.points,
                &column.point_opacity,
                &column.point_size,
                &column.point_style,
                &column.drag_mode,
            ),
        }
    }

    fn decode_text(&mut self, item: &WireText) -> TextItem {
        let meta = self.metadata.get(&item.id);
        TextItem {
            id: item.id.clone(),
            text: item.text.clone(),
            secret: item.secret.unwrap_or(false),
            pinned: meta.pinned,
        }
    }

    fn decode_image(&mut self, item: &WireImage) -> ImageItem {
        let meta = self.metadata.get(&item.id);
        ImageItem {
            id: item.id.clone(),
            name: item.name.clone(),
            url: item.image_url.clone(),
            width: item.width.as_deref().and_then(parse_f64).unwrap_or(10.0),
            height: item.height.as_deref().and_then(parse_f64).unwrap_or(10.0),
            angle: item.angle.as_deref().and_then(parse_f64).unwrap_or(0.0),
            opacity: item.opacity.as_deref().and_then(parse_f64).unwrap_or(1.0),
            center: item.center.as_deref().and_then(|latex| self.parse(latex)),
            foreground: item.foreground.unwrap_or(false),
            draggable: item.draggable.unwrap_or(false),
            secret: item.secret.unwrap_or(false),
            pinned: meta.pinned,
        }
    }
}

fn decode_domain(domain: &crate::wire::types::WireDomain) -> Option<(f64, f64)> {
    Some((parse_f64(&domain.min)?, parse_f64(&domain.max)?))
}

fn decode_color(
    color: &Option<String>,
    color_latex: &Option<String>,
    decoder: &mut Decoder<'_>,
) -> Option<Color> {
    if let Some(latex) = color_latex {
        if let Some(canon) = decoder.parse(latex) {
            return Some(Color::Latex(canon));
        }
    }
    color.as_ref().map(|hex| Color::Hex(hex.clone()))
}

fn decode_lines(
    shown: Option<bool>,
    opacity: &Option<String>,
    width: &Option<String>,
    style: &Option<String>,
) -> Toggle<Lines> {
    match shown {
        Some(false) => Toggle::Off,
        None if opacity.is_none() && width.is_none() && style.is_none() => Toggle::Auto,
        _ => Toggle::On(Lines {
            opacity: opacity.as_deref().and_then(parse_f64).unwrap_or(0.9),
            width: width.as_deref().and_then(parse_f64).unwrap_or(2.5),
            style: match style.as_deref() {
                Some("DASHED") => LineStyle::Dashed,
                Some("DOTTED") => LineStyle::Dotted,
                _ => LineStyle::Solid,
            },
        }),
    }
}

fn decode_points(
    shown: Option<bool>,
    opacity: &Option<String>,
    size: &Option<String>,
    style: &Option<String>,
    drag: &Option<String>,
) -> Toggle<Points> {
    match shown {
        Some(false) => Toggle::Off,
        None if opacity.is_none() && size.is_none() && style.is_none() && drag.is_none() => {
            Toggle::Auto
        }
        _ => Toggle::On(Points {
            opacity: opacity.as_deref().and_then(parse_f64).unwrap_or(0.9),
            size: size.as_deref().and_then(parse_f64).unwrap_or(9.0),
            style: match style.as_deref() {
                Some("OPEN") => PointStyle::Open,
                Some("CROSS") => PointStyle::Cross,
                _ => PointStyle::Point,
            },
            drag: match drag.as_deref() {
                Some("NONE") => DragMode::None,
                Some("X") => DragMode::X,
                Some("Y") => DragMode::Y,
                Some("XY") => DragMode::Xy,
                _ => DragMode::Auto,
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::types::{WireExpressions, WireGraph};

    /// Minimal stand-in for the host parser: numbers and plain identifiers
    pub struct StubParser;

    impl LatexParser for StubParser {
        fn parse_latex(&self, latex: &str) -> Result<CanonExpr, String> {
            if let Ok(value) = latex.parse::<f64>() {
                return Ok(CanonExpr::Number(value));
            }
            let name = plain_identifier(latex);
            if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Ok(CanonExpr::Identifier(name));
            }
            Err("unsupported".to_string())
        }
    }

    fn empty_wire() -> WireState {
        WireState {
            version: crate::wire::types::WIRE_VERSION,
            random_seed: None,
            graph: WireGraph::default(),
            expressions: WireExpressions::default(),
        }
    }

    #[test]
    fn test_empty_document() {
        let (state, diagnostics) = wire_to_semantic(&empty_wire(), &StubParser);
        assert!(diagnostics.is_empty());
        assert_eq!(state, SemanticState::empty());
    }

    #[test]
    fn test_folder_renesting() {
        let mut wire = empty_wire();
        wire.expressions.list = vec![
            WireItem::Folder(crate::wire::types::WireFolder {
                id: "f".into(),
                title: "stuff".into(),
                ..Default::default()
            }),
            WireItem::Expression(WireExpression {
                id: "1".into(),
                folder_id: Some("f".into()),
                latex: Some("42".into()),
                ..Default::default()
            }),
            WireItem::Expression(WireExpression {
                id: "2".into(),
                latex: Some("7".into()),
                ..Default::default()
            }),
        ];
        let (state, diagnostics) = wire_to_semantic(&wire, &StubParser);
        assert!(diagnostics.is_empty());
        assert_eq!(state.items.len(), 2);
        let SemanticItem::Folder(folder) = &state.items[0] else {
            panic!("expected folder");
        };
        assert_eq!(folder.children.len(), 1);
        assert_eq!(folder.children[0].id(), "1");
        assert_eq!(state.items[1].id(), "2");
    }

    #[test]
    fn test_metadata_applied_and_hidden_items_dropped() {
        let mut wire = empty_wire();
        wire.expressions.list = vec![
            WireItem::Expression(WireExpression {
                id: "1".into(),
                latex: Some("5".into()),
                ..Default::default()
            }),
            WireItem::Folder(crate::wire::types::WireFolder {
                id: METADATA_FOLDER_ID.into(),
                secret: Some(true),
                ..Default::default()
            }),
            WireItem::Text(WireText {
                id: METADATA_ID.into(),
                folder_id: Some(METADATA_FOLDER_ID.into()),
                text: r#"{"version":2,"expressions":{"1":{"pinned":true,"glesmos":true}}}"#.into(),
                ..Default::default()
            }),
        ];
        let (state, diagnostics) = wire_to_semantic(&wire, &StubParser);
        assert!(diagnostics.is_empty());
        assert_eq!(state.items.len(), 1);
        let SemanticItem::Expression(item) = &state.items[0] else {
            panic!("expected expression");
        };
        assert!(item.pinned);
        assert!(item.glesmos);
    }

    #[test]
    fn test_unparseable_latex_is_diagnostic_not_failure() {
        let mut wire = empty_wire();
        wire.expressions.list = vec![WireItem::Expression(WireExpression {
            id: "1".into(),
            latex: Some("\\bogus!!".into()),
            hidden: Some(true),
            ..Default::default()
        })];
        let (state, diagnostics) = wire_to_semantic(&wire, &StubParser);
        assert_eq!(diagnostics.len(), 1);
        let SemanticItem::Expression(item) = &state.items[0] else {
            panic!("expected expression");
        };
        assert!(item.expr.is_none());
        assert!(item.hidden);
    }

    #[test]
    fn test_table_padding_stripped() {
        let mut wire = empty_wire();
        wire.expressions.list = vec![WireItem::Table(WireTable {
            id: "t".into(),
            columns: vec![
                WireTableColumn {
                    id: "c1".into(),
                    latex: "a".into(),
                    values: vec!["1".into(), "".into()],
                    ..Default::default()
                },
                WireTableColumn {
                    id: "t-col-2".into(),
                    latex: String::new(),
                    values: vec!["".into(), "".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        })];
        let (state, diagnostics) = wire_to_semantic(&wire, &StubParser);
        assert!(diagnostics.is_empty());
        let SemanticItem::Table(table) = &state.items[0] else {
            panic!("expected table");
        };
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].values, vec![CanonExpr::Number(1.0)]);
    }
}
