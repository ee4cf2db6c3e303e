//! Semantic document model
//!
//! Settings plus an ordered item list plus an optional ticker. Items keep
//! folder children nested one level; the wire layer flattens them. Every
//! field here is fully resolved: style hydration and canonical lowering have
//! already happened.

use serde::{Deserialize, Serialize};

use crate::semantic::canonical::CanonExpr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticState {
    pub settings: Settings,
    pub items: Vec<SemanticItem>,
    pub ticker: Option<Ticker>,
}

impl SemanticState {
    pub fn empty() -> Self {
        SemanticState {
            settings: Settings::default(),
            items: Vec::new(),
            ticker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            xmin: -10.0,
            ymin: -10.0,
            xmax: 10.0,
            ymax: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub viewport: Viewport,
    pub square_axes: bool,
    pub degree_mode: bool,
    pub show_grid: bool,
    pub polar_mode: bool,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub random_seed: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            viewport: Viewport::default(),
            square_axes: true,
            degree_mode: false,
            show_grid: true,
            polar_mode: false,
            x_axis_label: String::new(),
            y_axis_label: String::new(),
            random_seed: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub id: String,
    pub handler: Option<CanonExpr>,
    pub min_step: f64,
    pub playing: bool,
}

/// A resolved color value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Color {
    /// A literal color string, `"#c74440"` style
    Hex(String),
    /// A computed color expression
    Latex(CanonExpr),
}

/// Three-state visibility for lines/points styling
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Toggle<T> {
    /// Host decides based on the expression's shape
    #[default]
    Auto,
    Off,
    On(T),
}

impl<T> Toggle<T> {
    pub fn settings(&self) -> Option<&T> {
        match self {
            Toggle::On(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointStyle {
    Point,
    Open,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragMode {
    None,
    X,
    Y,
    Xy,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lines {
    pub opacity: f64,
    pub width: f64,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Points {
    pub opacity: f64,
    pub size: f64,
    pub style: PointStyle,
    pub drag: DragMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelOrientation {
    Default,
    Center,
    Left,
    Right,
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub size: f64,
    pub angle: f64,
    pub orientation: LabelOrientation,
}

/// Regression-specific data hanging off an expression item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionData {
    /// Name-keyed statically-evaluated parameter values
    pub parameters: Vec<(String, f64)>,
    pub residual_variable: Option<String>,
    pub log_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionItem {
    pub id: String,
    pub expr: Option<CanonExpr>,
    pub color: Option<Color>,
    pub hidden: bool,
    pub secret: bool,
    pub pinned: bool,
    pub error_hidden: bool,
    pub glesmos: bool,
    pub fill_opacity: f64,
    pub label: Option<Label>,
    pub lines: Toggle<Lines>,
    pub points: Toggle<Points>,
    /// Parametric or polar domain bounds
    pub domain: Option<(f64, f64)>,
    /// `r = …` comparators restrict a polar rather than parametric domain
    pub polar_domain: bool,
    pub regression: Option<RegressionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub id: String,
    /// Column header expression (the assignment target, or the whole formula)
    pub variable: CanonExpr,
    /// Explicit value cells for `id = [values]` columns, empty otherwise
    pub values: Vec<CanonExpr>,
    pub color: Option<Color>,
    pub hidden: bool,
    pub lines: Toggle<Lines>,
    pub points: Toggle<Points>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableItem {
    pub id: String,
    pub columns: Vec<TableColumn>,
    pub secret: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub opacity: f64,
    pub center: Option<CanonExpr>,
    pub foreground: bool,
    pub draggable: bool,
    pub secret: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub id: String,
    pub text: String,
    pub secret: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderItem {
    pub id: String,
    pub title: String,
    pub collapsed: bool,
    pub hidden: bool,
    pub secret: bool,
    /// One level only; never contains another Folder
    pub children: Vec<SemanticItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticItem {
    Expression(ExpressionItem),
    Table(TableItem),
    Image(ImageItem),
    Text(TextItem),
    Folder(FolderItem),
}

impl SemanticItem {
    pub fn id(&self) -> &str {
        match self {
            SemanticItem::Expression(item) => &item.id,
            SemanticItem::Table(item) => &item.id,
            SemanticItem::Image(item) => &item.id,
            SemanticItem::Text(item) => &item.id,
            SemanticItem::Folder(item) => &item.id,
        }
    }
}
