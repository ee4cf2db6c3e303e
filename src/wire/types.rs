//! Serde mirror of the host document schema
//!
//! Field names and shapes match the host exactly; everything optional is
//! `Option` with `skip_serializing_if` so emitted documents stay minimal,
//! and deserialization tolerates unknown fields. Numeric style fields are
//! carried as expression strings, the way the host stores them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WIRE_VERSION: u32 = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireState {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<String>,
    pub graph: WireGraph,
    pub expressions: WireExpressions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireGraph {
    #[serde(default)]
    pub viewport: WireViewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_axes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polar_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireViewport {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Default for WireViewport {
    fn default() -> Self {
        WireViewport {
            xmin: -10.0,
            ymin: -10.0,
            xmax: 10.0,
            ymax: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireExpressions {
    pub list: Vec<WireItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<WireTicker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireTicker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_step_latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireItem {
    Expression(WireExpression),
    Table(WireTable),
    Text(WireText),
    Folder(WireFolder),
    Image(WireImage),
}

impl WireItem {
    pub fn id(&self) -> &str {
        match self {
            WireItem::Expression(item) => &item.id,
            WireItem::Table(item) => &item.id,
            WireItem::Text(item) => &item.id,
            WireItem::Folder(item) => &item.id,
            WireItem::Image(item) => &item.id,
        }
    }

    pub fn folder_id(&self) -> Option<&str> {
        match self {
            WireItem::Expression(item) => item.folder_id.as_deref(),
            WireItem::Table(item) => item.folder_id.as_deref(),
            WireItem::Text(item) => item.folder_id.as_deref(),
            WireItem::Folder(_) => None,
            WireItem::Image(item) => item.folder_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireExpression {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_orientation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parametric_domain: Option<WireDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polar_domain: Option<WireDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regression_parameters: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDomain {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireTable {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub columns: Vec<WireTableColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireTableColumn {
    pub id: String,
    pub latex: String,
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireText {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireFolder {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tag_round_trip() {
        let item = WireItem::Expression(WireExpression {
            id: "1".into(),
            latex: Some("y=x".into()),
            ..Default::default()
        });
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"expression\""));
        let back: WireItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let json = r#"{"type":"text","id":"7","text":"hi","legacyField":true}"#;
        let item: WireItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), "7");
    }

    #[test]
    fn test_minimal_expression_stays_minimal() {
        let item = WireItem::Expression(WireExpression {
            id: "1".into(),
            ..Default::default()
        });
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"type":"expression","id":"1"}"#);
    }
}
