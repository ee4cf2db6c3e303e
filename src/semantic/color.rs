//! Deterministic palette cycling for items without an explicit color

use std::collections::HashSet;

use crate::semantic::state::{Color, SemanticItem};

/// The host calculator's default six-color palette
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#c74440", "#2d70b3", "#388c46", "#6042a6", "#000000", "#fa7e19",
];

/// Fill every empty color slot by cycling `palette` in document order,
/// skipping palette entries already used explicitly anywhere in the document
/// so automatic and manual colors never collide within one cycle.
pub fn assign_colors(items: &mut [SemanticItem], palette: &[&str]) {
    let mut used = HashSet::new();
    for item in items.iter() {
        collect_explicit(item, &mut used);
    }

    let mut cursor = 0usize;
    for item in items.iter_mut() {
        fill_item(item, palette, &used, &mut cursor);
    }
}

fn collect_explicit(item: &SemanticItem, used: &mut HashSet<String>) {
    match item {
        SemanticItem::Expression(item) => {
            if let Some(Color::Hex(hex)) = &item.color {
                used.insert(hex.clone());
            }
        }
        SemanticItem::Table(item) => {
            for column in &item.columns {
                if let Some(Color::Hex(hex)) = &column.color {
                    used.insert(hex.clone());
                }
            }
        }
        SemanticItem::Folder(item) => {
            for child in &item.children {
                collect_explicit(child, used);
            }
        }
        SemanticItem::Image(_) | SemanticItem::Text(_) => {}
    }
}

fn fill_item(
    item: &mut SemanticItem,
    palette: &[&str],
    used: &HashSet<String>,
    cursor: &mut usize,
) {
    match item {
        SemanticItem::Expression(item) => {
            if item.color.is_none() {
                item.color = Some(Color::Hex(next_color(palette, used, cursor)));
            }
        }
        SemanticItem::Table(item) => {
            for column in &mut item.columns {
                if column.color.is_none() {
                    column.color = Some(Color::Hex(next_color(palette, used, cursor)));
                }
            }
        }
        SemanticItem::Folder(item) => {
            for child in &mut item.children {
                fill_item(child, palette, used, cursor);
            }
        }
        SemanticItem::Image(_) | SemanticItem::Text(_) => {}
    }
}

fn next_color(palette: &[&str], used: &HashSet<String>, cursor: &mut usize) -> String {
    debug_assert!(!palette.is_empty());
    // after one full cycle of skips, give up and take the slot anyway
    for _ in 0..palette.len() {
        let candidate = palette[*cursor % palette.len()];
        *cursor += 1;
        if !used.contains(candidate) {
            return candidate.to_string();
        }
    }
    let candidate = palette[*cursor % palette.len()];
    *cursor += 1;
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::state::{ExpressionItem, Toggle};

    const PALETTE: [&str; 5] = ["#a", "#b", "#c", "#d", "#e"];

    fn expression(color: Option<&str>) -> SemanticItem {
        SemanticItem::Expression(ExpressionItem {
            id: String::new(),
            expr: None,
            color: color.map(|c| Color::Hex(c.to_string())),
            hidden: false,
            secret: false,
            pinned: false,
            error_hidden: false,
            glesmos: false,
            fill_opacity: 0.0,
            label: None,
            lines: Toggle::Auto,
            points: Toggle::Auto,
            domain: None,
            polar_domain: false,
            regression: None,
        })
    }

    fn hex(item: &SemanticItem) -> &str {
        let SemanticItem::Expression(item) = item else {
            panic!("expected expression");
        };
        match item.color.as_ref() {
            Some(Color::Hex(hex)) => hex,
            other => panic!("expected hex color, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_cycle() {
        let mut items = vec![expression(None), expression(None), expression(None)];
        assign_colors(&mut items, &PALETTE);
        assert_eq!(hex(&items[0]), "#a");
        assert_eq!(hex(&items[1]), "#b");
        assert_eq!(hex(&items[2]), "#c");
    }

    #[test]
    fn test_explicit_color_skipped() {
        let mut items = vec![expression(None), expression(Some("#b")), expression(None)];
        assign_colors(&mut items, &PALETTE);
        assert_eq!(hex(&items[0]), "#a");
        assert_eq!(hex(&items[1]), "#b");
        // the auto cycle resumes past the explicitly used color
        assert_eq!(hex(&items[2]), "#c");
    }

    #[test]
    fn test_exhausted_palette_wraps() {
        let mut items: Vec<_> = (0..7).map(|_| expression(None)).collect();
        assign_colors(&mut items, &PALETTE);
        assert_eq!(hex(&items[5]), "#a");
        assert_eq!(hex(&items[6]), "#b");
    }
}
