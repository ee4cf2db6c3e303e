//! Per-statement-kind schemas and default values
//!
//! Schemas are plain statics; the defaults tables are built lazily because
//! [`StyleValue`] allocates. The two are always consumed together by
//! [`hydrate`](super::hydrate::hydrate).

use once_cell::sync::Lazy;

use crate::style::schema::{Schema, SchemaType};
use crate::style::value::{StyleProp, StyleValue};

pub static LABEL_SCHEMA: Schema = Schema {
    entries: &[
        ("text", SchemaType::Str),
        ("size", SchemaType::Number),
        ("angle", SchemaType::Number),
        (
            "orientation",
            SchemaType::Enum(&[
                "default", "center", "left", "right", "above", "below",
            ]),
        ),
    ],
};

pub static LINES_SCHEMA: Schema = Schema {
    entries: &[
        ("opacity", SchemaType::Number),
        ("width", SchemaType::Number),
        ("style", SchemaType::Enum(&["solid", "dashed", "dotted"])),
    ],
};

pub static POINTS_SCHEMA: Schema = Schema {
    entries: &[
        ("opacity", SchemaType::Number),
        ("size", SchemaType::Number),
        ("style", SchemaType::Enum(&["point", "open", "cross"])),
        ("drag", SchemaType::Enum(&["none", "x", "y", "xy", "auto"])),
    ],
};

const LINES_ENTRY: SchemaType = SchemaType::Nested {
    schema: &LINES_SCHEMA,
    fill_defaults: false,
    or_bool: true,
};

const POINTS_ENTRY: SchemaType = SchemaType::Nested {
    schema: &POINTS_SCHEMA,
    fill_defaults: false,
    or_bool: true,
};

const LABEL_ENTRY: SchemaType = SchemaType::Nested {
    schema: &LABEL_SCHEMA,
    fill_defaults: false,
    or_bool: false,
};

pub static EXPRESSION_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("color", SchemaType::Color),
        ("hidden", SchemaType::Boolean),
        ("secret", SchemaType::Boolean),
        ("pinned", SchemaType::Boolean),
        ("errorHidden", SchemaType::Boolean),
        ("glesmos", SchemaType::Boolean),
        ("fill", SchemaType::Number),
        ("label", LABEL_ENTRY),
        ("lines", LINES_ENTRY),
        ("points", POINTS_ENTRY),
        ("domain", SchemaType::NumVec(2)),
    ],
};

pub static REGRESSION_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("color", SchemaType::Color),
        ("hidden", SchemaType::Boolean),
        ("secret", SchemaType::Boolean),
        ("pinned", SchemaType::Boolean),
        ("errorHidden", SchemaType::Boolean),
        ("glesmos", SchemaType::Boolean),
        ("fill", SchemaType::Number),
        ("label", LABEL_ENTRY),
        ("lines", LINES_ENTRY),
        ("points", POINTS_ENTRY),
        ("logMode", SchemaType::Boolean),
    ],
};

pub static COLUMN_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("color", SchemaType::Color),
        ("hidden", SchemaType::Boolean),
        ("lines", LINES_ENTRY),
        ("points", POINTS_ENTRY),
    ],
};

pub static TABLE_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("secret", SchemaType::Boolean),
        ("pinned", SchemaType::Boolean),
    ],
};

pub static IMAGE_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("url", SchemaType::Str),
        ("width", SchemaType::Number),
        ("height", SchemaType::Number),
        ("angle", SchemaType::Number),
        ("opacity", SchemaType::Number),
        ("center", SchemaType::Expr),
        ("foreground", SchemaType::Boolean),
        ("draggable", SchemaType::Boolean),
        ("secret", SchemaType::Boolean),
        ("pinned", SchemaType::Boolean),
    ],
};

pub static FOLDER_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("collapsed", SchemaType::Boolean),
        ("hidden", SchemaType::Boolean),
        ("secret", SchemaType::Boolean),
    ],
};

pub static TEXT_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("secret", SchemaType::Boolean),
        ("pinned", SchemaType::Boolean),
    ],
};

pub static VIEWPORT_SCHEMA: Schema = Schema {
    entries: &[
        ("xmin", SchemaType::Number),
        ("ymin", SchemaType::Number),
        ("xmax", SchemaType::Number),
        ("ymax", SchemaType::Number),
    ],
};

pub static SETTINGS_SCHEMA: Schema = Schema {
    entries: &[
        (
            "viewport",
            SchemaType::Nested {
                schema: &VIEWPORT_SCHEMA,
                fill_defaults: true,
                or_bool: false,
            },
        ),
        ("squareAxes", SchemaType::Boolean),
        ("degreeMode", SchemaType::Boolean),
        ("showGrid", SchemaType::Boolean),
        ("polarMode", SchemaType::Boolean),
        ("xAxisLabel", SchemaType::Str),
        ("yAxisLabel", SchemaType::Str),
        ("randomSeed", SchemaType::Str),
    ],
};

pub static TICKER_SCHEMA: Schema = Schema {
    entries: &[
        ("id", SchemaType::Str),
        ("minStep", SchemaType::Number),
        ("playing", SchemaType::Boolean),
    ],
};

fn base_item_defaults() -> StyleValue {
    StyleValue::new()
        .with("id", StyleProp::Str(String::new()))
        .with("secret", StyleProp::Bool(false))
        .with("pinned", StyleProp::Bool(false))
}

pub static LINES_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("opacity", StyleProp::Number(0.9))
        .with("width", StyleProp::Number(2.5))
        .with("style", StyleProp::Str("solid".into()))
});

pub static POINTS_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("opacity", StyleProp::Number(0.9))
        .with("size", StyleProp::Number(9.0))
        .with("style", StyleProp::Str("point".into()))
        .with("drag", StyleProp::Str("auto".into()))
});

pub static LABEL_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("text", StyleProp::Str(String::new()))
        .with("size", StyleProp::Number(1.0))
        .with("angle", StyleProp::Number(0.0))
        .with("orientation", StyleProp::Str("default".into()))
});

pub static EXPRESSION_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    base_item_defaults()
        .with("color", StyleProp::Str(String::new()))
        .with("hidden", StyleProp::Bool(false))
        .with("errorHidden", StyleProp::Bool(false))
        .with("glesmos", StyleProp::Bool(false))
        .with("fill", StyleProp::Number(0.0))
        .with("label", StyleProp::Map(LABEL_DEFAULTS.clone()))
        .with("lines", StyleProp::Map(LINES_DEFAULTS.clone()))
        .with("points", StyleProp::Map(POINTS_DEFAULTS.clone()))
});

pub static REGRESSION_DEFAULTS: Lazy<StyleValue> =
    Lazy::new(|| EXPRESSION_DEFAULTS.clone().with("logMode", StyleProp::Bool(false)));

pub static COLUMN_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("id", StyleProp::Str(String::new()))
        .with("color", StyleProp::Str(String::new()))
        .with("hidden", StyleProp::Bool(false))
        .with("lines", StyleProp::Map(LINES_DEFAULTS.clone()))
        .with("points", StyleProp::Map(POINTS_DEFAULTS.clone()))
});

pub static TABLE_DEFAULTS: Lazy<StyleValue> = Lazy::new(base_item_defaults);

pub static IMAGE_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    base_item_defaults()
        .with("url", StyleProp::Str(String::new()))
        .with("width", StyleProp::Number(10.0))
        .with("height", StyleProp::Number(10.0))
        .with("angle", StyleProp::Number(0.0))
        .with("opacity", StyleProp::Number(1.0))
        .with("foreground", StyleProp::Bool(false))
        .with("draggable", StyleProp::Bool(false))
});

pub static FOLDER_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("id", StyleProp::Str(String::new()))
        .with("collapsed", StyleProp::Bool(false))
        .with("hidden", StyleProp::Bool(false))
        .with("secret", StyleProp::Bool(false))
});

pub static TEXT_DEFAULTS: Lazy<StyleValue> = Lazy::new(base_item_defaults);

pub static VIEWPORT_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("xmin", StyleProp::Number(-10.0))
        .with("ymin", StyleProp::Number(-10.0))
        .with("xmax", StyleProp::Number(10.0))
        .with("ymax", StyleProp::Number(10.0))
});

pub static SETTINGS_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("viewport", StyleProp::Map(VIEWPORT_DEFAULTS.clone()))
        .with("squareAxes", StyleProp::Bool(true))
        .with("degreeMode", StyleProp::Bool(false))
        .with("showGrid", StyleProp::Bool(true))
        .with("polarMode", StyleProp::Bool(false))
        .with("xAxisLabel", StyleProp::Str(String::new()))
        .with("yAxisLabel", StyleProp::Str(String::new()))
        .with("randomSeed", StyleProp::Str(String::new()))
});

pub static TICKER_DEFAULTS: Lazy<StyleValue> = Lazy::new(|| {
    StyleValue::new()
        .with("id", StyleProp::Str(String::new()))
        .with("minStep", StyleProp::Number(0.0))
        .with("playing", StyleProp::Bool(false))
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_key_is_in_its_schema() {
        let pairs: &[(&Schema, &StyleValue)] = &[
            (&EXPRESSION_SCHEMA, &EXPRESSION_DEFAULTS),
            (&REGRESSION_SCHEMA, &REGRESSION_DEFAULTS),
            (&COLUMN_SCHEMA, &COLUMN_DEFAULTS),
            (&TABLE_SCHEMA, &TABLE_DEFAULTS),
            (&IMAGE_SCHEMA, &IMAGE_DEFAULTS),
            (&FOLDER_SCHEMA, &FOLDER_DEFAULTS),
            (&TEXT_SCHEMA, &TEXT_DEFAULTS),
            (&SETTINGS_SCHEMA, &SETTINGS_DEFAULTS),
            (&TICKER_SCHEMA, &TICKER_DEFAULTS),
        ];
        for (schema, defaults) in pairs {
            for (key, _) in schema.entries {
                // NumVec and Expr keys are allowed to default to unset
                let optional = matches!(
                    schema.get(key),
                    Some(SchemaType::NumVec(_)) | Some(SchemaType::Expr)
                );
                assert!(
                    defaults.contains(key) || optional,
                    "missing default for {key}"
                );
            }
        }
    }
}
