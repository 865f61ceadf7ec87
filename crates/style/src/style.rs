//! The declarative per-node inputs to layout.
use crate::edges::Edges;
use crate::flex::{Align, Display, FlexDirection, Justify, Overflow, PositionType, Wrap};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use trellis_types::{Dimension, Direction};

#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_grow: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_shrink: Option<f32>,
    pub flex_basis: Value,

    #[serde(skip_serializing_if = "Edges::is_empty")]
    pub margin: Edges,
    #[serde(skip_serializing_if = "Edges::is_empty")]
    pub position: Edges,
    #[serde(skip_serializing_if = "Edges::is_empty")]
    pub padding: Edges,
    #[serde(skip_serializing_if = "Edges::is_empty")]
    pub border: Edges,

    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,

    /// Width divided by height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::Auto,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            width: Value::Auto,
            height: Value::Auto,
            min_width: Value::Undefined,
            min_height: Value::Undefined,
            max_width: Value::Undefined,
            max_height: Value::Undefined,
            aspect_ratio: None,
        }
    }
}

impl Style {
    /// Defaults matching the CSS initial values.
    pub fn web_defaults() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn min_dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.min_width,
            Dimension::Height => self.min_height,
        }
    }

    pub fn max_dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.max_width,
            Dimension::Height => self.max_height,
        }
    }

    pub fn set_dimension(&mut self, dimension: Dimension, value: Value) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.position_type == PositionType::Absolute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::Edge;

    #[test]
    fn defaults_follow_the_native_initial_values() {
        let style = Style::default();
        assert_eq!(style.flex_direction, FlexDirection::Column);
        assert_eq!(style.align_items, Align::Stretch);
        assert_eq!(style.align_content, Align::FlexStart);
        assert_eq!(style.flex_basis, Value::Auto);
        assert_eq!(style.width, Value::Auto);
        assert_eq!(style.max_width, Value::Undefined);

        let web = Style::web_defaults();
        assert_eq!(web.flex_direction, FlexDirection::Row);
        assert_eq!(web.align_content, Align::Stretch);
    }

    #[test]
    fn builds_from_camel_case_json() {
        let style: Style = serde_json::from_str(
            r#"{
                "flexDirection": "row-reverse",
                "justifyContent": "space-between",
                "alignSelf": "baseline",
                "flexGrow": 1,
                "flexBasis": "50%",
                "margin": {"start": 4},
                "padding": "2 6",
                "width": 100,
                "maxHeight": "80pt",
                "positionType": "absolute"
            }"#,
        )
        .unwrap();

        assert_eq!(style.flex_direction, FlexDirection::RowReverse);
        assert_eq!(style.justify_content, Justify::SpaceBetween);
        assert_eq!(style.align_self, Align::Baseline);
        assert_eq!(style.flex_grow, Some(1.0));
        assert_eq!(style.flex_basis, Value::Percent(50.0));
        assert_eq!(style.margin[Edge::Start], Value::Point(4.0));
        assert_eq!(style.padding[Edge::Horizontal], Value::Point(6.0));
        assert_eq!(style.dimension(Dimension::Width), Value::Point(100.0));
        assert_eq!(style.max_dimension(Dimension::Height), Value::Point(80.0));
        assert!(style.is_absolute());
        assert_eq!(style.height, Value::Auto);
    }
}
