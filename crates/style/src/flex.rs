//! Enums for the flexbox style properties.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `Display` with the CSS keyword of each variant.
macro_rules! css_keywords {
    ($ty:ident { $($variant:ident => $keyword:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($ty::$variant => $keyword,)+
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_column(self) -> bool {
        !self.is_row()
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Shared by `align-items`, `align-self` and `align-content`.
/// `auto` only has a meaning for `align-self`; the space-* values only for
/// `align-content`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Display {
    #[default]
    Flex,
    None,
}

css_keywords!(FlexDirection {
    Column => "column",
    ColumnReverse => "column-reverse",
    Row => "row",
    RowReverse => "row-reverse",
});

css_keywords!(Justify {
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
    SpaceEvenly => "space-evenly",
});

css_keywords!(Align {
    Auto => "auto",
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    Stretch => "stretch",
    Baseline => "baseline",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
});

css_keywords!(PositionType {
    Relative => "relative",
    Absolute => "absolute",
});

css_keywords!(Wrap {
    NoWrap => "nowrap",
    Wrap => "wrap",
    WrapReverse => "wrap-reverse",
});

css_keywords!(Overflow {
    Visible => "visible",
    Hidden => "hidden",
    Scroll => "scroll",
});

css_keywords!(Display {
    Flex => "flex",
    None => "none",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_css_spelling() {
        assert_eq!(FlexDirection::RowReverse.to_string(), "row-reverse");
        assert_eq!(Align::SpaceBetween.to_string(), "space-between");
        assert_eq!(Wrap::NoWrap.to_string(), "nowrap");
    }
}
