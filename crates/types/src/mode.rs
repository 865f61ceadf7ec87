use serde::{Deserialize, Serialize};
use std::fmt;

/// How a node should interpret an available size on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureMode {
    /// No constraint; size to content.
    #[default]
    Undefined,
    /// The node must take exactly the given size.
    Exactly,
    /// The given size is an upper bound.
    AtMost,
}

impl MeasureMode {
    /// Name used in trace output; layout passes get a `LAY_` prefix.
    pub fn trace_name(self, perform_layout: bool) -> &'static str {
        match (self, perform_layout) {
            (MeasureMode::Undefined, false) => "UNDEFINED",
            (MeasureMode::Exactly, false) => "EXACTLY",
            (MeasureMode::AtMost, false) => "AT_MOST",
            (MeasureMode::Undefined, true) => "LAY_UNDEFINED",
            (MeasureMode::Exactly, true) => "LAY_EXACTLY",
            (MeasureMode::AtMost, true) => "LAY_AT_MOST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Inherit => "inherit",
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        };
        f.write_str(name)
    }
}
