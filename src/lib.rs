//! Flexbox layout for trees of boxes.
//!
//! Build a [`LayoutTree`], give its nodes a [`Style`], then call
//! [`LayoutTree::calculate_layout`] and read each node's [`Layout`]. Leaves
//! whose size depends on content (text, images) report it through a
//! [`MeasureFunc`].
pub mod builder;
pub mod error;

pub use builder::{NodeSpec, content_measure};
pub use error::TrellisError;

pub use trellis_layout::{
    BaselineFunc, CachedMeasurement, CloneNodeFunc, DirtiedFunc, ExperimentalFeature, Layout, LayoutConfig,
    LayoutError, LayoutStats, LayoutTree, MeasureFunc, Node, NodeId, NodeType, PrintFunc,
    PrintOptions, round_value_to_pixel_grid,
};
pub use trellis_style::{
    Align, Display, Edges, FlexDirection, Justify, Overflow, PositionType, Style,
    StyleParseError, Value, Wrap, parse_inline_style,
};
pub use trellis_types::{Dimension, Direction, Edge, MeasureMode, Size, UNDEFINED};
