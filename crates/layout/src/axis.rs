//! Mapping flex directions to physical edges and dimensions.
use trellis_style::FlexDirection;
use trellis_types::{Dimension, Direction, Edge};

/// Edge where the axis starts.
pub fn leading(axis: FlexDirection) -> Edge {
    match axis {
        FlexDirection::Column => Edge::Top,
        FlexDirection::ColumnReverse => Edge::Bottom,
        FlexDirection::Row => Edge::Left,
        FlexDirection::RowReverse => Edge::Right,
    }
}

/// Edge where the axis ends.
pub fn trailing(axis: FlexDirection) -> Edge {
    match axis {
        FlexDirection::Column => Edge::Bottom,
        FlexDirection::ColumnReverse => Edge::Top,
        FlexDirection::Row => Edge::Right,
        FlexDirection::RowReverse => Edge::Left,
    }
}

/// The edge the flow position along `axis` is recorded against.
pub fn pos(axis: FlexDirection) -> Edge {
    leading(axis)
}

pub fn dim(axis: FlexDirection) -> Dimension {
    if axis.is_row() {
        Dimension::Width
    } else {
        Dimension::Height
    }
}

/// Row axes flip under right-to-left text.
pub fn resolve_flex_direction(axis: FlexDirection, direction: Direction) -> FlexDirection {
    if direction == Direction::Rtl {
        match axis {
            FlexDirection::Row => FlexDirection::RowReverse,
            FlexDirection::RowReverse => FlexDirection::Row,
            other => other,
        }
    } else {
        axis
    }
}

pub fn cross_axis(axis: FlexDirection, direction: Direction) -> FlexDirection {
    if axis.is_column() {
        resolve_flex_direction(FlexDirection::Row, direction)
    } else {
        FlexDirection::Column
    }
}
