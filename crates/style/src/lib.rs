pub mod edges;
pub mod flex;
pub mod parsers;
pub mod style;
pub mod value;

pub use edges::Edges;
pub use flex::{Align, Display, FlexDirection, Justify, Overflow, PositionType, Wrap};
pub use parsers::{StyleParseError, apply_style_property, parse_edge_shorthand, parse_inline_style};
pub use style::Style;
pub use value::Value;
