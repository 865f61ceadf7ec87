pub mod geometry;
pub mod mode;

pub use geometry::{Dimension, Edge, Size, UNDEFINED, floats_equal, is_undefined};
pub use mode::{Direction, MeasureMode};
