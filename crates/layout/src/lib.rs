use thiserror::Error;
use trellis_types::Edge;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Node {0} does not exist in this tree.")]
    UnknownNode(NodeId),
    #[error("Cannot add a child to {0}: nodes with measure functions cannot have children.")]
    MeasuredNodeCannotHaveChildren(NodeId),
    #[error("Cannot set a measure function on {0}: nodes with measure functions cannot have children.")]
    ChildrenPreventMeasureFunc(NodeId),
    #[error("Child {0} already has an owner, it must be removed first.")]
    ChildAlreadyOwned(NodeId),
    #[error("{child} is not a child of {parent}.")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("Child index {index} is out of range for {parent} with {count} children.")]
    ChildIndexOutOfRange {
        parent: NodeId,
        index: usize,
        count: usize,
    },
    #[error("Only leaf nodes with custom measure functions should manually mark themselves as dirty ({0}).")]
    MarkDirtyWithoutMeasure(NodeId),
    #[error("Cannot reset {0}: it still has children or an owner.")]
    ResetWithChildrenOrOwner(NodeId),
    #[error("Point scale factor must not be negative, got {0}.")]
    InvalidPointScaleFactor(f32),
    #[error("Cannot read edge {0:?} from a computed layout.")]
    InvalidLayoutEdge(Edge),
}

pub mod axis;
pub mod cache;
pub mod config;
pub mod engine;
pub mod layout;
pub mod node;
pub mod print;
pub mod rounding;
pub mod tree;

pub use self::config::{ExperimentalFeature, LayoutConfig};
pub use self::engine::LayoutStats;
pub use self::layout::{CachedMeasurement, Layout, MAX_CACHED_MEASUREMENTS};
pub use self::node::{BaselineFunc, CloneNodeFunc, DirtiedFunc, MeasureFunc, Node, NodeId, NodeType, PrintFunc};
pub use self::print::PrintOptions;
pub use self::rounding::round_value_to_pixel_grid;
pub use self::tree::LayoutTree;

// Re-export the primitives that appear in this crate's signatures.
pub use trellis_types::{Dimension, Direction, MeasureMode, Size, UNDEFINED};
