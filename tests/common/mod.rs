pub mod fixtures;

use serde_json::Value as Json;
use trellis::{Layout, LayoutTree, NodeId, NodeSpec};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a tree from a JSON [`NodeSpec`] and returns it with its root.
pub fn build_tree(spec: Json) -> Result<(LayoutTree, NodeId), Box<dyn std::error::Error>> {
    let mut tree = LayoutTree::new();
    let root = build_into(&mut tree, spec)?;
    Ok((tree, root))
}

/// Builds a JSON [`NodeSpec`] into an existing tree.
pub fn build_into(tree: &mut LayoutTree, spec: Json) -> Result<NodeId, Box<dyn std::error::Error>> {
    let spec: NodeSpec = serde_json::from_value(spec)?;
    Ok(spec.build(tree)?)
}

/// The `index`-th child of `parent`.
pub fn child(tree: &LayoutTree, parent: NodeId, index: usize) -> Result<NodeId, Box<dyn std::error::Error>> {
    Ok(tree.child(parent, index)?)
}

/// `(left, top, width, height)` of a laid-out node.
pub fn frame(layout: &Layout) -> (f32, f32, f32, f32) {
    (layout.left(), layout.top(), layout.width(), layout.height())
}

/// Asserts a node's `(left, top, width, height)` within layout tolerance.
#[macro_export]
macro_rules! assert_frame {
    ($tree:expr, $node:expr, ($left:expr, $top:expr, $width:expr, $height:expr)) => {{
        let actual = $crate::common::frame($tree.layout($node)?);
        let expected: (f32, f32, f32, f32) = ($left, $top, $width, $height);
        let close = |a: f32, b: f32| (a - b).abs() < 0.001;
        assert!(
            close(actual.0, expected.0)
                && close(actual.1, expected.1)
                && close(actual.2, expected.2)
                && close(actual.3, expected.3),
            "frame of {} was {:?}, expected {:?}",
            $node,
            actual,
            expected
        );
    }};
}
