use super::LayoutPass;
use crate::node::NodeId;
use log::warn;
use trellis_style::{Align, PositionType};

impl LayoutPass<'_> {
    /// The cross-axis alignment `child` actually gets inside `node`.
    pub(super) fn align_item(&self, node: NodeId, child: NodeId) -> Align {
        let parent = &self.tree[node].style;
        let align = match self.tree[child].style.align_self {
            Align::Auto => parent.align_items,
            own => own,
        };
        // Baselines only line up across a row.
        if align == Align::Baseline && parent.flex_direction.is_column() {
            return Align::FlexStart;
        }
        align
    }

    /// Distance from the top of `id` to its first baseline.
    ///
    /// Without a callback this is the baseline of the first child on the
    /// first line, preferring one aligned to the baseline, or the node's
    /// height when it has no such child.
    pub(super) fn baseline(&self, id: NodeId) -> f32 {
        let node = &self.tree[id];
        if let Some(callback) = node.baseline.as_ref() {
            let size = node.layout.measured_dimensions;
            let baseline = callback(node, size.width, size.height);
            if baseline.is_nan() {
                warn!("Baseline callback of {id} returned NaN, using its height");
                return size.height;
            }
            return baseline;
        }

        let mut baseline_child = None;
        for &child in &node.children {
            let child_node = &self.tree[child];
            if child_node.layout.line_index > 0 {
                break;
            }
            if child_node.style.position_type == PositionType::Absolute {
                continue;
            }
            if self.align_item(id, child) == Align::Baseline {
                baseline_child = Some(child);
                break;
            }
            baseline_child.get_or_insert(child);
        }

        match baseline_child {
            Some(child) => self.baseline(child) + self.tree[child].layout.top(),
            None => node.layout.measured_dimensions.height,
        }
    }

    /// Whether the children of `id` need the baseline pass.
    pub(super) fn is_baseline_layout(&self, id: NodeId) -> bool {
        let node = &self.tree[id];
        if node.style.flex_direction.is_column() {
            return false;
        }
        if node.style.align_items == Align::Baseline {
            return true;
        }
        node.children.iter().any(|&child| {
            let style = &self.tree[child].style;
            style.position_type == PositionType::Relative && style.align_self == Align::Baseline
        })
    }
}
