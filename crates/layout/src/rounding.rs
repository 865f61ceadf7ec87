//! Snapping computed geometry to the physical pixel grid.
use crate::node::{NodeId, NodeType};
use crate::tree::LayoutTree;
use trellis_types::{Edge, floats_equal};

/// Rounds `value` to the nearest multiple of `1 / point_scale_factor`.
///
/// Exact halves round up. `force_ceil` and `force_floor` override the
/// rounding direction for values that are not already on the grid.
pub fn round_value_to_pixel_grid(
    value: f32,
    point_scale_factor: f32,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let mut scaled = value * point_scale_factor;
    let fraction = scaled % 1.0;
    if floats_equal(fraction, 0.0) {
        scaled -= fraction;
    } else if floats_equal(fraction, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        let round_up = !fraction.is_nan() && (fraction > 0.5 || floats_equal(fraction, 0.5));
        scaled = scaled - fraction + if round_up { 1.0 } else { 0.0 };
    }

    if scaled.is_nan() || point_scale_factor.is_nan() {
        f32::NAN
    } else {
        scaled / point_scale_factor
    }
}

/// True when `value` lands between two grid lines.
pub(crate) fn has_fraction(value: f32, point_scale_factor: f32) -> bool {
    let fraction = (value * point_scale_factor) % 1.0;
    !floats_equal(fraction, 0.0) && !floats_equal(fraction, 1.0)
}

/// Snaps the subtree under `id` in place.
///
/// Edges are rounded in absolute coordinates and sizes are derived from the
/// rounded edges, so adjacent boxes never open a gap. Text is floored on its
/// position and ceiled on fractional sizes so glyphs are not clipped.
pub(crate) fn round_layout(
    tree: &mut LayoutTree,
    id: NodeId,
    point_scale_factor: f32,
    absolute_left: f32,
    absolute_top: f32,
) {
    if point_scale_factor == 0.0 {
        return;
    }

    let node = &mut tree[id];
    let text = node.node_type == NodeType::Text;
    let layout = &mut node.layout;
    let left = layout.position[Edge::Left.index()];
    let top = layout.position[Edge::Top.index()];
    let width = layout.dimensions.width;
    let height = layout.dimensions.height;

    let absolute_node_left = absolute_left + left;
    let absolute_node_top = absolute_top + top;
    let absolute_node_right = absolute_node_left + width;
    let absolute_node_bottom = absolute_node_top + height;

    layout.position[Edge::Left.index()] =
        round_value_to_pixel_grid(left, point_scale_factor, false, text);
    layout.position[Edge::Top.index()] =
        round_value_to_pixel_grid(top, point_scale_factor, false, text);

    let fractional_width = has_fraction(width, point_scale_factor);
    let fractional_height = has_fraction(height, point_scale_factor);
    layout.dimensions.width = round_value_to_pixel_grid(
        absolute_node_right,
        point_scale_factor,
        text && fractional_width,
        text && !fractional_width,
    ) - round_value_to_pixel_grid(absolute_node_left, point_scale_factor, false, text);
    layout.dimensions.height = round_value_to_pixel_grid(
        absolute_node_bottom,
        point_scale_factor,
        text && fractional_height,
        text && !fractional_height,
    ) - round_value_to_pixel_grid(absolute_node_top, point_scale_factor, false, text);

    let children = node.children.clone();
    for child in children {
        round_layout(
            tree,
            child,
            point_scale_factor,
            absolute_node_left,
            absolute_node_top,
        );
    }
}
