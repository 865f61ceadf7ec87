//! Shortcuts for nodes whose size does not depend on flex children.
use super::LayoutPass;
use crate::node::NodeId;
use log::trace;
use trellis_style::FlexDirection;
use trellis_types::MeasureMode;

fn is_content_sized(mode: MeasureMode) -> bool {
    matches!(mode, MeasureMode::Undefined | MeasureMode::AtMost)
}

impl LayoutPass<'_> {
    /// Sizes a leaf through its measure callback.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn measure_leaf(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
    ) {
        let node = &self.tree[id];
        let padding_border_row =
            node.padding_and_border_for_axis(FlexDirection::Row, available_width);
        let padding_border_column =
            node.padding_and_border_for_axis(FlexDirection::Column, available_width);
        let margin_row = node.margin_for_axis(FlexDirection::Row, available_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, available_width);

        // The callback never sees a negative size.
        let inner_width = if available_width.is_nan() {
            available_width
        } else {
            (available_width - margin_row - padding_border_row).max(0.0)
        };
        let inner_height = if available_height.is_nan() {
            available_height
        } else {
            (available_height - margin_column - padding_border_column).max(0.0)
        };

        let (width, height) =
            if width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly {
                (available_width - margin_row, available_height - margin_column)
            } else {
                let measured = match node.measure.as_ref() {
                    Some(measure) => {
                        self.stats.measure_calls += 1;
                        measure(node, inner_width, width_mode, inner_height, height_mode)
                    }
                    None => return,
                };
                trace!(
                    "measure {id}: {inner_width}x{inner_height} -> {}x{}",
                    measured.width, measured.height
                );
                (
                    if is_content_sized(width_mode) {
                        measured.width + padding_border_row
                    } else {
                        available_width - margin_row
                    },
                    if is_content_sized(height_mode) {
                        measured.height + padding_border_column
                    } else {
                        available_height - margin_column
                    },
                )
            };

        let width = node.bound_axis(FlexDirection::Row, width, owner_width, owner_width);
        let height = node.bound_axis(FlexDirection::Column, height, owner_height, owner_width);
        let measured = &mut self.tree[id].layout.measured_dimensions;
        measured.width = width;
        measured.height = height;
    }

    /// A childless container is as large as its padding and border unless
    /// told otherwise.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn size_empty_container(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
    ) {
        let node = &self.tree[id];
        let width = if is_content_sized(width_mode) {
            node.padding_and_border_for_axis(FlexDirection::Row, owner_width)
        } else {
            available_width - node.margin_for_axis(FlexDirection::Row, owner_width)
        };
        let height = if is_content_sized(height_mode) {
            node.padding_and_border_for_axis(FlexDirection::Column, owner_width)
        } else {
            available_height - node.margin_for_axis(FlexDirection::Column, owner_width)
        };

        let width = node.bound_axis(FlexDirection::Row, width, owner_width, owner_width);
        let height = node.bound_axis(FlexDirection::Column, height, owner_height, owner_width);
        let measured = &mut self.tree[id].layout.measured_dimensions;
        measured.width = width;
        measured.height = height;
    }

    /// Returns `true` when the constraints alone fix the node's size, in
    /// which case the measured dimensions have been written.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn try_fixed_size(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
    ) -> bool {
        let no_width = !available_width.is_nan()
            && width_mode == MeasureMode::AtMost
            && available_width <= 0.0;
        let no_height = !available_height.is_nan()
            && height_mode == MeasureMode::AtMost
            && available_height <= 0.0;
        let both_exact = width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly;
        if !(no_width || no_height || both_exact) {
            return false;
        }

        let node = &self.tree[id];
        let width = if available_width.is_nan()
            || (width_mode == MeasureMode::AtMost && available_width < 0.0)
        {
            0.0
        } else {
            available_width - node.margin_for_axis(FlexDirection::Row, owner_width)
        };
        let height = if available_height.is_nan()
            || (height_mode == MeasureMode::AtMost && available_height < 0.0)
        {
            0.0
        } else {
            available_height - node.margin_for_axis(FlexDirection::Column, owner_width)
        };

        let width = node.bound_axis(FlexDirection::Row, width, owner_width, owner_width);
        let height = node.bound_axis(FlexDirection::Column, height, owner_height, owner_width);
        let measured = &mut self.tree[id].layout.measured_dimensions;
        measured.width = width;
        measured.height = height;
        true
    }
}
