//! Sizing and placing absolutely positioned children.
use super::LayoutPass;
use crate::axis::{cross_axis, leading, resolve_flex_direction};
use crate::node::NodeId;
use trellis_style::{Align, FlexDirection, Justify, Wrap};
use trellis_types::{Dimension, Direction, MeasureMode, UNDEFINED};

impl LayoutPass<'_> {
    /// Lays out `child` against the border box of `node`, whose measured
    /// size is already final.
    pub(super) fn absolute_layout_child(
        &mut self,
        node: NodeId,
        child: NodeId,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        direction: Direction,
    ) {
        let main_axis = resolve_flex_direction(self.tree[node].style.flex_direction, direction);
        let cross = cross_axis(main_axis, direction);
        let is_main_axis_row = main_axis.is_row();

        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;

        let c = &self.tree[child];
        let n = &self.tree[node];
        let margin_row = c.margin_for_axis(FlexDirection::Row, width);
        let margin_column = c.margin_for_axis(FlexDirection::Column, width);

        if c.is_style_dim_defined(FlexDirection::Row, width) {
            child_width = c
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .unwrap_or(UNDEFINED)
                + margin_row;
        } else if c.is_leading_position_defined(FlexDirection::Row)
            && c.is_trailing_position_defined(FlexDirection::Row)
        {
            // Both offsets set: stretch between them.
            child_width = n.layout.measured_dimensions.width
                - (n.leading_border(FlexDirection::Row) + n.trailing_border(FlexDirection::Row))
                - (c.leading_position(FlexDirection::Row, width)
                    + c.trailing_position(FlexDirection::Row, width));
            child_width = c.bound_axis(FlexDirection::Row, child_width, width, width);
        }

        if c.is_style_dim_defined(FlexDirection::Column, height) {
            child_height = c
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .unwrap_or(UNDEFINED)
                + margin_column;
        } else if c.is_leading_position_defined(FlexDirection::Column)
            && c.is_trailing_position_defined(FlexDirection::Column)
        {
            child_height = n.layout.measured_dimensions.height
                - (n.leading_border(FlexDirection::Column)
                    + n.trailing_border(FlexDirection::Column))
                - (c.leading_position(FlexDirection::Column, height)
                    + c.trailing_position(FlexDirection::Column, height));
            child_height = c.bound_axis(FlexDirection::Column, child_height, height, width);
        }

        // With exactly one side known, the aspect ratio gives the other.
        if child_width.is_nan() != child_height.is_nan() {
            if let Some(ratio) = c.style.aspect_ratio {
                if child_width.is_nan() {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                } else {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                }
            }
        }

        if child_width.is_nan() || child_height.is_nan() {
            let mut child_width_mode = if child_width.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            let child_height_mode = if child_height.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };

            // Let content such as text wrap inside a sized owner.
            if !is_main_axis_row
                && child_width.is_nan()
                && width_mode != MeasureMode::Undefined
                && !width.is_nan()
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }

            self.layout_node_internal(
                child,
                child_width,
                child_height,
                direction,
                child_width_mode,
                child_height_mode,
                child_width,
                child_height,
                false,
                "abs-measure",
            );
            let c = &self.tree[child];
            child_width = c.layout.measured_dimensions.width
                + c.margin_for_axis(FlexDirection::Row, width);
            child_height = c.layout.measured_dimensions.height
                + c.margin_for_axis(FlexDirection::Column, width);
        }

        self.layout_node_internal(
            child,
            child_width,
            child_height,
            direction,
            MeasureMode::Exactly,
            MeasureMode::Exactly,
            child_width,
            child_height,
            true,
            "abs-layout",
        );

        let align = self.align_item(node, child);
        let n = &self.tree[node];
        let c = &self.tree[child];
        let node_main = n.measured(main_axis);
        let node_cross = n.measured(cross);
        let child_main = c.measured(main_axis);
        let child_cross = c.measured(cross);
        let main_axis_size = if is_main_axis_row { width } else { height };
        let cross_axis_size = if is_main_axis_row { height } else { width };

        let main_position = if c.is_trailing_position_defined(main_axis)
            && !c.is_leading_position_defined(main_axis)
        {
            Some(
                node_main
                    - child_main
                    - n.trailing_border(main_axis)
                    - c.trailing_margin(main_axis, width)
                    - c.trailing_position(main_axis, main_axis_size),
            )
        } else if !c.is_leading_position_defined(main_axis)
            && n.style.justify_content == Justify::Center
        {
            Some((node_main - child_main) / 2.0)
        } else if !c.is_leading_position_defined(main_axis)
            && n.style.justify_content == Justify::FlexEnd
        {
            Some(node_main - child_main)
        } else {
            None
        };

        let wrap_reverse = n.style.flex_wrap == Wrap::WrapReverse;
        let cross_position = if c.is_trailing_position_defined(cross)
            && !c.is_leading_position_defined(cross)
        {
            Some(
                node_cross
                    - child_cross
                    - n.trailing_border(cross)
                    - c.trailing_margin(cross, width)
                    - c.trailing_position(cross, cross_axis_size),
            )
        } else if !c.is_leading_position_defined(cross) && align == Align::Center {
            Some((node_cross - child_cross) / 2.0)
        } else if !c.is_leading_position_defined(cross)
            && ((align == Align::FlexEnd) ^ wrap_reverse)
        {
            Some(node_cross - child_cross)
        } else {
            None
        };

        let layout = &mut self.tree[child].layout;
        if let Some(position) = main_position {
            layout.position[leading(main_axis).index()] = position;
        }
        if let Some(position) = cross_position {
            layout.position[leading(cross).index()] = position;
        }
    }
}
