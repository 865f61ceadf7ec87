//! The per-node flexbox algorithm.
//!
//! Steps, in order: resolve the box edges, short-circuit leaves, compute each
//! child's flex basis, break children into lines, resolve flexible lengths,
//! justify along the main axis, align along the cross axis, align the lines,
//! settle the container's own size, then place absolute children and
//! trailing offsets.
use super::LayoutPass;
use crate::axis::{cross_axis, dim, leading, pos, resolve_flex_direction, trailing};
use crate::config::ExperimentalFeature;
use crate::layout::Layout;
use crate::node::{Node, NodeId};
use trellis_style::{Align, Display, FlexDirection, Justify, Overflow, PositionType, Value, Wrap};
use trellis_types::{Dimension, Direction, MeasureMode, Size, UNDEFINED, floats_equal};

/// Values fixed for the duration of one `layout_impl` call.
#[derive(Debug, Clone, Copy)]
struct Container {
    id: NodeId,
    direction: Direction,
    main_axis: FlexDirection,
    cross_axis: FlexDirection,
    main_owner_size: f32,
    inner_width: f32,
    inner_height: f32,
    inner_cross: f32,
    cross_mode: MeasureMode,
    perform_layout: bool,
}

impl Container {
    fn is_main_axis_row(&self) -> bool {
        self.main_axis.is_row()
    }
}

/// One flex line and the running totals used to lay it out.
#[derive(Debug, Default)]
struct FlexLine {
    items_on_line: usize,
    size_consumed: f32,
    total_flex_grow_factors: f32,
    total_flex_shrink_scaled_factors: f32,
    end_of_line_index: usize,
    relative_children: Vec<NodeId>,
    remaining_free_space: f32,
    main_dim: f32,
    cross_dim: f32,
}

/// Caps `size` at the max style of `axis`. An unconstrained mode becomes
/// `AtMost` when a max exists.
fn constrain_max_size_for_mode(
    node: &Node,
    axis: FlexDirection,
    owner_axis_size: f32,
    owner_width: f32,
    mode: &mut MeasureMode,
    size: &mut f32,
) {
    let max = node
        .style
        .max_dimension(dim(axis))
        .resolve(owner_axis_size)
        .map(|max| max + node.margin_for_axis(axis, owner_width))
        .filter(|max| !max.is_nan());
    let Some(max) = max else {
        return;
    };
    match mode {
        MeasureMode::Exactly | MeasureMode::AtMost => {
            if size.is_nan() || *size >= max {
                *size = max;
            }
        }
        MeasureMode::Undefined => {
            *mode = MeasureMode::AtMost;
            *size = max;
        }
    }
}

/// Space left for children along `axis` once margin, padding and border are
/// taken out, clamped to the node's own min and max.
fn available_inner_dim(node: &Node, axis: FlexDirection, available: f32, owner_size: f32) -> f32 {
    let (axis, dimension) = if axis.is_row() {
        (FlexDirection::Row, Dimension::Width)
    } else {
        (FlexDirection::Column, Dimension::Height)
    };
    let padding_and_border = node.padding_and_border_for_axis(axis, owner_size);
    let inner = available - node.margin_for_axis(axis, owner_size) - padding_and_border;
    if inner.is_nan() {
        return inner;
    }
    let min_inner = node
        .style
        .min_dimension(dimension)
        .resolve(owner_size)
        .map_or(0.0, |min| min - padding_and_border);
    let max_inner = node
        .style
        .max_dimension(dimension)
        .resolve(owner_size)
        .map_or(f32::MAX, |max| max - padding_and_border);
    inner.min(max_inner).max(min_inner)
}

/// Copies the resolved margin, border and padding into the layout record.
fn record_box_edges(node: &mut Node, direction: Direction, owner_width: f32) {
    let row = resolve_flex_direction(FlexDirection::Row, direction);
    for axis in [row, FlexDirection::Column] {
        let lead = leading(axis).index();
        let trail = trailing(axis).index();
        let margin = (
            node.leading_margin(axis, owner_width),
            node.trailing_margin(axis, owner_width),
        );
        let border = (node.leading_border(axis), node.trailing_border(axis));
        let padding = (
            node.leading_padding(axis, owner_width),
            node.trailing_padding(axis, owner_width),
        );

        let layout = &mut node.layout;
        (layout.margin[lead], layout.margin[trail]) = margin;
        (layout.border[lead], layout.border[trail]) = border;
        (layout.padding[lead], layout.padding[trail]) = padding;
    }
}

fn axis_size(is_row: bool, width: f32, height: f32) -> f32 {
    if is_row { width } else { height }
}

impl LayoutPass<'_> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn layout_impl(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        owner_direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
        perform_layout: bool,
    ) {
        let node = &mut self.tree[id];
        let direction = node.resolve_direction(owner_direction);
        node.layout.direction = direction;
        record_box_edges(node, direction, owner_width);

        if node.measure.is_some() {
            self.measure_leaf(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
            );
            return;
        }
        if node.children.is_empty() {
            self.size_empty_container(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
            );
            return;
        }
        if !perform_layout
            && self.try_fixed_size(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
            )
        {
            return;
        }

        // Work starts here, so every child must be ours to write.
        self.tree.clone_children_if_needed(id);
        self.tree[id].layout.had_overflow = false;
        let children = self.tree[id].children.clone();
        let child_count = children.len();

        // STEP 1: values for the rest of the algorithm.
        let node = &self.tree[id];
        let main_axis = resolve_flex_direction(node.style.flex_direction, direction);
        let cross = cross_axis(main_axis, direction);
        let is_main_axis_row = main_axis.is_row();
        let is_wrap = node.style.flex_wrap != Wrap::NoWrap;

        let main_owner_size = axis_size(is_main_axis_row, owner_width, owner_height);
        let cross_owner_size = axis_size(is_main_axis_row, owner_height, owner_width);

        let leading_padding_and_border_cross = node.leading_padding_and_border(cross, owner_width);
        let padding_and_border_main = node.padding_and_border_for_axis(main_axis, owner_width);
        let padding_and_border_cross = node.padding_and_border_for_axis(cross, owner_width);

        let mut main_mode = if is_main_axis_row { width_mode } else { height_mode };
        let cross_mode = if is_main_axis_row { height_mode } else { width_mode };

        let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);

        let main_dimension = dim(main_axis);
        let inner_main_bound = |value: Value| {
            value.resolve(main_owner_size).unwrap_or(UNDEFINED) - padding_and_border_main
        };
        let min_inner_main = inner_main_bound(node.style.min_dimension(main_dimension));
        let max_inner_main = inner_main_bound(node.style.max_dimension(main_dimension));

        // STEP 2: available size in both directions.
        let inner_width = available_inner_dim(node, FlexDirection::Row, available_width, owner_width);
        let inner_height =
            available_inner_dim(node, FlexDirection::Column, available_height, owner_height);
        let mut available_inner_main = axis_size(is_main_axis_row, inner_width, inner_height);
        let inner_cross = axis_size(is_main_axis_row, inner_height, inner_width);

        let container = Container {
            id,
            direction,
            main_axis,
            cross_axis: cross,
            main_owner_size,
            inner_width,
            inner_height,
            inner_cross,
            cross_mode,
            perform_layout,
        };

        // STEP 3: flex basis of every child.
        let total_outer_flex_basis =
            self.compute_flex_basis_for_children(&container, width_mode, height_mode);

        let flex_basis_overflows = main_mode != MeasureMode::Undefined
            && total_outer_flex_basis > available_inner_main;
        if is_wrap && flex_basis_overflows && main_mode == MeasureMode::AtMost {
            main_mode = MeasureMode::Exactly;
        }

        // STEP 4: break the children into lines.
        let mut start_of_line = 0;
        let mut line_count = 0;
        let mut total_line_cross_dim = 0.0;
        let mut max_line_main_dim: f32 = 0.0;

        while start_of_line < child_count {
            let mut line =
                self.collect_flex_line(&container, start_of_line, line_count, available_inner_main);
            let end_of_line = line.end_of_line_index;
            let can_skip_flex = !perform_layout && cross_mode == MeasureMode::Exactly;

            // STEP 5: resolve flexible lengths on the main axis.
            let mut size_based_on_content = false;
            if main_mode != MeasureMode::Exactly {
                if !min_inner_main.is_nan() && line.size_consumed < min_inner_main {
                    available_inner_main = min_inner_main;
                } else if !max_inner_main.is_nan() && line.size_consumed > max_inner_main {
                    available_inner_main = max_inner_main;
                } else {
                    let node = &mut self.tree[id];
                    let legacy = node.config.use_legacy_stretch_behaviour;
                    if !legacy
                        && (line.total_flex_grow_factors == 0.0 || node.resolve_flex_grow() == 0.0)
                    {
                        // Nothing can grow into the extra space, so the
                        // content decides the size.
                        available_inner_main = line.size_consumed;
                    }
                    if legacy {
                        node.layout.did_use_legacy_flag = true;
                    }
                    size_based_on_content = !legacy;
                }
            }

            if !size_based_on_content && !available_inner_main.is_nan() {
                line.remaining_free_space = available_inner_main - line.size_consumed;
            } else if line.size_consumed < 0.0 {
                // Content sized with negative margins: it gets 0 points.
                line.remaining_free_space = -line.size_consumed;
            }

            if !can_skip_flex {
                self.resolve_flexible_length(
                    &container,
                    &mut line,
                    available_inner_main,
                    flex_basis_overflows,
                );
            }
            self.tree[id].layout.had_overflow |= line.remaining_free_space < 0.0;

            // STEP 6: main-axis justification and the line's cross size.
            self.justify_main_axis(
                &container,
                &mut line,
                start_of_line,
                main_mode,
                owner_width,
                available_inner_main,
            );

            let node = &self.tree[id];
            let mut container_cross_axis = inner_cross;
            if matches!(cross_mode, MeasureMode::Undefined | MeasureMode::AtMost) {
                container_cross_axis = node.bound_axis(
                    cross,
                    line.cross_dim + padding_and_border_cross,
                    cross_owner_size,
                    owner_width,
                ) - padding_and_border_cross;
            }
            if !is_wrap && cross_mode == MeasureMode::Exactly {
                line.cross_dim = inner_cross;
            }
            line.cross_dim = node.bound_axis(
                cross,
                line.cross_dim + padding_and_border_cross,
                cross_owner_size,
                owner_width,
            ) - padding_and_border_cross;

            // STEP 7: cross-axis alignment within the line.
            if perform_layout {
                self.align_line_cross_axis(
                    &container,
                    &children[start_of_line..end_of_line],
                    &line,
                    container_cross_axis,
                    total_line_cross_dim,
                    leading_padding_and_border_cross,
                    available_inner_main,
                );
            }

            total_line_cross_dim += line.cross_dim;
            max_line_main_dim = max_line_main_dim.max(line.main_dim);
            line_count += 1;
            start_of_line = end_of_line;
        }

        // STEP 8: align the lines themselves.
        if perform_layout
            && (line_count > 1 || self.is_baseline_layout(id))
            && !inner_cross.is_nan()
        {
            self.align_lines(
                &container,
                &children,
                line_count,
                total_line_cross_dim,
                leading_padding_and_border_cross,
            );
        }

        // STEP 9: the container's own size.
        let node = &self.tree[id];
        let mut measured = Size::new(
            node.bound_axis(
                FlexDirection::Row,
                available_width - margin_row,
                owner_width,
                owner_width,
            ),
            node.bound_axis(
                FlexDirection::Column,
                available_height - margin_column,
                owner_height,
                owner_width,
            ),
        );
        let scroll = node.style.overflow == Overflow::Scroll;

        if main_mode == MeasureMode::Undefined || (!scroll && main_mode == MeasureMode::AtMost) {
            measured.set(
                dim(main_axis),
                node.bound_axis(main_axis, max_line_main_dim, main_owner_size, owner_width),
            );
        } else if main_mode == MeasureMode::AtMost && scroll {
            let content =
                node.bound_axis_within_min_and_max(main_axis, max_line_main_dim, main_owner_size);
            measured.set(
                dim(main_axis),
                (available_inner_main + padding_and_border_main)
                    .min(content)
                    .max(padding_and_border_main),
            );
        }

        if cross_mode == MeasureMode::Undefined || (!scroll && cross_mode == MeasureMode::AtMost) {
            measured.set(
                dim(cross),
                node.bound_axis(
                    cross,
                    total_line_cross_dim + padding_and_border_cross,
                    cross_owner_size,
                    owner_width,
                ),
            );
        } else if cross_mode == MeasureMode::AtMost && scroll {
            let content = node.bound_axis_within_min_and_max(
                cross,
                total_line_cross_dim + padding_and_border_cross,
                cross_owner_size,
            );
            measured.set(
                dim(cross),
                (inner_cross + padding_and_border_cross)
                    .min(content)
                    .max(padding_and_border_cross),
            );
        }
        let wrap_reverse = node.style.flex_wrap == Wrap::WrapReverse;
        self.tree[id].layout.measured_dimensions = measured;

        if !perform_layout {
            return;
        }

        // Lines were stacked top-down; flip them for wrap-reverse.
        if wrap_reverse {
            let container_cross = *measured.get(dim(cross));
            for &child in &children {
                let child_node = &mut self.tree[child];
                if child_node.style.position_type == PositionType::Relative {
                    let slot = pos(cross).index();
                    child_node.layout.position[slot] = container_cross
                        - child_node.layout.position[slot]
                        - child_node.measured(cross);
                }
            }
        }

        // STEP 10: absolutely positioned children.
        let absolute_width_mode = if is_main_axis_row { main_mode } else { cross_mode };
        for &child in &children {
            if self.tree[child].style.position_type != PositionType::Absolute {
                continue;
            }
            self.absolute_layout_child(
                id,
                child,
                inner_width,
                absolute_width_mode,
                inner_height,
                direction,
            );
        }

        // STEP 11: trailing offsets for reversed axes.
        let needs_main_trailing = main_axis.is_reverse();
        let needs_cross_trailing = cross.is_reverse();
        if needs_main_trailing || needs_cross_trailing {
            for &child in &children {
                if self.tree[child].style.display == Display::None {
                    continue;
                }
                if needs_main_trailing {
                    self.set_child_trailing_position(id, child, main_axis);
                }
                if needs_cross_trailing {
                    self.set_child_trailing_position(id, child, cross);
                }
            }
        }
    }

    fn set_child_trailing_position(&mut self, node: NodeId, child: NodeId, axis: FlexDirection) {
        let node_size = self.tree[node].measured(axis);
        let child_node = &mut self.tree[child];
        let size = child_node.measured(axis);
        let position = child_node.layout.position[pos(axis).index()];
        child_node.layout.position[trailing(axis).index()] = node_size - size - position;
    }

    /// Zeroes the geometry of a hidden subtree.
    fn zero_out_layout(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.tree[current];
            node.layout = Layout {
                dimensions: Size::zero(),
                measured_dimensions: Size::zero(),
                ..Layout::default()
            };
            node.has_new_layout = true;
            self.tree.clone_children_if_needed(current);
            stack.extend(self.tree[current].children.iter().copied());
        }
    }

    fn compute_flex_basis_for_children(
        &mut self,
        container: &Container,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
    ) -> f32 {
        let children = self.tree[container.id].children.clone();
        let main_mode = if container.is_main_axis_row() {
            width_mode
        } else {
            height_mode
        };

        // A lone child that can both grow and shrink will be flexed to fill
        // the line exactly, so measuring it first is wasted work.
        let mut single_flex_child = None;
        if main_mode == MeasureMode::Exactly {
            for &child in &children {
                let child_node = &self.tree[child];
                if !child_node.is_flexible() {
                    continue;
                }
                if single_flex_child.is_some()
                    || floats_equal(child_node.resolve_flex_grow(), 0.0)
                    || floats_equal(child_node.resolve_flex_shrink(), 0.0)
                {
                    single_flex_child = None;
                    break;
                }
                single_flex_child = Some(child);
            }
        }

        let mut total_outer_flex_basis = 0.0;
        for child in children {
            self.tree[child].resolve_dimensions();
            if self.tree[child].style.display == Display::None {
                self.zero_out_layout(child);
                let child_node = &mut self.tree[child];
                child_node.has_new_layout = true;
                child_node.is_dirty = false;
                continue;
            }
            if container.perform_layout {
                let child_node = &mut self.tree[child];
                let child_direction = child_node.resolve_direction(container.direction);
                let is_row = container.is_main_axis_row();
                child_node.set_position(
                    child_direction,
                    axis_size(is_row, container.inner_width, container.inner_height),
                    axis_size(is_row, container.inner_height, container.inner_width),
                    container.inner_width,
                );
            }
            if self.tree[child].style.position_type == PositionType::Absolute {
                continue;
            }

            if single_flex_child == Some(child) {
                let generation = self.generation;
                let layout = &mut self.tree[child].layout;
                layout.computed_flex_basis_generation = generation;
                layout.computed_flex_basis = Some(0.0);
            } else {
                self.compute_flex_basis_for_child(container, child, width_mode, height_mode);
            }

            let child_node = &self.tree[child];
            total_outer_flex_basis += child_node.layout.computed_flex_basis.unwrap_or(UNDEFINED)
                + child_node.margin_for_axis(container.main_axis, container.inner_width);
        }
        total_outer_flex_basis
    }

    fn compute_flex_basis_for_child(
        &mut self,
        container: &Container,
        child: NodeId,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
    ) {
        let width = container.inner_width;
        let height = container.inner_height;
        let is_main_axis_row = container.is_main_axis_row();
        let main_axis = container.main_axis;
        let main_axis_size = axis_size(is_main_axis_row, width, height);

        let child_node = &self.tree[child];
        let resolved_flex_basis = child_node
            .resolve_flex_basis()
            .resolve(main_axis_size)
            .filter(|_| !main_axis_size.is_nan());
        let is_row_style_dim_defined = child_node.is_style_dim_defined(FlexDirection::Row, width);
        let is_column_style_dim_defined =
            child_node.is_style_dim_defined(FlexDirection::Column, height);

        let basis = if let Some(flex_basis) = resolved_flex_basis {
            let stale = child_node
                .config
                .is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis)
                && child_node.layout.computed_flex_basis_generation != self.generation;
            if child_node.layout.computed_flex_basis.is_none() || stale {
                let padding_and_border = child_node.padding_and_border_for_axis(main_axis, width);
                Some(flex_basis.max(padding_and_border))
            } else {
                None
            }
        } else if is_main_axis_row && is_row_style_dim_defined {
            // The width is definite, so use that as the flex basis.
            let padding_and_border =
                child_node.padding_and_border_for_axis(FlexDirection::Row, width);
            let size = child_node
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .unwrap_or(UNDEFINED);
            Some(size.max(padding_and_border))
        } else if !is_main_axis_row && is_column_style_dim_defined {
            let padding_and_border =
                child_node.padding_and_border_for_axis(FlexDirection::Column, width);
            let size = child_node
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .unwrap_or(UNDEFINED);
            Some(size.max(padding_and_border))
        } else {
            Some(self.measure_flex_basis(
                container,
                child,
                width_mode,
                height_mode,
                is_row_style_dim_defined,
                is_column_style_dim_defined,
            ))
        };

        let generation = self.generation;
        let layout = &mut self.tree[child].layout;
        if let Some(basis) = basis {
            layout.computed_flex_basis = Some(basis);
        }
        layout.computed_flex_basis_generation = generation;
    }

    /// Measures `child` under the container's constraints to find its
    /// hypothetical main size.
    fn measure_flex_basis(
        &mut self,
        container: &Container,
        child: NodeId,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        is_row_style_dim_defined: bool,
        is_column_style_dim_defined: bool,
    ) -> f32 {
        let width = container.inner_width;
        let height = container.inner_height;
        let is_main_axis_row = container.is_main_axis_row();

        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;
        let mut child_width_mode = MeasureMode::Undefined;
        let mut child_height_mode = MeasureMode::Undefined;

        let scroll = self.tree[container.id].style.overflow == Overflow::Scroll;
        let align = self.align_item(container.id, child);
        let child_node = &self.tree[child];
        let margin_row = child_node.margin_for_axis(FlexDirection::Row, width);
        let margin_column = child_node.margin_for_axis(FlexDirection::Column, width);

        if is_row_style_dim_defined {
            child_width = child_node
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .unwrap_or(UNDEFINED)
                + margin_row;
            child_width_mode = MeasureMode::Exactly;
        }
        if is_column_style_dim_defined {
            child_height = child_node
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .unwrap_or(UNDEFINED)
                + margin_column;
            child_height_mode = MeasureMode::Exactly;
        }

        // Browsers let a scroll container's main axis stay unconstrained.
        if (!is_main_axis_row || !scroll) && child_width.is_nan() && !width.is_nan() {
            child_width = width;
            child_width_mode = MeasureMode::AtMost;
        }
        if (is_main_axis_row || !scroll) && child_height.is_nan() && !height.is_nan() {
            child_height = height;
            child_height_mode = MeasureMode::AtMost;
        }

        let aspect_ratio = child_node.style.aspect_ratio;
        if let Some(ratio) = aspect_ratio {
            if !is_main_axis_row && child_width_mode == MeasureMode::Exactly {
                child_height = margin_column + (child_width - margin_row) / ratio;
                child_height_mode = MeasureMode::Exactly;
            } else if is_main_axis_row && child_height_mode == MeasureMode::Exactly {
                child_width = margin_row + (child_height - margin_column) * ratio;
                child_width_mode = MeasureMode::Exactly;
            }
        }

        // Stretched items take the container's exact cross size.
        let has_exact_width = !width.is_nan() && width_mode == MeasureMode::Exactly;
        let child_width_stretch =
            align == Align::Stretch && child_width_mode != MeasureMode::Exactly;
        if !is_main_axis_row && !is_row_style_dim_defined && has_exact_width && child_width_stretch
        {
            child_width = width;
            child_width_mode = MeasureMode::Exactly;
            if let Some(ratio) = aspect_ratio {
                child_height = (child_width - margin_row) / ratio;
                child_height_mode = MeasureMode::Exactly;
            }
        }

        let has_exact_height = !height.is_nan() && height_mode == MeasureMode::Exactly;
        let child_height_stretch =
            align == Align::Stretch && child_height_mode != MeasureMode::Exactly;
        if is_main_axis_row
            && !is_column_style_dim_defined
            && has_exact_height
            && child_height_stretch
        {
            child_height = height;
            child_height_mode = MeasureMode::Exactly;
            if let Some(ratio) = aspect_ratio {
                child_width = (child_height - margin_column) * ratio;
                child_width_mode = MeasureMode::Exactly;
            }
        }

        constrain_max_size_for_mode(
            child_node,
            FlexDirection::Row,
            width,
            width,
            &mut child_width_mode,
            &mut child_width,
        );
        constrain_max_size_for_mode(
            child_node,
            FlexDirection::Column,
            height,
            width,
            &mut child_height_mode,
            &mut child_height,
        );

        self.layout_node_internal(
            child,
            child_width,
            child_height,
            container.direction,
            child_width_mode,
            child_height_mode,
            width,
            height,
            false,
            "measure",
        );

        let child_node = &self.tree[child];
        child_node
            .measured(container.main_axis)
            .max(child_node.padding_and_border_for_axis(container.main_axis, width))
    }

    /// Gathers the children from `start` that fit on one line.
    fn collect_flex_line(
        &mut self,
        container: &Container,
        start: usize,
        line_index: usize,
        available_inner_main: f32,
    ) -> FlexLine {
        let node = &self.tree[container.id];
        let is_wrap = node.style.flex_wrap != Wrap::NoWrap;
        let children = node.children.clone();

        let mut line = FlexLine {
            end_of_line_index: children.len(),
            relative_children: Vec::with_capacity(children.len()),
            ..FlexLine::default()
        };

        for (index, &child) in children.iter().enumerate().skip(start) {
            let child_node = &mut self.tree[child];
            if child_node.style.display == Display::None
                || child_node.style.position_type == PositionType::Absolute
            {
                continue;
            }
            child_node.layout.line_index = line_index;

            let margin_main = child_node.margin_for_axis(container.main_axis, container.inner_width);
            let flex_basis = child_node.layout.computed_flex_basis.unwrap_or(UNDEFINED);
            let bounded_basis = child_node.bound_axis_within_min_and_max(
                container.main_axis,
                flex_basis,
                container.main_owner_size,
            );

            // A wrapping container starts a new line once this item would
            // overflow, unless it is the first on the line.
            if line.size_consumed + bounded_basis + margin_main > available_inner_main
                && is_wrap
                && line.items_on_line > 0
            {
                line.end_of_line_index = index;
                break;
            }

            line.size_consumed += bounded_basis + margin_main;
            line.items_on_line += 1;

            if child_node.is_flexible() {
                line.total_flex_grow_factors += child_node.resolve_flex_grow();
                // Shrinking is weighted by the basis, growing is not.
                line.total_flex_shrink_scaled_factors +=
                    -child_node.resolve_flex_shrink() * flex_basis;
            }
            line.relative_children.push(child);
        }

        if line.total_flex_grow_factors > 0.0 && line.total_flex_grow_factors < 1.0 {
            line.total_flex_grow_factors = 1.0;
        }
        if line.total_flex_shrink_scaled_factors > 0.0 && line.total_flex_shrink_scaled_factors < 1.0
        {
            line.total_flex_shrink_scaled_factors = 1.0;
        }
        line
    }

    /// Distributes the line's free space in two passes.
    ///
    /// The first pass finds items whose min or max clamps, freezes them and
    /// removes their share from the pool. The second sizes every item from
    /// what is left; frozen items clamp to the same size again.
    fn resolve_flexible_length(
        &mut self,
        container: &Container,
        line: &mut FlexLine,
        available_inner_main: f32,
        flex_basis_overflows: bool,
    ) {
        let original_free_space = line.remaining_free_space;
        self.distribute_free_space_first_pass(container, line, available_inner_main);
        let distributed = self.distribute_free_space_second_pass(
            container,
            line,
            available_inner_main,
            flex_basis_overflows,
        );
        line.remaining_free_space = original_free_space - distributed;
    }

    fn distribute_free_space_first_pass(
        &self,
        container: &Container,
        line: &mut FlexLine,
        available_inner_main: f32,
    ) {
        let main_axis = container.main_axis;
        let mut delta_free_space = 0.0;

        for &child in &line.relative_children {
            let child_node = &self.tree[child];
            let child_flex_basis = child_node.bound_axis_within_min_and_max(
                main_axis,
                child_node.layout.computed_flex_basis.unwrap_or(UNDEFINED),
                container.main_owner_size,
            );

            if line.remaining_free_space < 0.0 {
                let shrink_scaled = -child_node.resolve_flex_shrink() * child_flex_basis;
                if shrink_scaled.is_nan() || shrink_scaled == 0.0 {
                    continue;
                }
                let base = child_flex_basis
                    + line.remaining_free_space / line.total_flex_shrink_scaled_factors
                        * shrink_scaled;
                let bound =
                    child_node.bound_axis(main_axis, base, available_inner_main, container.inner_width);
                if !base.is_nan() && !bound.is_nan() && base != bound {
                    delta_free_space += bound - child_flex_basis;
                    line.total_flex_shrink_scaled_factors -= shrink_scaled;
                }
            } else if line.remaining_free_space > 0.0 {
                let grow = child_node.resolve_flex_grow();
                if grow.is_nan() || grow == 0.0 {
                    continue;
                }
                let base = child_flex_basis
                    + line.remaining_free_space / line.total_flex_grow_factors * grow;
                let bound =
                    child_node.bound_axis(main_axis, base, available_inner_main, container.inner_width);
                if !base.is_nan() && !bound.is_nan() && base != bound {
                    delta_free_space += bound - child_flex_basis;
                    line.total_flex_grow_factors -= grow;
                }
            }
        }
        line.remaining_free_space -= delta_free_space;
    }

    /// Sizes and lays out every item of the line, returning the space the
    /// items actually took from the pool.
    fn distribute_free_space_second_pass(
        &mut self,
        container: &Container,
        line: &FlexLine,
        available_inner_main: f32,
        flex_basis_overflows: bool,
    ) -> f32 {
        let main_axis = container.main_axis;
        let cross = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row();
        let is_wrap = self.tree[container.id].style.flex_wrap != Wrap::NoWrap;
        let remaining = line.remaining_free_space;
        let mut delta_free_space = 0.0;

        for &child in &line.relative_children {
            let align = self.align_item(container.id, child);
            let child_node = &self.tree[child];
            let child_flex_basis = child_node.bound_axis_within_min_and_max(
                main_axis,
                child_node.layout.computed_flex_basis.unwrap_or(UNDEFINED),
                container.main_owner_size,
            );
            let mut updated_main_size = child_flex_basis;

            if remaining < 0.0 {
                let shrink_scaled = -child_node.resolve_flex_shrink() * child_flex_basis;
                if shrink_scaled != 0.0 {
                    let total = line.total_flex_shrink_scaled_factors;
                    let child_size = if !total.is_nan() && total == 0.0 {
                        child_flex_basis + shrink_scaled
                    } else {
                        child_flex_basis + (remaining / total) * shrink_scaled
                    };
                    updated_main_size = child_node.bound_axis(
                        main_axis,
                        child_size,
                        available_inner_main,
                        container.inner_width,
                    );
                }
            } else if remaining > 0.0 {
                let grow = child_node.resolve_flex_grow();
                if !grow.is_nan() && grow != 0.0 {
                    updated_main_size = child_node.bound_axis(
                        main_axis,
                        child_flex_basis + remaining / line.total_flex_grow_factors * grow,
                        available_inner_main,
                        container.inner_width,
                    );
                }
            }
            delta_free_space += updated_main_size - child_flex_basis;

            let margin_main = child_node.margin_for_axis(main_axis, container.inner_width);
            let margin_cross = child_node.margin_for_axis(cross, container.inner_width);
            let auto_cross_margin = child_node.margin_leading_value(cross).is_auto()
                || child_node.margin_trailing_value(cross).is_auto();
            let cross_dim_defined = child_node.is_style_dim_defined(cross, container.inner_cross);

            let mut child_main_size = updated_main_size + margin_main;
            let mut child_main_mode = MeasureMode::Exactly;
            let mut child_cross_size;
            let mut child_cross_mode;

            if let Some(ratio) = child_node.style.aspect_ratio {
                let content = child_main_size - margin_main;
                child_cross_size =
                    if is_main_axis_row { content / ratio } else { content * ratio } + margin_cross;
                child_cross_mode = MeasureMode::Exactly;
            } else if !container.inner_cross.is_nan()
                && !cross_dim_defined
                && container.cross_mode == MeasureMode::Exactly
                && !(is_wrap && flex_basis_overflows)
                && align == Align::Stretch
                && !auto_cross_margin
            {
                child_cross_size = container.inner_cross;
                child_cross_mode = MeasureMode::Exactly;
            } else if !cross_dim_defined {
                child_cross_size = container.inner_cross;
                child_cross_mode = if child_cross_size.is_nan() {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::AtMost
                };
            } else {
                let resolved = child_node.resolved_dimension(dim(cross));
                child_cross_size =
                    resolved.resolve(container.inner_cross).unwrap_or(UNDEFINED) + margin_cross;
                let loose_percentage = matches!(resolved, Value::Percent(_))
                    && container.cross_mode != MeasureMode::Exactly;
                child_cross_mode = if child_cross_size.is_nan() || loose_percentage {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::Exactly
                };
            }

            constrain_max_size_for_mode(
                child_node,
                main_axis,
                available_inner_main,
                container.inner_width,
                &mut child_main_mode,
                &mut child_main_size,
            );
            constrain_max_size_for_mode(
                child_node,
                cross,
                container.inner_cross,
                container.inner_width,
                &mut child_cross_mode,
                &mut child_cross_size,
            );

            // Stretched items are laid out for real once the line height is known.
            let requires_stretch_layout =
                !cross_dim_defined && align == Align::Stretch && !auto_cross_margin;

            let (child_width, child_height) = if is_main_axis_row {
                (child_main_size, child_cross_size)
            } else {
                (child_cross_size, child_main_size)
            };
            let (child_width_mode, child_height_mode) = if is_main_axis_row {
                (child_main_mode, child_cross_mode)
            } else {
                (child_cross_mode, child_main_mode)
            };

            let direction = self.tree[container.id].layout.direction;
            self.layout_node_internal(
                child,
                child_width,
                child_height,
                direction,
                child_width_mode,
                child_height_mode,
                container.inner_width,
                container.inner_height,
                container.perform_layout && !requires_stretch_layout,
                "flex",
            );
            let child_overflow = self.tree[child].layout.had_overflow;
            self.tree[container.id].layout.had_overflow |= child_overflow;
        }
        delta_free_space
    }

    /// Positions the line's items along the main axis and totals the line's
    /// main and cross extents.
    fn justify_main_axis(
        &mut self,
        container: &Container,
        line: &mut FlexLine,
        start: usize,
        main_mode: MeasureMode,
        owner_width: f32,
        available_inner_main: f32,
    ) {
        let main_axis = container.main_axis;
        let cross = container.cross_axis;
        let node = &self.tree[container.id];

        // Under an upper bound, only grow as far as the min size asks.
        if main_mode == MeasureMode::AtMost && line.remaining_free_space > 0.0 {
            line.remaining_free_space = match node
                .style
                .min_dimension(dim(main_axis))
                .resolve(container.main_owner_size)
            {
                Some(min) => (min - (available_inner_main - line.remaining_free_space)).max(0.0),
                None => 0.0,
            };
        }

        let children = node.children[start..line.end_of_line_index].to_vec();
        let auto_margins: usize = children
            .iter()
            .map(|&child| {
                let child_node = &self.tree[child];
                if child_node.style.position_type != PositionType::Relative {
                    return 0;
                }
                usize::from(child_node.margin_leading_value(main_axis).is_auto())
                    + usize::from(child_node.margin_trailing_value(main_axis).is_auto())
            })
            .sum();

        let remaining = line.remaining_free_space;
        let items = line.items_on_line;
        let mut leading_main_dim = 0.0;
        let mut between_main_dim = 0.0;
        if auto_margins == 0 {
            match node.style.justify_content {
                Justify::FlexStart => {}
                Justify::Center => leading_main_dim = remaining / 2.0,
                Justify::FlexEnd => leading_main_dim = remaining,
                Justify::SpaceBetween => {
                    if items > 1 {
                        between_main_dim = remaining.max(0.0) / (items - 1) as f32;
                    }
                }
                Justify::SpaceEvenly => {
                    between_main_dim = remaining / (items + 1) as f32;
                    leading_main_dim = between_main_dim;
                }
                Justify::SpaceAround => {
                    if items > 0 {
                        between_main_dim = remaining / items as f32;
                        leading_main_dim = between_main_dim / 2.0;
                    }
                }
            }
        }

        let leading_border_main = node.leading_border(main_axis);
        let trailing_padding_and_border_main =
            node.trailing_padding_and_border(main_axis, owner_width);
        line.main_dim = node.leading_padding_and_border(main_axis, owner_width) + leading_main_dim;
        line.cross_dim = 0.0;

        let perform_layout = container.perform_layout;
        let slot = pos(main_axis).index();
        let auto_share = if auto_margins > 0 {
            remaining / auto_margins as f32
        } else {
            0.0
        };

        for child in children {
            let child_node = &mut self.tree[child];
            if child_node.style.display == Display::None {
                continue;
            }
            let absolute = child_node.style.position_type == PositionType::Absolute;
            if absolute && child_node.is_leading_position_defined(main_axis) {
                if perform_layout {
                    // Explicit offsets override the flow position.
                    child_node.layout.position[slot] = child_node
                        .leading_position(main_axis, available_inner_main)
                        + leading_border_main
                        + child_node.leading_margin(main_axis, container.inner_width);
                }
            } else if !absolute {
                if child_node.margin_leading_value(main_axis).is_auto() {
                    line.main_dim += auto_share;
                }
                if perform_layout {
                    child_node.layout.position[slot] += line.main_dim;
                }
                if child_node.margin_trailing_value(main_axis).is_auto() {
                    line.main_dim += auto_share;
                }

                let can_skip_flex = !perform_layout && container.cross_mode == MeasureMode::Exactly;
                if can_skip_flex {
                    // Measured sizes were not computed, so use the basis.
                    line.main_dim += between_main_dim
                        + child_node.margin_for_axis(main_axis, container.inner_width)
                        + child_node.layout.computed_flex_basis.unwrap_or(UNDEFINED);
                    line.cross_dim = container.inner_cross;
                } else {
                    line.main_dim += between_main_dim
                        + child_node.dim_with_margin(main_axis, container.inner_width);
                    line.cross_dim = line
                        .cross_dim
                        .max(child_node.dim_with_margin(cross, container.inner_width));
                }
            } else if perform_layout {
                child_node.layout.position[slot] += leading_border_main + leading_main_dim;
            }
        }
        line.main_dim += trailing_padding_and_border_main;
    }

    /// Places each item of one line on the cross axis, stretching those
    /// that ask for it.
    #[allow(clippy::too_many_arguments)]
    fn align_line_cross_axis(
        &mut self,
        container: &Container,
        children: &[NodeId],
        line: &FlexLine,
        container_cross_axis: f32,
        total_line_cross_dim: f32,
        leading_padding_and_border_cross: f32,
        available_inner_main: f32,
    ) {
        let main_axis = container.main_axis;
        let cross = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row();
        let inner_width = container.inner_width;
        let slot = pos(cross).index();
        let leading_border_cross = self.tree[container.id].leading_border(cross);

        for &child in children {
            let align = self.align_item(container.id, child);
            let child_node = &self.tree[child];
            if child_node.style.display == Display::None {
                continue;
            }

            if child_node.style.position_type == PositionType::Absolute {
                let leading_defined = child_node.is_leading_position_defined(cross);
                let margin = child_node.leading_margin(cross, inner_width);
                let mut position = UNDEFINED;
                if leading_defined {
                    position = child_node.leading_position(cross, container.inner_cross)
                        + leading_border_cross
                        + margin;
                }
                // Fall back to border plus margin when the offset is unusable.
                if position.is_nan() {
                    position = leading_border_cross + margin;
                }
                self.tree[child].layout.position[slot] = position;
                continue;
            }

            let mut leading_cross_dim = leading_padding_and_border_cross;
            let auto_leading = child_node.margin_leading_value(cross).is_auto();
            let auto_trailing = child_node.margin_trailing_value(cross).is_auto();

            if align == Align::Stretch && !auto_leading && !auto_trailing {
                // A definite cross size is never stretched.
                if !child_node.is_style_dim_defined(cross, container.inner_cross) {
                    let mut child_main_size = child_node.measured(main_axis);
                    let mut child_cross_size = match child_node.style.aspect_ratio {
                        Some(ratio) => {
                            child_node.margin_for_axis(cross, inner_width)
                                + if is_main_axis_row {
                                    child_main_size / ratio
                                } else {
                                    child_main_size * ratio
                                }
                        }
                        None => line.cross_dim,
                    };
                    child_main_size += child_node.margin_for_axis(main_axis, inner_width);

                    let mut child_main_mode = MeasureMode::Exactly;
                    let mut child_cross_mode = MeasureMode::Exactly;
                    constrain_max_size_for_mode(
                        child_node,
                        main_axis,
                        available_inner_main,
                        inner_width,
                        &mut child_main_mode,
                        &mut child_main_size,
                    );
                    constrain_max_size_for_mode(
                        child_node,
                        cross,
                        container.inner_cross,
                        inner_width,
                        &mut child_cross_mode,
                        &mut child_cross_size,
                    );

                    let (child_width, child_height) = if is_main_axis_row {
                        (child_main_size, child_cross_size)
                    } else {
                        (child_cross_size, child_main_size)
                    };
                    let mode_for = |size: f32| {
                        if size.is_nan() {
                            MeasureMode::Undefined
                        } else {
                            MeasureMode::Exactly
                        }
                    };
                    self.layout_node_internal(
                        child,
                        child_width,
                        child_height,
                        container.direction,
                        mode_for(child_width),
                        mode_for(child_height),
                        inner_width,
                        container.inner_height,
                        true,
                        "stretch",
                    );
                }
            } else {
                let remaining_cross_dim =
                    container_cross_axis - child_node.dim_with_margin(cross, inner_width);
                if auto_leading && auto_trailing {
                    leading_cross_dim += (remaining_cross_dim / 2.0).max(0.0);
                } else if auto_trailing {
                    // The trailing auto margin absorbs the space.
                } else if auto_leading {
                    leading_cross_dim += remaining_cross_dim.max(0.0);
                } else if align == Align::FlexStart {
                } else if align == Align::Center {
                    leading_cross_dim += remaining_cross_dim / 2.0;
                } else {
                    leading_cross_dim += remaining_cross_dim;
                }
            }

            self.tree[child].layout.position[slot] += total_line_cross_dim + leading_cross_dim;
        }
    }

    /// Distributes the container's cross space between lines per
    /// `align-content`, then re-places items inside their line, including
    /// baseline alignment.
    fn align_lines(
        &mut self,
        container: &Container,
        children: &[NodeId],
        line_count: usize,
        total_line_cross_dim: f32,
        leading_padding_and_border_cross: f32,
    ) {
        let cross = container.cross_axis;
        let main_axis = container.main_axis;
        let is_main_axis_row = container.is_main_axis_row();
        let inner_width = container.inner_width;
        let inner_cross = container.inner_cross;
        let remaining = inner_cross - total_line_cross_dim;
        let lines = line_count as f32;

        let mut cross_dim_lead = 0.0;
        let mut current_lead = leading_padding_and_border_cross;
        match self.tree[container.id].style.align_content {
            Align::FlexEnd => current_lead += remaining,
            Align::Center => current_lead += remaining / 2.0,
            Align::Stretch => {
                if inner_cross > total_line_cross_dim {
                    cross_dim_lead = remaining / lines;
                }
            }
            Align::SpaceAround => {
                if inner_cross > total_line_cross_dim {
                    current_lead += remaining / (2.0 * lines);
                    if line_count > 1 {
                        cross_dim_lead = remaining / lines;
                    }
                } else {
                    current_lead += remaining / 2.0;
                }
            }
            Align::SpaceBetween => {
                if inner_cross > total_line_cross_dim && line_count > 1 {
                    cross_dim_lead = remaining / (lines - 1.0);
                }
            }
            Align::Auto | Align::FlexStart | Align::Baseline => {}
        }

        let slot = pos(cross).index();
        let mut end_index = 0;
        for line in 0..line_count {
            let start_index = end_index;

            // Find the line's extent and its tallest ascent and descent.
            let mut line_height: f32 = 0.0;
            let mut max_ascent: f32 = 0.0;
            let mut max_descent: f32 = 0.0;
            let mut index = start_index;
            while index < children.len() {
                let child = children[index];
                let child_node = &self.tree[child];
                if child_node.style.display == Display::None
                    || child_node.style.position_type != PositionType::Relative
                {
                    index += 1;
                    continue;
                }
                if child_node.layout.line_index != line {
                    break;
                }
                if child_node.is_layout_dim_defined(cross) {
                    line_height = line_height
                        .max(child_node.measured(cross) + child_node.margin_for_axis(cross, inner_width));
                }
                if self.align_item(container.id, child) == Align::Baseline {
                    let ascent = self.baseline(child)
                        + child_node.leading_margin(FlexDirection::Column, inner_width);
                    let descent = child_node.layout.measured_dimensions.height
                        + child_node.margin_for_axis(FlexDirection::Column, inner_width)
                        - ascent;
                    max_ascent = max_ascent.max(ascent);
                    max_descent = max_descent.max(descent);
                    line_height = line_height.max(max_ascent + max_descent);
                }
                index += 1;
            }
            end_index = index;
            line_height += cross_dim_lead;

            for &child in &children[start_index..end_index] {
                let child_node = &self.tree[child];
                if child_node.style.display == Display::None
                    || child_node.style.position_type != PositionType::Relative
                {
                    continue;
                }
                match self.align_item(container.id, child) {
                    Align::FlexStart => {
                        let position =
                            current_lead + child_node.leading_margin(cross, inner_width);
                        self.tree[child].layout.position[slot] = position;
                    }
                    Align::FlexEnd => {
                        let position = current_lead + line_height
                            - child_node.trailing_margin(cross, inner_width)
                            - child_node.measured(cross);
                        self.tree[child].layout.position[slot] = position;
                    }
                    Align::Center => {
                        let position =
                            current_lead + (line_height - child_node.measured(cross)) / 2.0;
                        self.tree[child].layout.position[slot] = position;
                    }
                    Align::Stretch => {
                        let position =
                            current_lead + child_node.leading_margin(cross, inner_width);
                        let needs_remeasure = !child_node.is_style_dim_defined(cross, inner_cross);
                        let measured = child_node.layout.measured_dimensions;
                        let margin_main = child_node.margin_for_axis(main_axis, inner_width);
                        self.tree[child].layout.position[slot] = position;

                        // Items were measured against the container, not the line.
                        if needs_remeasure {
                            let child_width = if is_main_axis_row {
                                measured.width + margin_main
                            } else {
                                line_height
                            };
                            let child_height = if is_main_axis_row {
                                line_height
                            } else {
                                measured.height + margin_main
                            };
                            if !(floats_equal(child_width, measured.width)
                                && floats_equal(child_height, measured.height))
                            {
                                self.layout_node_internal(
                                    child,
                                    child_width,
                                    child_height,
                                    container.direction,
                                    MeasureMode::Exactly,
                                    MeasureMode::Exactly,
                                    inner_width,
                                    container.inner_height,
                                    true,
                                    "multiline-stretch",
                                );
                            }
                        }
                    }
                    Align::Baseline => {
                        let position = current_lead + max_ascent - self.baseline(child)
                            + child_node.leading_position(FlexDirection::Column, inner_cross);
                        self.tree[child].layout.position[leading(FlexDirection::Column).index()] =
                            position;
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }
            current_lead += line_height;
        }
    }
}
