//! The flexbox layout pass.
//!
//! [`LayoutTree::calculate_layout`] opens a [`LayoutPass`] over the tree and
//! recurses through `layout_node_internal`, which consults the per-node
//! caches before running the full algorithm in `flexbox.rs`.
mod absolute;
mod baseline;
mod flexbox;
mod leaf;

use crate::LayoutError;
use crate::cache::{MeasureRequest, can_use_cached_measurement, matches_exactly};
use crate::layout::CachedMeasurement;
use crate::node::NodeId;
use crate::print::PrintOptions;
use crate::rounding::round_layout;
use crate::tree::LayoutTree;
use log::{debug, trace};
use trellis_style::FlexDirection;
use trellis_types::{Dimension, Direction, MeasureMode, UNDEFINED};

/// Counters collected during one [`LayoutTree::calculate_layout`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Calls that ran the algorithm instead of reusing a cached answer.
    pub nodes_visited: usize,
    pub cache_hits: usize,
    /// Invocations of user measure callbacks.
    pub measure_calls: usize,
    /// Whether the root itself was laid out again. When `false` the previous
    /// geometry was still valid and nothing was rounded or printed.
    pub root_revisited: bool,
}

impl LayoutStats {
    pub fn log_summary(&self, generation: u32) {
        let total = self.nodes_visited + self.cache_hits;
        if total == 0 {
            return;
        }
        debug!("=== Layout Summary (generation {}) ===", generation);
        debug!(
            "Cache Hits: {} ({:.1}%)",
            self.cache_hits,
            (self.cache_hits as f64 / total as f64) * 100.0
        );
        debug!(
            "Visited: {}, measure calls: {}, root revisited: {}",
            self.nodes_visited, self.measure_calls, self.root_revisited
        );
    }
}

/// State of one top-level layout call.
pub(crate) struct LayoutPass<'t> {
    tree: &'t mut LayoutTree,
    generation: u32,
    /// Pixel grid of the root's config, used when comparing cached sizes.
    point_scale_factor: f32,
    depth: usize,
    stats: LayoutStats,
}

impl LayoutTree {
    /// Computes the geometry of the tree under `root`.
    ///
    /// `None` leaves that axis unconstrained. The root's own width and height
    /// styles take precedence, then its max size, then the given size.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        available_width: Option<f32>,
        available_height: Option<f32>,
        owner_direction: Direction,
    ) -> Result<LayoutStats, LayoutError> {
        self.node(root)?;
        let owner_width = available_width.unwrap_or(UNDEFINED);
        let owner_height = available_height.unwrap_or(UNDEFINED);

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self[root].resolve_dimensions();

        let (width, width_mode) =
            root_constraint(self, root, Dimension::Width, owner_width, owner_width);
        let (height, height_mode) =
            root_constraint(self, root, Dimension::Height, owner_height, owner_width);

        let config = std::rc::Rc::clone(&self[root].config);
        let mut pass = LayoutPass {
            tree: self,
            generation,
            point_scale_factor: config.point_scale_factor,
            depth: 0,
            stats: LayoutStats::default(),
        };
        let revisited = pass.layout_node_internal(
            root,
            width,
            height,
            owner_direction,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            true,
            "initial",
        );
        let mut stats = pass.stats;
        stats.root_revisited = revisited;

        if revisited {
            let root_node = &mut self[root];
            let direction = root_node.layout.direction;
            root_node.set_position(direction, owner_width, owner_height, owner_width);
            round_layout(self, root, config.point_scale_factor, 0.0, 0.0);

            if config.print_tree {
                debug!("{}", self.print_tree(root, PrintOptions::all())?);
            }
        }

        stats.log_summary(generation);
        Ok(stats)
    }
}

/// Derives the root's size and mode along one dimension.
fn root_constraint(
    tree: &LayoutTree,
    root: NodeId,
    dimension: Dimension,
    owner_size: f32,
    owner_width: f32,
) -> (f32, MeasureMode) {
    let node = &tree[root];
    let axis = match dimension {
        Dimension::Width => FlexDirection::Row,
        Dimension::Height => FlexDirection::Column,
    };
    if node.is_style_dim_defined(axis, owner_size) {
        let size = node
            .resolved_dimension(dimension)
            .resolve(owner_size)
            .unwrap_or(UNDEFINED)
            + node.margin_for_axis(axis, owner_width);
        return (size, MeasureMode::Exactly);
    }
    if let Some(max) = node.style.max_dimension(dimension).resolve(owner_size) {
        return (max, MeasureMode::AtMost);
    }
    let mode = if owner_size.is_nan() {
        MeasureMode::Undefined
    } else {
        MeasureMode::Exactly
    };
    (owner_size, mode)
}

impl LayoutPass<'_> {
    /// Sizes `id`, and positions its subtree when `perform_layout` is set,
    /// reusing cached results where the constraints allow.
    ///
    /// Returns `true` when the node was actually laid out.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn layout_node_internal(
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
        reason: &str,
    ) -> bool {
        self.depth += 1;
        let generation = self.generation;
        let point_scale_factor = self.point_scale_factor;

        let node = &mut self.tree[id];
        let need_to_visit = (node.is_dirty && node.layout.generation != generation)
            || node.layout.last_owner_direction != Some(owner_direction);
        if need_to_visit {
            node.layout.invalidate_cache();
        }

        let request = MeasureRequest {
            width_mode,
            width: available_width,
            height_mode,
            height: available_height,
        };
        let cached: Option<CachedMeasurement> = if node.measure.is_some() {
            let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
            let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);
            let reusable = |entry: &CachedMeasurement| {
                can_use_cached_measurement(
                    request,
                    entry,
                    margin_row,
                    margin_column,
                    point_scale_factor,
                )
            };
            node.layout
                .cached_layout
                .filter(|entry| reusable(entry))
                .or_else(|| node.layout.cached_measurements().find(|entry| reusable(*entry)).copied())
        } else if perform_layout {
            node.layout
                .cached_layout
                .filter(|entry| matches_exactly(request, entry))
        } else {
            node.layout
                .cached_measurements()
                .find(|entry| matches_exactly(request, *entry))
                .copied()
        };

        let mode_names = (
            width_mode.trace_name(perform_layout),
            height_mode.trace_name(perform_layout),
        );
        match cached {
            Some(entry) if !need_to_visit => {
                node.layout.measured_dimensions.width = entry.computed_width;
                node.layout.measured_dimensions.height = entry.computed_height;
                self.stats.cache_hits += 1;
                trace!(
                    "{:indent$}{}.{{[skipped] {id} wm: {}, hm: {}, aw: {available_width} ah: {available_height} => d: ({}, {}) {reason}",
                    "",
                    self.depth,
                    mode_names.0,
                    mode_names.1,
                    entry.computed_width,
                    entry.computed_height,
                    indent = self.depth,
                );
            }
            _ => {
                self.stats.nodes_visited += 1;
                let marker = if need_to_visit { "*" } else { "" };
                trace!(
                    "{:indent$}{}.{{{marker} {id} wm: {}, hm: {}, aw: {available_width} ah: {available_height} {reason}",
                    "",
                    self.depth,
                    mode_names.0,
                    mode_names.1,
                    indent = self.depth,
                );

                self.layout_impl(
                    id,
                    available_width,
                    available_height,
                    owner_direction,
                    width_mode,
                    height_mode,
                    owner_width,
                    owner_height,
                    perform_layout,
                );

                let layout = &mut self.tree[id].layout;
                trace!(
                    "{:indent$}{}.}}{marker} {id} wm: {}, hm: {}, d: ({}, {}) {reason}",
                    "",
                    self.depth,
                    mode_names.0,
                    mode_names.1,
                    layout.measured_dimensions.width,
                    layout.measured_dimensions.height,
                    indent = self.depth,
                );
                layout.last_owner_direction = Some(owner_direction);

                if cached.is_none() {
                    let entry = CachedMeasurement {
                        available_width,
                        available_height,
                        width_mode,
                        height_mode,
                        computed_width: layout.measured_dimensions.width,
                        computed_height: layout.measured_dimensions.height,
                    };
                    if perform_layout {
                        layout.cached_layout = Some(entry);
                    } else {
                        layout.push_cached_measurement(entry);
                    }
                }
            }
        }

        let node = &mut self.tree[id];
        if perform_layout {
            node.layout.dimensions = node.layout.measured_dimensions;
            node.has_new_layout = true;
            node.is_dirty = false;
        }
        node.layout.generation = generation;
        self.depth -= 1;
        need_to_visit || cached.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BaselineFunc, Node};
    use std::rc::Rc;
    use trellis_style::{Align, Value};

    fn constraint(tree: &mut LayoutTree, root: NodeId, owner: f32) -> (f32, MeasureMode) {
        tree[root].resolve_dimensions();
        root_constraint(tree, root, Dimension::Width, owner, owner)
    }

    #[test]
    fn root_constraint_prefers_style_then_max_then_owner() -> Result<(), LayoutError> {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();

        assert_eq!(constraint(&mut tree, root, 300.0), (300.0, MeasureMode::Exactly));
        let (width, mode) = constraint(&mut tree, root, UNDEFINED);
        assert!(width.is_nan());
        assert_eq!(mode, MeasureMode::Undefined);

        tree.update_style(root, |style| style.max_width = Value::percent(50.0))?;
        assert_eq!(constraint(&mut tree, root, 300.0), (150.0, MeasureMode::AtMost));

        tree.update_style(root, |style| {
            style.width = Value::point(80.0);
            style.margin.set(trellis_types::Edge::Left, Value::point(5.0));
        })?;
        assert_eq!(constraint(&mut tree, root, 300.0), (85.0, MeasureMode::Exactly));
        Ok(())
    }

    #[test]
    fn no_room_on_both_axes_sizes_to_padding_and_border() -> Result<(), LayoutError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut tree = LayoutTree::new();
        let boxed = tree.new_node();
        tree.update_style(boxed, |style| {
            style.padding.set(trellis_types::Edge::All, Value::point(5.0));
            style.border.set(trellis_types::Edge::All, Value::point(1.0));
        })?;
        let inner = tree.new_node();
        tree.update_style(inner, |style| {
            style.width = Value::point(10.0);
            style.height = Value::point(10.0);
        })?;
        tree.add_child(boxed, inner)?;
        tree[boxed].resolve_dimensions();

        let mut pass = LayoutPass {
            tree: &mut tree,
            generation: 1,
            point_scale_factor: 1.0,
            depth: 0,
            stats: LayoutStats::default(),
        };
        pass.layout_node_internal(
            boxed,
            0.0,
            -5.0,
            Direction::Ltr,
            MeasureMode::AtMost,
            MeasureMode::AtMost,
            0.0,
            0.0,
            false,
            "measure",
        );
        assert_eq!(pass.stats.nodes_visited, 1);

        let measured = tree.layout(boxed)?.measured_dimensions;
        assert_eq!((measured.width, measured.height), (12.0, 12.0));
        assert!(tree.layout(inner)?.measured_dimensions.width.is_nan());
        Ok(())
    }

    fn baseline_row(baseline: BaselineFunc) -> Result<(LayoutTree, NodeId, NodeId, NodeId), LayoutError> {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.update_style(root, |style| {
            style.flex_direction = FlexDirection::Row;
            style.align_items = Align::Baseline;
            style.width = Value::point(100.0);
            style.height = Value::point(100.0);
        })?;
        let short = tree.new_node();
        tree.update_style(short, |style| {
            style.width = Value::point(20.0);
            style.height = Value::point(20.0);
        })?;
        tree.set_baseline_func(short, Some(baseline))?;
        let tall = tree.new_node();
        tree.update_style(tall, |style| {
            style.width = Value::point(20.0);
            style.height = Value::point(40.0);
        })?;
        tree.add_child(root, short)?;
        tree.add_child(root, tall)?;
        Ok((tree, root, short, tall))
    }

    #[test]
    fn baseline_alignment_uses_callbacks() -> Result<(), LayoutError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let (mut tree, root, short, tall) = baseline_row(Rc::new(|_: &Node, _: f32, _: f32| 10.0))?;
        tree.calculate_layout(root, None, None, Direction::Ltr)?;

        assert_eq!(tree.layout(short)?.top(), 30.0);
        assert_eq!(tree.layout(tall)?.top(), 0.0);
        assert_eq!(tree.layout(tall)?.left(), 20.0);
        Ok(())
    }

    #[test]
    fn nan_baseline_falls_back_to_height() -> Result<(), LayoutError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let (mut tree, root, short, _) = baseline_row(Rc::new(|_: &Node, _: f32, _: f32| f32::NAN))?;
        tree.calculate_layout(root, None, None, Direction::Ltr)?;

        assert_eq!(tree.layout(short)?.top(), 20.0);
        Ok(())
    }

    #[test]
    fn stats_count_measure_callbacks() -> Result<(), LayoutError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let leaf = tree.new_node();
        tree.set_measure_func(
            leaf,
            Some(Rc::new(|_: &Node, _: f32, _: MeasureMode, _: f32, _: MeasureMode| {
                trellis_types::Size::new(10.0, 10.0)
            })),
        )?;
        tree.add_child(root, leaf)?;

        let stats = tree.calculate_layout(root, Some(50.0), Some(50.0), Direction::Ltr)?;
        assert!(stats.measure_calls > 0);
        assert!(stats.nodes_visited >= 2);
        assert_eq!(tree.layout(leaf)?.width(), 50.0);
        assert_eq!(tree.layout(leaf)?.height(), 10.0);
        Ok(())
    }
}
