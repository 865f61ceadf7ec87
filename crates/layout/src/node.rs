//! A single box in the layout tree and its box-model helpers.
use crate::axis::{dim, leading, resolve_flex_direction, cross_axis, trailing};
use crate::config::LayoutConfig;
use crate::layout::Layout;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use trellis_style::{FlexDirection, PositionType, Style, Value};
use trellis_types::{Dimension, Direction, Edge, MeasureMode, Size, UNDEFINED};

/// Index of a node inside its [`LayoutTree`](crate::LayoutTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Measures a leaf: `(node, width, width_mode, height, height_mode) -> size`.
pub type MeasureFunc = Rc<dyn Fn(&Node, f32, MeasureMode, f32, MeasureMode) -> Size>;
/// Distance from the top of a laid-out node to its first baseline.
pub type BaselineFunc = Rc<dyn Fn(&Node, f32, f32) -> f32>;
/// Called when a clean node turns dirty.
pub type DirtiedFunc = Rc<dyn Fn(&Node)>;
/// Extra text appended to the node's line in tree dumps.
pub type PrintFunc = Rc<dyn Fn(&Node) -> String>;
/// Observes a shared child being copied: `(original, copy, owner, index)`.
pub type CloneNodeFunc = Rc<dyn Fn(&Node, &Node, NodeId, usize)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    #[default]
    Default,
    /// Has a measure function; sizes are rounded up instead of down.
    Text,
}

#[derive(Clone)]
pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: Layout,
    pub(crate) children: Vec<NodeId>,
    pub(crate) owner: Option<NodeId>,
    pub(crate) config: Rc<LayoutConfig>,
    pub(crate) node_type: NodeType,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) dirtied: Option<DirtiedFunc>,
    pub(crate) print: Option<PrintFunc>,
    pub(crate) context: Option<Rc<dyn Any>>,
    pub(crate) has_new_layout: bool,
    pub(crate) is_dirty: bool,
    pub(crate) resolved_dimensions: Size<Value>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("children", &self.children)
            .field("owner", &self.owner)
            .field("node_type", &self.node_type)
            .field("has_measure", &self.measure.is_some())
            .field("is_dirty", &self.is_dirty)
            .finish()
    }
}

impl Node {
    pub(crate) fn new(config: Rc<LayoutConfig>) -> Self {
        let style = if config.use_web_defaults {
            Style::web_defaults()
        } else {
            Style::default()
        };
        Self {
            style,
            layout: Layout::default(),
            children: Vec::new(),
            owner: None,
            config,
            node_type: NodeType::Default,
            measure: None,
            baseline: None,
            dirtied: None,
            print: None,
            context: None,
            has_new_layout: true,
            is_dirty: false,
            resolved_dimensions: Size::new(Value::Undefined, Value::Undefined),
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn has_measure_func(&self) -> bool {
        self.measure.is_some()
    }

    pub fn has_baseline_func(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn has_new_layout(&self) -> bool {
        self.has_new_layout
    }

    /// The user context, if one of type `T` was attached.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_deref().and_then(|c| c.downcast_ref::<T>())
    }

    // --- Style resolution ---

    pub(crate) fn resolve_dimensions(&mut self) {
        for dimension in [Dimension::Width, Dimension::Height] {
            let max = self.style.max_dimension(dimension);
            let resolved = if max.is_defined() && max == self.style.min_dimension(dimension) {
                max
            } else {
                self.style.dimension(dimension)
            };
            self.resolved_dimensions.set(dimension, resolved);
        }
    }

    pub(crate) fn resolved_dimension(&self, dimension: Dimension) -> Value {
        *self.resolved_dimensions.get(dimension)
    }

    pub(crate) fn resolve_direction(&self, owner_direction: Direction) -> Direction {
        match self.style.direction {
            Direction::Inherit if owner_direction != Direction::Inherit => owner_direction,
            Direction::Inherit => Direction::Ltr,
            own => own,
        }
    }

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if let Some(grow) = self.style.flex_grow {
            return grow;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_shrink(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if let Some(shrink) = self.style.flex_shrink {
            return shrink;
        }
        if !self.config.use_web_defaults {
            if let Some(flex) = self.style.flex.filter(|flex| *flex < 0.0) {
                return -flex;
            }
        }
        if self.config.use_web_defaults { 1.0 } else { 0.0 }
    }

    pub(crate) fn resolve_flex_basis(&self) -> Value {
        let basis = self.style.flex_basis;
        if basis.is_defined() && !basis.is_auto() {
            return basis;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 => {
                if self.config.use_web_defaults {
                    Value::Auto
                } else {
                    Value::ZERO
                }
            }
            _ => Value::Auto,
        }
    }

    pub(crate) fn is_flexible(&self) -> bool {
        self.style.position_type == PositionType::Relative
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink() != 0.0)
    }

    // --- Box model, all in points; NaN when unresolvable ---

    pub(crate) fn leading_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let start = self.style.position.computed(Edge::Start, Value::Undefined);
            if start.is_defined() {
                return start.resolve(axis_size).unwrap_or(UNDEFINED);
            }
        }
        let value = self.style.position.computed(leading(axis), Value::Undefined);
        if value.is_defined() {
            value.resolve(axis_size).unwrap_or(UNDEFINED)
        } else {
            0.0
        }
    }

    pub(crate) fn trailing_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let end = self.style.position.computed(Edge::End, Value::Undefined);
            if end.is_defined() {
                return end.resolve(axis_size).unwrap_or(UNDEFINED);
            }
        }
        let value = self.style.position.computed(trailing(axis), Value::Undefined);
        if value.is_defined() {
            value.resolve(axis_size).unwrap_or(UNDEFINED)
        } else {
            0.0
        }
    }

    pub(crate) fn is_leading_position_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && self
                .style
                .position
                .computed(Edge::Start, Value::Undefined)
                .is_defined())
            || self
                .style
                .position
                .computed(leading(axis), Value::Undefined)
                .is_defined()
    }

    pub(crate) fn is_trailing_position_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && self
                .style
                .position
                .computed(Edge::End, Value::Undefined)
                .is_defined())
            || self
                .style
                .position
                .computed(trailing(axis), Value::Undefined)
                .is_defined()
    }

    /// Offset from `position`: the leading edge if set, else minus the trailing one.
    pub(crate) fn relative_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if self.is_leading_position_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    pub(crate) fn leading_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.margin[Edge::Start];
        let value = if axis.is_row() && start.is_defined() {
            start
        } else {
            self.style.margin.computed(leading(axis), Value::ZERO)
        };
        value.resolve_margin(width_size).unwrap_or(UNDEFINED)
    }

    pub(crate) fn trailing_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.margin[Edge::End];
        let value = if axis.is_row() && end.is_defined() {
            end
        } else {
            self.style.margin.computed(trailing(axis), Value::ZERO)
        };
        value.resolve_margin(width_size).unwrap_or(UNDEFINED)
    }

    pub(crate) fn margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    /// The raw leading margin, used to detect `auto` margins.
    pub(crate) fn margin_leading_value(&self, axis: FlexDirection) -> Value {
        let start = self.style.margin[Edge::Start];
        if axis.is_row() && start.is_defined() {
            start
        } else {
            self.style.margin[leading(axis)]
        }
    }

    pub(crate) fn margin_trailing_value(&self, axis: FlexDirection) -> Value {
        let end = self.style.margin[Edge::End];
        if axis.is_row() && end.is_defined() {
            end
        } else {
            self.style.margin[trailing(axis)]
        }
    }

    pub(crate) fn leading_border(&self, axis: FlexDirection) -> f32 {
        let start = self.style.border[Edge::Start];
        if axis.is_row() && start.is_defined() && start.number() >= 0.0 {
            return start.number();
        }
        self.style
            .border
            .computed(leading(axis), Value::ZERO)
            .number()
            .max(0.0)
    }

    pub(crate) fn trailing_border(&self, axis: FlexDirection) -> f32 {
        let end = self.style.border[Edge::End];
        if axis.is_row() && end.is_defined() && end.number() >= 0.0 {
            return end.number();
        }
        self.style
            .border
            .computed(trailing(axis), Value::ZERO)
            .number()
            .max(0.0)
    }

    pub(crate) fn leading_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.padding[Edge::Start].resolve(width_size);
        if let Some(start) = start.filter(|v| axis.is_row() && *v >= 0.0) {
            return start;
        }
        self.style
            .padding
            .computed(leading(axis), Value::ZERO)
            .resolve(width_size)
            .unwrap_or(UNDEFINED)
            .max(0.0)
    }

    pub(crate) fn trailing_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.padding[Edge::End].resolve(width_size);
        if let Some(end) = end.filter(|v| axis.is_row() && *v >= 0.0) {
            return end;
        }
        self.style
            .padding
            .computed(trailing(axis), Value::ZERO)
            .resolve(width_size)
            .unwrap_or(UNDEFINED)
            .max(0.0)
    }

    pub(crate) fn leading_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub(crate) fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub(crate) fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    // --- Queries on the current layout ---

    pub(crate) fn measured(&self, axis: FlexDirection) -> f32 {
        *self.layout.measured_dimensions.get(dim(axis))
    }

    pub(crate) fn dim_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.measured(axis) + self.margin_for_axis(axis, width_size)
    }

    pub(crate) fn is_style_dim_defined(&self, axis: FlexDirection, owner_size: f32) -> bool {
        match self.resolved_dimension(dim(axis)) {
            Value::Auto | Value::Undefined => false,
            Value::Point(v) => v.is_nan() || v >= 0.0,
            Value::Percent(v) => v.is_nan() || (v >= 0.0 && !owner_size.is_nan()),
        }
    }

    pub(crate) fn is_layout_dim_defined(&self, axis: FlexDirection) -> bool {
        let value = self.measured(axis);
        !value.is_nan() && value >= 0.0
    }

    /// Clamps `value` to the min/max style for `axis`.
    pub(crate) fn bound_axis_within_min_and_max(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
    ) -> f32 {
        let dimension = dim(axis);
        let min = self.style.min_dimension(dimension).resolve(axis_size);
        let max = self.style.max_dimension(dimension).resolve(axis_size);

        if let Some(max) = max.filter(|m| *m >= 0.0 && value > *m) {
            return max;
        }
        if let Some(min) = min.filter(|m| *m >= 0.0 && value < *m) {
            return min;
        }
        value
    }

    /// Like [`Node::bound_axis_within_min_and_max`], floored at padding + border.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
    ) -> f32 {
        self.bound_axis_within_min_and_max(axis, value, axis_size)
            .max(self.padding_and_border_for_axis(axis, width_size))
    }

    /// Writes leading and trailing positions from margins and relative offsets.
    pub(crate) fn set_position(
        &mut self,
        direction: Direction,
        main_size: f32,
        cross_size: f32,
        owner_width: f32,
    ) {
        // Roots are laid out left-to-right so they never get negative offsets.
        let direction = if self.owner.is_some() {
            direction
        } else {
            Direction::Ltr
        };
        let main_axis = resolve_flex_direction(self.style.flex_direction, direction);
        let cross = cross_axis(main_axis, direction);

        let relative_main = self.relative_position(main_axis, main_size);
        let relative_cross = self.relative_position(cross, cross_size);

        self.layout.position[leading(main_axis).index()] =
            self.leading_margin(main_axis, owner_width) + relative_main;
        self.layout.position[trailing(main_axis).index()] =
            self.trailing_margin(main_axis, owner_width) + relative_main;
        self.layout.position[leading(cross).index()] =
            self.leading_margin(cross, owner_width) + relative_cross;
        self.layout.position[trailing(cross).index()] =
            self.trailing_margin(cross, owner_width) + relative_cross;
    }

    /// Restores everything but the config and the tree links.
    pub(crate) fn reset(&mut self) {
        let config = Rc::clone(&self.config);
        *self = Node::new(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_style::Edges;

    fn node_with(style: Style) -> Node {
        let mut node = Node::new(Rc::new(LayoutConfig::default()));
        node.style = style;
        node.owner = Some(NodeId(0));
        node
    }

    #[test]
    fn logical_margin_overrides_physical_on_row_axis() {
        let mut style = Style::default();
        style.margin[Edge::Left] = Value::Point(5.0);
        style.margin[Edge::Start] = Value::Point(9.0);
        let node = node_with(style);

        assert_eq!(node.leading_margin(FlexDirection::Row, 100.0), 9.0);
        assert_eq!(node.trailing_margin(FlexDirection::Row, 100.0), 0.0);
        // Under RTL the row resolves to row-reverse, whose leading edge is Right.
        assert_eq!(node.leading_margin(FlexDirection::RowReverse, 100.0), 9.0);
        assert_eq!(node.leading_margin(FlexDirection::Column, 100.0), 0.0);
    }

    #[test]
    fn percent_margin_resolves_against_width() {
        let mut style = Style::default();
        style.margin = Edges::all(Value::Percent(10.0));
        let node = node_with(style);
        assert_eq!(node.margin_for_axis(FlexDirection::Column, 200.0), 40.0);
        assert!(node.margin_for_axis(FlexDirection::Row, UNDEFINED).is_nan());
    }

    #[test]
    fn negative_border_and_padding_clamp_to_zero() {
        let mut style = Style::default();
        style.border = Edges::all(Value::Point(-3.0));
        style.padding = Edges::all(Value::Point(-1.0));
        style.padding[Edge::Top] = Value::Point(4.0);
        let node = node_with(style);

        assert_eq!(node.leading_border(FlexDirection::Row), 0.0);
        assert_eq!(node.leading_padding(FlexDirection::Row, 100.0), 0.0);
        assert_eq!(node.padding_and_border_for_axis(FlexDirection::Column, 100.0), 4.0);
    }

    #[test]
    fn flex_shorthand_resolution() {
        let mut style = Style::default();
        style.flex = Some(2.0);
        let node = node_with(style.clone());
        assert_eq!(node.resolve_flex_grow(), 2.0);
        assert_eq!(node.resolve_flex_shrink(), 0.0);
        assert_eq!(node.resolve_flex_basis(), Value::ZERO);

        style.flex = Some(-1.0);
        let node = node_with(style);
        assert_eq!(node.resolve_flex_grow(), 0.0);
        assert_eq!(node.resolve_flex_shrink(), 1.0);
        assert_eq!(node.resolve_flex_basis(), Value::Auto);
    }

    #[test]
    fn root_nodes_are_never_flexible() {
        let mut style = Style::default();
        style.flex_grow = Some(1.0);
        let mut node = node_with(style);
        assert!(node.is_flexible());
        node.owner = None;
        assert!(!node.is_flexible());
    }

    #[test]
    fn equal_min_and_max_pin_the_dimension() {
        let mut style = Style::default();
        style.width = Value::Point(10.0);
        style.min_width = Value::Point(30.0);
        style.max_width = Value::Point(30.0);
        let mut node = node_with(style);
        node.resolve_dimensions();
        assert_eq!(node.resolved_dimension(Dimension::Width), Value::Point(30.0));
        assert_eq!(node.resolved_dimension(Dimension::Height), Value::Auto);
    }

    #[test]
    fn bound_axis_respects_min_max_and_padding() {
        let mut style = Style::default();
        style.min_width = Value::Point(20.0);
        style.max_width = Value::Percent(50.0);
        style.padding = Edges::all(Value::Point(15.0));
        let node = node_with(style);

        assert_eq!(node.bound_axis_within_min_and_max(FlexDirection::Row, 5.0, 100.0), 20.0);
        assert_eq!(node.bound_axis_within_min_and_max(FlexDirection::Row, 80.0, 100.0), 50.0);
        assert_eq!(node.bound_axis(FlexDirection::Row, 5.0, 100.0, 100.0), 30.0);
    }

    #[test]
    fn relative_position_prefers_leading_offset() {
        let mut style = Style::default();
        style.position[Edge::Right] = Value::Point(7.0);
        let node = node_with(style.clone());
        assert_eq!(node.relative_position(FlexDirection::Row, 100.0), -7.0);

        style.position[Edge::Start] = Value::Point(3.0);
        let node = node_with(style);
        assert_eq!(node.relative_position(FlexDirection::Row, 100.0), 3.0);
    }
}
