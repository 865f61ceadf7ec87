//! Per-node layout output and the measurement cache slots.
use crate::LayoutError;
use trellis_types::{Direction, Edge, MeasureMode, Size};

/// Capacity of the per-node measurement cache. Older entries are overwritten
/// from slot 0 once it is full.
pub const MAX_CACHED_MEASUREMENTS: usize = 16;

/// One remembered `(constraints -> size)` answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedMeasurement {
    pub available_width: f32,
    pub available_height: f32,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub computed_width: f32,
    pub computed_height: f32,
}

/// Geometry computed for one node. Written by the engine only.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Offsets from the parent's border box, indexed by physical edge.
    pub position: [f32; 4],
    pub dimensions: Size,
    pub measured_dimensions: Size,
    pub margin: [f32; 4],
    pub border: [f32; 4],
    pub padding: [f32; 4],
    pub direction: Direction,
    pub had_overflow: bool,
    pub did_use_legacy_flag: bool,

    pub computed_flex_basis: Option<f32>,
    pub computed_flex_basis_generation: u32,
    pub generation: u32,
    pub last_owner_direction: Option<Direction>,
    pub line_index: usize,

    pub cached_layout: Option<CachedMeasurement>,
    pub cached_measurements: [Option<CachedMeasurement>; MAX_CACHED_MEASUREMENTS],
    pub next_cached_measurements_index: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: Size::undefined(),
            measured_dimensions: Size::undefined(),
            margin: [0.0; 4],
            border: [0.0; 4],
            padding: [0.0; 4],
            direction: Direction::Inherit,
            had_overflow: false,
            did_use_legacy_flag: false,
            computed_flex_basis: None,
            computed_flex_basis_generation: 0,
            generation: 0,
            last_owner_direction: None,
            line_index: 0,
            cached_layout: None,
            cached_measurements: [None; MAX_CACHED_MEASUREMENTS],
            next_cached_measurements_index: 0,
        }
    }
}

impl Layout {
    pub fn left(&self) -> f32 {
        self.position[Edge::Left.index()]
    }

    pub fn top(&self) -> f32 {
        self.position[Edge::Top.index()]
    }

    pub fn right(&self) -> f32 {
        self.position[Edge::Right.index()]
    }

    pub fn bottom(&self) -> f32 {
        self.position[Edge::Bottom.index()]
    }

    pub fn width(&self) -> f32 {
        self.dimensions.width
    }

    pub fn height(&self) -> f32 {
        self.dimensions.height
    }

    pub fn margin(&self, edge: Edge) -> Result<f32, LayoutError> {
        self.resolved_edge(&self.margin, edge)
    }

    pub fn border(&self, edge: Edge) -> Result<f32, LayoutError> {
        self.resolved_edge(&self.border, edge)
    }

    pub fn padding(&self, edge: Edge) -> Result<f32, LayoutError> {
        self.resolved_edge(&self.padding, edge)
    }

    /// Reads a box edge; Start and End follow the resolved direction.
    fn resolved_edge(&self, values: &[f32; 4], edge: Edge) -> Result<f32, LayoutError> {
        let physical = match (edge, self.direction) {
            (Edge::Start, Direction::Rtl) => Edge::Right,
            (Edge::Start, _) => Edge::Left,
            (Edge::End, Direction::Rtl) => Edge::Left,
            (Edge::End, _) => Edge::Right,
            (Edge::Horizontal | Edge::Vertical | Edge::All, _) => {
                return Err(LayoutError::InvalidLayoutEdge(edge));
            }
            (physical, _) => physical,
        };
        Ok(values[physical.index()])
    }

    /// Drops every cached answer; the next request recomputes.
    pub fn invalidate_cache(&mut self) {
        self.next_cached_measurements_index = 0;
        self.cached_layout = None;
    }

    pub fn cached_measurements(&self) -> impl Iterator<Item = &CachedMeasurement> {
        self.cached_measurements[..self.next_cached_measurements_index]
            .iter()
            .flatten()
    }

    /// Stores a measurement-only result, wrapping to slot 0 when full.
    pub fn push_cached_measurement(&mut self, entry: CachedMeasurement) {
        if self.next_cached_measurements_index == MAX_CACHED_MEASUREMENTS {
            log::trace!("Out of cache entries, wrapping to slot 0");
            self.next_cached_measurements_index = 0;
        }
        self.cached_measurements[self.next_cached_measurements_index] = Some(entry);
        self.next_cached_measurements_index += 1;
    }

    pub fn cached_measurement_count(&self) -> usize {
        self.next_cached_measurements_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(width: f32) -> CachedMeasurement {
        CachedMeasurement {
            available_width: width,
            available_height: 10.0,
            width_mode: MeasureMode::Exactly,
            height_mode: MeasureMode::Exactly,
            computed_width: width,
            computed_height: 10.0,
        }
    }

    #[test]
    fn measurement_cache_wraps_when_full() {
        let mut layout = Layout::default();
        for i in 0..MAX_CACHED_MEASUREMENTS {
            layout.push_cached_measurement(entry(i as f32));
        }
        assert_eq!(layout.cached_measurement_count(), MAX_CACHED_MEASUREMENTS);

        layout.push_cached_measurement(entry(99.0));
        assert_eq!(layout.cached_measurement_count(), 1);
        assert_eq!(
            layout.cached_measurements().next().map(|e| e.computed_width),
            Some(99.0)
        );

        layout.invalidate_cache();
        assert_eq!(layout.cached_measurements().count(), 0);
    }

    #[test]
    fn logical_edges_follow_direction() {
        let mut layout = Layout::default();
        layout.margin = [1.0, 2.0, 3.0, 4.0];
        layout.direction = Direction::Ltr;
        assert_eq!(layout.margin(Edge::Start).unwrap(), 1.0);
        assert_eq!(layout.margin(Edge::End).unwrap(), 3.0);

        layout.direction = Direction::Rtl;
        assert_eq!(layout.margin(Edge::Start).unwrap(), 3.0);
        assert_eq!(layout.margin(Edge::Bottom).unwrap(), 4.0);
        assert!(matches!(
            layout.margin(Edge::All),
            Err(LayoutError::InvalidLayoutEdge(Edge::All))
        ));
    }
}
