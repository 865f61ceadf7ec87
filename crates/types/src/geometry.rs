//! Sizes, edges and the float conventions shared by style and layout.
use serde::{Deserialize, Serialize};

/// Marker for "no constraint" in available sizes and measured values.
pub const UNDEFINED: f32 = f32::NAN;

const EPSILON: f32 = 0.0001;

#[inline]
pub fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

/// Absolute-epsilon comparison used for cache keys and dirty checks.
/// Two undefined values compare equal.
pub fn floats_equal(a: f32, b: f32) -> bool {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => (a - b).abs() < EPSILON,
        (true, true) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Width,
    Height,
}

/// A box edge. Physical edges come first so they can index four-slot arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

impl Edge {
    pub const ALL_EDGES: [Edge; 9] = [
        Edge::Left,
        Edge::Top,
        Edge::Right,
        Edge::Bottom,
        Edge::Start,
        Edge::End,
        Edge::Horizontal,
        Edge::Vertical,
        Edge::All,
    ];

    pub const PHYSICAL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_physical(self) -> bool {
        self.index() < 4
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size<T = f32> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Self { width, height }
    }

    pub fn get(&self, dimension: Dimension) -> &T {
        match dimension {
            Dimension::Width => &self.width,
            Dimension::Height => &self.height,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: T) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
        }
    }
}

impl Size<f32> {
    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn undefined() -> Self {
        Self {
            width: UNDEFINED,
            height: UNDEFINED,
        }
    }

    /// Epsilon comparison on both axes, treating NaN pairs as equal.
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        floats_equal(self.width, other.width) && floats_equal(self.height, other.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_values_compare_equal() {
        assert!(floats_equal(UNDEFINED, UNDEFINED));
        assert!(!floats_equal(UNDEFINED, 0.0));
        assert!(floats_equal(10.0, 10.00005));
        assert!(!floats_equal(10.0, 10.001));
    }

    #[test]
    fn size_is_addressable_by_dimension() {
        let mut size = Size::new(1.0, 2.0);
        size.set(Dimension::Height, 5.0);
        assert_eq!(*size.get(Dimension::Width), 1.0);
        assert_eq!(size.height, 5.0);
        assert!(Size::undefined().fuzzy_eq(&Size::undefined()));
    }

    #[test]
    fn physical_edges_lead_the_ordering() {
        assert!(Edge::PHYSICAL.iter().all(|e| e.is_physical()));
        assert!(!Edge::Start.is_physical());
        assert_eq!(Edge::Bottom.index(), 3);
    }
}
