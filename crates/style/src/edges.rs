//! Per-edge style values with the logical/physical fallback chain.
use crate::parsers::parse_edge_shorthand;
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::ops::{Index, IndexMut};
use trellis_types::Edge;

#[derive(Debug, Clone, Copy, Default, PartialEq, Hash)]
pub struct Edges {
    values: [Value; 9],
}

impl Edges {
    pub fn all(value: Value) -> Self {
        let mut edges = Self::default();
        edges[Edge::All] = value;
        edges
    }

    pub fn get(&self, edge: Edge) -> Value {
        self.values[edge.index()]
    }

    pub fn set(&mut self, edge: Edge, value: Value) {
        self.values[edge.index()] = value;
    }

    /// Value of `edge` after falling back through the axis-combined edge and
    /// `All`. Start and End never take `default`: the caller falls back to the
    /// physical edge once the layout direction is known.
    pub fn computed(&self, edge: Edge, default: Value) -> Value {
        let own = self.get(edge);
        if own.is_defined() {
            return own;
        }

        let axis = match edge {
            Edge::Top | Edge::Bottom => Some(Edge::Vertical),
            Edge::Left | Edge::Right | Edge::Start | Edge::End => Some(Edge::Horizontal),
            Edge::Horizontal | Edge::Vertical | Edge::All => None,
        };
        if let Some(axis) = axis {
            let combined = self.get(axis);
            if combined.is_defined() {
                return combined;
            }
        }

        let all = self.get(Edge::All);
        if all.is_defined() {
            return all;
        }

        if matches!(edge, Edge::Start | Edge::End) {
            return Value::Undefined;
        }
        default
    }

    pub fn iter(&self) -> impl Iterator<Item = (Edge, Value)> + '_ {
        Edge::ALL_EDGES.iter().map(|&edge| (edge, self.get(edge)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| !v.is_defined())
    }
}

impl Index<Edge> for Edges {
    type Output = Value;

    fn index(&self, edge: Edge) -> &Value {
        &self.values[edge.index()]
    }
}

impl IndexMut<Edge> for Edges {
    fn index_mut(&mut self, edge: Edge) -> &mut Value {
        &mut self.values[edge.index()]
    }
}

fn edge_key(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => "left",
        Edge::Top => "top",
        Edge::Right => "right",
        Edge::Bottom => "bottom",
        Edge::Start => "start",
        Edge::End => "end",
        Edge::Horizontal => "horizontal",
        Edge::Vertical => "vertical",
        Edge::All => "all",
    }
}

impl Serialize for Edges {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let defined = self.iter().filter(|(_, v)| v.is_defined()).count();
        let mut map = serializer.serialize_map(Some(defined))?;
        for (edge, value) in self.iter().filter(|(_, v)| v.is_defined()) {
            map.serialize_entry(edge_key(edge), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Edges {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EdgesVisitor;
        impl<'de> de::Visitor<'de> for EdgesVisitor {
            type Value = Edges;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, a shorthand like '10 20' or a map of edges")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Edges, E>
            where
                E: de::Error,
            {
                Ok(Edges::all(Value::point(v as f32)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Edges, E>
            where
                E: de::Error,
            {
                Ok(Edges::all(Value::Point(v as f32)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Edges, E>
            where
                E: de::Error,
            {
                Ok(Edges::all(Value::Point(v as f32)))
            }

            fn visit_str<E>(self, v: &str) -> Result<Edges, E>
            where
                E: de::Error,
            {
                parse_edge_shorthand(v).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Edges, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut edges = Edges::default();
                while let Some(key) = map.next_key::<String>()? {
                    let edge = Edge::ALL_EDGES
                        .iter()
                        .copied()
                        .find(|&e| edge_key(e) == key)
                        .ok_or_else(|| de::Error::unknown_field(&key, &EDGE_KEYS))?;
                    edges[edge] = map.next_value()?;
                }
                Ok(edges)
            }
        }
        deserializer.deserialize_any(EdgesVisitor)
    }
}

const EDGE_KEYS: [&str; 9] = [
    "left",
    "top",
    "right",
    "bottom",
    "start",
    "end",
    "horizontal",
    "vertical",
    "all",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_edge_wins_over_fallbacks() {
        let mut edges = Edges::all(Value::Point(1.0));
        edges[Edge::Horizontal] = Value::Point(2.0);
        edges[Edge::Left] = Value::Point(3.0);

        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::Point(3.0));
        assert_eq!(edges.computed(Edge::Right, Value::ZERO), Value::Point(2.0));
        assert_eq!(edges.computed(Edge::Top, Value::ZERO), Value::Point(1.0));
    }

    #[test]
    fn vertical_covers_top_and_bottom_only() {
        let mut edges = Edges::default();
        edges[Edge::Vertical] = Value::Point(5.0);
        assert_eq!(edges.computed(Edge::Bottom, Value::ZERO), Value::Point(5.0));
        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::ZERO);
    }

    #[test]
    fn logical_edges_do_not_take_default() {
        let edges = Edges::default();
        assert_eq!(edges.computed(Edge::Start, Value::ZERO), Value::Undefined);
        assert_eq!(edges.computed(Edge::End, Value::ZERO), Value::Undefined);
        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::ZERO);

        let edges = Edges::all(Value::Point(4.0));
        assert_eq!(edges.computed(Edge::Start, Value::ZERO), Value::Point(4.0));
    }

    #[test]
    fn assignment_order_does_not_matter() {
        let mut a = Edges::default();
        a[Edge::All] = Value::Point(1.0);
        a[Edge::Top] = Value::Point(2.0);
        let mut b = Edges::default();
        b[Edge::Top] = Value::Point(2.0);
        b[Edge::All] = Value::Point(1.0);
        for edge in Edge::ALL_EDGES {
            assert_eq!(a.computed(edge, Value::ZERO), b.computed(edge, Value::ZERO));
        }
    }

    #[test]
    fn deserializes_maps_and_shorthands() {
        let edges: Edges = serde_json::from_str(r#"{"left": 10, "vertical": "5%"}"#).unwrap();
        assert_eq!(edges[Edge::Left], Value::Point(10.0));
        assert_eq!(edges[Edge::Vertical], Value::Percent(5.0));

        let edges: Edges = serde_json::from_str(r#""1 2""#).unwrap();
        assert_eq!(edges[Edge::Vertical], Value::Point(1.0));
        assert_eq!(edges[Edge::Horizontal], Value::Point(2.0));

        let edges: Edges = serde_json::from_str("8").unwrap();
        assert_eq!(edges[Edge::All], Value::Point(8.0));
    }
}
