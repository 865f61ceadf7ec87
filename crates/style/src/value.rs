//! Style lengths: undefined, auto, points or a percentage of a reference extent.
use crate::parsers::{StyleParseError, parse_value, run_parser};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default)]
pub enum Value {
    #[default]
    Undefined,
    Auto,
    Point(f32),
    Percent(f32),
}

impl Value {
    pub const ZERO: Value = Value::Point(0.0);

    /// Builds a point value; NaN is read as "unset".
    pub fn point(value: f32) -> Self {
        if value.is_nan() {
            Value::Undefined
        } else {
            Value::Point(value)
        }
    }

    pub fn percent(value: f32) -> Self {
        if value.is_nan() {
            Value::Undefined
        } else {
            Value::Percent(value)
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Value::Auto)
    }

    /// Resolves against `reference`. `None` means "no constraint", which is
    /// also what a percentage of an undefined reference yields.
    pub fn resolve(&self, reference: f32) -> Option<f32> {
        match *self {
            Value::Point(v) => Some(v),
            Value::Percent(v) => {
                let resolved = v * reference * 0.01;
                (!resolved.is_nan()).then_some(resolved)
            }
            Value::Auto | Value::Undefined => None,
        }
    }

    /// Like [`Value::resolve`], but an `auto` margin occupies no space.
    pub fn resolve_margin(&self, reference: f32) -> Option<f32> {
        match self {
            Value::Auto => Some(0.0),
            other => other.resolve(reference),
        }
    }

    /// Raw numeric payload; NaN for the keyword variants.
    pub fn number(&self) -> f32 {
        match *self {
            Value::Point(v) | Value::Percent(v) => v,
            Value::Auto | Value::Undefined => f32::NAN,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Auto, Value::Auto) => true,
            (Value::Point(a), Value::Point(b)) | (Value::Percent(a), Value::Percent(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Undefined => 0u8.hash(state),
            Value::Auto => 1u8.hash(state),
            Value::Point(v) => {
                2u8.hash(state);
                payload_bits(*v).hash(state);
            }
            Value::Percent(v) => {
                3u8.hash(state);
                payload_bits(*v).hash(state);
            }
        }
    }
}

/// Bits that agree whenever `PartialEq` does: one NaN, one zero.
fn payload_bits(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Auto => f.write_str("auto"),
            Value::Point(v) => write!(f, "{}px", v),
            Value::Percent(v) => write!(f, "{}%", v),
        }
    }
}

impl FromStr for Value {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        run_parser(parse_value, s)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::point(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Undefined => serializer.serialize_str("undefined"),
            Value::Auto => serializer.serialize_str("auto"),
            Value::Point(v) => serializer.serialize_f32(*v),
            Value::Percent(v) => serializer.serialize_str(&format!("{}%", v)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;
        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a string like '12pt', '50%' or 'auto'")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::point(v as f32))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Point(v as f32))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Point(v as f32))
            }

            fn visit_str<E>(self, v: &str) -> Result<Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_unit<E>(self) -> Result<Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Undefined)
            }
        }
        deserializer.deserialize_any(ValueVisitor)
    }
}
