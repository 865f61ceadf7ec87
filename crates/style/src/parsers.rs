//! nom parsers for style values and inline style declarations.
//!
//! Lengths are unitless layout points; `pt` and `px` suffixes are accepted
//! and mean the same thing.

use crate::edges::Edges;
use crate::flex::{Align, Display, FlexDirection, Justify, Overflow, PositionType, Wrap};
use crate::style::Style;
use crate::value::Value;
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, space0, space1};
use nom::combinator::{map, opt};
use nom::multi::separated_list1;
use nom::number::complete::float;
use nom::sequence::{delimited, terminated};
use nom::{IResult, Parser};
use thiserror::Error;
use trellis_types::{Direction, Edge};

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },

    #[error("Unknown style property '{0}'")]
    UnknownProperty(String),
}

// --- Helper Parsers ---

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(space0, inner, space0)
}

fn parse_unit(input: &str) -> IResult<&str, &str> {
    alt((tag_no_case("pt"), tag_no_case("px"))).parse(input)
}

/// Parses a single length: `auto`, `undefined`, a bare number, a number with
/// a `pt`/`px` suffix, or a percentage.
pub fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((
        map(tag_no_case("auto"), |_| Value::Auto),
        map(tag_no_case("undefined"), |_| Value::Undefined),
        map(terminated(float, char('%')), Value::percent),
        map(terminated(float, opt(parse_unit)), Value::point),
    ))
    .parse(input)
}

/// Parses a plain number such as a flex factor or an aspect ratio.
pub fn parse_number(input: &str) -> IResult<&str, f32> {
    ws(float).parse(input)
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, P>(mut parser: P, input: &'a str) -> Result<T, StyleParseError>
where
    P: Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
{
    match parser.parse(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

/// Parses a CSS-like edge shorthand with 1, 2 or 4 values.
///
/// One value sets `All`; two set `Vertical` and `Horizontal`; four set the
/// physical edges in top, right, bottom, left order.
pub fn parse_edge_shorthand(input: &str) -> Result<Edges, StyleParseError> {
    let parts = run_parser(separated_list1(space1, parse_value), input)?;

    let mut edges = Edges::default();
    match parts.as_slice() {
        [all] => edges[Edge::All] = *all,
        [vertical, horizontal] => {
            edges[Edge::Vertical] = *vertical;
            edges[Edge::Horizontal] = *horizontal;
        }
        [top, right, bottom, left] => {
            edges[Edge::Top] = *top;
            edges[Edge::Right] = *right;
            edges[Edge::Bottom] = *bottom;
            edges[Edge::Left] = *left;
        }
        _ => {
            return Err(StyleParseError::Parse(format!(
                "Invalid number of values for edge shorthand: got {}, expected 1, 2, or 4.",
                parts.len()
            )));
        }
    }
    Ok(edges)
}

// --- Keyword Parsers ---

fn invalid(property: &str, value: &str) -> StyleParseError {
    StyleParseError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}

pub fn parse_direction(s: &str) -> Result<Direction, StyleParseError> {
    match s.to_lowercase().as_str() {
        "inherit" => Ok(Direction::Inherit),
        "ltr" => Ok(Direction::Ltr),
        "rtl" => Ok(Direction::Rtl),
        _ => Err(invalid("direction", s)),
    }
}

pub fn parse_flex_direction(s: &str) -> Result<FlexDirection, StyleParseError> {
    match s.to_lowercase().as_str() {
        "row" => Ok(FlexDirection::Row),
        "row-reverse" => Ok(FlexDirection::RowReverse),
        "column" => Ok(FlexDirection::Column),
        "column-reverse" => Ok(FlexDirection::ColumnReverse),
        _ => Err(invalid("flex-direction", s)),
    }
}

pub fn parse_justify(s: &str) -> Result<Justify, StyleParseError> {
    match s.to_lowercase().as_str() {
        "flex-start" => Ok(Justify::FlexStart),
        "center" => Ok(Justify::Center),
        "flex-end" => Ok(Justify::FlexEnd),
        "space-between" => Ok(Justify::SpaceBetween),
        "space-around" => Ok(Justify::SpaceAround),
        "space-evenly" => Ok(Justify::SpaceEvenly),
        _ => Err(invalid("justify-content", s)),
    }
}

pub fn parse_align(property: &str, s: &str) -> Result<Align, StyleParseError> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(Align::Auto),
        "flex-start" => Ok(Align::FlexStart),
        "center" => Ok(Align::Center),
        "flex-end" => Ok(Align::FlexEnd),
        "stretch" => Ok(Align::Stretch),
        "baseline" => Ok(Align::Baseline),
        "space-between" => Ok(Align::SpaceBetween),
        "space-around" => Ok(Align::SpaceAround),
        _ => Err(invalid(property, s)),
    }
}

pub fn parse_position_type(s: &str) -> Result<PositionType, StyleParseError> {
    match s.to_lowercase().as_str() {
        "relative" => Ok(PositionType::Relative),
        "absolute" => Ok(PositionType::Absolute),
        _ => Err(invalid("position", s)),
    }
}

pub fn parse_wrap(s: &str) -> Result<Wrap, StyleParseError> {
    match s.to_lowercase().as_str() {
        "nowrap" | "no-wrap" => Ok(Wrap::NoWrap),
        "wrap" => Ok(Wrap::Wrap),
        "wrap-reverse" => Ok(Wrap::WrapReverse),
        _ => Err(invalid("flex-wrap", s)),
    }
}

pub fn parse_overflow(s: &str) -> Result<Overflow, StyleParseError> {
    match s.to_lowercase().as_str() {
        "visible" => Ok(Overflow::Visible),
        "hidden" => Ok(Overflow::Hidden),
        "scroll" => Ok(Overflow::Scroll),
        _ => Err(invalid("overflow", s)),
    }
}

pub fn parse_display(s: &str) -> Result<Display, StyleParseError> {
    match s.to_lowercase().as_str() {
        "flex" => Ok(Display::Flex),
        "none" => Ok(Display::None),
        _ => Err(invalid("display", s)),
    }
}

// --- High-level Style Application Functions ---

fn edge_property(name: &str) -> Option<(&str, Option<Edge>)> {
    let (group, suffix) = match name.split_once('-') {
        Some((group, suffix)) => (group, Some(suffix)),
        None => (name, None),
    };
    if !matches!(group, "margin" | "padding" | "border" | "position") {
        return None;
    }
    let edge = match suffix {
        None => None,
        Some("left") => Some(Edge::Left),
        Some("top") => Some(Edge::Top),
        Some("right") => Some(Edge::Right),
        Some("bottom") => Some(Edge::Bottom),
        Some("start") => Some(Edge::Start),
        Some("end") => Some(Edge::End),
        Some("horizontal") => Some(Edge::Horizontal),
        Some("vertical") => Some(Edge::Vertical),
        Some("all") => Some(Edge::All),
        Some(_) => return None,
    };
    Some((group, edge))
}

fn edges_mut<'s>(style: &'s mut Style, group: &str) -> &'s mut Edges {
    match group {
        "margin" => &mut style.margin,
        "padding" => &mut style.padding,
        "border" => &mut style.border,
        _ => &mut style.position,
    }
}

/// Applies a single kebab-case style property to a `Style`.
///
/// Edge groups accept either the bare shorthand (`margin: 4 8`) or one edge
/// (`margin-start: 4`). `position` with a keyword sets the position type;
/// with lengths it sets the position offsets.
pub fn apply_style_property(
    style: &mut Style,
    attr_name: &str,
    value: &str,
) -> Result<(), StyleParseError> {
    let value = value.trim();
    match attr_name {
        "direction" => style.direction = parse_direction(value)?,
        "flex-direction" => style.flex_direction = parse_flex_direction(value)?,
        "justify-content" => style.justify_content = parse_justify(value)?,
        "align-content" => style.align_content = parse_align(attr_name, value)?,
        "align-items" => style.align_items = parse_align(attr_name, value)?,
        "align-self" => style.align_self = parse_align(attr_name, value)?,
        "position-type" => style.position_type = parse_position_type(value)?,
        "position" if parse_position_type(value).is_ok() => {
            style.position_type = parse_position_type(value)?
        }
        "flex-wrap" => style.flex_wrap = parse_wrap(value)?,
        "overflow" => style.overflow = parse_overflow(value)?,
        "display" => style.display = parse_display(value)?,
        "flex" => style.flex = Some(run_parser(parse_number, value)?),
        "flex-grow" => style.flex_grow = Some(run_parser(parse_number, value)?),
        "flex-shrink" => style.flex_shrink = Some(run_parser(parse_number, value)?),
        "flex-basis" => style.flex_basis = run_parser(parse_value, value)?,
        "width" => style.width = run_parser(parse_value, value)?,
        "height" => style.height = run_parser(parse_value, value)?,
        "min-width" => style.min_width = run_parser(parse_value, value)?,
        "min-height" => style.min_height = run_parser(parse_value, value)?,
        "max-width" => style.max_width = run_parser(parse_value, value)?,
        "max-height" => style.max_height = run_parser(parse_value, value)?,
        "aspect-ratio" => style.aspect_ratio = Some(run_parser(parse_number, value)?),
        other => match edge_property(other) {
            Some((group, None)) => *edges_mut(style, group) = parse_edge_shorthand(value)?,
            Some((group, Some(edge))) => {
                edges_mut(style, group)[edge] = run_parser(parse_value, value)?
            }
            None => return Err(StyleParseError::UnknownProperty(other.to_string())),
        },
    }
    Ok(())
}

/// Parses `name: value; name: value` declarations on top of `base`.
pub fn parse_inline_style(base: Style, declarations: &str) -> Result<Style, StyleParseError> {
    let mut style = base;
    for declaration in declarations.split(';').map(str::trim).filter(|d| !d.is_empty()) {
        let (name, value) = declaration
            .split_once(':')
            .ok_or_else(|| StyleParseError::Parse(format!("Missing ':' in '{}'", declaration)))?;
        apply_style_property(&mut style, name.trim(), value)?;
    }
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lengths() {
        assert_eq!(run_parser(parse_value, "12").unwrap(), Value::Point(12.0));
        assert_eq!(run_parser(parse_value, "12.5pt").unwrap(), Value::Point(12.5));
        assert_eq!(run_parser(parse_value, "-3px").unwrap(), Value::Point(-3.0));
        assert_eq!(run_parser(parse_value, "50%").unwrap(), Value::Percent(50.0));
        assert_eq!(run_parser(parse_value, " AUTO ").unwrap(), Value::Auto);
        assert_eq!(run_parser(parse_value, "undefined").unwrap(), Value::Undefined);
        assert!(run_parser(parse_value, "12em").is_err());
        assert!(run_parser(parse_value, "").is_err());
    }

    #[test]
    fn edge_shorthand_accepts_one_two_or_four_values() {
        let edges = parse_edge_shorthand("3").unwrap();
        assert_eq!(edges[Edge::All], Value::Point(3.0));

        let edges = parse_edge_shorthand("1 10%").unwrap();
        assert_eq!(edges[Edge::Vertical], Value::Point(1.0));
        assert_eq!(edges[Edge::Horizontal], Value::Percent(10.0));

        let edges = parse_edge_shorthand("1 2 3 4").unwrap();
        assert_eq!(edges[Edge::Top], Value::Point(1.0));
        assert_eq!(edges[Edge::Right], Value::Point(2.0));
        assert_eq!(edges[Edge::Bottom], Value::Point(3.0));
        assert_eq!(edges[Edge::Left], Value::Point(4.0));

        assert!(parse_edge_shorthand("1 2 3").is_err());
    }

    #[test]
    fn inline_declarations_build_a_style() {
        let style = parse_inline_style(
            Style::default(),
            "flex-direction: row; flex-grow: 2; margin-start: 4; padding: 1 2; position: absolute; position-left: 20",
        )
        .unwrap();
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.flex_grow, Some(2.0));
        assert_eq!(style.margin[Edge::Start], Value::Point(4.0));
        assert_eq!(style.padding[Edge::Horizontal], Value::Point(2.0));
        assert_eq!(style.position_type, PositionType::Absolute);
        assert_eq!(style.position[Edge::Left], Value::Point(20.0));
    }

    #[test]
    fn rejects_unknown_keywords_and_properties() {
        assert!(matches!(
            parse_justify("spread"),
            Err(StyleParseError::InvalidValue { .. })
        ));
        let mut style = Style::default();
        assert!(matches!(
            apply_style_property(&mut style, "colour", "red"),
            Err(StyleParseError::UnknownProperty(_))
        ));
    }
}
