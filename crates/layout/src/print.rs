//! HTML-like dumps of a laid-out subtree, for debugging.
use crate::LayoutError;
use crate::node::{Node, NodeId};
use crate::tree::LayoutTree;
use std::fmt::Display;
use trellis_style::{Edges, Style, Value};
use trellis_types::Edge;

/// Which sections [`LayoutTree::print_tree`] emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub layout: bool,
    pub style: bool,
    pub children: bool,
}

impl PrintOptions {
    pub fn all() -> Self {
        Self {
            layout: true,
            style: true,
            children: true,
        }
    }
}

impl LayoutTree {
    /// Renders `id` (and its subtree when `options.children` is set) as
    /// nested `<div>` elements.
    pub fn print_tree(&self, id: NodeId, options: PrintOptions) -> Result<String, LayoutError> {
        self.node(id)?;
        let mut out = String::new();
        self.print_node(id, options, 0, &mut out);
        Ok(out)
    }

    fn print_node(&self, id: NodeId, options: PrintOptions, level: usize, out: &mut String) {
        let node = &self[id];
        indent(out, level);
        out.push_str("<div ");
        if let Some(print) = node.print.as_ref() {
            out.push_str(&print(node));
            out.push(' ');
        }
        if options.layout {
            let layout = &node.layout;
            out.push_str(&format!(
                "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
                layout.width(),
                layout.height(),
                layout.top(),
                layout.left()
            ));
        }
        if options.style {
            out.push_str("style=\"");
            out.push_str(&style_declarations(node));
            out.push_str("\" ");
        }
        out.push('>');

        if options.children && !node.children.is_empty() {
            for &child in &node.children {
                out.push('\n');
                self.print_node(child, options, level + 1, out);
            }
            out.push('\n');
            indent(out, level);
        }
        out.push_str("</div>");
    }
}

fn indent(out: &mut String, level: usize) {
    out.extend(std::iter::repeat_n("  ", level));
}

/// The style entries that differ from a fresh node's.
fn style_declarations(node: &Node) -> String {
    let style = &node.style;
    let defaults = if node.config.use_web_defaults {
        Style::web_defaults()
    } else {
        Style::default()
    };
    let mut out = String::new();

    let mut keyword = |name: &str, value: &dyn Display, changed: bool| {
        if changed {
            out.push_str(&format!("{name}: {value}; "));
        }
    };
    keyword("direction", &style.direction, style.direction != defaults.direction);
    keyword(
        "flex-direction",
        &style.flex_direction,
        style.flex_direction != defaults.flex_direction,
    );
    keyword(
        "justify-content",
        &style.justify_content,
        style.justify_content != defaults.justify_content,
    );
    keyword(
        "align-items",
        &style.align_items,
        style.align_items != defaults.align_items,
    );
    keyword(
        "align-content",
        &style.align_content,
        style.align_content != defaults.align_content,
    );
    keyword(
        "align-self",
        &style.align_self,
        style.align_self != defaults.align_self,
    );
    keyword(
        "position",
        &style.position_type,
        style.position_type != defaults.position_type,
    );
    keyword("flex-wrap", &style.flex_wrap, style.flex_wrap != defaults.flex_wrap);
    keyword("overflow", &style.overflow, style.overflow != defaults.overflow);
    keyword("display", &style.display, style.display != defaults.display);

    for (name, factor) in [
        ("flex", style.flex),
        ("flex-grow", style.flex_grow),
        ("flex-shrink", style.flex_shrink),
        ("aspect-ratio", style.aspect_ratio),
    ] {
        if let Some(factor) = factor {
            out.push_str(&format!("{name}: {factor}; "));
        }
    }

    for (name, value) in [
        ("flex-basis", style.flex_basis),
        ("width", style.width),
        ("height", style.height),
        ("min-width", style.min_width),
        ("min-height", style.min_height),
        ("max-width", style.max_width),
        ("max-height", style.max_height),
    ] {
        if !matches!(value, Value::Undefined | Value::Auto) {
            out.push_str(&format!("{name}: {value}; "));
        }
    }

    edge_declarations(&mut out, "margin", &style.margin);
    edge_declarations(&mut out, "padding", &style.padding);
    edge_declarations(&mut out, "border", &style.border);
    for edge in [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom, Edge::Start, Edge::End] {
        let value = style.position.get(edge);
        if value.is_defined() {
            out.push_str(&format!("{}: {value}; ", edge_suffix(edge).trim_start_matches('-')));
        }
    }
    out
}

fn edge_declarations(out: &mut String, property: &str, edges: &Edges) {
    for (edge, value) in edges.iter() {
        if value.is_defined() {
            out.push_str(&format!("{property}{}: {value}; ", edge_suffix(edge)));
        }
    }
}

fn edge_suffix(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => "-left",
        Edge::Top => "-top",
        Edge::Right => "-right",
        Edge::Bottom => "-bottom",
        Edge::Start => "-start",
        Edge::End => "-end",
        Edge::Horizontal => "-horizontal",
        Edge::Vertical => "-vertical",
        Edge::All => "",
    }
}
