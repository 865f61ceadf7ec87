//! Declarative tree descriptions.
//!
//! A [`NodeSpec`] is a serde-friendly description of a subtree, handy for
//! fixtures and for trees that arrive as JSON:
//!
//! ```json
//! { "style": { "flexDirection": "row", "width": 100 },
//!   "children": [ { "css": "flex-grow: 1" }, { "measure": { "width": 20, "height": 10 } } ] }
//! ```
use crate::error::TrellisError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use trellis_layout::{LayoutTree, MeasureFunc, Node, NodeId};
use trellis_style::{Style, parse_inline_style};
use trellis_types::{MeasureMode, Size};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSpec {
    pub style: Style,
    /// Inline declarations such as `"width: 50%; margin: 4 8"`, applied on
    /// top of `style`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// Content size of a leaf, reported through [`content_measure`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<Size>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }

    pub fn with_measure(mut self, content: Size) -> Self {
        self.measure = Some(content);
        self
    }

    /// Creates the described subtree in `tree` and returns its root.
    pub fn build(&self, tree: &mut LayoutTree) -> Result<NodeId, TrellisError> {
        let style = match self.css.as_deref() {
            Some(css) => parse_inline_style(self.style.clone(), css)?,
            None => self.style.clone(),
        };
        let id = tree.new_node_with_style(style);
        if let Some(content) = self.measure {
            tree.set_measure_func(id, Some(content_measure(content)))?;
        }
        for child in &self.children {
            let child = child.build(tree)?;
            tree.add_child(id, child)?;
        }
        debug!("Built {id} with {} children", self.children.len());
        Ok(id)
    }
}

/// A measure function for content of a fixed natural size.
///
/// Exact constraints win, upper bounds clip, and unconstrained axes get the
/// natural size.
pub fn content_measure(content: Size) -> MeasureFunc {
    Rc::new(
        move |_: &Node, width: f32, width_mode: MeasureMode, height: f32, height_mode: MeasureMode| {
            Size::new(
                fit(content.width, width, width_mode),
                fit(content.height, height, height_mode),
            )
        },
    )
}

fn fit(natural: f32, available: f32, mode: MeasureMode) -> f32 {
    match mode {
        MeasureMode::Exactly => available,
        MeasureMode::AtMost => natural.min(available),
        MeasureMode::Undefined => natural,
    }
}
