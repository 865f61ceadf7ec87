use crate::LayoutError;
use crate::node::CloneNodeFunc;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperimentalFeature {
    /// Recompute a definite flex basis once per layout pass instead of
    /// keeping the first value computed for a clean node.
    WebFlexBasis,
}

/// Feature flags shared by every node created under them.
#[derive(Clone)]
pub struct LayoutConfig {
    /// Start nodes from the CSS initial values (`flex-direction: row`,
    /// `align-content: stretch`) and resolve an unset `flex-shrink` to 1.
    ///
    /// Defaults to `false`.
    pub use_web_defaults: bool,
    /// Reproduce the old behaviour where a row container under an `AtMost`
    /// constraint stretches to the constraint instead of shrinking to its
    /// content.
    ///
    /// Defaults to `false`.
    pub use_legacy_stretch_behaviour: bool,
    /// Physical pixels per layout point, used to snap the final geometry.
    ///
    /// - **`0.0`**: no rounding at all.
    /// - **`1.0`**: round to whole points.
    ///
    /// Defaults to `1.0`.
    pub point_scale_factor: f32,
    pub experimental_features: HashSet<ExperimentalFeature>,
    /// Dump the laid-out tree at `debug` level after each pass that
    /// revisited the root.
    pub print_tree: bool,
    /// Told about every private child copy the engine makes for a node that
    /// still shared its children with a [`clone_node`](crate::LayoutTree::clone_node)
    /// source.
    pub clone_node_func: Option<CloneNodeFunc>,
}

impl fmt::Debug for LayoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutConfig")
            .field("use_web_defaults", &self.use_web_defaults)
            .field("use_legacy_stretch_behaviour", &self.use_legacy_stretch_behaviour)
            .field("point_scale_factor", &self.point_scale_factor)
            .field("experimental_features", &self.experimental_features)
            .field("print_tree", &self.print_tree)
            .field("has_clone_node_func", &self.clone_node_func.is_some())
            .finish()
    }
}

/// Callbacks compare by identity.
impl PartialEq for LayoutConfig {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.clone_node_func, &other.clone_node_func) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.use_web_defaults == other.use_web_defaults
            && self.use_legacy_stretch_behaviour == other.use_legacy_stretch_behaviour
            && self.point_scale_factor == other.point_scale_factor
            && self.experimental_features == other.experimental_features
            && self.print_tree == other.print_tree
            && same_callback
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            point_scale_factor: 1.0,
            experimental_features: HashSet::new(),
            print_tree: false,
            clone_node_func: None,
        }
    }
}

impl LayoutConfig {
    pub fn with_web_defaults(mut self, enabled: bool) -> Self {
        self.use_web_defaults = enabled;
        self
    }

    pub fn with_legacy_stretch_behaviour(mut self, enabled: bool) -> Self {
        self.use_legacy_stretch_behaviour = enabled;
        self
    }

    pub fn with_point_scale_factor(mut self, factor: f32) -> Result<Self, LayoutError> {
        if factor.is_nan() || factor < 0.0 {
            return Err(LayoutError::InvalidPointScaleFactor(factor));
        }
        self.point_scale_factor = factor;
        Ok(self)
    }

    pub fn with_experimental_feature(mut self, feature: ExperimentalFeature, enabled: bool) -> Self {
        if enabled {
            self.experimental_features.insert(feature);
        } else {
            self.experimental_features.remove(&feature);
        }
        self
    }

    pub fn with_print_tree(mut self, enabled: bool) -> Self {
        self.print_tree = enabled;
        self
    }

    pub fn with_clone_node_func(mut self, clone_node: Option<CloneNodeFunc>) -> Self {
        self.clone_node_func = clone_node;
        self
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features.contains(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeId};

    #[test]
    fn rejects_negative_scale_factor() {
        assert!(matches!(
            LayoutConfig::default().with_point_scale_factor(-1.0),
            Err(LayoutError::InvalidPointScaleFactor(_))
        ));
        let config = LayoutConfig::default().with_point_scale_factor(0.0).unwrap();
        assert_eq!(config.point_scale_factor, 0.0);
    }

    #[test]
    fn toggles_experimental_features() {
        let config = LayoutConfig::default()
            .with_experimental_feature(ExperimentalFeature::WebFlexBasis, true);
        assert!(config.is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis));
        let config = config.with_experimental_feature(ExperimentalFeature::WebFlexBasis, false);
        assert!(!config.is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis));
    }

    #[test]
    fn clone_callbacks_compare_by_identity() {
        let callback: CloneNodeFunc = Rc::new(|_: &Node, _: &Node, _: NodeId, _: usize| {});
        let config = LayoutConfig::default().with_clone_node_func(Some(Rc::clone(&callback)));
        assert_eq!(config, config.clone());
        assert_ne!(config, LayoutConfig::default());
        assert!(format!("{config:?}").contains("has_clone_node_func: true"));
    }
}
