//! The arena that owns every node and the tree-editing API.
use crate::LayoutError;
use crate::config::LayoutConfig;
use crate::layout::Layout;
use crate::node::{BaselineFunc, DirtiedFunc, MeasureFunc, Node, NodeId, NodeType, PrintFunc};
use std::any::Any;
use std::ops::{Index, IndexMut};
use std::rc::Rc;
use trellis_style::Style;

/// Owns a forest of layout nodes.
///
/// Parents list their children by [`NodeId`]; children point back through a
/// plain `owner` id. Removing a node frees its slot for reuse.
pub struct LayoutTree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    config: Rc<LayoutConfig>,
    pub(crate) generation: u32,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// A tree whose nodes are created with `config` unless told otherwise.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            config: Rc::new(config),
            generation: 0,
        }
    }

    pub fn default_config(&self) -> &Rc<LayoutConfig> {
        &self.config
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Node lifecycle ---

    pub fn new_node(&mut self) -> NodeId {
        let config = Rc::clone(&self.config);
        self.new_node_with_config(config)
    }

    pub fn new_node_with_config(&mut self, config: Rc<LayoutConfig>) -> NodeId {
        self.insert(Node::new(config))
    }

    /// Creates a node and applies `style` to it.
    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        let id = self.new_node();
        self[id].style = style;
        id
    }

    fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, LayoutError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(LayoutError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, LayoutError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LayoutError::UnknownNode(id))
    }

    /// Frees `id`. It is detached from its owner, and its children become roots.
    ///
    /// A node still listed by a shallow clone must not be freed while that
    /// clone is laid out.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.node(id)?;
        let owner = node.owner;
        let children = node.children.clone();

        if let Some(owner) = owner {
            if let Ok(owner_node) = self.node_mut(owner) {
                owner_node.children.retain(|&c| c != id);
            }
            self.mark_dirty_and_propagate(owner);
        }
        for child in children {
            if let Ok(child_node) = self.node_mut(child) {
                if child_node.owner == Some(id) {
                    child_node.owner = None;
                }
            }
        }

        self.nodes[id.0] = None;
        self.free.push(id.0);
        Ok(())
    }

    /// Frees `id` and every descendant it owns.
    pub fn remove_node_recursive(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let children = self.node(id)?.children.clone();
        for child in children {
            if self.node(child)?.owner == Some(id) {
                self.remove_node_recursive(child)?;
            }
        }
        self.remove_node(id)
    }

    /// Restores a detached leaf to its initial state, keeping its config.
    pub fn reset_node(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        if !node.children.is_empty() || node.owner.is_some() {
            return Err(LayoutError::ResetWithChildrenOrOwner(id));
        }
        node.reset();
        Ok(())
    }

    /// Copies `id` without an owner. The copy lists the same children, which
    /// stay owned by the original until the copy is laid out and clones them.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId, LayoutError> {
        let mut copy = self.node(id)?.clone();
        copy.owner = None;
        Ok(self.insert(copy))
    }

    /// Copies the whole subtree under `id`.
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId, LayoutError> {
        let copy = self.clone_node(id)?;
        let children = self[copy].children.clone();
        let mut cloned = Vec::with_capacity(children.len());
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self[child_copy].owner = Some(copy);
            cloned.push(child_copy);
        }
        self[copy].children = cloned;
        Ok(copy)
    }

    // --- Children ---

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), LayoutError> {
        if self.node(child)?.owner.is_some() {
            return Err(LayoutError::ChildAlreadyOwned(child));
        }
        let parent_node = self.node(parent)?;
        if parent_node.measure.is_some() {
            return Err(LayoutError::MeasuredNodeCannotHaveChildren(parent));
        }
        let count = parent_node.children.len();
        if index > count {
            return Err(LayoutError::ChildIndexOutOfRange {
                parent,
                index,
                count,
            });
        }

        self[parent].children.insert(index, child);
        self[child].owner = Some(parent);
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        let count = self.child_count(parent)?;
        self.insert_child(parent, child, count)
    }

    /// Detaches `child` from `parent`. Does nothing if it is not listed there.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.node(child)?;
        let parent_node = self.node_mut(parent)?;
        let Some(position) = parent_node.children.iter().position(|&c| c == child) else {
            return Ok(());
        };
        parent_node.children.remove(position);

        let child_node = &mut self[child];
        if child_node.owner == Some(parent) {
            child_node.layout = Layout::default();
            child_node.owner = None;
        }
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<(), LayoutError> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            let child_node = &mut self[child];
            if child_node.owner == Some(parent) {
                child_node.layout = Layout::default();
                child_node.owner = None;
            }
        }
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    /// Replaces the whole child list of `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<(), LayoutError> {
        let parent_node = self.node(parent)?;
        if parent_node.measure.is_some() && !children.is_empty() {
            return Err(LayoutError::MeasuredNodeCannotHaveChildren(parent));
        }
        for &child in children {
            let owner = self.node(child)?.owner;
            if owner.is_some() && owner != Some(parent) {
                return Err(LayoutError::ChildAlreadyOwned(child));
            }
        }

        let previous = std::mem::replace(&mut self[parent].children, children.to_vec());
        for old in previous {
            if !children.contains(&old) && self[old].owner == Some(parent) {
                self[old].layout = Layout::default();
                self[old].owner = None;
            }
        }
        for &child in children {
            self[child].owner = Some(parent);
        }
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    /// Puts `new_child` where `old_child` was.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old_child: NodeId,
        new_child: NodeId,
    ) -> Result<(), LayoutError> {
        if self.node(new_child)?.owner.is_some() {
            return Err(LayoutError::ChildAlreadyOwned(new_child));
        }
        self.node(old_child)?;
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == old_child)
            .ok_or(LayoutError::NotAChild {
                parent,
                child: old_child,
            })?;

        self[parent].children[position] = new_child;
        if self[old_child].owner == Some(parent) {
            self[old_child].layout = Layout::default();
            self[old_child].owner = None;
        }
        self[new_child].owner = Some(parent);
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    pub fn child(&self, parent: NodeId, index: usize) -> Result<NodeId, LayoutError> {
        let children = &self.node(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(LayoutError::ChildIndexOutOfRange {
                parent,
                index,
                count: children.len(),
            })
    }

    pub fn child_count(&self, parent: NodeId) -> Result<usize, LayoutError> {
        Ok(self.node(parent)?.children.len())
    }

    pub fn children(&self, parent: NodeId) -> Result<&[NodeId], LayoutError> {
        Ok(&self.node(parent)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, LayoutError> {
        Ok(self.node(id)?.owner)
    }

    // --- Style ---

    pub fn style(&self, id: NodeId) -> Result<&Style, LayoutError> {
        Ok(&self.node(id)?.style)
    }

    /// Replaces the style, dirtying the node only if something changed.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty_and_propagate(id);
        }
        Ok(())
    }

    /// Edits the style in place, dirtying the node only if something changed.
    pub fn update_style<F>(&mut self, id: NodeId, update: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut Style),
    {
        let mut style = self.node(id)?.style.clone();
        update(&mut style);
        self.set_style(id, style)
    }

    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> Result<(), LayoutError> {
        let style = self.node(src)?.style.clone();
        self.set_style(dst, style)
    }

    // --- Callbacks and context ---

    /// Attaches or clears the measure function. Nodes with one are text nodes.
    pub fn set_measure_func(
        &mut self,
        id: NodeId,
        measure: Option<MeasureFunc>,
    ) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        match measure {
            None => {
                node.measure = None;
                node.node_type = NodeType::Default;
            }
            Some(measure) => {
                if !node.children.is_empty() {
                    return Err(LayoutError::ChildrenPreventMeasureFunc(id));
                }
                node.measure = Some(measure);
                node.node_type = NodeType::Text;
            }
        }
        Ok(())
    }

    pub fn set_baseline_func(
        &mut self,
        id: NodeId,
        baseline: Option<BaselineFunc>,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.baseline = baseline;
        Ok(())
    }

    pub fn set_dirtied_func(
        &mut self,
        id: NodeId,
        dirtied: Option<DirtiedFunc>,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.dirtied = dirtied;
        Ok(())
    }

    pub fn set_print_func(&mut self, id: NodeId, print: Option<PrintFunc>) -> Result<(), LayoutError> {
        self.node_mut(id)?.print = print;
        Ok(())
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> Result<(), LayoutError> {
        self.node_mut(id)?.node_type = node_type;
        Ok(())
    }

    pub fn set_context<T: Any>(&mut self, id: NodeId, context: T) -> Result<(), LayoutError> {
        self.node_mut(id)?.context = Some(Rc::new(context));
        Ok(())
    }

    pub fn clear_context(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.node_mut(id)?.context = None;
        Ok(())
    }

    pub fn context<T: Any>(&self, id: NodeId) -> Result<Option<&T>, LayoutError> {
        Ok(self.node(id)?.context::<T>())
    }

    // --- Dirty state ---

    pub fn is_dirty(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.is_dirty)
    }

    /// Invalidates a measured leaf whose content changed outside its style.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<(), LayoutError> {
        if self.node(id)?.measure.is_none() {
            return Err(LayoutError::MarkDirtyWithoutMeasure(id));
        }
        self.mark_dirty_and_propagate(id);
        Ok(())
    }

    /// Marks `id` and its whole subtree dirty without notifying observers.
    pub fn mark_dirty_and_propagate_to_descendants(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.node(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self[current];
            node.is_dirty = true;
            node.layout.computed_flex_basis = None;
            stack.extend(node.children.iter().copied());
        }
        Ok(())
    }

    /// Dirties `id` and its ancestors, stopping at the first one already dirty.
    pub(crate) fn mark_dirty_and_propagate(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &mut self[id];
            if node.is_dirty {
                break;
            }
            node.is_dirty = true;
            node.layout.computed_flex_basis = None;
            if let Some(dirtied) = node.dirtied.clone() {
                dirtied(&self[id]);
            }
            current = self[id].owner;
        }
    }

    /// Gives `id` private copies of children it shares with another node.
    ///
    /// Children are shared as a group after [`LayoutTree::clone_node`], so
    /// checking the first one is enough.
    pub(crate) fn clone_children_if_needed(&mut self, id: NodeId) {
        let Some(&first) = self[id].children.first() else {
            return;
        };
        if self[first].owner == Some(id) {
            return;
        }
        let children = self[id].children.clone();
        let on_clone = self[id].config.clone_node_func.clone();
        let mut owned = Vec::with_capacity(children.len());
        for (index, child) in children.into_iter().enumerate() {
            let mut copy = self[child].clone();
            copy.owner = Some(id);
            let copy = self.insert(copy);
            if let Some(on_clone) = on_clone.as_ref() {
                on_clone(&self[child], &self[copy], id, index);
            }
            owned.push(copy);
        }
        log::trace!("{id}: cloned {} shared children", owned.len());
        self[id].children = owned;
    }

    // --- Results ---

    pub fn layout(&self, id: NodeId) -> Result<&Layout, LayoutError> {
        Ok(&self.node(id)?.layout)
    }

    pub fn has_new_layout(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.has_new_layout)
    }

    /// Consumers clear the flag after reading a fresh layout.
    pub fn set_has_new_layout(&mut self, id: NodeId, value: bool) -> Result<(), LayoutError> {
        self.node_mut(id)?.has_new_layout = value;
        Ok(())
    }

    pub fn did_use_legacy_flag(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.layout.did_use_legacy_flag)
    }
}

/// Panics on a freed or foreign id; the engine only follows links it owns.
impl Index<NodeId> for LayoutTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("invalid node id {}", id),
        }
    }
}

impl IndexMut<NodeId> for LayoutTree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("invalid node id {}", id),
        }
    }
}
