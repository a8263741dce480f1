//! Element arena.
//!
//! The tree owns every element. A parent's `children` list is the owning
//! sequence; `parent` is a plain back-reference. Detaching through
//! [`Tree::remove`] is the only way out of a child list, and it clears the
//! back-reference in the same step.

use slotmap::{SlotMap, new_key_type};

use crate::content::Content;
use crate::element::{Element, LayoutCache};
use crate::error::TreeError;
use crate::event_context::UiEvent;
use crate::length::ResolvedSize;
use crate::primitives::Point;

new_key_type! {
    /// Generational handle to an element. Stale after `destroy`.
    pub struct ElementId;
}

/// An element tree with a fixed root.
pub struct Tree<M = ()> {
    nodes: SlotMap<ElementId, Element<M>>,
    root: ElementId,
}

impl<M> Tree<M> {
    pub fn new(root: Element<M>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Self::orphan(root));
        Self { nodes, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element<M>> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element<M>> {
        self.nodes.get_mut(id)
    }

    fn node(&self, id: ElementId) -> Result<&Element<M>, TreeError> {
        self.nodes.get(id).ok_or(TreeError::StaleElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Element<M>, TreeError> {
        self.nodes.get_mut(id).ok_or(TreeError::StaleElement(id))
    }

    /// Strip structure an incoming element may not carry.
    fn orphan(mut element: Element<M>) -> Element<M> {
        element.parent = None;
        element.children.clear();
        element
    }

    // =====================================================================
    // Structure
    // =====================================================================

    /// Add a detached element to the arena.
    pub fn create(&mut self, element: Element<M>) -> ElementId {
        self.nodes.insert(Self::orphan(element))
    }

    /// Create an element and append it to `parent` in one step.
    pub fn add_child(&mut self, parent: ElementId, element: Element<M>) -> Result<ElementId, TreeError> {
        self.node(parent)?;
        let child = self.create(element);
        self.append_child(parent, child)?;
        Ok(child)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        let end = self.node(parent)?.children.len();
        self.insert_child(parent, child, end)
    }

    /// Insert `child` at `index` among `parent`'s children (appends past the
    /// end). A child that already has a parent is detached first. Any
    /// content `parent` held is released.
    pub fn insert_child(&mut self, parent: ElementId, child: ElementId, index: usize) -> Result<(), TreeError> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root {
            return Err(TreeError::RootDetach);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.remove(child)?;

        let parent_node = self.node_mut(parent)?;
        if let Some(content) = parent_node.content.take() {
            content.release();
        }
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from its parent. Detached elements stay in the arena.
    pub fn remove(&mut self, child: ElementId) -> Result<(), TreeError> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Detach and free `id` and its whole subtree, releasing content.
    pub fn destroy(&mut self, id: ElementId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootDetach);
        }
        self.remove(id)?;

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(element) = self.nodes.remove(next) {
                pending.extend(element.children.iter().copied());
                if let Some(content) = element.content {
                    content.release();
                }
            }
        }
        Ok(())
    }

    /// Replace children with content. Existing children are destroyed.
    pub fn set_content(&mut self, id: ElementId, content: impl Into<Content>) -> Result<(), TreeError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
            self.destroy(child)?;
        }

        let node = self.node_mut(id)?;
        if let Some(old) = node.content.replace(content.into()) {
            old.release();
        }
        Ok(())
    }

    /// Drop content, leaving an empty container.
    pub fn clear_content(&mut self, id: ElementId) -> Result<(), TreeError> {
        if let Some(content) = self.node_mut(id)?.content.take() {
            content.release();
        }
        Ok(())
    }

    pub fn content(&self, id: ElementId) -> Option<&Content> {
        self.nodes.get(id).and_then(|e| e.content.as_ref())
    }

    pub fn content_mut(&mut self, id: ElementId) -> Option<&mut Content> {
        self.nodes.get_mut(id).and_then(|e| e.content.as_mut())
    }

    /// Children of `id` (empty for stale ids).
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    /// Position of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Pre-order walk of the subtree under `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.nodes.get(next) {
                out.push(next);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    /// Resolve percentage sizes against ancestors. Pure: reads configuration
    /// only, never the layout cache.
    pub fn expanded_size(&self, id: ElementId) -> Option<ResolvedSize> {
        let element = self.nodes.get(id)?;
        if !element.width.is_relative() && !element.height.is_relative() {
            return Some(ResolvedSize::new(
                element.width.resolve(None),
                element.height.resolve(None),
            ));
        }

        let parent = element
            .parent
            .and_then(|p| self.expanded_size(p))
            .unwrap_or(ResolvedSize::new(Some(0), Some(0)));

        Some(ResolvedSize::new(
            element.width.resolve(parent.width),
            element.height.resolve(parent.height),
        ))
    }

    /// Cached geometry of the last frame.
    pub fn layout(&self, id: ElementId) -> Option<&LayoutCache> {
        self.nodes.get(id).map(|e| &e.layout)
    }

    pub(crate) fn layout_mut(&mut self, id: ElementId) -> Option<&mut LayoutCache> {
        self.nodes.get_mut(id).map(|e| &mut e.layout)
    }

    /// Absolute position of `id` in root coordinates, from cached placements.
    pub fn locate(&self, id: ElementId) -> Option<Point> {
        let element = self.nodes.get(id)?;
        match element.parent {
            Some(parent) => Some(self.locate(parent)? + element.layout.origin()),
            None => Some(Point::ORIGIN),
        }
    }

    // =====================================================================
    // Selection
    // =====================================================================

    pub fn deselect_all(&mut self) {
        for id in self.descendants(self.root) {
            if let Some(element) = self.nodes.get_mut(id) {
                element.selected = false;
            }
        }
    }

    /// Make `id` the only selected element. Non-selectable or missing
    /// elements leave the tree with nothing selected.
    pub fn select_exclusive(&mut self, id: Option<ElementId>) {
        self.deselect_all();
        if let Some(element) = id.and_then(|id| self.nodes.get_mut(id)) {
            if element.selectable {
                element.selected = true;
            }
        }
    }

    /// Every element currently flagged selected.
    pub fn selected_elements(&self) -> Vec<ElementId> {
        self.nodes
            .iter()
            .filter(|(_, e)| e.selected)
            .map(|(id, _)| id)
            .collect()
    }

    // =====================================================================
    // Events
    // =====================================================================

    pub fn add_event_handler(
        &mut self,
        id: ElementId,
        handler: impl FnMut(ElementId, &UiEvent) -> Option<M> + 'static,
    ) -> Result<(), TreeError> {
        self.node_mut(id)?.handlers.push(Box::new(handler));
        Ok(())
    }

    /// Run `id`'s handlers in registration order, collecting messages.
    pub fn emit_into(&mut self, id: ElementId, event: &UiEvent, out: &mut Vec<M>) {
        let Some(element) = self.nodes.get_mut(id) else {
            tracing::warn!(?id, ?event, "event for stale element dropped");
            return;
        };
        for handler in element.handlers.iter_mut() {
            if let Some(message) = handler(id, event) {
                out.push(message);
            }
        }
    }

    pub fn emit(&mut self, id: ElementId, event: &UiEvent) -> Vec<M> {
        let mut out = Vec::new();
        self.emit_into(id, event, &mut out);
        out
    }
}

impl<M> std::fmt::Debug for Tree<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("len", &self.nodes.len())
            .finish()
    }
}
