//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree
///
/// Slot 0 always holds the document node. Removed nodes keep their slot,
/// they are just unlinked from their parent, until the subtree is handed
/// back with [`DomTree::release`].
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Released slots, reused before the arena grows
    free: Vec<NodeId>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            free: Vec::new(),
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()?)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()?)
    }

    /// Element data for an element node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data for an element node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Number of slots in the arena, detached and released ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Slots currently waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// The arena always holds the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0 as usize] = node;
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    /// Create a detached doctype
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound)?;
        if !matches!(parent_node.data, NodeData::Element(_) | NodeData::Document) {
            return Err(DomError::InvalidNodeType);
        }
        if child == NodeId::ROOT || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.nodes[parent.0 as usize].last_child;
        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let node = self.get(child).ok_or(DomError::NotFound)?;
        if node.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Hand a detached subtree's slots back for reuse.
    ///
    /// Returns the released ids, `id` first. Every handle into the subtree
    /// dangles afterwards and may come back from a later `create_*`.
    pub fn release(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let node = self.get(id).ok_or(DomError::NotFound)?;
        if id == NodeId::ROOT || node.parent.is_valid() {
            return Err(DomError::HierarchyRequest);
        }
        if self.free.contains(&id) {
            return Err(DomError::NotFound);
        }

        let released: Vec<NodeId> = std::iter::once(id)
            .chain(self.descendants(id).map(|(child, _)| child))
            .collect();
        for &slot in &released {
            self.nodes[slot.0 as usize] = Node::comment(String::new());
        }
        self.free.extend(released.iter().rev().copied());
        Ok(released)
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        parent.is_valid().then_some(parent)
    }

    /// Direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// All descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// `ancestor == node` or `ancestor` contains `node`
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Concatenated data of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|(_, node)| node.as_text())
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order subtree iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            // Climb until a next sibling exists, stopping at the subtree root
            let mut cursor = id;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(current) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if current.next_sibling.is_valid() {
                    break current.next_sibling;
                }
                cursor = current.parent;
                if !cursor.is_valid() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let text = tree.create_text("Hello");
        let span = tree.create_element("span");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p).unwrap();
        tree.append_child(p, text).unwrap();
        tree.append_child(div, span).unwrap();
        (tree, div, p, text, span)
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, div, p, text, span) = sample();
        let order: Vec<_> = tree.descendants(tree.root()).map(|(id, _)| id).collect();
        assert_eq!(order, [div, p, text, span]);

        let inner: Vec<_> = tree.descendants(p).map(|(id, _)| id).collect();
        assert_eq!(inner, [text]);
    }

    #[test]
    fn test_remove_child_unlinks_siblings() {
        let (mut tree, div, p, _, span) = sample();
        tree.remove_child(div, p).unwrap();

        assert_eq!(tree.get(div).unwrap().first_child, span);
        assert!(!tree.get(span).unwrap().prev_sibling.is_valid());
        assert!(!tree.is_connected(p));
        assert_eq!(tree.remove_child(div, p), Err(DomError::NotAChild));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut tree, div, p, text, _) = sample();
        assert_eq!(tree.append_child(p, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(text, div), Err(DomError::InvalidNodeType));
    }

    #[test]
    fn test_release_reuses_slots() {
        let (mut tree, div, p, text, _) = sample();
        let before = tree.len();
        assert_eq!(tree.release(p), Err(DomError::HierarchyRequest));
        assert_eq!(tree.release(tree.root()), Err(DomError::HierarchyRequest));

        tree.remove_child(div, p).unwrap();
        assert_eq!(tree.release(p).unwrap(), [p, text]);
        assert_eq!(tree.free_count(), 2);
        assert_eq!(tree.release(p), Err(DomError::NotFound));

        assert_eq!(tree.create_element("em"), p);
        assert_eq!(tree.create_text("x"), text);
        assert_eq!(tree.len(), before);
        assert_eq!(tree.free_count(), 0);
        assert!(!tree.get(p).unwrap().first_child.is_valid());
    }

    #[test]
    fn test_text_content() {
        let (mut tree, div, _, _, span) = sample();
        let more = tree.create_text(" World");
        tree.append_child(span, more).unwrap();
        assert_eq!(tree.text_content(div), "Hello World");
    }
}
