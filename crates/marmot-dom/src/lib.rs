//! DOM tree implementation for the Marmot markup parser.
//!
//! This crate provides an arena-based document tree produced by the
//! `marmot-markup` tree builder.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Child
//! lists own their nodes; parent and sibling links are plain indices that are
//! written once by [`DomTree::link_children`] when a container's children are
//! known.

use std::collections::HashMap;

/// Map of attribute names to values for an element or XML declaration.
///
/// A bare attribute (`<input disabled>`) has no value.
pub type AttributesMap = HashMap<String, Option<String>>;

/// A type-safe index into the DOM tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node in the arena.
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,

    /// The container that owns this node, or `None` for the document and for
    /// nodes that were never linked.
    pub parent: Option<NodeId>,

    /// Owned children in document order. Only documents and elements have any.
    pub children: Vec<NodeId>,

    /// The node immediately following this one in its parent's children.
    pub next_sibling: Option<NodeId>,

    /// The node immediately preceding this one in its parent's children.
    pub prev_sibling: Option<NodeId>,
}

/// The node variants a parse can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// The root of every tree.
    Document(DocumentData),
    /// `<prefix:name attr="value">...</prefix:name>`
    Element(ElementData),
    /// `<!DOCTYPE name TYPE "public" "system">`
    Doctype(DoctypeData),
    /// `<!-- ... -->`, `None` when the body is empty.
    Comment(Option<String>),
    /// `<![CDATA[ ... ]]>`, `None` when the body is empty.
    Cdata(Option<String>),
    /// A run of character data.
    Text(String),
    /// `<?xml version="1.0"?>` and its pseudo-attributes.
    XmlDeclaration(AttributesMap),
}

/// Document-specific data.
///
/// The doctype and XML declaration live in dedicated slots rather than in
/// the document's child list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentData {
    /// The document's `Doctype` node, if any.
    pub doctype: Option<NodeId>,
    /// The document's `XmlDeclaration` node, if any.
    pub xml_declaration: Option<NodeId>,
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Namespace prefix (`svg` in `<svg:rect>`). Not resolved to a URI.
    pub prefix: Option<String>,
    /// Local name of the element.
    pub name: String,
    /// Attributes, keyed by name as written.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// The name as written in the source, `prefix:name` when a prefix is present.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns the value of an attribute, or `None` when it is absent or bare.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Option::as_deref)
    }

    /// Returns true if the attribute is present, with or without a value.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

/// Doctype-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeData {
    /// Root element name (`html`).
    pub name: String,
    /// Keyword following the name (`PUBLIC`, `SYSTEM`).
    pub doc_type: Option<String>,
    /// First quoted identifier.
    pub public_id: Option<String>,
    /// Second quoted identifier.
    pub system_id: Option<String>,
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by `NodeId`
/// - O(1) parent/sibling traversal
/// - No reference cycles (indices instead of references)
///
/// Two trees compare equal when their arenas are identical, which is the
/// case for two parses of the same input.
#[derive(Debug, Clone, PartialEq)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document(DocumentData::default()),
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree, the document included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Give `parent` its complete, ordered child list.
    ///
    /// Every child gets `parent` as its parent, the first child has no
    /// previous sibling, the last has no next sibling, and each neighbouring
    /// pair points at each other. Children are neither reordered nor
    /// filtered. Called once per container, right after its children have
    /// been built.
    ///
    /// # Panics
    ///
    /// Panics if `parent` or any child is not a node of this tree.
    pub fn link_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        debug_assert!(
            self.nodes[parent.0].children.is_empty(),
            "children of {parent:?} linked twice"
        );

        for (index, &child) in children.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = index.checked_sub(1).map(|prev| children[prev]);
            node.next_sibling = children.get(index + 1).copied();
        }

        self.nodes[parent.0].children = children;
    }

    /// Put a `Doctype` node into the document's doctype slot.
    ///
    /// Returns the node previously held by the slot, which is detached.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this tree.
    pub fn set_doctype(&mut self, id: NodeId) -> Option<NodeId> {
        self.attach_slot(id);
        let previous = self.document_data_mut().doctype.replace(id);
        if let Some(old) = previous {
            self.nodes[old.0].parent = None;
        }
        previous
    }

    /// Put an `XmlDeclaration` node into the document's declaration slot.
    ///
    /// Returns the node previously held by the slot, which is detached.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this tree.
    pub fn set_xml_declaration(&mut self, id: NodeId) -> Option<NodeId> {
        self.attach_slot(id);
        let previous = self.document_data_mut().xml_declaration.replace(id);
        if let Some(old) = previous {
            self.nodes[old.0].parent = None;
        }
        previous
    }

    /// Slot nodes belong to the document but have no siblings.
    fn attach_slot(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.parent = Some(NodeId::ROOT);
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    fn document_data_mut(&mut self) -> &mut DocumentData {
        match &mut self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("node 0 is always the document"),
        }
    }

    /// The document's slot data.
    #[must_use]
    pub fn document_data(&self) -> &DocumentData {
        match &self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("node 0 is always the document"),
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Iterate over all descendants of a node in document order (pre-order),
    /// not including the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The document's doctype, if one was parsed.
    #[must_use]
    pub fn doctype(&self) -> Option<&DoctypeData> {
        let id = self.document_data().doctype?;
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Doctype(data) => Some(data),
            _ => None,
        })
    }

    /// The attributes of the document's XML declaration, if one was parsed.
    #[must_use]
    pub fn xml_declaration(&self) -> Option<&AttributesMap> {
        let id = self.document_data().xml_declaration?;
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::XmlDeclaration(attrs) => Some(attrs),
            _ => None,
        })
    }

    /// The first element child of the document, if it exists.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// Concatenated text and CDATA content of all descendants of `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        if let Some(text) = self.as_text(id) {
            result.push_str(text);
            return result;
        }
        for descendant in self.descendants(id) {
            match self.get(descendant).map(|n| &n.node_type) {
                Some(NodeType::Text(data)) => result.push_str(data),
                Some(NodeType::Cdata(Some(data))) => result.push_str(data),
                _ => {}
            }
        }
        result
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the siblings on one side of a node.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
