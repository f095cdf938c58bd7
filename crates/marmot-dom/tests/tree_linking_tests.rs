//! Tests for the tree linker and document slots.

use marmot_dom::{AttributesMap, DoctypeData, DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its `NodeId`.
fn alloc_element(tree: &mut DomTree, name: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData {
        prefix: None,
        name: name.to_string(),
        attrs: AttributesMap::new(),
    }))
}

fn alloc_text(tree: &mut DomTree, text: &str) -> NodeId {
    tree.alloc(NodeType::Text(text.to_string()))
}

// ========== link_children ==========

#[test]
fn test_link_single_child() {
    let mut tree = DomTree::new();
    let child = alloc_element(&mut tree, "p");
    tree.link_children(NodeId::ROOT, vec![child]);

    assert_eq!(tree.children(NodeId::ROOT), &[child]);
    assert_eq!(tree.parent(child), Some(NodeId::ROOT));
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_link_three_children() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_text(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.link_children(parent, vec![a, b, c]);
    tree.link_children(NodeId::ROOT, vec![parent]);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.next_sibling(c), None);
    for child in [a, b, c] {
        assert_eq!(tree.parent(child), Some(parent));
    }
}

#[test]
fn test_link_preserves_order() {
    let mut tree = DomTree::new();
    let second = alloc_text(&mut tree, "second");
    let first = alloc_text(&mut tree, "first");
    tree.link_children(NodeId::ROOT, vec![first, second]);

    assert_eq!(tree.first_child(NodeId::ROOT), Some(first));
    assert_eq!(tree.last_child(NodeId::ROOT), Some(second));
}

#[test]
fn test_link_empty_children() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "empty");
    tree.link_children(parent, Vec::new());

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.first_child(parent), None);
}

// ========== traversal ==========

#[test]
fn test_sibling_iterators() {
    let mut tree = DomTree::new();
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.link_children(NodeId::ROOT, vec![a, b, c]);

    let preceding: Vec<_> = tree.preceding_siblings(c).collect();
    assert_eq!(preceding, vec![b, a]);
    let following: Vec<_> = tree.following_siblings(a).collect();
    assert_eq!(following, vec![b, c]);
}

#[test]
fn test_ancestors_and_descendants() {
    let mut tree = DomTree::new();
    let leaf = alloc_text(&mut tree, "leaf");
    let inner = alloc_element(&mut tree, "inner");
    tree.link_children(inner, vec![leaf]);
    let sibling = alloc_text(&mut tree, "tail");
    let outer = alloc_element(&mut tree, "outer");
    tree.link_children(outer, vec![inner, sibling]);
    tree.link_children(NodeId::ROOT, vec![outer]);

    let ancestors: Vec<_> = tree.ancestors(leaf).collect();
    assert_eq!(ancestors, vec![inner, outer, NodeId::ROOT]);
    assert!(tree.is_descendant_of(leaf, outer));
    assert!(!tree.is_descendant_of(outer, leaf));

    let descendants: Vec<_> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(descendants, vec![outer, inner, leaf, sibling]);
    assert_eq!(tree.text_content(outer), "leaftail");
    assert_eq!(tree.document_element(), Some(outer));
}

// ========== document slots ==========

#[test]
fn test_doctype_slot() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::Doctype(DoctypeData {
        name: "html".to_string(),
        doc_type: None,
        public_id: None,
        system_id: None,
    }));
    assert_eq!(tree.set_doctype(doctype), None);

    assert_eq!(tree.parent(doctype), Some(NodeId::ROOT));
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.doctype().map(|d| d.name.as_str()), Some("html"));
}

#[test]
fn test_replacing_slot_detaches_previous() {
    let mut tree = DomTree::new();
    let first = tree.alloc(NodeType::XmlDeclaration(AttributesMap::new()));
    let mut attrs = AttributesMap::new();
    let _ = attrs.insert("version".to_string(), Some("1.1".to_string()));
    let second = tree.alloc(NodeType::XmlDeclaration(attrs));

    assert_eq!(tree.set_xml_declaration(first), None);
    assert_eq!(tree.set_xml_declaration(second), Some(first));

    assert_eq!(tree.parent(first), None);
    assert_eq!(tree.document_data().xml_declaration, Some(second));
    let version = tree
        .xml_declaration()
        .and_then(|attrs| attrs.get("version").cloned().flatten());
    assert_eq!(version.as_deref(), Some("1.1"));
}

#[test]
fn test_slots_stay_out_of_the_sibling_chain() {
    let mut tree = DomTree::new();
    let before = alloc_element(&mut tree, "before");
    let declaration = tree.alloc(NodeType::XmlDeclaration(AttributesMap::new()));
    let after = alloc_element(&mut tree, "after");
    tree.link_children(NodeId::ROOT, vec![before, after]);

    assert_eq!(tree.set_xml_declaration(declaration), None);

    assert_eq!(tree.parent(declaration), Some(NodeId::ROOT));
    assert_eq!(tree.prev_sibling(declaration), None);
    assert_eq!(tree.next_sibling(declaration), None);
    assert_eq!(tree.children(NodeId::ROOT), &[before, after]);
    assert_eq!(tree.next_sibling(before), Some(after));
    assert_eq!(tree.prev_sibling(after), Some(before));
}

#[test]
fn test_qualified_name() {
    let element = ElementData {
        prefix: Some("svg".to_string()),
        name: "rect".to_string(),
        attrs: AttributesMap::new(),
    };
    assert_eq!(element.qualified_name(), "svg:rect");
    assert_eq!(element.attribute("width"), None);
}
