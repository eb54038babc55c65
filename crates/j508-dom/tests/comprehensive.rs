//! Comprehensive tests for j508-dom
//!
//! Tree surgery, selector queries and listener bookkeeping working together.

use j508_dom::{
    Document, DomTree, ElementQuery, EventRegistry, EventType, NodeId, SelectorList,
};

fn build_menu(doc: &mut Document) -> (NodeId, NodeId, Vec<NodeId>) {
    let body = doc.body();
    let tree = doc.tree_mut();
    let owner = tree.create_element("li");
    let menu = tree.create_element("ul");
    tree.set_attribute(menu, "class", "dropdown-menu").unwrap();
    tree.append_child(body, owner).unwrap();
    tree.append_child(owner, menu).unwrap();

    let mut links = Vec::new();
    for label in ["One", "Two"] {
        let li = tree.create_element("li");
        let a = tree.create_element("a");
        let text = tree.create_text(label);
        tree.append_child(menu, li).unwrap();
        tree.append_child(li, a).unwrap();
        tree.append_child(a, text).unwrap();
        links.push(a);
    }
    (owner, menu, links)
}

#[test]
fn test_move_subtree_between_parents() {
    let mut doc = Document::new("about:blank");
    let (owner, menu, links) = build_menu(&mut doc);
    let body = doc.body();

    doc.tree_mut().detach(menu).unwrap();
    doc.tree_mut().append_child(body, menu).unwrap();
    assert_eq!(doc.tree().parent(menu), Some(body));
    assert!(doc.tree().get(owner).unwrap().first_child == NodeId::NONE);

    // Links travel with the subtree
    for link in &links {
        assert!(doc.tree().is_connected(*link));
        assert!(doc.tree().is_ancestor(menu, *link));
    }

    doc.tree_mut().append_child(owner, menu).unwrap();
    assert_eq!(doc.tree().parent(menu), Some(owner));
}

#[test]
fn test_query_after_mutation() {
    let mut doc = Document::new("about:blank");
    let (_, menu, links) = build_menu(&mut doc);
    let tree = doc.tree();

    let found = tree.query_selector_all(tree.root(), "ul.dropdown-menu a").unwrap();
    assert_eq!(found, links);

    doc.tree_mut().set_attribute(menu, "class", "dropdown-menu inline").unwrap();
    let tree = doc.tree();
    let visible = tree.query_selector_all(tree.root(), "ul.dropdown-menu:not([class*=inline])").unwrap();
    assert!(visible.is_empty());
    let not_inline_class = tree.query_selector_all(tree.root(), "ul.dropdown-menu:not(.inline)").unwrap();
    assert!(not_inline_class.is_empty());
}

#[test]
fn test_text_content_spans_children() {
    let mut tree = DomTree::new();
    let a = tree.create_element("a");
    let b = tree.create_element("b");
    let t1 = tree.create_text("Save ");
    let t2 = tree.create_text("now");
    tree.append_child(tree.root(), a).unwrap();
    tree.append_child(a, t1).unwrap();
    tree.append_child(a, b).unwrap();
    tree.append_child(b, t2).unwrap();
    assert_eq!(tree.text_content(a), "Save now");
}

#[test]
fn test_selector_list_is_reusable() {
    let mut doc = Document::new("about:blank");
    let (_, _, links) = build_menu(&mut doc);
    let selector: SelectorList = "a:not([tabindex])".parse().unwrap();

    assert_eq!(doc.tree().select(doc.body(), &selector).len(), 2);
    doc.tree_mut().set_attribute(links[0], "tabindex", "0").unwrap();
    assert_eq!(doc.tree().select(doc.body(), &selector), vec![links[1]]);
}

#[test]
fn test_registry_per_target() {
    let mut doc = Document::new("about:blank");
    let (owner, menu, _) = build_menu(&mut doc);
    let mut registry: EventRegistry<&str> = EventRegistry::new();

    registry.bind(owner, EventType::Custom("show.bs.dropdown"), "j508", "show");
    registry.bind(menu, EventType::Scroll, "j508.dropdown", "hide");
    assert_eq!(registry.len(), 2);
    assert!(registry.is_bound(owner, EventType::Custom("show.bs.dropdown"), "j508"));
    assert!(!registry.is_bound(menu, EventType::Custom("show.bs.dropdown"), "j508"));
}
