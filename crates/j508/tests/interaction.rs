//! Event-driven fixes
//!
//! Dropdown relocation, date-picker focus hand-off and focus traps,
//! driven through `dispatch` and the virtual clock.

use j508::dom::{DOMRect, Document, ElementQuery, Event, EventType, Key, NodeId};
use j508::{Compliance, FocusOrder, Rule, RunConfiguration, Target};

const DROPDOWN: &str = r##"
<ul class="nav">
  <li class="dropdown" id="owner">
    <a href="#" class="dropdown-toggle">Menu</a>
    <ul class="dropdown-menu">
      <li><a href="/one">One</a></li>
      <li><a href="/two">Two</a></li>
    </ul>
  </li>
</ul>
<ul class="dropdown-menu inline" id="inline"><li>Static</li></ul>
"##;

const DATE_PICKER: &str = r##"
<div class="row">
  <div class="dataTables_wrapper">
    <table class="TimeSlotTable">
      <tbody><tr><td class="TimeSlot available"><a class="timeSlotLinkContent" href="#">9:00</a></td></tr></tbody>
    </table>
  </div>
</div>
<button id="next">Continue</button>
"##;

fn first(doc: &Document, selector: &str) -> NodeId {
    doc.tree().query_selector(doc.tree().root(), selector).unwrap().unwrap()
}

fn only(rule: Rule) -> RunConfiguration {
    RunConfiguration::new().with_rules(rule)
}

struct DropdownPage {
    doc: Document,
    compliance: Compliance,
    owner: NodeId,
    menu: NodeId,
    first_link: NodeId,
}

fn dropdown_page() -> DropdownPage {
    let mut doc = j508::html::parse(DROPDOWN);
    let owner = doc.get_element_by_id("owner").unwrap();
    let menu = first(&doc, "li.dropdown ul.dropdown-menu");
    let first_link = first(&doc, "ul.dropdown-menu li a");

    doc.set_viewport(1000.0, 800.0);
    doc.set_layout_box(owner, DOMRect::from_xywh(100.0, 40.0, 80.0, 30.0));
    doc.set_layout_box(menu, DOMRect::from_xywh(0.0, 0.0, 200.0, 120.0));

    let mut compliance = Compliance::new();
    let report = compliance.run_with_config(&mut doc, Target::Body, only(Rule::DropDownAddFix));
    assert_eq!(report.total(), 1, "inline menus are skipped");
    assert_eq!(report.violations[0].context, menu);

    DropdownPage { doc, compliance, owner, menu, first_link }
}

#[test]
fn test_dropdown_listeners_bound() {
    let page = dropdown_page();
    let c = &page.compliance;
    assert!(c.is_bound(page.owner, EventType::Custom("show.bs.dropdown"), "j508"));
    assert!(c.is_bound(page.owner, EventType::Custom("shown.bs.dropdown"), "j508"));
    assert!(c.is_bound(page.doc.body(), EventType::Scroll, "j508.dropdown"));
    assert!(c.is_bound(NodeId::ROOT, EventType::Scroll, "j508.dropdown"));
    assert!(c.is_bound(j508::dom::EventTarget::Window, EventType::Resize, "j508.dropdown"));
}

#[test]
fn test_dropdown_rebinding_does_not_stack() {
    let mut page = dropdown_page();
    let count = page.compliance.listener_count();
    page.compliance.run_with_config(&mut page.doc, Target::Body, only(Rule::DropDownAddFix));
    assert_eq!(page.compliance.listener_count(), count);
}

#[test]
fn test_dropdown_show_relocates_menu() {
    let DropdownPage { mut doc, mut compliance, owner, menu, .. } = dropdown_page();

    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));

    let tree = doc.tree();
    assert_eq!(tree.parent(menu), Some(doc.body()));
    assert_eq!(tree.style_property(menu, "position").as_deref(), Some("absolute"));
    assert_eq!(tree.style_property(menu, "display").as_deref(), Some("block"));
    assert_eq!(tree.style_property(menu, "left").as_deref(), Some("100px"));
    assert_eq!(tree.style_property(menu, "top").as_deref(), Some("70px"));
    assert_eq!(compliance.active_dropdowns().len(), 1);
    assert!(compliance.is_bound(owner, EventType::Custom("hide.bs.dropdown"), "j508"));
}

#[test]
fn test_dropdown_hide_restores_menu() {
    let DropdownPage { mut doc, mut compliance, owner, menu, .. } = dropdown_page();

    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));
    compliance.dispatch(&mut doc, Event::custom("hide.bs.dropdown", owner));

    assert_eq!(doc.tree().parent(menu), Some(owner));
    assert_eq!(doc.tree().style_property(menu, "display").as_deref(), Some("none"));
    assert!(compliance.active_dropdowns().is_empty());
}

#[test]
fn test_scroll_hides_active_dropdowns() {
    let DropdownPage { mut doc, mut compliance, owner, menu, .. } = dropdown_page();
    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));

    let body = doc.body();
    compliance.dispatch(&mut doc, Event::scroll(body));
    assert_eq!(doc.tree().parent(menu), Some(owner));
    assert!(compliance.active_dropdowns().is_empty());
}

#[test]
fn test_resize_hides_active_dropdowns() {
    let DropdownPage { mut doc, mut compliance, owner, menu, .. } = dropdown_page();
    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));

    compliance.dispatch(&mut doc, Event::resize());
    assert_eq!(doc.tree().parent(menu), Some(owner));
}

#[test]
fn test_dropdown_shown_focuses_first_link_after_delay() {
    let DropdownPage { mut doc, mut compliance, owner, first_link, .. } = dropdown_page();
    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));
    compliance.dispatch(&mut doc, Event::custom("shown.bs.dropdown", owner));

    assert_eq!(compliance.advance(&mut doc, 9), 0);
    assert_eq!(doc.focused(), None);
    assert_eq!(compliance.advance(&mut doc, 1), 1);
    assert_eq!(doc.focused(), Some(first_link));
}

#[test]
fn test_hide_cancels_pending_focus() {
    let DropdownPage { mut doc, mut compliance, owner, .. } = dropdown_page();
    compliance.dispatch(&mut doc, Event::custom("show.bs.dropdown", owner));
    compliance.dispatch(&mut doc, Event::custom("shown.bs.dropdown", owner));
    compliance.dispatch(&mut doc, Event::custom("hide.bs.dropdown", owner));

    assert_eq!(compliance.pending_tasks(), 0);
    assert_eq!(compliance.advance(&mut doc, 50), 0);
    assert_eq!(doc.focused(), None);
}

#[test]
fn test_date_picker_enter_moves_focus() {
    let mut doc = j508::html::parse(DATE_PICKER);
    let mut compliance = Compliance::new();
    let report = compliance.run_with_config(&mut doc, Target::Body, only(Rule::DatePickerAddFix));
    assert_eq!(report.total(), 2);

    let link = first(&doc, "a.timeSlotLinkContent");
    let next = doc.get_element_by_id("next").unwrap();
    assert!(compliance.is_bound(link, EventType::KeyUp, "j508"));

    assert!(compliance.dispatch(&mut doc, Event::key_up(link, Key::Enter)));
    assert_eq!(doc.focused(), None);
    assert!(compliance.advance(&mut doc, 10) >= 1);
    assert_eq!(doc.focused(), Some(next));
}

#[test]
fn test_date_picker_ignores_other_keys() {
    let mut doc = j508::html::parse(DATE_PICKER);
    let mut compliance = Compliance::new();
    compliance.run_with_config(&mut doc, Target::Body, only(Rule::DatePickerAddFix));

    let link = first(&doc, "a.timeSlotLinkContent");
    assert!(!compliance.dispatch(&mut doc, Event::key_up(link, Key::Escape)));
    assert_eq!(compliance.pending_tasks(), 0);
}

#[test]
fn test_date_picker_task_dropped_when_origin_detached() {
    let mut doc = j508::html::parse(DATE_PICKER);
    let mut compliance = Compliance::new();
    compliance.run_with_config(&mut doc, Target::Body, only(Rule::DatePickerAddFix));

    let link = first(&doc, "a.timeSlotLinkContent");
    let wrapper = first(&doc, ".dataTables_wrapper");
    compliance.dispatch(&mut doc, Event::key_up(link, Key::Enter));
    doc.tree_mut().detach(wrapper).unwrap();

    assert_eq!(compliance.advance(&mut doc, 10), 0);
    assert_eq!(doc.focused(), None);
}

fn trap_page() -> (Document, NodeId, Vec<NodeId>) {
    let doc = j508::html::parse(
        r#"<div id="dialog"><input class="b"><input class="a"><input class="c"></div>"#,
    );
    let dialog = doc.get_element_by_id("dialog").unwrap();
    let inputs = doc.tree().query_selector_all(dialog, "input").unwrap();
    (doc, dialog, inputs)
}

#[test]
fn test_focus_trap_class_name_order() {
    let (mut doc, dialog, inputs) = trap_page();
    let (b, a, c) = (inputs[0], inputs[1], inputs[2]);
    let mut compliance = Compliance::new().with_focus_order(FocusOrder::ClassName);

    // Descending by class: c, b, a
    assert_eq!(compliance.hook_tab_index(&mut doc, "dialog", dialog), Some(a));
    assert_eq!(doc.focused(), Some(c));

    doc.focus(a);
    assert!(compliance.dispatch(&mut doc, Event::key_down(a, Key::Tab)));
    assert_eq!(doc.focused(), Some(c));

    // Tab elsewhere is left to the browser
    assert!(!compliance.dispatch(&mut doc, Event::key_down(b, Key::Tab)));
}

#[test]
fn test_focus_trap_dom_order() {
    let (mut doc, dialog, inputs) = trap_page();
    let mut compliance = Compliance::new();

    assert_eq!(compliance.hook_tab_index(&mut doc, "dialog", dialog), Some(inputs[2]));
    assert_eq!(doc.focused(), Some(inputs[0]));
    assert!(compliance.dispatch(&mut doc, Event::key_down(inputs[2], Key::Tab)));
    assert_eq!(doc.focused(), Some(inputs[0]));
}

#[test]
fn test_rehook_replaces_listener() {
    let (mut doc, dialog, inputs) = trap_page();
    let mut compliance = Compliance::new();
    compliance.hook_tab_index(&mut doc, "dialog", dialog);
    let count = compliance.listener_count();

    // The last input goes away; re-hooking binds on the new last one
    doc.tree_mut().detach(inputs[2]).unwrap();
    assert_eq!(compliance.hook_tab_index(&mut doc, "dialog", dialog), Some(inputs[1]));
    assert_eq!(compliance.listener_count(), count);
    assert!(!compliance.is_bound(inputs[2], EventType::KeyDown, "j508.tab.dialog"));
}

#[test]
fn test_unhook_unknown_id_is_noop() {
    let (mut doc, dialog, _) = trap_page();
    let mut compliance = Compliance::new();
    compliance.hook_tab_index(&mut doc, "dialog", dialog);
    let before = j508::html::serialize(&doc);
    let count = compliance.listener_count();

    assert!(!compliance.unhook_tab_index("never-hooked"));
    assert_eq!(compliance.listener_count(), count);
    assert_eq!(j508::html::serialize(&doc), before);
    assert_eq!(compliance.hook("dialog"), Some(doc.tree().query_selector_all(dialog, "input").unwrap()[2]));
}

#[test]
fn test_instances_share_nothing() {
    let (mut doc, dialog, _) = trap_page();
    let mut first = Compliance::new();
    let second = Compliance::new();
    first.hook_tab_index(&mut doc, "dialog", dialog);
    assert!(first.hook("dialog").is_some());
    assert!(second.hook("dialog").is_none());
    assert_eq!(second.listener_count(), 0);
}
