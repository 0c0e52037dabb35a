//! Integration tests - inspector session driven like a page would drive it

use std::time::{Duration, Instant};

use fos_a11y::hover::TOOLTIP_CLASS;
use fos_a11y::{FOCUSABLE_CLASS, Feature, HIGH_CONTRAST_CLASS, NO_ALT_CLASS, NO_NAME_CLASS};
use fos_a11y_debug::{Inspector, InspectorConfig, JsonFileStore, MemoryStore, SettingsStore};
use fos_dom::{Document, EventType, NodeId};
use tempfile::TempDir;

const PAGE: &str = r#"
<html>
<body>
    <header><img id="logo" src="logo.png"></header>
    <form>
        <button id="send"></button>
        <a id="help" href="/help">Help</a>
        <span id="note">plain text</span>
    </form>
</body>
</html>
"#;

fn load<S: SettingsStore>(store: S) -> Inspector<S> {
    let document = fos_html::parse(PAGE).unwrap();
    Inspector::load(document, store, InspectorConfig::default())
}

fn id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id).unwrap()
}

fn count(doc: &Document, class: &str) -> usize {
    doc.query_selector_all(&format!(".{class}")).unwrap().len()
}

#[test]
fn test_load_applies_persisted_flags() {
    let mut store = MemoryStore::new();
    store.set_bool("a11yDebug_noAlt", true).unwrap();
    store.set_bool("a11yDebug_highContrast", true).unwrap();

    let inspector = load(store);
    let doc = inspector.document();
    assert!(doc.has_class(id(doc, "logo"), NO_ALT_CLASS));
    assert!(doc.has_class(doc.document_element().unwrap(), HIGH_CONTRAST_CLASS));
    assert_eq!(count(doc, FOCUSABLE_CLASS), 0);
}

#[test]
fn test_set_feature_persists_and_applies() {
    let mut inspector = load(MemoryStore::new());
    inspector.set_feature(Feature::Focusable, true).unwrap();
    assert!(inspector.store().get_bool("a11yDebug_focusable", false));
    assert_eq!(count(inspector.document(), FOCUSABLE_CLASS), 2);

    inspector.set_feature(Feature::Focusable, false).unwrap();
    assert!(!inspector.store().get_bool("a11yDebug_focusable", true));
    assert_eq!(count(inspector.document(), FOCUSABLE_CLASS), 0);
}

#[test]
fn test_flags_survive_restart_through_json_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a11y.json");
    {
        let mut inspector = load(JsonFileStore::open(&path).unwrap());
        inspector.set_feature(Feature::NoAccessibleName, true).unwrap();
    }

    let inspector = load(JsonFileStore::open(&path).unwrap());
    assert!(inspector.flags().no_accessible_name);
    assert!(inspector.document().has_class(id(inspector.document(), "send"), NO_NAME_CLASS));
}

#[test]
fn test_hover_lifecycle() {
    let mut inspector = load(MemoryStore::new());
    inspector.set_feature(Feature::Focusable, true).unwrap();
    let send = id(inspector.document(), "send");

    // Info feature off: no listeners, nothing happens
    assert_eq!(inspector.handle_event(EventType::PointerEnter, send), 0);
    assert!(!inspector.hover().is_showing());

    inspector.set_feature(Feature::ScreenReaderInfo, true).unwrap();
    assert_eq!(inspector.handle_event(EventType::PointerEnter, send), 1);
    assert_eq!(count(inspector.document(), TOOLTIP_CLASS), 1);

    let help = id(inspector.document(), "help");
    inspector.handle_event(EventType::PointerEnter, help);
    assert_eq!(count(inspector.document(), TOOLTIP_CLASS), 1);
    assert_eq!(inspector.hover().target(), Some(help));

    inspector.handle_event(EventType::PointerLeave, help);
    assert_eq!(count(inspector.document(), TOOLTIP_CLASS), 0);

    // Turning the info feature off hides a live tooltip and drops listeners
    inspector.handle_event(EventType::PointerEnter, help);
    inspector.set_feature(Feature::ScreenReaderInfo, false).unwrap();
    assert_eq!(count(inspector.document(), TOOLTIP_CLASS), 0);
    assert!(!inspector.document().has_event_listener(help, EventType::PointerEnter));
}

#[test]
fn test_pointer_events_do_not_bubble() {
    let mut inspector = load(MemoryStore::new());
    inspector.set_feature(Feature::Focusable, true).unwrap();
    inspector.set_feature(Feature::ScreenReaderInfo, true).unwrap();

    let help = id(inspector.document(), "help");
    let text = inspector.document().tree().get(help).unwrap().first_child;
    assert_eq!(inspector.handle_event(EventType::PointerEnter, text), 0);
    assert!(!inspector.hover().is_showing());
}

#[test]
fn test_click_dismisses_markers() {
    let mut inspector = load(MemoryStore::new());
    inspector.set_feature(Feature::Focusable, true).unwrap();
    inspector.set_feature(Feature::NoAccessibleName, true).unwrap();
    inspector.set_feature(Feature::ScreenReaderInfo, true).unwrap();

    let send = id(inspector.document(), "send");
    inspector.handle_event(EventType::PointerEnter, send);
    assert!(inspector.hover().is_showing());

    // Document-level listener sees the click through bubbling
    assert_eq!(inspector.handle_event(EventType::Click, send), 1);
    let doc = inspector.document();
    assert!(!doc.has_class(send, FOCUSABLE_CLASS));
    assert!(!doc.has_class(send, NO_NAME_CLASS));
    assert!(!inspector.hover().is_showing());

    // Unmarked targets are left alone
    let note = id(inspector.document(), "note");
    inspector.handle_event(EventType::Click, note);
    assert_eq!(inspector.document().get_attribute(note, "class"), None);
}

#[test]
fn test_dynamic_content_is_reconciled_once() {
    let mut inspector = load(MemoryStore::new());
    inspector.set_feature(Feature::NoAlt, true).unwrap();
    let start = Instant::now();
    inspector.handle_mutations(start);
    while inspector.tick(start + Duration::from_secs(1)) {}
    let baseline = inspector.reconciler().passes();

    let header = inspector.document().query_selector_all("header").unwrap()[0];
    for i in 0..100u64 {
        let doc = inspector.document_mut();
        let img = doc.create_element("img");
        doc.append_child(header, img).unwrap();
        assert!(inspector.handle_mutations(start + Duration::from_secs(2) + Duration::from_micros(i)));
    }
    assert_eq!(count(inspector.document(), NO_ALT_CLASS), 1);

    let later = start + Duration::from_secs(3);
    assert!(inspector.tick(later));
    assert!(!inspector.tick(later));
    assert_eq!(inspector.reconciler().passes(), baseline + 1);
    assert_eq!(count(inspector.document(), NO_ALT_CLASS), 101);
}

#[test]
fn test_style_changes_do_not_schedule() {
    let mut inspector = load(MemoryStore::new());
    let start = Instant::now();
    inspector.handle_mutations(start);
    while inspector.tick(start + Duration::from_secs(1)) {}

    let note = id(inspector.document(), "note");
    inspector.document_mut().set_style(note, "color", "red").unwrap();
    assert!(!inspector.handle_mutations(start + Duration::from_secs(2)));
    assert!(!inspector.reconciler().is_pending());
}
