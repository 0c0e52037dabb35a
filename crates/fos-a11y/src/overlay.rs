//! Overlay Annotator
//!
//! Toggles marker classes on matching elements. Anything inside an
//! `aria-hidden="true"` subtree is always stripped of its marker, whatever
//! the flag says; the check is repeated on every pass.

use crate::features::{Feature, FeatureFlags};
use crate::host::DomHost;
use crate::hover::HoverInspector;
use crate::inspect::accessible_name;
use crate::{
    A11yResult, FOCUSABLE_CLASS, HIGHLIGHT_CLASSES, HIGH_CONTRAST_CLASS, NO_ALT_CLASS,
    NO_NAME_CLASS,
};

/// Keyboard-reachable and interactive elements
pub const FOCUSABLE_SELECTOR: &str = concat!(
    r#"a[href], button, input:not([type="hidden"]), select, textarea, "#,
    r#"[tabindex]:not([tabindex="-1"]), "#,
    r#"[role="button"], [role="link"], [role="checkbox"], [role="radio"], "#,
    r#"[role="textbox"], [role="combobox"], [role="slider"], [role="spinbutton"], "#,
    r#"[role="tab"], [role="menuitem"], [role="option"], [role="switch"], [contenteditable="true"]"#,
);

/// Images without usable alternative text
pub const MISSING_ALT_SELECTOR: &str = r#"img:not([alt]), img[alt=""]"#;

/// Elements expected to carry an accessible name
pub const NAME_CANDIDATE_SELECTOR: &str = concat!(
    r#"a[href], button, input:not([type="hidden"]), select, textarea, "#,
    r#"[role="button"], [role="link"], [role="checkbox"], [role="radio"], [role="textbox"], "#,
    r#"[role="combobox"], [role="slider"], [role="tab"], [role="menuitem"], [role="option"], "#,
    r#"[role="heading"], [role="img"], [role="form"], [role="group"], [role="region"], "#,
    r#"[tabindex]:not([tabindex="-1"])"#,
);

const ARIA_HIDDEN_SELECTOR: &str = r#"[aria-hidden="true"]"#;

const NAMED_CONTAINER_SELECTOR: &str = "[aria-labelledby], [aria-label]";

/// Tags whose own name is checked even inside a named container
const DIRECT_NAME_TAGS: &[&str] = &["button", "a", "input", "select", "textarea", "img"];

fn under_aria_hidden<H: DomHost>(host: &H, element: H::Node) -> A11yResult<bool> {
    Ok(host.closest(element, ARIA_HIDDEN_SELECTOR)?.is_some())
}

/// Mark focusable elements and wire hover listeners.
///
/// Listeners are attached only while both this feature and the
/// screen-reader info are on. Elements under `aria-hidden` keep whatever
/// listeners they had. Turning the feature off removes the tooltip.
pub fn set_focusable_highlight<H: DomHost>(
    host: &mut H,
    hover: &mut HoverInspector<H::Node>,
    flags: &FeatureFlags,
    enabled: bool,
) -> A11yResult<()> {
    for element in host.query_selector_all(FOCUSABLE_SELECTOR)? {
        if under_aria_hidden(host, element)? {
            host.set_class(element, FOCUSABLE_CLASS, false)?;
            continue;
        }
        host.set_class(element, FOCUSABLE_CLASS, enabled)?;
        if enabled && flags.screen_reader_info {
            hover.attach(host, element);
        } else {
            hover.detach(host, element);
        }
    }
    if !enabled {
        hover.hide(host)?;
    }
    Ok(())
}

/// Mark images with no `alt` or an empty one
pub fn set_missing_alt_highlight<H: DomHost>(host: &mut H, enabled: bool) -> A11yResult<()> {
    for element in host.query_selector_all(MISSING_ALT_SELECTOR)? {
        let hidden = under_aria_hidden(host, element)?;
        host.set_class(element, NO_ALT_CLASS, enabled && !hidden)?;
    }
    Ok(())
}

/// Mark name candidates that end up with no accessible name.
///
/// Exempt: decorative images (`alt=""`), anything with a computed name,
/// and non-direct elements inside (or being) an `aria-label` /
/// `aria-labelledby` container. The container exemption does not check
/// that the container's name applies to the descendant.
pub fn set_missing_name_highlight<H: DomHost>(host: &mut H, enabled: bool) -> A11yResult<()> {
    for element in host.query_selector_all(NAME_CANDIDATE_SELECTOR)? {
        let exempt = under_aria_hidden(host, element)? || is_named_or_exempt(host, element)?;
        host.set_class(element, NO_NAME_CLASS, enabled && !exempt)?;
    }
    Ok(())
}

fn is_named_or_exempt<H: DomHost>(host: &H, element: H::Node) -> A11yResult<bool> {
    let tag = host.tag_name(element).unwrap_or_default();
    if tag == "img" && host.attribute(element, "alt") == Some("") {
        return Ok(true);
    }
    if !accessible_name(host, element).is_empty() {
        return Ok(true);
    }
    Ok(!DIRECT_NAME_TAGS.contains(&tag)
        && host.closest(element, NAMED_CONTAINER_SELECTOR)?.is_some())
}

/// Toggle high-contrast mode on the document element
pub fn set_high_contrast<H: DomHost>(host: &mut H, enabled: bool) -> A11yResult<()> {
    match host.document_element() {
        Some(root) => host.set_class(root, HIGH_CONTRAST_CLASS, enabled)?,
        None => tracing::warn!("no document element, high contrast mode unavailable"),
    }
    Ok(())
}

/// Apply the screen-reader info flag: drop the tooltip when it is off,
/// then re-run the focusable pass so listeners follow the flag
pub fn apply_screen_reader_info<H: DomHost>(
    host: &mut H,
    hover: &mut HoverInspector<H::Node>,
    flags: &FeatureFlags,
) -> A11yResult<()> {
    if !flags.screen_reader_info {
        hover.hide(host)?;
    }
    set_focusable_highlight(host, hover, flags, flags.focusable)
}

/// Full pass: every feature in `Feature::ALL` order
pub fn apply_features<H: DomHost>(
    host: &mut H,
    hover: &mut HoverInspector<H::Node>,
    flags: &FeatureFlags,
) -> A11yResult<()> {
    for (feature, enabled) in flags.iter() {
        match feature {
            Feature::Focusable => set_focusable_highlight(host, hover, flags, enabled)?,
            Feature::NoAlt => set_missing_alt_highlight(host, enabled)?,
            Feature::NoAccessibleName => set_missing_name_highlight(host, enabled)?,
            Feature::HighContrast => set_high_contrast(host, enabled)?,
            Feature::ScreenReaderInfo => apply_screen_reader_info(host, hover, flags)?,
        }
    }
    Ok(())
}

/// Click on a highlighted element: strip its three highlight markers and
/// hide the tooltip. Returns whether anything was dismissed.
pub fn dismiss_markers<H: DomHost>(
    host: &mut H,
    hover: &mut HoverInspector<H::Node>,
    target: H::Node,
) -> A11yResult<bool> {
    if !HIGHLIGHT_CLASSES.iter().any(|class| host.has_class(target, class)) {
        return Ok(false);
    }
    for class in HIGHLIGHT_CLASSES {
        host.set_class(target, class, false)?;
    }
    hover.hide(host)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::{Document, EventType, NodeId};

    fn doc(html: &str) -> Document {
        fos_html::parse(html).unwrap()
    }

    fn by_id(doc: &Document, id: &str) -> NodeId {
        doc.get_element_by_id(id).unwrap()
    }

    fn marked(doc: &Document, class: &str) -> Vec<String> {
        doc.query_selector_all(&format!(".{class}"))
            .unwrap()
            .into_iter()
            .map(|n| doc.get_attribute(n, "id").unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_focusable_selection() {
        let mut d = doc(r#"<a id=l href=/>x</a><a id=n>x</a><input id=h type=hidden><input id=t>
                          <div id=z tabindex=0></div><div id=m tabindex=-1></div>
                          <span id=r role=switch></span><p id=e contenteditable=true></p>
                          <p id=f contenteditable=false></p>"#);
        let mut hover = HoverInspector::new();
        set_focusable_highlight(&mut d, &mut hover, &FeatureFlags::default(), true).unwrap();
        assert_eq!(marked(&d, FOCUSABLE_CLASS), ["l", "t", "z", "r", "e"]);

        set_focusable_highlight(&mut d, &mut hover, &FeatureFlags::default(), false).unwrap();
        assert!(marked(&d, FOCUSABLE_CLASS).is_empty());
    }

    #[test]
    fn test_listeners_follow_screen_reader_flag() {
        let mut d = doc(r#"<button id=b>Go</button>"#);
        let b = by_id(&d, "b");
        let mut hover = HoverInspector::new();
        let mut flags = FeatureFlags { screen_reader_info: true, ..Default::default() };

        set_focusable_highlight(&mut d, &mut hover, &flags, true).unwrap();
        assert!(d.has_event_listener(b, EventType::PointerEnter));
        assert!(d.has_event_listener(b, EventType::PointerLeave));

        flags.screen_reader_info = false;
        set_focusable_highlight(&mut d, &mut hover, &flags, true).unwrap();
        assert!(!d.has_event_listener(b, EventType::PointerEnter));
    }

    #[test]
    fn test_aria_hidden_suppresses_markers() {
        let mut d = doc(r#"<div aria-hidden=true><button id=b class="a11y-debug-focusable"></button>
                          <img id=i></div><div aria-hidden=false><img id=j></div>"#);
        let mut hover = HoverInspector::new();
        set_focusable_highlight(&mut d, &mut hover, &FeatureFlags::default(), true).unwrap();
        set_missing_alt_highlight(&mut d, true).unwrap();
        set_missing_name_highlight(&mut d, true).unwrap();
        assert!(marked(&d, FOCUSABLE_CLASS).is_empty());
        assert_eq!(marked(&d, NO_ALT_CLASS), ["j"]);
        assert!(marked(&d, NO_NAME_CLASS).is_empty());
    }

    #[test]
    fn test_missing_alt() {
        let mut d = doc(r#"<img id=a><img id=b alt=""><img id=c alt="Logo"><img id=d alt=" ">"#);
        set_missing_alt_highlight(&mut d, true).unwrap();
        assert_eq!(marked(&d, NO_ALT_CLASS), ["a", "b"]);
        set_missing_alt_highlight(&mut d, false).unwrap();
        assert!(marked(&d, NO_ALT_CLASS).is_empty());
    }

    #[test]
    fn test_missing_name_rules() {
        let mut d = doc(r#"<button id=b1></button><button id=b2>Go</button>
                          <img id=deco alt="" role=img><div role=img id=pic></div>
                          <nav aria-label="Main"><div id=inner role=button></div><button id=direct></button></nav>
                          <div id=self role=region aria-labelledby=missing></div>
                          <h2 id=h role=heading></h2>"#);
        set_missing_name_highlight(&mut d, true).unwrap();
        assert_eq!(marked(&d, NO_NAME_CLASS), ["b1", "pic", "direct", "h"]);
    }

    #[test]
    fn test_high_contrast() {
        let mut d = doc("<p>x</p>");
        let root = d.document_element().unwrap();
        set_high_contrast(&mut d, true).unwrap();
        assert!(d.has_class(root, HIGH_CONTRAST_CLASS));
        set_high_contrast(&mut d, false).unwrap();
        assert!(!d.has_class(root, HIGH_CONTRAST_CLASS));
    }

    #[test]
    fn test_high_contrast_without_root_is_noop() {
        let mut d = Document::empty("about:blank");
        assert!(set_high_contrast(&mut d, true).is_ok());
    }

    #[test]
    fn test_dismiss_markers() {
        let mut d = doc(r#"<button id=b></button><p id=p class=plain></p>"#);
        let mut hover = HoverInspector::new();
        let flags = FeatureFlags {
            focusable: true,
            no_accessible_name: true,
            ..Default::default()
        };
        apply_features(&mut d, &mut hover, &flags).unwrap();
        let b = by_id(&d, "b");
        assert!(d.has_class(b, FOCUSABLE_CLASS) && d.has_class(b, NO_NAME_CLASS));

        assert!(dismiss_markers(&mut d, &mut hover, b).unwrap());
        assert_eq!(d.get_attribute(b, "class"), Some(""));
        let p = by_id(&d, "p");
        assert!(!dismiss_markers(&mut d, &mut hover, p).unwrap());
        assert_eq!(d.get_attribute(p, "class"), Some("plain"));
    }

    #[test]
    fn test_apply_features_converges() {
        let mut d = doc(r#"<img src=a.png><button></button><input type=checkbox>"#);
        let body = d.body().unwrap();
        d.observe(body, crate::reconcile::observer_options());
        let mut hover = HoverInspector::new();
        let flags = FeatureFlags {
            focusable: true,
            no_alt: true,
            no_accessible_name: true,
            high_contrast: true,
            screen_reader_info: true,
        };
        apply_features(&mut d, &mut hover, &flags).unwrap();
        assert!(d.has_pending_records());
        d.take_records();

        apply_features(&mut d, &mut hover, &flags).unwrap();
        assert!(!d.has_pending_records());
    }
}
