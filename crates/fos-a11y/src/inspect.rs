//! Attribute Inspector
//!
//! Heuristic accessible name, role and state computation. These are pure
//! reads of the host document; nothing is cached, every call recomputes
//! from the live attributes.

use crate::host::DomHost;

/// Role used when no explicit or implied role applies
pub const GENERIC_ROLE: &str = "generic";

/// Implied roles for tags whose role does not depend on attributes
const IMPLIED_ROLES: &[(&str, &str)] = &[
    ("button", "button"),
    ("select", "combobox"),
    ("textarea", "textbox"),
    ("img", "img"),
    ("ul", "list"),
    ("ol", "list"),
    ("li", "listitem"),
    ("nav", "navigation"),
    ("main", "main"),
    ("header", "banner"),
    ("footer", "contentinfo"),
    ("form", "form"),
    ("section", "region"),
    ("aside", "complementary"),
    ("dialog", "dialog"),
    ("details", "group"),
    ("summary", "button"),
    ("table", "table"),
    ("th", "columnheader"),
    ("td", "cell"),
];

/// Input types announced as text fields
const TEXTBOX_INPUT_TYPES: &[&str] = &["text", "email", "password", "search", "tel", "url", "number"];

/// Input types that act as buttons and take their name from `value`
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "reset", "button"];

/// Literal ARIA states repeated after the computed ones
const PASSTHROUGH_STATES: &[&str] = &[
    "aria-expanded",
    "aria-pressed",
    "aria-current",
    "aria-selected",
    "aria-checked",
    "aria-invalid",
    "aria-disabled",
];

fn trimmed(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Accessible name, or an empty string when none is found.
///
/// Sources in precedence order: `aria-labelledby`, `aria-label`, a
/// `<label for>` (form fields), `alt` (images), `value` (button-like
/// inputs), text content (buttons, links, summaries), `title`.
pub fn accessible_name<H: DomHost>(host: &H, element: H::Node) -> String {
    let Some(tag) = host.tag_name(element) else {
        return String::new();
    };

    name_from_labelledby(host, element)
        .or_else(|| trimmed(host.attribute(element, "aria-label")))
        .or_else(|| name_from_label_for(host, element, tag))
        .or_else(|| match tag {
            "img" => trimmed(host.attribute(element, "alt")),
            "input" if BUTTON_INPUT_TYPES.contains(&host.input_type(element).as_str()) => {
                trimmed(host.attribute(element, "value"))
            }
            "button" | "a" | "summary" => trimmed(Some(host.text_content(element).as_str())),
            _ => None,
        })
        .or_else(|| trimmed(host.attribute(element, "title")))
        .unwrap_or_default()
}

fn name_from_labelledby<H: DomHost>(host: &H, element: H::Node) -> Option<String> {
    let ids = host.attribute(element, "aria-labelledby")?;
    let parts: Vec<String> = ids
        .split_whitespace()
        .filter_map(|id| host.element_by_id(id))
        .filter_map(|label| trimmed(Some(host.text_content(label).as_str())))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// The first `label[for=id]` in the document names a form field
fn name_from_label_for<H: DomHost>(host: &H, element: H::Node, tag: &str) -> Option<String> {
    if !matches!(tag, "input" | "textarea" | "select") {
        return None;
    }
    let id = host.attribute(element, "id").filter(|id| !id.is_empty())?;
    let labels = host.query_selector_all("label[for]").ok()?;
    let label = labels
        .into_iter()
        .find(|&label| host.attribute(label, "for") == Some(id))?;
    trimmed(Some(host.text_content(label).as_str()))
}

/// Explicit `role` verbatim, else the role implied by the tag
pub fn accessible_role<H: DomHost>(host: &H, element: H::Node) -> String {
    let Some(tag) = host.tag_name(element) else {
        return GENERIC_ROLE.to_string();
    };
    if let Some(role) = host.attribute(element, "role") {
        return role.to_string();
    }
    implied_role(host, element, tag).to_string()
}

fn implied_role<H: DomHost>(host: &H, element: H::Node, tag: &str) -> &'static str {
    match tag {
        "a" if host.has_attribute(element, "href") => "link",
        "input" => {
            let input_type = host.input_type(element);
            match input_type.as_str() {
                "checkbox" => "checkbox",
                "radio" => "radio",
                t if TEXTBOX_INPUT_TYPES.contains(&t) => "textbox",
                t if BUTTON_INPUT_TYPES.contains(&t) => "button",
                _ => GENERIC_ROLE,
            }
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        _ => IMPLIED_ROLES
            .iter()
            .find(|(t, _)| *t == tag)
            .map_or(GENERIC_ROLE, |(_, role)| *role),
    }
}

/// `name: value` lines: every `aria-*` attribute in declaration order,
/// then the computed states, then the literal ARIA states again.
pub fn state_and_properties<H: DomHost>(host: &H, element: H::Node) -> Vec<String> {
    let Some(tag) = host.tag_name(element) else {
        return Vec::new();
    };

    let mut states: Vec<String> = host
        .attributes(element)
        .into_iter()
        .filter(|(name, _)| name.starts_with("aria-"))
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();

    if host.is_hidden(element) {
        states.push("hidden: true".to_string());
    }
    if host.has_attribute(element, "disabled") {
        states.push("disabled: true".to_string());
    }
    if host.has_attribute(element, "required") {
        states.push("required: true".to_string());
    }
    match tag {
        "input" if matches!(host.input_type(element).as_str(), "checkbox" | "radio") => {
            states.push(format!("checked: {}", host.is_checked(element)));
        }
        "option" => states.push(format!("selected: {}", host.is_selected(element))),
        "details" => states.push(format!("expanded: {}", host.is_open(element))),
        _ => {}
    }

    for name in PASSTHROUGH_STATES {
        if let Some(value) = host.attribute(element, name) {
            states.push(format!("{name}: {value}"));
        }
    }
    states
}
