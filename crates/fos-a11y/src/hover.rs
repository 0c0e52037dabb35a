//! Hover Inspector
//!
//! Screen-reader style tooltip for the element under the pointer. At most
//! one tooltip exists at a time; showing a new one always removes the old.

use std::fmt;

use fos_dom::{DOMRect, EventType, Viewport};

use crate::features::FeatureFlags;
use crate::host::DomHost;
use crate::inspect::{GENERIC_ROLE, accessible_name, accessible_role, state_and_properties};
use crate::{A11yError, A11yResult};

/// Class of the tooltip element
pub const TOOLTIP_CLASS: &str = "a11y-debug-screenreader-info";
/// Class of the "no name" marker inside the tooltip
pub const MISSING_NAME_CLASS: &str = "a11y-debug-missing-name";
/// Text shown in place of an empty name
pub const MISSING_NAME_TEXT: &str = "NO NAME!";

/// Gap between target and tooltip
const GAP: f64 = 5.0;
/// Horizontal margin kept from the viewport edge
const MARGIN: f64 = 10.0;

/// What a screen reader would announce for one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenReaderSummary {
    pub tag: String,
    pub id: Option<String>,
    pub role: String,
    pub name: String,
    pub states: Vec<String>,
}

impl ScreenReaderSummary {
    /// Returns `None` for non-elements
    pub fn compute<H: DomHost>(host: &H, element: H::Node) -> Option<Self> {
        let tag = host.tag_name(element)?.to_string();
        Some(Self {
            tag,
            id: host
                .attribute(element, "id")
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            role: accessible_role(host, element),
            name: accessible_name(host, element),
            states: state_and_properties(host, element),
        })
    }

    /// Role as displayed; an empty explicit role reads as generic
    pub fn display_role(&self) -> &str {
        if self.role.is_empty() {
            GENERIC_ROLE
        } else {
            &self.role
        }
    }

    fn element_line(&self) -> String {
        format!("<{}> (id: {})", self.tag, self.id.as_deref().unwrap_or("none"))
    }

    fn states_text(&self) -> String {
        if self.states.is_empty() {
            " none".to_string()
        } else {
            self.states.iter().map(|s| format!("\n- {s}")).collect()
        }
    }
}

impl fmt::Display for ScreenReaderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Element: {}", self.element_line())?;
        writeln!(f, "Role: {}", self.display_role())?;
        let name = if self.name.is_empty() {
            MISSING_NAME_TEXT
        } else {
            &self.name
        };
        writeln!(f, "Name: {name}")?;
        write!(f, "States/Properties:{}", self.states_text())
    }
}

/// Tooltip position in document coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPosition {
    pub top: f64,
    pub left: f64,
}

/// Place a tooltip of `tooltip` size next to `target`.
///
/// Default is below the target, left edges aligned. Horizontal overflow
/// flips to the left of the target when there is room there, otherwise
/// clamps to the right edge. Vertical overflow flips above the target,
/// clamped to the top of the viewport.
pub fn place_tooltip(target: &DOMRect, tooltip: &DOMRect, viewport: &Viewport) -> TooltipPosition {
    let (sx, sy) = (viewport.scroll_x, viewport.scroll_y);
    let mut top = target.bottom() + sy + GAP;
    let mut left = target.left() + sx;

    let overflows_right = left + tooltip.width + MARGIN > viewport.width + sx;
    if overflows_right && left - tooltip.width - MARGIN > sx {
        left = target.left() + sx - tooltip.width - MARGIN;
    } else if overflows_right {
        left = viewport.width + sx - tooltip.width - MARGIN;
    }
    if left < sx {
        left = sx + MARGIN;
    }

    if top + tooltip.height > viewport.height + sy {
        top = target.top() + sy - tooltip.height - GAP;
        if top < sy {
            top = sy + MARGIN;
        }
    }

    TooltipPosition { top, left }
}

/// Owner of the single live tooltip
#[derive(Debug)]
pub struct HoverInspector<N> {
    tooltip: Option<N>,
    target: Option<N>,
}

impl<N: Copy + Eq + fmt::Debug> HoverInspector<N> {
    pub fn new() -> Self {
        Self {
            tooltip: None,
            target: None,
        }
    }

    /// Live tooltip node, if any
    pub fn tooltip(&self) -> Option<N> {
        self.tooltip
    }

    /// Element the live tooltip describes
    pub fn target(&self) -> Option<N> {
        self.target
    }

    pub fn is_showing(&self) -> bool {
        self.tooltip.is_some()
    }

    /// Listen for pointer enter/leave on `element`
    pub fn attach<H: DomHost<Node = N>>(&self, host: &mut H, element: N) {
        host.add_listener(element, EventType::PointerEnter);
        host.add_listener(element, EventType::PointerLeave);
    }

    pub fn detach<H: DomHost<Node = N>>(&self, host: &mut H, element: N) {
        host.remove_listener(element, EventType::PointerEnter);
        host.remove_listener(element, EventType::PointerLeave);
    }

    /// Pointer entered a listened element. Failures are logged, never
    /// propagated, so one bad element cannot break hovering elsewhere.
    pub fn on_pointer_enter<H: DomHost<Node = N>>(
        &mut self,
        host: &mut H,
        flags: &FeatureFlags,
        element: N,
    ) {
        if !flags.screen_reader_info {
            return;
        }
        if let Err(err) = self.show(host, element) {
            tracing::error!("failed to show screen reader info for {element:?}: {err}");
        }
    }

    pub fn on_pointer_leave<H: DomHost<Node = N>>(&mut self, host: &mut H) {
        if let Err(err) = self.hide(host) {
            tracing::error!("failed to hide screen reader info: {err}");
        }
    }

    /// Replace any live tooltip with one describing `element`
    pub fn show<H: DomHost<Node = N>>(
        &mut self,
        host: &mut H,
        element: N,
    ) -> A11yResult<TooltipPosition> {
        self.hide(host)?;

        let summary = ScreenReaderSummary::compute(host, element)
            .ok_or_else(|| A11yError::NotAnElement(format!("{element:?}")))?;
        let body = host.body().ok_or(A11yError::MissingBody)?;

        let tooltip = build_tooltip(host, &summary)?;
        host.append_child(body, tooltip)?;
        self.tooltip = Some(tooltip);
        self.target = Some(element);

        let position = place_tooltip(
            &host.bounding_client_rect(element),
            &host.bounding_client_rect(tooltip),
            &host.viewport(),
        );
        host.set_style(tooltip, "top", &format!("{}px", position.top))?;
        host.set_style(tooltip, "left", &format!("{}px", position.left))?;

        tracing::debug!(
            "screen reader info for <{}> at ({}, {})",
            summary.tag,
            position.left,
            position.top
        );
        Ok(position)
    }

    /// Remove the live tooltip, if any
    pub fn hide<H: DomHost<Node = N>>(&mut self, host: &mut H) -> A11yResult<()> {
        self.target = None;
        if let Some(tooltip) = self.tooltip.take() {
            host.discard_node(tooltip)?;
        }
        Ok(())
    }
}

impl<N: Copy + Eq + fmt::Debug> Default for HoverInspector<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Detached tooltip subtree; all content goes in as text nodes
fn build_tooltip<H: DomHost>(host: &mut H, summary: &ScreenReaderSummary) -> A11yResult<H::Node> {
    let tooltip = host.create_element("div");
    host.set_class(tooltip, TOOLTIP_CLASS, true)?;

    append_label(host, tooltip, "Element:")?;
    host.append_text(tooltip, &format!(" {}\n", summary.element_line()))?;

    append_label(host, tooltip, "Role:")?;
    host.append_text(tooltip, &format!(" {}\n", summary.display_role()))?;

    append_label(host, tooltip, "Name:")?;
    if summary.name.is_empty() {
        host.append_text(tooltip, " ")?;
        let marker = host.create_element("span");
        host.set_class(marker, MISSING_NAME_CLASS, true)?;
        host.append_text(marker, MISSING_NAME_TEXT)?;
        host.append_child(tooltip, marker)?;
        host.append_text(tooltip, "\n")?;
    } else {
        host.append_text(tooltip, &format!(" {}\n", summary.name))?;
    }

    append_label(host, tooltip, "States/Properties:")?;
    host.append_text(tooltip, &summary.states_text())?;
    Ok(tooltip)
}

fn append_label<H: DomHost>(host: &mut H, parent: H::Node, label: &str) -> A11yResult<()> {
    let strong = host.create_element("strong");
    host.append_text(strong, label)?;
    host.append_child(parent, strong)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::{Document, NodeId};

    fn doc(html: &str) -> Document {
        fos_html::parse(html).unwrap()
    }

    fn tooltips(doc: &Document) -> usize {
        doc.query_selector_all(&format!(".{TOOLTIP_CLASS}")).unwrap().len()
    }

    #[test]
    fn test_summary_text() {
        let d = doc(r#"<button id=b>Submit</button><input type=checkbox aria-invalid=true>"#);
        let b = d.get_element_by_id("b").unwrap();
        let summary = ScreenReaderSummary::compute(&d, b).unwrap();
        assert_eq!(
            summary.to_string(),
            "Element: <button> (id: b)\nRole: button\nName: Submit\nStates/Properties: none"
        );

        let input = d.query_selector_all("input").unwrap()[0];
        let summary = ScreenReaderSummary::compute(&d, input).unwrap();
        assert_eq!(
            summary.to_string(),
            "Element: <input> (id: none)\nRole: checkbox\nName: NO NAME!\nStates/Properties:\n\
             - aria-invalid: true\n- checked: false\n- aria-invalid: true"
        );
    }

    #[test]
    fn test_empty_role_displays_generic() {
        let d = doc(r#"<div id=x role="">x</div>"#);
        let summary = ScreenReaderSummary::compute(&d, d.get_element_by_id("x").unwrap()).unwrap();
        assert_eq!(summary.role, "");
        assert_eq!(summary.display_role(), "generic");
    }

    #[test]
    fn test_place_below_by_default() {
        let viewport = Viewport { width: 800.0, height: 600.0, scroll_x: 0.0, scroll_y: 100.0 };
        let target = DOMRect::from_xywh(50.0, 20.0, 80.0, 30.0);
        let tip = DOMRect::from_xywh(0.0, 0.0, 200.0, 60.0);
        assert_eq!(
            place_tooltip(&target, &tip, &viewport),
            TooltipPosition { top: 155.0, left: 50.0 }
        );
    }

    #[test]
    fn test_place_flips_left_when_room() {
        let viewport = Viewport::new(800.0, 600.0);
        let target = DOMRect::from_xywh(700.0, 20.0, 80.0, 30.0);
        let tip = DOMRect::from_xywh(0.0, 0.0, 200.0, 60.0);
        assert_eq!(place_tooltip(&target, &tip, &viewport).left, 490.0);
    }

    #[test]
    fn test_place_clamps_right_edge() {
        let viewport = Viewport::new(300.0, 600.0);
        let target = DOMRect::from_xywh(150.0, 20.0, 80.0, 30.0);
        let tip = DOMRect::from_xywh(0.0, 0.0, 200.0, 60.0);
        // No room on the left: 150 - 200 - 10 < 0
        assert_eq!(place_tooltip(&target, &tip, &viewport).left, 90.0);
    }

    #[test]
    fn test_place_clamps_to_left_margin() {
        let viewport = Viewport::new(150.0, 600.0);
        let target = DOMRect::from_xywh(20.0, 20.0, 80.0, 30.0);
        let tip = DOMRect::from_xywh(0.0, 0.0, 200.0, 60.0);
        assert_eq!(place_tooltip(&target, &tip, &viewport).left, 10.0);
    }

    #[test]
    fn test_place_flips_above() {
        let viewport = Viewport { width: 800.0, height: 600.0, scroll_x: 0.0, scroll_y: 40.0 };
        let target = DOMRect::from_xywh(10.0, 550.0, 80.0, 30.0);
        let tip = DOMRect::from_xywh(0.0, 0.0, 200.0, 60.0);
        assert_eq!(place_tooltip(&target, &tip, &viewport).top, 525.0);

        // Still above the viewport after flipping
        let tall = DOMRect::from_xywh(0.0, 0.0, 200.0, 590.0);
        assert_eq!(place_tooltip(&target, &tall, &viewport).top, 50.0);
    }

    #[test]
    fn test_single_tooltip() {
        let mut d = doc(r#"<button id=a>A</button><button id=b></button>"#);
        let (a, b) = (d.get_element_by_id("a").unwrap(), d.get_element_by_id("b").unwrap());
        let mut hover = HoverInspector::new();

        hover.show(&mut d, a).unwrap();
        hover.show(&mut d, b).unwrap();
        assert_eq!(tooltips(&d), 1);
        assert_eq!(hover.target(), Some(b));

        let tip = hover.tooltip().unwrap();
        let marker = d.query_selector_all(".a11y-debug-missing-name").unwrap();
        assert_eq!(marker.len(), 1);
        assert_eq!(d.text_content(marker[0]), "NO NAME!");
        assert!(d.style(tip, "top").is_some_and(|top| top.ends_with("px")));

        hover.hide(&mut d).unwrap();
        assert_eq!(tooltips(&d), 0);
        assert!(!hover.is_showing());
    }

    #[test]
    fn test_repeated_hover_reuses_arena_slots() {
        let mut d = doc(r#"<button id=a>A</button><button id=b></button>"#);
        let (a, b) = (d.get_element_by_id("a").unwrap(), d.get_element_by_id("b").unwrap());
        let flags = FeatureFlags { screen_reader_info: true, ..Default::default() };
        let mut hover = HoverInspector::new();

        hover.on_pointer_enter(&mut d, &flags, b);
        hover.on_pointer_leave(&mut d);
        let settled = d.tree().len();
        for _ in 0..500 {
            hover.on_pointer_enter(&mut d, &flags, a);
            hover.on_pointer_enter(&mut d, &flags, b);
            hover.on_pointer_leave(&mut d);
        }
        assert_eq!(d.tree().len(), settled);
        assert_eq!(tooltips(&d), 0);
        assert!(d.get_element_by_id("a").is_some_and(|n| n == a));
    }

    #[test]
    fn test_tooltip_position_uses_layout() {
        let mut d = doc(r#"<button id=a>A</button>"#);
        let a = d.get_element_by_id("a").unwrap();
        d.set_rect(a, DOMRect::from_xywh(40.0, 100.0, 60.0, 20.0));
        d.scroll_to(0.0, 200.0);
        let mut hover = HoverInspector::new();

        let position = hover.show(&mut d, a).unwrap();
        assert_eq!(position, TooltipPosition { top: 325.0, left: 40.0 });
        let tip = hover.tooltip().unwrap();
        assert_eq!(d.style(tip, "top"), Some("325px"));
        assert_eq!(d.style(tip, "left"), Some("40px"));
    }

    #[test]
    fn test_disabled_flag_ignores_enter() {
        let mut d = doc(r#"<button id=a>A</button>"#);
        let a = d.get_element_by_id("a").unwrap();
        let mut hover = HoverInspector::new();
        hover.on_pointer_enter(&mut d, &FeatureFlags::default(), a);
        assert!(!hover.is_showing());
    }

    #[test]
    fn test_enter_on_text_node_is_logged_not_raised() {
        let mut d = doc(r#"<p>text</p>"#);
        let p = d.query_selector_all("p").unwrap()[0];
        let text: NodeId = d.tree().get(p).unwrap().first_child;
        let flags = FeatureFlags { screen_reader_info: true, ..Default::default() };
        let mut hover = HoverInspector::new();
        hover.on_pointer_enter(&mut d, &flags, text);
        assert!(!hover.is_showing());
        assert_eq!(tooltips(&d), 0);
    }
}
