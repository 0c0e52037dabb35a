//! Geometry APIs
//!
//! DOMRect, viewport/scroll state, and an intrinsic size estimate for
//! nodes the host never laid out.

/// DOMRect - rectangle geometry in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Check if point is inside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Window viewport: visible size plus the document scroll offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Scroll to position (no upper clamp, the document size is unknown)
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x.max(0.0);
        self.scroll_y = y.max(0.0);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Monospace text metrics used for the intrinsic estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
    pub max_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        // 12px monospace, 8px padding, 300px max box
        Self {
            char_width: 7.2,
            line_height: 16.0,
            padding: 8.0,
            max_width: 300.0,
        }
    }
}

impl TextMetrics {
    /// Estimated border-box size of pre-wrapped text
    pub fn measure(&self, text: &str) -> (f64, f64) {
        let inner_max = (self.max_width - 2.0 * self.padding).max(self.char_width);
        let per_line = (inner_max / self.char_width).floor().max(1.0) as usize;

        let mut widest = 0usize;
        let mut lines = 0usize;
        for line in text.split('\n') {
            let chars = line.chars().count();
            widest = widest.max(chars.min(per_line));
            lines += chars.div_ceil(per_line).max(1);
        }

        let width = widest as f64 * self.char_width + 2.0 * self.padding;
        let height = lines as f64 * self.line_height + 2.0 * self.padding;
        (width.min(self.max_width), height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_rect() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
    }

    #[test]
    fn test_contains_point() {
        let rect = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);

        assert!(rect.contains_point(50.0, 50.0));
        assert!(!rect.contains_point(150.0, 50.0));
    }

    #[test]
    fn test_measure_wraps_long_lines() {
        let metrics = TextMetrics::default();
        let (w, h) = metrics.measure("ab\ncd");
        assert_eq!(w, 2.0 * 7.2 + 16.0);
        assert_eq!(h, 2.0 * 16.0 + 16.0);

        let long = "x".repeat(100);
        let (w, h) = metrics.measure(&long);
        assert!(w <= 300.0);
        assert!(h > 2.0 * 16.0);
    }
}
