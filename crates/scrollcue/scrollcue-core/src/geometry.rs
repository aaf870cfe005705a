//! Document-space geometry used for visibility and parallax windows.

use serde::{Deserialize, Serialize};

/// Element box in document coordinates (scroll offset already applied).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// The visible window of the page.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// Viewport as a document-space rect grown by `margin` on every side.
    pub fn window(&self, margin: f64) -> Rect {
        Rect {
            x: self.scroll_x - margin,
            y: self.scroll_y - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    /// Convert document coordinates to client (viewport) coordinates.
    #[inline]
    pub fn to_client(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.scroll_x, y - self.scroll_y)
    }
}

#[inline]
fn overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

/// Fraction of `rect` inside the viewport expanded by `root_margin` px.
/// Zero-area targets report 1.0 when inside the window and 0.0 otherwise.
pub fn visible_fraction(rect: &Rect, viewport: &Viewport, root_margin: f64) -> f64 {
    let win = viewport.window(root_margin);
    let area = rect.width.max(0.0) * rect.height.max(0.0);
    if area <= 0.0 {
        return if win.contains(rect.x, rect.y) { 1.0 } else { 0.0 };
    }
    let w = overlap(rect.x, rect.right(), win.x, win.right());
    let h = overlap(rect.y, rect.bottom(), win.y, win.bottom());
    ((w * h) / area).clamp(0.0, 1.0)
}

/// True when any part of `rect` lies within the viewport grown by `margin`.
pub fn intersects(rect: &Rect, viewport: &Viewport, margin: f64) -> bool {
    let win = viewport.window(margin);
    rect.x <= win.right()
        && rect.right() >= win.x
        && rect.y <= win.bottom()
        && rect.bottom() >= win.y
}
