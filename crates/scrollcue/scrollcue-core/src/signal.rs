//! Page-level scroll and pointer signals.
//!
//! Owned by the page and passed by reference to the components that read
//! them; there is no module-level scroll state.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    Idle,
    Down,
    Up,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollSignal {
    pub y: f64,
    pub last_y: f64,
    pub direction: ScrollDirection,
    /// True while `y` is past the scroll-state threshold.
    pub scrolled: bool,
    threshold_px: f64,
}

impl ScrollSignal {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            ..Self::default()
        }
    }

    /// Record a new offset. Returns `Some(scrolled)` when the flag flipped.
    pub fn update(&mut self, y: f64) -> Option<bool> {
        if !y.is_finite() {
            log::warn!("ignoring non-finite scroll offset");
            return None;
        }
        self.last_y = self.y;
        self.y = y;
        self.direction = if y > self.last_y {
            ScrollDirection::Down
        } else if y < self.last_y {
            ScrollDirection::Up
        } else {
            ScrollDirection::Idle
        };
        let scrolled = y > self.threshold_px;
        if scrolled != self.scrolled {
            self.scrolled = scrolled;
            Some(scrolled)
        } else {
            None
        }
    }

    pub fn delta(&self) -> f64 {
        self.y - self.last_y
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerSignal {
    /// Client coordinates; `None` once the pointer left the window.
    pub position: Option<(f64, f64)>,
}

impl PointerSignal {
    pub fn update(&mut self, x: f64, y: f64) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let changed = self.position != Some((x, y));
        self.position = Some((x, y));
        changed
    }

    pub fn leave(&mut self) -> bool {
        self.position.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolled_flag_flips_at_threshold() {
        let mut s = ScrollSignal::new(50.0);
        assert_eq!(s.update(20.0), None);
        assert_eq!(s.update(60.0), Some(true));
        assert_eq!(s.direction, ScrollDirection::Down);
        assert_eq!(s.update(80.0), None);
        assert_eq!(s.update(10.0), Some(false));
        assert_eq!(s.direction, ScrollDirection::Up);
        assert_eq!(s.delta(), -70.0);
    }

    #[test]
    fn pointer_changes() {
        let mut p = PointerSignal::default();
        assert!(p.update(1.0, 2.0));
        assert!(!p.update(1.0, 2.0));
        assert!(p.leave());
        assert!(!p.leave());
        assert!(!p.update(f64::NAN, 0.0));
    }
}
