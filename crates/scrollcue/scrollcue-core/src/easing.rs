//! Easing curves mapping linear progress in [0,1] to eased progress.
//!
//! - ease-out power family: `1 - (1-t)^k` for k = 3, 4
//! - exponential ease-out: `1 - 2^(-10t)`, snapped to 1 at t = 1
//! - CSS cubic-bezier timing functions (x inverted by bisection)

use std::fmt;

use serde::{Deserialize, Serialize};

/// A strategy reshaping progress. Implemented by [`Easing`] and plain
/// functions; counters accept any implementation through
/// [`CounterAnimator::register_with_curve`](crate::CounterAnimator::register_with_curve).
/// Curves should map 0 to 0, 1 to 1 and be non-decreasing.
pub trait EasingCurve: fmt::Debug {
    fn ease(&self, t: f64) -> f64;
}

impl EasingCurve for fn(f64) -> f64 {
    #[inline]
    fn ease(&self, t: f64) -> f64 {
        (self)(t.clamp(0.0, 1.0))
    }
}

/// Built-in easing curves.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Easing {
    Linear,
    EaseOutCubic,
    #[default]
    EaseOutQuart,
    EaseOutExpo,
    EaseInOutCubic,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Easing {
    /// Parse the short names used in `data-easing` attributes.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "cubic" | "ease-out-cubic" => Some(Self::EaseOutCubic),
            "quart" | "ease-out-quart" => Some(Self::EaseOutQuart),
            "expo" | "ease-out-expo" => Some(Self::EaseOutExpo),
            "ease-in-out" | "ease-in-out-cubic" => Some(Self::EaseInOutCubic),
            _ => None,
        }
    }

    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::EaseOutCubic => ease_out_pow(t, 3),
            Self::EaseOutQuart => ease_out_pow(t, 4),
            Self::EaseOutExpo => ease_out_expo(t),
            Self::EaseInOutCubic => ease_in_out_cubic(t),
            Self::CubicBezier { x1, y1, x2, y2 } => bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

impl EasingCurve for Easing {
    #[inline]
    fn ease(&self, t: f64) -> f64 {
        self.apply(t)
    }
}

/// `1 - (1-t)^k`
#[inline]
pub fn ease_out_pow(t: f64, k: i32) -> f64 {
    1.0 - (1.0 - t).powi(k)
}

/// `1 - 2^(-10t)`; the raw curve stops at 0.999 so t >= 1 snaps to 1.
#[inline]
pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Eased y for input x = t, inverting the x curve via binary search.
fn bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let (x1, x2) = (x1.clamp(0.0, 1.0), x2.clamp(0.0, 1.0));
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..40 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
