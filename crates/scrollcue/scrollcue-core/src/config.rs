//! Page-level configuration and environment signals.
//!
//! Every section has defaults matching the conventions the landing pages
//! share (100 ms stagger, 2 s counters, 50 px swipe threshold, ...), so a
//! host can deserialize a partial JSON object.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::ids::TargetHandle;

/// Configuration for a page orchestrator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reveal: RevealDefaults,
    pub counter: CounterDefaults,
    pub parallax: ParallaxDefaults,
    pub carousel: CarouselDefaults,
    pub scroll_state: ScrollStateConfig,
    pub environment: Environment,
}

/// User/device preferences the host reads from media queries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// `prefers-reduced-motion: reduce`
    pub reduced_motion: bool,
    /// `pointer: coarse` (touch-first device)
    pub coarse_pointer: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealDefaults {
    /// Class toggled on when a reveal fires.
    pub class: String,
    /// Per-sibling delay added inside a reveal group.
    pub stagger_increment_ms: f64,
}

impl Default for RevealDefaults {
    fn default() -> Self {
        Self {
            class: "visible".to_string(),
            stagger_increment_ms: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterDefaults {
    /// Visible fraction that starts a counter.
    pub threshold: f64,
    pub root_margin_px: f64,
    /// Used when a dataset omits `data-duration`.
    pub duration_ms: f64,
    /// Used when a dataset omits `data-easing`.
    pub easing: Easing,
}

impl Default for CounterDefaults {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            root_margin_px: 0.0,
            duration_ms: 2000.0,
            easing: Easing::EaseOutQuart,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxDefaults {
    /// Minimum spacing between two applied recomputes.
    pub min_interval_ms: f64,
    /// Bindings farther than this outside the viewport are not transformed.
    pub active_margin_px: f64,
}

impl Default for ParallaxDefaults {
    fn default() -> Self {
        Self {
            min_interval_ms: 16.0,
            active_margin_px: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselDefaults {
    pub interval_ms: f64,
    pub swipe_threshold_px: f64,
    pub active_class: String,
}

impl Default for CarouselDefaults {
    fn default() -> Self {
        Self {
            interval_ms: 5000.0,
            swipe_threshold_px: 50.0,
            active_class: "active".to_string(),
        }
    }
}

/// Page-level "scrolled" flag (drives sticky navigation styling).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollStateConfig {
    pub threshold_px: f64,
    /// Element that receives `class` while scrolled past the threshold.
    pub target: Option<TargetHandle>,
    pub class: String,
}

impl Default for ScrollStateConfig {
    fn default() -> Self {
        Self {
            threshold_px: 50.0,
            target: None,
            class: "scrolled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{ "environment": { "reduced_motion": true }, "carousel": { "interval_ms": 3000 } }"#,
        )
        .unwrap();
        assert!(cfg.environment.reduced_motion);
        assert!(!cfg.environment.coarse_pointer);
        assert_eq!(cfg.carousel.interval_ms, 3000.0);
        assert_eq!(cfg.carousel.swipe_threshold_px, 50.0);
        assert_eq!(cfg.reveal.class, "visible");
        assert_eq!(cfg.counter.easing, Easing::EaseOutQuart);
    }
}
