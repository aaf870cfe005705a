//! Scroll- and pointer-driven transform bindings.
//!
//! `map_transform` is a pure function of the sampled signals; the mapper
//! owns throttling (one recompute per frame, spaced by a minimum interval)
//! and skips bindings that are outside the active window.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::config::{Environment, ParallaxDefaults};
use crate::document::Document;
use crate::error::{ensure_finite, ensure_target, ScrollcueError};
use crate::geometry::{intersects, Rect, Viewport};
use crate::ids::TargetHandle;
use crate::outputs::Outputs;
use crate::Result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    ScrollY,
    /// Pointer offset from the viewport centre (or element centre for tilt).
    PointerOffset,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformTemplate {
    TranslateY,
    Translate {
        #[serde(default)]
        rotate_factor: f64,
    },
    Tilt {
        divisor: f64,
        max_degrees: f64,
        #[serde(default = "default_perspective")]
        perspective_px: f64,
    },
}

fn default_perspective() -> f64 {
    1000.0
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallaxBinding {
    pub speed: f64,
    pub source: SignalSource,
    pub template: TransformTemplate,
}

impl ParallaxBinding {
    pub fn scroll(speed: f64) -> Self {
        Self {
            speed,
            source: SignalSource::ScrollY,
            template: TransformTemplate::TranslateY,
        }
    }

    pub fn tilt(divisor: f64, max_degrees: f64) -> Self {
        Self {
            speed: 1.0,
            source: SignalSource::PointerOffset,
            template: TransformTemplate::Tilt {
                divisor,
                max_degrees,
                perspective_px: default_perspective(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("speed", self.speed)?;
        match self.template {
            TransformTemplate::TranslateY => {}
            TransformTemplate::Translate { rotate_factor } => {
                ensure_finite("rotate_factor", rotate_factor)?;
            }
            TransformTemplate::Tilt {
                divisor,
                max_degrees,
                perspective_px,
            } => {
                if self.source != SignalSource::PointerOffset {
                    return Err(ScrollcueError::InvalidBinding {
                        reason: "tilt reads the pointer offset".into(),
                    });
                }
                if !(divisor.is_finite() && divisor > 0.0) {
                    return Err(ScrollcueError::InvalidNumber {
                        field: "divisor".into(),
                        value: divisor,
                    });
                }
                if !(max_degrees.is_finite() && max_degrees >= 0.0) {
                    return Err(ScrollcueError::InvalidNumber {
                        field: "max_degrees".into(),
                        value: max_degrees,
                    });
                }
                ensure_finite("perspective_px", perspective_px)?;
            }
        }
        Ok(())
    }
}

/// Signals sampled for one recompute.
#[derive(Copy, Clone, Debug)]
pub struct SignalFrame<'a> {
    pub scroll_y: f64,
    /// Client coordinates.
    pub pointer: Option<(f64, f64)>,
    pub viewport: &'a Viewport,
}

/// Two decimals, without `-0`.
fn num(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    let r = if r == 0.0 { 0.0 } else { r };
    format!("{r}")
}

/// Compute the transform for a binding. `None` means "leave as is"
/// (pointer-sourced bindings before any pointer sample).
pub fn map_transform(
    binding: &ParallaxBinding,
    rect: Option<&Rect>,
    frame: &SignalFrame<'_>,
) -> Option<String> {
    let speed = binding.speed;
    match binding.template {
        TransformTemplate::Tilt {
            divisor,
            max_degrees,
            perspective_px,
        } => {
            let neutral = format!(
                "perspective({}px) rotateX(0deg) rotateY(0deg)",
                num(perspective_px)
            );
            let (Some((px, py)), Some(rect)) = (frame.pointer, rect) else {
                return Some(neutral);
            };
            let (doc_x, doc_y) = (px + frame.viewport.scroll_x, py + frame.viewport.scroll_y);
            if !rect.contains(doc_x, doc_y) {
                return Some(neutral);
            }
            let (cx, cy) = rect.center();
            let rx = (-(doc_y - cy) / divisor * speed).clamp(-max_degrees, max_degrees);
            let ry = ((doc_x - cx) / divisor * speed).clamp(-max_degrees, max_degrees);
            Some(format!(
                "perspective({}px) rotateX({}deg) rotateY({}deg)",
                num(perspective_px),
                num(rx),
                num(ry)
            ))
        }
        template => {
            let (x, y, scalar) = match binding.source {
                SignalSource::ScrollY => (0.0, frame.scroll_y, frame.scroll_y),
                SignalSource::PointerOffset => {
                    let (px, py) = frame.pointer?;
                    let dx = px - frame.viewport.width * 0.5;
                    let dy = py - frame.viewport.height * 0.5;
                    (dx, dy, dx)
                }
            };
            match template {
                TransformTemplate::TranslateY => Some(format!("translateY({}px)", num(y * speed))),
                TransformTemplate::Translate { rotate_factor } => Some(format!(
                    "translate({}px, {}px) rotate({}deg)",
                    num(x * speed),
                    num(y * speed),
                    num(scalar * rotate_factor)
                )),
                TransformTemplate::Tilt { .. } => None,
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallaxRegistration {
    /// Transformed on signal changes.
    Active,
    /// Reduced motion: registered, never written.
    Inert,
    /// Coarse pointer: pointer-sourced binding not registered.
    Skipped,
}

#[derive(Debug)]
struct Entry {
    binding: ParallaxBinding,
    rect: Option<Rect>,
    last: Option<String>,
}

/// Outcome of one recompute.
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Throttled: ask for another frame.
    pub retry: bool,
    pub dropped: Vec<TargetHandle>,
}

#[derive(Debug)]
pub struct ParallaxMapper {
    settings: ParallaxDefaults,
    entries: IndexMap<TargetHandle, Entry>,
    inert: IndexSet<TargetHandle>,
    dirty: bool,
    last_apply_ms: Option<f64>,
}

impl ParallaxMapper {
    pub fn new(settings: ParallaxDefaults) -> Self {
        Self {
            settings,
            entries: IndexMap::new(),
            inert: IndexSet::new(),
            dirty: false,
            last_apply_ms: None,
        }
    }

    pub fn register(
        &mut self,
        target: &str,
        binding: ParallaxBinding,
        env: &Environment,
    ) -> Result<ParallaxRegistration> {
        ensure_target(target)?;
        binding.validate()?;
        if self.entries.contains_key(target) || self.inert.contains(target) {
            return Err(ScrollcueError::DuplicateTarget {
                target: target.to_string(),
            });
        }
        if env.coarse_pointer && binding.source == SignalSource::PointerOffset {
            log::debug!("skipping pointer parallax {target} on coarse pointer");
            return Ok(ParallaxRegistration::Skipped);
        }
        if env.reduced_motion {
            log::debug!("parallax {target} inert under reduced motion");
            self.inert.insert(target.to_string());
            return Ok(ParallaxRegistration::Inert);
        }
        self.entries.insert(
            target.to_string(),
            Entry {
                binding,
                rect: None,
                last: None,
            },
        );
        self.dirty = true;
        Ok(ParallaxRegistration::Active)
    }

    pub fn remove(&mut self, target: &str) -> bool {
        let a = self.entries.shift_remove(target).is_some();
        let b = self.inert.shift_remove(target);
        a || b
    }

    pub fn contains(&self, target: &str) -> bool {
        self.entries.contains_key(target) || self.inert.contains(target)
    }

    pub fn active_len(&self) -> usize {
        self.entries.len()
    }

    pub fn set_rect(&mut self, target: &str, rect: Rect) {
        if let Some(entry) = self.entries.get_mut(target) {
            if rect.is_finite() {
                entry.rect = Some(rect);
                self.dirty = true;
            }
        }
    }

    /// Mark signals changed. Returns true when a frame should be requested.
    pub fn invalidate(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty && !self.entries.is_empty()
    }

    /// Recompute and write changed transforms for bindings in the active window.
    pub fn apply(
        &mut self,
        now_ms: f64,
        frame: &SignalFrame<'_>,
        doc: &dyn Document,
        out: &mut Outputs,
    ) -> ApplyResult {
        let mut result = ApplyResult::default();
        if !self.is_dirty() {
            return result;
        }
        if let Some(last) = self.last_apply_ms {
            if now_ms - last < self.settings.min_interval_ms {
                result.retry = true;
                return result;
            }
        }
        let margin = self.settings.active_margin_px;
        for (target, entry) in self.entries.iter_mut() {
            if !doc.is_connected(target) {
                result.dropped.push(target.clone());
                continue;
            }
            if let Some(rect) = entry.rect.as_ref() {
                if !intersects(rect, frame.viewport, margin) {
                    continue;
                }
            }
            let Some(transform) = map_transform(&entry.binding, entry.rect.as_ref(), frame) else {
                continue;
            };
            if entry.last.as_deref() != Some(transform.as_str()) {
                out.set_transform(target, transform.clone());
                entry.last = Some(transform);
            }
        }
        for target in &result.dropped {
            log::debug!("parallax target {target} detached");
            self.entries.shift_remove(target);
        }
        self.dirty = false;
        self.last_apply_ms = Some(now_ms);
        result
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.inert.clear();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AlwaysConnected;

    fn vp() -> Viewport {
        Viewport {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 1000.0,
            height: 800.0,
        }
    }

    #[test]
    fn translate_y_from_scroll() {
        let v = vp();
        let frame = SignalFrame {
            scroll_y: 200.0,
            pointer: None,
            viewport: &v,
        };
        let t = map_transform(&ParallaxBinding::scroll(-0.5), None, &frame);
        assert_eq!(t.as_deref(), Some("translateY(-100px)"));
    }

    #[test]
    fn translate_rotate_from_pointer() {
        let v = vp();
        let binding = ParallaxBinding {
            speed: 0.1,
            source: SignalSource::PointerOffset,
            template: TransformTemplate::Translate {
                rotate_factor: 0.01,
            },
        };
        let frame = SignalFrame {
            scroll_y: 0.0,
            pointer: Some((700.0, 300.0)),
            viewport: &v,
        };
        assert_eq!(
            map_transform(&binding, None, &frame).as_deref(),
            Some("translate(20px, -10px) rotate(2deg)")
        );
        let idle = SignalFrame {
            pointer: None,
            ..frame
        };
        assert_eq!(map_transform(&binding, None, &idle), None);
    }

    #[test]
    fn tilt_is_bounded() {
        let v = vp();
        let rect = Rect::new(100.0, 100.0, 400.0, 200.0);
        let binding = ParallaxBinding::tilt(10.0, 8.0);
        let frame = SignalFrame {
            scroll_y: 0.0,
            // far right, top edge of the card
            pointer: Some((500.0, 100.0)),
            viewport: &v,
        };
        assert_eq!(
            map_transform(&binding, Some(&rect), &frame).as_deref(),
            Some("perspective(1000px) rotateX(8deg) rotateY(8deg)")
        );
        let outside = SignalFrame {
            pointer: Some((900.0, 700.0)),
            ..frame
        };
        assert_eq!(
            map_transform(&binding, Some(&rect), &outside).as_deref(),
            Some("perspective(1000px) rotateX(0deg) rotateY(0deg)")
        );
    }

    #[test]
    fn tilt_requires_pointer_source() {
        let mut b = ParallaxBinding::tilt(10.0, 5.0);
        b.source = SignalSource::ScrollY;
        assert!(matches!(
            b.validate(),
            Err(ScrollcueError::InvalidBinding { .. })
        ));
        assert!(ParallaxBinding::tilt(0.0, 5.0).validate().is_err());
        assert!(ParallaxBinding::scroll(f64::NAN).validate().is_err());
    }

    #[test]
    fn environment_gates_registration() {
        let mut m = ParallaxMapper::new(ParallaxDefaults::default());
        let touch = Environment {
            coarse_pointer: true,
            ..Default::default()
        };
        assert_eq!(
            m.register("#card", ParallaxBinding::tilt(20.0, 10.0), &touch)
                .unwrap(),
            ParallaxRegistration::Skipped
        );
        assert_eq!(
            m.register("#bg", ParallaxBinding::scroll(0.3), &touch).unwrap(),
            ParallaxRegistration::Active
        );
        let calm = Environment {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(
            m.register("#hero", ParallaxBinding::scroll(0.3), &calm).unwrap(),
            ParallaxRegistration::Inert
        );
        assert!(m.contains("#hero"));
        assert_eq!(m.active_len(), 1);
    }

    #[test]
    fn throttles_and_dedupes_writes() {
        let mut m = ParallaxMapper::new(ParallaxDefaults::default());
        m.register("#bg", ParallaxBinding::scroll(0.5), &Environment::default())
            .unwrap();
        let v = vp();
        let mut out = Outputs::default();
        let frame = SignalFrame {
            scroll_y: 100.0,
            pointer: None,
            viewport: &v,
        };
        let r = m.apply(0.0, &frame, &AlwaysConnected, &mut out);
        assert!(!r.retry);
        assert_eq!(out.transform_count(), 1);

        assert!(m.invalidate());
        let r = m.apply(8.0, &frame, &AlwaysConnected, &mut out);
        assert!(r.retry);
        assert_eq!(out.transform_count(), 1);

        // same signal, past the interval: no duplicate write
        let r = m.apply(16.0, &frame, &AlwaysConnected, &mut out);
        assert!(!r.retry);
        assert_eq!(out.transform_count(), 1);
    }

    #[test]
    fn offscreen_bindings_are_skipped() {
        let mut m = ParallaxMapper::new(ParallaxDefaults::default());
        m.register("#far", ParallaxBinding::scroll(0.5), &Environment::default())
            .unwrap();
        m.set_rect("#far", Rect::new(0.0, 5000.0, 100.0, 100.0));
        let v = vp();
        let mut out = Outputs::default();
        let frame = SignalFrame {
            scroll_y: 0.0,
            pointer: None,
            viewport: &v,
        };
        m.apply(0.0, &frame, &AlwaysConnected, &mut out);
        assert_eq!(out.transform_count(), 0);
    }

    #[test]
    fn detached_bindings_are_dropped() {
        let mut m = ParallaxMapper::new(ParallaxDefaults::default());
        m.register("#bg", ParallaxBinding::scroll(0.5), &Environment::default())
            .unwrap();
        let v = vp();
        let mut out = Outputs::default();
        let frame = SignalFrame {
            scroll_y: 10.0,
            pointer: None,
            viewport: &v,
        };
        let gone = |_: &str| false;
        let r = m.apply(0.0, &frame, &gone, &mut out);
        assert_eq!(r.dropped, vec!["#bg".to_string()]);
        assert_eq!(out.transform_count(), 0);
        assert_eq!(m.active_len(), 0);
    }
}
