//! One-shot visibility notifications.
//!
//! A target is watched until its visible fraction first reaches its
//! threshold. The crossing arms an optional delay; when the delay elapses the
//! target fires once and is deregistered. Each registration carries a payload
//! handed back on firing so the caller can route the notification.

use indexmap::IndexMap;

use crate::document::Document;
use crate::error::{ensure_finite, ensure_target, ScrollcueError};
use crate::geometry::{visible_fraction, Rect, Viewport};
use crate::ids::TargetHandle;
use crate::Result;

/// Threshold, margin and delay for one observed target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObserveOptions {
    /// Visible fraction in (0, 1] that counts as a crossing.
    pub threshold: f64,
    /// Grows (or with a negative value, shrinks) the viewport on every side.
    pub root_margin_px: f64,
    pub delay_ms: f64,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_px: 0.0,
            delay_ms: 0.0,
        }
    }
}

impl ObserveOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ScrollcueError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        ensure_finite("root_margin_px", self.root_margin_px)?;
        if !(self.delay_ms.is_finite() && self.delay_ms >= 0.0) {
            return Err(ScrollcueError::InvalidDelay {
                delay_seconds: self.delay_ms / 1000.0,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum WatchState {
    Watching,
    /// Crossed; fires once the clock reaches `fire_at_ms`.
    Armed { fire_at_ms: f64 },
}

#[derive(Debug)]
struct Watch<T> {
    opts: ObserveOptions,
    state: WatchState,
    rect: Option<Rect>,
    payload: T,
}

/// A notification produced by [`VisibilityScheduler::poll`].
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<T> {
    pub target: TargetHandle,
    pub payload: T,
    pub fired_at_ms: f64,
}

/// Result of polling: fired notifications plus targets dropped because
/// the element left the document.
#[derive(Debug)]
pub struct PollResult<T> {
    pub fired: Vec<Fired<T>>,
    pub dropped: Vec<TargetHandle>,
}

#[derive(Debug)]
pub struct VisibilityScheduler<T> {
    watches: IndexMap<TargetHandle, Watch<T>>,
    /// Armed targets in arming order.
    armed: Vec<TargetHandle>,
    viewport: Viewport,
}

impl<T> Default for VisibilityScheduler<T> {
    fn default() -> Self {
        Self {
            watches: IndexMap::new(),
            armed: Vec::new(),
            viewport: Viewport::default(),
        }
    }
}

impl<T> VisibilityScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` for a one-shot notification.
    pub fn observe(&mut self, target: &str, opts: ObserveOptions, payload: T) -> Result<()> {
        ensure_target(target)?;
        opts.validate()?;
        if self.watches.contains_key(target) {
            return Err(ScrollcueError::DuplicateTarget {
                target: target.to_string(),
            });
        }
        log::debug!(
            "observe {target} threshold={} delay={}ms",
            opts.threshold,
            opts.delay_ms
        );
        self.watches.insert(
            target.to_string(),
            Watch {
                opts,
                state: WatchState::Watching,
                rect: None,
                payload,
            },
        );
        Ok(())
    }

    /// Cancel a pending notification. Safe on fired or unknown targets.
    pub fn unobserve(&mut self, target: &str) -> bool {
        self.armed.retain(|t| t != target);
        self.watches.shift_remove(target).is_some()
    }

    pub fn is_observing(&self, target: &str) -> bool {
        self.watches.contains_key(target)
    }

    pub fn is_armed(&self, target: &str) -> bool {
        matches!(
            self.watches.get(target).map(|w| w.state),
            Some(WatchState::Armed { .. })
        )
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    pub fn has_armed(&self) -> bool {
        !self.armed.is_empty()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Feed a ratio measured by the host (native observer entry).
    pub fn report_ratio(&mut self, target: &str, ratio: f64, now_ms: f64) {
        if !ratio.is_finite() {
            log::warn!("ignoring non-finite intersection ratio for {target}");
            return;
        }
        if let Some(watch) = self.watches.get_mut(target) {
            if arm(watch, ratio, now_ms) {
                self.armed.push(target.to_string());
            }
        }
    }

    /// Store fresh rects for known targets and re-evaluate against `viewport`.
    pub fn sample_layout<'a, I>(&mut self, viewport: Viewport, rects: I, now_ms: f64)
    where
        I: IntoIterator<Item = (&'a str, Rect)>,
    {
        for (target, rect) in rects {
            if let Some(watch) = self.watches.get_mut(target) {
                if rect.is_finite() {
                    watch.rect = Some(rect);
                }
            }
        }
        self.set_viewport(viewport, now_ms);
    }

    /// Viewport moved (scroll or resize): re-evaluate every target with a rect.
    pub fn set_viewport(&mut self, viewport: Viewport, now_ms: f64) {
        self.viewport = viewport;
        for (target, watch) in self.watches.iter_mut() {
            let Some(rect) = watch.rect else { continue };
            let ratio = visible_fraction(&rect, &viewport, watch.opts.root_margin_px);
            if arm(watch, ratio, now_ms) {
                self.armed.push(target.clone());
            }
        }
    }

    /// Fire every armed target whose delay elapsed, in arming order.
    /// Targets no longer in the document are dropped without firing.
    pub fn poll(&mut self, now_ms: f64, doc: &dyn Document) -> PollResult<T> {
        let mut fired = Vec::new();
        let mut dropped = Vec::new();
        let mut still_armed = Vec::with_capacity(self.armed.len());
        for target in std::mem::take(&mut self.armed) {
            let due = match self.watches.get(&target).map(|w| w.state) {
                Some(WatchState::Armed { fire_at_ms }) => fire_at_ms <= now_ms,
                _ => continue,
            };
            if !due {
                still_armed.push(target);
                continue;
            }
            let Some(watch) = self.watches.shift_remove(&target) else {
                continue;
            };
            if doc.is_connected(&target) {
                log::debug!("visible {target} at {now_ms} ms");
                fired.push(Fired {
                    target,
                    payload: watch.payload,
                    fired_at_ms: now_ms,
                });
            } else {
                log::debug!("dropping detached target {target}");
                dropped.push(target);
            }
        }
        self.armed = still_armed;
        PollResult { fired, dropped }
    }

    pub fn clear(&mut self) {
        self.watches.clear();
        self.armed.clear();
    }
}

/// Arm on first crossing. Returns true when the state changed.
fn arm<T>(watch: &mut Watch<T>, ratio: f64, now_ms: f64) -> bool {
    if watch.state != WatchState::Watching || ratio < watch.opts.threshold {
        return false;
    }
    watch.state = WatchState::Armed {
        fire_at_ms: now_ms + watch.opts.delay_ms,
    };
    true
}
