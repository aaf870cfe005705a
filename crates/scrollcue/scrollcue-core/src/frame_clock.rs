//! Shared render-loop bookkeeping.
//!
//! Components request a frame per animated property; duplicate requests
//! coalesce into one. A frame drains every request, so a callback chain
//! continues only by requesting again from inside its own frame.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::ids::TargetHandle;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameChannel {
    Counter,
    Parallax,
}

/// One callback chain: a channel, optionally scoped to a target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameKey {
    pub channel: FrameChannel,
    pub target: Option<TargetHandle>,
}

impl FrameKey {
    pub fn counter(target: &str) -> Self {
        Self {
            channel: FrameChannel::Counter,
            target: Some(target.to_string()),
        }
    }

    /// Parallax recomputes every binding in one pass.
    pub fn parallax() -> Self {
        Self {
            channel: FrameChannel::Parallax,
            target: None,
        }
    }
}

/// The callbacks due in one frame.
#[derive(Clone, Debug)]
pub struct FrameTick {
    pub now_ms: f64,
    /// Time since the previous frame (0 for the first).
    pub delta_ms: f64,
    pub keys: Vec<FrameKey>,
}

#[derive(Debug, Default)]
pub struct FrameClock {
    pending: IndexSet<FrameKey>,
    last_frame_ms: Option<f64>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key was not already scheduled.
    pub fn request(&mut self, key: FrameKey) -> bool {
        self.pending.insert(key)
    }

    pub fn cancel(&mut self, key: &FrameKey) -> bool {
        self.pending.shift_remove(key)
    }

    /// Drop every request scoped to `target`.
    pub fn cancel_target(&mut self, target: &str) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|k| k.target.as_deref() != Some(target));
        before - self.pending.len()
    }

    pub fn is_requested(&self, key: &FrameKey) -> bool {
        self.pending.contains(key)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Start a frame, draining all requests in request order.
    pub fn begin_frame(&mut self, now_ms: f64) -> FrameTick {
        let delta_ms = self
            .last_frame_ms
            .map(|last| (now_ms - last).max(0.0))
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);
        self.frames = self.frames.wrapping_add(1);
        let keys = self.pending.drain(..).collect();
        log::trace!("frame {} at {now_ms} ms (+{delta_ms} ms)", self.frames);
        FrameTick {
            now_ms,
            delta_ms,
            keys,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn last_frame_ms(&self) -> Option<f64> {
        self.last_frame_ms
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce() {
        let mut clock = FrameClock::new();
        assert!(clock.request(FrameKey::counter("#a")));
        assert!(!clock.request(FrameKey::counter("#a")));
        assert!(clock.request(FrameKey::parallax()));
        let tick = clock.begin_frame(16.0);
        assert_eq!(tick.keys.len(), 2);
        assert_eq!(tick.delta_ms, 0.0);
        assert!(!clock.has_pending());
    }

    #[test]
    fn chains_continue_only_when_re_requested() {
        let mut clock = FrameClock::new();
        clock.request(FrameKey::counter("#a"));
        clock.begin_frame(0.0);
        let tick = clock.begin_frame(16.0);
        assert!(tick.keys.is_empty());
        assert_eq!(tick.delta_ms, 16.0);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn cancel_by_target() {
        let mut clock = FrameClock::new();
        clock.request(FrameKey::counter("#a"));
        clock.request(FrameKey::counter("#b"));
        clock.request(FrameKey::parallax());
        assert_eq!(clock.cancel_target("#a"), 1);
        assert!(clock.cancel(&FrameKey::parallax()));
        let tick = clock.begin_frame(0.0);
        assert_eq!(tick.keys, vec![FrameKey::counter("#b")]);
    }
}
