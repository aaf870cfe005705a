//! Autoplaying, interruptible carousel state machine.
//!
//! The carousel owns its index, its autoplay timer handle and its pause
//! causes. Every index change writes the slide and dot presentation in one
//! batch, and every manual navigation re-arms the autoplay timer (cancel,
//! then schedule) so at most one timer is ever pending per carousel.

use serde::{Deserialize, Serialize};

use crate::config::{CarouselDefaults, Environment};
use crate::error::{ensure_target, ScrollcueError};
use crate::ids::{CarouselId, TargetHandle, TimerId};
use crate::inputs::{CarouselIntent, Key};
use crate::outputs::{Mutation, NavCause, Outputs, PageEvent, PauseCause};
use crate::timer::TimerQueue;
use crate::Result;

fn yes() -> bool {
    true
}

fn track_transform(index: usize) -> String {
    format!("translateX({}%)", -(index as i64) * 100)
}

/// Declarative carousel description. `None` fields use page defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    pub container: TargetHandle,
    pub slides: Vec<TargetHandle>,
    #[serde(default)]
    pub dots: Vec<TargetHandle>,
    /// Strip translated by `-index * 100%` on every change.
    #[serde(default)]
    pub track: Option<TargetHandle>,
    #[serde(default = "yes")]
    pub autoplay: bool,
    #[serde(default)]
    pub interval_ms: Option<f64>,
    #[serde(default)]
    pub swipe_threshold_px: Option<f64>,
    #[serde(default)]
    pub active_class: Option<String>,
    #[serde(default = "yes")]
    pub pause_on_hover: bool,
    #[serde(default = "yes")]
    pub pause_on_focus: bool,
    #[serde(default)]
    pub start_index: usize,
}

impl CarouselConfig {
    pub fn new<S: Into<String>>(container: &str, slides: impl IntoIterator<Item = S>) -> Self {
        Self {
            container: container.to_string(),
            slides: slides.into_iter().map(Into::into).collect(),
            dots: Vec::new(),
            track: None,
            autoplay: true,
            interval_ms: None,
            swipe_threshold_px: None,
            active_class: None,
            pause_on_hover: true,
            pause_on_focus: true,
            start_index: 0,
        }
    }

    pub fn with_dots<S: Into<String>>(mut self, dots: impl IntoIterator<Item = S>) -> Self {
        self.dots = dots.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "cause", rename_all = "snake_case")]
pub enum CarouselPhase {
    /// Torn down; accepts no intents.
    Idle,
    Autoplaying,
    Paused(PauseCause),
    /// Running without autoplay.
    Manual,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Interaction {
    hover: bool,
    focus: bool,
    touch: bool,
}

impl Interaction {
    fn any(&self) -> bool {
        self.hover || self.focus || self.touch
    }

    /// Most recent-style priority: touch, then focus, then hover.
    fn primary(&self) -> Option<PauseCause> {
        if self.touch {
            Some(PauseCause::Touch)
        } else if self.focus {
            Some(PauseCause::Focus)
        } else if self.hover {
            Some(PauseCause::Hover)
        } else {
            None
        }
    }
}

/// Borrowed page resources a carousel transition needs.
pub struct CarouselCtx<'a> {
    pub now_ms: f64,
    pub timers: &'a mut TimerQueue<CarouselId>,
    pub out: &'a mut Outputs,
}

#[derive(Debug)]
pub struct Carousel {
    id: CarouselId,
    container: TargetHandle,
    slides: Vec<TargetHandle>,
    dots: Vec<TargetHandle>,
    track: Option<TargetHandle>,
    active_class: String,
    interval_ms: f64,
    swipe_threshold_px: f64,
    pause_on_hover: bool,
    pause_on_focus: bool,

    index: usize,
    autoplay: bool,
    interaction: Interaction,
    /// Keyboard focus inside the carousel (independent of pause_on_focus).
    focused: bool,
    timer: Option<TimerId>,
    touch_origin: Option<(f64, f64)>,
    torn_down: bool,
}

impl Carousel {
    /// Validate and build a carousel. Nothing is scheduled until `start`.
    pub fn new(
        id: CarouselId,
        cfg: CarouselConfig,
        defaults: &CarouselDefaults,
        env: &Environment,
    ) -> Result<Self> {
        ensure_target(&cfg.container)?;
        if cfg.slides.is_empty() {
            return Err(ScrollcueError::EmptyCarousel {
                container: cfg.container,
            });
        }
        if !cfg.dots.is_empty() && cfg.dots.len() != cfg.slides.len() {
            return Err(ScrollcueError::DotCountMismatch {
                slides: cfg.slides.len(),
                dots: cfg.dots.len(),
            });
        }
        if cfg.start_index >= cfg.slides.len() {
            return Err(ScrollcueError::StartIndexOutOfRange {
                index: cfg.start_index,
                len: cfg.slides.len(),
            });
        }
        let interval_ms = cfg.interval_ms.unwrap_or(defaults.interval_ms);
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            return Err(ScrollcueError::InvalidDuration {
                duration_ms: interval_ms,
            });
        }
        let swipe_threshold_px = cfg
            .swipe_threshold_px
            .unwrap_or(defaults.swipe_threshold_px);
        if !(swipe_threshold_px.is_finite() && swipe_threshold_px >= 0.0) {
            return Err(ScrollcueError::InvalidNumber {
                field: "swipe_threshold_px".into(),
                value: swipe_threshold_px,
            });
        }
        Ok(Self {
            id,
            container: cfg.container,
            slides: cfg.slides,
            dots: cfg.dots,
            track: cfg.track,
            active_class: cfg
                .active_class
                .unwrap_or_else(|| defaults.active_class.clone()),
            interval_ms,
            swipe_threshold_px,
            pause_on_hover: cfg.pause_on_hover,
            pause_on_focus: cfg.pause_on_focus,
            index: cfg.start_index,
            autoplay: cfg.autoplay && !env.reduced_motion,
            interaction: Interaction::default(),
            focused: false,
            timer: None,
            touch_origin: None,
            torn_down: false,
        })
    }

    pub fn id(&self) -> CarouselId {
        self.id
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay
    }

    pub fn is_user_interacting(&self) -> bool {
        self.interaction.any()
    }

    pub fn phase(&self) -> CarouselPhase {
        if self.torn_down {
            CarouselPhase::Idle
        } else if !self.autoplay {
            CarouselPhase::Manual
        } else if let Some(cause) = self.interaction.primary() {
            CarouselPhase::Paused(cause)
        } else {
            CarouselPhase::Autoplaying
        }
    }

    /// Write the initial presentation (exactly one active slide) and arm autoplay.
    pub fn start(&mut self, ctx: &mut CarouselCtx<'_>) {
        for (i, slide) in self.slides.iter().enumerate() {
            if i != self.index {
                ctx.out.remove_class(slide, &self.active_class);
            }
        }
        for (i, dot) in self.dots.iter().enumerate() {
            if i != self.index {
                ctx.out.remove_class(dot, &self.active_class);
            }
        }
        ctx.out.add_class(&self.slides[self.index], &self.active_class);
        if let Some(dot) = self.dots.get(self.index) {
            ctx.out.add_class(dot, &self.active_class);
        }
        self.write_track(ctx.out);
        self.sync_timer(ctx);
        log::debug!(
            "carousel {:?} started at {} ({} slides, {:?})",
            self.id,
            self.index,
            self.slides.len(),
            self.phase()
        );
    }

    pub fn next(&mut self, cause: NavCause, ctx: &mut CarouselCtx<'_>) -> bool {
        let len = self.slides.len();
        self.transition((self.index + 1) % len, cause, ctx)
    }

    pub fn prev(&mut self, cause: NavCause, ctx: &mut CarouselCtx<'_>) -> bool {
        let len = self.slides.len();
        self.transition((self.index + len - 1) % len, cause, ctx)
    }

    /// Absolute jump. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize, cause: NavCause, ctx: &mut CarouselCtx<'_>) -> bool {
        if index >= self.slides.len() {
            log::warn!(
                "carousel {:?}: ignoring go_to({index}) with {} slides",
                self.id,
                self.slides.len()
            );
            return false;
        }
        self.transition(index, cause, ctx)
    }

    /// Dispatch a host intent.
    pub fn handle(&mut self, intent: &CarouselIntent, ctx: &mut CarouselCtx<'_>) {
        match *intent {
            CarouselIntent::Next => {
                self.next(NavCause::Button, ctx);
            }
            CarouselIntent::Prev => {
                self.prev(NavCause::Button, ctx);
            }
            CarouselIntent::GoTo { index } => {
                self.go_to(index, NavCause::Dot, ctx);
            }
            CarouselIntent::PointerEnter => self.pointer_enter(ctx),
            CarouselIntent::PointerLeave => self.pointer_leave(ctx),
            CarouselIntent::FocusIn => self.focus_in(ctx),
            CarouselIntent::FocusOut => self.focus_out(ctx),
            CarouselIntent::TouchStart { x, y } => self.touch_start(x, y, ctx),
            CarouselIntent::TouchEnd { x, y } => self.touch_end(x, y, ctx),
            CarouselIntent::TouchCancel => self.touch_cancel(ctx),
            CarouselIntent::Key { key } => self.key(key, ctx),
        }
    }

    pub fn pointer_enter(&mut self, ctx: &mut CarouselCtx<'_>) {
        if self.pause_on_hover {
            self.set_interaction(ctx, |i| i.hover = true);
        }
    }

    pub fn pointer_leave(&mut self, ctx: &mut CarouselCtx<'_>) {
        self.set_interaction(ctx, |i| i.hover = false);
    }

    pub fn focus_in(&mut self, ctx: &mut CarouselCtx<'_>) {
        self.focused = true;
        if self.pause_on_focus {
            self.set_interaction(ctx, |i| i.focus = true);
        }
    }

    pub fn focus_out(&mut self, ctx: &mut CarouselCtx<'_>) {
        self.focused = false;
        self.set_interaction(ctx, |i| i.focus = false);
    }

    pub fn touch_start(&mut self, x: f64, y: f64, ctx: &mut CarouselCtx<'_>) {
        if self.torn_down || !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.touch_origin = Some((x, y));
        self.set_interaction(ctx, |i| i.touch = true);
    }

    /// Finish a gesture: horizontal travel beyond the threshold navigates,
    /// left to next and right to prev; shorter drags are ignored.
    pub fn touch_end(&mut self, x: f64, y: f64, ctx: &mut CarouselCtx<'_>) {
        let origin = self.touch_origin.take();
        self.set_interaction(ctx, |i| i.touch = false);
        let Some((x0, y0)) = origin else { return };
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let dx = x - x0;
        let dy = y - y0;
        if dx.abs() <= self.swipe_threshold_px || dx.abs() < dy.abs() {
            log::trace!("carousel {:?}: drag of {dx}px ignored", self.id);
            return;
        }
        if dx < 0.0 {
            self.next(NavCause::Swipe, ctx);
        } else {
            self.prev(NavCause::Swipe, ctx);
        }
    }

    /// Abandon a gesture. Clears the touch pause without navigating.
    pub fn touch_cancel(&mut self, ctx: &mut CarouselCtx<'_>) {
        self.touch_origin = None;
        self.set_interaction(ctx, |i| i.touch = false);
    }

    pub fn key(&mut self, key: Key, ctx: &mut CarouselCtx<'_>) {
        if !self.focused {
            return;
        }
        match key {
            Key::ArrowLeft | Key::ArrowUp => {
                self.prev(NavCause::Keyboard, ctx);
            }
            Key::ArrowRight | Key::ArrowDown => {
                self.next(NavCause::Keyboard, ctx);
            }
            Key::Other => {}
        }
    }

    /// Autoplay timer fired. Stale handles are ignored.
    pub fn on_timer(&mut self, id: TimerId, ctx: &mut CarouselCtx<'_>) {
        if self.timer != Some(id) {
            log::trace!("carousel {:?}: stale timer {:?}", self.id, id);
            return;
        }
        self.timer = None;
        self.next(NavCause::Autoplay, ctx);
    }

    /// Cancel the timer and stop accepting intents.
    pub fn teardown(&mut self, ctx: &mut CarouselCtx<'_>) {
        if let Some(id) = self.timer.take() {
            ctx.timers.cancel(id);
        }
        self.torn_down = true;
        self.touch_origin = None;
        log::debug!("carousel {:?} torn down", self.id);
    }

    fn transition(&mut self, to: usize, cause: NavCause, ctx: &mut CarouselCtx<'_>) -> bool {
        if self.torn_down {
            return false;
        }
        let from = self.index;
        let changed = to != from;
        if changed {
            self.present(from, to, ctx.out);
            self.index = to;
            ctx.out.push_event(PageEvent::SlideChanged {
                carousel: self.id,
                from,
                to,
                cause,
            });
        }
        self.reset_timer(ctx);
        changed
    }

    /// Deactivate `from` and activate `to` for slides and dots in one batch.
    fn present(&self, from: usize, to: usize, out: &mut Outputs) {
        out.remove_class(&self.slides[from], &self.active_class);
        out.add_class(&self.slides[to], &self.active_class);
        if let (Some(old), Some(new)) = (self.dots.get(from), self.dots.get(to)) {
            out.remove_class(old, &self.active_class);
            out.add_class(new, &self.active_class);
        }
        if let Some(track) = &self.track {
            out.set_transform(track, track_transform(to));
        }
    }

    fn write_track(&self, out: &mut Outputs) {
        if let Some(track) = &self.track {
            out.push(Mutation::SetTransform {
                target: track.clone(),
                transform: track_transform(self.index),
            });
        }
    }

    fn set_interaction(&mut self, ctx: &mut CarouselCtx<'_>, f: impl FnOnce(&mut Interaction)) {
        if self.torn_down {
            return;
        }
        let before = self.interaction.any();
        f(&mut self.interaction);
        let after = self.interaction.any();
        if self.autoplay && before != after {
            match self.interaction.primary() {
                Some(cause) => ctx.out.push_event(PageEvent::CarouselPaused {
                    carousel: self.id,
                    cause,
                }),
                None => ctx.out.push_event(PageEvent::CarouselResumed { carousel: self.id }),
            }
        }
        self.sync_timer(ctx);
    }

    /// Cancel then re-arm, so a manual action never races the next tick.
    fn reset_timer(&mut self, ctx: &mut CarouselCtx<'_>) {
        if let Some(id) = self.timer.take() {
            ctx.timers.cancel(id);
        }
        self.sync_timer(ctx);
    }

    /// Keep `timer.is_some() == autoplay && !interacting && !torn_down`.
    fn sync_timer(&mut self, ctx: &mut CarouselCtx<'_>) {
        let want = !self.torn_down && self.autoplay && !self.interaction.any();
        match (want, self.timer) {
            (true, None) => {
                let due = ctx.now_ms + self.interval_ms;
                self.timer = Some(ctx.timers.schedule(due, self.id));
            }
            (false, Some(id)) => {
                ctx.timers.cancel(id);
                self.timer = None;
            }
            _ => {}
        }
    }
}
