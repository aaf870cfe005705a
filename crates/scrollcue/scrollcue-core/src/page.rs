//! Page: owns every registration for one document and drives them from
//! host-supplied time.
//!
//! Methods:
//! - new, register_reveal/_group, register_counter/_from_dataset, rearm_counter,
//!   register_parallax, create_carousel, carousel_intent, remove_target,
//!   load_manifest, update (commands → carousel timers → visibility → frame),
//!   needs_frame, teardown

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::carousel::{Carousel, CarouselConfig, CarouselCtx};
use crate::config::Config;
use crate::counter::{CounterAnimator, CounterConfig};
use crate::document::Document;
use crate::easing::EasingCurve;
use crate::error::ScrollcueError;
use crate::frame_clock::{FrameChannel, FrameClock, FrameKey};
use crate::geometry::Viewport;
use crate::ids::{CarouselId, IdAllocator};
use crate::inputs::{CarouselIntent, Inputs, PageCommand};
use crate::manifest::{ManifestHandles, PageManifest};
use crate::outputs::{DropReason, Outputs, PageEvent};
use crate::parallax::{ParallaxBinding, ParallaxMapper, ParallaxRegistration, SignalFrame};
use crate::reveal::{RevealBinder, RevealConfig};
use crate::signal::{PointerSignal, ScrollSignal};
use crate::timer::TimerQueue;
use crate::visibility::{ObserveOptions, VisibilityScheduler};
use crate::Result;

/// What a visibility firing starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Reveal,
    Counter,
}

#[derive(Debug)]
pub struct Page {
    config: Config,
    scroll: ScrollSignal,
    pointer: PointerSignal,
    viewport: Viewport,
    scheduler: VisibilityScheduler<Trigger>,
    clock: FrameClock,
    counters: CounterAnimator,
    parallax: ParallaxMapper,
    reveals: RevealBinder,
    carousels: IndexMap<CarouselId, Carousel>,
    /// Created but not yet presented; started with the next update's time.
    starting: Vec<CarouselId>,
    timers: TimerQueue<CarouselId>,
    ids: IdAllocator,
    /// Mutations produced outside `update`, flushed at the head of the next batch.
    staged: Outputs,
    outputs: Outputs,
    last_now: Option<f64>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Page {
    pub fn new(config: Config) -> Self {
        Self {
            scroll: ScrollSignal::new(config.scroll_state.threshold_px),
            pointer: PointerSignal::default(),
            viewport: Viewport::default(),
            scheduler: VisibilityScheduler::new(),
            clock: FrameClock::new(),
            counters: CounterAnimator::new(),
            parallax: ParallaxMapper::new(config.parallax.clone()),
            reveals: RevealBinder::new(config.reveal.clone()),
            carousels: IndexMap::new(),
            starting: Vec::new(),
            timers: TimerQueue::new(),
            ids: IdAllocator::new(),
            staged: Outputs::default(),
            outputs: Outputs::default(),
            last_now: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scroll(&self) -> &ScrollSignal {
        &self.scroll
    }

    pub fn pointer(&self) -> &PointerSignal {
        &self.pointer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scheduler(&self) -> &VisibilityScheduler<Trigger> {
        &self.scheduler
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn parallax(&self) -> &ParallaxMapper {
        &self.parallax
    }

    pub fn timers(&self) -> &TimerQueue<CarouselId> {
        &self.timers
    }

    pub fn frame_clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn carousel(&self, id: CarouselId) -> Option<&Carousel> {
        self.carousels.get(&id)
    }

    pub fn carousel_ids(&self) -> impl Iterator<Item = CarouselId> + '_ {
        self.carousels.keys().copied()
    }

    /// Outputs of the most recent update.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ---------- registration ----------

    pub fn register_reveal(&mut self, target: &str, cfg: &RevealConfig) -> Result<()> {
        self.reveals.register(target, cfg, &mut self.scheduler)
    }

    /// Register siblings with stagger delays by position. All or nothing.
    pub fn register_reveal_group<S: AsRef<str>>(
        &mut self,
        targets: &[S],
        base: &RevealConfig,
    ) -> Result<usize> {
        self.reveals.register_group(targets, base, &mut self.scheduler)
    }

    /// Register a counter that starts when it becomes visible.
    pub fn register_counter(&mut self, target: &str, cfg: CounterConfig) -> Result<()> {
        self.add_counter(target, cfg, None)
    }

    /// Like [`register_counter`](Self::register_counter), with the run
    /// shaped by `curve`.
    pub fn register_counter_with_curve(
        &mut self,
        target: &str,
        cfg: CounterConfig,
        curve: Box<dyn EasingCurve>,
    ) -> Result<()> {
        self.add_counter(target, cfg, Some(curve))
    }

    fn add_counter(
        &mut self,
        target: &str,
        cfg: CounterConfig,
        curve: Option<Box<dyn EasingCurve>>,
    ) -> Result<()> {
        if self.scheduler.is_observing(target) {
            return Err(ScrollcueError::DuplicateTarget {
                target: target.to_string(),
            });
        }
        match curve {
            Some(curve) => self.counters.register_with_curve(target, cfg, curve)?,
            None => self.counters.register(target, cfg)?,
        }
        let options = self.counter_observe_options();
        if let Err(err) = self.scheduler.observe(target, options, Trigger::Counter) {
            self.counters.remove(target, &mut self.clock);
            return Err(err);
        }
        log::debug!("counter {target} registered");
        Ok(())
    }

    /// Parse `data-*` attributes and register the counter.
    pub fn register_counter_from_dataset<I, K, V>(&mut self, target: &str, attrs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cfg = CounterConfig::from_dataset(attrs, &self.config.counter)?;
        self.register_counter(target, cfg)
    }

    /// Let a completed (or running) counter run again on its next crossing.
    /// Returns false when the counter is unknown or still armed.
    pub fn rearm_counter(&mut self, target: &str) -> Result<bool> {
        if !self.counters.rearm(target, &mut self.clock) {
            return Ok(false);
        }
        if !self.scheduler.is_observing(target) {
            let options = self.counter_observe_options();
            self.scheduler.observe(target, options, Trigger::Counter)?;
        }
        Ok(true)
    }

    pub fn register_parallax(
        &mut self,
        target: &str,
        binding: ParallaxBinding,
    ) -> Result<ParallaxRegistration> {
        let registration = self
            .parallax
            .register(target, binding, &self.config.environment)?;
        if registration == ParallaxRegistration::Active {
            self.clock.request(FrameKey::parallax());
        }
        Ok(registration)
    }

    /// Validate and create a carousel. Its initial presentation and first
    /// autoplay timer are written by the next update.
    pub fn create_carousel(&mut self, cfg: CarouselConfig) -> Result<CarouselId> {
        if self
            .carousels
            .values()
            .any(|c| c.container() == cfg.container)
        {
            return Err(ScrollcueError::DuplicateTarget {
                target: cfg.container,
            });
        }
        let id = self.ids.alloc_carousel();
        let carousel = Carousel::new(
            id,
            cfg,
            &self.config.carousel,
            &self.config.environment,
        )?;
        log::debug!(
            "carousel {:?} created on {} with {} slides",
            id,
            carousel.container(),
            carousel.len()
        );
        self.carousels.insert(id, carousel);
        self.starting.push(id);
        Ok(id)
    }

    /// Apply an intent outside `update` at the host time it happened. Times
    /// are clamped like `update`'s; the resulting mutations are delivered
    /// with the next update.
    pub fn carousel_intent(
        &mut self,
        id: CarouselId,
        intent: &CarouselIntent,
        now_ms: f64,
    ) -> Result<()> {
        if !self.carousels.contains_key(&id) {
            return Err(ScrollcueError::CarouselNotFound { id: id.0 });
        }
        let now = self.clamp_now(now_ms);
        let Self {
            carousels,
            starting,
            timers,
            staged,
            ..
        } = self;
        start_pending(carousels, starting, timers, staged, now);
        if let Some(carousel) = carousels.get_mut(&id) {
            let mut ctx = CarouselCtx {
                now_ms: now,
                timers,
                out: staged,
            };
            carousel.handle(intent, &mut ctx);
        }
        Ok(())
    }

    /// Drop every registration on `target`. Returns true if anything was removed;
    /// the next update reports it as `TargetDropped { reason: Removed }`.
    pub fn remove_target(&mut self, target: &str) -> bool {
        let removed = self.forget(target);
        if removed {
            log::debug!("removed target {target}");
            self.staged.push_event(PageEvent::TargetDropped {
                target: target.to_string(),
                reason: DropReason::Removed,
            });
        }
        removed
    }

    /// Register everything a manifest declares. The first error aborts.
    pub fn load_manifest(&mut self, manifest: &PageManifest) -> Result<ManifestHandles> {
        let mut handles = ManifestHandles::default();
        for entry in &manifest.reveals {
            self.register_reveal(&entry.target, &entry.config)?;
            handles.reveals += 1;
        }
        for group in &manifest.reveal_groups {
            handles.reveals += self.register_reveal_group(group.targets.as_slice(), &group.config)?;
        }
        for entry in &manifest.counters {
            self.register_counter_from_dataset(&entry.target, &entry.dataset)?;
            handles.counters += 1;
        }
        for entry in &manifest.parallax {
            let registration = self.register_parallax(&entry.target, entry.binding)?;
            handles.parallax.push((entry.target.clone(), registration));
        }
        for cfg in &manifest.carousels {
            handles.carousels.push(self.create_carousel(cfg.clone())?);
        }
        log::debug!(
            "manifest loaded: {} reveals, {} counters, {} parallax, {} carousels",
            handles.reveals,
            handles.counters,
            handles.parallax.len(),
            handles.carousels.len()
        );
        Ok(handles)
    }

    // ---------- per-frame ----------

    /// Advance the page to `now_ms` and return the batch of mutations and
    /// events the host should apply.
    pub fn update(&mut self, now_ms: f64, inputs: Inputs, doc: &dyn Document) -> &Outputs {
        let now = self.clamp_now(now_ms);
        self.outputs.clear();
        self.outputs.mutations.append(&mut self.staged.mutations);
        self.outputs.events.append(&mut self.staged.events);

        start_pending(
            &mut self.carousels,
            &mut self.starting,
            &mut self.timers,
            &mut self.outputs,
            now,
        );

        for command in inputs.commands {
            self.apply_command(command, now);
        }
        self.run_timers(now, doc);
        self.poll_visibility(now, doc);
        self.run_frame(now, doc);

        log::trace!(
            "update at {now} ms: {} mutations, {} events",
            self.outputs.mutations.len(),
            self.outputs.events.len()
        );
        &self.outputs
    }

    /// True while anything would change on a later update without new input.
    pub fn needs_frame(&self) -> bool {
        self.clock.has_pending()
            || self.scheduler.has_armed()
            || !self.timers.is_empty()
            || !self.starting.is_empty()
            || !self.staged.is_empty()
    }

    /// Cancel every timer, frame request and registration.
    pub fn teardown(&mut self) {
        let now = self.last_now.unwrap_or(0.0);
        for carousel in self.carousels.values_mut() {
            let mut ctx = CarouselCtx {
                now_ms: now,
                timers: &mut self.timers,
                out: &mut self.staged,
            };
            carousel.teardown(&mut ctx);
        }
        self.carousels.clear();
        self.starting.clear();
        self.timers.clear();
        self.scheduler.clear();
        self.clock.clear();
        self.counters.clear();
        self.parallax.clear();
        self.reveals.clear();
        self.staged.clear();
        log::debug!("page torn down");
    }

    fn clamp_now(&mut self, now_ms: f64) -> f64 {
        let last = self.last_now.unwrap_or(f64::NEG_INFINITY);
        let now = if now_ms.is_finite() {
            now_ms.max(last)
        } else {
            log::warn!("ignoring non-finite timestamp");
            self.last_now.unwrap_or(0.0)
        };
        self.last_now = Some(now);
        now
    }

    fn counter_observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: self.config.counter.threshold,
            root_margin_px: self.config.counter.root_margin_px,
            delay_ms: 0.0,
        }
    }

    fn invalidate_parallax(&mut self) {
        if self.parallax.invalidate() {
            self.clock.request(FrameKey::parallax());
        }
    }

    fn apply_command(&mut self, command: PageCommand, now: f64) {
        match command {
            PageCommand::Scroll { y } => {
                if !y.is_finite() {
                    log::warn!("ignoring non-finite scroll offset");
                    return;
                }
                if let Some(scrolled) = self.scroll.update(y) {
                    self.toggle_scroll_state(scrolled);
                }
                self.viewport.scroll_y = y;
                self.scheduler.set_viewport(self.viewport, now);
                self.invalidate_parallax();
            }
            PageCommand::PointerMove { x, y } => {
                if self.pointer.update(x, y) {
                    self.invalidate_parallax();
                }
            }
            PageCommand::PointerLeave => {
                if self.pointer.leave() {
                    self.invalidate_parallax();
                }
            }
            PageCommand::Resize { width, height } => {
                if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
                    log::warn!("ignoring invalid viewport size {width}x{height}");
                    return;
                }
                self.viewport.width = width;
                self.viewport.height = height;
                self.scheduler.set_viewport(self.viewport, now);
                self.invalidate_parallax();
            }
            PageCommand::Layout { rects } => {
                for entry in &rects {
                    self.parallax.set_rect(&entry.target, entry.rect);
                }
                self.scheduler.sample_layout(
                    self.viewport,
                    rects.iter().map(|r| (r.target.as_str(), r.rect)),
                    now,
                );
                self.invalidate_parallax();
            }
            PageCommand::Intersections { entries } => {
                for entry in entries {
                    self.scheduler.report_ratio(&entry.target, entry.ratio, now);
                }
            }
            PageCommand::Carousel { carousel, intent } => {
                let Some(c) = self.carousels.get_mut(&carousel) else {
                    log::warn!("intent for unknown carousel {:?}", carousel);
                    return;
                };
                let mut ctx = CarouselCtx {
                    now_ms: now,
                    timers: &mut self.timers,
                    out: &mut self.outputs,
                };
                c.handle(&intent, &mut ctx);
            }
            PageCommand::Detach { target } => {
                if self.forget(&target) {
                    self.outputs.push_event(PageEvent::TargetDropped {
                        target,
                        reason: DropReason::Detached,
                    });
                }
            }
        }
    }

    fn toggle_scroll_state(&mut self, scrolled: bool) {
        let state = &self.config.scroll_state;
        if let Some(target) = state.target.as_deref() {
            if scrolled {
                self.outputs.add_class(target, &state.class);
            } else {
                self.outputs.remove_class(target, &state.class);
            }
        }
        self.outputs
            .push_event(PageEvent::ScrollStateChanged { scrolled });
    }

    fn run_timers(&mut self, now: f64, doc: &dyn Document) {
        for (timer, id) in self.timers.drain_due(now) {
            let Some(carousel) = self.carousels.get_mut(&id) else {
                continue;
            };
            let mut ctx = CarouselCtx {
                now_ms: now,
                timers: &mut self.timers,
                out: &mut self.outputs,
            };
            if doc.is_connected(carousel.container()) {
                carousel.on_timer(timer, &mut ctx);
            } else {
                carousel.teardown(&mut ctx);
                let target = carousel.container().to_string();
                self.carousels.shift_remove(&id);
                log::debug!("carousel {:?} container {target} detached", id);
                self.outputs.push_event(PageEvent::TargetDropped {
                    target,
                    reason: DropReason::Detached,
                });
            }
        }
    }

    fn poll_visibility(&mut self, now: f64, doc: &dyn Document) {
        let result = self.scheduler.poll(now, doc);
        let instant = self.config.environment.reduced_motion;
        for fired in result.fired {
            match fired.payload {
                Trigger::Reveal => {
                    self.reveals.fire(&fired.target, &mut self.outputs);
                }
                Trigger::Counter => {
                    self.counters.start(
                        &fired.target,
                        now,
                        instant,
                        &mut self.outputs,
                        &mut self.clock,
                    );
                }
            }
        }
        for target in result.dropped {
            self.reveals.remove(&target);
            self.counters.remove(&target, &mut self.clock);
            self.outputs.push_event(PageEvent::TargetDropped {
                target,
                reason: DropReason::Detached,
            });
        }
    }

    fn run_frame(&mut self, now: f64, doc: &dyn Document) {
        if !self.clock.has_pending() {
            return;
        }
        let tick = self.clock.begin_frame(now);
        for key in tick.keys {
            match (key.channel, key.target) {
                (FrameChannel::Counter, Some(target)) => {
                    if doc.is_connected(&target) {
                        self.counters
                            .step(&target, now, &mut self.outputs, &mut self.clock);
                    } else {
                        self.counters.remove(&target, &mut self.clock);
                        log::debug!("counter {target} detached mid-run");
                        self.outputs.push_event(PageEvent::TargetDropped {
                            target,
                            reason: DropReason::Detached,
                        });
                    }
                }
                (FrameChannel::Counter, None) => {}
                (FrameChannel::Parallax, _) => {
                    let frame = SignalFrame {
                        scroll_y: self.scroll.y,
                        pointer: self.pointer.position,
                        viewport: &self.viewport,
                    };
                    let result = self.parallax.apply(now, &frame, doc, &mut self.outputs);
                    if result.retry {
                        self.clock.request(FrameKey::parallax());
                    }
                    for target in result.dropped {
                        self.outputs.push_event(PageEvent::TargetDropped {
                            target,
                            reason: DropReason::Detached,
                        });
                    }
                }
            }
        }
    }

    /// Remove `target` from every component. Carousels are matched by container.
    fn forget(&mut self, target: &str) -> bool {
        let mut removed = self.scheduler.unobserve(target);
        removed |= self.reveals.remove(target);
        removed |= self.counters.remove(target, &mut self.clock);
        removed |= self.parallax.remove(target);

        let now = self.last_now.unwrap_or(0.0);
        let owned: Vec<CarouselId> = self
            .carousels
            .iter()
            .filter(|(_, c)| c.container() == target)
            .map(|(id, _)| *id)
            .collect();
        for id in owned {
            if let Some(mut carousel) = self.carousels.shift_remove(&id) {
                let mut ctx = CarouselCtx {
                    now_ms: now,
                    timers: &mut self.timers,
                    out: &mut self.staged,
                };
                carousel.teardown(&mut ctx);
                self.starting.retain(|s| *s != id);
                removed = true;
            }
        }
        removed
    }
}

/// Present carousels created since the last update and arm their timers.
fn start_pending(
    carousels: &mut IndexMap<CarouselId, Carousel>,
    starting: &mut Vec<CarouselId>,
    timers: &mut TimerQueue<CarouselId>,
    out: &mut Outputs,
    now: f64,
) {
    for id in starting.drain(..) {
        if let Some(carousel) = carousels.get_mut(&id) {
            let mut ctx = CarouselCtx {
                now_ms: now,
                timers: &mut *timers,
                out: &mut *out,
            };
            carousel.start(&mut ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AlwaysConnected;
    use crate::geometry::Rect;
    use crate::inputs::{IntersectionEntry, TargetRect};
    use crate::outputs::Mutation;

    fn visible(target: &str) -> Inputs {
        Inputs::new().with(PageCommand::Intersections {
            entries: vec![IntersectionEntry {
                target: target.into(),
                ratio: 1.0,
            }],
        })
    }

    #[test]
    fn time_is_clamped_monotonic() {
        let mut page = Page::default();
        page.update(100.0, Inputs::new(), &AlwaysConnected);
        page.update(50.0, Inputs::new(), &AlwaysConnected);
        assert_eq!(page.last_now, Some(100.0));
        page.update(f64::NAN, Inputs::new(), &AlwaysConnected);
        assert_eq!(page.last_now, Some(100.0));
    }

    #[test]
    fn counter_and_reveal_conflict_on_one_target() {
        let mut page = Page::default();
        page.register_reveal("#x", &RevealConfig::default()).unwrap();
        let err = page
            .register_counter("#x", CounterConfig::new(10.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, ScrollcueError::DuplicateTarget { .. }));
        assert!(!page.counters().contains("#x"));
    }

    #[test]
    fn scroll_state_toggles_nav_class() {
        let mut config = Config::default();
        config.scroll_state.target = Some("#nav".into());
        let mut page = Page::new(config);
        let out = page.update(
            0.0,
            Inputs::new().with(PageCommand::Scroll { y: 120.0 }),
            &AlwaysConnected,
        );
        assert!(out.mutations.contains(&Mutation::AddClass {
            target: "#nav".into(),
            class: "scrolled".into()
        }));
        assert!(out
            .events
            .contains(&PageEvent::ScrollStateChanged { scrolled: true }));
    }

    #[test]
    fn layout_drives_visibility() {
        let mut page = Page::default();
        page.register_reveal("#card", &RevealConfig::default()).unwrap();
        let below = Inputs::new().with(PageCommand::Layout {
            rects: vec![TargetRect {
                target: "#card".into(),
                rect: Rect::new(0.0, 2000.0, 300.0, 200.0),
            }],
        });
        assert!(page.update(0.0, below, &AlwaysConnected).events.is_empty());
        let out = page.update(
            16.0,
            Inputs::new().with(PageCommand::Scroll { y: 1500.0 }),
            &AlwaysConnected,
        );
        assert!(out.events.contains(&PageEvent::Revealed {
            target: "#card".into()
        }));
    }

    #[test]
    fn rearm_runs_counter_again() {
        let mut page = Page::default();
        page.register_counter("#n", CounterConfig::new(5.0, 100.0)).unwrap();
        page.update(0.0, visible("#n"), &AlwaysConnected);
        page.update(200.0, Inputs::new(), &AlwaysConnected);
        assert!(!page.needs_frame());
        assert!(page.rearm_counter("#n").unwrap());
        assert!(page.scheduler().is_observing("#n"));
        let out = page.update(300.0, visible("#n"), &AlwaysConnected);
        assert!(out.events.contains(&PageEvent::CounterStarted {
            target: "#n".into()
        }));
    }

    #[test]
    fn detach_cancels_counter_without_write() {
        let mut page = Page::default();
        page.register_counter("#n", CounterConfig::new(100.0, 1000.0)).unwrap();
        page.update(0.0, visible("#n"), &AlwaysConnected);
        let gone = |t: &str| t != "#n";
        let out = page.update(16.0, Inputs::new(), &gone);
        assert!(out.mutations.is_empty());
        assert!(out.events.contains(&PageEvent::TargetDropped {
            target: "#n".into(),
            reason: DropReason::Detached
        }));
        assert!(!page.needs_frame());
    }

    #[test]
    fn carousel_starts_on_next_update() {
        let mut page = Page::default();
        let id = page
            .create_carousel(CarouselConfig::new("#c", ["#a", "#b"]))
            .unwrap();
        assert!(page.timers().is_empty());
        assert!(page.needs_frame());
        let out = page.update(1000.0, Inputs::new(), &AlwaysConnected);
        assert!(out.mutations.contains(&Mutation::AddClass {
            target: "#a".into(),
            class: "active".into()
        }));
        let timer = page.carousel(id).and_then(|c| c.timer()).unwrap();
        assert_eq!(page.timers().due_time(timer), Some(6000.0));
    }

    #[test]
    fn unknown_carousel_intent_is_an_error() {
        let mut page = Page::default();
        let err = page
            .carousel_intent(CarouselId(9), &CarouselIntent::Next, 0.0)
            .unwrap_err();
        assert_eq!(err, ScrollcueError::CarouselNotFound { id: 9 });
    }

    #[test]
    fn teardown_clears_everything() {
        let mut page = Page::default();
        page.register_reveal("#r", &RevealConfig::default()).unwrap();
        page.register_parallax("#p", ParallaxBinding::scroll(0.5)).unwrap();
        page.create_carousel(CarouselConfig::new("#c", ["#a", "#b"])).unwrap();
        page.update(0.0, Inputs::new(), &AlwaysConnected);
        page.teardown();
        assert!(!page.needs_frame());
        assert!(page.timers().is_empty());
        assert!(page.scheduler().is_empty());
    }

    #[test]
    fn remove_target_reports_on_next_update() {
        let mut page = Page::default();
        page.register_reveal("#r", &RevealConfig::default()).unwrap();
        assert!(page.remove_target("#r"));
        assert!(!page.remove_target("#r"));
        let out = page.update(0.0, visible("#r"), &AlwaysConnected);
        assert_eq!(
            out.events,
            vec![PageEvent::TargetDropped {
                target: "#r".into(),
                reason: DropReason::Removed
            }]
        );
        assert!(out.mutations.is_empty());
    }
}
