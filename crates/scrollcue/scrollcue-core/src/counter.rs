//! Numeric counters animated from a start value to a target.
//!
//! A run samples the host clock every frame, eases the progress and writes
//! the formatted value. Intermediate frames round toward the start value so
//! the visible sequence never goes backwards; the last frame writes the
//! exact target.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::CounterDefaults;
use crate::easing::{Easing, EasingCurve};
use crate::error::{ensure_target, ScrollcueError};
use crate::format::{format_value, FormatSpec, Rounding};
use crate::frame_clock::{FrameClock, FrameKey};
use crate::ids::TargetHandle;
use crate::outputs::{Outputs, PageEvent};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    pub target_value: f64,
    #[serde(default)]
    pub start_value: f64,
    pub duration_ms: f64,
    #[serde(default)]
    pub format: FormatSpec,
    #[serde(default)]
    pub easing: Easing,
}

impl CounterConfig {
    /// Counter to `target_value` over `duration_ms` with default formatting.
    pub fn new(target_value: f64, duration_ms: f64) -> Self {
        Self {
            target_value,
            start_value: 0.0,
            duration_ms,
            format: FormatSpec::default(),
            easing: Easing::default(),
        }
    }

    pub fn with_format(mut self, format: FormatSpec) -> Self {
        self.format = format;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for value in [self.target_value, self.start_value] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScrollcueError::InvalidCounterValue { value });
            }
        }
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(ScrollcueError::InvalidDuration {
                duration_ms: self.duration_ms,
            });
        }
        if self.format.decimals > 1 {
            return Err(ScrollcueError::InvalidDecimals {
                decimals: self.format.decimals,
            });
        }
        Ok(())
    }

    /// Parse `data-*` attributes once. Keys may carry the `data-` prefix.
    ///
    /// Recognised: `target` (required), `duration`, `decimals`, `prefix`,
    /// `suffix`, `abbreviate`, `grouping`, `easing`, `from`.
    pub fn from_dataset<I, K, V>(attrs: I, defaults: &CounterDefaults) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map: HashMap<String, String> = attrs
            .into_iter()
            .map(|(k, v)| {
                let k = k.as_ref();
                let k = k.strip_prefix("data-").unwrap_or(k);
                (k.to_ascii_lowercase(), v.as_ref().trim().to_string())
            })
            .collect();

        let raw_target = map
            .get("target")
            .ok_or_else(|| ScrollcueError::MissingAttribute {
                name: "target".into(),
            })?;
        let target_value = parse_number("target", raw_target)?;

        let decimals = match map.get("decimals") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ScrollcueError::attribute("decimals", raw, "expected 0 or 1"))?,
            None => {
                let digits = raw_target
                    .split_once('.')
                    .map(|(_, frac)| frac.len() as u32)
                    .unwrap_or(0);
                if digits > 1 {
                    return Err(ScrollcueError::attribute(
                        "target",
                        raw_target,
                        "at most one fractional digit",
                    ));
                }
                digits
            }
        };

        let duration_ms = match map.get("duration") {
            Some(raw) => parse_number("duration", raw)?,
            None => defaults.duration_ms,
        };
        let start_value = match map.get("from") {
            Some(raw) => parse_number("from", raw)?,
            None => 0.0,
        };
        let easing = match map.get("easing") {
            Some(raw) => Easing::from_name(raw)
                .ok_or_else(|| ScrollcueError::attribute("easing", raw, "unknown easing"))?,
            None => defaults.easing,
        };
        let format = FormatSpec {
            decimals,
            prefix: map.get("prefix").cloned().unwrap_or_default(),
            suffix: map.get("suffix").cloned().unwrap_or_default(),
            abbreviate: parse_flag(&map, "abbreviate")?,
            grouping: parse_flag(&map, "grouping")?,
        };

        let cfg = Self {
            target_value,
            start_value,
            duration_ms,
            format,
            easing,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Value shown `elapsed_ms` into a run (unrounded).
    pub fn value_at(&self, elapsed_ms: f64) -> f64 {
        self.value_with(&self.easing, elapsed_ms)
    }

    /// Value `elapsed_ms` into a run shaped by `curve` instead of `easing`.
    pub fn value_with(&self, curve: &dyn EasingCurve, elapsed_ms: f64) -> f64 {
        let progress = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.target_value;
        }
        let eased = curve.ease(progress);
        self.start_value + (self.target_value - self.start_value) * eased
    }

    /// Text shown `elapsed_ms` into a run.
    pub fn text_at(&self, elapsed_ms: f64) -> String {
        self.text_with(&self.easing, elapsed_ms)
    }

    pub fn text_with(&self, curve: &dyn EasingCurve, elapsed_ms: f64) -> String {
        if elapsed_ms >= self.duration_ms {
            return self.final_text();
        }
        let rounding = if self.target_value >= self.start_value {
            Rounding::Down
        } else {
            Rounding::Up
        };
        format_value(self.value_with(curve, elapsed_ms), &self.format, rounding)
    }

    pub fn final_text(&self) -> String {
        format_value(self.target_value, &self.format, Rounding::Nearest)
    }
}

fn parse_number(name: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| ScrollcueError::attribute(name, raw, "not a number"))?;
    if !value.is_finite() {
        return Err(ScrollcueError::attribute(name, raw, "not finite"));
    }
    Ok(value)
}

fn parse_flag(map: &HashMap<String, String>, name: &str) -> Result<bool> {
    match map.get(name).map(String::as_str) {
        None => Ok(false),
        Some("" | "true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ScrollcueError::attribute(name, other, "expected a boolean")),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CounterPhase {
    /// Registered, waiting to be started.
    Armed,
    Running { started_ms: f64 },
    Completed,
}

#[derive(Debug)]
struct CounterRun {
    cfg: CounterConfig,
    /// Overrides `cfg.easing` when set.
    curve: Option<Box<dyn EasingCurve>>,
    phase: CounterPhase,
    last_text: Option<String>,
}

impl CounterRun {
    fn text_at(&self, elapsed_ms: f64) -> String {
        match &self.curve {
            Some(curve) => self.cfg.text_with(curve.as_ref(), elapsed_ms),
            None => self.cfg.text_at(elapsed_ms),
        }
    }

    fn write(&mut self, target: &str, text: String, out: &mut Outputs) {
        if self.last_text.as_deref() != Some(text.as_str()) {
            out.set_text(target, text.clone());
            self.last_text = Some(text);
        }
    }

    fn complete(&mut self, target: &str, out: &mut Outputs) {
        self.write(target, self.cfg.final_text(), out);
        self.phase = CounterPhase::Completed;
        out.push_event(PageEvent::CounterCompleted {
            target: target.to_string(),
            value: self.cfg.target_value,
        });
        log::debug!("counter {target} completed at {}", self.cfg.target_value);
    }
}

#[derive(Debug, Default)]
pub struct CounterAnimator {
    runs: HashMap<TargetHandle, CounterRun>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: &str, cfg: CounterConfig) -> Result<()> {
        self.insert(target, cfg, None)
    }

    /// Register a counter whose run is shaped by `curve` rather than the
    /// config's built-in easing.
    pub fn register_with_curve(
        &mut self,
        target: &str,
        cfg: CounterConfig,
        curve: Box<dyn EasingCurve>,
    ) -> Result<()> {
        self.insert(target, cfg, Some(curve))
    }

    fn insert(
        &mut self,
        target: &str,
        cfg: CounterConfig,
        curve: Option<Box<dyn EasingCurve>>,
    ) -> Result<()> {
        ensure_target(target)?;
        cfg.validate()?;
        if self.runs.contains_key(target) {
            return Err(ScrollcueError::DuplicateTarget {
                target: target.to_string(),
            });
        }
        self.runs.insert(
            target.to_string(),
            CounterRun {
                cfg,
                curve,
                phase: CounterPhase::Armed,
                last_text: None,
            },
        );
        Ok(())
    }

    /// Start an armed counter. Returns false for running, completed or
    /// unknown targets. `instant` finishes the run in place.
    pub fn start(
        &mut self,
        target: &str,
        now_ms: f64,
        instant: bool,
        out: &mut Outputs,
        clock: &mut FrameClock,
    ) -> bool {
        let Some(run) = self.runs.get_mut(target) else {
            return false;
        };
        if run.phase != CounterPhase::Armed {
            return false;
        }
        out.push_event(PageEvent::CounterStarted {
            target: target.to_string(),
        });
        if instant || run.cfg.target_value == run.cfg.start_value {
            run.complete(target, out);
            return true;
        }
        run.phase = CounterPhase::Running { started_ms: now_ms };
        let text = run.text_at(0.0);
        run.write(target, text, out);
        clock.request(FrameKey::counter(target));
        true
    }

    /// Advance one frame. Re-requests a frame until the run completes.
    pub fn step(
        &mut self,
        target: &str,
        now_ms: f64,
        out: &mut Outputs,
        clock: &mut FrameClock,
    ) {
        let Some(run) = self.runs.get_mut(target) else {
            return;
        };
        let CounterPhase::Running { started_ms } = run.phase else {
            return;
        };
        let elapsed = (now_ms - started_ms).max(0.0);
        if elapsed >= run.cfg.duration_ms {
            run.complete(target, out);
        } else {
            let text = run.text_at(elapsed);
            run.write(target, text, out);
            clock.request(FrameKey::counter(target));
        }
    }

    /// Return a completed (or running) counter to `Armed` so it can run again.
    pub fn rearm(&mut self, target: &str, clock: &mut FrameClock) -> bool {
        match self.runs.get_mut(target) {
            Some(run) if run.phase != CounterPhase::Armed => {
                run.phase = CounterPhase::Armed;
                run.last_text = None;
                clock.cancel(&FrameKey::counter(target));
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, target: &str, clock: &mut FrameClock) -> bool {
        clock.cancel(&FrameKey::counter(target));
        self.runs.remove(target).is_some()
    }

    pub fn phase(&self, target: &str) -> Option<CounterPhase> {
        self.runs.get(target).map(|r| r.phase)
    }

    pub fn config(&self, target: &str) -> Option<&CounterConfig> {
        self.runs.get(target).map(|r| &r.cfg)
    }

    pub fn contains(&self, target: &str) -> bool {
        self.runs.contains_key(target)
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(out: &Outputs) -> Vec<String> {
        out.mutations
            .iter()
            .filter_map(|m| match m {
                crate::outputs::Mutation::SetText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(CounterConfig::new(-1.0, 1000.0).validate().is_err());
        assert!(CounterConfig::new(f64::NAN, 1000.0).validate().is_err());
        assert!(CounterConfig::new(f64::INFINITY, 1000.0).validate().is_err());
        assert!(CounterConfig::new(10.0, 0.0).validate().is_err());
        assert!(CounterConfig::new(0.0, 1000.0).validate().is_ok());
    }

    #[test]
    fn dataset_parsing() {
        let cfg = CounterConfig::from_dataset(
            [("data-target", "98.5"), ("data-suffix", "%"), ("data-easing", "expo")],
            &CounterDefaults::default(),
        )
        .unwrap();
        assert_eq!(cfg.target_value, 98.5);
        assert_eq!(cfg.format.decimals, 1);
        assert_eq!(cfg.format.suffix, "%");
        assert_eq!(cfg.easing, Easing::EaseOutExpo);
        assert_eq!(cfg.duration_ms, 2000.0);
    }

    #[test]
    fn dataset_fails_fast() {
        let defaults = CounterDefaults::default();
        let err = CounterConfig::from_dataset([("suffix", "+")], &defaults).unwrap_err();
        assert!(matches!(err, ScrollcueError::MissingAttribute { .. }));

        let err = CounterConfig::from_dataset([("target", "lots")], &defaults).unwrap_err();
        assert!(matches!(err, ScrollcueError::InvalidAttribute { .. }));

        let err = CounterConfig::from_dataset([("target", "-5")], &defaults).unwrap_err();
        assert!(matches!(err, ScrollcueError::InvalidCounterValue { .. }));

        let err = CounterConfig::from_dataset([("target", "1.25")], &defaults).unwrap_err();
        assert!(matches!(err, ScrollcueError::InvalidAttribute { .. }));

        let err =
            CounterConfig::from_dataset([("target", "10"), ("abbreviate", "maybe")], &defaults)
                .unwrap_err();
        assert!(matches!(err, ScrollcueError::InvalidAttribute { .. }));
    }

    #[test]
    fn zero_target_completes_on_start() {
        let mut a = CounterAnimator::new();
        let mut clock = FrameClock::new();
        let mut out = Outputs::default();
        a.register("#c", CounterConfig::new(0.0, 1000.0)).unwrap();
        assert!(a.start("#c", 0.0, false, &mut out, &mut clock));
        assert_eq!(a.phase("#c"), Some(CounterPhase::Completed));
        assert!(!clock.has_pending());
        assert_eq!(texts(&out), vec!["0".to_string()]);
    }

    #[test]
    fn completed_counter_does_not_restart_until_rearmed() {
        let mut a = CounterAnimator::new();
        let mut clock = FrameClock::new();
        let mut out = Outputs::default();
        a.register("#c", CounterConfig::new(50.0, 100.0)).unwrap();
        a.start("#c", 0.0, false, &mut out, &mut clock);
        a.step("#c", 100.0, &mut out, &mut clock);
        assert_eq!(a.phase("#c"), Some(CounterPhase::Completed));
        assert!(!a.start("#c", 200.0, false, &mut out, &mut clock));
        assert!(a.rearm("#c", &mut clock));
        assert!(a.start("#c", 300.0, false, &mut out, &mut clock));
    }

    #[test]
    fn falling_counter_is_non_increasing() {
        let mut cfg = CounterConfig::new(0.0, 1000.0);
        cfg.start_value = 100.0;
        let mut prev = f64::INFINITY;
        for i in 0..=100 {
            let shown: f64 = cfg.text_at(i as f64 * 10.0).parse().unwrap();
            assert!(shown <= prev);
            prev = shown;
        }
        assert_eq!(cfg.text_at(1000.0), "0");
    }

    fn step_at_half(t: f64) -> f64 {
        if t < 0.5 {
            0.0
        } else {
            1.0
        }
    }

    #[test]
    fn custom_curve_drives_the_run() {
        let mut a = CounterAnimator::new();
        let mut clock = FrameClock::new();
        let mut out = Outputs::default();
        let curve: fn(f64) -> f64 = step_at_half;
        a.register_with_curve("#c", CounterConfig::new(100.0, 1000.0), Box::new(curve))
            .unwrap();
        a.start("#c", 0.0, false, &mut out, &mut clock);
        a.step("#c", 100.0, &mut out, &mut clock);
        a.step("#c", 600.0, &mut out, &mut clock);
        a.step("#c", 1000.0, &mut out, &mut clock);
        // unchanged text at t=100 and at completion is not rewritten
        assert_eq!(texts(&out), vec!["0", "100"]);
        assert_eq!(a.phase("#c"), Some(CounterPhase::Completed));
    }

    #[test]
    fn instant_start_writes_final_value() {
        let mut a = CounterAnimator::new();
        let mut clock = FrameClock::new();
        let mut out = Outputs::default();
        a.register(
            "#c",
            CounterConfig::new(1200.0, 1000.0).with_format(FormatSpec::with_suffix("+")),
        )
        .unwrap();
        a.start("#c", 0.0, true, &mut out, &mut clock);
        assert_eq!(texts(&out), vec!["1200+".to_string()]);
        assert!(!clock.has_pending());
    }
}
