//! Reveal binder: sequences when CSS-driven reveal transitions start.
//!
//! Computes per-element stagger delays at registration, observes each
//! element and adds the reveal class when it fires. No per-frame work.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::RevealDefaults;
use crate::error::{ensure_finite, ScrollcueError};
use crate::ids::TargetHandle;
use crate::outputs::{Outputs, PageEvent};
use crate::page::Trigger;
use crate::visibility::{ObserveOptions, VisibilityScheduler};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold_fraction: f64,
    pub root_margin_px: f64,
    pub delay_seconds: f64,
    pub stagger_index: u32,
    /// Overrides the page's reveal class.
    pub class: Option<String>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.1,
            root_margin_px: 0.0,
            delay_seconds: 0.0,
            stagger_index: 0,
            class: None,
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold_fraction > 0.0 && self.threshold_fraction <= 1.0) {
            return Err(ScrollcueError::InvalidThreshold {
                threshold: self.threshold_fraction,
            });
        }
        ensure_finite("root_margin_px", self.root_margin_px)?;
        if !(self.delay_seconds.is_finite() && self.delay_seconds >= 0.0) {
            return Err(ScrollcueError::InvalidDelay {
                delay_seconds: self.delay_seconds,
            });
        }
        Ok(())
    }

    /// `delay + stagger_index * increment`, in milliseconds.
    pub fn delay_ms(&self, stagger_increment_ms: f64) -> f64 {
        self.delay_seconds * 1000.0 + self.stagger_index as f64 * stagger_increment_ms
    }

    fn observe_options(&self, stagger_increment_ms: f64) -> ObserveOptions {
        ObserveOptions {
            threshold: self.threshold_fraction,
            root_margin_px: self.root_margin_px,
            delay_ms: self.delay_ms(stagger_increment_ms),
        }
    }
}

#[derive(Debug)]
pub struct RevealBinder {
    defaults: RevealDefaults,
    /// Class to add per pending target.
    classes: HashMap<TargetHandle, String>,
}

impl RevealBinder {
    pub fn new(defaults: RevealDefaults) -> Self {
        Self {
            defaults,
            classes: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        target: &str,
        cfg: &RevealConfig,
        scheduler: &mut VisibilityScheduler<Trigger>,
    ) -> Result<()> {
        cfg.validate()?;
        let increment = self.defaults.stagger_increment_ms;
        scheduler.observe(target, cfg.observe_options(increment), Trigger::Reveal)?;
        let class = cfg
            .class
            .clone()
            .unwrap_or_else(|| self.defaults.class.clone());
        log::debug!(
            "reveal {target} delay={}ms class={class}",
            cfg.delay_ms(increment)
        );
        self.classes.insert(target.to_string(), class);
        Ok(())
    }

    /// Register siblings; each gets `stagger_index` = its position.
    /// Nothing is registered if any target is rejected.
    pub fn register_group<S: AsRef<str>>(
        &mut self,
        targets: &[S],
        base: &RevealConfig,
        scheduler: &mut VisibilityScheduler<Trigger>,
    ) -> Result<usize> {
        base.validate()?;
        for (i, target) in targets.iter().enumerate() {
            let target = target.as_ref();
            crate::error::ensure_target(target)?;
            let duplicate_in_group = targets[..i].iter().any(|t| t.as_ref() == target);
            if scheduler.is_observing(target) || duplicate_in_group {
                return Err(ScrollcueError::DuplicateTarget {
                    target: target.to_string(),
                });
            }
        }
        for (i, target) in targets.iter().enumerate() {
            let cfg = RevealConfig {
                stagger_index: i as u32,
                ..base.clone()
            };
            self.register(target.as_ref(), &cfg, scheduler)?;
        }
        Ok(targets.len())
    }

    /// Apply the reveal presentation. Returns false for unknown targets.
    pub fn fire(&mut self, target: &str, out: &mut Outputs) -> bool {
        let Some(class) = self.classes.remove(target) else {
            return false;
        };
        out.add_class(target, &class);
        out.push_event(PageEvent::Revealed {
            target: target.to_string(),
        });
        true
    }

    pub fn remove(&mut self, target: &str) -> bool {
        self.classes.remove(target).is_some()
    }

    pub fn is_pending(&self, target: &str) -> bool {
        self.classes.contains_key(target)
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AlwaysConnected;

    #[test]
    fn group_delays_follow_sibling_index() {
        let mut binder = RevealBinder::new(RevealDefaults::default());
        let mut sched = VisibilityScheduler::new();
        let base = RevealConfig {
            delay_seconds: 0.2,
            ..Default::default()
        };
        binder
            .register_group(&["#f0", "#f1", "#f2"], &base, &mut sched)
            .unwrap();
        for t in ["#f0", "#f1", "#f2"] {
            sched.report_ratio(t, 1.0, 0.0);
        }
        let at = |sched: &mut VisibilityScheduler<Trigger>, now: f64| {
            sched
                .poll(now, &AlwaysConnected)
                .fired
                .into_iter()
                .map(|f| f.target)
                .collect::<Vec<_>>()
        };
        assert!(at(&mut sched, 199.0).is_empty());
        assert_eq!(at(&mut sched, 200.0), vec!["#f0"]);
        assert_eq!(at(&mut sched, 300.0), vec!["#f1"]);
        assert_eq!(at(&mut sched, 400.0), vec!["#f2"]);
    }

    #[test]
    fn group_is_all_or_nothing() {
        let mut binder = RevealBinder::new(RevealDefaults::default());
        let mut sched = VisibilityScheduler::new();
        binder
            .register("#b", &RevealConfig::default(), &mut sched)
            .unwrap();
        let err = binder
            .register_group(&["#a", "#b"], &RevealConfig::default(), &mut sched)
            .unwrap_err();
        assert!(matches!(err, ScrollcueError::DuplicateTarget { .. }));
        assert!(!sched.is_observing("#a"));
    }

    #[test]
    fn fire_adds_class_once() {
        let mut binder = RevealBinder::new(RevealDefaults::default());
        let mut sched = VisibilityScheduler::new();
        let cfg = RevealConfig {
            class: Some("revealed".into()),
            ..Default::default()
        };
        binder.register("#x", &cfg, &mut sched).unwrap();
        let mut out = Outputs::default();
        assert!(binder.fire("#x", &mut out));
        assert!(!binder.fire("#x", &mut out));
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(
            out.mutations[0],
            crate::outputs::Mutation::AddClass {
                target: "#x".into(),
                class: "revealed".into()
            }
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = RevealConfig {
            delay_seconds: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ScrollcueError::InvalidDelay { .. })
        ));
        let cfg = RevealConfig {
            threshold_fraction: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
