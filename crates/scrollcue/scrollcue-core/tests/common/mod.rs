#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};

use scrollcue_core::{
    CarouselId, CarouselIntent, Document, Inputs, IntersectionEntry, Mutation, Outputs, Page,
    PageCommand, PageEvent,
};

/// Applies mutation batches the way a browser host would, so tests can
/// inspect the presentation after every update.
#[derive(Debug, Default)]
pub struct Replay {
    pub classes: HashMap<String, BTreeSet<String>>,
    pub text: HashMap<String, String>,
    pub transforms: HashMap<String, String>,
    pub text_history: HashMap<String, Vec<String>>,
    pub events: Vec<PageEvent>,
}

impl Replay {
    pub fn apply(&mut self, out: &Outputs) {
        for m in &out.mutations {
            match m {
                Mutation::SetText { target, text } => {
                    self.text.insert(target.clone(), text.clone());
                    self.text_history
                        .entry(target.clone())
                        .or_default()
                        .push(text.clone());
                }
                Mutation::SetTransform { target, transform } => {
                    self.transforms.insert(target.clone(), transform.clone());
                }
                Mutation::AddClass { target, class } => {
                    self.classes
                        .entry(target.clone())
                        .or_default()
                        .insert(class.clone());
                }
                Mutation::RemoveClass { target, class } => {
                    if let Some(set) = self.classes.get_mut(target) {
                        set.remove(class);
                    }
                }
            }
        }
        self.events.extend(out.events.iter().cloned());
    }

    pub fn has_class(&self, target: &str, class: &str) -> bool {
        self.classes
            .get(target)
            .map(|s| s.contains(class))
            .unwrap_or(false)
    }

    pub fn count_with_class<S: AsRef<str>>(&self, targets: &[S], class: &str) -> usize {
        targets
            .iter()
            .filter(|t| self.has_class(t.as_ref(), class))
            .count()
    }

    pub fn history(&self, target: &str) -> Vec<String> {
        self.text_history.get(target).cloned().unwrap_or_default()
    }
}

/// Runs a page and replays every batch into a [`Replay`].
pub struct Harness {
    pub page: Page,
    pub dom: Replay,
    pub now: f64,
}

impl Harness {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            dom: Replay::default(),
            now: 0.0,
        }
    }

    pub fn step(&mut self, now: f64, commands: Vec<PageCommand>) -> Outputs {
        self.step_with(now, commands, &scrollcue_core::AlwaysConnected)
    }

    pub fn step_with(
        &mut self,
        now: f64,
        commands: Vec<PageCommand>,
        doc: &dyn Document,
    ) -> Outputs {
        self.now = now;
        let out = self.page.update(now, Inputs::from(commands), doc).clone();
        self.dom.apply(&out);
        out
    }

    /// Step in `dt` increments from the current time up to and including `until`.
    pub fn run_until(&mut self, until: f64, dt: f64) {
        let mut t = self.now;
        while t + dt <= until + 1e-9 {
            t += dt;
            self.step(t, Vec::new());
        }
    }

    pub fn intent(&mut self, now: f64, carousel: CarouselId, intent: CarouselIntent) -> Outputs {
        self.step(now, vec![PageCommand::Carousel { carousel, intent }])
    }
}

pub fn visible(target: &str, ratio: f64) -> PageCommand {
    PageCommand::Intersections {
        entries: vec![IntersectionEntry {
            target: target.to_string(),
            ratio,
        }],
    }
}

pub fn slide_changes(out: &Outputs) -> Vec<(usize, usize)> {
    out.events
        .iter()
        .filter_map(|e| match e {
            PageEvent::SlideChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}
