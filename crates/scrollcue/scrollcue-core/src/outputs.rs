//! Output contracts from the page orchestrator.
//!
//! Outputs carry the presentation mutations for this update, keyed by
//! TargetHandle, and a separate list of semantic events. The host applies
//! all mutations of one update as a single batch.

use serde::{Deserialize, Serialize};

use crate::ids::{CarouselId, TargetHandle};

/// One side effect on an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    SetText {
        target: TargetHandle,
        text: String,
    },
    SetTransform {
        target: TargetHandle,
        transform: String,
    },
    AddClass {
        target: TargetHandle,
        class: String,
    },
    RemoveClass {
        target: TargetHandle,
        class: String,
    },
}

impl Mutation {
    pub fn target(&self) -> &str {
        match self {
            Self::SetText { target, .. }
            | Self::SetTransform { target, .. }
            | Self::AddClass { target, .. }
            | Self::RemoveClass { target, .. } => target,
        }
    }
}

/// What moved a carousel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavCause {
    Autoplay,
    Button,
    Dot,
    Keyboard,
    Swipe,
}

/// Why a carousel stopped auto-advancing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseCause {
    Hover,
    Touch,
    Focus,
}

/// Why a registration was dropped without running.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Detached,
    Removed,
}

/// Discrete semantic signals emitted during an update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PageEvent {
    Revealed {
        target: TargetHandle,
    },
    CounterStarted {
        target: TargetHandle,
    },
    CounterCompleted {
        target: TargetHandle,
        value: f64,
    },
    SlideChanged {
        carousel: CarouselId,
        from: usize,
        to: usize,
        cause: NavCause,
    },
    CarouselPaused {
        carousel: CarouselId,
        cause: PauseCause,
    },
    CarouselResumed {
        carousel: CarouselId,
    },
    ScrollStateChanged {
        scrolled: bool,
    },
    TargetDropped {
        target: TargetHandle,
        reason: DropReason,
    },
}

/// Outputs returned by Page::update().
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub mutations: Vec<Mutation>,
    #[serde(default)]
    pub events: Vec<PageEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.mutations.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    #[inline]
    pub fn push_event(&mut self, event: PageEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.events.is_empty()
    }

    pub fn set_text(&mut self, target: &str, text: String) {
        self.push(Mutation::SetText {
            target: target.to_string(),
            text,
        });
    }

    pub fn set_transform(&mut self, target: &str, transform: String) {
        self.push(Mutation::SetTransform {
            target: target.to_string(),
            transform,
        });
    }

    pub fn add_class(&mut self, target: &str, class: &str) {
        self.push(Mutation::AddClass {
            target: target.to_string(),
            class: class.to_string(),
        });
    }

    pub fn remove_class(&mut self, target: &str, class: &str) {
        self.push(Mutation::RemoveClass {
            target: target.to_string(),
            class: class.to_string(),
        });
    }

    /// Number of transform writes in this batch.
    pub fn transform_count(&self) -> usize {
        self.mutations
            .iter()
            .filter(|m| matches!(m, Mutation::SetTransform { .. }))
            .count()
    }
}
