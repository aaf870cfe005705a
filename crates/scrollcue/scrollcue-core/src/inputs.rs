//! Input contracts for the page orchestrator.
//!
//! The host collects DOM events between frames and passes them to
//! Page::update() as a list of commands, applied in order.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::ids::{CarouselId, TargetHandle};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub commands: Vec<PageCommand>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: PageCommand) -> Self {
        self.commands.push(command);
        self
    }
}

impl From<Vec<PageCommand>> for Inputs {
    fn from(commands: Vec<PageCommand>) -> Self {
        Self { commands }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageCommand {
    /// Vertical scroll offset of the page.
    Scroll { y: f64 },
    /// Pointer position in client coordinates.
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    /// Viewport size changed.
    Resize { width: f64, height: f64 },
    /// Document-space boxes for registered targets.
    Layout { rects: Vec<TargetRect> },
    /// Ratios reported by a native intersection observer.
    Intersections { entries: Vec<IntersectionEntry> },
    Carousel {
        carousel: CarouselId,
        intent: CarouselIntent,
    },
    /// Element removed from the document.
    Detach { target: TargetHandle },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetRect {
    pub target: TargetHandle,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: TargetHandle,
    pub ratio: f64,
}

/// Navigation and interaction intents a carousel accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarouselIntent {
    Next,
    Prev,
    GoTo { index: usize },
    PointerEnter,
    PointerLeave,
    FocusIn,
    FocusOut,
    TouchStart { x: f64, y: f64 },
    TouchEnd { x: f64, y: f64 },
    /// `touchcancel`: the gesture ends without navigating.
    TouchCancel,
    Key { key: Key },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` string.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            _ => Self::Other,
        }
    }
}
