//! Scrollcue Core (engine-agnostic)
//!
//! Scroll-synchronized animation orchestration for landing pages: one-shot
//! visibility reveals with stagger delays, eased numeric counters, scroll-
//! and pointer-driven parallax transforms, and autoplaying interruptible
//! carousels. The host reports time, geometry, scroll, pointer and intent
//! through [`Page::update`] and applies the returned batch of mutations.

pub mod carousel;
pub mod config;
pub mod counter;
pub mod document;
pub mod easing;
pub mod error;
pub mod format;
pub mod frame_clock;
pub mod geometry;
pub mod ids;
pub mod inputs;
pub mod manifest;
pub mod outputs;
pub mod page;
pub mod parallax;
pub mod reveal;
pub mod signal;
pub mod timer;
pub mod visibility;

pub use carousel::{Carousel, CarouselConfig, CarouselCtx, CarouselPhase};
pub use config::{
    CarouselDefaults, Config, CounterDefaults, Environment, ParallaxDefaults, RevealDefaults,
    ScrollStateConfig,
};
pub use counter::{CounterAnimator, CounterConfig, CounterPhase};
pub use document::{AlwaysConnected, Document};
pub use easing::{Easing, EasingCurve};
pub use error::ScrollcueError;
pub use format::{format_value, FormatSpec, Rounding};
pub use frame_clock::{FrameChannel, FrameClock, FrameKey, FrameTick};
pub use geometry::{intersects, visible_fraction, Rect, Viewport};
pub use ids::{CarouselId, IdAllocator, TargetHandle, TimerId};
pub use inputs::{CarouselIntent, Inputs, IntersectionEntry, Key, PageCommand, TargetRect};
pub use manifest::{
    CounterEntry, ManifestHandles, PageManifest, ParallaxEntry, RevealEntry, RevealGroupEntry,
};
pub use outputs::{DropReason, Mutation, NavCause, Outputs, PageEvent, PauseCause};
pub use page::{Page, Trigger};
pub use parallax::{
    map_transform, ParallaxBinding, ParallaxMapper, ParallaxRegistration, SignalFrame,
    SignalSource, TransformTemplate,
};
pub use reveal::{RevealBinder, RevealConfig};
pub use signal::{PointerSignal, ScrollDirection, ScrollSignal};
pub use timer::TimerQueue;
pub use visibility::{Fired, ObserveOptions, PollResult, VisibilityScheduler};

/// Result type for scrollcue registration.
pub type Result<T> = core::result::Result<T, ScrollcueError>;
