//! Identifiers and simple allocators for page-owned entities.

use serde::{Deserialize, Serialize};

/// Opaque element handle supplied by the host (selector, id, or key).
pub type TargetHandle = String;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CarouselId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Monotonic allocator for CarouselId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_carousel: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_carousel(&mut self) -> CarouselId {
        let id = CarouselId(self.next_carousel);
        self.next_carousel = self.next_carousel.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
