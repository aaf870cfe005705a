//! Declarative page description loaded once at page initialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::carousel::CarouselConfig;
use crate::ids::{CarouselId, TargetHandle};
use crate::parallax::{ParallaxBinding, ParallaxRegistration};
use crate::reveal::RevealConfig;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageManifest {
    pub reveals: Vec<RevealEntry>,
    pub reveal_groups: Vec<RevealGroupEntry>,
    pub counters: Vec<CounterEntry>,
    pub parallax: Vec<ParallaxEntry>,
    pub carousels: Vec<CarouselConfig>,
}

impl PageManifest {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealEntry {
    pub target: TargetHandle,
    #[serde(default)]
    pub config: RevealConfig,
}

/// Siblings revealed in sequence; each gets its position as stagger index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealGroupEntry {
    pub targets: Vec<TargetHandle>,
    #[serde(default)]
    pub config: RevealConfig,
}

/// A counter as the markup declares it: raw `data-*` attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterEntry {
    pub target: TargetHandle,
    pub dataset: IndexMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallaxEntry {
    pub target: TargetHandle,
    pub binding: ParallaxBinding,
}

/// What `Page::load_manifest` registered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestHandles {
    pub reveals: usize,
    pub counters: usize,
    pub parallax: Vec<(TargetHandle, ParallaxRegistration)>,
    pub carousels: Vec<CarouselId>,
}
