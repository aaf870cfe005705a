use std::collections::BTreeMap;

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use scrollcue_core::{
    CarouselConfig, CarouselId, CarouselIntent, Config, CounterConfig, Document, Inputs, Outputs,
    Page, PageManifest, ParallaxBinding, RevealConfig,
};

#[wasm_bindgen]
pub struct ScrollcuePage {
    core: Page,
    doc: JsDocument,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Parse an optional JS value, falling back to `T::default()`.
fn from_optional<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> Result<T, JsError> {
    if jsvalue_is_undefined_or_null(&value) {
        Ok(T::default())
    } else {
        swb::from_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
    }
}

fn from_required<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsError> {
    if jsvalue_is_undefined_or_null(&value) {
        return Err(JsError::new(&format!("{what}: value is null/undefined")));
    }
    swb::from_value(value).map_err(|e| JsError::new(&format!("{what} parse error: {e}")))
}

fn core_error(context: &str, err: scrollcue_core::ScrollcueError) -> JsError {
    JsError::new(&format!("{context}: {err}"))
}

/// Connectivity checks answered by an optional JS callback
/// `isConnected(target: string) -> boolean`. Without one every target counts
/// as connected.
///
/// Non-boolean results are read by JS truthiness, so a resolver may return
/// `document.querySelector(target)` directly. A throwing resolver says
/// nothing about the element: the target is kept as connected and the
/// error is logged.
#[derive(Default)]
struct JsDocument {
    f: Option<Function>,
}

impl Document for JsDocument {
    fn is_connected(&self, target: &str) -> bool {
        let Some(f) = &self.f else {
            return true;
        };
        match f.call1(&JsValue::UNDEFINED, &JsValue::from_str(target)) {
            Ok(val) => val.as_bool().unwrap_or_else(|| val.is_truthy()),
            Err(err) => {
                log::warn!("isConnected({target}) threw {err:?}; keeping target");
                true
            }
        }
    }
}

#[wasm_bindgen]
impl ScrollcuePage {
    /// Create a page orchestrator. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new ScrollcuePage({ environment: { reduced_motion: true } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ScrollcuePage, JsError> {
        console_error_panic_hook::set_once();
        let cfg: Config = from_optional(config, "config")?;
        Ok(ScrollcuePage {
            core: Page::new(cfg),
            doc: JsDocument::default(),
        })
    }

    /// Install `isConnected(target) -> boolean`, consulted before every write.
    #[wasm_bindgen(js_name = set_connected_resolver)]
    pub fn set_connected_resolver(&mut self, resolver: Function) {
        self.doc.f = Some(resolver);
    }

    #[wasm_bindgen(js_name = register_reveal)]
    pub fn register_reveal(&mut self, target: String, cfg: JsValue) -> Result<(), JsError> {
        let cfg: RevealConfig = from_optional(cfg, "reveal config")?;
        self.core
            .register_reveal(&target, &cfg)
            .map_err(|e| core_error("register_reveal", e))
    }

    /// Register sibling targets (array of strings) with stagger by position.
    #[wasm_bindgen(js_name = register_reveal_group)]
    pub fn register_reveal_group(
        &mut self,
        targets: JsValue,
        cfg: JsValue,
    ) -> Result<u32, JsError> {
        let targets: Vec<String> = from_required(targets, "reveal group targets")?;
        let cfg: RevealConfig = from_optional(cfg, "reveal config")?;
        let n = self
            .core
            .register_reveal_group(targets.as_slice(), &cfg)
            .map_err(|e| core_error("register_reveal_group", e))?;
        Ok(n as u32)
    }

    /// Register a counter from a typed config object.
    #[wasm_bindgen(js_name = register_counter)]
    pub fn register_counter(&mut self, target: String, cfg: JsValue) -> Result<(), JsError> {
        let cfg: CounterConfig = from_required(cfg, "counter config")?;
        self.core
            .register_counter(&target, cfg)
            .map_err(|e| core_error("register_counter", e))
    }

    /// Register a counter from an element's `dataset` (string map).
    #[wasm_bindgen(js_name = register_counter_from_dataset)]
    pub fn register_counter_from_dataset(
        &mut self,
        target: String,
        dataset: JsValue,
    ) -> Result<(), JsError> {
        let attrs: BTreeMap<String, String> = from_required(dataset, "counter dataset")?;
        self.core
            .register_counter_from_dataset(&target, &attrs)
            .map_err(|e| core_error("register_counter_from_dataset", e))
    }

    #[wasm_bindgen(js_name = rearm_counter)]
    pub fn rearm_counter(&mut self, target: String) -> Result<bool, JsError> {
        self.core
            .rearm_counter(&target)
            .map_err(|e| core_error("rearm_counter", e))
    }

    /// Returns "active", "inert" or "skipped".
    #[wasm_bindgen(js_name = register_parallax)]
    pub fn register_parallax(
        &mut self,
        target: String,
        binding: JsValue,
    ) -> Result<JsValue, JsError> {
        let binding: ParallaxBinding = from_required(binding, "parallax binding")?;
        let registration = self
            .core
            .register_parallax(&target, binding)
            .map_err(|e| core_error("register_parallax", e))?;
        swb::to_value(&registration).map_err(|e| JsError::new(&format!("registration error: {e}")))
    }

    /// Returns the carousel id (u32).
    #[wasm_bindgen(js_name = create_carousel)]
    pub fn create_carousel(&mut self, cfg: JsValue) -> Result<u32, JsError> {
        let cfg: CarouselConfig = from_required(cfg, "carousel config")?;
        let id = self
            .core
            .create_carousel(cfg)
            .map_err(|e| core_error("create_carousel", e))?;
        Ok(id.0)
    }

    /// Apply a carousel intent straight from an event handler, e.g.
    /// `carousel_intent(id, { kind: "next" }, performance.now())`.
    #[wasm_bindgen(js_name = carousel_intent)]
    pub fn carousel_intent(
        &mut self,
        carousel: u32,
        intent: JsValue,
        now_ms: f64,
    ) -> Result<(), JsError> {
        let intent: CarouselIntent = from_required(intent, "carousel intent")?;
        self.core
            .carousel_intent(CarouselId(carousel), &intent, now_ms)
            .map_err(|e| core_error("carousel_intent", e))
    }

    #[wasm_bindgen(js_name = remove_target)]
    pub fn remove_target(&mut self, target: String) -> bool {
        self.core.remove_target(&target)
    }

    /// Register a whole page manifest. Returns ManifestHandles JSON.
    #[wasm_bindgen(js_name = load_manifest)]
    pub fn load_manifest(&mut self, manifest: JsValue) -> Result<JsValue, JsError> {
        let manifest: PageManifest = from_required(manifest, "manifest")?;
        let handles = self
            .core
            .load_manifest(&manifest)
            .map_err(|e| core_error("load_manifest", e))?;
        swb::to_value(&handles).map_err(|e| JsError::new(&format!("handles error: {e}")))
    }

    /// Advance to `now_ms` (e.g. a requestAnimationFrame timestamp) with inputs JSON.
    /// Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, now_ms: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = from_optional(inputs_json, "inputs")?;
        let out: &Outputs = self.core.update(now_ms, inputs, &self.doc);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Whether the host should keep requesting animation frames.
    #[wasm_bindgen(js_name = needs_frame)]
    pub fn needs_frame(&self) -> bool {
        self.core.needs_frame()
    }

    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        self.core.teardown();
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
