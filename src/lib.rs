//! WebAssembly match-3 rules engine.
//!
//! The crate owns the gem grid and every rule that changes it: layout
//! generation, match and shape detection, special-gem detonation, gravity and
//! refill, deadlock reshuffle, hints and tap selection. Rendering lives on the
//! JavaScript side and talks to [`board::Board`] through visual commands and
//! completion tickets; see the `board` module docs for the phase cycle.
//!
//! Grids are row-major: `cells[row * cols + col]`.

pub mod board;
pub mod cascade;
pub mod config;
pub mod events;
pub mod grid;
pub mod hint;
pub mod input;
pub mod layout;
pub mod matching;
pub mod reshuffle;
pub mod resolver;
pub mod rng;
pub mod shapes;
pub mod types;

pub use board::{Board, CascadeState};
pub use config::{BoardConfig, Settings};
pub use events::{BoardEvent, VisualCommand, VisualOp};
pub use input::{InputError, TapOutcome};
pub use types::{Gem, GemId, GemKind, Pos, TypeGrid};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    use crate::board::Board;
    use crate::config::BoardConfig;
    use crate::input::{InputError, TapOutcome};
    use crate::types::{Gem, Pos};

    /// Routes the `log` facade to the browser console.
    struct ConsoleLogger;

    impl log::Log for ConsoleLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Info
        }

        fn log(&self, record: &log::Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&msg),
                log::Level::Warn => web_sys::console::warn_1(&msg),
                _ => web_sys::console::log_1(&msg),
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: ConsoleLogger = ConsoleLogger;

    /// Runs once when the module is instantiated.
    #[wasm_bindgen(start)]
    pub fn init() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }

    fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
        serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
    }

    fn set(obj: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
        js_sys::Reflect::set(obj, &key.into(), value).map(|_| ())
    }

    fn input_error(err: InputError) -> JsValue {
        js_sys::Error::new(&err.to_string()).into()
    }

    fn pair_to_js(pair: Option<(Gem, Gem)>) -> JsValue {
        match pair {
            Some((a, b)) => {
                let arr = js_sys::Array::new();
                arr.push(&to_js(&a));
                arr.push(&to_js(&b));
                arr.into()
            }
            None => JsValue::NULL,
        }
    }

    /// One board instance owned by the host page.
    #[wasm_bindgen]
    pub struct WasmBoard {
        inner: Board,
    }

    #[wasm_bindgen]
    impl WasmBoard {
        /// Build from a partial config object. Unreadable configs fall back to defaults.
        #[wasm_bindgen(constructor)]
        pub fn new(config: JsValue) -> WasmBoard {
            let config = if config.is_undefined() || config.is_null() {
                BoardConfig::default()
            } else {
                serde_wasm_bindgen::from_value(config).unwrap_or_else(|err| {
                    log::warn!("unreadable board config, using defaults: {err}");
                    BoardConfig::default()
                })
            };
            WasmBoard {
                inner: Board::new(&config),
            }
        }

        pub fn create(&mut self) {
            self.inner.create();
        }

        /// Returns `{ outcome, a?, b? }` or throws when the tap is rejected.
        pub fn tap(&mut self, row: usize, col: usize) -> Result<JsValue, JsValue> {
            let outcome = self.inner.tap(row, col).map_err(input_error)?;
            let obj = js_sys::Object::new();
            let (name, a, b) = match outcome {
                TapOutcome::Selected(id) => ("selected", Some(id), None),
                TapOutcome::Deselected(id) => ("deselected", Some(id), None),
                TapOutcome::Reselected { previous, current } => ("reselected", Some(previous), Some(current)),
                TapOutcome::SwapRequested(x, y) => ("swap", Some(x), Some(y)),
            };
            set(&obj, "outcome", &name.into())?;
            if let Some(a) = a {
                set(&obj, "a", &a.0.into())?;
            }
            if let Some(b) = b {
                set(&obj, "b", &b.0.into())?;
            }
            Ok(obj.into())
        }

        #[wasm_bindgen(js_name = "requestSwap")]
        pub fn request_swap(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<(), JsValue> {
            self.inner
                .request_swap(Pos::new(r1, c1), Pos::new(r2, c2))
                .map_err(input_error)
        }

        pub fn lock(&mut self) {
            self.inner.lock();
        }

        pub fn unlock(&mut self) {
            self.inner.unlock();
        }

        #[wasm_bindgen(js_name = "showHint")]
        pub fn show_hint(&mut self) -> bool {
            self.inner.show_hint()
        }

        #[wasm_bindgen(js_name = "clearHint")]
        pub fn clear_hint(&mut self) {
            self.inner.clear_hint();
        }

        /// Active hint as `[gemA, gemB]`, or `null`.
        #[wasm_bindgen(js_name = "hintPair")]
        pub fn hint_pair(&self) -> JsValue {
            pair_to_js(self.inner.hint_pair())
        }

        /// First available move as `[gemA, gemB]` without activating a hint.
        #[wasm_bindgen(js_name = "findHintPair")]
        pub fn find_hint_pair(&self) -> JsValue {
            pair_to_js(self.inner.find_hint_pair())
        }

        /// Array of `{ ticket, op, ... }` to animate. Report each via `complete`.
        #[wasm_bindgen(js_name = "takeCommands")]
        pub fn take_commands(&mut self) -> JsValue {
            to_js(&self.inner.take_commands())
        }

        pub fn complete(&mut self, ticket: u32) -> bool {
            self.inner.complete(ticket)
        }

        #[wasm_bindgen(js_name = "takeEvents")]
        pub fn take_events(&mut self) -> JsValue {
            to_js(&self.inner.take_events())
        }

        /// Resolve everything outstanding without animation.
        pub fn settle(&mut self) {
            self.inner.settle();
        }

        pub fn gems(&self) -> JsValue {
            to_js(&self.inner.gems())
        }

        /// Row-major type matrix, or `null` while the grid has holes.
        pub fn types(&self) -> JsValue {
            match self.inner.snapshot_types() {
                Some(types) => {
                    let arr = js_sys::Uint8Array::new_with_length(types.cells.len() as u32);
                    arr.copy_from(&types.cells);
                    arr.into()
                }
                None => JsValue::NULL,
            }
        }

        pub fn rows(&self) -> usize {
            self.inner.grid().rows
        }

        pub fn cols(&self) -> usize {
            self.inner.grid().cols
        }

        #[wasm_bindgen(js_name = "isBusy")]
        pub fn is_busy(&self) -> bool {
            self.inner.is_busy()
        }

        pub fn state(&self) -> JsValue {
            to_js(&self.inner.state())
        }

        #[wasm_bindgen(js_name = "cascadeDepth")]
        pub fn cascade_depth(&self) -> u32 {
            self.inner.cascade_depth()
        }

        /// `{ marginX, offsetYRatio }` for the renderer.
        pub fn presentation(&self) -> JsValue {
            to_js(&self.inner.settings().presentation)
        }

        #[wasm_bindgen(js_name = "gemKeys")]
        pub fn gem_keys(&self) -> JsValue {
            to_js(self.inner.gem_keys())
        }
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM gem engine ready".to_string()
    }
}
