//! WebAssembly entry point and JavaScript bindings.

use crate::bridge::{Bridge, BridgeError};
use kanban_core::{BoardStore, KanbanConfig};
use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Board store handle exported to JavaScript.
#[wasm_bindgen]
pub struct KanbanApp {
    bridge: Bridge,
}

#[wasm_bindgen]
impl KanbanApp {
    /// Open the store persisted in `localStorage`.
    ///
    /// `config` is an optional object with `storageKey`,
    /// `defaultBackgroundColor` and `drag.rollbackOnCancel`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<KanbanApp, JsValue> {
        let config: KanbanConfig = if config.is_undefined() || config.is_null() {
            KanbanConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };

        let store = BoardStore::open_default(config)
            .map_err(BridgeError::from)
            .map_err(to_js_error)?;

        Ok(KanbanApp {
            bridge: Bridge::new(store),
        })
    }

    /// Run a JSON command and return the JSON reply.
    pub fn dispatch(&mut self, command: &str) -> Result<String, JsValue> {
        self.bridge.execute_json(command).map_err(|e| {
            log::warn!("Command rejected: {}", e);
            to_js_error(e)
        })
    }

    /// Current document as a plain JavaScript object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.bridge.store().document()).map_err(to_js_error)
    }

    /// Call `callback(document)` after every committed change.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) -> Result<u32, JsValue> {
        let id = self.bridge.store_mut().subscribe(move |document| {
            match serde_wasm_bindgen::to_value(&**document) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        log::error!("Change listener threw: {:?}", e);
                    }
                }
                Err(e) => log::error!("Failed to convert snapshot: {}", e),
            }
        });
        match u32::try_from(id) {
            Ok(handle) => Ok(handle),
            Err(_) => {
                self.bridge.store_mut().unsubscribe(id);
                Err(to_js_error(format!("Subscription id {} exceeds u32", id)))
            }
        }
    }

    /// Remove a listener registered with `onChange`.
    #[wasm_bindgen(js_name = offChange)]
    pub fn off_change(&mut self, id: u32) -> bool {
        self.bridge.store_mut().unsubscribe(u64::from(id))
    }
}

/// Initialize logging and panic reporting when the module loads.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // A second instantiation finds the logger already installed.
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Kanban store module loaded");
    }
}
