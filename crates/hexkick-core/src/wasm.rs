//! WebAssembly bindings for the browser UI.
//!
//! The UI receives full game snapshots from the server and uses these
//! bindings to highlight legal targets and pre-check actions locally.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::field::FieldIndex;
use crate::game::GameState;
use crate::hex::OffsetCoord;
use crate::targets;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// A read-only view over one game snapshot
#[wasm_bindgen]
pub struct WasmPitch {
    state: GameState,
}

#[wasm_bindgen]
impl WasmPitch {
    /// Load a `gameState` snapshot as sent by the server
    #[wasm_bindgen(constructor)]
    pub fn new(state_json: &str) -> Result<WasmPitch, JsValue> {
        let state: GameState = serde_json::from_str(state_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid game state: {}", e)))?;
        Ok(WasmPitch { state })
    }

    /// Run targets for a player as a JSON array of `{coord, path}`
    #[wasm_bindgen(js_name = getRunTargets)]
    pub fn get_run_targets(&self, player_id: &str) -> String {
        let targets = targets::run_targets(&self.state, player_id);
        serde_json::to_string(&targets).unwrap_or_else(|_| "[]".to_string())
    }

    /// Pass targets for a player as a JSON array of `{coord, direction, distance}`
    #[wasm_bindgen(js_name = getPassTargets)]
    pub fn get_pass_targets(&self, player_id: &str) -> String {
        let targets: Vec<_> = targets::pass_targets(&self.state, player_id)
            .into_values()
            .collect();
        serde_json::to_string(&targets).unwrap_or_else(|_| "[]".to_string())
    }

    /// What occupies a cell, as JSON
    #[wasm_bindgen(js_name = getFieldState)]
    pub fn get_field_state(&self, col: i32, row: i32) -> String {
        let index = FieldIndex::build(&self.state, true);
        serde_json::to_string(&index.at(OffsetCoord::new(col, row)))
            .unwrap_or_else(|_| "null".to_string())
    }

    /// Validate an action locally; returns the resulting state JSON or the error code
    #[wasm_bindgen(js_name = checkAction)]
    pub fn check_action(&self, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.state.apply_action(&action) {
            Ok(next) => Ok(serde_json::to_string(&next).unwrap_or_else(|_| "{}".to_string())),
            Err(e) => Err(JsValue::from_str(e.code())),
        }
    }
}
