//! WASM bindings for the frontend strategy browser

#![cfg(feature = "wasm")]

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::{
    describe_strategy, Attitude, MatchAttributes, MatchLog, Player, RoundRecord, Seat, Strategy,
    StrategyKind,
};

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: &'static str,
    name: &'static str,
    attitude: Attitude,
    description: &'static str,
}

/// Get all available strategy kinds
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = StrategyKind::ALL
        .iter()
        .map(|kind| StrategyInfo {
            id: kind.id(),
            name: kind.display_name(),
            attitude: kind.attitude(),
            description: kind.summary(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Strategy ids as a plain JS array of strings
#[wasm_bindgen]
pub fn get_strategy_ids() -> js_sys::Array {
    StrategyKind::ALL
        .iter()
        .map(|kind| JsValue::from_str(kind.id()))
        .collect()
}

/// Get human-readable description of a strategy
#[wasm_bindgen]
pub fn get_strategy_description(strategy_json: &str) -> Result<String, JsError> {
    let strategy = Strategy::from_json(strategy_json)
        .map_err(|e| JsError::new(&format!("Invalid strategy: {}", e)))?;

    Ok(describe_strategy(&strategy))
}

/// Create a strategy JSON with default parameters
#[wasm_bindgen]
pub fn create_strategy(kind: &str) -> Result<String, JsError> {
    let kind: StrategyKind = kind.parse().map_err(|e| JsError::new(&format!("{}", e)))?;

    serde_json::to_string(&Strategy::new(kind))
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(Deserialize)]
struct NextMoveRequest {
    strategy: Strategy,
    seat: Seat,
    #[serde(default)]
    attributes: MatchAttributes,
    seed: [u8; 32],
    #[serde(default)]
    match_index: u32,
    #[serde(default)]
    rounds: Vec<RoundRecord>,
}

/// Compute a strategy's next move from the rounds recorded so far
///
/// The request is JSON:
/// `{"strategy": {...}, "seat": "A", "seed": [32 bytes], "rounds": [...]}`
///
/// # Returns
/// JSON serialized Action
#[wasm_bindgen]
pub fn next_move(request_json: &str) -> Result<String, JsError> {
    let request: NextMoveRequest = serde_json::from_str(request_json)
        .map_err(|e| JsError::new(&format!("Invalid request: {}", e)))?;
    request
        .strategy
        .params
        .validate()
        .map_err(|e| JsError::new(&format!("Invalid strategy: {}", e)))?;

    let log = MatchLog::from_rounds(
        request.attributes,
        &request.seed,
        request.match_index,
        &request.rounds,
    );
    let mut player = Player::replay(request.strategy, &log, request.seat);
    let action = player.decide(&mut log.context(request.seat));

    serde_json::to_string(&action)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
