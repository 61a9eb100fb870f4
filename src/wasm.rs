//! WebAssembly bindings for Timberchain.
//!
//! This module provides JavaScript-accessible functions for the web front-end.
//! The catalogue is embedded in the binary and parsed once on first use.
//! Functions taking or returning JSON never panic on bad input; failures are
//! reported as `{"success": false, "error": "..."}`.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use wasm_bindgen::prelude::*;

use crate::aggregate::totals;
use crate::chain::resolve_for_product;
use crate::data::{load_embedded, parse_quantity};
use crate::display::{approximate, graph as to_graph, to_dot, GraphEdge, GraphNode, MixedFraction};
use crate::models::GameData;
use crate::optimizer::{select_best, Criterion};
use crate::{ProductionChain, DEFAULT_RATE};

static GAME_DATA: OnceLock<Result<GameData, String>> = OnceLock::new();

/// Embedded catalogue, parsed on first use.
fn game_data() -> Result<&'static GameData, String> {
    GAME_DATA
        .get_or_init(|| load_embedded().map_err(|e| format!("Failed to load game data: {}", e)))
        .as_ref()
        .map_err(Clone::clone)
}

/// Logs an error to the browser console, or through `tracing` off the web.
fn report(error: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(error));
    tracing::warn!("{}", error);
}

fn default_select() -> bool {
    true
}

/// JavaScript-friendly input for chain resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct JsGraphInput {
    pub faction: String,
    pub product: String,
    /// Rate per hour as an exact quantity string, defaults to `16 + 2/3`
    #[serde(default)]
    pub rate: Option<String>,
    /// Narrow alternatives with [`select_best`]; otherwise render the first
    /// alternative with all of its sub-alternatives
    #[serde(default = "default_select")]
    pub select: bool,
    #[serde(default)]
    pub criteria: Option<Vec<Criterion>>,
}

/// JavaScript-friendly facility total.
#[derive(Debug, Clone, Serialize)]
pub struct JsTotal {
    pub facility: String,
    pub count: MixedFraction,
    pub approx: f64,
}

/// JavaScript-friendly resolution result.
#[derive(Debug, Clone, Serialize)]
pub struct JsGraphResult {
    pub success: bool,
    pub error: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub dot: String,
    /// Facility totals; empty unless the chain was narrowed to one alternative per input
    pub totals: Vec<JsTotal>,
}

impl JsGraphResult {
    fn failure(error: String) -> Self {
        JsGraphResult {
            success: false,
            error: Some(error),
            nodes: vec![],
            edges: vec![],
            dot: String::new(),
            totals: vec![],
        }
    }

    fn from_chain(chain: &ProductionChain) -> Self {
        let (nodes, edges) = to_graph(chain);
        let facility_totals = if chain.is_selected() {
            totals(chain)
                .into_iter()
                .map(|(facility, count)| JsTotal {
                    facility,
                    approx: approximate(&count),
                    count: MixedFraction::from(&count),
                })
                .collect()
        } else {
            vec![]
        };
        JsGraphResult {
            success: true,
            error: None,
            nodes,
            edges,
            dot: to_dot(chain),
            totals: facility_totals,
        }
    }
}

/// JavaScript-friendly product listing.
#[derive(Debug, Clone, Serialize)]
pub struct JsProducts {
    pub success: bool,
    pub error: Option<String>,
    pub products: Vec<String>,
}

fn resolve_input(input: &JsGraphInput) -> Result<JsGraphResult, String> {
    let game_data = game_data()?;
    let faction = game_data.get_faction(&input.faction).map_err(|e| e.to_string())?;
    let rate_text = input.rate.as_deref().unwrap_or(DEFAULT_RATE);
    let rate = parse_quantity(rate_text).map_err(|e| format!("Invalid rate '{}': {}", rate_text, e))?;
    let chains = resolve_for_product(faction, &input.product, rate).map_err(|e| e.to_string())?;

    let chain = if input.select {
        let criteria = input
            .criteria
            .clone()
            .unwrap_or_else(|| Criterion::DEFAULT.to_vec());
        select_best(&chains, &criteria)
    } else {
        chains.into_iter().next()
    };

    chain
        .map(|chain| JsGraphResult::from_chain(&chain))
        .ok_or_else(|| format!("No production chain for {}", input.product))
}

/// Resolve a product and return its graph.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn graph(input_json: &str) -> String {
    let result = serde_json::from_str::<JsGraphInput>(input_json)
        .map_err(|e| format!("Invalid input: {}", e))
        .and_then(|input| resolve_input(&input));

    let output = result.unwrap_or_else(|error| {
        report(&error);
        JsGraphResult::failure(error)
    });
    serde_json::to_string(&output).unwrap_or_default()
}

/// DOT source of the selected chain for a product at the default rate.
///
/// Returns an empty string if the product cannot be resolved.
#[wasm_bindgen]
pub fn dot_graph(faction: &str, product: &str) -> String {
    let input = JsGraphInput {
        faction: faction.to_string(),
        product: product.to_string(),
        rate: None,
        select: true,
        criteria: None,
    };
    match resolve_input(&input) {
        Ok(result) => result.dot,
        Err(error) => {
            report(&error);
            String::new()
        }
    }
}

/// Get the products a faction can make, sorted, as JSON.
#[wasm_bindgen]
pub fn get_products(faction: &str) -> String {
    let result = game_data()
        .and_then(|data| data.get_products(faction).map_err(|e| e.to_string()))
        .map(|products| JsProducts {
            success: true,
            error: None,
            products: products.into_iter().collect(),
        })
        .unwrap_or_else(|error| {
            report(&error);
            JsProducts {
                success: false,
                error: Some(error),
                products: vec![],
            }
        });
    serde_json::to_string(&result).unwrap_or_default()
}

/// Faction names in catalogue order; empty if the embedded data is broken.
pub fn faction_names() -> Vec<String> {
    match game_data() {
        Ok(data) => data.get_factions().into_iter().map(str::to_string).collect(),
        Err(error) => {
            report(&error);
            vec![]
        }
    }
}

/// Get the faction names as a JavaScript array.
#[wasm_bindgen]
pub fn get_factions() -> js_sys::Array {
    faction_names().into_iter().map(JsValue::from).collect()
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
