//! WASM entry points for browser and JS host use.
//!
//! These only plan: they describe the actions a host should run and never
//! spawn processes.

use wasm_bindgen::prelude::*;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::executor::ActionQueue;
use crate::report::ArtifactNaming;
use crate::traverse::Plan;
use crate::visitor::TypecheckVisitor;

/// Validate an overlay config JSON.
/// Returns a JSON array of error objects.
#[wasm_bindgen]
pub fn validate_config(config_json: &str) -> JsValue {
    let result = validate_config_inner(config_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_config_inner(config_json: &str) -> Vec<OverlayError> {
    match OverlayConfig::from_json(config_json) {
        Ok(config) => config.validate(),
        Err(e) => vec![e],
    }
}

/// Full planning pipeline: parse graph → build visitor → traverse.
/// Returns a JSON object with either the plan (success) or `errors`.
#[wasm_bindgen]
pub fn plan_graph(graph_json: &str, config_json: &str, out_dir: &str) -> JsValue {
    let result = plan_graph_inner(graph_json, config_json, out_dir);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

pub(crate) fn plan_graph_inner(graph_json: &str, config_json: &str, out_dir: &str) -> PlanResult {
    // 1. Config
    let config = match OverlayConfig::from_json(config_json) {
        Ok(c) => c,
        Err(e) => return PlanResult::Errors { errors: vec![e] },
    };

    // 2. Visitor
    let visitor = match TypecheckVisitor::new(config, ArtifactNaming::new(out_dir)) {
        Ok(v) => v,
        Err(errors) => return PlanResult::Errors { errors },
    };

    // 3. Graph
    let graph = match crate::parse::parse_and_build(graph_json) {
        Ok(g) => g,
        Err(errors) => return PlanResult::Errors { errors },
    };

    // 4. Traverse
    let mut queue = ActionQueue::new();
    let result = match crate::traverse::traverse(&graph, &visitor, &mut queue) {
        Ok(r) => r,
        Err(errors) => return PlanResult::Errors { errors },
    };
    if !result.is_success() {
        return PlanResult::Errors { errors: result.errors };
    }

    PlanResult::Success(Plan::new(queue.into_actions(), &result))
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
pub(crate) enum PlanResult {
    #[serde(rename = "success")]
    Success(Plan),
    #[serde(rename = "errors")]
    Errors { errors: Vec<OverlayError> },
}
