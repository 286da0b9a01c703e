//! Fallback helpers for model selection
//!
//! This module provides utilities for:
//! - Building the static candidate list in preference order
//! - Filtering and ordering discovered models

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::DiscoveredModel;

/// Priority list for model selection, smaller and faster variants first
pub const PRIORITY_MODELS: &[&str] = &[
    "gemini-1.5-flash-002",
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash-8b",
    "gemini-1.5-flash-8b-latest",
    "gemini-1.5-pro-002",
    "gemini-1.5-pro-latest",
    "gemini-1.0-pro",
];

/// Pinned release suffix such as `-001` or `-002`
static STABLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\d+$").expect("stable suffix pattern is valid"));

/// Build the static candidate list: the override first, then the priority list
///
/// Blank entries are skipped and duplicates keep their first position.
pub fn static_candidates(model_override: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(PRIORITY_MODELS.len() + 1);

    let entries = model_override
        .into_iter()
        .chain(PRIORITY_MODELS.iter().copied())
        .map(str::trim)
        .filter(|id| !id.is_empty());

    for id in entries {
        if !candidates.iter().any(|c| c == id) {
            candidates.push(id.to_string());
        }
    }

    candidates
}

/// Check whether a model id ends with a pinned numeric release suffix
pub fn has_stable_suffix(model_id: &str) -> bool {
    STABLE_SUFFIX.is_match(model_id)
}

/// Sort key: flash before others, 1.5 before others, pinned releases before tags
fn priority_key(model_id: &str) -> (u8, u8, u8) {
    (
        u8::from(!model_id.contains("flash")),
        u8::from(!model_id.contains("1.5")),
        u8::from(!has_stable_suffix(model_id)),
    )
}

/// Sort model ids by discovery priority, keeping the listing order for ties
pub fn sort_by_priority(model_ids: &mut [String]) {
    model_ids.sort_by_key(|id| priority_key(id));
}

/// Keep text-generation models and return their ids in attempt order
pub fn discovery_order(models: &[DiscoveredModel]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(models.len());
    for model in models.iter().filter(|m| m.supports_text_generation()) {
        let id = model.id.trim();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }

    sort_by_priority(&mut ids);
    ids
}
