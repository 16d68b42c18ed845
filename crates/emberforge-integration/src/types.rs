use serde::{Deserialize, Serialize};

use emberforge_core::MaterialCombination;

/// Request body for `/generate_stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub materials: Vec<String>,
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
}

impl GenerationRequest {
    pub fn from_combination(combination: &MaterialCombination) -> Self {
        Self {
            materials: combination.materials().to_vec(),
            item_type: combination.kind().as_str().to_string(),
            weapon_type: combination.style().map(|s| s.as_str().to_string()),
        }
    }
}

/// Response from `/generate_stats`
///
/// Every field is defaulted so a sparse payload still parses; validation in
/// `convert` decides what is actually acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub stats: ResponseStats,
    #[serde(default)]
    pub effects: Vec<ResponseEffect>,
    #[serde(default)]
    pub rarity: Option<String>,
}

/// Stats object as sent by the service
///
/// The service fills whichever fields match the requested item type; numeric
/// durations arrive as floats because generative backends rarely distinguish.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResponseStats {
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default)]
    pub crit_chance: Option<f32>,
    #[serde(default)]
    pub defense: Option<f32>,
    #[serde(default)]
    pub block_chance: Option<f32>,
    #[serde(default)]
    pub effect_magnitude: Option<f32>,
    #[serde(default)]
    pub duration: Option<f32>,
}

/// One effect entry as sent by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEffect {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub magnitude: f32,
    #[serde(default)]
    pub duration: f32,
}
