//! Crafting materials
//!
//! A material is a static catalog entry: identifier, display name, category,
//! and the base weight the fallback generator scales stats from.

use serde::{Deserialize, Serialize};

/// Which crafting discipline a material belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Weapon,
    Armor,
    Concoction,
}

impl MaterialCategory {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Weapon => "Weapon",
            Self::Armor => "Armor",
            Self::Concoction => "Concoction",
        }
    }
}

/// A crafting material
///
/// Loaded once at startup and never mutated. `base_weight` is in 0.0..=1.0
/// and drives fallback stat synthesis and rarity grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    pub base_weight: f32,
}

impl Material {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: MaterialCategory,
        base_weight: f32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            base_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(MaterialCategory::Weapon.name(), "Weapon");
        assert_eq!(MaterialCategory::Armor.name(), "Armor");
        assert_eq!(MaterialCategory::Concoction.name(), "Concoction");
    }

    #[test]
    fn test_material_serde_roundtrip() {
        let mat = Material::new("steel_ingot", "Steel Ingot", MaterialCategory::Weapon, 0.55);
        let json = serde_json::to_string(&mat).unwrap();
        assert!(json.contains("\"category\":\"weapon\""));
        let back: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mat);
    }
}
