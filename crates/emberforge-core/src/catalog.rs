//! Material catalog
//!
//! The fixed vocabulary of craftable materials. Built in by default, with a
//! constructor for callers that load an alternative set from a data file.

use std::collections::HashMap;

use crate::material::{Material, MaterialCategory};

/// All materials known to the crafting system, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: HashMap<String, Material>,
}

impl MaterialCatalog {
    /// The built-in material set: six materials per category
    pub fn builtin() -> Self {
        use MaterialCategory::*;

        let materials = [
            ("steel_ingot", "Steel Ingot", Weapon, 0.55),
            ("iron_blade", "Iron Blade", Weapon, 0.45),
            ("dragon_shard", "Dragon Shard", Weapon, 0.9),
            ("obsidian_shard", "Obsidian Shard", Weapon, 0.65),
            ("mithril_bar", "Mithril Bar", Weapon, 0.8),
            ("dark_crystal", "Dark Crystal", Weapon, 0.75),
            ("thick_leather", "Thick Leather", Armor, 0.3),
            ("steel_plate", "Steel Plate", Armor, 0.55),
            ("dragon_scale", "Dragon Scale", Armor, 0.9),
            ("reinforced_wood", "Reinforced Wood", Armor, 0.25),
            ("titanium_sheet", "Titanium Sheet", Armor, 0.8),
            ("stone", "Stone", Armor, 0.2),
            ("magic_essence", "Magic Essence", Concoction, 0.6),
            ("crystal_powder", "Crystal Powder", Concoction, 0.45),
            ("phoenix_feather", "Phoenix Feather", Concoction, 0.85),
            ("moonflower", "Moonflower", Concoction, 0.35),
            ("dragon_essence", "Dragon Essence", Concoction, 0.9),
            ("star_dust", "Star Dust", Concoction, 0.95),
        ];

        Self::from_materials(
            materials
                .into_iter()
                .map(|(id, name, category, weight)| Material::new(id, name, category, weight)),
        )
    }

    /// Build a catalog from an arbitrary material list
    ///
    /// Later entries with a duplicate id replace earlier ones.
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        let materials = materials
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        Self { materials }
    }

    /// Look up a material by identifier
    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Whether the identifier names a known material
    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// All materials in a category, sorted by identifier
    pub fn by_category(&self, category: MaterialCategory) -> Vec<&Material> {
        let mut found: Vec<_> = self
            .materials
            .values()
            .filter(|m| m.category == category)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// All materials, sorted by identifier
    pub fn all(&self) -> Vec<&Material> {
        let mut found: Vec<_> = self.materials.values().collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
