//! Deterministic offline item synthesis
//!
//! When the generation service is down or disabled, items are built from the
//! material weights alone. The same combination always produces the same
//! item, across calls and across processes, so cache entries and player
//! expectations stay stable.

use std::sync::Arc;

use emberforge_core::item::{
    ARMOR_BLOCK_RANGE, ARMOR_DEFENSE_RANGE, BUFF_DURATION_RANGE, BUFF_MAGNITUDE_RANGE,
    WEAPON_CRIT_RANGE, WEAPON_DAMAGE_RANGE,
};
use emberforge_core::{
    EffectKind, EffectSpec, GeneratedItem, ItemId, ItemKind, ItemSource, MaterialCatalog,
    MaterialCombination, Rarity, StatBlock,
};

/// Offline generator scaling stats from averaged material weights
pub struct FallbackGenerator {
    catalog: Arc<MaterialCatalog>,
}

impl FallbackGenerator {
    pub fn new(catalog: Arc<MaterialCatalog>) -> Self {
        Self { catalog }
    }

    /// Synthesize an item; this cannot fail
    pub fn generate(&self, combination: &MaterialCombination) -> GeneratedItem {
        let weight = combination.average_weight(&self.catalog);
        let fingerprint = combination.fingerprint();

        let display_names: Vec<&str> = combination
            .materials()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(|m| m.name.as_str())
            .collect();

        let suffix = match combination.kind() {
            ItemKind::Weapon => combination.style().unwrap_or_default().display_name(),
            ItemKind::Armor => "Armor",
            ItemKind::Buff => "Elixir",
        };
        let name = format!("{} {}", display_names.join(" + "), suffix);
        let description = match display_names.as_slice() {
            [a, b, c] => format!("Crafted from {}, {} and {}.", a, b, c),
            _ => format!("Crafted from {}.", display_names.join(", ")),
        };

        let stats = match combination.kind() {
            ItemKind::Weapon => StatBlock::weapon(
                round1(lerp(WEAPON_DAMAGE_RANGE, weight)),
                round2(lerp(WEAPON_CRIT_RANGE, weight)),
            ),
            ItemKind::Armor => StatBlock::armor(
                round1(lerp(ARMOR_DEFENSE_RANGE, weight)),
                round2(lerp(ARMOR_BLOCK_RANGE, weight)),
            ),
            ItemKind::Buff => StatBlock::buff(
                round1(lerp(BUFF_MAGNITUDE_RANGE, weight)),
                buff_duration(weight),
            ),
        };

        let effect = match combination.kind() {
            ItemKind::Weapon => {
                EffectSpec::new(EffectKind::DamageBoost, round1(weight * 10.0).max(1.0), 3)
            }
            ItemKind::Armor => {
                EffectSpec::new(EffectKind::Shield, round1(weight * 20.0).max(1.0), 3)
            }
            ItemKind::Buff => EffectSpec::new(
                EffectKind::HealOverTime,
                round1(weight * 5.0).max(1.0),
                buff_duration(weight),
            ),
        };

        GeneratedItem {
            id: ItemId::from_fingerprint(&fingerprint),
            name,
            description,
            stats,
            effects: vec![effect],
            rarity: Rarity::from_weight(weight),
            source: ItemSource::Fallback,
        }
    }
}

fn lerp(range: (f32, f32), t: f32) -> f32 {
    range.0 + (range.1 - range.0) * t.clamp(0.0, 1.0)
}

fn buff_duration(weight: f32) -> u32 {
    lerp(
        (BUFF_DURATION_RANGE.0 as f32, BUFF_DURATION_RANGE.1 as f32),
        weight,
    )
    .round() as u32
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::WeaponStyle;

    fn generator() -> FallbackGenerator {
        FallbackGenerator::new(Arc::new(MaterialCatalog::builtin()))
    }

    fn combo(
        materials: [&str; 3],
        kind: Option<ItemKind>,
        style: Option<WeaponStyle>,
    ) -> MaterialCombination {
        let catalog = MaterialCatalog::builtin();
        MaterialCombination::new(&catalog, &materials, kind, style).unwrap()
    }

    #[test]
    fn test_weapon_fallback_in_range() {
        let generator = generator();
        let combo = combo(
            ["steel_ingot", "iron_blade", "dragon_shard"],
            Some(ItemKind::Weapon),
            Some(WeaponStyle::Sword),
        );

        let item = generator.generate(&combo);
        assert_eq!(item.kind(), ItemKind::Weapon);
        assert_eq!(item.source, ItemSource::Fallback);
        assert!(!item.name.is_empty());
        assert!(!item.description.is_empty());
        assert!(item.stats.in_range());
        assert_eq!(item.name, "Dragon Shard + Iron Blade + Steel Ingot Sword");
    }

    #[test]
    fn test_deterministic_across_calls() {
        let generator = generator();
        let combo = combo(
            ["magic_essence", "moonflower", "star_dust"],
            None,
            None,
        );

        let first = generator.generate(&combo);
        let second = generator.generate(&combo);
        assert_eq!(first, second);
    }

    #[test]
    fn test_better_materials_better_stats() {
        let generator = generator();
        let weak = generator.generate(&combo(
            ["iron_blade", "iron_blade", "iron_blade"],
            Some(ItemKind::Weapon),
            None,
        ));
        let strong = generator.generate(&combo(
            ["dragon_shard", "dragon_shard", "dragon_shard"],
            Some(ItemKind::Weapon),
            None,
        ));

        let (StatBlock::Weapon { damage: weak_damage, .. }, StatBlock::Weapon { damage: strong_damage, .. }) =
            (weak.stats, strong.stats)
        else {
            panic!("expected weapon stats");
        };
        assert!(strong_damage > weak_damage);
        assert!(strong.rarity > weak.rarity);
    }

    #[test]
    fn test_type_appropriate_default_effect() {
        let generator = generator();

        let weapon = generator.generate(&combo(
            ["steel_ingot", "iron_blade", "mithril_bar"],
            None,
            None,
        ));
        assert_eq!(weapon.effects.len(), 1);
        assert_eq!(weapon.effects[0].kind, EffectKind::DamageBoost);

        let armor = generator.generate(&combo(
            ["stone", "steel_plate", "thick_leather"],
            None,
            None,
        ));
        assert_eq!(armor.effects[0].kind, EffectKind::Shield);

        let buff = generator.generate(&combo(
            ["magic_essence", "moonflower", "star_dust"],
            None,
            None,
        ));
        assert_eq!(buff.effects[0].kind, EffectKind::HealOverTime);
    }

    #[test]
    fn test_buff_duration_within_bounds() {
        let generator = generator();
        let buff = generator.generate(&combo(
            ["star_dust", "dragon_essence", "phoenix_feather"],
            None,
            None,
        ));
        let StatBlock::Buff { duration, .. } = buff.stats else {
            panic!("expected buff stats");
        };
        assert!((BUFF_DURATION_RANGE.0..=BUFF_DURATION_RANGE.1).contains(&duration));
    }

    #[test]
    fn test_description_lists_materials() {
        let generator = generator();
        let item = generator.generate(&combo(
            ["steel_ingot", "iron_blade", "dragon_shard"],
            Some(ItemKind::Weapon),
            None,
        ));
        assert_eq!(
            item.description,
            "Crafted from Dragon Shard, Iron Blade and Steel Ingot."
        );
    }
}
