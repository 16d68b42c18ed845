//! Generated item model
//!
//! Items are created once by the factory, cached for the process lifetime,
//! and never mutated afterward. Combat only reads them.

use serde::{Deserialize, Serialize};

use crate::combination::{Fingerprint, ItemKind};
use crate::effect::EffectSpec;

/// Valid stat bounds per item kind. Generated values outside these are
/// clamped, never passed through.
pub const WEAPON_DAMAGE_RANGE: (f32, f32) = (1.0, 100.0);
pub const WEAPON_CRIT_RANGE: (f32, f32) = (0.0, 0.5);
pub const ARMOR_DEFENSE_RANGE: (f32, f32) = (0.0, 50.0);
pub const ARMOR_BLOCK_RANGE: (f32, f32) = (0.0, 0.5);
pub const BUFF_MAGNITUDE_RANGE: (f32, f32) = (1.0, 50.0);
pub const BUFF_DURATION_RANGE: (u32, u32) = (1, 10);

/// Unique item identifier, derived from the combination fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn from_fingerprint(fingerprint: &Fingerprint) -> Self {
        Self(fingerprint.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Item quality tier, graded from the averaged material weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Grade an averaged base weight
    pub fn from_weight(weight: f32) -> Self {
        if weight >= 0.8 {
            Self::Legendary
        } else if weight >= 0.65 {
            Self::Epic
        } else if weight >= 0.5 {
            Self::Rare
        } else if weight >= 0.35 {
            Self::Uncommon
        } else {
            Self::Common
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }

    /// Parse a wire spelling, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "common" => Some(Self::Common),
            "uncommon" => Some(Self::Uncommon),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }
}

/// Where an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    /// Produced by the remote generative service
    Generated,
    /// Synthesized offline from material weights
    Fallback,
}

/// Type-dependent numeric stats
///
/// The variant doubles as the item's kind; an item's stats can never disagree
/// with what it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatBlock {
    Weapon { damage: f32, crit_chance: f32 },
    Armor { defense: f32, block_chance: f32 },
    Buff { effect_magnitude: f32, duration: u32 },
}

impl StatBlock {
    pub fn weapon(damage: f32, crit_chance: f32) -> Self {
        Self::Weapon {
            damage,
            crit_chance,
        }
    }

    pub fn armor(defense: f32, block_chance: f32) -> Self {
        Self::Armor {
            defense,
            block_chance,
        }
    }

    pub fn buff(effect_magnitude: f32, duration: u32) -> Self {
        Self::Buff {
            effect_magnitude,
            duration,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Weapon { .. } => ItemKind::Weapon,
            Self::Armor { .. } => ItemKind::Armor,
            Self::Buff { .. } => ItemKind::Buff,
        }
    }

    /// Clamp every stat into its valid range
    ///
    /// Returns true when anything was out of range, so callers can log the
    /// repair.
    pub fn clamp_into_range(&mut self) -> bool {
        let before = *self;
        match self {
            Self::Weapon {
                damage,
                crit_chance,
            } => {
                *damage = damage.clamp(WEAPON_DAMAGE_RANGE.0, WEAPON_DAMAGE_RANGE.1);
                *crit_chance = crit_chance.clamp(WEAPON_CRIT_RANGE.0, WEAPON_CRIT_RANGE.1);
            }
            Self::Armor {
                defense,
                block_chance,
            } => {
                *defense = defense.clamp(ARMOR_DEFENSE_RANGE.0, ARMOR_DEFENSE_RANGE.1);
                *block_chance = block_chance.clamp(ARMOR_BLOCK_RANGE.0, ARMOR_BLOCK_RANGE.1);
            }
            Self::Buff {
                effect_magnitude,
                duration,
            } => {
                *effect_magnitude =
                    effect_magnitude.clamp(BUFF_MAGNITUDE_RANGE.0, BUFF_MAGNITUDE_RANGE.1);
                *duration = (*duration).clamp(BUFF_DURATION_RANGE.0, BUFF_DURATION_RANGE.1);
            }
        }
        *self != before
    }

    /// Whether every stat already sits inside its valid range
    pub fn in_range(&self) -> bool {
        let mut copy = *self;
        !copy.clamp_into_range()
    }
}

/// A crafted item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub stats: StatBlock,
    pub effects: Vec<EffectSpec>,
    pub rarity: Rarity,
    pub source: ItemSource,
}

impl GeneratedItem {
    pub fn kind(&self) -> ItemKind {
        self.stats.kind()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ItemSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectKind;

    fn test_item() -> GeneratedItem {
        GeneratedItem {
            id: ItemId("a+b+c:weapon:sword".to_string()),
            name: "Test Blade".to_string(),
            description: "A blade for tests".to_string(),
            stats: StatBlock::weapon(20.0, 0.1),
            effects: vec![EffectSpec::new(EffectKind::Poison, 2.0, 3)],
            rarity: Rarity::Rare,
            source: ItemSource::Generated,
        }
    }

    #[test]
    fn test_kind_follows_stats() {
        let item = test_item();
        assert_eq!(item.kind(), ItemKind::Weapon);
        assert!(!item.is_fallback());
    }

    #[test]
    fn test_rarity_thresholds() {
        assert_eq!(Rarity::from_weight(0.2), Rarity::Common);
        assert_eq!(Rarity::from_weight(0.35), Rarity::Uncommon);
        assert_eq!(Rarity::from_weight(0.5), Rarity::Rare);
        assert_eq!(Rarity::from_weight(0.65), Rarity::Epic);
        assert_eq!(Rarity::from_weight(0.8), Rarity::Legendary);
        assert_eq!(Rarity::from_weight(0.95), Rarity::Legendary);
    }

    #[test]
    fn test_clamp_weapon_stats() {
        let mut stats = StatBlock::weapon(500.0, 0.9);
        assert!(stats.clamp_into_range());
        assert_eq!(stats, StatBlock::weapon(100.0, 0.5));
    }

    #[test]
    fn test_clamp_buff_duration() {
        let mut stats = StatBlock::buff(10.0, 99);
        assert!(stats.clamp_into_range());
        assert_eq!(stats, StatBlock::buff(10.0, 10));
    }

    #[test]
    fn test_clamp_in_range_untouched() {
        let mut stats = StatBlock::armor(12.0, 0.2);
        assert!(!stats.clamp_into_range());
        assert!(stats.in_range());
        assert_eq!(stats, StatBlock::armor(12.0, 0.2));
    }

    #[test]
    fn test_statblock_serde_tag() {
        let json = serde_json::to_string(&StatBlock::weapon(10.0, 0.25)).unwrap();
        assert!(json.contains("\"kind\":\"weapon\""));
        let back: StatBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StatBlock::weapon(10.0, 0.25));
    }

    #[test]
    fn test_item_serde_roundtrip() {
        let item = test_item();
        let json = serde_json::to_string(&item).unwrap();
        let back: GeneratedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
