//! Material combinations and cache fingerprints
//!
//! A combination is the unordered triple of materials a player submits for
//! crafting, resolved to a concrete item kind and (for weapons) a style.
//! Material order never matters: identifiers are sorted at construction so
//! equality, hashing, and the fingerprint are all order-independent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCatalog;
use crate::error::CombinationError;
use crate::material::MaterialCategory;

/// What a combination crafts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Buff,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [Self::Weapon, Self::Armor, Self::Buff];

    /// Wire and fingerprint spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Buff => "buff",
        }
    }

    /// Parse a wire spelling
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weapon sub-type, present only on weapon combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponStyle {
    #[default]
    Sword,
    Axe,
    Spear,
}

impl WeaponStyle {
    pub const ALL: [WeaponStyle; 3] = [Self::Sword, Self::Axe, Self::Spear];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sword => "sword",
            Self::Axe => "axe",
            Self::Spear => "spear",
        }
    }

    /// Parse a wire spelling
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == value)
    }

    /// Capitalized form for item names
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sword => "Sword",
            Self::Axe => "Axe",
            Self::Spear => "Spear",
        }
    }
}

impl fmt::Display for WeaponStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical cache key for a combination
///
/// The sorted material identifiers joined with `+`, then `:kind` and, for
/// weapons, `:style`. Stable across processes and readable in cache files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unordered triple of materials plus the resolved item kind
///
/// {A,B,C} and {C,A,B} construct equal combinations and produce the same
/// fingerprint. Duplicates are allowed; the same material may be used twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialCombination {
    materials: [String; 3],
    kind: ItemKind,
    style: Option<WeaponStyle>,
}

impl MaterialCombination {
    /// Validate and build a combination
    ///
    /// `materials` must name exactly three catalog entries. When `kind` is
    /// `None` it is inferred from the materials' category mix. A weapon style
    /// is only legal on weapon combinations; weapons without one default to
    /// [`WeaponStyle::Sword`].
    pub fn new(
        catalog: &MaterialCatalog,
        materials: &[&str],
        kind: Option<ItemKind>,
        style: Option<WeaponStyle>,
    ) -> Result<Self, CombinationError> {
        if materials.len() != 3 {
            return Err(CombinationError::WrongMaterialCount(materials.len()));
        }
        for id in materials {
            if !catalog.contains(id) {
                return Err(CombinationError::UnknownMaterial((*id).to_string()));
            }
        }

        let mut sorted: [String; 3] = [
            materials[0].to_string(),
            materials[1].to_string(),
            materials[2].to_string(),
        ];
        sorted.sort();

        let kind = kind.unwrap_or_else(|| infer_kind(catalog, &sorted));
        let style = match kind {
            ItemKind::Weapon => Some(style.unwrap_or_default()),
            _ => {
                if let Some(style) = style {
                    return Err(CombinationError::StyleWithoutWeapon { kind, style });
                }
                None
            }
        };

        Ok(Self {
            materials: sorted,
            kind,
            style,
        })
    }

    /// The three material identifiers, lexicographically sorted
    pub fn materials(&self) -> &[String; 3] {
        &self.materials
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn style(&self) -> Option<WeaponStyle> {
        self.style
    }

    /// Average base weight of the three materials
    ///
    /// Drives fallback stat synthesis and rarity grading. Materials missing
    /// from the catalog count as zero, which construction already rules out.
    pub fn average_weight(&self, catalog: &MaterialCatalog) -> f32 {
        let total: f32 = self
            .materials
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|m| m.base_weight)
            .sum();
        total / 3.0
    }

    /// Derive the cache key
    ///
    /// Identical for every permutation of the same materials, distinct across
    /// kinds and weapon styles. Pure; no hashing, so collisions are
    /// impossible within the catalog vocabulary.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut key = self.materials.join("+");
        key.push(':');
        key.push_str(self.kind.as_str());
        if let Some(style) = self.style {
            key.push(':');
            key.push_str(style.as_str());
        }
        Fingerprint(key)
    }
}

/// Infer the item kind from the category mix of the chosen materials
///
/// Concoction wins only with a strict majority over both other categories,
/// then armor over weapon, then weapon. Ties therefore resolve toward
/// weapon, which keeps one-of-each combinations craftable as weapons.
fn infer_kind(catalog: &MaterialCatalog, materials: &[String; 3]) -> ItemKind {
    let mut weapon = 0;
    let mut armor = 0;
    let mut concoction = 0;
    for id in materials {
        match catalog.get(id).map(|m| m.category) {
            Some(MaterialCategory::Weapon) => weapon += 1,
            Some(MaterialCategory::Armor) => armor += 1,
            Some(MaterialCategory::Concoction) => concoction += 1,
            None => {}
        }
    }

    if concoction > weapon && concoction > armor {
        ItemKind::Buff
    } else if armor > weapon {
        ItemKind::Armor
    } else {
        ItemKind::Weapon
    }
}
