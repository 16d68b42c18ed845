//! Effect vocabulary
//!
//! The closed set of effect kinds an item may carry into combat. Anything
//! outside this vocabulary arriving from the generation service is dropped
//! during response validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A combat effect kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Adds magnitude to attack damage while active
    DamageBoost,
    /// Damage-over-time tick at turn start
    Poison,
    /// Damage-over-time tick at turn start
    Burn,
    /// Victim skips their attack phase
    Stun,
    /// Heals magnitude at turn start, capped at max health
    HealOverTime,
    /// Absorb pool consumed before armor defense
    Shield,
    /// Attacker heals a fraction of damage dealt
    Lifesteal,
    /// Returns a fraction of damage dealt back to the attacker
    Reflect,
}

impl EffectKind {
    pub const ALL: [EffectKind; 8] = [
        Self::DamageBoost,
        Self::Poison,
        Self::Burn,
        Self::Stun,
        Self::HealOverTime,
        Self::Shield,
        Self::Lifesteal,
        Self::Reflect,
    ];

    /// Wire spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DamageBoost => "damage_boost",
            Self::Poison => "poison",
            Self::Burn => "burn",
            Self::Stun => "stun",
            Self::HealOverTime => "heal_over_time",
            Self::Shield => "shield",
            Self::Lifesteal => "lifesteal",
            Self::Reflect => "reflect",
        }
    }

    /// Parse a wire spelling; `None` for anything outside the vocabulary
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Whether the effect ticks every turn rather than acting passively
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Poison | Self::Burn | Self::HealOverTime)
    }

    /// Whether a weapon applies this to the enemy on hit
    pub fn targets_enemy(self) -> bool {
        matches!(self, Self::Poison | Self::Burn | Self::Stun)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An effect as declared on an item
///
/// Combat copies these into its own mutable state; the item's list is never
/// modified after generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub duration: u32,
}

impl EffectSpec {
    pub fn new(kind: EffectKind, magnitude: f32, duration: u32) -> Self {
        Self {
            kind,
            magnitude,
            duration,
        }
    }
}
