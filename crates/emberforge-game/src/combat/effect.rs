//! Active status effects on a combatant.
//!
//! An [`ActiveEffect`] is an [`EffectSpec`] that has been applied to someone:
//! it remembers where it came from and how many turns it has left. The
//! [`EffectSet`] owns every effect on one combatant and drives their
//! per-turn lifecycle: periodic effects tick at the start of a turn,
//! durations decrement at the end of it, and an effect whose duration
//! reaches zero is dropped after its final tick.

use emberforge_core::{EffectKind, EffectSpec};
use serde::{Deserialize, Serialize};

/// A status effect currently attached to a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub remaining_duration: u32,
    /// Name of the item that applied the effect, used in event lines.
    pub source: String,
}

impl ActiveEffect {
    pub fn new(kind: EffectKind, magnitude: f32, duration: u32, source: impl Into<String>) -> Self {
        Self {
            kind,
            magnitude,
            remaining_duration: duration,
            source: source.into(),
        }
    }

    /// Instantiate an item's effect spec against a named source item.
    pub fn from_spec(spec: &EffectSpec, source: impl Into<String>) -> Self {
        Self::new(spec.kind, spec.magnitude, spec.duration, source)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_duration == 0
    }
}

/// What the start-of-turn tick did to the owner.
#[derive(Debug, Clone, Default)]
pub struct TurnTick {
    /// Damage from periodic effects (poison, burn).
    pub damage: f32,
    /// Healing from heal-over-time effects, before the max-health cap.
    pub healing: f32,
    pub events: Vec<String>,
}

/// Every active effect on one combatant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSet {
    effects: Vec<ActiveEffect>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect, refreshing instead of stacking when the same kind
    /// is already active. A refresh keeps the longer remaining duration and
    /// the larger magnitude; it never shortens or weakens what is there.
    pub fn apply(&mut self, effect: ActiveEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining_duration = existing.remaining_duration.max(effect.remaining_duration);
            existing.magnitude = existing.magnitude.max(effect.magnitude);
            return;
        }
        self.effects.push(effect);
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// A stunned combatant skips their attack this turn.
    pub fn is_stunned(&self) -> bool {
        self.has(EffectKind::Stun)
    }

    /// Flat damage added to every attack while a damage boost is active.
    pub fn damage_bonus(&self) -> f32 {
        self.get(EffectKind::DamageBoost).map_or(0.0, |e| e.magnitude)
    }

    /// Fraction of dealt damage returned as healing, capped at 1.0.
    pub fn lifesteal_fraction(&self) -> f32 {
        self.get(EffectKind::Lifesteal)
            .map_or(0.0, |e| e.magnitude.min(1.0))
    }

    /// Fraction of received damage returned to the attacker, capped at 1.0.
    pub fn reflect_fraction(&self) -> f32 {
        self.get(EffectKind::Reflect)
            .map_or(0.0, |e| e.magnitude.min(1.0))
    }

    /// Run incoming damage through the shield pool. Returns the damage left
    /// over after absorption. A shield's magnitude is its remaining pool; a
    /// shield spent to zero stops absorbing immediately and is removed at
    /// the end of the turn.
    pub fn absorb(&mut self, damage: f32) -> f32 {
        let Some(shield) = self.effects.iter_mut().find(|e| e.kind == EffectKind::Shield) else {
            return damage;
        };
        if shield.magnitude >= damage {
            shield.magnitude -= damage;
            return 0.0;
        }
        let remaining = damage - shield.magnitude;
        shield.magnitude = 0.0;
        shield.remaining_duration = 0;
        remaining
    }

    /// Start-of-turn tick: periodic effects deal their damage or healing.
    /// Durations are untouched here; they decrement in [`decay`].
    pub fn tick_turn_start(&self, owner: &str) -> TurnTick {
        let mut tick = TurnTick::default();
        for effect in &self.effects {
            match effect.kind {
                EffectKind::Poison | EffectKind::Burn => {
                    tick.damage += effect.magnitude;
                    tick.events.push(format!(
                        "{} takes {:.1} {} damage.",
                        owner,
                        effect.magnitude,
                        effect.kind.as_str()
                    ));
                }
                EffectKind::HealOverTime => {
                    tick.healing += effect.magnitude;
                    tick.events.push(format!(
                        "{} recovers {:.1} health from {}.",
                        owner, effect.magnitude, effect.source
                    ));
                }
                _ => {}
            }
        }
        tick
    }

    /// End-of-turn decay: every active effect loses one turn of duration
    /// and anything at zero is removed. An effect applied with duration 1
    /// therefore ticks exactly once before it disappears.
    pub fn decay(&mut self, owner: &str) -> Vec<String> {
        let mut events = Vec::new();
        for effect in &mut self.effects {
            effect.remaining_duration = effect.remaining_duration.saturating_sub(1);
            if effect.is_expired() {
                events.push(format!("{} on {} wore off.", effect.kind.as_str(), owner));
            }
        }
        self.effects.retain(|e| !e.is_expired());
        events
    }
}
