//! Response validation and conversion
//!
//! Turns a raw service response into a [`GeneratedItem`], repairing what can
//! be repaired (out-of-range stats are clamped, unknown effect kinds are
//! dropped) and rejecting what cannot (missing required fields, an item type
//! that disagrees with the request).

use tracing::warn;

use emberforge_core::{
    EffectKind, EffectSpec, GeneratedItem, ItemId, ItemKind, ItemSource, MaterialCatalog,
    MaterialCombination, Rarity, StatBlock,
};

use crate::error::ClientError;
use crate::types::{GenerationResponse, ResponseStats};

/// Effect durations coming off the wire are held to the same bounds as buff
/// durations.
const EFFECT_DURATION_RANGE: (u32, u32) = (1, 10);

/// Validate a service response against the combination it was requested for
pub fn response_to_item(
    catalog: &MaterialCatalog,
    combination: &MaterialCombination,
    response: GenerationResponse,
) -> Result<GeneratedItem, ClientError> {
    let fingerprint = combination.fingerprint();

    let name = response.name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidResponse("missing name".into()));
    }
    let description = response.description.trim();
    if description.is_empty() {
        return Err(ClientError::InvalidResponse("missing description".into()));
    }

    match ItemKind::parse(&response.item_type) {
        Some(kind) if kind == combination.kind() => {}
        Some(kind) => {
            return Err(ClientError::InvalidResponse(format!(
                "item_type '{}' does not match requested '{}'",
                kind,
                combination.kind()
            )));
        }
        None => {
            return Err(ClientError::InvalidResponse(format!(
                "unknown item_type '{}'",
                response.item_type
            )));
        }
    }

    let mut stats = stats_for_kind(combination.kind(), &response.stats)?;
    if stats.clamp_into_range() {
        warn!("Clamped out-of-range stats for {}", fingerprint);
    }

    let mut effects = Vec::new();
    for effect in &response.effects {
        let Some(kind) = EffectKind::parse(&effect.kind) else {
            warn!(
                "Dropping unknown effect kind '{}' for {}",
                effect.kind, fingerprint
            );
            continue;
        };
        let duration = (effect.duration.round() as i64)
            .clamp(EFFECT_DURATION_RANGE.0 as i64, EFFECT_DURATION_RANGE.1 as i64)
            as u32;
        effects.push(EffectSpec::new(kind, effect.magnitude.max(0.0), duration));
    }

    let rarity = response
        .rarity
        .as_deref()
        .and_then(Rarity::parse)
        .unwrap_or_else(|| Rarity::from_weight(combination.average_weight(catalog)));

    Ok(GeneratedItem {
        id: ItemId::from_fingerprint(&fingerprint),
        name: name.to_string(),
        description: description.to_string(),
        stats,
        effects,
        rarity,
        source: ItemSource::Generated,
    })
}

/// Pick the stat fields matching the requested kind
///
/// The primary stat is required; secondary stats default rather than fail, to
/// keep as much of the generation as possible.
fn stats_for_kind(kind: ItemKind, stats: &ResponseStats) -> Result<StatBlock, ClientError> {
    match kind {
        ItemKind::Weapon => {
            let damage = stats
                .damage
                .ok_or_else(|| ClientError::InvalidResponse("missing stats.damage".into()))?;
            Ok(StatBlock::weapon(damage, stats.crit_chance.unwrap_or(0.0)))
        }
        ItemKind::Armor => {
            let defense = stats
                .defense
                .ok_or_else(|| ClientError::InvalidResponse("missing stats.defense".into()))?;
            Ok(StatBlock::armor(defense, stats.block_chance.unwrap_or(0.0)))
        }
        ItemKind::Buff => {
            let magnitude = stats.effect_magnitude.ok_or_else(|| {
                ClientError::InvalidResponse("missing stats.effect_magnitude".into())
            })?;
            let duration = stats.duration.unwrap_or(3.0).round().max(0.0) as u32;
            Ok(StatBlock::buff(magnitude, duration))
        }
    }
}
