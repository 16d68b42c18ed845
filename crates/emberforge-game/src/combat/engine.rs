//! Attack resolution.
//!
//! An attack is resolved in two phases so a turn can be simultaneous:
//! [`plan_attack`] rolls every random decision against the pre-attack
//! state of both sides, and [`apply_attack`] mutates health, shields and
//! effects afterwards. [`resolve_attack`] composes the two for callers
//! resolving a single attack in isolation.

use emberforge_core::{EffectKind, EffectSpec};
use rand::Rng;

use super::combatant::Combatant;
use super::effect::ActiveEffect;

/// Base damage when no weapon is equipped.
pub const UNARMED_DAMAGE: f32 = 5.0;
/// Damage multiplier on a critical hit.
pub const CRIT_MULTIPLIER: f32 = 1.5;
/// Damage multiplier when the defender blocks.
pub const BLOCK_MULTIPLIER: f32 = 0.5;
/// Fraction of post-shield damage that armor can never mitigate away.
pub const MIN_DAMAGE_FRACTION: f32 = 0.1;
/// Chance per hit for each enemy-targeted weapon effect to be applied.
pub const PROC_CHANCE: f32 = 0.3;

/// Why an attack did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Stunned,
    Down,
}

/// Randomness-dependent decisions for one attack, rolled before either
/// side of a turn has been mutated.
#[derive(Debug, Clone)]
pub struct AttackPlan {
    skip: Option<SkipReason>,
    damage: f32,
    is_crit: bool,
    blocked: bool,
    /// Weapon effects that procced this hit, with the weapon's name.
    procs: Vec<(EffectSpec, String)>,
}

impl AttackPlan {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skip: Some(reason),
            damage: 0.0,
            is_crit: false,
            blocked: false,
            procs: Vec::new(),
        }
    }
}

/// What one resolved attack did.
#[derive(Debug, Clone, Default)]
pub struct AttackOutcome {
    pub skipped: Option<SkipReason>,
    /// Damage that reached the defender's health.
    pub damage_dealt: f32,
    /// Damage soaked by the defender's shield.
    pub absorbed: f32,
    pub is_crit: bool,
    pub blocked: bool,
    pub lifesteal_healed: f32,
    pub reflected: f32,
    pub applied_effects: Vec<EffectKind>,
    pub events: Vec<String>,
}

/// Roll the random decisions for an attack: crit, block, and weapon
/// effect procs. Reads both combatants, mutates neither.
pub fn plan_attack(attacker: &Combatant, defender: &Combatant, rng: &mut impl Rng) -> AttackPlan {
    if !attacker.is_alive() {
        return AttackPlan::skipped(SkipReason::Down);
    }
    if attacker.effects.is_stunned() {
        return AttackPlan::skipped(SkipReason::Stunned);
    }

    let mut damage =
        attacker.weapon_damage().unwrap_or(UNARMED_DAMAGE) + attacker.effects.damage_bonus();

    let is_crit = rng.gen::<f32>() < attacker.crit_chance();
    if is_crit {
        damage *= CRIT_MULTIPLIER;
    }

    let blocked = rng.gen::<f32>() < defender.block_chance();
    if blocked {
        damage *= BLOCK_MULTIPLIER;
    }

    let mut procs = Vec::new();
    if let Some(weapon) = &attacker.loadout.weapon {
        for spec in &weapon.effects {
            if spec.kind.targets_enemy() && rng.gen::<f32>() < PROC_CHANCE {
                procs.push((spec.clone(), weapon.name.clone()));
            }
        }
    }

    AttackPlan {
        skip: None,
        damage,
        is_crit,
        blocked,
        procs,
    }
}

/// Apply a planned attack. Shields absorb first, then armor defense
/// mitigates what got through, floored so armor alone can never reduce a
/// hit to zero. Lifesteal, reflect and effect procs land afterwards.
pub fn apply_attack(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    plan: AttackPlan,
) -> AttackOutcome {
    let mut outcome = AttackOutcome::default();
    if let Some(reason) = plan.skip {
        outcome.skipped = Some(reason);
        if reason == SkipReason::Stunned {
            outcome
                .events
                .push(format!("{} is stunned and cannot attack.", attacker.name));
        }
        return outcome;
    }
    outcome.is_crit = plan.is_crit;
    outcome.blocked = plan.blocked;

    let after_shield = defender.effects.absorb(plan.damage);
    outcome.absorbed = plan.damage - after_shield;

    if after_shield > 0.0 {
        let dealt =
            (after_shield - defender.defense()).max(after_shield * MIN_DAMAGE_FRACTION);
        defender.take_damage(dealt);
        outcome.damage_dealt = dealt;
    }

    let mut line = format!(
        "{} hits {} with {} for {:.1} damage",
        attacker.name,
        defender.name,
        attacker.weapon_name(),
        outcome.damage_dealt
    );
    if outcome.is_crit {
        line.push_str(" (critical)");
    }
    if outcome.blocked {
        line.push_str(" (blocked)");
    }
    line.push('.');
    outcome.events.push(line);
    if outcome.absorbed > 0.0 {
        outcome.events.push(format!(
            "{}'s shield absorbs {:.1} damage.",
            defender.name, outcome.absorbed
        ));
    }

    if outcome.damage_dealt > 0.0 {
        let healed = outcome.damage_dealt * attacker.effects.lifesteal_fraction();
        if healed > 0.0 {
            attacker.heal(healed);
            outcome.lifesteal_healed = healed;
            outcome
                .events
                .push(format!("{} drains {:.1} health.", attacker.name, healed));
        }

        let reflected = outcome.damage_dealt * defender.effects.reflect_fraction();
        if reflected > 0.0 {
            attacker.take_damage(reflected);
            outcome.reflected = reflected;
            outcome.events.push(format!(
                "{} reflects {:.1} damage back at {}.",
                defender.name, reflected, attacker.name
            ));
        }
    }

    for (spec, source) in plan.procs {
        defender
            .effects
            .apply(ActiveEffect::from_spec(&spec, source.clone()));
        outcome.applied_effects.push(spec.kind);
        outcome.events.push(format!(
            "{} is afflicted with {} by {}.",
            defender.name,
            spec.kind.as_str(),
            source
        ));
    }

    outcome
}

/// Plan and immediately apply a single attack.
pub fn resolve_attack(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let plan = plan_attack(attacker, defender, rng);
    apply_attack(attacker, defender, plan)
}
