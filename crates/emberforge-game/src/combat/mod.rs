//! Turn-based combat: combatants, status effects, attack resolution and
//! the session loop that ties them together.

pub mod combatant;
pub mod effect;
pub mod engine;
pub mod session;

pub use combatant::{Combatant, EquipError, Loadout};
pub use effect::{ActiveEffect, EffectSet, TurnTick};
pub use engine::{
    apply_attack, plan_attack, resolve_attack, AttackOutcome, AttackPlan, SkipReason,
    BLOCK_MULTIPLIER, CRIT_MULTIPLIER, MIN_DAMAGE_FRACTION, PROC_CHANCE, UNARMED_DAMAGE,
};
pub use session::{
    CombatError, CombatSession, CombatantSnapshot, Mode, Outcome, SessionSnapshot, TurnReport,
    DEFAULT_TURN_LIMIT,
};
