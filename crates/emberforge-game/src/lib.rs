//! Turn-based combat engine for Emberforge.
//!
//! Crafted items from `emberforge-core` are equipped into a [`Loadout`],
//! two [`Combatant`]s enter a [`CombatSession`], and the session steps
//! turn by turn until one side falls, both fall, or the turn limit calls
//! the fight a draw.

pub mod combat;

pub use combat::{
    ActiveEffect, AttackOutcome, CombatError, CombatSession, Combatant, CombatantSnapshot,
    EffectSet, EquipError, Loadout, Mode, Outcome, SessionSnapshot, TurnReport,
};
