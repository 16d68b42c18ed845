//! Combat sessions.
//!
//! A [`CombatSession`] owns two combatants and drives the turn loop:
//! periodic effects tick at the start of a turn, both attacks resolve
//! simultaneously against the pre-attack state, and durations decay at
//! the end. The session records every turn as human-readable event lines
//! and reports a terminal [`Outcome`] once someone falls or the turn
//! limit is hit.

use std::fmt;

use emberforge_core::{EffectKind, GeneratedItem, ItemKind, StatBlock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::combatant::Combatant;
use super::effect::ActiveEffect;
use super::engine::{apply_attack, plan_attack};

/// Turns before an undecided fight is called a draw.
pub const DEFAULT_TURN_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    /// Stepping a session whose outcome is already decided.
    AlreadyTerminal,
}

impl fmt::Display for CombatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatError::AlreadyTerminal => write!(f, "combat session is already over"),
        }
    }
}

impl std::error::Error for CombatError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Combatant1Won,
    Combatant2Won,
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        *self != Outcome::InProgress
    }

    pub fn name(&self) -> &'static str {
        match self {
            Outcome::InProgress => "in progress",
            Outcome::Combatant1Won => "combatant 1 won",
            Outcome::Combatant2Won => "combatant 2 won",
            Outcome::Draw => "draw",
        }
    }
}

/// Whether turns are advanced one call at a time or run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Manual,
    Auto,
}

/// Everything one call to [`CombatSession::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub turn: u32,
    pub events: Vec<String>,
    pub outcome: Outcome,
}

/// Point-in-time view of a session, for display or persistence.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub turn: u32,
    pub outcome: Outcome,
    pub combatants: Vec<CombatantSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub effects: Vec<ActiveEffect>,
}

pub struct CombatSession {
    id: Uuid,
    combatants: [Combatant; 2],
    turn: u32,
    turn_limit: u32,
    mode: Mode,
    outcome: Outcome,
    rng: StdRng,
    log: Vec<String>,
}

impl CombatSession {
    pub fn new(first: Combatant, second: Combatant) -> Self {
        Self::build(first, second, StdRng::from_entropy())
    }

    /// Seeded session: same seed and loadouts replay the same fight.
    pub fn with_seed(first: Combatant, second: Combatant, seed: u64) -> Self {
        Self::build(first, second, StdRng::seed_from_u64(seed))
    }

    fn build(first: Combatant, second: Combatant, rng: StdRng) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            combatants: [first, second],
            turn: 0,
            turn_limit: DEFAULT_TURN_LIMIT,
            mode: Mode::Manual,
            outcome: Outcome::InProgress,
            rng,
            log: Vec::new(),
        };
        session.begin();
        session
    }

    pub fn with_turn_limit(mut self, limit: u32) -> Self {
        self.turn_limit = limit.max(1);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn in_progress(&self) -> bool {
        self.outcome == Outcome::InProgress
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    /// Every event line recorded so far, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            turn: self.turn,
            outcome: self.outcome,
            combatants: self
                .combatants
                .iter()
                .map(|c| CombatantSnapshot {
                    name: c.name.clone(),
                    health: c.health,
                    max_health: c.max_health,
                    effects: c.effects.iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Apply equipped item effects that target their owner. Runs once,
    /// before the first turn.
    fn begin(&mut self) {
        self.log.push(format!(
            "{} squares off against {}.",
            self.combatants[0].name, self.combatants[1].name
        ));
        for combatant in &mut self.combatants {
            let effects: Vec<ActiveEffect> = combatant
                .loadout
                .items()
                .flat_map(|item| start_effects(item))
                .collect();
            for effect in effects {
                self.log.push(format!(
                    "{} gains {} from {}.",
                    combatant.name,
                    effect.kind.as_str(),
                    effect.source
                ));
                combatant.effects.apply(effect);
            }
        }
        debug!("Combat session {} started", self.id);
    }

    /// Advance one turn. Errors once the session is terminal.
    pub fn step(&mut self) -> Result<TurnReport, CombatError> {
        if self.outcome.is_terminal() {
            return Err(CombatError::AlreadyTerminal);
        }
        self.turn += 1;
        let mut events = Vec::new();

        // Turn start: heal-over-time lands before poison and burn, and a
        // combatant dropped to zero here still skips their attack below.
        for combatant in &mut self.combatants {
            let tick = combatant.effects.tick_turn_start(&combatant.name);
            if tick.healing > 0.0 {
                combatant.heal(tick.healing);
            }
            if tick.damage > 0.0 {
                combatant.take_damage(tick.damage);
            }
            events.extend(tick.events);
            if !combatant.is_alive() {
                events.push(format!("{} collapses.", combatant.name));
            }
        }

        // Attack phase: both attacks are rolled against the same
        // pre-attack state, so a stun or kill landing this turn cannot
        // cancel the counterattack.
        let [first, second] = &mut self.combatants;
        let plan_first = plan_attack(first, second, &mut self.rng);
        let plan_second = plan_attack(second, first, &mut self.rng);
        events.extend(apply_attack(first, second, plan_first).events);
        events.extend(apply_attack(second, first, plan_second).events);

        // Turn end: durations decay, then deaths and the turn bound.
        for combatant in &mut self.combatants {
            events.extend(combatant.effects.decay(&combatant.name));
        }

        let first_alive = self.combatants[0].is_alive();
        let second_alive = self.combatants[1].is_alive();
        self.outcome = match (first_alive, second_alive) {
            (false, false) => Outcome::Draw,
            (false, true) => Outcome::Combatant2Won,
            (true, false) => Outcome::Combatant1Won,
            (true, true) if self.turn >= self.turn_limit => Outcome::Draw,
            (true, true) => Outcome::InProgress,
        };
        match self.outcome {
            Outcome::Combatant1Won => events.push(format!(
                "{} wins on turn {}.",
                self.combatants[0].name, self.turn
            )),
            Outcome::Combatant2Won => events.push(format!(
                "{} wins on turn {}.",
                self.combatants[1].name, self.turn
            )),
            Outcome::Draw if !first_alive && !second_alive => {
                events.push("Both combatants fall. The duel is a draw.".to_string());
            }
            Outcome::Draw => {
                events.push(format!(
                    "Turn limit reached after {} turns. The duel is a draw.",
                    self.turn
                ));
            }
            Outcome::InProgress => {}
        }
        debug!(
            "Turn {}: {} at {:.1}, {} at {:.1}",
            self.turn,
            self.combatants[0].name,
            self.combatants[0].health,
            self.combatants[1].name,
            self.combatants[1].health
        );
        if self.outcome.is_terminal() {
            info!(
                "Combat session {} ended after {} turns: {}",
                self.id,
                self.turn,
                self.outcome.name()
            );
        }

        self.log.extend(events.iter().cloned());
        Ok(TurnReport {
            turn: self.turn,
            events,
            outcome: self.outcome,
        })
    }

    /// Step until the session is terminal. Termination is guaranteed by
    /// the turn limit.
    pub fn run_auto(&mut self) -> Outcome {
        self.mode = Mode::Auto;
        while self.in_progress() {
            if self.step().is_err() {
                break;
            }
        }
        self.outcome
    }
}

/// Effects an equipped item grants its owner when combat starts.
/// Enemy-targeted weapon effects are excluded; those proc on hit instead.
/// A buff item with no effect list falls back to a heal-over-time built
/// from its stat block, so crafting one is never a dead slot.
fn start_effects(item: &GeneratedItem) -> Vec<ActiveEffect> {
    let mut effects: Vec<ActiveEffect> = item
        .effects
        .iter()
        .filter(|spec| !spec.kind.targets_enemy())
        .map(|spec| ActiveEffect::from_spec(spec, item.name.clone()))
        .collect();
    if effects.is_empty() && item.kind() == ItemKind::Buff {
        if let StatBlock::Buff {
            effect_magnitude,
            duration,
        } = &item.stats
        {
            effects.push(ActiveEffect::new(
                EffectKind::HealOverTime,
                *effect_magnitude,
                *duration,
                item.name.clone(),
            ));
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::{EffectSpec, ItemId, ItemSource, Rarity};
    use std::sync::Arc;

    fn make_item(name: &str, stats: StatBlock, effects: Vec<EffectSpec>) -> Arc<GeneratedItem> {
        Arc::new(GeneratedItem {
            id: ItemId(name.to_string()),
            name: name.to_string(),
            description: "A test item.".to_string(),
            stats,
            effects,
            rarity: Rarity::Common,
            source: ItemSource::Fallback,
        })
    }

    fn fighter(name: &str, health: f32, damage: f32) -> Combatant {
        let mut combatant = Combatant::new(name, health);
        combatant
            .loadout
            .equip_any(make_item("Test Blade", StatBlock::weapon(damage, 0.0), Vec::new()));
        combatant
    }

    #[test]
    fn test_mutual_lethal_hits_end_in_a_draw() {
        let first = fighter("Aldren", 10.0, 100.0);
        let second = fighter("Brakk", 10.0, 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);

        let report = session.step().unwrap();
        assert_eq!(report.turn, 1);
        assert_eq!(report.outcome, Outcome::Draw);
        assert_eq!(session.combatants()[0].health, 0.0);
        assert_eq!(session.combatants()[1].health, 0.0);
    }

    #[test]
    fn test_step_after_terminal_is_an_error() {
        let first = fighter("Aldren", 10.0, 100.0);
        let second = fighter("Brakk", 10.0, 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);

        session.step().unwrap();
        assert_eq!(session.step(), Err(CombatError::AlreadyTerminal));
    }

    #[test]
    fn test_defeated_side_still_lands_its_simultaneous_attack() {
        let first = fighter("Aldren", 100.0, 100.0);
        let second = Combatant::new("Brakk", 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);

        let report = session.step().unwrap();
        assert_eq!(report.outcome, Outcome::Combatant1Won);
        assert_eq!(session.combatants()[1].health, 0.0);
        // Brakk's unarmed counterattack was rolled before he fell.
        assert_eq!(session.combatants()[0].health, 95.0);
    }

    #[test]
    fn test_turn_limit_forces_a_draw() {
        let mut first = fighter("Aldren", 100.0, 10.0);
        first
            .loadout
            .equip_any(make_item("Test Plate", StatBlock::armor(50.0, 0.0), Vec::new()));
        let mut second = fighter("Brakk", 100.0, 10.0);
        second
            .loadout
            .equip_any(make_item("Test Plate", StatBlock::armor(50.0, 0.0), Vec::new()));

        let mut session = CombatSession::with_seed(first, second, 7).with_turn_limit(10);
        let outcome = session.run_auto();
        assert_eq!(outcome, Outcome::Draw);
        assert_eq!(session.turn(), 10);
        assert!(session.combatants()[0].is_alive());
        assert!(session.combatants()[1].is_alive());
    }

    #[test]
    fn test_unarmed_mirror_match_ends_at_mutual_exhaustion() {
        let first = Combatant::new("Aldren", 100.0);
        let second = Combatant::new("Brakk", 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);

        let outcome = session.run_auto();
        // 5 unarmed damage a turn on 100 health kills both on turn 20.
        assert_eq!(outcome, Outcome::Draw);
        assert_eq!(session.turn(), 20);
    }

    #[test]
    fn test_duration_one_effect_ticks_exactly_once() {
        let mut first = Combatant::new("Aldren", 100.0);
        first
            .effects
            .apply(ActiveEffect::new(EffectKind::Poison, 4.0, 1, "Venom Fang"));
        let second = Combatant::new("Brakk", 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);

        session.step().unwrap();
        // One poison tick plus the unarmed hit, then the poison is gone.
        assert_eq!(session.combatants()[0].health, 91.0);
        assert!(!session.combatants()[0].effects.has(EffectKind::Poison));

        session.step().unwrap();
        assert_eq!(session.combatants()[0].health, 86.0);
    }

    #[test]
    fn test_buff_item_applies_its_effects_at_start() {
        let buff = make_item(
            "Moonflower Elixir",
            StatBlock::buff(3.0, 2),
            vec![EffectSpec::new(EffectKind::HealOverTime, 3.0, 2)],
        );
        let mut first = Combatant::new("Aldren", 100.0);
        first.loadout.equip_any(buff);
        let second = Combatant::new("Brakk", 100.0);

        let session = CombatSession::with_seed(first, second, 7);
        assert!(session.combatants()[0].effects.has(EffectKind::HealOverTime));
        assert!(session.log().iter().any(|line| line.contains("gains")));
    }

    #[test]
    fn test_buff_item_without_effects_falls_back_to_its_stats() {
        let buff = make_item("Plain Tonic", StatBlock::buff(8.0, 3), Vec::new());
        let mut first = Combatant::new("Aldren", 100.0);
        first.loadout.equip_any(buff);
        let second = Combatant::new("Brakk", 100.0);

        let session = CombatSession::with_seed(first, second, 7);
        let effect = session.combatants()[0]
            .effects
            .get(EffectKind::HealOverTime)
            .unwrap();
        assert_eq!(effect.magnitude, 8.0);
        assert_eq!(effect.remaining_duration, 3);
    }

    #[test]
    fn test_same_seed_replays_the_same_fight() {
        let build = || {
            let mut first = Combatant::new("Aldren", 60.0);
            first
                .loadout
                .equip_any(make_item("Test Blade", StatBlock::weapon(20.0, 0.5), Vec::new()));
            let mut second = Combatant::new("Brakk", 60.0);
            second
                .loadout
                .equip_any(make_item("Test Plate", StatBlock::armor(5.0, 0.5), Vec::new()));
            CombatSession::with_seed(first, second, 42)
        };

        let mut left = build();
        let mut right = build();
        assert_eq!(left.run_auto(), right.run_auto());
        assert_eq!(left.turn(), right.turn());
        assert_eq!(left.log(), right.log());
    }

    #[test]
    fn test_snapshot_reflects_session_state() {
        let first = fighter("Aldren", 100.0, 20.0);
        let second = Combatant::new("Brakk", 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);
        session.step().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.turn, 1);
        assert_eq!(snapshot.combatants.len(), 2);
        assert_eq!(snapshot.combatants[1].health, 80.0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["outcome"], "in_progress");
        assert_eq!(json["combatants"][0]["name"], "Aldren");
    }

    #[test]
    fn test_run_auto_marks_mode_and_terminal_outcome() {
        let first = fighter("Aldren", 30.0, 100.0);
        let second = Combatant::new("Brakk", 100.0);
        let mut session = CombatSession::with_seed(first, second, 7);
        assert_eq!(session.mode(), Mode::Manual);
        session.set_mode(Mode::Auto);
        session.set_mode(Mode::Manual);
        assert_eq!(session.mode(), Mode::Manual);

        let outcome = session.run_auto();
        assert_eq!(session.mode(), Mode::Auto);
        assert_eq!(outcome, Outcome::Combatant1Won);
        assert!(session.outcome().is_terminal());
    }
}
