//! Combatants and their equipped items.

use std::fmt;
use std::sync::Arc;

use emberforge_core::{GeneratedItem, ItemKind, StatBlock};

use super::effect::EffectSet;

/// Equipping an item into a slot that does not match its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipError {
    WrongKind { expected: ItemKind, got: ItemKind },
}

impl fmt::Display for EquipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipError::WrongKind { expected, got } => {
                write!(f, "cannot equip a {} item into the {} slot", got, expected)
            }
        }
    }
}

impl std::error::Error for EquipError {}

/// The three equipment slots a combatant carries into a fight. Each slot
/// holds at most one item, and re-equipping replaces what was there.
#[derive(Debug, Clone, Default)]
pub struct Loadout {
    pub weapon: Option<Arc<GeneratedItem>>,
    pub armor: Option<Arc<GeneratedItem>>,
    pub buff: Option<Arc<GeneratedItem>>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: ItemKind) -> &mut Option<Arc<GeneratedItem>> {
        match kind {
            ItemKind::Weapon => &mut self.weapon,
            ItemKind::Armor => &mut self.armor,
            ItemKind::Buff => &mut self.buff,
        }
    }

    /// Equip an item into an explicit slot, returning whatever it replaced.
    pub fn equip(
        &mut self,
        slot: ItemKind,
        item: Arc<GeneratedItem>,
    ) -> Result<Option<Arc<GeneratedItem>>, EquipError> {
        if item.kind() != slot {
            return Err(EquipError::WrongKind {
                expected: slot,
                got: item.kind(),
            });
        }
        Ok(self.slot_mut(slot).replace(item))
    }

    /// Equip an item into the slot matching its kind.
    pub fn equip_any(&mut self, item: Arc<GeneratedItem>) -> Option<Arc<GeneratedItem>> {
        self.slot_mut(item.kind()).replace(item)
    }

    pub fn slot(&self, kind: ItemKind) -> Option<&Arc<GeneratedItem>> {
        match kind {
            ItemKind::Weapon => self.weapon.as_ref(),
            ItemKind::Armor => self.armor.as_ref(),
            ItemKind::Buff => self.buff.as_ref(),
        }
    }

    /// Equipped items in slot order: weapon, armor, buff.
    pub fn items(&self) -> impl Iterator<Item = &Arc<GeneratedItem>> {
        [&self.weapon, &self.armor, &self.buff]
            .into_iter()
            .filter_map(|slot| slot.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.weapon.is_none() && self.armor.is_none() && self.buff.is_none()
    }
}

/// One side of a fight.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub max_health: f32,
    pub health: f32,
    pub loadout: Loadout,
    pub effects: EffectSet,
}

impl Combatant {
    pub fn new(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            max_health,
            health: max_health,
            loadout: Loadout::new(),
            effects: EffectSet::new(),
        }
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Damage stat of the equipped weapon, or `None` when fighting unarmed.
    pub fn weapon_damage(&self) -> Option<f32> {
        match self.loadout.weapon.as_deref().map(|item| &item.stats) {
            Some(StatBlock::Weapon { damage, .. }) => Some(*damage),
            _ => None,
        }
    }

    pub fn crit_chance(&self) -> f32 {
        match self.loadout.weapon.as_deref().map(|item| &item.stats) {
            Some(StatBlock::Weapon { crit_chance, .. }) => *crit_chance,
            _ => 0.0,
        }
    }

    pub fn defense(&self) -> f32 {
        match self.loadout.armor.as_deref().map(|item| &item.stats) {
            Some(StatBlock::Armor { defense, .. }) => *defense,
            _ => 0.0,
        }
    }

    pub fn block_chance(&self) -> f32 {
        match self.loadout.armor.as_deref().map(|item| &item.stats) {
            Some(StatBlock::Armor { block_chance, .. }) => *block_chance,
            _ => 0.0,
        }
    }

    /// Name used in event lines for the attacker's weapon.
    pub fn weapon_name(&self) -> &str {
        self.loadout
            .weapon
            .as_deref()
            .map_or("bare hands", |item| item.name.as_str())
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Heal up to max health.
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}
