//! Emberforge Core - foundational types for the crafting and combat system
//!
//! This crate provides the data model shared by the generation layer and the
//! combat engine:
//! - Materials and the built-in material catalog
//! - Order-independent material combinations and their cache fingerprints
//! - Generated items with type-dependent stat blocks and rarity
//! - The effect vocabulary items may carry into combat
//!
//! No I/O lives here; everything is a pure data type or a pure function.

pub mod catalog;
pub mod combination;
pub mod effect;
pub mod error;
pub mod item;
pub mod material;

pub use catalog::MaterialCatalog;
pub use combination::{Fingerprint, ItemKind, MaterialCombination, WeaponStyle};
pub use effect::{EffectKind, EffectSpec};
pub use error::CombinationError;
pub use item::{GeneratedItem, ItemId, ItemSource, Rarity, StatBlock};
pub use material::{Material, MaterialCategory};
