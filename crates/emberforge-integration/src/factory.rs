//! Item factory
//!
//! The single entry point for crafting: validates the combination, consults
//! the cache, and runs at most one generation per fingerprint. Generation
//! failures never reach the caller; the deterministic fallback substitutes
//! for the remote service whenever it misbehaves or is disabled.

use std::sync::Arc;

use tracing::{debug, info, warn};

use emberforge_core::{
    CombinationError, GeneratedItem, ItemKind, MaterialCatalog, MaterialCombination, WeaponStyle,
};

use crate::cache::{GenerationCache, Reservation};
use crate::client::ItemGenerator;
use crate::fallback::FallbackGenerator;

/// Crafts items through the cache, the generation client, and the fallback
pub struct ItemFactory<G: ItemGenerator> {
    catalog: Arc<MaterialCatalog>,
    cache: Arc<GenerationCache>,
    client: Option<G>,
    fallback: FallbackGenerator,
}

impl<G: ItemGenerator> ItemFactory<G> {
    /// Build a factory; pass `None` to craft offline-only
    pub fn new(
        catalog: Arc<MaterialCatalog>,
        cache: Arc<GenerationCache>,
        client: Option<G>,
    ) -> Self {
        let fallback = FallbackGenerator::new(catalog.clone());
        Self {
            catalog,
            cache,
            client,
            fallback,
        }
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// Craft from raw material identifiers
    ///
    /// Only a malformed combination can fail; generation trouble is absorbed
    /// by the fallback.
    pub async fn craft(
        &self,
        materials: &[&str],
        kind: Option<ItemKind>,
        style: Option<WeaponStyle>,
    ) -> Result<Arc<GeneratedItem>, CombinationError> {
        let combination = MaterialCombination::new(&self.catalog, materials, kind, style)?;
        Ok(self.craft_combination(&combination).await)
    }

    /// Craft a validated combination
    ///
    /// Identical combinations always return the identical cached item, and
    /// exactly one generation runs per fingerprint regardless of how many
    /// callers race for it.
    pub async fn craft_combination(&self, combination: &MaterialCombination) -> Arc<GeneratedItem> {
        let key = combination.fingerprint();
        loop {
            match self.cache.reserve(&key) {
                Reservation::Hit(item) => {
                    debug!("Cache hit for {}", key);
                    return item;
                }
                Reservation::Waiter(handle) => {
                    debug!("Awaiting in-flight generation for {}", key);
                    if let Some(item) = handle.wait().await {
                        return item;
                    }
                    // The owner aborted; race for the slot again.
                }
                Reservation::Owner(guard) => {
                    let item = self.generate(combination).await;
                    info!("Crafted {} ({})", item.name, item.rarity.name());
                    return guard.complete(item);
                }
            }
        }
    }

    async fn generate(&self, combination: &MaterialCombination) -> GeneratedItem {
        if let Some(client) = &self.client {
            match client.generate(combination).await {
                Ok(item) => return item,
                Err(err) => {
                    warn!(
                        "Generation failed for {}: {}. Using fallback.",
                        combination.fingerprint(),
                        err
                    );
                }
            }
        }
        self.fallback.generate(combination)
    }
}
