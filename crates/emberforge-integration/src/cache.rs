//! Generation cache
//!
//! Fingerprint-keyed store of finished items with an at-most-one-in-flight
//! guarantee per key. The first caller to miss a key becomes the owner of its
//! generation slot; everyone else arriving before the owner finishes gets a
//! wait handle on the same slot. Completion publishes the item to the map and
//! to all waiters; an abort clears the slot and wakes waiters empty-handed so
//! one of them can take over.
//!
//! The mutex guards only map structure and is never held across an await.
//! Entries are immutable once completed.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use emberforge_core::{Fingerprint, GeneratedItem};

enum Slot {
    Ready(Arc<GeneratedItem>),
    InFlight(watch::Receiver<Option<Arc<GeneratedItem>>>),
}

struct CacheInner {
    slots: HashMap<Fingerprint, Slot>,
    /// Ready keys, least recently used first. Only maintained when bounded.
    order: Vec<Fingerprint>,
    capacity: Option<usize>,
}

impl CacheInner {
    fn touch(&mut self, key: &Fingerprint) {
        if self.capacity.is_none() {
            return;
        }
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }

    fn record_ready(&mut self, key: &Fingerprint) {
        let Some(capacity) = self.capacity else {
            return;
        };
        if !self.order.iter().any(|k| k == key) {
            self.order.push(key.clone());
        }
        while self.order.len() > capacity {
            let evicted = self.order.remove(0);
            self.slots.remove(&evicted);
            debug!("Evicted {} from generation cache", evicted);
        }
    }
}

/// Keyed item store with per-key generation mutual exclusion
pub struct GenerationCache {
    inner: Mutex<CacheInner>,
}

/// Result of asking the cache for a key
pub enum Reservation<'a> {
    /// The item is already cached
    Hit(Arc<GeneratedItem>),
    /// The caller owns generation for this key and must complete or abort
    Owner(ReservationGuard<'a>),
    /// Another caller is generating this key; await the handle
    Waiter(WaitHandle),
}

/// Owner side of an in-flight generation slot
///
/// Dropping the guard without calling [`complete`](Self::complete) counts as
/// an abort, so a panicking or cancelled owner never strands waiters.
pub struct ReservationGuard<'a> {
    cache: &'a GenerationCache,
    key: Fingerprint,
    tx: Option<watch::Sender<Option<Arc<GeneratedItem>>>>,
    done: bool,
}

impl ReservationGuard<'_> {
    /// Publish the finished item to the cache and every waiter
    pub fn complete(mut self, item: GeneratedItem) -> Arc<GeneratedItem> {
        let item = Arc::new(item);
        self.done = true;
        self.cache.finish(&self.key, item.clone());
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Some(item.clone()));
        }
        item
    }

    /// Give up the slot, waking waiters so one of them can retry
    pub fn abort(mut self) {
        self.release();
    }

    pub fn key(&self) -> &Fingerprint {
        &self.key
    }

    fn release(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.cache.clear_in_flight(&self.key);
        // Dropping the sender wakes waiters with a closed channel.
        self.tx.take();
    }
}

impl Drop for ReservationGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Waiter side of an in-flight generation slot
pub struct WaitHandle {
    rx: watch::Receiver<Option<Arc<GeneratedItem>>>,
}

impl WaitHandle {
    /// Await the owner's outcome
    ///
    /// `None` means the owner aborted; the caller should reserve again.
    pub async fn wait(mut self) -> Option<Arc<GeneratedItem>> {
        match self.rx.wait_for(|value| value.is_some()).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        }
    }
}

impl GenerationCache {
    /// Unbounded cache; entries live for the process lifetime
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                slots: HashMap::new(),
                order: Vec::new(),
                capacity: None,
            }),
        }
    }

    /// Cache bounded to `capacity` finished entries, evicting the least
    /// recently used. In-flight reservations are never evicted.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                slots: HashMap::new(),
                order: Vec::new(),
                capacity: Some(capacity.max(1)),
            }),
        }
    }

    /// Whether a finished item exists for the key
    pub fn has(&self, key: &Fingerprint) -> bool {
        matches!(self.inner.lock().slots.get(key), Some(Slot::Ready(_)))
    }

    /// Fetch a finished item, refreshing its recency
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<GeneratedItem>> {
        let mut inner = self.inner.lock();
        match inner.slots.get(key) {
            Some(Slot::Ready(item)) => {
                let item = item.clone();
                inner.touch(key);
                Some(item)
            }
            _ => None,
        }
    }

    /// Claim the key: a hit, ownership of generation, or a wait handle
    pub fn reserve(&self, key: &Fingerprint) -> Reservation<'_> {
        let mut inner = self.inner.lock();
        match inner.slots.get(key) {
            Some(Slot::Ready(item)) => {
                let item = item.clone();
                inner.touch(key);
                Reservation::Hit(item)
            }
            Some(Slot::InFlight(rx)) => Reservation::Waiter(WaitHandle { rx: rx.clone() }),
            None => {
                let (tx, rx) = watch::channel(None);
                inner.slots.insert(key.clone(), Slot::InFlight(rx));
                Reservation::Owner(ReservationGuard {
                    cache: self,
                    key: key.clone(),
                    tx: Some(tx),
                    done: false,
                })
            }
        }
    }

    /// Number of finished entries
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed the cache from a JSON file written by [`persist_to`](Self::persist_to)
    ///
    /// Best-effort: problems are logged and leave the cache as it was.
    /// Returns the number of entries loaded.
    pub fn load_from(&self, path: &Path) -> usize {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                if path.exists() {
                    warn!("Failed to read cache file {}: {}", path.display(), err);
                }
                return 0;
            }
        };

        let entries: HashMap<Fingerprint, GeneratedItem> = match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Ignoring corrupt cache file {}: {}", path.display(), err);
                return 0;
            }
        };

        let mut inner = self.inner.lock();
        let mut loaded = 0;
        for (key, item) in entries {
            if matches!(inner.slots.get(&key), Some(Slot::InFlight(_))) {
                continue;
            }
            inner.slots.insert(key.clone(), Slot::Ready(Arc::new(item)));
            inner.record_ready(&key);
            loaded += 1;
        }
        loaded
    }

    /// Write all finished entries to a JSON file
    ///
    /// Best-effort: failures are logged, never propagated.
    pub fn persist_to(&self, path: &Path) {
        let json = {
            let inner = self.inner.lock();
            let entries: std::collections::BTreeMap<&str, &GeneratedItem> = inner
                .slots
                .iter()
                .filter_map(|(key, slot)| match slot {
                    Slot::Ready(item) => Some((key.as_str(), &**item)),
                    Slot::InFlight(_) => None,
                })
                .collect();
            match serde_json::to_string_pretty(&entries) {
                Ok(json) => json,
                Err(err) => {
                    warn!("Failed to serialize generation cache: {}", err);
                    return;
                }
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!("Failed to create cache directory {}: {}", parent.display(), err);
                return;
            }
        }
        if let Err(err) = std::fs::write(path, json) {
            warn!("Failed to write cache file {}: {}", path.display(), err);
        }
    }

    fn finish(&self, key: &Fingerprint, item: Arc<GeneratedItem>) {
        let mut inner = self.inner.lock();
        inner.slots.insert(key.clone(), Slot::Ready(item));
        inner.record_ready(key);
        debug!("Cached item for {}", key);
    }

    fn clear_in_flight(&self, key: &Fingerprint) {
        let mut inner = self.inner.lock();
        if matches!(inner.slots.get(key), Some(Slot::InFlight(_))) {
            inner.slots.remove(key);
        }
    }
}

impl Default for GenerationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::{
        EffectKind, EffectSpec, ItemId, ItemSource, MaterialCatalog, MaterialCombination, Rarity,
        StatBlock,
    };

    fn key(materials: [&str; 3]) -> Fingerprint {
        let catalog = MaterialCatalog::builtin();
        MaterialCombination::new(&catalog, &materials, None, None)
            .unwrap()
            .fingerprint()
    }

    fn item(key: &Fingerprint, name: &str) -> GeneratedItem {
        GeneratedItem {
            id: ItemId::from_fingerprint(key),
            name: name.to_string(),
            description: "For cache tests".to_string(),
            stats: StatBlock::weapon(10.0, 0.1),
            effects: vec![EffectSpec::new(EffectKind::DamageBoost, 2.0, 3)],
            rarity: Rarity::Common,
            source: ItemSource::Fallback,
        }
    }

    #[test]
    fn test_miss_then_complete_then_hit() {
        let cache = GenerationCache::new();
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);

        assert!(!cache.has(&k));
        assert!(cache.get(&k).is_none());

        let Reservation::Owner(guard) = cache.reserve(&k) else {
            panic!("expected ownership on first reserve");
        };
        let completed = guard.complete(item(&k, "First"));

        assert!(cache.has(&k));
        assert_eq!(cache.len(), 1);
        let fetched = cache.get(&k).unwrap();
        assert!(Arc::ptr_eq(&completed, &fetched));

        let Reservation::Hit(hit) = cache.reserve(&k) else {
            panic!("expected a hit after completion");
        };
        assert!(Arc::ptr_eq(&completed, &hit));
    }

    #[test]
    fn test_second_reserve_is_waiter() {
        let cache = GenerationCache::new();
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);

        let Reservation::Owner(_guard) = cache.reserve(&k) else {
            panic!("expected ownership");
        };
        assert!(matches!(cache.reserve(&k), Reservation::Waiter(_)));
        // Still no finished entry while in flight.
        assert!(!cache.has(&k));
    }

    #[test]
    fn test_distinct_keys_both_own() {
        let cache = GenerationCache::new();
        let k1 = key(["steel_ingot", "iron_blade", "dragon_shard"]);
        let k2 = key(["stone", "stone", "stone"]);

        let r1 = cache.reserve(&k1);
        let r2 = cache.reserve(&k2);
        assert!(matches!(r1, Reservation::Owner(_)));
        assert!(matches!(r2, Reservation::Owner(_)));
    }

    #[tokio::test]
    async fn test_waiter_receives_completed_item() {
        let cache = Arc::new(GenerationCache::new());
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);

        let Reservation::Owner(guard) = cache.reserve(&k) else {
            panic!("expected ownership");
        };
        let Reservation::Waiter(handle) = cache.reserve(&k) else {
            panic!("expected waiter");
        };

        let waiter = tokio::spawn(async move { handle.wait().await });
        let completed = guard.complete(item(&k, "Shared"));

        let received = waiter.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&completed, &received));
    }

    #[tokio::test]
    async fn test_abort_wakes_waiter_and_frees_key() {
        let cache = GenerationCache::new();
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);

        let Reservation::Owner(guard) = cache.reserve(&k) else {
            panic!("expected ownership");
        };
        let Reservation::Waiter(handle) = cache.reserve(&k) else {
            panic!("expected waiter");
        };

        guard.abort();
        assert!(handle.wait().await.is_none());

        // The key is free again; the former waiter can take ownership.
        assert!(matches!(cache.reserve(&k), Reservation::Owner(_)));
    }

    #[tokio::test]
    async fn test_dropped_guard_counts_as_abort() {
        let cache = GenerationCache::new();
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);

        {
            let Reservation::Owner(_guard) = cache.reserve(&k) else {
                panic!("expected ownership");
            };
            // Owner goes out of scope without completing.
        }

        assert!(matches!(cache.reserve(&k), Reservation::Owner(_)));
    }

    #[test]
    fn test_lru_eviction_prefers_stale_entries() {
        let cache = GenerationCache::with_capacity(2);
        let k1 = key(["steel_ingot", "steel_ingot", "steel_ingot"]);
        let k2 = key(["iron_blade", "iron_blade", "iron_blade"]);
        let k3 = key(["dragon_shard", "dragon_shard", "dragon_shard"]);

        for k in [&k1, &k2] {
            let Reservation::Owner(guard) = cache.reserve(k) else {
                panic!("expected ownership");
            };
            guard.complete(item(k, "Entry"));
        }

        // Touch k1 so k2 becomes least recently used.
        assert!(cache.get(&k1).is_some());

        let Reservation::Owner(guard) = cache.reserve(&k3) else {
            panic!("expected ownership");
        };
        guard.complete(item(&k3, "Entry"));

        assert!(cache.has(&k1));
        assert!(!cache.has(&k2));
        assert!(cache.has(&k3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_in_flight_not_evicted() {
        let cache = GenerationCache::with_capacity(1);
        let k1 = key(["steel_ingot", "steel_ingot", "steel_ingot"]);
        let k2 = key(["iron_blade", "iron_blade", "iron_blade"]);

        let Reservation::Owner(in_flight) = cache.reserve(&k1) else {
            panic!("expected ownership");
        };

        let Reservation::Owner(guard) = cache.reserve(&k2) else {
            panic!("expected ownership");
        };
        guard.complete(item(&k2, "Finished"));

        // The in-flight slot for k1 survived k2's completion.
        assert!(matches!(cache.reserve(&k1), Reservation::Waiter(_)));
        let completed = in_flight.complete(item(&k1, "Done"));
        assert_eq!(completed.name, "Done");
    }

    #[test]
    fn test_persistence_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "emberforge-cache-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let cache = GenerationCache::new();
        let k = key(["steel_ingot", "iron_blade", "dragon_shard"]);
        let Reservation::Owner(guard) = cache.reserve(&k) else {
            panic!("expected ownership");
        };
        let original = guard.complete(item(&k, "Persisted"));
        cache.persist_to(&path);

        let restored = GenerationCache::new();
        assert_eq!(restored.load_from(&path), 1);
        let loaded = restored.get(&k).unwrap();
        assert_eq!(*loaded, *original);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let cache = GenerationCache::new();
        let path = std::env::temp_dir().join("emberforge-cache-test-missing.json");
        assert_eq!(cache.load_from(&path), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_ignored() {
        let path = std::env::temp_dir().join(format!(
            "emberforge-cache-test-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json at all").unwrap();

        let cache = GenerationCache::new();
        assert_eq!(cache.load_from(&path), 0);
        assert!(cache.is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
