//! Per-process lookup cache fronting the external KV store.

// Layer 1: Standard library imports
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::registry::traits::ActorLocation;

enum Expiry {
    /// Locally-owned entries never expire from the cache on their own —
    /// they are invalidated explicitly on unregister.
    Never,
    At(Instant),
}

struct Entry {
    location: ActorLocation,
    expiry: Expiry,
}

/// Caches `name -> location` resolutions for up to `cache_ttl`, or
/// indefinitely for entries this node owns.
pub struct LookupCache {
    cache_ttl: Duration,
    entries: DashMap<String, Entry>,
}

impl LookupCache {
    pub fn new(cache_ttl: Duration) -> Self {
        Self { cache_ttl, entries: DashMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<ActorLocation> {
        let entry = self.entries.get(name)?;
        match entry.expiry {
            Expiry::Never => Some(entry.location.clone()),
            Expiry::At(at) if Instant::now() < at => Some(entry.location.clone()),
            Expiry::At(_) => None,
        }
    }

    pub fn prime(&self, name: &str, location: ActorLocation) {
        self.entries.insert(
            name.to_string(),
            Entry { location, expiry: Expiry::At(Instant::now() + self.cache_ttl) },
        );
    }

    /// Prime an entry this node owns — it is never evicted by TTL.
    pub fn prime_owned(&self, name: &str, location: ActorLocation) {
        self.entries.insert(name.to_string(), Entry { location, expiry: Expiry::Never });
    }

    pub fn invalidate(&self, name: &str) {
        self.entries.remove(name);
    }
}
