use crate::domain::signal::SignalResult;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, error};

#[derive(Debug, Clone)]
struct CachedSignal {
    result: SignalResult,
    stored_at: Instant,
}

/// Time-bounded signal results keyed by symbol.
///
/// Writes are last-writer-wins; a reader racing a refresh may see the
/// previous entry until the new one lands.
pub struct SignalCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedSignal>>,
}

// Manual Debug implementation for SignalCache
impl std::fmt::Debug for SignalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalCache")
            .field("ttl", &self.ttl)
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl SignalCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached result for `symbol`, if younger than the TTL.
    pub fn get(&self, symbol: &str) -> Option<SignalResult> {
        let guard = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SignalCache: lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        };

        let entry = guard.get(symbol)?;
        if entry.stored_at.elapsed() < self.ttl {
            debug!("SignalCache: HIT for {}", symbol);
            Some(entry.result.clone())
        } else {
            debug!("SignalCache: STALE entry for {}", symbol);
            None
        }
    }

    pub fn insert(&self, symbol: impl Into<String>, result: SignalResult) {
        let entry = CachedSignal {
            result,
            stored_at: Instant::now(),
        };

        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(symbol.into(), entry);
            }
            Err(poisoned) => {
                error!("SignalCache: lock poisoned during write, recovering");
                poisoned.into_inner().insert(symbol.into(), entry);
            }
        }
    }

    pub fn invalidate(&self, symbol: &str) -> bool {
        match self.entries.write() {
            Ok(mut guard) => guard.remove(symbol).is_some(),
            Err(poisoned) => poisoned.into_inner().remove(symbol).is_some(),
        }
    }

    pub fn clear(&self) {
        match self.entries.write() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Drops stale entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let before = guard.len();
        guard.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
