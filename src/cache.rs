// Short-lived cache for the aggregated task query.
//
// A single slot: the last result and when it was computed. Populating it twice
// is harmless (the same query yields the same data), so no coordination beyond
// the mutex around the slot is needed. Uses tokio's clock so tests can pause time.
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How long an aggregated result stays valid.
pub const TASK_DATA_TTL: Duration = Duration::from_secs(60);

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached value if it is younger than the TTL.
    pub fn get(&self) -> Option<T> {
        let slot = self.slot.lock().ok()?;
        let entry = slot.as_ref()?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn store(&self, value: T) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(Entry {
                value,
                stored_at: Instant::now(),
            });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(TASK_DATA_TTL)
    }
}
