//! Single-slot in-memory cache with a freshness deadline
//!
//! Provides an `ExpiringCache` that holds one value together with the instant
//! at which it stops being fresh. Providers own one of these per slowly
//! changing collection for the lifetime of the process.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

/// The value and its deadline, always written together
#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    expires_at: Option<Instant>,
}

/// A cache holding at most one value and the instant it expires
///
/// Reads never trigger a fetch; the owner decides when to refresh by checking
/// [`ExpiringCache::is_expired`] and calling [`ExpiringCache::set`]. The value
/// and its deadline live behind a single lock, so a reader always sees a pair
/// that was written by the same `set` call.
///
/// Concurrent owners may both observe an expired slot and both refresh it.
/// The last `set` wins.
#[derive(Debug)]
pub struct ExpiringCache<T> {
    ttl: Duration,
    slot: RwLock<Slot<T>>,
}

impl<T: Clone> ExpiringCache<T> {
    /// Creates an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(Slot {
                value: None,
                expires_at: None,
            }),
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored value, fresh or not
    pub fn get(&self) -> Option<T> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.value.clone()
    }

    /// Returns the stored value only if it has not expired yet
    pub fn get_fresh(&self) -> Option<T> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match slot.expires_at {
            Some(deadline) if Instant::now() < deadline => slot.value.clone(),
            _ => None,
        }
    }

    /// Whether the slot is empty or its deadline has been reached
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(deadline) => Instant::now() >= deadline,
            None => true,
        }
    }

    /// When the current value stops being fresh, if a value was ever set
    pub fn expires_at(&self) -> Option<Instant> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.expires_at
    }

    /// Stores `value` and moves the deadline to `now + ttl`
    pub fn set(&self, value: T) {
        let expires_at = Instant::now() + self.ttl;
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.value = Some(value);
        slot.expires_at = Some(expires_at);
    }
}
