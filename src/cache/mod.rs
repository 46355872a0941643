//! Cache module for holding provider responses in memory
//!
//! This module provides a single-slot cache with a fixed TTL (time-to-live).
//! Expired values are never handed out as fresh; the owning provider decides
//! when to refetch.

mod expiring;

pub use expiring::ExpiringCache;
