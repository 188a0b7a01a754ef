//! Bounded, TTL-expiring permission-check cache.
//!
//! Purely an optimization: disabling the cache must not change any boolean
//! returned by the resolver, only latency and store-query volume. In a
//! horizontally-scaled deployment each instance holds its own cache, so hits
//! are best-effort and never a correctness dependency.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use warden_core::{Key, MemberId};

/// Composite key identifying one permission question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub member_id: MemberId,
    pub application_key: Key,
    pub resource_key: Key,
    pub action_key: Key,
}

impl Fingerprint {
    pub fn new(member_id: MemberId, application_key: Key, resource_key: Key, action_key: Key) -> Self {
        Self {
            member_id,
            application_key,
            resource_key,
            action_key,
        }
    }

    /// Render the four components colon-joined. Colons cannot appear in any
    /// component (UUIDs and validated keys), so the rendering is injective.
    pub fn render(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.member_id, self.application_key, self.resource_key, self.action_key
        )
    }
}

/// Cache tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    allowed: bool,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Insertion order, oldest first. Invariant: holds exactly the keys of
    /// `entries`, so its length is bounded by capacity too.
    order: VecDeque<String>,
}

/// Fingerprint → boolean store with TTL expiry and oldest-first eviction.
///
/// Explicitly scoped (constructor-injected into the resolver) rather than a
/// process-wide singleton, so tests control TTL and capacity per instance.
#[derive(Debug)]
pub struct PermissionCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    capacity: usize,
}

impl PermissionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl: config.ttl,
            capacity: config.capacity,
        }
    }

    /// Look up a live entry; an entry past its TTL is evicted and reported
    /// absent.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<bool> {
        self.get_at(fingerprint, Instant::now())
    }

    /// Insert or overwrite; at capacity with a new key, the oldest-inserted
    /// entry is evicted first.
    pub fn set(&self, fingerprint: &Fingerprint, allowed: bool) {
        self.set_at(fingerprint, allowed, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, fingerprint: &Fingerprint, now: Instant) -> Option<bool> {
        let key = fingerprint.render();
        let mut inner = self.inner.lock().ok()?;

        let entry = *inner.entries.get(&key)?;
        if now.duration_since(entry.stored_at) <= self.ttl {
            return Some(entry.allowed);
        }

        // Drop the expired entry from both structures. Leaving the key in
        // `order` would let the deque grow one stale key per expire/reinsert
        // cycle and misdirect oldest-first eviction.
        inner.entries.remove(&key);
        inner.order.retain(|k| *k != key);
        None
    }

    fn set_at(&self, fingerprint: &Fingerprint, allowed: bool, now: Instant) {
        if self.capacity == 0 {
            return;
        }

        let key = fingerprint.render();
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        let is_new = !inner.entries.contains_key(&key);
        if is_new {
            while inner.entries.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(key.clone());
        }

        inner.entries.insert(
            key,
            Entry {
                allowed,
                stored_at: now,
            },
        );
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
