// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Short-lived cache of the latest event per topic and originator.
//!
//! Events are stored as they stream in on subscribed topics and served to
//! `meta.last_event` calls so that several observers of one topic trigger a
//! single network lookup. Entries live while their topic is subscribed:
//! releasing the last subscription schedules the topic's removal on the next
//! turn of the scheduler, and a store or resubscription in between cancels
//! it. At most `capacity` topics are kept; the least recently stored topic
//! is evicted first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;
use wl_core::TopicEvent;

/// Default number of topics kept.
pub const DEFAULT_CAPACITY: usize = 100;

pub struct ResponseCache {
    capacity: usize,
    expiry_delay: Duration,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    topics: HashMap<String, TopicEntry>,
    /// Monotonic store counter used for eviction order.
    clock: u64,
    /// Source of expiry tokens.
    expiries: u64,
}

struct TopicEntry {
    by_originator: HashMap<String, TopicEvent>,
    stored_at: u64,
    /// Token of the scheduled removal, if one is pending.
    pending_expiry: Option<u64>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_expiry_delay(capacity, Duration::ZERO)
    }

    /// A cache whose expiries wait `delay` instead of a single scheduler turn.
    pub fn with_expiry_delay(capacity: usize, delay: Duration) -> Self {
        ResponseCache {
            capacity: capacity.max(1),
            expiry_delay: delay,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store `event` under its topic and originator.
    ///
    /// Events without an originator are not cached; returns whether the
    /// event was stored.
    pub fn store(&self, event: TopicEvent) -> bool {
        let Some(originator) = event.originator.clone() else {
            return false;
        };

        let mut state = self.state.lock();
        state.clock += 1;
        let stamp = state.clock;
        let topic = event.topic.clone();
        let entry = state
            .topics
            .entry(topic.clone())
            .or_insert_with(|| TopicEntry {
                by_originator: HashMap::new(),
                stored_at: stamp,
                pending_expiry: None,
            });
        entry.by_originator.insert(originator, event);
        entry.stored_at = stamp;
        entry.pending_expiry = None;

        while state.topics.len() > self.capacity {
            let oldest = state
                .topics
                .iter()
                .filter(|(name, _)| **name != topic)
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(name, _)| name.clone());
            let Some(oldest) = oldest else { break };
            trace!(topic = %oldest, "evicting cached topic");
            state.topics.remove(&oldest);
        }
        true
    }

    /// The latest event `originator` published on `topic`, if cached.
    pub fn lookup(&self, originator: &str, topic: &str) -> Option<TopicEvent> {
        self.state
            .lock()
            .topics
            .get(topic)
            .and_then(|entry| entry.by_originator.get(originator))
            .cloned()
    }

    /// Schedule removal of `topic`.
    ///
    /// The removal happens on a later scheduler turn and is skipped if the
    /// topic is stored or expired again first. Outside a runtime the topic
    /// is removed immediately.
    pub fn expire(self: &Arc<Self>, topic: &str) {
        let token = {
            let mut state = self.state.lock();
            state.expiries += 1;
            let token = state.expiries;
            let Some(entry) = state.topics.get_mut(topic) else {
                return;
            };
            entry.pending_expiry = Some(token);
            token
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.finish_expiry(topic, token);
            return;
        };
        let cache = Arc::clone(self);
        let topic = topic.to_string();
        let delay = self.expiry_delay;
        handle.spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            cache.finish_expiry(&topic, token);
        });
    }

    /// Cancel a pending removal of `topic`, e.g. on resubscription.
    pub fn retain(&self, topic: &str) {
        if let Some(entry) = self.state.lock().topics.get_mut(topic) {
            entry.pending_expiry = None;
        }
    }

    fn finish_expiry(&self, topic: &str, token: u64) -> bool {
        let mut state = self.state.lock();
        let due = state
            .topics
            .get(topic)
            .is_some_and(|entry| entry.pending_expiry == Some(token));
        if due {
            trace!(topic, "expiring cached topic");
            state.topics.remove(topic);
        }
        due
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.state.lock().topics.contains_key(topic)
    }

    /// Number of cached topics.
    pub fn len(&self) -> usize {
        self.state.lock().topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
