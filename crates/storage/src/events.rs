// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event bus over the store.
//!
//! Publishing allocates a dense monotonic id inside one write
//! transaction; queries iterate a read snapshot from a watermark.
//! Pull-only: subscribers poll with [`EventFilter`], there are no push
//! subscriptions, and a query never blocks a publisher.

use crate::bucket::{buckets, meta};
use crate::store::Store;
use smith_core::{Clock, CoreError, Event, EventDraft, EventFilter, EventType};
use std::sync::Arc;

/// Handle for publishing and querying events.
#[derive(Clone)]
pub struct EventBus {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl EventBus {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Publish one event, assigning the next dense id.
    pub fn publish(&self, event_type: EventType, draft: EventDraft) -> Result<Event, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let event = self
            .store
            .update(|txn| txn.append_event(event_type, draft, now_ms))?;
        tracing::debug!(
            event_id = event.event_id,
            event_type = %event.event_type,
            agent = %event.agent_id,
            "published"
        );
        Ok(event)
    }

    /// Events matching `filter`, in id order, starting after
    /// `filter.since_id`.
    pub fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, CoreError> {
        self.store.view(|txn| {
            let limit = filter.limit.unwrap_or(usize::MAX);
            let mut events = Vec::new();
            for (_, value) in txn.iter_after(buckets::EVENTS, &filter.since_id.to_be_bytes())? {
                if events.len() >= limit {
                    break;
                }
                let event: Event = serde_json::from_slice(&value)
                    .map_err(|e| CoreError::Internal(format!("decode event: {}", e)))?;
                if filter.matches(&event) {
                    events.push(event);
                }
            }
            Ok(events)
        })
    }

    /// Highest assigned event id (zero when the log is empty).
    pub fn last_event_id(&self) -> Result<u64, CoreError> {
        self.store.view(|txn| txn.meta_u64(meta::LAST_EVENT_ID))
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
