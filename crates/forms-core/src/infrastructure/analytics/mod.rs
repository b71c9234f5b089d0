//! Analytics sinks
//!
//! Constructed by the entry point and injected into `FormService`; each
//! sink has an explicit `init`/`shutdown` lifecycle.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::domain::DomainEvent;
use crate::ports::outbound::{AnalyticsSink, RepositoryError};

/// Writes every event to the `analytics` tracing target
#[derive(Default)]
pub struct TracingAnalytics {
    started: AtomicBool,
    captured: AtomicU64,
}

impl TracingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> u64 {
        self.captured.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn init(&self) -> Result<(), RepositoryError> {
        self.started.store(true, Ordering::SeqCst);
        tracing::info!(target: "analytics", "analytics sink started");
        Ok(())
    }

    async fn capture(&self, event: &DomainEvent) {
        if !self.started.load(Ordering::SeqCst) {
            tracing::debug!(target: "analytics", event = event.event_type(), "sink not started, dropping event");
            return;
        }
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(target: "analytics", event = event.event_type(), error = %e, "cannot serialize event");
                String::new()
            }
        };
        tracing::info!(
            target: "analytics",
            event = event.event_type(),
            form_id = %event.form_id(),
            payload = %payload,
            "captured"
        );
        self.captured.fetch_add(1, Ordering::Relaxed);
    }

    async fn shutdown(&self) -> Result<(), RepositoryError> {
        self.started.store(false, Ordering::SeqCst);
        tracing::info!(target: "analytics", captured = self.captured(), "analytics sink stopped");
        Ok(())
    }
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpAnalytics;

#[async_trait]
impl AnalyticsSink for NoOpAnalytics {
    async fn init(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn capture(&self, _event: &DomainEvent) {}

    async fn shutdown(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Keeps captured events in memory for inspection
#[derive(Default)]
pub struct RecordingAnalytics {
    events: RwLock<Vec<DomainEvent>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.read().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(DomainEvent::event_type).collect()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn init(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn capture(&self, event: &DomainEvent) {
        self.events.write().push(event.clone());
    }

    async fn shutdown(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
