//! Pauses between outbound requests
//!
//! Both the crawled site and the trends service throttle aggressive clients, so
//! every outbound call is preceded by a fixed pause. The pauses go through the
//! [`Delay`] trait so callers can observe them without actually sleeping.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Why a pause was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayKind {
    /// Before every page fetch
    Politeness,
    /// Before each of the two trends calls in an attempt
    Request,
    /// After a rate-limit rejection
    Retry,
    /// Between two consecutive batches
    InterBatch,
}

impl std::fmt::Display for DelayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelayKind::Politeness => write!(f, "politeness"),
            DelayKind::Request => write!(f, "request"),
            DelayKind::Retry => write!(f, "retry"),
            DelayKind::InterBatch => write!(f, "inter-batch"),
        }
    }
}

/// Blocking pause taken at a fixed point of the pipeline
#[async_trait]
pub trait Delay: Send + Sync {
    async fn pause(&self, kind: DelayKind, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn pause(&self, kind: DelayKind, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::trace!(kind = %kind, delay_ms = duration.as_millis() as u64, "Pausing");
        tokio::time::sleep(duration).await;
    }
}

/// Records pauses instead of sleeping
///
/// Used by tests and dry runs to check where the pipeline would have waited.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pauses: Mutex<Vec<(DelayKind, Duration)>>,
}

impl RecordingDelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All pauses taken so far, in order
    #[must_use]
    pub fn pauses(&self) -> Vec<(DelayKind, Duration)> {
        self.pauses
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of pauses of the given kind
    #[must_use]
    pub fn count(&self, kind: DelayKind) -> usize {
        self.pauses().iter().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn pause(&self, kind: DelayKind, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push((kind, duration));
        }
    }
}
