use crate::protocol::ApiKey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Process-wide request and connection counters.
pub struct Observability {
    connections_opened_total: AtomicU64,
    connections_closed_total: AtomicU64,
    api_versions_requests_total: AtomicU64,
    describe_topic_partitions_requests_total: AtomicU64,
    unsupported_requests_total: AtomicU64,
    request_errors_total: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub connections_opened: u64,
    pub connections_active: u64,
    pub api_versions_requests: u64,
    pub describe_topic_partitions_requests: u64,
    pub unsupported_requests: u64,
    pub request_errors: u64,
}

impl Default for Observability {
    fn default() -> Self {
        Self::new()
    }
}

impl Observability {
    pub fn new() -> Self {
        Self {
            connections_opened_total: AtomicU64::new(0),
            connections_closed_total: AtomicU64::new(0),
            api_versions_requests_total: AtomicU64::new(0),
            describe_topic_partitions_requests_total: AtomicU64::new(0),
            unsupported_requests_total: AtomicU64::new(0),
            request_errors_total: AtomicU64::new(0),
        }
    }

    pub fn record_connection_opened(&self) {
        self.connections_opened_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_closed(&self) {
        self.connections_closed_total.fetch_add(1, Ordering::Relaxed);
    }

    /// `api` is `None` for api keys outside the dispatch table.
    pub fn record_request(&self, api: Option<ApiKey>, ok: bool) {
        let counter = match api {
            Some(ApiKey::ApiVersions) => &self.api_versions_requests_total,
            Some(ApiKey::DescribeTopicPartitions) => &self.describe_topic_partitions_requests_total,
            None => &self.unsupported_requests_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.request_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn requests_total(&self) -> u64 {
        self.api_versions_requests_total.load(Ordering::Relaxed)
            + self.describe_topic_partitions_requests_total.load(Ordering::Relaxed)
            + self.unsupported_requests_total.load(Ordering::Relaxed)
    }

    pub fn request_errors_total(&self) -> u64 {
        self.request_errors_total.load(Ordering::Relaxed)
    }

    pub fn connections_active(&self) -> u64 {
        self.connections_opened_total
            .load(Ordering::Relaxed)
            .saturating_sub(self.connections_closed_total.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            connections_opened: self.connections_opened_total.load(Ordering::Relaxed),
            connections_active: self.connections_active(),
            api_versions_requests: self.api_versions_requests_total.load(Ordering::Relaxed),
            describe_topic_partitions_requests: self
                .describe_topic_partitions_requests_total
                .load(Ordering::Relaxed),
            unsupported_requests: self.unsupported_requests_total.load(Ordering::Relaxed),
            request_errors: self.request_errors_total(),
        }
    }

    /// Emit the current counters as one `info` event.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            connections_opened = s.connections_opened,
            connections_active = s.connections_active,
            api_versions = s.api_versions_requests,
            describe_topic_partitions = s.describe_topic_partitions_requests,
            unsupported = s.unsupported_requests,
            errors = s.request_errors,
            "request counters"
        );
    }
}

static OBS: OnceLock<Observability> = OnceLock::new();

pub fn observability() -> &'static Observability {
    OBS.get_or_init(Observability::new)
}
