use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub batches: BatchMetrics,
    pub submission: SubmissionMetrics,
    pub pacing: PacingMetrics,
    pub uptime_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchMetrics {
    pub submitted: u64,
    pub failed: u64,
    pub recipients_sent: u64,
    pub avg_batch_size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionMetrics {
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacingMetrics {
    pub pauses: u64,
    pub total_paused_ms: u64,
}

/// Counters for a single distribution run. One instance per run.
#[derive(Debug)]
pub struct RunMetrics {
    batches_submitted: AtomicU64,
    batches_failed: AtomicU64,
    recipients_sent: AtomicU64,
    latency_sum_ms: AtomicU64,
    min_latency_ms: AtomicU64,
    max_latency_ms: AtomicU64,
    pauses: AtomicU64,
    paused_ms: AtomicU64,
    start_time: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self {
            batches_submitted: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            recipients_sent: AtomicU64::new(0),
            latency_sum_ms: AtomicU64::new(0),
            min_latency_ms: AtomicU64::new(u64::MAX),
            max_latency_ms: AtomicU64::new(0),
            pauses: AtomicU64::new(0),
            paused_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch(&self, size: usize, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;

        self.batches_submitted.fetch_add(1, Ordering::SeqCst);
        self.recipients_sent
            .fetch_add(size as u64, Ordering::SeqCst);
        self.latency_sum_ms.fetch_add(latency_ms, Ordering::SeqCst);
        self.min_latency_ms.fetch_min(latency_ms, Ordering::SeqCst);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.batches_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_pause(&self, duration: Duration) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        self.paused_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let submitted = self.batches_submitted.load(Ordering::SeqCst);
        let recipients = self.recipients_sent.load(Ordering::SeqCst);
        let latency_sum = self.latency_sum_ms.load(Ordering::SeqCst);
        let min_latency = self.min_latency_ms.load(Ordering::SeqCst);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            batches: BatchMetrics {
                submitted,
                failed: self.batches_failed.load(Ordering::SeqCst),
                recipients_sent: recipients,
                avg_batch_size: if submitted > 0 {
                    recipients as f64 / submitted as f64
                } else {
                    0.0
                },
            },
            submission: SubmissionMetrics {
                avg_latency_ms: if submitted > 0 {
                    latency_sum as f64 / submitted as f64
                } else {
                    0.0
                },
                min_latency_ms: if min_latency == u64::MAX {
                    0
                } else {
                    min_latency
                },
                max_latency_ms: self.max_latency_ms.load(Ordering::SeqCst),
            },
            pacing: PacingMetrics {
                pauses: self.pauses.load(Ordering::SeqCst),
                total_paused_ms: self.paused_ms.load(Ordering::SeqCst),
            },
            uptime_ms: self.uptime().as_millis() as u64,
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted.load(Ordering::SeqCst)
    }

    pub fn recipients_sent(&self) -> u64 {
        self.recipients_sent.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
