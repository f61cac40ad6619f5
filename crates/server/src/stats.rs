//! Request counters observed by the Proxy Controller and surfaced at `/api/stats`.

use std::sync::atomic::{AtomicU64, Ordering};

use dispatch::CacheStats;
use llm::classifier::Classification;
use serde::Serialize;

#[derive(Default)]
pub struct Stats {
    total: AtomicU64,
    cached: AtomicU64,
    errors: AtomicU64,
    title: AtomicU64,
    topic: AtomicU64,
    warmup: AtomicU64,
    tools: AtomicU64,
    normal: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, classification: Classification) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let counter = match classification {
            Classification::Title => &self.title,
            Classification::Topic => &self.topic,
            Classification::Warmup => &self.warmup,
            Classification::Tools => &self.tools,
            Classification::Normal => &self.normal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cached(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, cache_stats: CacheStats, queue_in_flight: usize) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            by_classification: ClassificationCounts {
                title: self.title.load(Ordering::Relaxed),
                topic: self.topic.load(Ordering::Relaxed),
                warmup: self.warmup.load(Ordering::Relaxed),
                tools: self.tools.load(Ordering::Relaxed),
                normal: self.normal.load(Ordering::Relaxed),
            },
            cache_hit_rate: cache_stats.hit_rate(),
            queue_in_flight,
        }
    }
}

#[derive(Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub cached: u64,
    pub errors: u64,
    pub by_classification: ClassificationCounts,
    pub cache_hit_rate: f64,
    pub queue_in_flight: usize,
}

#[derive(Serialize)]
pub struct ClassificationCounts {
    pub title: u64,
    pub topic: u64,
    pub warmup: u64,
    pub tools: u64,
    pub normal: u64,
}
