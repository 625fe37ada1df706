//! Metrics recording.
//!
//! Everything goes through the `metrics` facade and is a no-op until the
//! embedding application installs a recorder.

use juridoc_core::Route;
use metrics::{counter, histogram};
use std::time::Duration;

/// Counts an answered query by route.
pub fn record_query(route: Route) {
    counter!("juridoc_queries_total", "route" => route.as_str()).increment(1);
}

/// Records end-to-end retrieval latency (rankers, fusion, assembly).
pub fn record_retrieval(duration: Duration) {
    histogram!("juridoc_retrieval_duration_seconds").record(duration.as_secs_f64());
}

/// Records how many hits one ranker returned.
pub fn record_ranker_hits(ranker: &str, hits: usize) {
    histogram!("juridoc_ranker_hits", "ranker" => ranker.to_string()).record(hits as f64);
}

pub fn record_ranker_failure(ranker: &str) {
    counter!("juridoc_ranker_failures_total", "ranker" => ranker.to_string()).increment(1);
}

/// Counts fused ids that did not resolve in the corpus.
pub fn record_corpus_misses(misses: usize) {
    if misses > 0 {
        counter!("juridoc_corpus_misses_total").increment(misses as u64);
    }
}

/// Records generator latency by mode (`batch` / `stream`).
pub fn record_generation(mode: &'static str, duration: Duration) {
    histogram!("juridoc_generation_duration_seconds", "mode" => mode)
        .record(duration.as_secs_f64());
}

pub fn record_generation_failure(kind: &'static str) {
    counter!("juridoc_generation_failures_total", "kind" => kind).increment(1);
}
