//! Metrics collection.
//!
//! # Metrics
//! - `layout_cache_hits_total` (counter): layout served from the cache
//! - `layout_cache_misses_total` (counter): lookups that started or joined a resolution
//! - `layout_resolutions_total{outcome}` (counter): resolver calls by outcome
//! - `component_loads_total{outcome}` (counter): lazy component loads
//! - `navigation_transitions_total{kind, outcome}` (counter): committed or error kind
//!
//! # Design Decisions
//! - Recorder-agnostic: without an installed recorder every call is a no-op
//! - Labels are static strings only

use ::metrics::counter;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_cache_lookup(hit: bool) {
    if hit {
        counter!("layout_cache_hits_total").increment(1);
    } else {
        counter!("layout_cache_misses_total").increment(1);
    }
}

pub fn record_layout_resolution(ok: bool) {
    counter!("layout_resolutions_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_component_load(ok: bool) {
    counter!("component_loads_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_transition(kind: &'static str, outcome: &'static str) {
    counter!("navigation_transitions_total", "kind" => kind, "outcome" => outcome).increment(1);
}
