//! Decision statistics tracking.
//!
//! This module provides thread-safe counters for decision outcomes and cache
//! events across concurrently running decisions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{CacheEvent, DecisionOutcome};

/// Thread-safe decision statistics tracker.
///
/// Every outcome and cache event is initialized to zero on creation, so the
/// maps are never mutated after construction and can be shared through `Arc`.
pub struct DecisionStats {
    outcomes: HashMap<DecisionOutcome, AtomicUsize>,
    cache: HashMap<CacheEvent, AtomicUsize>,
}

impl DecisionStats {
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in DecisionOutcome::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }

        let mut cache = HashMap::new();
        for event in CacheEvent::iter() {
            cache.insert(event, AtomicUsize::new(0));
        }

        DecisionStats { outcomes, cache }
    }

    pub fn record_outcome(&self, outcome: DecisionOutcome) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Outcome {:?} missing from stats map. This indicates a bug in DecisionStats initialization.",
                outcome
            );
        }
    }

    pub fn record_cache(&self, event: CacheEvent) {
        if let Some(counter) = self.cache.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Cache event {:?} missing from stats map. This indicates a bug in DecisionStats initialization.",
                event
            );
        }
    }

    pub fn outcome_count(&self, outcome: DecisionOutcome) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn cache_count(&self, event: CacheEvent) -> usize {
        self.cache
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_decisions(&self) -> usize {
        self.outcomes.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Sum of every deny counter. Read independently of `Allowed`, so concurrent
    /// recording can never make it underflow.
    pub fn total_denied(&self) -> usize {
        DecisionOutcome::iter()
            .filter(|o| !o.is_allowed())
            .map(|o| self.outcome_count(o))
            .sum()
    }

    /// Logs non-zero counters, one line each.
    pub fn log_summary(&self) {
        log::info!(
            "Decisions: {} total, {} allowed, {} denied",
            self.total_decisions(),
            self.outcome_count(DecisionOutcome::Allowed),
            self.total_denied()
        );
        for outcome in DecisionOutcome::iter().filter(|o| !o.is_allowed()) {
            let count = self.outcome_count(outcome);
            if count > 0 {
                log::info!("   {}: {}", outcome, count);
            }
        }
        for event in CacheEvent::iter() {
            let count = self.cache_count(event);
            if count > 0 {
                log::info!("   {}: {}", event.as_str(), count);
            }
        }
    }
}

impl Default for DecisionStats {
    fn default() -> Self {
        Self::new()
    }
}
