//! Error handling and decision statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, database, policy file, lookup)
//! - Decision outcome and cache event categories
//! - Thread-safe decision statistics
//!
//! None of these errors escape an admission decision: lookup failures become a
//! deny, cache faults become a miss or are logged and ignored.

mod stats;
mod types;

// Re-export public API
pub use stats::DecisionStats;
pub use types::{
    CacheEvent, ConfigError, DatabaseError, DecisionOutcome, InitializationError, LookupFailure,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_decision_stats_initialization() {
        let stats = DecisionStats::new();
        for outcome in DecisionOutcome::iter() {
            assert_eq!(stats.outcome_count(outcome), 0);
        }
        for event in CacheEvent::iter() {
            assert_eq!(stats.cache_count(event), 0);
        }
    }

    #[test]
    fn test_decision_stats_totals() {
        let stats = DecisionStats::new();
        stats.record_outcome(DecisionOutcome::Allowed);
        stats.record_outcome(DecisionOutcome::Allowed);
        stats.record_outcome(DecisionOutcome::DeniedOutsideRegion);
        stats.record_outcome(DecisionOutcome::DeniedLookupFailure);
        stats.record_cache(CacheEvent::Hit);

        assert_eq!(stats.total_decisions(), 4);
        assert_eq!(stats.total_denied(), 2);
        assert_eq!(stats.outcome_count(DecisionOutcome::Allowed), 2);
        assert_eq!(stats.cache_count(CacheEvent::Hit), 1);
        assert_eq!(stats.cache_count(CacheEvent::Miss), 0);
    }

    #[test]
    fn test_decision_stats_concurrent_increments() {
        let stats = Arc::new(DecisionStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_outcome(DecisionOutcome::DeniedProxyFlagged);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(
            stats.outcome_count(DecisionOutcome::DeniedProxyFlagged),
            800
        );
    }

    #[test]
    fn test_total_denied_while_allowed_is_recorded_concurrently() {
        let stats = Arc::new(DecisionStats::new());
        stats.record_outcome(DecisionOutcome::DeniedOutsideRegion);
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    while !done.load(std::sync::atomic::Ordering::Relaxed) {
                        stats.record_outcome(DecisionOutcome::Allowed);
                    }
                })
            })
            .collect();

        for _ in 0..200_000 {
            assert_eq!(stats.total_denied(), 1);
        }
        done.store(true, std::sync::atomic::Ordering::Relaxed);
        for handle in writers {
            handle.join().expect("thread panicked");
        }
        assert!(stats.total_decisions() >= 1 + stats.outcome_count(DecisionOutcome::Allowed));
    }
}
