//! # Engine Metrics
//!
//! Performance and behavior counters for the capture engine.
//!
//! This module is only compiled with real state when the `metrics` feature
//! is enabled; otherwise every recorder is an inlined no-op on a zero-size
//! type, so instrumented call sites cost nothing in normal builds.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters describing cascade activity.
#[cfg(feature = "metrics")]
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub battles_evaluated: AtomicU64,
    pub captures_applied: AtomicU64,
    pub candidates_skipped: AtomicU64,
    pub chains_started: AtomicU64,
    pub max_chain_depth: AtomicUsize,
}

#[cfg(feature = "metrics")]
impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_battle(&self) {
        self.battles_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_capture(&self) {
        self.captures_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_candidate_skipped(&self) {
        self.candidates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_chain_started(&self, depth: usize) {
        self.chains_started.fetch_add(1, Ordering::Relaxed);

        let mut current_max = self.max_chain_depth.load(Ordering::Relaxed);
        while depth > current_max {
            match self.max_chain_depth.compare_exchange_weak(
                current_max,
                depth,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => current_max = x,
            }
        }
    }

    // Computed metrics

    pub fn captures_per_chain(&self) -> f64 {
        let captures = self.captures_applied.load(Ordering::Relaxed) as f64;
        let chains = self.chains_started.load(Ordering::Relaxed) as f64;
        if chains > 0.0 {
            captures / chains
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        eprintln!("\n=== Capture Engine Metrics ===");
        eprintln!(
            "Battles evaluated: {}",
            self.battles_evaluated.load(Ordering::Relaxed)
        );
        eprintln!(
            "Captures applied: {}",
            self.captures_applied.load(Ordering::Relaxed)
        );
        eprintln!(
            "Candidates skipped: {}",
            self.candidates_skipped.load(Ordering::Relaxed)
        );
        eprintln!(
            "Chains started: {} ({:.2} captures/chain)",
            self.chains_started.load(Ordering::Relaxed),
            self.captures_per_chain()
        );
        eprintln!(
            "Max chain depth: {}",
            self.max_chain_depth.load(Ordering::Relaxed)
        );
        eprintln!("==============================\n");
    }
}

// Zero-size type when metrics are disabled
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineMetrics;

#[cfg(not(feature = "metrics"))]
impl EngineMetrics {
    #[inline(always)]
    pub fn new() -> Self {
        EngineMetrics
    }

    #[inline(always)]
    pub fn record_battle(&self) {}

    #[inline(always)]
    pub fn record_capture(&self) {}

    #[inline(always)]
    pub fn record_candidate_skipped(&self) {}

    #[inline(always)]
    pub fn record_chain_started(&self, _depth: usize) {}
}
