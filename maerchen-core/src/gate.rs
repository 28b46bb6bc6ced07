//! Admission control for story generation.
//!
//! One `AdmissionGate` instance owns all rate-limit state: the per-caller
//! request windows, the global daily request counter and the accumulated
//! daily cost. A single mutex serializes every check and settlement; the
//! critical section touches only in-memory state, never the network.
//!
//! Admission is optimistic: the estimated per-request cost is charged when
//! a request is admitted, and the measured cost is added on top once the
//! completion call has finished. An abandoned request keeps its estimate.

use crate::config::Limits;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

const RESET_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Refused, with a user-facing reason including a retry hint.
    Denied { reason: String },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Snapshot of the gate counters.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GateStats {
    pub global_requests_today: usize,
    pub global_limit: usize,
    pub estimated_cost_today: f64,
    pub daily_budget: f64,
    pub budget_remaining: f64,
    pub rate_limit_per_caller: usize,
    pub active_callers: usize,
}

struct GateState {
    history: HashMap<String, Vec<Instant>>,
    request_count: usize,
    request_reset: Instant,
    cost: f64,
    cost_reset: Instant,
}

/// Decides whether a request may proceed and tracks daily spend.
pub struct AdmissionGate {
    limits: Limits,
    state: Mutex<GateState>,
}

impl AdmissionGate {
    pub fn new(limits: Limits) -> Self {
        let now = Instant::now();
        Self {
            limits,
            state: Mutex::new(GateState {
                history: HashMap::new(),
                request_count: 0,
                request_reset: now + RESET_INTERVAL,
                cost: 0.0,
                cost_reset: now + RESET_INTERVAL,
            }),
        }
    }

    /// Decide whether a request from `caller` may proceed at `now`.
    ///
    /// Checks are ordered coarsest first: daily budget, global daily count,
    /// then the caller's sliding window. On admission the caller window,
    /// global counter and estimated cost are updated atomically, so a slow
    /// downstream call cannot let concurrent requests race past a ceiling.
    pub fn check(&self, caller: &str, now: Instant) -> Admission {
        let mut state = self.lock();

        if now >= state.request_reset {
            state.request_count = 0;
            state.request_reset = now + RESET_INTERVAL;
            self.evict_idle_callers(&mut state, now);
        }

        if now >= state.cost_reset {
            state.cost = 0.0;
            state.cost_reset = now + RESET_INTERVAL;
        }

        if state.cost >= self.limits.max_daily_cost {
            let hours = state.cost_reset.duration_since(now).as_secs() / 3600;
            return Admission::Denied {
                reason: format!("Tägliches Budget erreicht. Service pausiert für ~{hours}h."),
            };
        }

        if state.request_count >= self.limits.global_daily_limit {
            let hours = state.request_reset.duration_since(now).as_secs() / 3600;
            return Admission::Denied {
                reason: format!(
                    "Tägliches Anfrage-Limit erreicht. Bitte in ~{hours}h erneut versuchen."
                ),
            };
        }

        let window = self.limits.window;
        let timestamps = state.history.entry(caller.to_string()).or_default();
        timestamps.retain(|ts| now.duration_since(*ts) < window);

        if timestamps.len() >= self.limits.per_caller_limit {
            // Entries are appended in order, so the first one expires first.
            let oldest = timestamps[0];
            let minutes = window
                .saturating_sub(now.duration_since(oldest))
                .as_secs()
                / 60;
            return Admission::Denied {
                reason: format!("Zu viele Anfragen. Bitte warte ~{minutes} Minuten."),
            };
        }

        timestamps.push(now);
        state.request_count += 1;
        state.cost += self.limits.cost_per_request;

        debug!(
            caller,
            requests_today = state.request_count,
            "Anfrage zugelassen"
        );
        Admission::Allowed
    }

    /// Add the measured cost of a completed request on top of the estimate.
    pub fn record_additional_cost(&self, amount: f64) {
        let mut state = self.lock();
        state.cost += amount;
    }

    /// Snapshot the current counters. Rollovers happen in `check`, so a
    /// snapshot taken on an idle day can show yesterday's totals.
    pub fn stats(&self) -> GateStats {
        let state = self.lock();
        GateStats {
            global_requests_today: state.request_count,
            global_limit: self.limits.global_daily_limit,
            estimated_cost_today: round2(state.cost),
            daily_budget: self.limits.max_daily_cost,
            budget_remaining: round2(self.limits.max_daily_cost - state.cost),
            rate_limit_per_caller: self.limits.per_caller_limit,
            active_callers: state.history.len(),
        }
    }

    /// Drop callers whose windows have fully drained. Runs at the daily
    /// rollover so the caller map cannot grow for the process lifetime.
    fn evict_idle_callers(&self, state: &mut GateState, now: Instant) {
        let window = self.limits.window;
        state
            .history
            .retain(|_, timestamps| timestamps.iter().any(|ts| now.duration_since(*ts) < window));
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // Counters stay consistent even if a previous holder panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_limits() -> Limits {
        Limits {
            per_caller_limit: 10,
            window: Duration::from_secs(3600),
            global_daily_limit: 1000,
            max_daily_cost: 5.0,
            cost_per_request: 0.0015,
            max_story_length: 15,
        }
    }

    #[test]
    fn test_caller_limit_reached() {
        let gate = AdmissionGate::new(test_limits());
        let now = Instant::now();

        for _ in 0..10 {
            assert!(gate.check("10.0.0.1", now).is_allowed());
        }

        match gate.check("10.0.0.1", now) {
            Admission::Denied { reason } => assert!(reason.contains("Zu viele Anfragen")),
            Admission::Allowed => panic!("11th request should be denied"),
        }
    }

    #[test]
    fn test_distinct_callers_are_independent() {
        let gate = AdmissionGate::new(test_limits());
        let now = Instant::now();

        for _ in 0..10 {
            assert!(gate.check("10.0.0.1", now).is_allowed());
        }
        assert!(!gate.check("10.0.0.1", now).is_allowed());
        assert!(gate.check("10.0.0.2", now).is_allowed());
    }

    #[test]
    fn test_window_expiry_readmits() {
        let gate = AdmissionGate::new(test_limits());
        let start = Instant::now();

        for _ in 0..10 {
            assert!(gate.check("10.0.0.1", start).is_allowed());
        }
        assert!(!gate.check("10.0.0.1", start).is_allowed());

        let later = start + Duration::from_secs(3601);
        assert!(gate.check("10.0.0.1", later).is_allowed());
    }

    #[test]
    fn test_retry_minutes_estimate() {
        let gate = AdmissionGate::new(test_limits());
        let start = Instant::now();

        for _ in 0..10 {
            assert!(gate.check("10.0.0.1", start).is_allowed());
        }

        // Half the window has elapsed, so the oldest entry expires in ~30min.
        let halfway = start + Duration::from_secs(1800);
        match gate.check("10.0.0.1", halfway) {
            Admission::Denied { reason } => assert!(reason.contains("~30 Minuten")),
            Admission::Allowed => panic!("should still be denied at half window"),
        }
    }

    #[test]
    fn test_global_daily_limit() {
        let mut limits = test_limits();
        limits.global_daily_limit = 3;
        let gate = AdmissionGate::new(limits);
        let now = Instant::now();

        assert!(gate.check("a", now).is_allowed());
        assert!(gate.check("b", now).is_allowed());
        assert!(gate.check("c", now).is_allowed());

        match gate.check("d", now) {
            Admission::Denied { reason } => assert!(reason.contains("Anfrage-Limit")),
            Admission::Allowed => panic!("global limit should deny"),
        }
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut limits = test_limits();
        limits.max_daily_cost = 0.004;
        let gate = AdmissionGate::new(limits);
        let now = Instant::now();

        // 0.0015 per request: third admission crosses the ceiling.
        assert!(gate.check("a", now).is_allowed());
        assert!(gate.check("b", now).is_allowed());
        assert!(gate.check("c", now).is_allowed());

        match gate.check("d", now) {
            Admission::Denied { reason } => assert!(reason.contains("Budget")),
            Admission::Allowed => panic!("budget should deny"),
        }
    }

    #[test]
    fn test_budget_checked_before_global_and_caller() {
        let mut limits = test_limits();
        limits.max_daily_cost = 0.001;
        limits.global_daily_limit = 1;
        limits.per_caller_limit = 1;
        let gate = AdmissionGate::new(limits);
        let now = Instant::now();

        assert!(gate.check("a", now).is_allowed());

        // All three ceilings are now exhausted; the budget message wins.
        match gate.check("a", now) {
            Admission::Denied { reason } => assert!(reason.contains("Budget")),
            Admission::Allowed => panic!("should be denied"),
        }
    }

    #[test]
    fn test_daily_reset_readmits() {
        let mut limits = test_limits();
        limits.global_daily_limit = 2;
        let gate = AdmissionGate::new(limits);
        let start = Instant::now();

        assert!(gate.check("a", start).is_allowed());
        assert!(gate.check("b", start).is_allowed());
        assert!(!gate.check("c", start).is_allowed());

        let next_day = start + RESET_INTERVAL + Duration::from_secs(1);
        assert!(gate.check("c", next_day).is_allowed());
        assert_eq!(gate.stats().global_requests_today, 1);
    }

    #[test]
    fn test_cost_reset_after_interval() {
        let mut limits = test_limits();
        limits.max_daily_cost = 0.001;
        let gate = AdmissionGate::new(limits);
        let start = Instant::now();

        assert!(gate.check("a", start).is_allowed());
        assert!(!gate.check("b", start).is_allowed());

        let next_day = start + RESET_INTERVAL + Duration::from_secs(1);
        assert!(gate.check("b", next_day).is_allowed());
    }

    #[test]
    fn test_record_additional_cost() {
        let gate = AdmissionGate::new(test_limits());
        let now = Instant::now();

        assert!(gate.check("a", now).is_allowed());
        gate.record_additional_cost(1.0);

        let stats = gate.stats();
        assert_eq!(stats.estimated_cost_today, 1.0);
        assert_eq!(stats.budget_remaining, 4.0);
    }

    #[test]
    fn test_optimistic_charge_counts_against_budget() {
        let mut limits = test_limits();
        limits.max_daily_cost = 0.003;
        limits.cost_per_request = 0.002;
        let gate = AdmissionGate::new(limits);
        let now = Instant::now();

        assert!(gate.check("a", now).is_allowed());
        assert!(gate.check("b", now).is_allowed());
        // 0.004 accumulated from estimates alone; no settlement happened.
        assert!(!gate.check("c", now).is_allowed());
    }

    #[test]
    fn test_idle_callers_evicted_at_rollover() {
        let gate = AdmissionGate::new(test_limits());
        let start = Instant::now();

        assert!(gate.check("a", start).is_allowed());
        assert!(gate.check("b", start).is_allowed());
        assert_eq!(gate.stats().active_callers, 2);

        let next_day = start + RESET_INTERVAL + Duration::from_secs(1);
        assert!(gate.check("c", next_day).is_allowed());
        // a and b had fully drained windows and were dropped; c is live.
        assert_eq!(gate.stats().active_callers, 1);
    }

    #[test]
    fn test_stats_snapshot() {
        let gate = AdmissionGate::new(test_limits());
        let now = Instant::now();

        assert!(gate.check("a", now).is_allowed());
        assert!(gate.check("a", now).is_allowed());

        let stats = gate.stats();
        assert_eq!(stats.global_requests_today, 2);
        assert_eq!(stats.global_limit, 1000);
        assert_eq!(stats.rate_limit_per_caller, 10);
        assert_eq!(stats.active_callers, 1);
        assert_eq!(stats.daily_budget, 5.0);
    }
}
