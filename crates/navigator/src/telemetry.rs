//! Telemetry utilities for formatting and emitting navigator counters.
//! Kept independent of the adapter; callers pass in counters explicitly.

use serde::Serialize;

/// Running totals kept by the reservation state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavigatorCounters {
    pub reservations_granted: u64,
    pub reservations_denied: u64,
    pub native_granted: u64,
    pub native_denied: u64,
    pub commits_applied: u64,
    pub apply_failures: u64,
    pub protocol_violations: u64,
    pub reservations_released: u64,
    pub reservations_expired: u64,
}

pub fn counters_json(counters: &NavigatorCounters) -> String {
    serde_json::to_string(counters).unwrap_or_default()
}

pub fn maybe_emit(enabled: bool, json_line: &str) {
    if enabled {
        log::info!(target: "navigator::telemetry", "{json_line}");
    }
}
