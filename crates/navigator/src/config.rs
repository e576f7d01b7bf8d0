//! Configuration settings for the navigator.
//!
//! This module defines runtime configuration for reservation expiry, transition
//! animation and telemetry. Configuration can be loaded from environment variables
//! or constructed programmatically.

use core::time::Duration;
use std::env;

/// Runtime configuration for a navigator instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Optional limit in milliseconds on how long a reservation may stay uncommitted
    pub reservation_timeout_ms: Option<u64>,
    /// Whether pushes and pops applied for the script are animated
    pub animated: bool,
    /// Whether to log a counters line after each handled event
    pub telemetry_enabled: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::new(None, true, false)
    }
}

impl NavigatorConfig {
    /// Construct a new `NavigatorConfig` with explicit values.
    ///
    /// A timeout of zero milliseconds is treated as "no timeout".
    #[inline]
    #[must_use]
    pub const fn new(
        reservation_timeout_ms: Option<u64>,
        animated: bool,
        telemetry_enabled: bool,
    ) -> Self {
        let timeout = match reservation_timeout_ms {
            Some(0) | None => None,
            Some(millis) => Some(millis),
        };
        Self {
            reservation_timeout_ms: timeout,
            animated,
            telemetry_enabled,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `NAVIGATOR_RESERVATION_TIMEOUT_MS`: reservation timeout in milliseconds (default: none)
    /// - `NAVIGATOR_ANIMATED`: set to "0" to disable transition animation (default: enabled)
    /// - `NAVIGATOR_TELEMETRY`: set to "1" to enable telemetry (default: disabled)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let reservation_timeout_ms = lookup("NAVIGATOR_RESERVATION_TIMEOUT_MS")
            .and_then(|val| val.parse::<u64>().ok());
        let animated = lookup("NAVIGATOR_ANIMATED").as_deref() != Some("0");
        let telemetry_enabled = lookup("NAVIGATOR_TELEMETRY").as_deref() == Some("1");
        Self::new(reservation_timeout_ms, animated, telemetry_enabled)
    }

    /// Get the reservation timeout as an optional `Duration`.
    #[inline]
    #[must_use]
    pub const fn reservation_timeout(&self) -> Option<Duration> {
        if let Some(millis) = self.reservation_timeout_ms {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }
}
