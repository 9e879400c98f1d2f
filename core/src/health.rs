//! Backend liveness tracking for a cold-starting server.
//!
//! # Design
//! `HealthMonitor` is a plain state machine fed with probe results; it never
//! performs I/O or sleeps. `poll_until_awake` is the repeating task that drives
//! it during a wake-up. It takes the probe and the sleep as closures so the
//! host can use real time and tests can use none.
//!
//! ```text
//! checking ──ok──▶ online
//!     └──fail──▶ offline ──start_wake──▶ waking ──ok──▶ online
//!                   ▲                      │
//!                   └──attempts exhausted──┘
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{WAKE_MAX_ATTEMPTS, WAKE_POLL_INTERVAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Checking,
    Online,
    Offline,
    Waking,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Checking => "checking",
            HealthStatus::Online => "online",
            HealthStatus::Offline => "offline",
            HealthStatus::Waking => "waking",
        }
    }
}

/// Interval and attempt bound for a wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for WakePolicy {
    fn default() -> Self {
        Self {
            interval: WAKE_POLL_INTERVAL,
            max_attempts: WAKE_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    status: HealthStatus,
    attempts: u32,
    policy: WakePolicy,
}

impl HealthMonitor {
    pub fn new(policy: WakePolicy) -> Self {
        Self {
            status: HealthStatus::Checking,
            attempts: 0,
            policy,
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Interval and attempt bound used by every wake-up of this monitor.
    pub fn policy(&self) -> WakePolicy {
        self.policy
    }

    /// Probes spent by the current (or last) wake-up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_online(&self) -> bool {
        self.status == HealthStatus::Online
    }

    /// Submissions are only sent to a backend known to be awake.
    pub fn can_submit(&self) -> bool {
        self.is_online()
    }

    pub fn is_waking(&self) -> bool {
        self.status == HealthStatus::Waking
    }

    /// Restart from `checking` ahead of a fresh probe.
    pub fn begin_check(&mut self) {
        self.transition(HealthStatus::Checking);
        self.attempts = 0;
    }

    /// Start a wake-up. Only valid from `offline` with a non-zero attempt
    /// bound; returns whether it started.
    pub fn start_wake(&mut self) -> bool {
        if self.status != HealthStatus::Offline {
            debug!(status = self.status.as_str(), "wake ignored");
            return false;
        }
        self.attempts = 0;
        if self.policy.max_attempts == 0 {
            warn!("wake attempt bound is zero, staying offline");
            return false;
        }
        self.transition(HealthStatus::Waking);
        true
    }

    /// Feed one probe result. A failed probe counts as `false`.
    pub fn record_probe(&mut self, alive: bool) -> HealthStatus {
        match (self.status, alive) {
            (_, true) => self.transition(HealthStatus::Online),
            (HealthStatus::Waking, false) => {
                self.attempts += 1;
                if self.attempts >= self.policy.max_attempts {
                    warn!(attempts = self.attempts, "backend did not wake, giving up");
                    self.transition(HealthStatus::Offline);
                }
            }
            (_, false) => self.transition(HealthStatus::Offline),
        }
        self.status
    }

    fn transition(&mut self, next: HealthStatus) {
        if self.status != next {
            info!(from = self.status.as_str(), to = next.as_str(), "health status changed");
            self.status = next;
        }
    }
}

/// Run a bounded wake-up with the monitor's own policy: wait one interval
/// before each wake probe, and stop at the first answer or once
/// `max_attempts` probes have failed.
///
/// A monitor that is `checking` or `online` is probed once first and returns
/// immediately if the backend answers. A monitor already `offline` was just
/// probed by the caller, so polling starts with a wait.
pub fn poll_until_awake<P, S>(monitor: &mut HealthMonitor, mut probe: P, mut sleep: S) -> HealthStatus
where
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    let interval = monitor.policy().interval;
    let needs_check = monitor.status() != HealthStatus::Offline && !monitor.is_waking();
    if needs_check && monitor.record_probe(probe()) == HealthStatus::Online {
        return HealthStatus::Online;
    }
    if !monitor.is_waking() && !monitor.start_wake() {
        return monitor.status();
    }
    while monitor.is_waking() {
        sleep(interval);
        monitor.record_probe(probe());
    }
    monitor.status()
}
