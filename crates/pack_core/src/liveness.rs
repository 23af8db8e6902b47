//! Device liveness tracking.
//!
//! A restartable single-shot countdown: every structurally valid packet
//! reschedules the deadline, and a deadline that expires un-renewed marks
//! the pack asleep. At most one deadline is pending at any time, and each
//! schedule fires at most one [`LivenessEvent::DeviceAsleep`].
//!
//! Time is injected as [`Instant`] values so the contract is testable
//! without sleeping.

use std::time::{Duration, Instant};

/// Whether the pack is believed to still be transmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    Awake,
    Asleep,
}

/// Observable transition surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessEvent {
    /// A valid packet arrived while the pack was considered asleep.
    DeviceAwake,
    /// The deadline passed with no valid packet.
    DeviceAsleep,
}

#[derive(Debug)]
pub struct LivenessMonitor {
    timeout: Duration,
    state: LivenessState,
    deadline: Option<Instant>,
}

impl LivenessMonitor {
    /// Starts the monitor optimistically awake with the first deadline
    /// already scheduled: a pack that never speaks goes asleep exactly
    /// once, `timeout` after construction.
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            state: LivenessState::Awake,
            deadline: Some(now + timeout),
        }
    }

    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// A structurally valid packet arrived: supersede any pending deadline
    /// and force `Awake`. Returns the wake event only on an actual
    /// `Asleep → Awake` transition.
    pub fn on_valid_packet(&mut self, now: Instant) -> Option<LivenessEvent> {
        let was_asleep = self.state == LivenessState::Asleep;
        self.state = LivenessState::Awake;
        self.deadline = Some(now + self.timeout);
        was_asleep.then_some(LivenessEvent::DeviceAwake)
    }

    /// Drives the countdown. Fires `DeviceAsleep` at most once per
    /// schedule; the deadline is consumed so it cannot re-fire.
    pub fn poll(&mut self, now: Instant) -> Option<LivenessEvent> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.state = LivenessState::Asleep;
                Some(LivenessEvent::DeviceAsleep)
            }
            _ => None,
        }
    }

    /// Releases any pending deadline without firing it. Used on shutdown.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[test]
    fn silence_fires_asleep_exactly_once() {
        let start = Instant::now();
        let mut monitor = LivenessMonitor::new(TIMEOUT, start);
        assert_eq!(monitor.state(), LivenessState::Awake);

        assert_eq!(monitor.poll(start + Duration::from_secs(1)), None);
        assert_eq!(
            monitor.poll(start + Duration::from_secs(3)),
            Some(LivenessEvent::DeviceAsleep)
        );
        assert_eq!(monitor.state(), LivenessState::Asleep);

        // No duplicate notification, however often we poll.
        assert_eq!(monitor.poll(start + Duration::from_secs(4)), None);
        assert_eq!(monitor.poll(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn valid_packet_cancels_pending_deadline() {
        let start = Instant::now();
        let mut monitor = LivenessMonitor::new(TIMEOUT, start);

        // Renewed just before expiry: the old deadline is superseded.
        assert_eq!(monitor.on_valid_packet(start + Duration::from_secs(1)), None);
        assert_eq!(monitor.poll(start + Duration::from_secs(2)), None);
        assert_eq!(
            monitor.poll(start + Duration::from_secs(4)),
            Some(LivenessEvent::DeviceAsleep)
        );
    }

    #[test]
    fn wake_event_only_on_transition() {
        let start = Instant::now();
        let mut monitor = LivenessMonitor::new(TIMEOUT, start);

        // Already awake: packets renew silently.
        assert_eq!(monitor.on_valid_packet(start), None);
        assert_eq!(monitor.on_valid_packet(start + Duration::from_millis(100)), None);

        monitor.poll(start + Duration::from_secs(10));
        assert_eq!(monitor.state(), LivenessState::Asleep);
        assert_eq!(
            monitor.on_valid_packet(start + Duration::from_secs(11)),
            Some(LivenessEvent::DeviceAwake)
        );
        assert_eq!(monitor.state(), LivenessState::Awake);
    }

    #[test]
    fn cancel_releases_the_deadline() {
        let start = Instant::now();
        let mut monitor = LivenessMonitor::new(TIMEOUT, start);
        monitor.cancel();
        assert_eq!(monitor.poll(start + Duration::from_secs(60)), None);
        assert_eq!(monitor.state(), LivenessState::Awake);
    }
}
