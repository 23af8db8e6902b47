//! Telemetry pipeline: framing → decode → convert → fan-out.
//!
//! One pipeline instance exclusively owns the framer state and the
//! liveness deadline for one connection. Chunks must be fed in arrival
//! order by a single logical consumer; samples reach the sinks in exactly
//! that order, unbatched.

use crate::framer::StreamFramer;
use crate::liveness::{LivenessEvent, LivenessMonitor, LivenessState};
use crate::protocol::{self, RawPacket};
use crate::types::{PackMode, Telemetry};
use crate::units::{self, ChargeUnit, TemperatureUnit};
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::debug;

/// Capability of consuming one telemetry sample.
///
/// Sinks receive each sample by value in registration order. Any subset of
/// consumers may be registered, including none.
pub trait TelemetrySink {
    fn on_sample(&mut self, sample: Telemetry);
}

pub struct TelemetryPipeline {
    framer: StreamFramer,
    charge_unit: ChargeUnit,
    temperature_unit: TemperatureUnit,
    liveness: LivenessMonitor,
    sinks: Vec<Box<dyn TelemetrySink>>,
    rejected: u64,
    shut_down: bool,
}

impl TelemetryPipeline {
    /// Builds a pipeline with the unit selection fixed for its lifetime.
    pub fn new(
        charge_unit: ChargeUnit,
        temperature_unit: TemperatureUnit,
        liveness_timeout: Duration,
    ) -> Self {
        Self {
            framer: StreamFramer::new(),
            charge_unit,
            temperature_unit,
            liveness: LivenessMonitor::new(liveness_timeout, Instant::now()),
            sinks: Vec::new(),
            rejected: 0,
            shut_down: false,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    /// Feeds one chunk of received bytes through the framer and decoder,
    /// fanning each valid sample out to every sink. Returns the liveness
    /// transition caused by this chunk, if any.
    pub fn ingest(&mut self, chunk: &[u8]) -> Option<LivenessEvent> {
        if self.shut_down {
            return None;
        }

        let mut event = None;
        for payload in self.framer.push_chunk(chunk) {
            match protocol::decode_payload(&payload) {
                Ok(packet) => {
                    if let Some(wake) = self.liveness.on_valid_packet(Instant::now()) {
                        event = Some(wake);
                    }
                    let sample = self.convert(&packet);
                    for sink in &mut self.sinks {
                        sink.on_sample(sample);
                    }
                }
                Err(e) => {
                    // Dropped silently, counted for diagnostics.
                    self.rejected += 1;
                    debug!("dropping payload: {e}");
                }
            }
        }
        event
    }

    /// Drives the liveness countdown. Call periodically from the consume
    /// loop; returns `DeviceAsleep` exactly once per expired schedule.
    pub fn poll_liveness(&mut self) -> Option<LivenessEvent> {
        if self.shut_down {
            return None;
        }
        self.liveness.poll(Instant::now())
    }

    pub fn liveness_state(&self) -> LivenessState {
        self.liveness.state()
    }

    /// Number of candidate payloads rejected by the decoder so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Releases the pending liveness deadline and stops byte processing.
    /// No packet is decoded after this returns.
    pub fn shutdown(&mut self) {
        self.shut_down = true;
        self.liveness.cancel();
    }

    fn convert(&self, packet: &RawPacket) -> Telemetry {
        Telemetry {
            timestamp: Local::now(),
            voltage: units::volts_from_millivolts(packet.pack_voltage),
            current: units::current_magnitude_amps(packet.current),
            charge: self.charge_unit.convert(f64::from(packet.charge_state)),
            temperature: self
                .temperature_unit
                .convert(units::celsius_from_millidegrees(packet.temperature)),
            mode: PackMode::from_raw(packet.mode),
            cell_voltage: packet.cell_voltage.map(units::volts_from_millivolts),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
