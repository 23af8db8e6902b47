//! Decoded telemetry sample types shared by the pipeline and its consumers.

use crate::protocol::CELL_COUNT;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating mode reported by the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackMode {
    LoadTest,
    Discharging,
    Charging,
}

impl PackMode {
    /// Maps the raw mode byte. Bytes other than 1 and 2 read as a load
    /// test, the wire meaning of 0.
    pub fn from_raw(byte: u8) -> Self {
        match byte {
            1 => PackMode::Discharging,
            2 => PackMode::Charging,
            _ => PackMode::LoadTest,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PackMode::LoadTest => "Load Test",
            PackMode::Discharging => "Discharging",
            PackMode::Charging => "Charging",
        }
    }
}

impl fmt::Display for PackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One decoded, unit-converted telemetry sample.
///
/// Immutable once produced; the pipeline hands a copy to every sink, so no
/// consumer ever shares mutable telemetry state with another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Wall-clock time of receipt.
    pub timestamp: DateTime<Local>,
    /// Pack voltage (V)
    pub voltage: f64,
    /// Current magnitude (A); flow direction is discarded
    pub current: f64,
    /// Accumulated charge, in the configured unit (C or Ah)
    pub charge: f64,
    /// Temperature, in the configured unit (°C or °F)
    pub temperature: f64,
    /// Operating mode
    pub mode: PackMode,
    /// Per-cell voltage (V)
    pub cell_voltage: [f64; CELL_COUNT],
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
