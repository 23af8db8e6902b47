//! Sink implementations fed by the telemetry pipeline.
//!
//! Each sink consumes one [`Telemetry`] sample at a time; the buffers a
//! renderer would read (chart series, cell voltages) are shared behind
//! `Arc<Mutex<…>>` so the consume loop can report on them too.

use chrono::{DateTime, Local};
use pack_core::protocol::CELL_COUNT;
use pack_core::units::{ChargeUnit, TemperatureUnit};
use pack_core::{Telemetry, TelemetrySink};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Time format used everywhere a sample time is shown or logged.
pub const TIME_FORMAT: &str = "%-I:%M:%S %p";

// ──────────────────────────────────────────
// Chart series buffer
// ──────────────────────────────────────────

/// One point per received sample, the tuple a time-series chart plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Local>,
    pub voltage: f64,
    pub current: f64,
    pub charge: f64,
    pub temperature: f64,
}

/// Bounded ring buffer of chart points, oldest dropped first.
#[derive(Debug)]
pub struct SeriesBuffer {
    capacity: usize,
    points: VecDeque<SeriesPoint>,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: &Telemetry) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(SeriesPoint {
            timestamp: sample.timestamp,
            voltage: sample.voltage,
            current: sample.current,
            charge: sample.charge,
            temperature: sample.temperature,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }
}

/// Adapter registering a shared [`SeriesBuffer`] as a pipeline sink.
pub struct ChartSink(pub Arc<Mutex<SeriesBuffer>>);

impl TelemetrySink for ChartSink {
    fn on_sample(&mut self, sample: Telemetry) {
        self.0
            .lock()
            .expect("series buffer lock poisoned")
            .push(&sample);
    }
}

// ──────────────────────────────────────────
// Cell-voltage status
// ──────────────────────────────────────────

/// Keeps the latest per-cell voltages (V) for the cell status display.
pub struct CellSink(pub Arc<Mutex<[f64; CELL_COUNT]>>);

impl TelemetrySink for CellSink {
    fn on_sample(&mut self, sample: Telemetry) {
        let mut cells = self.0.lock().expect("cell status lock poisoned");
        *cells = sample.cell_voltage;
        debug!(
            "cell voltages: {}",
            sample
                .cell_voltage
                .iter()
                .map(|v| format!("{v:.3}"))
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
}

// ──────────────────────────────────────────
// CSV data log
// ──────────────────────────────────────────

/// Append-only CSV log: a header row, then one row per sample.
pub struct CsvLogger {
    writer: csv::Writer<std::fs::File>,
}

impl CsvLogger {
    /// Creates the file and writes the header row immediately.
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["time", "voltage", "current", "charge", "temperature"])?;
        writer.flush()?;
        Ok(Self { writer })
    }

    fn write_row(&mut self, sample: &Telemetry) -> Result<(), csv::Error> {
        self.writer.write_record([
            sample.timestamp.format(TIME_FORMAT).to_string(),
            sample.voltage.to_string(),
            sample.current.to_string(),
            sample.charge.to_string(),
            sample.temperature.to_string(),
        ])?;
        // Flush per row so the log survives an abrupt exit.
        self.writer.flush()?;
        Ok(())
    }
}

impl TelemetrySink for CsvLogger {
    fn on_sample(&mut self, sample: Telemetry) {
        if let Err(e) = self.write_row(&sample) {
            warn!("CSV write failed: {e}");
        }
    }
}

// ──────────────────────────────────────────
// Console status line
// ──────────────────────────────────────────

/// Logs a "last seen" line per sample with the configured unit suffixes.
pub struct ConsoleStatus {
    charge_suffix: &'static str,
    temperature_suffix: &'static str,
}

impl ConsoleStatus {
    pub fn new(charge: ChargeUnit, temperature: TemperatureUnit) -> Self {
        Self {
            charge_suffix: charge.suffix(),
            temperature_suffix: temperature.suffix(),
        }
    }
}

impl TelemetrySink for ConsoleStatus {
    fn on_sample(&mut self, sample: Telemetry) {
        info!(
            "Last seen {} | {:5.2} V | {:5.2} A | {:6.4} {} | {:4.2} °{} | {}",
            sample.timestamp.format(TIME_FORMAT),
            sample.voltage,
            sample.current,
            sample.charge,
            self.charge_suffix,
            sample.temperature,
            self.temperature_suffix,
            sample.mode,
        );
    }
}

// ──────────────────────────────────────────
// Tests
// ──────────────────────────────────────────
