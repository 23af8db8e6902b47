//! # Pack Monitor
//!
//! Console monitor for a serial-connected battery pack. Reads the byte
//! stream off the configured port, runs the telemetry pipeline, and fans
//! samples out to the chart buffer, CSV log and cell-voltage status while
//! tracking whether the pack is still awake.

mod serial_thread;
mod sinks;

use crossbeam_channel::RecvTimeoutError;
use pack_core::protocol::CELL_COUNT;
use pack_core::{AppConfig, LivenessEvent, TelemetryPipeline};
use serial_thread::SerialEvent;
use sinks::{CellSink, ChartSink, ConsoleStatus, CsvLogger, SeriesBuffer, TIME_FORMAT};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Consume-loop tick; also the liveness polling cadence.
const TICK: Duration = Duration::from_millis(200);

/// How often the buffered-data summary is logged.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(30);

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }

    for problem in config.validate() {
        warn!("config: {problem}");
    }

    if config.serial.port.is_empty() {
        error!(
            "No serial port configured; set [serial] port in {}",
            config_path.display()
        );
        std::process::exit(1);
    }

    // ── Pipeline + sinks ──
    let mut pipeline = TelemetryPipeline::new(
        config.units.charge,
        config.units.temperature,
        Duration::from_secs_f64(config.liveness.timeout_secs),
    );

    let series = Arc::new(Mutex::new(SeriesBuffer::new(config.chart.history_size)));
    pipeline.add_sink(Box::new(ChartSink(series.clone())));

    let cells = Arc::new(Mutex::new([0.0f64; CELL_COUNT]));
    pipeline.add_sink(Box::new(CellSink(cells.clone())));

    pipeline.add_sink(Box::new(ConsoleStatus::new(
        config.units.charge,
        config.units.temperature,
    )));

    if config.log.csv_enabled {
        match CsvLogger::create(Path::new(&config.log.csv_path)) {
            Ok(logger) => {
                info!("Logging data to {}", config.log.csv_path);
                pipeline.add_sink(Box::new(logger));
            }
            Err(e) => warn!("Could not open {} for logging: {e}", config.log.csv_path),
        }
    } else {
        info!("Data log inactive");
    }

    // ── Serial reader ──
    let rx = serial_thread::spawn_reader_thread(
        config.serial.port.clone(),
        config.serial.baud_rate,
        config.serial.reconnect,
    );

    info!("Waiting for pack...");

    // ── Consume loop ──
    let mut last_summary = Instant::now();
    loop {
        match rx.recv_timeout(TICK) {
            Ok(SerialEvent::Data(chunk)) => report(pipeline.ingest(&chunk)),
            Ok(SerialEvent::Disconnected) => warn!("Serial port disconnected"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        report(pipeline.poll_liveness());

        if last_summary.elapsed() >= SUMMARY_INTERVAL {
            last_summary = Instant::now();
            log_summary(&series, &cells, &pipeline);
        }
    }

    // Reader thread gone for good: release the liveness deadline and stop.
    pipeline.shutdown();
    info!("Serial reader finished, shutting down");
}

fn report(event: Option<LivenessEvent>) {
    match event {
        Some(LivenessEvent::DeviceAwake) => info!("Pack is awake"),
        Some(LivenessEvent::DeviceAsleep) => info!(
            "Waiting for pack. Wake it by pressing the wake button, \
             or by connecting a load or charger"
        ),
        None => {}
    }
}

fn log_summary(
    series: &Arc<Mutex<SeriesBuffer>>,
    cells: &Arc<Mutex<[f64; CELL_COUNT]>>,
    pipeline: &TelemetryPipeline,
) {
    let series = series.lock().expect("series buffer lock poisoned");
    if let Some(point) = series.latest() {
        let cells = cells.lock().expect("cell status lock poisoned");
        info!(
            "{} points buffered | last at {}: {:.2} V {:.2} A | cells [{}]",
            series.len(),
            point.timestamp.format(TIME_FORMAT),
            point.voltage,
            point.current,
            cells
                .iter()
                .map(|v| format!("{v:.3}"))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    if pipeline.rejected() > 0 {
        info!("{} malformed payloads dropped so far", pipeline.rejected());
    }
}
