//! # Pack Core
//!
//! Framing, decoding, unit conversion and the telemetry pipeline for a
//! serial-connected battery-pack monitor.
//!
//! Raw bytes flow through the pipeline as:
//!
//! ```text
//! bytes → framer → candidate payload → decoder → RawPacket
//!       → unit conversion → Telemetry sample → sinks
//! ```
//!
//! ## Modules
//! - [`protocol`] – fixed wire layout and payload decoding
//! - [`framer`] – sentinel-framed byte-stream state machine
//! - [`units`] – raw-to-display unit conversion
//! - [`liveness`] – device liveness countdown
//! - [`pipeline`] – chunk ingestion and sink fan-out
//! - [`types`] – decoded telemetry sample
//! - [`config`] – unified TOML configuration

pub mod config;
pub mod framer;
pub mod liveness;
pub mod pipeline;
pub mod protocol;
pub mod types;
pub mod units;

// Convenient re-exports
pub use config::AppConfig;
pub use liveness::{LivenessEvent, LivenessState};
pub use pipeline::{TelemetryPipeline, TelemetrySink};
pub use protocol::{CELL_COUNT, PAYLOAD_SIZE, decode_payload};
pub use types::{PackMode, Telemetry};
pub use units::{ChargeUnit, TemperatureUnit};
