//! Raw-to-display unit conversion.
//!
//! The unit selection is read once at pipeline construction; changing it
//! in the configuration afterwards only affects future runs, never samples
//! already converted.

use serde::{Deserialize, Serialize};

/// Display unit for accumulated charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeUnit {
    #[default]
    Coulomb,
    AmpHour,
}

impl ChargeUnit {
    /// Converts raw coulombs into this unit.
    pub fn convert(self, coulombs: f64) -> f64 {
        match self {
            ChargeUnit::Coulomb => coulombs,
            ChargeUnit::AmpHour => coulombs / 3600.0,
        }
    }

    /// Display suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            ChargeUnit::Coulomb => "C",
            ChargeUnit::AmpHour => "Ah",
        }
    }
}

/// Display unit for temperature.
///
/// The TOML value for Fahrenheit is `farenheit`; the spelling is part of
/// the stored configuration format and is kept as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Farenheit,
}

impl TemperatureUnit {
    /// Converts degrees Celsius into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Farenheit => celsius * (9.0 / 5.0) + 32.0,
        }
    }

    /// Display suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Farenheit => "F",
        }
    }
}

/// Millivolts → volts.
pub fn volts_from_millivolts(raw: u16) -> f64 {
    f64::from(raw) / 1000.0
}

/// Milliamps → amps magnitude. The sign of the raw reading (flow
/// direction) is intentionally discarded.
pub fn current_magnitude_amps(raw: i16) -> f64 {
    (f64::from(raw) / 1000.0).abs()
}

/// Millidegrees → degrees Celsius.
pub fn celsius_from_millidegrees(raw: u16) -> f64 {
    f64::from(raw) / 1000.0
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_conversion() {
        assert_eq!(ChargeUnit::Coulomb.convert(7200.0), 7200.0);
        assert_eq!(ChargeUnit::AmpHour.convert(7200.0), 2.0);
    }

    #[test]
    fn temperature_conversion() {
        assert_eq!(TemperatureUnit::Celsius.convert(25.0), 25.0);
        assert_eq!(TemperatureUnit::Farenheit.convert(25.0), 77.0);
        assert_eq!(TemperatureUnit::Farenheit.convert(0.0), 32.0);
    }

    #[test]
    fn suffixes() {
        assert_eq!(ChargeUnit::Coulomb.suffix(), "C");
        assert_eq!(ChargeUnit::AmpHour.suffix(), "Ah");
        assert_eq!(TemperatureUnit::Celsius.suffix(), "C");
        assert_eq!(TemperatureUnit::Farenheit.suffix(), "F");
    }

    #[test]
    fn current_magnitude_is_non_negative() {
        assert_eq!(current_magnitude_amps(-1500), 1.5);
        assert_eq!(current_magnitude_amps(1500), 1.5);
        assert_eq!(current_magnitude_amps(0), 0.0);
    }

    #[test]
    fn raw_scaling() {
        assert_eq!(volts_from_millivolts(16_800), 16.8);
        assert_eq!(celsius_from_millidegrees(25_000), 25.0);
    }

    #[test]
    fn toml_names_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Units {
            charge: ChargeUnit,
            temperature: TemperatureUnit,
        }

        let units: Units =
            toml::from_str("charge = \"amphour\"\ntemperature = \"farenheit\"").unwrap();
        assert_eq!(units.charge, ChargeUnit::AmpHour);
        assert_eq!(units.temperature, TemperatureUnit::Farenheit);

        let rendered = toml::to_string(&Units {
            charge: ChargeUnit::Coulomb,
            temperature: TemperatureUnit::Celsius,
        })
        .unwrap();
        assert!(rendered.contains("\"coulomb\""));
        assert!(rendered.contains("\"celsius\""));
    }
}
