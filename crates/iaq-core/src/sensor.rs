//! Sensor-fusion source boundary
//!
//! The fusion library that turns raw gas, temperature, humidity and pressure
//! signals into calibrated indices is a black box. The core only needs to ask
//! it "is there a new sample?", read the named outputs when there is, and read
//! its status codes when there is not.

use embassy_time::Duration;

use crate::history::Reading;

/// Status code reported by the fusion library or the sensor device.
///
/// Zero is OK, negative values are errors and positive values are warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const OK: Self = Self(0);

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Classify the code by its sign.
    pub const fn class(self) -> StatusClass {
        match self.0 {
            0 => StatusClass::Ok,
            code if code < 0 => StatusClass::Error(code),
            code => StatusClass::Warning(code),
        }
    }
}

/// Severity of a [`StatusCode`], carrying the raw code for non-OK values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Warning(i32),
    Error(i32),
}

/// Status of both layers of the sensor stack, always readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorStatus {
    /// Status of the fusion library.
    pub fusion: StatusCode,
    /// Status of the physical gas sensor beneath it.
    pub device: StatusCode,
}

impl SensorStatus {
    pub const fn is_ok(&self) -> bool {
        self.fusion.is_ok() && self.device.is_ok()
    }
}

/// The four index outputs the display cares about, from one fusion cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorOutputs {
    /// Breath-VOC equivalent in ppm
    pub breath_voc_equivalent: f32,
    /// CO2 equivalent in ppm
    pub co2_equivalent: f32,
    /// Indoor air quality index (0-500)
    pub iaq: f32,
    /// Static (non-adaptive) indoor air quality index
    pub static_iaq: f32,
}

/// Everything one poll of the sensor produced. Consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub outputs: SensorOutputs,
    pub data_ready: bool,
    pub status: SensorStatus,
}

impl SensorSnapshot {
    /// Reading pushed into the history graph: the static IAQ, truncated.
    pub fn graph_reading(&self) -> Reading {
        self.outputs.static_iaq as Reading
    }
}

/// Virtual outputs the fusion library can be asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualOutput {
    Co2Equivalent,
    BreathVocEquivalent,
    Iaq,
    StaticIaq,
    RawPressure,
    RawTemperature,
}

/// Index outputs shown on screen.
pub const INDEX_OUTPUTS: [VirtualOutput; 4] = [
    VirtualOutput::Co2Equivalent,
    VirtualOutput::BreathVocEquivalent,
    VirtualOutput::Iaq,
    VirtualOutput::StaticIaq,
];

/// Raw outputs the fusion library needs at a faster rate to compensate the gas reading.
pub const RAW_OUTPUTS: [VirtualOutput; 2] =
    [VirtualOutput::RawPressure, VirtualOutput::RawTemperature];

/// Rate at which a subscribed output is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    /// One sample every 300 s
    UltraLowPower,
    /// One sample every 3 s
    LowPower,
}

impl SampleRate {
    /// Time between two samples at this rate
    pub const fn period(self) -> Duration {
        match self {
            Self::UltraLowPower => Duration::from_secs(300),
            Self::LowPower => Duration::from_secs(3),
        }
    }
}

/// Black-box fusion library driving a gas sensor.
///
/// All calls are synchronous and bounded in time; the implementation is
/// responsible for any bus timeouts.
pub trait SensorSource {
    /// Run one fusion step. Returns `true` if new outputs are available.
    fn run(&mut self) -> bool;

    /// Outputs of the most recent successful run.
    fn outputs(&self) -> SensorOutputs;

    /// Current status of the fusion library and the sensor device.
    fn status(&self) -> SensorStatus;

    /// Ask the library to compute `outputs` at `rate`.
    ///
    /// Failures are reported through [`SensorSource::status`].
    fn update_subscription(&mut self, outputs: &[VirtualOutput], rate: SampleRate);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusCode(0).class(), StatusClass::Ok);
        assert_eq!(StatusCode(-1).class(), StatusClass::Error(-1));
        assert_eq!(StatusCode(2).class(), StatusClass::Warning(2));
        assert_eq!(StatusCode(i32::MIN).class(), StatusClass::Error(i32::MIN));
    }

    #[test]
    fn test_sensor_status_ok() {
        assert!(SensorStatus::default().is_ok());
        let status = SensorStatus {
            fusion: StatusCode::OK,
            device: StatusCode(3),
        };
        assert!(!status.is_ok());
    }

    #[test]
    fn test_graph_reading_truncates_static_iaq() {
        let snapshot = SensorSnapshot {
            outputs: SensorOutputs {
                static_iaq: 87.9,
                ..Default::default()
            },
            data_ready: true,
            status: SensorStatus::default(),
        };
        assert_eq!(snapshot.graph_reading(), 87);
    }

    #[test]
    fn test_sample_rate_periods() {
        assert_eq!(SampleRate::UltraLowPower.period(), Duration::from_secs(300));
        assert_eq!(SampleRate::LowPower.period(), Duration::from_secs(3));
    }
}
