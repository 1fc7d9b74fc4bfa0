//! Synthetic fusion library for running the sample loop without hardware.

use iaq_core::sensor::{SampleRate, VirtualOutput};
use iaq_core::{SensorOutputs, SensorSource, SensorStatus, StatusCode};
use log::info;

/// A new sample becomes available every this many polls.
const READY_EVERY_POLLS: u64 = 3;

/// Length of the repeating fault schedule in polls.
const FAULT_PERIOD_POLLS: u64 = 200;

/// Polls within each period during which the device reports a warning.
const DEVICE_WARNING_POLLS: core::ops::Range<u64> = 120..126;

/// Poll within each period at which the fusion library reports an error.
const FUSION_ERROR_POLL: u64 = 160;

/// Device warning code used during the warning window
const DEVICE_WARNING_CODE: i32 = 2;

/// Fusion error code used at the error poll
const FUSION_ERROR_CODE: i32 = -1;

/// Generates slowly varying index readings with a scripted fault schedule.
pub struct SyntheticSensor {
    polls: u64,
    outputs: SensorOutputs,
    status: SensorStatus,
    subscriptions: usize,
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self {
            polls: 0,
            outputs: SensorOutputs::default(),
            status: SensorStatus::default(),
            subscriptions: 0,
        }
    }

    fn scheduled_status(&self) -> SensorStatus {
        let phase = self.polls % FAULT_PERIOD_POLLS;
        if DEVICE_WARNING_POLLS.contains(&phase) {
            SensorStatus {
                fusion: StatusCode::OK,
                device: StatusCode(DEVICE_WARNING_CODE),
            }
        } else if phase == FUSION_ERROR_POLL {
            SensorStatus {
                fusion: StatusCode(FUSION_ERROR_CODE),
                device: StatusCode::OK,
            }
        } else {
            SensorStatus::default()
        }
    }

    fn sample(&self) -> SensorOutputs {
        let t = self.polls as f64;

        // Static IAQ: 30-330 with a slow swell and some jitter
        let static_iaq = (180.0 + 130.0 * (t / 240.0).sin() + 20.0 * (t / 23.0).cos()).max(0.0);
        // The adaptive index lags and undershoots the static one a little
        let iaq = (static_iaq * 0.9 + 10.0 * (t / 61.0).sin()).max(0.0);
        let co2_equivalent = 500.0 + static_iaq * 4.0;
        let breath_voc_equivalent = 0.5 + static_iaq / 20.0;

        SensorOutputs {
            breath_voc_equivalent: breath_voc_equivalent as f32,
            co2_equivalent: co2_equivalent as f32,
            iaq: iaq as f32,
            static_iaq: static_iaq as f32,
        }
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SyntheticSensor {
    fn run(&mut self) -> bool {
        self.polls += 1;
        self.status = self.scheduled_status();

        if !self.status.is_ok() || self.subscriptions == 0 {
            return false;
        }
        if self.polls % READY_EVERY_POLLS != 0 {
            return false;
        }

        self.outputs = self.sample();
        true
    }

    fn outputs(&self) -> SensorOutputs {
        self.outputs
    }

    fn status(&self) -> SensorStatus {
        self.status
    }

    fn update_subscription(&mut self, outputs: &[VirtualOutput], rate: SampleRate) {
        info!("Synthetic sensor: {:?} at {:?}", outputs, rate);
        self.subscriptions += 1;
    }
}
