//! Poll / ingest / render control loop
//!
//! Every iteration asks the sensor source for a new sample once:
//!
//! - **ready**: read the four outputs, push the static IAQ into the history,
//!   redraw the numeric overlay and the graph, commit the frame;
//! - **not ready**: read both status codes and log every non-OK one. Nothing
//!   is drawn, the history is untouched and the display is not committed.
//!
//! Sensor faults never stop the loop. Every iteration is its own retry.

use embassy_time::Instant;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::{debug, error, info};
use thiserror_no_std::Error;

use crate::config::{Config, ConfigError};
use crate::diagnostics::{Diagnostics, report_status};
use crate::display::{Display, DisplayError};
use crate::history::{HistoryBuffer, HistoryError};
use crate::metrics::IaqLevel;
use crate::render::{draw_graph, draw_readings};
use crate::sensor::{INDEX_OUTPUTS, RAW_OUTPUTS, SampleRate, SensorSnapshot, SensorSource};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    #[error("Invalid configuration: {0}")]
    Config(ConfigError),
    #[error("History setup failed: {0}")]
    History(HistoryError),
    #[error("Display error: {0}")]
    Display(DisplayError),
}

impl From<ConfigError> for LoopError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HistoryError> for LoopError {
    fn from(e: HistoryError) -> Self {
        Self::History(e)
    }
}

impl From<DisplayError> for LoopError {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

/// What a single [`SampleLoop::poll_once`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// New data was available; the frame was redrawn and committed.
    Rendered(SensorSnapshot),
    /// No new data; these non-OK status codes were logged.
    NotReady(Diagnostics),
}

/// Time source and pacing for [`SampleLoop::run`].
pub trait LoopTimer {
    /// Current time, used by the ingest throttle.
    fn now(&mut self) -> Instant;

    /// Block until the next control-loop tick.
    ///
    /// Returns `false` once the loop should shut down.
    fn wait_next_tick(&mut self) -> bool;
}

/// Owns the sensor source, the display and the history buffer.
pub struct SampleLoop<S, D>
where
    S: SensorSource,
    D: Display,
{
    sensor: S,
    display: D,
    history: HistoryBuffer,
    config: Config,
    last_ingest: Option<Instant>,
}

impl<S, D> SampleLoop<S, D>
where
    S: SensorSource,
    D: Display,
{
    /// Build the loop and allocate a history as wide as the display.
    ///
    /// Fails if the configuration is invalid, the display frame is not the
    /// configured size, or the history cannot be allocated.
    pub fn new(sensor: S, mut display: D, config: Config) -> Result<Self, LoopError> {
        config.validate()?;
        config.check_frame(display.frame().size())?;

        let history =
            HistoryBuffer::with_baseline(config.display.width as usize, config.graph.baseline)?;

        Ok(Self {
            sensor,
            display,
            history,
            config,
            last_ingest: None,
        })
    }

    /// Subscribe to the outputs the display needs and report sensor status.
    ///
    /// Index outputs run at the ultra-low-power rate; raw pressure and
    /// temperature run at the low-power rate the fusion library needs for
    /// compensation. Status is checked before and after each step.
    ///
    /// Returns the number of non-OK status codes seen along the way.
    pub fn configure(&mut self) -> usize {
        let mut faults = report_status(&self.sensor.status()).len();

        info!(
            "Subscribing {} index outputs every {} s",
            INDEX_OUTPUTS.len(),
            SampleRate::UltraLowPower.period().as_secs()
        );
        self.sensor
            .update_subscription(&INDEX_OUTPUTS, SampleRate::UltraLowPower);
        faults += report_status(&self.sensor.status()).len();

        info!(
            "Subscribing {} raw outputs every {} s",
            RAW_OUTPUTS.len(),
            SampleRate::LowPower.period().as_secs()
        );
        self.sensor
            .update_subscription(&RAW_OUTPUTS, SampleRate::LowPower);
        faults += report_status(&self.sensor.status()).len();

        faults
    }

    /// Run one iteration of the control loop.
    pub fn poll_once(&mut self, now: Instant) -> Result<PollOutcome, LoopError> {
        if !self.sensor.run() {
            let diagnostics = report_status(&self.sensor.status());
            return Ok(PollOutcome::NotReady(diagnostics));
        }

        let snapshot = SensorSnapshot {
            outputs: self.sensor.outputs(),
            data_ready: true,
            status: self.sensor.status(),
        };

        if self.should_ingest(now) {
            self.history.ingest(snapshot.graph_reading());
            self.last_ingest = Some(now);
        }

        debug!(
            "IAQ {:.1} ({}), static {:.1}, CO2 {:.1} ppm, bVOC {:.2} ppm",
            snapshot.outputs.iaq,
            IaqLevel::assess(snapshot.outputs.iaq).label(),
            snapshot.outputs.static_iaq,
            snapshot.outputs.co2_equivalent,
            snapshot.outputs.breath_voc_equivalent
        );

        self.render(&snapshot)?;
        self.display.commit()?;

        Ok(PollOutcome::Rendered(snapshot))
    }

    /// Poll on every tick of `timer` until it asks to stop.
    ///
    /// Failed iterations are logged and the loop carries on.
    pub fn run<T: LoopTimer>(&mut self, timer: &mut T) {
        info!(
            "Sample loop running, {} history slots",
            self.history.capacity()
        );
        loop {
            let now = timer.now();
            if let Err(e) = self.poll_once(now) {
                error!("Sample loop iteration failed: {}", e);
            }
            if !timer.wait_next_tick() {
                break;
            }
        }
        info!("Sample loop stopped");
    }

    fn should_ingest(&self, now: Instant) -> bool {
        match (self.config.sampling.ingest_interval(), self.last_ingest) {
            (None, _) | (Some(_), None) => true,
            // A clock that stepped backwards counts as elapsed
            (Some(interval), Some(last)) => now
                .checked_duration_since(last)
                .is_none_or(|elapsed| elapsed >= interval),
        }
    }

    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<(), DisplayError> {
        let frame = self.display.frame();
        frame
            .clear(BinaryColor::Off)
            .map_err(|_| DisplayError::Draw)?;
        draw_readings(frame, &snapshot.outputs, &self.config.text)
            .map_err(|_| DisplayError::Draw)?;
        draw_graph(frame, &self.history, &self.config.graph).map_err(|_| DisplayError::Draw)
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}
