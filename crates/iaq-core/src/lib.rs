//! Hardware-independent core library for iaq-scope
//!
//! This crate contains all platform-agnostic logic for the air-quality graph
//! display: the scrolling history buffer, the value-to-pixel mapping, the
//! sensor and display boundaries, the monochrome framebuffer, rendering and
//! the sample loop that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod diagnostics;
pub mod display;
pub mod framebuffer;
pub mod history;
pub mod mapping;
pub mod metrics;
pub mod render;
pub mod sample_loop;
pub mod sensor;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, StatusSource};
pub use display::{BufferedDisplay, Display, DisplayError};
pub use framebuffer::MonoFrameBuffer;
pub use history::{HistoryBuffer, HistoryError, Reading};
pub use mapping::{ASSUMED_MAX_IAQ, column_height};
pub use sample_loop::{LoopError, LoopTimer, PollOutcome, SampleLoop};
pub use sensor::{SensorOutputs, SensorSnapshot, SensorSource, SensorStatus, StatusCode};
