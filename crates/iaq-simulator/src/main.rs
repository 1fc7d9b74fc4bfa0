//! Desktop simulator for the iaq-scope air-quality graph display.
//!
//! Drives the real [`SampleLoop`] with a synthetic fusion library so the
//! poll / ingest / render pipeline can be exercised without hardware.
//!
//! By default the simulator runs headless: it replays a fixed number of
//! virtual seconds as fast as possible and prints the final frame as ASCII.
//! Build with `--features window` to watch the panel in an SDL2 window.
//!
//! Set `RUST_LOG=debug` to see every rendered sample and flush.

mod synthetic;
mod timing;

use std::time::Duration as StdDuration;

use embassy_time::Duration;
use iaq_core::{BufferedDisplay, Config, Display, MonoFrameBuffer, SampleLoop};
use log::{error, info};

use crate::synthetic::SyntheticSensor;
use crate::timing::SimTimer;

/// Virtual time covered by one control-loop tick.
const VIRTUAL_TICK: Duration = Duration::from_secs(1);

/// Ticks replayed in headless mode (two hours of sensor time).
const HEADLESS_TICKS: u64 = 2 * 60 * 60;

/// Character used for a lit pixel in the ASCII dump
const LIT: char = '#';

/// Character used for a dark pixel in the ASCII dump
const DARK: char = '.';

/// Render a monochrome frame as one text line per pixel row.
fn frame_to_ascii(frame: &MonoFrameBuffer) -> String {
    let size = embedded_graphics::prelude::OriginDimensions::size(frame);
    let mut out = String::with_capacity(((size.width + 1) * size.height) as usize);
    for y in 0..size.height as i32 {
        for x in 0..size.width as i32 {
            let lit = frame.pixel(x, y).is_some_and(|p| p.is_on());
            out.push(if lit { LIT } else { DARK });
        }
        out.push('\n');
    }
    out
}

/// Build the sample loop, subscribe the sensor and report startup status.
fn start_loop<D: Display>(display: D) -> Option<SampleLoop<SyntheticSensor, D>> {
    let config = Config::default();
    info!(
        "Display: {}x{}, graph ceiling {}",
        config.display.width,
        config.display.height,
        config.graph.assumed_max
    );

    let mut sample_loop = match SampleLoop::new(SyntheticSensor::new(), display, config) {
        Ok(sample_loop) => sample_loop,
        Err(e) => {
            error!("Failed to start sample loop: {}", e);
            return None;
        }
    };

    let faults = sample_loop.configure();
    if faults > 0 {
        info!("Sensor reported {} status codes during setup", faults);
    }
    Some(sample_loop)
}

#[cfg(not(feature = "window"))]
fn run() -> Result<(), ()> {
    let config = Config::default();
    let panel = MonoFrameBuffer::new(config.display.width, config.display.height);
    let mut sample_loop = start_loop(BufferedDisplay::new(panel)).ok_or(())?;

    let mut timer = SimTimer::new(VIRTUAL_TICK, StdDuration::ZERO).with_limit(HEADLESS_TICKS);
    sample_loop.run(&mut timer);

    let display = sample_loop.display();
    info!(
        "Replayed {} ticks, {} frames committed",
        HEADLESS_TICKS,
        display.commits()
    );
    print!("{}", frame_to_ascii(display.panel()));
    Ok(())
}

#[cfg(feature = "window")]
fn run() -> Result<(), ()> {
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::{
        BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
        sdl2::Keycode,
    };
    use iaq_core::LoopTimer;

    /// Pixel scale factor for the simulator window.
    const WINDOW_SCALE: u32 = 4;

    /// Wall-clock time per tick (~30 FPS, 30x faster than real time).
    const FRAME_DURATION: StdDuration = StdDuration::from_millis(33);

    let config = Config::default();
    let panel = SimulatorDisplay::<BinaryColor>::new(Size::new(
        config.display.width,
        config.display.height,
    ));
    let mut sample_loop = start_loop(BufferedDisplay::new(panel)).ok_or(())?;

    let output_settings = OutputSettingsBuilder::new()
        .scale(WINDOW_SCALE)
        .theme(BinaryColorTheme::OledBlue)
        .build();
    let mut window = Window::new("iaq-scope simulator", &output_settings);
    info!("Keys: Q=Quit");

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(sample_loop.display().panel());

    let mut timer = SimTimer::new(VIRTUAL_TICK, FRAME_DURATION);
    'running: loop {
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. }
                    if keycode == Keycode::Q || keycode == Keycode::Escape =>
                {
                    break 'running;
                }
                _ => {}
            }
        }

        let now = timer.now();
        if let Err(e) = sample_loop.poll_once(now) {
            error!("Sample loop iteration failed: {}", e);
        }
        window.update(sample_loop.display().panel());

        timer.wait_next_tick();
    }

    info!("Simulator exiting");
    Ok(())
}

fn main() {
    env_logger::init();
    info!("Starting iaq-scope simulator");

    if run().is_err() {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_frame_to_ascii_layout() {
        let mut frame = MonoFrameBuffer::new(3, 2);
        frame
            .draw_iter([Pixel(Point::new(1, 0), BinaryColor::On)])
            .unwrap();
        assert_eq!(frame_to_ascii(&frame), ".#.\n...\n");
    }

    #[test]
    fn test_headless_replay_renders_history() {
        let config = Config::default();
        let panel = MonoFrameBuffer::new(config.display.width, config.display.height);
        let mut sample_loop = start_loop(BufferedDisplay::new(panel)).unwrap();

        let mut timer = SimTimer::new(VIRTUAL_TICK, StdDuration::ZERO).with_limit(300);
        sample_loop.run(&mut timer);

        // One sample every third poll, minus the scripted fault polls
        assert!(sample_loop.display().commits() >= 90);
        assert!(sample_loop.history().iter().any(|reading| reading > 0));
        assert!(sample_loop.display().panel().lit_pixels() > 0);
    }
}
