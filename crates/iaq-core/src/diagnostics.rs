//! Human-readable diagnostics for non-OK sensor status codes
//!
//! Each non-OK code becomes one line of the form
//! `"<Subsystem> error code : <n>"` or `"<Subsystem> warning code : <n>"`.
//! Lines are emitted through the `log` facade and never drawn on the display.

use core::fmt;

use heapless::Vec;
use log::{error, warn};

use crate::sensor::{SensorStatus, StatusClass, StatusCode};

/// Maximum diagnostics one status check can produce (one per layer).
pub const MAX_DIAGNOSTICS: usize = 2;

/// Diagnostics produced by a single status check.
pub type Diagnostics = Vec<Diagnostic, MAX_DIAGNOSTICS>;

/// Which layer of the sensor stack reported a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// The sensor-fusion library
    Fusion,
    /// The gas sensor device itself
    Device,
}

impl StatusSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fusion => "BSEC",
            Self::Device => "BME680",
        }
    }
}

/// One non-OK status code and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: StatusSource,
    pub class: StatusClass,
}

impl Diagnostic {
    /// Build a diagnostic for `code`, or `None` if the code is OK.
    pub const fn from_code(source: StatusSource, code: StatusCode) -> Option<Self> {
        match code.class() {
            StatusClass::Ok => None,
            class => Some(Self { source, class }),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.class, StatusClass::Error(_))
    }

    pub const fn is_warning(&self) -> bool {
        matches!(self.class, StatusClass::Warning(_))
    }

    /// Emit this diagnostic at the log level matching its severity.
    pub fn log(&self) {
        if self.is_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, code) = match self.class {
            StatusClass::Error(code) => ("error", code),
            StatusClass::Warning(code) => ("warning", code),
            StatusClass::Ok => ("ok", 0),
        };
        write!(f, "{} {} code : {}", self.source.label(), kind, code)
    }
}

/// Classify both status codes, fusion library first.
pub fn check_status(status: &SensorStatus) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let candidates = [
        Diagnostic::from_code(StatusSource::Fusion, status.fusion),
        Diagnostic::from_code(StatusSource::Device, status.device),
    ];
    for diagnostic in candidates.into_iter().flatten() {
        // Capacity matches the number of candidates
        let _ = diagnostics.push(diagnostic);
    }

    diagnostics
}

/// Classify both status codes and log every non-OK one.
pub fn report_status(status: &SensorStatus) -> Diagnostics {
    let diagnostics = check_status(status);
    for diagnostic in diagnostics.iter() {
        diagnostic.log();
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};
    use std::vec::Vec;

    /// Records every log line together with the thread that emitted it, so
    /// tests running in parallel only see their own output.
    struct CaptureLogger {
        records: Mutex<Vec<(ThreadId, Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = self.records.lock() {
                records.push((
                    thread::current().id(),
                    record.level(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };

    /// Lines logged so far by the calling thread.
    fn captured_lines() -> Vec<(Level, String)> {
        // Only the first call installs the logger
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);

        let me = thread::current().id();
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread, _, _)| *thread == me)
            .map(|(_, level, line)| (*level, line.clone()))
            .collect()
    }

    #[test]
    fn test_ok_status_produces_nothing() {
        assert!(check_status(&SensorStatus::default()).is_empty());
    }

    #[test]
    fn test_error_and_warning_lines() {
        let status = SensorStatus {
            fusion: StatusCode(-1),
            device: StatusCode(2),
        };
        let diagnostics = check_status(&status);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].is_error());
        assert!(diagnostics[1].is_warning());
        assert_eq!(diagnostics[0].to_string(), "BSEC error code : -1");
        assert_eq!(diagnostics[1].to_string(), "BME680 warning code : 2");
    }

    #[test]
    fn test_report_status_logs_each_line_at_its_level() {
        let before = captured_lines().len();
        let status = SensorStatus {
            fusion: StatusCode(-1),
            device: StatusCode(2),
        };

        let diagnostics = report_status(&status);
        let lines = captured_lines();

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            &lines[before..],
            &[
                (Level::Error, "BSEC error code : -1".to_string()),
                (Level::Warn, "BME680 warning code : 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_report_status_is_silent_when_ok() {
        let before = captured_lines().len();
        report_status(&SensorStatus::default());
        assert_eq!(captured_lines().len(), before);
    }

    #[test]
    fn test_device_only_fault() {
        let status = SensorStatus {
            fusion: StatusCode::OK,
            device: StatusCode(-2),
        };
        let diagnostics = check_status(&status);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].source, StatusSource::Device);
        assert_eq!(diagnostics[0].to_string(), "BME680 error code : -2");
    }

    #[test]
    fn test_fusion_warning_label() {
        let diagnostic = Diagnostic::from_code(StatusSource::Fusion, StatusCode(10)).unwrap();
        assert_eq!(diagnostic.to_string(), "BSEC warning code : 10");
    }

    #[test]
    fn test_ok_code_has_no_diagnostic() {
        assert_eq!(
            Diagnostic::from_code(StatusSource::Device, StatusCode::OK),
            None
        );
    }
}
