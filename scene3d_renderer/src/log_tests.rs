//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger and the process-wide logger slot.

use crate::log::{self, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "scene3d::test".to_string(),
        message: format!("{:?} message", severity),
        file,
        line,
    }
}

/// Captures entries logged under the `scene3d::test` source
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == "scene3d::test" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug_names() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_without_location() {
    let e = entry(LogSeverity::Info, None, None);
    assert_eq!(e.source, "scene3d::test");
    assert!(e.file.is_none());
    assert!(e.line.is_none());
}

#[test]
fn test_log_entry_with_location() {
    let e = entry(LogSeverity::Error, Some("constant_data.rs"), Some(42));
    assert_eq!(e.file, Some("constant_data.rs"));
    assert_eq!(e.line, Some(42));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("log_tests.rs"), Some(1)));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_routes_macros() {
    let (logger, entries) = CaptureLogger::new();
    log::set_logger(logger);

    crate::engine_trace!("scene3d::test", "trace {}", 1);
    crate::engine_debug!("scene3d::test", "debug {}", 2);
    crate::engine_info!("scene3d::test", "info {}", 3);
    crate::engine_warn!("scene3d::test", "warn {}", 4);
    crate::engine_error!("scene3d::test", "error {}", 5);

    log::reset_logger();

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[3].message, "warn 4");
    assert!(entries[3].file.is_none());

    let error = &entries[4];
    assert_eq!(error.severity, LogSeverity::Error);
    assert_eq!(error.message, "error 5");
    assert!(error.file.is_some());
    assert!(error.line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let (logger, entries) = CaptureLogger::new();
    log::set_logger(logger);
    crate::engine_info!("scene3d::test", "captured");
    log::reset_logger();
    crate::engine_info!("scene3d::test", "printed to console");

    assert_eq!(entries.lock().unwrap().len(), 1);
}
