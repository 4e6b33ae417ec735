use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::Reporter;
use crate::testing::run::TestRun;

#[derive(Serialize)]
struct JsonEvent {
    event_type: String,
    payload: serde_json::Value,
    timestamp: u128,
}

pub struct JsonReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        JsonReporter { writer }
    }

    /// Helper method to safely emit an event, handling all potential errors
    fn emit_event(&mut self, event_type: &str, payload: serde_json::Value) {
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(duration) => duration.as_millis(),
            Err(e) => {
                eprintln!("Error getting system time: {}", e);
                0 // Fallback to 0 on error
            }
        };

        let event = JsonEvent {
            event_type: event_type.to_string(),
            payload,
            timestamp,
        };

        let json_string = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("JSON serialization error: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(self.writer, "{}", json_string) {
            eprintln!("Write error: {}", e);
        }

        let _ = self.flush();
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn discovery_summary(&mut self, root: &Path, count: usize) {
        self.emit_event(
            "discovery_summary",
            serde_json::json!({
                "root": root,
                "count": count
            }),
        );
    }

    fn test_start(&mut self, name: &str, number: usize, total: usize) {
        self.emit_event(
            "test_start",
            serde_json::json!({
                "file": name,
                "test_number": number,
                "total_tests": total
            }),
        );
    }

    fn test_result(&mut self, run: &TestRun, duration_ms: u64) {
        self.emit_event(
            "test_result",
            serde_json::json!({
                "file": run.file_path,
                "suite": run.name(),
                "cases": run.total_cases(),
                "passed": run.passed_count(),
                "failed": run.failed_count(),
                "error_detected": run.error_detected(),
                "duration_ms": duration_ms
            }),
        );
    }

    fn summary(&mut self, passed: usize, failed: usize, errors: usize, duration_secs: f64) {
        self.emit_event(
            "summary",
            serde_json::json!({
                "passed": passed,
                "failed": failed,
                "errors": errors,
                "duration_secs": duration_secs
            }),
        );
    }

    fn report_written(&mut self, path: &Path) {
        self.emit_event("report_written", serde_json::json!({ "path": path }));
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
