use std::path::Path;

use crate::testing::run::TestRun;

pub mod console;
pub mod json;

/// Reporter trait for different progress output formats
pub trait Reporter {
    /// Report the discovered test files
    fn discovery_summary(&mut self, root: &Path, count: usize);

    /// Report a test file starting
    fn test_start(&mut self, name: &str, number: usize, total: usize);

    /// Report one finished run
    fn test_result(&mut self, run: &TestRun, duration_ms: u64);

    /// Report the batch summary
    fn summary(&mut self, passed: usize, failed: usize, errors: usize, duration_secs: f64);

    /// Report where the document was written
    fn report_written(&mut self, path: &Path);

    /// Flush any buffered output
    fn flush(&mut self) -> std::io::Result<()>;
}

/// Return the singular or plural form of a word based on the count
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}
