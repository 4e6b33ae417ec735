pub mod executor;
pub mod run;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::interpreter::Interpreter;
use crate::parser::ParseOptions;
use crate::reporting::Reporter;
use crate::xunit::XunitReport;
use executor::Executor;
use run::TestRun;

/// Run every discovered test file, in order, and feed the finished runs to
/// the report. A failing or crashing test file never stops the batch; only
/// environment problems (interpreter missing, process spawn failure) do.
pub fn run_tests(
    files: Vec<PathBuf>,
    interpreter: &Interpreter,
    options: ParseOptions,
    timeout: Option<Duration>,
    verbose: bool,
    report: &mut XunitReport,
    reporter: &mut dyn Reporter,
) -> Result<(), AppError> {
    if !interpreter.is_installed() {
        return Err(AppError::InterpreterNotInstalled {
            program: interpreter.name(),
            installation_tip: interpreter.installation_tip(),
        });
    }

    let executor = Executor::new(interpreter, timeout, verbose);
    let start = Instant::now();
    let total = files.len();

    let mut passed = 0;
    let mut failed = 0;
    let mut errors = 0;

    for (index, file) in files.into_iter().enumerate() {
        let mut test_run = TestRun::new(file, options);
        reporter.test_start(&test_run.name(), index + 1, total);

        executor.execute(&mut test_run)?;

        passed += test_run.passed_count();
        failed += test_run.failed_count();
        if test_run.error_detected() {
            errors += 1;
        }

        reporter.test_result(&test_run, test_run.execution_time.as_millis() as u64);
        report.add_run(test_run);
    }

    reporter.summary(passed, failed, errors, start.elapsed().as_secs_f64());
    Ok(())
}
