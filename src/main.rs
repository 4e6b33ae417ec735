use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use error::AppError;
use interpreter::Interpreter;
use parser::ParseOptions;
use reporting::Reporter;
use xunit::XunitReport;

mod discovery;
mod error;
mod format;
mod interpreter;
mod parser;
mod reporting;
mod testing;
mod xunit;

#[derive(Parser)]
#[command(
    name = "tap-to-xunit",
    version,
    about = "Run TAP-style test files and publish the results as an XUnit XML report"
)]
struct Args {
    /// Path to the output XML file
    #[arg(long, default_value = "log/xunit.xml")]
    path: PathBuf,

    /// Path to the PHP CLI executable used to run tests
    #[arg(long)]
    phpcli: Option<PathBuf>,

    /// Directory searched for test files
    #[arg(long, default_value = "test")]
    root: PathBuf,

    /// File name suffix that marks a test file
    #[arg(long, default_value = "Test.php")]
    suffix: String,

    /// Kill a test process after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Accept any amount of whitespace after the '#' diagnostic marker
    #[arg(long)]
    loose_info: bool,

    /// Skip the check that every run printed a summary line
    #[arg(long)]
    no_completion_check: bool,

    /// Ignore test names on result lines
    #[arg(long)]
    no_names: bool,

    /// Fail the command when the report file can not be written
    #[arg(long)]
    strict_write: bool,

    /// Display full test output while running
    #[arg(long, short)]
    verbose: bool,

    /// Output progress in JSON format for machine consumption
    #[arg(long, short)]
    json: bool,
}

fn main() {
    match run() {
        Ok(_) => (),
        Err(err) => {
            err.report();
            std::process::exit(err.exit_code());
        }
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let options = ParseOptions {
        strict_info_prefix: !args.loose_info,
        track_completion_marker: !args.no_completion_check,
        capture_names: !args.no_names,
    };

    let interpreter = Interpreter::resolve(args.phpcli);
    let files = discovery::find_test_files(&args.root, &args.suffix)?;

    let mut reporter = if args.json {
        Box::new(reporting::json::JsonReporter::new(stdout())) as Box<dyn Reporter>
    } else {
        Box::new(reporting::console::ConsoleReporter::new(
            stdout(),
            args.verbose,
        )) as Box<dyn Reporter>
    };

    reporter.discovery_summary(&args.root, files.len());

    let mut report = XunitReport::new(&args.path, args.strict_write);

    testing::run_tests(
        files,
        &interpreter,
        options,
        args.timeout.map(Duration::from_secs),
        args.verbose,
        &mut report,
        reporter.as_mut(),
    )?;

    report.write()?;
    reporter.report_written(&args.path);

    Ok(())
}
