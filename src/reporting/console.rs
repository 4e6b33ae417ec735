use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

use super::{pluralize, Reporter};
use crate::testing::run::TestRun;

pub struct ConsoleReporter<W: Write> {
    writer: W,
    verbose: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W, verbose: bool) -> Self {
        ConsoleReporter { writer, verbose }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn discovery_summary(&mut self, root: &Path, count: usize) {
        let file_word = pluralize(count, "file", "files");
        writeln!(
            self.writer,
            "discovered {} test {} in {}\n",
            count,
            file_word,
            root.display()
        )
        .unwrap();
    }

    fn test_start(&mut self, name: &str, _: usize, _: usize) {
        write!(
            self.writer,
            "{}test file {}",
            if self.verbose { "📦 " } else { "" },
            name
        )
        .unwrap();

        if self.verbose {
            writeln!(self.writer).unwrap();
        } else {
            write!(self.writer, " ... ").unwrap();
        }

        self.flush().unwrap();
    }

    fn test_result(&mut self, run: &TestRun, _: u64) {
        if self.verbose {
            writeln!(self.writer).unwrap();
        } else {
            if run.failed_count() > 0 {
                writeln!(self.writer, "{}", "FAILED".bold().red()).unwrap();
            } else if run.error_detected() {
                writeln!(self.writer, "{}", "ERROR".bold().red()).unwrap();
            } else {
                writeln!(self.writer, "{}", "ok".bold().green()).unwrap();
            }
        }
    }

    fn summary(&mut self, passed: usize, failed: usize, errors: usize, duration_secs: f64) {
        if !self.verbose {
            writeln!(self.writer).unwrap();
        }

        writeln!(
            self.writer,
            "test result: {}. {} passed; {} failed; {} errored; finished in {:.2}s\n",
            if failed == 0 && errors == 0 {
                "ok".bold().green()
            } else {
                "FAILED".bold().red()
            },
            passed,
            failed,
            errors,
            duration_secs
        )
        .unwrap();
    }

    fn report_written(&mut self, path: &Path) {
        writeln!(self.writer, "report written to {}", path.display()).unwrap();
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
