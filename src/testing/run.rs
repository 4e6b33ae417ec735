use indexmap::IndexMap;
use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use crate::parser::{self, LineEvent, ParseOptions};

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Passed,
    Failed,
}

/// One test case parsed out of a run's output.
#[derive(Debug, Clone)]
pub struct CaseRecord {
    pub number: u32,
    pub name: Option<String>,
    pub state: CaseState,
    pub info: Option<String>,
}

impl CaseRecord {
    fn new(number: u32, name: Option<String>, state: CaseState) -> Self {
        CaseRecord {
            number,
            name,
            state,
            info: None,
        }
    }

    fn append_info(&mut self, text: &str) {
        match &mut self.info {
            Some(info) => {
                info.push('\n');
                info.push_str(text);
            }
            None => self.info = Some(text.to_string()),
        }
    }

    /// Name shown in the report, falling back to the test number.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Test {}", self.number),
        }
    }
}

/// The executed-and-parsed result of one test file.
///
/// Cases are keyed by test number; the first result line for a number wins
/// and repeats are dropped. `current_case` holds the key of the most
/// recently created record so diagnostic lines can be routed to it.
#[derive(Debug)]
pub struct TestRun {
    pub file_path: PathBuf,
    pub raw_output: String,
    pub execution_time: Duration,
    cases: IndexMap<u32, CaseRecord>,
    passed: usize,
    failed: usize,
    error_detected: bool,
    current_case: Option<u32>,
    options: ParseOptions,
}

impl TestRun {
    pub fn new(file_path: impl Into<PathBuf>, options: ParseOptions) -> Self {
        TestRun {
            file_path: file_path.into(),
            raw_output: String::new(),
            execution_time: Duration::ZERO,
            cases: IndexMap::new(),
            passed: 0,
            failed: 0,
            error_detected: false,
            current_case: None,
            options,
        }
    }

    /// Suite name: the file name with its extension stripped.
    pub fn name(&self) -> String {
        self.file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Store the captured output and timing of a completed process and
    /// parse the output into case records.
    pub fn record_output(&mut self, output: String, elapsed: Duration) {
        self.raw_output = output;
        self.execution_time = elapsed;
        self.parse_output();
    }

    /// Store the partial output of a killed process. Nothing is parsed;
    /// the run is flagged as errored with zero cases.
    pub fn record_timeout(&mut self, output: String, elapsed: Duration) {
        self.raw_output = output;
        self.execution_time = elapsed;
        self.error_detected = true;
    }

    fn parse_output(&mut self) {
        let raw = mem::take(&mut self.raw_output);

        for line in raw.lines() {
            self.parse_line(line.trim());
        }

        if self.options.track_completion_marker && !parser::has_completion_marker(&raw) {
            self.error_detected = true;
        }

        self.raw_output = raw;
    }

    fn parse_line(&mut self, line: &str) {
        match parser::classify_line(line, &self.options) {
            LineEvent::Pass { number, name } => self.record_case(number, name, CaseState::Passed),
            LineEvent::Fail { number, name } => self.record_case(number, name, CaseState::Failed),
            LineEvent::Info(text) => self.record_info(&text),
            LineEvent::NoMatch => {}
        }
    }

    // First result line for a test number wins. A repeat is dropped whole:
    // no counter bump, and the current case stays on the earlier record, so
    // diagnostics that follow the repeat attach there.
    fn record_case(&mut self, number: u32, name: Option<String>, state: CaseState) {
        if self.cases.contains_key(&number) {
            return;
        }

        self.cases.insert(number, CaseRecord::new(number, name, state));
        self.current_case = Some(number);

        match state {
            CaseState::Passed => self.passed += 1,
            CaseState::Failed => self.failed += 1,
        }
    }

    fn record_info(&mut self, text: &str) {
        // Diagnostics that arrive before any result line are dropped.
        let Some(number) = self.current_case else {
            return;
        };
        if let Some(case) = self.cases.get_mut(&number) {
            case.append_info(text);
        }
    }

    pub fn cases(&self) -> impl Iterator<Item = &CaseRecord> {
        self.cases.values()
    }

    pub fn has_cases(&self) -> bool {
        !self.cases.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.passed
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn error_detected(&self) -> bool {
        self.error_detected
    }

    /// Number of report entries this run contributes. A run that produced
    /// no cases but was flagged as errored still counts one, so a crashed
    /// test file stays visible in the report instead of vanishing.
    pub fn total_cases(&self) -> usize {
        if self.cases.is_empty() && self.error_detected {
            1
        } else {
            self.cases.len()
        }
    }

    /// Wall-clock time attributed to each test case.
    pub fn time_per_case(&self) -> f64 {
        let total = self.total_cases();
        if total == 0 {
            return 0.0;
        }
        self.execution_time.as_secs_f64() / total as f64
    }
}
