use std::sync::LazyLock;

use regex::Regex;


/// Controls how raw test output is interpreted.
///
/// The two historical output formats differ in whether diagnostic lines
/// require a four-space gap after the `#` marker, whether a missing summary
/// line flags the run as errored, and whether test names are read off the
/// result lines. Defaults match the newer format.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Require four whitespace characters after the `#` marker
    pub strict_info_prefix: bool,
    /// Flag runs whose output never reaches a summary line
    pub track_completion_marker: bool,
    /// Read test names from result lines
    pub capture_names: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict_info_prefix: true,
            track_completion_marker: true,
            capture_names: true,
        }
    }
}

/// One classified line of test output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// `ok <N>[ - <name>]`
    Pass { number: u32, name: Option<String> },
    /// `not ok <N>[ - <name>]`
    Fail { number: u32, name: Option<String> },
    /// `# <text>`, attached to the most recent test case
    Info(String),
    /// Anything else; ignored by the caller
    NoMatch,
}

// `not ok` must come first in the alternation so a failed result is never
// picked up as a pass by the shorter token.
static RESULT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(not ok|ok)\s+([0-9]+)").expect("result line pattern"));

static STRICT_INFO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s{4}").expect("info line pattern"));

static COMPLETION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Looks like (everything went fine|you failed [0-9]+ tests of [0-9]+)\.")
        .expect("completion marker pattern")
});

/// Classify a single trimmed line of test output.
///
/// Lines that resemble a result line but carry an unparseable test number
/// are treated as [`LineEvent::NoMatch`] rather than an error.
pub fn classify_line(line: &str, options: &ParseOptions) -> LineEvent {
    if let Some(captures) = RESULT_LINE.captures(line) {
        let number = match captures[2].parse::<u32>() {
            Ok(number) => number,
            Err(_) => return LineEvent::NoMatch,
        };

        let name = if options.capture_names {
            test_name(line)
        } else {
            None
        };

        if captures[1].eq_ignore_ascii_case("not ok") {
            return LineEvent::Fail { number, name };
        }
        return LineEvent::Pass { number, name };
    }

    if is_info_line(line, options) {
        return LineEvent::Info(line[1..].trim().to_string());
    }

    LineEvent::NoMatch
}

/// Check whether the raw output of a run contains a summary line.
///
/// The summary is the last thing a test process prints before exiting
/// normally, so its absence means the process crashed or hung part-way.
pub fn has_completion_marker(output: &str) -> bool {
    COMPLETION_MARKER.is_match(output)
}

/// Extract the test name from a result line: everything after the first
/// ` - ` separator. Empty names count as absent.
fn test_name(line: &str) -> Option<String> {
    line.split_once(" - ")
        .map(|(_, name)| name.to_string())
        .filter(|name| !name.is_empty())
}

fn is_info_line(line: &str, options: &ParseOptions) -> bool {
    if options.strict_info_prefix {
        STRICT_INFO_LINE.is_match(line)
    } else {
        line.starts_with('#')
    }
}
