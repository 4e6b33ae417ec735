use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::testing::run::{CaseRecord, CaseState, TestRun};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static FAILURE_TAG: &str = "failure";

/// An error that occurs while serializing the XUnit document.
#[derive(Debug, Error)]
#[error("error serializing XUnit report")]
pub struct SerializeError {
    #[from]
    inner: quick_xml::Error,
}

/// Render the runs into a single XUnit document.
pub fn render_document(runs: &[TestRun]) -> Result<String, SerializeError> {
    let mut buf: Vec<u8> = Vec::new();
    serialize_runs(runs, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn serialize_runs(runs: &[TestRun], writer: impl io::Write) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(TESTSUITES_TAG)))?;

    for run in runs {
        // A suite element without test cases breaks some CI dashboards, so
        // runs that produced nothing are left out entirely.
        if run.total_cases() > 0 {
            serialize_suite(run, &mut writer)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(TESTSUITES_TAG)))?;
    writer.write_event(Event::Eof)?;
    Ok(())
}

fn serialize_suite(run: &TestRun, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let name = run.name();
    let tests = run.total_cases().to_string();
    let failures = run.failed_count().to_string();
    let errors = if run.error_detected() { "1" } else { "0" };
    let time = format_seconds(run.execution_time.as_secs_f64());

    let mut suite_tag = BytesStart::new(TESTSUITE_TAG);
    suite_tag.extend_attributes([
        ("name", name.as_str()),
        ("tests", tests.as_str()),
        ("failures", failures.as_str()),
        ("errors", errors),
        ("time", time.as_str()),
    ]);
    writer.write_event(Event::Start(suite_tag))?;

    if run.has_cases() {
        for case in run.cases() {
            serialize_case(run, case, writer)?;
        }
    } else {
        // Error-flagged run with no parsed cases: emit one placeholder
        // entry so the crashed file is visible in the report.
        let time = format_seconds(run.time_per_case());
        let mut case_tag = BytesStart::new(TESTCASE_TAG);
        case_tag.extend_attributes([("name", "Test 1"), ("time", time.as_str())]);
        writer.write_event(Event::Empty(case_tag))?;
    }

    writer.write_event(Event::End(BytesEnd::new(TESTSUITE_TAG)))?;
    Ok(())
}

fn serialize_case(
    run: &TestRun,
    case: &CaseRecord,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let name = case.display_name();
    let time = format_seconds(run.time_per_case());

    let mut case_tag = BytesStart::new(TESTCASE_TAG);
    case_tag.extend_attributes([("name", name.as_str()), ("time", time.as_str())]);

    match &case.info {
        Some(info) if case.state == CaseState::Failed && !info.is_empty() => {
            writer.write_event(Event::Start(case_tag))?;
            writer.write_event(Event::Start(BytesStart::new(FAILURE_TAG)))?;
            let body = format!("{}\n{}", name, info);
            writer.write_event(Event::Text(BytesText::new(&body)))?;
            writer.write_event(Event::End(BytesEnd::new(FAILURE_TAG)))?;
            writer.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))?;
        }
        _ => {
            writer.write_event(Event::Empty(case_tag))?;
        }
    }
    Ok(())
}

fn format_seconds(value: f64) -> String {
    format!("{:.4}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use std::time::Duration;

    fn run_from(file: &str, output: &str, secs: f64) -> TestRun {
        let mut run = TestRun::new(file, ParseOptions::default());
        run.record_output(output.to_string(), Duration::from_secs_f64(secs));
        run
    }

    #[test]
    fn test_document_shape() {
        let run = run_from(
            "test/unit/userTest.php",
            "ok 1 - first\n\
             not ok 2 - second\n\
             #    expected true\n\
             Looks like you failed 1 tests of 2.\n",
            1.0,
        );

        let document = render_document(&[run]).unwrap();

        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(document.contains(
            "<testsuite name=\"userTest\" tests=\"2\" failures=\"1\" errors=\"0\" time=\"1.0000\">"
        ));
        assert!(document.contains("<testcase name=\"first\" time=\"0.5000\"/>"));
        assert!(document.contains("<failure>second\nexpected true</failure>"));
    }

    #[test]
    fn test_failed_case_without_info_has_no_failure_element() {
        let run = run_from(
            "aTest.php",
            "not ok 1 - bare failure\nLooks like you failed 1 tests of 1.\n",
            1.0,
        );

        let document = render_document(&[run]).unwrap();
        assert!(document.contains("<testcase name=\"bare failure\" time=\"1.0000\"/>"));
        assert!(!document.contains("<failure>"));
    }

    #[test]
    fn test_crashed_run_renders_a_placeholder_case() {
        let run = run_from("crashTest.php", "Segmentation fault\n", 3.0);

        let document = render_document(&[run]).unwrap();
        assert!(document.contains(
            "<testsuite name=\"crashTest\" tests=\"1\" failures=\"0\" errors=\"1\" time=\"3.0000\">"
        ));
        assert!(document.contains("<testcase name=\"Test 1\" time=\"3.0000\"/>"));
    }

    #[test]
    fn test_empty_run_is_omitted() {
        let options = ParseOptions {
            track_completion_marker: false,
            ..ParseOptions::default()
        };
        let mut run = TestRun::new("quietTest.php", options);
        run.record_output("nothing recognizable\n".to_string(), Duration::from_secs(1));

        let document = render_document(&[run]).unwrap();
        assert!(!document.contains("<testsuite"));
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let run = run_from(
            "escTest.php",
            "not ok 1 - a < b & c\n\
             #    got <null> & \"quotes\"\n\
             Looks like you failed 1 tests of 1.\n",
            1.0,
        );

        let document = render_document(&[run]).unwrap();
        assert!(document.contains("name=\"a &lt; b &amp; c\""));
        assert!(document.contains("got &lt;null&gt; &amp;"));
        assert!(!document.contains("<null>"));
    }

    #[test]
    fn test_time_per_case_is_rounded_to_four_decimals() {
        let run = run_from(
            "roundTest.php",
            "ok 1\nok 2\nok 3\nLooks like everything went fine.\n",
            1.0,
        );

        let document = render_document(&[run]).unwrap();
        assert!(document.contains("time=\"0.3333\""));
    }
}
