use std::io::{Read, Write};
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::interpreter::Interpreter;
use crate::testing::run::TestRun;

/// Runs test files through the interpreter and captures their output.
pub struct Executor<'a> {
    interpreter: &'a Interpreter,
    timeout: Option<Duration>,
    verbose: bool,
}

impl<'a> Executor<'a> {
    pub fn new(interpreter: &'a Interpreter, timeout: Option<Duration>, verbose: bool) -> Self {
        Executor {
            interpreter,
            timeout,
            verbose,
        }
    }

    /// Execute the run's test file, blocking until the process exits (or
    /// the timeout kills it), then hand the combined output and wall-clock
    /// time to the run for parsing.
    ///
    /// The exit status of the process is deliberately ignored: the parsed
    /// output and the completion marker are what decide the run's fate.
    pub fn execute(&self, run: &mut TestRun) -> Result<(), AppError> {
        let mut cmd = self.interpreter.command(&run.file_path);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let command_desc = format!("{:?}", cmd);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| AppError::CommandFailed {
            command: command_desc.clone(),
            reason: e.to_string(),
        })?;

        // Both pipes are drained on their own threads so a chatty process
        // can't fill one buffer and stall while we wait on the other.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let verbose = self.verbose;
        let stdout_capture = thread::spawn(move || capture_stream(stdout, verbose));
        let stderr_capture = thread::spawn(move || capture_stream(stderr, verbose));

        let timed_out = self.wait(&mut child, &command_desc)?;
        let elapsed = start.elapsed();

        let mut combined = stdout_capture.join().unwrap_or_default();
        combined.extend(stderr_capture.join().unwrap_or_default());
        let output = String::from_utf8_lossy(&combined).into_owned();

        if timed_out {
            run.record_timeout(output, elapsed);
        } else {
            run.record_output(output, elapsed);
        }

        Ok(())
    }

    /// Wait for the child to exit. Returns true if the timeout expired and
    /// the child was killed.
    fn wait(&self, child: &mut Child, command_desc: &str) -> Result<bool, AppError> {
        let Some(timeout) = self.timeout else {
            child.wait().map_err(|e| AppError::CommandFailed {
                command: command_desc.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(false);
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return Ok(false),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(true);
                    }
                    thread::sleep(Duration::from_millis(25));
                }
                Err(e) => {
                    return Err(AppError::CommandFailed {
                        command: command_desc.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

fn capture_stream(stream: Option<impl Read>, verbose: bool) -> Vec<u8> {
    let mut captured = Vec::new();
    let Some(mut stream) = stream else {
        return captured;
    };

    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if verbose {
                    let mut stdout = std::io::stdout();
                    let _ = stdout.write_all(&buf[..n]);
                    let _ = stdout.flush();
                }
                captured.extend_from_slice(&buf[..n]);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    captured
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use std::fs::File;
    use std::io::Write as _;
    use std::path::PathBuf;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_captures_output_of_a_real_process() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_fixture(
            &dir,
            "catTest.php",
            "ok 1 - works\nLooks like everything went fine.\n",
        );

        // `cat <file>` echoes the fixture back, standing in for a test
        // process that prints its results.
        let interpreter = Interpreter::resolve(Some(PathBuf::from("cat")));
        let executor = Executor::new(&interpreter, None, false);

        let mut run = TestRun::new(fixture, ParseOptions::default());
        executor.execute(&mut run).unwrap();

        assert_eq!(run.passed_count(), 1);
        assert_eq!(run.failed_count(), 0);
        assert!(!run.error_detected());
        assert!(run.execution_time > Duration::ZERO);
    }

    #[test]
    fn test_captures_stderr_as_well() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_fixture(
            &dir,
            "stderrTest.sh",
            "echo 'ok 1' >&2\necho 'Looks like everything went fine.' >&2\n",
        );

        let interpreter = Interpreter::resolve(Some(PathBuf::from("sh")));
        let executor = Executor::new(&interpreter, None, false);

        let mut run = TestRun::new(fixture, ParseOptions::default());
        executor.execute(&mut run).unwrap();

        assert_eq!(run.passed_count(), 1);
        assert!(!run.error_detected());
    }

    #[test]
    fn test_timeout_kills_a_hung_process() {
        let dir = tempfile::tempdir().unwrap();
        // `exec` so the kill reaches the sleeping process itself, not just
        // the shell wrapping it.
        let fixture = write_fixture(&dir, "hungTest.sh", "echo 'ok 1'\nexec sleep 30\n");

        let interpreter = Interpreter::resolve(Some(PathBuf::from("sh")));
        let executor = Executor::new(&interpreter, Some(Duration::from_millis(300)), false);

        let mut run = TestRun::new(fixture, ParseOptions::default());
        let started = Instant::now();
        executor.execute(&mut run).unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(run.error_detected());
        assert!(!run.has_cases());
        assert_eq!(run.total_cases(), 1);
    }

    #[test]
    fn test_missing_program_is_a_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_fixture(&dir, "anyTest.php", "ok 1\n");

        let interpreter =
            Interpreter::resolve(Some(PathBuf::from("definitely-not-a-real-binary")));
        let executor = Executor::new(&interpreter, None, false);

        let mut run = TestRun::new(fixture, ParseOptions::default());
        let result = executor.execute(&mut run);

        assert!(matches!(result, Err(AppError::CommandFailed { .. })));
    }
}
