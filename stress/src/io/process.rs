//! Helpers for running child processes with file-bound stdio and an optional timeout.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::types::RunStatus;

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => RunStatus::exited(code),
            None => RunStatus::signaled(),
        }
    }
}

/// Spawn `cmd` and block until it exits.
///
/// With a `timeout`, a child still running once it elapses is killed and
/// reported as [`RunStatus::timed_out`]. Without one, the call waits
/// indefinitely. Stdio must already be configured by the caller.
#[instrument(skip_all, fields(program = ?cmd.get_program(), timeout_secs = timeout.map(|t| t.as_secs())))]
pub fn run_to_completion(mut cmd: Command, timeout: Option<Duration>) -> Result<RunStatus> {
    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context(format!("spawn {}", cmd.get_program().to_string_lossy()));
        }
    };

    let Some(timeout) = timeout else {
        let status = child.wait().context("wait for command")?;
        debug!(exit_code = ?status.code(), "command finished");
        return Ok(status.into());
    };

    match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => {
            debug!(exit_code = ?status.code(), "command finished");
            Ok(status.into())
        }
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?;
            Ok(RunStatus::timed_out())
        }
    }
}

/// Build a command for `program` with stdin bound to `stdin` (or null) and
/// stdout truncated into `stdout`. Stderr is inherited so diagnostics reach the user.
pub fn redirected_command(
    program: &Path,
    workdir: &Path,
    stdin: Option<&Path>,
    stdout: &Path,
) -> Result<Command> {
    let stdin = match stdin {
        Some(path) => Stdio::from(
            File::open(path).with_context(|| format!("open stdin {}", path.display()))?,
        ),
        None => Stdio::null(),
    };
    let stdout = File::create(stdout).with_context(|| format!("create {}", stdout.display()))?;

    let mut cmd = Command::new(program);
    cmd.current_dir(workdir)
        .stdin(stdin)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::inherit());
    Ok(cmd)
}

/// Byte-exact comparison of two files.
pub fn files_identical(left: &Path, right: &Path) -> Result<bool> {
    let left_len = std::fs::metadata(left)
        .with_context(|| format!("stat {}", left.display()))?
        .len();
    let right_len = std::fs::metadata(right)
        .with_context(|| format!("stat {}", right.display()))?
        .len();
    if left_len != right_len {
        return Ok(false);
    }

    let mut left_reader =
        BufReader::new(File::open(left).with_context(|| format!("open {}", left.display()))?);
    let mut right_reader =
        BufReader::new(File::open(right).with_context(|| format!("open {}", right.display()))?);
    let mut left_chunk = [0u8; 8192];
    let mut right_chunk = [0u8; 8192];

    loop {
        let n = read_full(&mut left_reader, &mut left_chunk)
            .with_context(|| format!("read {}", left.display()))?;
        let m = read_full(&mut right_reader, &mut right_chunk)
            .with_context(|| format!("read {}", right.display()))?;
        if n != m || left_chunk[..n] != right_chunk[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` unless the reader hits EOF first.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).context("read output")?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn identical_files_compare_equal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let left = temp.path().join("left.txt");
        let right = temp.path().join("right.txt");
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&left, &payload).expect("write left");
        fs::write(&right, &payload).expect("write right");

        assert!(files_identical(&left, &right).expect("compare"));
    }

    #[test]
    fn comparison_is_byte_exact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let left = temp.path().join("left.txt");
        let right = temp.path().join("right.txt");
        fs::write(&left, b"1 2 3\n").expect("write left");
        fs::write(&right, b"1 2 3\r\n").expect("write right");
        assert!(!files_identical(&left, &right).expect("compare"));

        fs::write(&right, b"1 2 4\n").expect("write right");
        assert!(!files_identical(&left, &right).expect("compare"));
    }

    #[test]
    fn empty_files_compare_equal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let left = temp.path().join("left.txt");
        let right = temp.path().join("right.txt");
        fs::write(&left, b"").expect("write left");
        fs::write(&right, b"").expect("write right");
        assert!(files_identical(&left, &right).expect("compare"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let left = temp.path().join("left.txt");
        fs::write(&left, b"x").expect("write left");
        let err = files_identical(&left, &temp.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_long_running_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5").stdin(Stdio::null()).stdout(Stdio::null());
        let status = run_to_completion(cmd, Some(Duration::from_millis(100))).expect("run");
        assert_eq!(status, RunStatus::timed_out());
    }

    #[cfg(unix)]
    #[test]
    fn redirected_command_captures_stdout_to_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("in.txt");
        let output = temp.path().join("out.txt");
        fs::write(&input, b"hello\n").expect("write input");

        let cmd = redirected_command(
            Path::new("cat"),
            temp.path(),
            Some(input.as_path()),
            &output,
        )
        .expect("command");
        let status = run_to_completion(cmd, None).expect("run");

        assert!(status.success());
        assert_eq!(fs::read(&output).expect("read output"), b"hello\n");
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let cmd = Command::new("definitely-not-a-real-program-xyz");
        let err = run_to_completion(cmd, None).unwrap_err();
        assert!(format!("{err:#}").contains("spawn"));
    }
}
