//! Child processes for the generator and reviewer commands.
//!
//! Stdin is fed and output is drained on helper threads while the child runs,
//! so neither a chatty nor a non-reading collaborator can outlive its timeout.

use std::io::{Read, Write};
use std::process::{ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl CapturedOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Trimmed stderr, falling back to stdout when stderr is blank.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr_text();
        if stderr.trim().is_empty() {
            self.stdout_text().trim().to_string()
        } else {
            stderr.trim().to_string()
        }
    }
}

/// Build a [`Command`] from an argv array such as `["codex", "exec", "-"]`.
pub fn command_from_argv(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("command must not be empty"))?;
    if program.trim().is_empty() {
        return Err(anyhow!("command program must not be blank"));
    }
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

/// Run `cmd` with `input` on stdin, waiting at most `timeout`.
///
/// `output_limit_bytes` bounds what is kept of each stream. Bytes past the
/// limit are still read (and counted) so the child never blocks on a pipe.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_with_input(
    mut cmd: Command,
    input: &[u8],
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CapturedOutput> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let child_stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("stdin was not piped"))?;
    let input = input.to_vec();
    let stdin_handle = thread::spawn(move || write_stdin(child_stdin, &input));

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    match stdin_handle.join() {
        Ok(result) => result?,
        Err(_) => return Err(anyhow!("stdin writer thread panicked")),
    }
    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

/// Write `input` and close the pipe so the child sees EOF.
fn write_stdin(mut stdin: ChildStdin, input: &[u8]) -> Result<()> {
    if let Err(e) = stdin.write_all(input) {
        // A child that exits (or is killed) without reading closes the pipe early.
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            return Err(e).context("write stdin");
        }
        debug!("child closed stdin before reading all input");
    }
    Ok(())
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
