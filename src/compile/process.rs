//! Running external filter programs (stdin in, stdout out) with a deadline.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

type PipeOutput = Receiver<io::Result<Vec<u8>>>;

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` produced output that is not valid UTF-8")]
    Utf8 { program: String },
}

/// Pipe `input` through `program args...` and return its standard output.
///
/// The program runs in its own process group, and the whole group is killed
/// once `timeout` elapses, including anything it forked that still holds the
/// output pipes. A non-zero exit status is an error carrying whatever the
/// program wrote to stderr.
pub fn run_filter(
    program: &str,
    args: &[&str],
    input: &str,
    timeout: Duration,
) -> Result<String, ProcessError> {
    let io_error = |source| ProcessError::Io {
        program: program.to_string(),
        source,
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut command, 0);

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let deadline = Instant::now() + timeout;

    if let Some(mut stdin) = child.stdin.take() {
        let input = input.as_bytes().to_vec();
        let program = program.to_string();
        thread::spawn(move || {
            if let Err(e) = stdin.write_all(&input) {
                tracing::trace!(%program, error = %e, "filter closed stdin early");
            }
        });
    }
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let finished = match wait_until(&mut child, deadline).map_err(io_error)? {
        Some(status) => collect(&stdout, deadline)
            .zip(collect(&stderr, deadline))
            .map(|(stdout, stderr)| (status, stdout, stderr)),
        None => None,
    };
    let Some((status, stdout, stderr)) = finished else {
        kill(&mut child).map_err(io_error)?;
        return Err(ProcessError::Timeout {
            program: program.to_string(),
            timeout,
        });
    };
    let stdout = stdout.map_err(io_error)?;

    if !status.success() {
        let stderr = stderr.unwrap_or_default();
        return Err(ProcessError::Failed {
            program: program.to_string(),
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    String::from_utf8(stdout).map_err(|_| ProcessError::Utf8 {
        program: program.to_string(),
    })
}

/// Wait for `child` to exit until `deadline`. `None` means it is still running.
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill `child` and every process left in its group.
fn kill(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-KILL", "--", &group])
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if !status.success() => {
                tracing::trace!(%group, %status, "process group already gone")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(%group, error = %e, "failed to signal process group"),
        }
    }
    child.kill()?;
    child.wait()?;
    Ok(())
}

/// Read `pipe` to the end on its own thread.
///
/// The reader is never joined: after a timeout it is left to finish whenever
/// the last process holding the pipe goes away.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> PipeOutput {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        if tx.send(result).is_err() {
            tracing::trace!("pipe output discarded after timeout");
        }
    });
    rx
}

/// The reader's output, or `None` if it is still blocked at `deadline`.
fn collect(rx: &PipeOutput, deadline: Instant) -> Option<io::Result<Vec<u8>>> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Err(io::Error::other("pipe reader panicked"))),
    }
}
