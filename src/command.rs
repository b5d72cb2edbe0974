//! Run external tools (`xinput`, `notify-send`, the user's custom command).
//!
//! Every failure mode of a child process is folded into [`CommandError`] so
//! callers can decide in one place whether to swallow it or report it.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a timed child is polled for completion.
const WAIT_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Program and arguments, executed directly.
    Argv(Vec<String>),
    /// A command line handed to `sh -c`.
    Shell(String),
}

/// A single process invocation and how to treat its result.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub invocation: Invocation,
    pub capture: bool,
    pub check: bool,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            invocation: Invocation::Argv(argv.into_iter().map(Into::into).collect()),
            capture: true,
            check: false,
            timeout: None,
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            invocation: Invocation::Shell(command.into()),
            capture: true,
            check: false,
            timeout: None,
        }
    }

    /// Treat a non-zero exit status as an error.
    pub fn check(mut self) -> Self {
        self.check = true;
        self
    }

    /// Let the child inherit stdout/stderr instead of capturing them.
    pub fn no_capture(mut self) -> Self {
        self.capture = false;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The full argument vector, including `sh -c` for shell invocations.
    pub fn argv(&self) -> Vec<&str> {
        match &self.invocation {
            Invocation::Argv(argv) => argv.iter().map(String::as_str).collect(),
            Invocation::Shell(cmd) => vec!["sh", "-c", cmd.as_str()],
        }
    }

    pub fn program(&self) -> &str {
        match &self.invocation {
            Invocation::Argv(argv) => argv.first().map(String::as_str).unwrap_or(""),
            Invocation::Shell(_) => "sh",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command {program} failed with {}", describe_exit(.code, .stderr))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("command {program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("command {program} not found")]
    NotFound { program: String },

    #[error("command {program} could not be run: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Seam between the toggle logic and the process table.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runs commands on the host with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let program = spec.program().to_string();
        let argv = spec.argv();
        let Some((first, rest)) = argv.split_first() else {
            return Err(CommandError::NotFound { program });
        };

        let mut cmd = Command::new(first);
        cmd.args(rest).stdin(Stdio::null());
        if spec.capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        log::debug!("Executing: {}", argv.join(" "));

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CommandError::NotFound {
                program: program.clone(),
            },
            _ => CommandError::Io {
                program: program.clone(),
                source: e,
            },
        })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match spec.timeout {
            Some(timeout) => match wait_with_timeout(&mut child, timeout) {
                Ok(Some(status)) => status,
                // Drain threads are left detached: a grandchild may still
                // hold the pipes open.
                Ok(None) => return Err(CommandError::TimedOut { program, timeout }),
                Err(source) => return Err(CommandError::Io { program, source }),
            },
            None => child.wait().map_err(|source| CommandError::Io {
                program: program.clone(),
                source,
            })?,
        };

        let output = CommandOutput {
            code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        if spec.check && !output.success() {
            return Err(CommandError::NonZeroExit {
                program,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}

/// Wait for `child`, killing it once `timeout` has elapsed.
/// Returns `Ok(None)` if the child had to be killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(WAIT_POLL);
    }
}
