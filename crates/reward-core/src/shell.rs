//! Running external programs (docker, compose, helper binaries)
//!
//! Everything that shells out goes through the [`Shell`] capability so callers
//! can be tested against [`MockShell`] without launching processes.
//!
//! Child processes share this process's stdin/stdout/stderr. At most one call
//! should be in flight per process; concurrent callers must serialize.

use crate::ShellError;
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

/// Per-call overrides for [`Shell::execute_with_options`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    capture_output: Option<bool>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate stdout/stderr into the returned buffer in addition to the
    /// inherited streams
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = Some(capture);
        self
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured output; `None` when output went only to the inherited streams
    pub output: Option<Vec<u8>>,
    pub exit_code: i32,
}

impl ExecResult {
    /// Captured bytes, empty when nothing was captured
    pub fn stdout(&self) -> &[u8] {
        self.output.as_deref().unwrap_or_default()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(self.stdout()).into_owned()
    }
}

/// Capability to run an external program synchronously to completion
pub trait Shell: Send + Sync {
    /// Run `program` with `args` using the shell's default options
    fn execute(&self, program: &str, args: &[&str]) -> Result<ExecResult, ShellError> {
        self.execute_with_options(program, args, &ExecOptions::default())
    }

    /// Run `program` with `args`, overriding defaults with `options`
    fn execute_with_options(
        &self,
        program: &str,
        args: &[&str],
        options: &ExecOptions,
    ) -> Result<ExecResult, ShellError>;
}

/// Shell that launches real child processes
#[derive(Debug, Clone, Default)]
pub struct LocalShell {
    /// Default capture mode when a call does not override it
    pub capture_output: bool,
}

impl LocalShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture_output(capture_output: bool) -> Self {
        Self { capture_output }
    }

    fn run_passthrough(&self, program: &str, cmd: &mut Command) -> Result<ExecResult, ShellError> {
        let status = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ShellError::Launch {
                program: program.to_string(),
                source,
            })?;

        finish(program, status, None)
    }

    fn run_captured(&self, program: &str, cmd: &mut Command) -> Result<ExecResult, ShellError> {
        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ShellError::Launch {
                program: program.to_string(),
                source,
            })?;

        let captured = Arc::new(Mutex::new(Vec::new()));

        let stderr_pump = child.stderr.take().map(|stderr| {
            let captured = Arc::clone(&captured);
            std::thread::spawn(move || tee(stderr, std::io::stderr(), &captured))
        });

        let io_err = |source| ShellError::Io {
            program: program.to_string(),
            source,
        };

        if let Some(stdout) = child.stdout.take() {
            tee(stdout, std::io::stdout(), &captured).map_err(io_err)?;
        }

        if let Some(pump) = stderr_pump {
            match pump.join() {
                Ok(result) => result.map_err(io_err)?,
                Err(_) => {
                    return Err(io_err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "stderr reader panicked",
                    )))
                }
            }
        }

        let status = child.wait().map_err(io_err)?;
        let output = std::mem::take(&mut *lock(&captured));

        finish(program, status, Some(output))
    }
}

impl Shell for LocalShell {
    fn execute_with_options(
        &self,
        program: &str,
        args: &[&str],
        options: &ExecOptions,
    ) -> Result<ExecResult, ShellError> {
        let capture = options.capture_output.unwrap_or(self.capture_output);

        tracing::debug!("Running command: {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::inherit());

        if capture {
            self.run_captured(program, &mut cmd)
        } else {
            self.run_passthrough(program, &mut cmd)
        }
    }
}

/// Copy `src` into `inherited` while appending every chunk to `captured`
fn tee<R: Read, W: Write>(
    mut src: R,
    mut inherited: W,
    captured: &Mutex<Vec<u8>>,
) -> std::io::Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        // A closed terminal must not fail the child
        let _ = inherited.write_all(&buf[..n]);
        lock(captured).extend_from_slice(&buf[..n]);
    }
    let _ = inherited.flush();
    Ok(())
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn finish(
    program: &str,
    status: ExitStatus,
    output: Option<Vec<u8>>,
) -> Result<ExecResult, ShellError> {
    if status.success() {
        return Ok(ExecResult {
            output,
            exit_code: status.code().unwrap_or(0),
        });
    }

    tracing::debug!("{} failed: {}", program, status);

    Err(ShellError::NonZeroExit {
        program: program.to_string(),
        code: status.code(),
        output,
    })
}

/// Build the host shell invocation for a command line that needs shell
/// interpretation: `sh -c "<args joined>"`, or `cmd /c <args>` on Windows.
pub fn os_command(args: &[&str]) -> (String, Vec<String>) {
    if cfg!(windows) {
        let mut cmd_args = vec!["/c".to_string()];
        cmd_args.extend(args.iter().map(|a| a.to_string()));
        ("cmd".to_string(), cmd_args)
    } else {
        ("sh".to_string(), vec!["-c".to_string(), args.join(" ")])
    }
}

/// Shell that never launches anything and replays a fixed result
pub struct MockShell {
    output: Vec<u8>,
    error: Option<ShellError>,
    last_command: Mutex<String>,
}

impl MockShell {
    pub fn new(last_command: impl Into<String>, output: impl Into<Vec<u8>>, error: Option<ShellError>) -> Self {
        Self {
            output: output.into(),
            error,
            last_command: Mutex::new(last_command.into()),
        }
    }

    /// The most recent command line, or the constructor value before any call
    pub fn last_command(&self) -> String {
        lock(&self.last_command).clone()
    }
}

impl Shell for MockShell {
    fn execute_with_options(
        &self,
        program: &str,
        args: &[&str],
        _options: &ExecOptions,
    ) -> Result<ExecResult, ShellError> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        *lock(&self.last_command) = line;

        if let Some(err) = &self.error {
            return Err(clone_shell_error(err));
        }

        Ok(ExecResult {
            output: Some(self.output.clone()),
            exit_code: 0,
        })
    }
}

/// Clone a ShellError (io::Error doesn't implement Clone)
fn clone_shell_error(e: &ShellError) -> ShellError {
    match e {
        ShellError::Launch { program, source } => ShellError::Launch {
            program: program.clone(),
            source: std::io::Error::new(source.kind(), source.to_string()),
        },
        ShellError::NonZeroExit {
            program,
            code,
            output,
        } => ShellError::NonZeroExit {
            program: program.clone(),
            code: *code,
            output: output.clone(),
        },
        ShellError::Io { program, source } => ShellError::Io {
            program: program.clone(),
            source: std::io::Error::new(source.kind(), source.to_string()),
        },
    }
}
