//! `adb` executor adapter.
//!
//! Translates the three orchestrator actions into `adb` invocations:
//!
//! | Action        | Command                                  |
//! |---------------|------------------------------------------|
//! | pair          | `adb pair <address>:<port> <password>`   |
//! | connect       | `adb connect <address>:<port>`           |
//! | switch mode   | `adb tcpip <port>`                       |
//!
//! stdout and stderr are captured for diagnostics.  A non-zero exit status is
//! the only failure signal; an executable that cannot be spawned at all is
//! reported as a failed result carrying the I/O error in `stderr`.
//!
//! Process spawning sits behind [`CommandRunner`] so the argument building and
//! result mapping can be tested without an `adb` binary.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use airpair_core::{ExecutorAction, ExecutorResult};
use tracing::debug;

use crate::application::execute_device::DeviceExecutor;

/// Exit status and captured output of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs an external program to completion.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// [`DeviceExecutor`] that drives the `adb` platform tool.
pub struct AdbExecutor<R: CommandRunner = ProcessRunner> {
    adb_path: PathBuf,
    runner: R,
    /// Held for the duration of each command; `adb` keeps device-session state.
    session: Mutex<()>,
}

impl AdbExecutor<ProcessRunner> {
    pub fn new(adb_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(adb_path, ProcessRunner)
    }
}

impl<R: CommandRunner> AdbExecutor<R> {
    pub fn with_runner(adb_path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            adb_path: adb_path.into(),
            runner,
            session: Mutex::new(()),
        }
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }

    fn invoke(&self, action: ExecutorAction, args: Vec<String>) -> ExecutorResult {
        let _session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        debug!(adb = %self.adb_path.display(), ?args, "args for {action} command");

        match self.runner.run(&self.adb_path, &args) {
            Ok(output) => ExecutorResult {
                succeeded: output.success,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => {
                ExecutorResult::failure(format!("failed to run {}: {e}", self.adb_path.display()))
            }
        }
    }
}

/// `address:port`, with IPv6 addresses bracketed.
fn endpoint(address: IpAddr, port: u16) -> String {
    SocketAddr::new(address, port).to_string()
}

impl<R: CommandRunner> DeviceExecutor for AdbExecutor<R> {
    fn pair(&self, address: IpAddr, port: u16, password: &str) -> ExecutorResult {
        self.invoke(
            ExecutorAction::Pair,
            vec![
                "pair".to_string(),
                endpoint(address, port),
                password.to_string(),
            ],
        )
    }

    fn connect(&self, address: IpAddr, port: u16) -> ExecutorResult {
        self.invoke(
            ExecutorAction::Connect,
            vec!["connect".to_string(), endpoint(address, port)],
        )
    }

    fn switch_mode(&self, port: u16) -> ExecutorResult {
        self.invoke(
            ExecutorAction::SwitchMode,
            vec!["tcpip".to_string(), port.to_string()],
        )
    }
}
