//! Process facade for the harness.
//!
//! The [`ProcessFacade`] trait is the only way orchestration touches external
//! programs and the artifacts they leave behind: compiling, running with
//! redirected stdio, comparing outputs and deleting files. Tests use a
//! scripted facade that simulates programs without spawning processes.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument};

use crate::core::types::RunStatus;
use crate::io::config::CompilerConfig;
use crate::io::process::{files_identical, redirected_command, run_to_completion};

/// A program run with stdin bound to a file (or nothing) and stdout captured to a file.
#[derive(Debug, Clone, Copy)]
pub struct RedirectRequest<'a> {
    pub program: &'a Path,
    pub stdin: Option<&'a Path>,
    pub stdout: &'a Path,
    pub timeout: Option<Duration>,
}

/// A path that could not be removed during cleanup.
#[derive(Debug)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Abstraction over the external processes and filesystem commands a run needs.
///
/// `Err` means the operation could not be carried out at all (e.g. the
/// program could not be spawned); a program that ran and failed is reported
/// through [`RunStatus`].
pub trait ProcessFacade {
    /// Run `argv` with inherited stdio and wait for it.
    fn run(&self, argv: &[OsString]) -> Result<RunStatus>;

    /// Run a program with redirected stdio and wait for it (or its timeout).
    fn run_redirected(&self, request: &RedirectRequest<'_>) -> Result<RunStatus>;

    /// Remove `paths`, best effort. Missing files are not failures.
    fn delete_paths(&self, paths: &[PathBuf]) -> Vec<DeleteFailure>;

    /// `true` when both files hold exactly the same bytes.
    fn binary_compare_files(&self, left: &Path, right: &Path) -> Result<bool>;

    /// Compile `source` into `executable`.
    fn compile_file(
        &self,
        compiler: &CompilerConfig,
        source: &Path,
        executable: &Path,
    ) -> Result<RunStatus> {
        self.run(&compile_argv(compiler, source, executable))
    }
}

/// `<command> <options..> <source> -o <executable>`
pub fn compile_argv(compiler: &CompilerConfig, source: &Path, executable: &Path) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(compiler.options.len() + 4);
    argv.push(OsString::from(&compiler.command));
    argv.extend(compiler.options.iter().map(OsString::from));
    argv.push(source.as_os_str().to_owned());
    argv.push(OsString::from("-o"));
    argv.push(executable.as_os_str().to_owned());
    argv
}

/// Facade backed by real child processes, all started in `workdir`.
#[derive(Debug, Clone)]
pub struct SystemProcesses {
    workdir: PathBuf,
}

impl SystemProcesses {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }
}

impl ProcessFacade for SystemProcesses {
    #[instrument(skip_all, fields(program = ?argv.first()))]
    fn run(&self, argv: &[OsString]) -> Result<RunStatus> {
        let Some((program, args)) = argv.split_first() else {
            bail!("cannot run an empty command line");
        };
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        run_to_completion(cmd, None)
    }

    #[instrument(skip_all, fields(program = %request.program.display()))]
    fn run_redirected(&self, request: &RedirectRequest<'_>) -> Result<RunStatus> {
        let cmd = redirected_command(
            request.program,
            &self.workdir,
            request.stdin,
            request.stdout,
        )?;
        run_to_completion(cmd, request.timeout)
            .with_context(|| format!("run {}", request.program.display()))
    }

    fn delete_paths(&self, paths: &[PathBuf]) -> Vec<DeleteFailure> {
        let mut failures = Vec::new();
        for path in paths {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(error) => failures.push(DeleteFailure {
                    path: path.clone(),
                    error,
                }),
            }
        }
        failures
    }

    fn binary_compare_files(&self, left: &Path, right: &Path) -> Result<bool> {
        files_identical(left, right)
    }
}
