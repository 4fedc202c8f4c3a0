//! Test-only helpers: a scratch workspace and a scripted process facade.
//!
//! [`ScriptedProcesses`] simulates the three programs without spawning
//! anything. Generation `n` (0-based) writes `n` as the input, so the input
//! for case `n` is `n`. The reference answers `2 * n`; the candidate does the
//! same unless scripted to mismatch or crash on a given case.

use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::core::types::{Role, RunStatus};
use crate::io::config::{CompilerConfig, StressConfig};
use crate::io::facade::{DeleteFailure, ProcessFacade, RedirectRequest, SystemProcesses};
use crate::io::paths::HarnessPaths;
use crate::io::process::files_identical;

/// Temporary working directory holding the three (dummy) sources.
pub struct TestWorkspace {
    temp: TempDir,
    pub config: StressConfig,
    pub paths: HarnessPaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Self::with_config(StressConfig::default())
    }

    pub fn with_config(config: StressConfig) -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let paths = HarnessPaths::new(temp.path(), &config.files);
        for source in [
            &paths.reference_source,
            &paths.candidate_source,
            &paths.generator_source,
        ] {
            fs::write(source, "// source\n")
                .with_context(|| format!("write {}", source.display()))?;
        }
        Ok(Self {
            temp,
            config,
            paths,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Sorted names of every entry in the workspace root.
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root()).context("read workspace")? {
            let entry = entry.context("read entry")?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// Facade call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Compile(PathBuf),
    Command(Vec<OsString>),
    Generate,
    Run(Role),
    Compare,
    Delete(Vec<PathBuf>),
}

pub struct ScriptedProcesses {
    paths: HarnessPaths,
    failing_compile: Option<PathBuf>,
    unlaunchable_compile: Option<PathBuf>,
    mismatch_on: Option<u32>,
    crash_on: Option<(Role, u32)>,
    generation_fails_on: Option<u32>,
    compare_error: bool,
    calls: RefCell<Vec<Call>>,
    generated: Cell<u32>,
}

impl ScriptedProcesses {
    pub fn new(paths: &HarnessPaths) -> Self {
        Self {
            paths: paths.clone(),
            failing_compile: None,
            unlaunchable_compile: None,
            mismatch_on: None,
            crash_on: None,
            generation_fails_on: None,
            compare_error: false,
            calls: RefCell::new(Vec::new()),
            generated: Cell::new(0),
        }
    }

    /// The compiler exits non-zero for `source`.
    pub fn fail_compile(mut self, source: &Path) -> Self {
        self.failing_compile = Some(source.to_path_buf());
        self
    }

    /// The compiler cannot be spawned for `source`.
    pub fn unlaunchable_compiler_for(mut self, source: &Path) -> Self {
        self.unlaunchable_compile = Some(source.to_path_buf());
        self
    }

    /// The candidate prints a wrong answer for `case`.
    pub fn mismatch_on(mut self, case: u32) -> Self {
        self.mismatch_on = Some(case);
        self
    }

    /// `role` exits with status 1 on `case`.
    pub fn crash_on(mut self, role: Role, case: u32) -> Self {
        self.crash_on = Some((role, case));
        self
    }

    /// The generator exits with status 1 when producing input for `case`.
    pub fn fail_generation_on(mut self, case: u32) -> Self {
        self.generation_fails_on = Some(case);
        self
    }

    /// Comparing outputs fails with an I/O-style error.
    pub fn fail_compare(mut self) -> Self {
        self.compare_error = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn role_of(&self, program: &Path) -> Result<Role> {
        [Role::Reference, Role::Candidate, Role::Generator]
            .into_iter()
            .find(|role| self.paths.executable(*role) == program)
            .with_context(|| format!("unexpected program {}", program.display()))
    }

    fn read_case(path: &Path) -> Result<u32> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        raw.trim()
            .parse()
            .with_context(|| format!("parse case from {}", path.display()))
    }
}

impl ProcessFacade for ScriptedProcesses {
    fn run(&self, argv: &[OsString]) -> Result<RunStatus> {
        self.record(Call::Command(argv.to_vec()));
        Ok(RunStatus::exited(0))
    }

    fn compile_file(
        &self,
        _compiler: &CompilerConfig,
        source: &Path,
        executable: &Path,
    ) -> Result<RunStatus> {
        self.record(Call::Compile(source.to_path_buf()));
        if self.unlaunchable_compile.as_deref() == Some(source) {
            bail!("spawn g++: No such file or directory");
        }
        if self.failing_compile.as_deref() == Some(source) {
            return Ok(RunStatus::exited(1));
        }
        fs::write(executable, b"scripted executable")
            .with_context(|| format!("write {}", executable.display()))?;
        Ok(RunStatus::exited(0))
    }

    fn run_redirected(&self, request: &RedirectRequest<'_>) -> Result<RunStatus> {
        let role = self.role_of(request.program)?;
        if role == Role::Generator {
            self.record(Call::Generate);
            let case = self.generated.get();
            self.generated.set(case + 1);
            if self.generation_fails_on == Some(case) {
                return Ok(RunStatus::exited(1));
            }
            fs::write(request.stdout, format!("{case}\n"))
                .with_context(|| format!("write {}", request.stdout.display()))?;
            return Ok(RunStatus::exited(0));
        }

        self.record(Call::Run(role));
        let stdin = request.stdin.context("solution run without stdin")?;
        let case = Self::read_case(stdin)?;
        if self.crash_on == Some((role, case)) {
            return Ok(RunStatus::exited(1));
        }
        let answer = if role == Role::Candidate && self.mismatch_on == Some(case) {
            "wrong\n".to_string()
        } else {
            format!("{}\n", case * 2)
        };
        fs::write(request.stdout, answer)
            .with_context(|| format!("write {}", request.stdout.display()))?;
        Ok(RunStatus::exited(0))
    }

    fn delete_paths(&self, paths: &[PathBuf]) -> Vec<DeleteFailure> {
        self.record(Call::Delete(paths.to_vec()));
        SystemProcesses::new(&self.paths.root).delete_paths(paths)
    }

    fn binary_compare_files(&self, left: &Path, right: &Path) -> Result<bool> {
        self.record(Call::Compare);
        if self.compare_error {
            bail!("read {}: simulated I/O failure", left.display());
        }
        files_identical(left, right)
    }
}
