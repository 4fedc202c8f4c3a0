//! Orchestration for a full stress run.
//!
//! Sequence: build reference, candidate and generator; generate the first
//! input; then for every case run both solutions, compare their output and
//! generate the next input. The first failure of any kind stops the run.
//! Cleanup always runs afterwards, with the policy chosen by the verdict.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, instrument, warn};

use crate::cleanup::cleanup;
use crate::core::schedule::{CaseKind, case_kind, case_label, regenerate_after};
use crate::core::types::{CaseOutcome, Role};
use crate::core::verdict::RunVerdict;
use crate::io::config::StressConfig;
use crate::io::console::Console;
use crate::io::diff_record::{DiffRecord, RecordedFile};
use crate::io::facade::{ProcessFacade, RedirectRequest};
use crate::io::paths::HarnessPaths;

/// Everything a single run needs, passed explicitly to every step.
pub struct StressRun<'a, P: ProcessFacade, O: Write, E: Write> {
    paths: &'a HarnessPaths,
    config: &'a StressConfig,
    facade: &'a P,
    console: &'a mut Console<O, E>,
    diff_record: Option<DiffRecord>,
}

/// Run the whole pipeline and clean up.
///
/// Unexpected errors are folded into [`RunVerdict::Internal`] so the caller
/// always gets a verdict and the partial cleanup still happens.
#[instrument(skip_all, fields(iterations = config.iterations, diff_record = config.diff_record))]
pub fn run_harness<P: ProcessFacade, O: Write, E: Write>(
    paths: &HarnessPaths,
    config: &StressConfig,
    facade: &P,
    console: &mut Console<O, E>,
) -> RunVerdict {
    let result = StressRun::new(paths, config, facade, console).execute();
    let verdict = result.unwrap_or_else(|err| {
        let message = format!("{err:#}");
        error!(err = %message, "unexpected failure");
        if let Err(write_err) = console.error(&format!("Unknown error occurred: {message}")) {
            warn!(err = %write_err, "failed to report error");
        }
        RunVerdict::Internal(message)
    });

    info!(verdict = %verdict, "run finished");
    cleanup(verdict.cleanup_policy(), paths, facade, console);
    verdict
}

impl<'a, P: ProcessFacade, O: Write, E: Write> StressRun<'a, P, O, E> {
    pub fn new(
        paths: &'a HarnessPaths,
        config: &'a StressConfig,
        facade: &'a P,
        console: &'a mut Console<O, E>,
    ) -> Self {
        let diff_record = config
            .diff_record
            .then(|| DiffRecord::new(&paths.diff_record));
        Self {
            paths,
            config,
            facade,
            console,
            diff_record,
        }
    }

    /// Build, seed and loop. Does not clean up.
    pub fn execute(&mut self) -> Result<RunVerdict> {
        if let Some(record) = &self.diff_record {
            record.reset()?;
        }

        for (_, source, executable) in self.paths.build_targets() {
            if !self.compile(source, executable)? {
                return Ok(RunVerdict::BuildFailed {
                    source: self.paths.display_name(source),
                });
            }
        }

        let total = self.config.iterations;
        if !self.generate(0)? {
            return Ok(RunVerdict::GenerationFailed { case: 0 });
        }

        for case in 0..total {
            self.console.progress(&format!("{}: ", case_label(case)))?;
            let started = Instant::now();
            let outcome = self.run_single_test(case)?;
            let elapsed = started.elapsed();

            match outcome {
                CaseOutcome::Pass => {}
                CaseOutcome::ExecutionFailed { role } => {
                    return Ok(RunVerdict::ExecutionFailed { role, case });
                }
                CaseOutcome::Mismatch => return Ok(RunVerdict::Mismatch { case }),
            }

            match case_kind(case) {
                CaseKind::Sanity => self.console.line("Passed")?,
                CaseKind::Timed => self.console.line(&format!(
                    "Passed, time taken {}ms",
                    elapsed.as_millis()
                ))?,
            }
            info!(case, elapsed_ms = elapsed.as_millis() as u64, "case passed");

            if regenerate_after(case, total) && !self.generate(case + 1)? {
                return Ok(RunVerdict::GenerationFailed { case: case + 1 });
            }
        }

        self.console.line(&format!("All {total} tests passed!"))?;
        Ok(RunVerdict::Passed { cases: total })
    }

    /// Compile one source. A compiler that cannot be launched counts as a failed build.
    #[instrument(skip_all, fields(source = %source.display()))]
    fn compile(&mut self, source: &Path, executable: &Path) -> Result<bool> {
        let name = self.paths.display_name(source);
        self.console.progress(&format!("Compiling {name}..."))?;

        let succeeded = match self
            .facade
            .compile_file(&self.config.compiler, source, executable)
        {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!(%status, "compiler failed");
                false
            }
            Err(err) => {
                warn!(err = %format!("{err:#}"), "compiler could not be launched");
                false
            }
        };

        self.console
            .line(if succeeded { "success" } else { "failed" })?;
        Ok(succeeded)
    }

    /// Produce the input for `case`, overwriting the previous one.
    #[instrument(skip_all, fields(case = case))]
    fn generate(&mut self, case: u32) -> Result<bool> {
        let request = RedirectRequest {
            program: &self.paths.generator_executable,
            stdin: None,
            stdout: &self.paths.input,
            timeout: self.config.timeout(),
        };
        let succeeded = match self.facade.run_redirected(&request) {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!(%status, "generator failed");
                false
            }
            Err(err) => {
                warn!(err = %format!("{err:#}"), "generator could not be run");
                false
            }
        };
        if !succeeded {
            self.console.error("Test data generation failed")?;
        }
        Ok(succeeded)
    }

    /// Run candidate then reference on the current input and compare their output.
    #[instrument(skip_all, fields(case = case))]
    pub fn run_single_test(&mut self, case: u32) -> Result<CaseOutcome> {
        for role in [Role::Candidate, Role::Reference] {
            if !self.execute_solution(role)? {
                return Ok(CaseOutcome::ExecutionFailed { role });
            }
        }

        let identical = self
            .facade
            .binary_compare_files(&self.paths.candidate_output, &self.paths.reference_output)?;
        if identical {
            return Ok(CaseOutcome::Pass);
        }

        info!(case, "outputs differ");
        self.report_mismatch(case)?;
        Ok(CaseOutcome::Mismatch)
    }

    fn execute_solution(&mut self, role: Role) -> Result<bool> {
        let request = RedirectRequest {
            program: self.paths.executable(role),
            stdin: Some(self.paths.input.as_path()),
            stdout: self.paths.output(role),
            timeout: self.config.timeout(),
        };
        let failure = match self.facade.run_redirected(&request) {
            Ok(status) if status.success() => return Ok(true),
            Ok(status) => status.to_string(),
            Err(err) => format!("{err:#}"),
        };

        warn!(%role, reason = %failure, "solution failed to run");
        self.console.line("Failed")?;
        let program = match role {
            Role::Candidate => "Candidate",
            Role::Reference => "Reference",
            Role::Generator => "Generator",
        };
        self.console
            .error(&format!("{program} program execution failed ({failure})"))?;
        Ok(false)
    }

    fn report_mismatch(&mut self, case: u32) -> Result<()> {
        let input = self.paths.display_name(&self.paths.input);
        let candidate = self.paths.display_name(&self.paths.candidate_output);
        let reference = self.paths.display_name(&self.paths.reference_output);

        self.console.line("Error!")?;
        self.console
            .line("The following files are preserved for debugging:")?;
        self.console.line(&format!("- Test data: {input}"))?;
        self.console
            .line(&format!("- Candidate output: {candidate}"))?;
        self.console
            .line(&format!("- Reference output: {reference}"))?;
        if let Some(record) = &self.diff_record {
            let name = self.paths.display_name(record.path());
            self.console.line(&format!("- Diff record: {name}"))?;
        }

        self.console
            .dump_file(&candidate, &self.paths.candidate_output)?;
        self.console
            .dump_file(&reference, &self.paths.reference_output)?;
        // Dumps go line by line, so trailing newlines and `\r` are not shown.
        let exact = if self.diff_record.is_some() {
            "the preserved files or the diff record"
        } else {
            "the preserved files"
        };
        self.console.line(&format!(
            "Line endings are not shown above; see {exact} for exact bytes"
        ))?;

        if let Some(record) = &self.diff_record {
            record.append_case(
                case,
                &[
                    RecordedFile {
                        label: "input",
                        name: &input,
                        path: &self.paths.input,
                    },
                    RecordedFile {
                        label: "candidate output",
                        name: &candidate,
                        path: &self.paths.candidate_output,
                    },
                    RecordedFile {
                        label: "reference output",
                        name: &reference,
                        path: &self.paths.reference_output,
                    },
                ],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, ScriptedProcesses, TestWorkspace};

    #[test]
    fn single_test_passes_on_identical_output() {
        let workspace = TestWorkspace::new().expect("workspace");
        let facade = ScriptedProcesses::new(&workspace.paths);
        std::fs::write(&workspace.paths.input, "4\n").expect("write input");
        let mut console = Console::buffered();

        let outcome = StressRun::new(&workspace.paths, &workspace.config, &facade, &mut console)
            .run_single_test(4)
            .expect("run");

        assert_eq!(outcome, CaseOutcome::Pass);
        assert_eq!(
            facade.calls(),
            vec![
                Call::Run(Role::Candidate),
                Call::Run(Role::Reference),
                Call::Compare
            ]
        );
    }

    #[test]
    fn candidate_crash_skips_reference_and_compare() {
        let workspace = TestWorkspace::new().expect("workspace");
        let facade = ScriptedProcesses::new(&workspace.paths).crash_on(Role::Candidate, 2);
        std::fs::write(&workspace.paths.input, "2\n").expect("write input");
        let mut console = Console::buffered();

        let outcome = StressRun::new(&workspace.paths, &workspace.config, &facade, &mut console)
            .run_single_test(2)
            .expect("run");

        assert_eq!(
            outcome,
            CaseOutcome::ExecutionFailed {
                role: Role::Candidate
            }
        );
        assert_eq!(facade.calls(), vec![Call::Run(Role::Candidate)]);
        assert!(
            console
                .stderr_text()
                .contains("Candidate program execution failed (exit code 1)")
        );
    }

    #[test]
    fn mismatch_dumps_both_outputs() {
        let workspace = TestWorkspace::new().expect("workspace");
        let facade = ScriptedProcesses::new(&workspace.paths).mismatch_on(5);
        std::fs::write(&workspace.paths.input, "5\n").expect("write input");
        let mut console = Console::buffered();

        let outcome = StressRun::new(&workspace.paths, &workspace.config, &facade, &mut console)
            .run_single_test(5)
            .expect("run");

        assert_eq!(outcome, CaseOutcome::Mismatch);
        let out = console.stdout_text();
        assert!(out.starts_with("Error!\n"));
        assert!(out.contains("- Test data: data.txt"));
        assert!(out.contains("[test.txt content:]:\nwrong\n"));
        assert!(out.contains("[ans.txt content:]:\n10\n"));
        assert!(out.ends_with("see the preserved files for exact bytes\n"));
        assert!(!out.contains("Diff record"));
    }

    #[test]
    fn compiler_launch_failure_is_a_build_failure() {
        let workspace = TestWorkspace::new().expect("workspace");
        let facade = ScriptedProcesses::new(&workspace.paths)
            .unlaunchable_compiler_for(&workspace.paths.reference_source);
        let mut console = Console::buffered();

        let verdict = StressRun::new(&workspace.paths, &workspace.config, &facade, &mut console)
            .execute()
            .expect("execute");

        assert_eq!(
            verdict,
            RunVerdict::BuildFailed {
                source: "ans.cpp".to_string()
            }
        );
        assert_eq!(console.stdout_text(), "Compiling ans.cpp...failed\n");
    }
}
