//! Resolved filesystem layout for a run.

use std::path::{Path, PathBuf};

use crate::core::types::Role;
use crate::io::config::FileNames;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "stress.toml";

/// Absolute paths for every file a run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessPaths {
    pub root: PathBuf,
    pub reference_source: PathBuf,
    pub candidate_source: PathBuf,
    pub generator_source: PathBuf,
    pub reference_executable: PathBuf,
    pub candidate_executable: PathBuf,
    pub generator_executable: PathBuf,
    pub input: PathBuf,
    pub candidate_output: PathBuf,
    pub reference_output: PathBuf,
    pub diff_record: PathBuf,
}

impl HarnessPaths {
    pub fn new(root: &Path, files: &FileNames) -> Self {
        Self {
            root: root.to_path_buf(),
            reference_source: root.join(&files.reference_source),
            candidate_source: root.join(&files.candidate_source),
            generator_source: root.join(&files.generator_source),
            reference_executable: root.join(&files.reference_executable),
            candidate_executable: root.join(&files.candidate_executable),
            generator_executable: root.join(&files.generator_executable),
            input: root.join(&files.input),
            candidate_output: root.join(&files.candidate_output),
            reference_output: root.join(&files.reference_output),
            diff_record: root.join(&files.diff_record),
        }
    }

    /// `(role, source, executable)` in build order.
    pub fn build_targets(&self) -> [(Role, &Path, &Path); 3] {
        [
            (
                Role::Reference,
                self.reference_source.as_path(),
                self.reference_executable.as_path(),
            ),
            (
                Role::Candidate,
                self.candidate_source.as_path(),
                self.candidate_executable.as_path(),
            ),
            (
                Role::Generator,
                self.generator_source.as_path(),
                self.generator_executable.as_path(),
            ),
        ]
    }

    pub fn executable(&self, role: Role) -> &Path {
        match role {
            Role::Reference => &self.reference_executable,
            Role::Candidate => &self.candidate_executable,
            Role::Generator => &self.generator_executable,
        }
    }

    /// Where a program's captured stdout goes.
    pub fn output(&self, role: Role) -> &Path {
        match role {
            Role::Reference => &self.reference_output,
            Role::Candidate => &self.candidate_output,
            Role::Generator => &self.input,
        }
    }

    pub fn executables(&self) -> Vec<PathBuf> {
        vec![
            self.reference_executable.clone(),
            self.candidate_executable.clone(),
            self.generator_executable.clone(),
        ]
    }

    /// Input and output files of the current case.
    pub fn data_files(&self) -> Vec<PathBuf> {
        vec![
            self.input.clone(),
            self.candidate_output.clone(),
            self.reference_output.clone(),
        ]
    }

    /// Path as shown to the user: relative to the root when possible.
    pub fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_resolved_against_root() {
        let root = Path::new("/work");
        let paths = HarnessPaths::new(root, &FileNames::default());

        assert_eq!(paths.input, root.join("data.txt"));
        assert_eq!(paths.candidate_output, root.join("test.txt"));
        assert_eq!(paths.reference_output, root.join("ans.txt"));
        assert_eq!(paths.diff_record, root.join("diff.log"));
        assert_eq!(paths.output(Role::Generator), paths.input.as_path());
    }

    #[test]
    fn build_order_is_reference_candidate_generator() {
        let paths = HarnessPaths::new(Path::new("/work"), &FileNames::default());
        let roles: Vec<Role> = paths
            .build_targets()
            .iter()
            .map(|(role, _, _)| *role)
            .collect();
        assert_eq!(roles, vec![Role::Reference, Role::Candidate, Role::Generator]);
    }

    #[test]
    fn display_name_strips_root() {
        let paths = HarnessPaths::new(Path::new("/work"), &FileNames::default());
        assert_eq!(paths.display_name(&paths.input), "data.txt");
        assert_eq!(paths.display_name(Path::new("/elsewhere/x")), "/elsewhere/x");
    }
}
