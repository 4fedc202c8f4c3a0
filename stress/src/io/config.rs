//! Harness configuration stored in `stress.toml`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Harness configuration (TOML).
///
/// Constructed once at startup and passed to every step. Missing fields
/// default to the conventional `ans`/`test`/`data` layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StressConfig {
    /// Total cases per run. Case 0 is the untimed sanity case.
    pub iterations: u32,

    /// Append every failing case to the diff record file.
    pub diff_record: bool,

    /// Kill generator, candidate and reference runs exceeding this many seconds.
    /// Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub compiler: CompilerConfig,

    pub files: FileNames,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable, invoked as `<command> <options..> <source> -o <executable>`.
    pub command: String,
    pub options: Vec<String>,
}

/// File names, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileNames {
    pub reference_source: String,
    pub candidate_source: String,
    pub generator_source: String,
    pub reference_executable: String,
    pub candidate_executable: String,
    pub generator_executable: String,
    pub input: String,
    pub candidate_output: String,
    pub reference_output: String,
    pub diff_record: String,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            diff_record: false,
            timeout_secs: None,
            compiler: CompilerConfig::default(),
            files: FileNames::default(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: "g++".to_string(),
            options: vec!["-O2".to_string()],
        }
    }
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            reference_source: "ans.cpp".to_string(),
            candidate_source: "test.cpp".to_string(),
            generator_source: "data.cpp".to_string(),
            reference_executable: executable_name("ans"),
            candidate_executable: executable_name("test"),
            generator_executable: executable_name("data"),
            input: "data.txt".to_string(),
            candidate_output: "test.txt".to_string(),
            reference_output: "ans.txt".to_string(),
            diff_record: "diff.log".to_string(),
        }
    }
}

fn executable_name(stem: &str) -> String {
    format!("{stem}{}", std::env::consts::EXE_SUFFIX)
}

impl FileNames {
    fn sources(&self) -> [(&'static str, &str); 3] {
        [
            ("files.reference_source", self.reference_source.as_str()),
            ("files.candidate_source", self.candidate_source.as_str()),
            ("files.generator_source", self.generator_source.as_str()),
        ]
    }

    /// Every file the harness creates (and may delete).
    fn artifacts(&self) -> [(&'static str, &str); 7] {
        [
            ("files.reference_executable", self.reference_executable.as_str()),
            ("files.candidate_executable", self.candidate_executable.as_str()),
            ("files.generator_executable", self.generator_executable.as_str()),
            ("files.input", self.input.as_str()),
            ("files.candidate_output", self.candidate_output.as_str()),
            ("files.reference_output", self.reference_output.as_str()),
            ("files.diff_record", self.diff_record.as_str()),
        ]
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(anyhow!("iterations must be > 0"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0 when set"));
        }
        if self.compiler.command.trim().is_empty() {
            return Err(anyhow!("compiler.command must be non-empty"));
        }

        let mut seen = BTreeSet::new();
        for (field, name) in self.files.sources() {
            if name.trim().is_empty() {
                return Err(anyhow!("{field} must be non-empty"));
            }
            seen.insert(normalized(name));
        }
        // Artifacts get deleted during cleanup, so none may alias a source or each other.
        for (field, name) in self.files.artifacts() {
            if name.trim().is_empty() {
                return Err(anyhow!("{field} must be non-empty"));
            }
            if !seen.insert(normalized(name)) {
                return Err(anyhow!(
                    "{field} ({name}) collides with another configured file"
                ));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `./data.txt` and `data.txt` name the same file.
fn normalized(name: &str) -> PathBuf {
    Path::new(name.trim())
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Command-line overrides layered on top of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub iterations: Option<u32>,
    pub diff_record: bool,
    pub timeout_secs: Option<u64>,
}

/// Apply command-line overrides to a loaded configuration.
pub fn apply_overrides(
    mut base: StressConfig,
    overrides: &ConfigOverrides,
) -> Result<StressConfig> {
    if let Some(iterations) = overrides.iterations {
        base.iterations = iterations;
    }
    if overrides.diff_record {
        base.diff_record = true;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.timeout_secs = Some(timeout_secs);
    }
    base.validate()?;
    Ok(base)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StressConfig::default()`.
pub fn load_config(path: &Path) -> Result<StressConfig> {
    if !path.exists() {
        let cfg = StressConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StressConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &StressConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
