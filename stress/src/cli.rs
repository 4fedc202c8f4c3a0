//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cleanup::cleanup;
use crate::core::types::CleanupPolicy;
use crate::exit_codes;
use crate::harness::run_harness;
use crate::io::config::{ConfigOverrides, StressConfig, apply_overrides, load_config, write_config};
use crate::io::console::Console;
use crate::io::facade::SystemProcesses;
use crate::io::paths::HarnessPaths;

/// Build, stress-test and clean up. Returns the process exit code.
pub fn cmd_run(root: &Path, config_path: &Path, overrides: &ConfigOverrides) -> Result<i32> {
    let cfg = load_config(config_path).context("load config")?;
    let cfg = apply_overrides(cfg, overrides).context("apply command-line overrides")?;
    debug!(config = ?cfg, "config loaded");

    let paths = HarnessPaths::new(root, &cfg.files);
    let facade = SystemProcesses::new(root);
    let mut console = Console::stdio();
    let verdict = run_harness(&paths, &cfg, &facade, &mut console);
    info!(
        verdict = %verdict,
        failed_case = ?verdict.failed_case(),
        "stress run complete"
    );
    Ok(verdict.exit_code())
}

/// Write a default configuration file unless one exists (or `force`).
pub fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        println!(
            "init: {} already exists (use --force to overwrite)",
            config_path.display()
        );
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &StressConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    println!("init: wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

/// Remove every artifact the configuration names. Sources are never touched.
pub fn cmd_clean(root: &Path, config_path: &Path) -> Result<i32> {
    let cfg = load_config(config_path).context("load config")?;
    let paths = HarnessPaths::new(root, &cfg.files);
    let mut console = Console::stdio();
    let failures = cleanup(
        CleanupPolicy::Full,
        &paths,
        &SystemProcesses::new(root),
        &mut console,
    );
    if failures.is_empty() {
        return Ok(exit_codes::OK);
    }
    for failure in &failures {
        console.error(&format!(
            "clean: could not remove {}: {}",
            paths.display_name(&failure.path),
            failure.error
        ))?;
    }
    Ok(exit_codes::FAILED)
}
