//! Stress-test a candidate solution against a reference solution.
//!
//! Reads `stress.toml` from the working directory (all fields optional),
//! compiles the three sources, and compares candidate and reference output
//! on freshly generated input until a case fails or every case passes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stress::cli::{cmd_clean, cmd_init, cmd_run};
use stress::exit_codes;
use stress::io::config::ConfigOverrides;
use stress::io::paths::CONFIG_FILE;
use stress::logging;

#[derive(Parser)]
#[command(
    name = "stress",
    version,
    about = "Stress-test a candidate solution against a reference solution"
)]
struct Cli {
    /// Configuration file, relative to the working directory.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile all sources and compare outputs on generated input (default).
    Run(RunArgs),
    /// Write a default `stress.toml`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Remove executables, data and output files left by earlier runs.
    Clean,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Total number of cases (case 0 is an untimed sanity check).
    #[arg(short = 'n', long)]
    iterations: Option<u32>,
    /// Append failing cases to the diff record file.
    #[arg(long)]
    diff_record: bool,
    /// Kill generator and solution runs exceeding this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl From<RunArgs> for ConfigOverrides {
    fn from(args: RunArgs) -> Self {
        Self {
            iterations: args.iterations,
            diff_record: args.diff_record,
            timeout_secs: args.timeout_secs,
        }
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;
    let config_path = root.join(&cli.config);
    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => cmd_run(&root, &config_path, &args.into()),
        Command::Init { force } => cmd_init(&config_path, force),
        Command::Clean => cmd_clean(&root, &config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_means_run() {
        let cli = Cli::parse_from(["stress"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn parse_run_overrides() {
        let cli = Cli::parse_from([
            "stress",
            "run",
            "-n",
            "25",
            "--diff-record",
            "--timeout-secs",
            "3",
        ]);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let overrides = ConfigOverrides::from(args);
        assert_eq!(
            overrides,
            ConfigOverrides {
                iterations: Some(25),
                diff_record: true,
                timeout_secs: Some(3),
            }
        );
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["stress", "init", "--force"]);
        assert!(matches!(cli.command, Some(Command::Init { force: true })));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["stress", "clean", "--config", "other.toml"]);
        assert!(matches!(cli.command, Some(Command::Clean)));
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
