//! User-facing progress output.
//!
//! Everything a person watching a run reads goes through [`Console`]: compile
//! status, per-case results, summaries and mismatch dumps. Tests capture it in
//! memory with [`Console::buffered`].

use std::fs;
use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;

use anyhow::{Context, Result};

pub struct Console<O: Write, E: Write> {
    pub out: O,
    pub err: E,
}

impl Console<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl Console<Vec<u8>, Vec<u8>> {
    pub fn buffered() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.err).into_owned()
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Write `text` without a newline and flush, so it shows before a slow step.
    pub fn progress(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{text}").context("write stdout")?;
        self.out.flush().context("flush stdout")
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").context("write stdout")?;
        self.out.flush().context("flush stdout")
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        writeln!(self.err, "{text}").context("write stderr")?;
        self.err.flush().context("flush stderr")
    }

    /// Print a file's content under a `[<name> content:]:` header.
    pub fn dump_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => return self.line(&format!("Cannot open file: {name}")),
        };
        writeln!(self.out, "[{name} content:]:").context("write stdout")?;
        for line in String::from_utf8_lossy(&bytes).lines() {
            writeln!(self.out, "{line}").context("write stdout")?;
        }
        self.out.flush().context("flush stdout")
    }
}
