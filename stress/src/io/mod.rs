//! I/O helpers for harness commands.

pub mod config;
pub mod console;
pub mod diff_record;
pub mod facade;
pub mod paths;
pub mod process;
