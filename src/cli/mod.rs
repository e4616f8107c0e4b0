//! Command-line interface
//!
//! Only available with the `cli` feature.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{exit_code, main, run, Cli, CliMethod, CliPreset, USAGE};
