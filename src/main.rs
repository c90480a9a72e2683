//! mddoc - Main Entry Point
//!
//! Generates PDF and HTML documents from markdown, either as a project build
//! or as an interactive export of a single document.

mod build;
mod cli;
mod config;
mod error;
mod export;
mod files;
mod generator;
mod markdown;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use log::debug;

/// Application name constant.
const APP_NAME: &str = "mddoc";

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    debug!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e.chain());
            ExitCode::FAILURE
        }
    }
}
