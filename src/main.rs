//! Kodegen Bundler Publish - release packager orchestrator.
//!
//! This binary reads a declarative `release.toml` and packages and publishes
//! every distribution through its enabled packagers.

use kodegen_bundler_publish::cli;
use std::process;

fn main() {
    // Initialize logging, `info` unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
