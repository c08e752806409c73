//! External tool detection and availability checking.
//!
//! Packagers that build locally shell out to their native tooling. Availability
//! is checked once per process; a missing tool downgrades the package step to
//! a warning instead of failing the release.

use std::sync::LazyLock;

/// Runs `program <version_arg>` and reports whether it answered.
fn detect(program: &str, version_arg: &str, purpose: &str) -> bool {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());

            match std::process::Command::new(&path).arg(version_arg).output() {
                Ok(output) if output.status.success() => {
                    let version = String::from_utf8_lossy(&output.stdout);
                    let first_line = version.lines().next().unwrap_or_default();
                    log::info!("✓ {} available: {}", program, first_line.trim());
                    true
                }
                Ok(output) => {
                    log::warn!(
                        "{} found at {} but {} check failed (exit code: {:?}). \
                             {} will be skipped. \
                             Stderr: {}",
                        program,
                        path.display(),
                        version_arg,
                        output.status.code(),
                        purpose,
                        String::from_utf8_lossy(&output.stderr)
                    );
                    false
                }
                Err(e) => {
                    log::warn!(
                        "{} found at {} but failed to execute: {}. \
                             {} will be skipped. \
                             Check file permissions.",
                        program,
                        path.display(),
                        e,
                        purpose
                    );
                    false
                }
            }
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}. {} will be skipped.", program, e, purpose);
            false
        }
    }
}

/// Check if snapcraft is available for building snaps locally.
pub static HAS_SNAPCRAFT: LazyLock<bool> =
    LazyLock::new(|| detect("snapcraft", "--version", "Local snap builds"));

/// Check if choco is available for packing nupkg archives.
pub static HAS_CHOCO: LazyLock<bool> =
    LazyLock::new(|| detect("choco", "--version", "Chocolatey packing"));

/// Check if docker is available for building images.
pub static HAS_DOCKER: LazyLock<bool> =
    LazyLock::new(|| detect("docker", "--version", "Docker image builds"));
