//! Release packager orchestration library
//!
//! Turns one declarative release model into package descriptors for:
//! - Homebrew formulae and casks, MacPorts Portfiles, GoFish food
//! - Snapcraft snaps, RPM spec files, Docker images
//! - Scoop manifests, Chocolatey packages
//! - SDKMAN! releases and JBang catalogs
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod metadata;
pub mod release;

// Re-export commonly used types
pub use error::{CliError, PublishError, Result};
