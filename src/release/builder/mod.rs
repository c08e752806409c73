//! Release orchestration.
//!
//! This module provides the [`ReleaseContext`] every step runs against and
//! [`run_workflow`], which drives the steps of a release.
//!
//! # Overview
//!
//! A release run:
//! 1. Builds a [`ReleaseContext`] from a model through [`ContextBuilder`],
//!    validating it once
//! 2. Writes checksum files and signs the artifacts
//! 3. Uploads artifacts and creates the release on the hosting service
//! 4. Selects (distribution, packager) pairs and fills their properties
//! 5. Prepares, packages and publishes each pair
//! 6. Announces the release
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_publish::release::{ContextBuilder, Model, WorkflowStep, run_workflow};
//!
//! # fn example(model: Model) -> kodegen_bundler_publish::release::Result<()> {
//! let ctx = ContextBuilder::new()
//!     .model(model)
//!     .basedir(".")
//!     .build()?;
//!
//! let summary = run_workflow(&ctx, &WorkflowStep::FULL_RELEASE)?;
//! for (distribution, packager) in &summary.processed {
//!     println!("{} published with {}", distribution, packager);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`archive`] - Listing of archive contents for package descriptors
//! - [`candidates`] - Artifact candidates of a packager
//! - [`checksum`] - Digest calculation and checksum files
//! - [`fill`] - Property-fill pipeline
//! - [`selection`] - Distribution and packager selection
//! - [`tool_detection`] - External tool availability checking
//! - `workflow` - [`WorkflowStep`]s and [`run_workflow`]

pub mod archive;
pub mod candidates;
pub mod checksum;
pub(crate) mod context;
pub mod fill;
mod remote;
pub mod selection;
mod signing;
pub mod tool_detection;
mod workflow;

pub use context::{ContextBuilder, Filters, ReleaseContext};
pub use signing::signature_path;
pub use workflow::{
    PackagerFailure, ReleaseArtifact, ReleaseSummary, WorkflowStep, release_artifacts, run_workflow,
};
