//! Release packaging core.
//!
//! Turns a declarative release model into packager descriptors and pushes
//! them to their channels.
//!
//! # Overview
//!
//! A run:
//! 1. Loads the [`settings::Model`] and completes it from the environment
//! 2. Validates it once, merging global packager defaults into every
//!    distribution and resolving `enabled` flags ([`validation`])
//! 3. Selects (distribution, packager) pairs honouring include/exclude filters
//! 4. Builds a [`props::PropertyContext`] per pair and materializes templates
//! 5. Packages and publishes through the collaborators in [`services`]
//!
//! # Module Organization
//!
//! - [`builder`] - Run context, selection, fill pipeline and workflow steps
//! - [`error`] - Error taxonomy and the validation error collector
//! - [`platform`] - One processor per packager kind
//! - [`props`] - Property context and well-known keys
//! - [`services`] - Collaborator traits and their default implementations
//! - [`settings`] - Declarative release model
//! - [`templates`] - Template engine and materialization
//! - [`validation`] - Merge engine and per-packager validators

pub mod builder;
pub mod error;
pub mod platform;
pub mod props;
pub mod services;
pub mod settings;
pub mod templates;
mod utils;
pub mod validation;

pub use builder::{
    ContextBuilder, Filters, ReleaseContext, ReleaseSummary, WorkflowStep, run_workflow,
};
pub use error::{Error, ErrorKind, Result, ValidationErrors};
pub use props::{MergeMode, PropertyContext};
pub use settings::{Distribution, Model, Packager, PackagerType};
