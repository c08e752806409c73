//! Utility functions for release packaging.

pub mod fs;
