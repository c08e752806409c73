//! Detached signatures for release files.

use super::context::ReleaseContext;
use crate::release::error::Result;
use std::path::{Path, PathBuf};

/// `<file><ext>` next to the signed file.
pub fn signature_path(file: &Path, extension: &str) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(extension);
    PathBuf::from(name)
}

/// Signs every file in `files`, returning the signatures written.
///
/// Nothing happens when signing is disabled.
pub(crate) fn sign_files(ctx: &ReleaseContext, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let signing = &ctx.model().signing;
    if !signing.is_enabled() {
        log::debug!("signing is not enabled, skipping");
        return Ok(Vec::new());
    }

    let mut signatures = Vec::with_capacity(files.len());
    for file in files {
        let signature = signature_path(file, signing.signature_extension());
        ctx.services().signer.sign(signing, file, &signature)?;
        log::info!("  ✓ signed {}", ctx.relativize(file));
        signatures.push(signature);
    }
    Ok(signatures)
}
