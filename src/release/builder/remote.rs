//! Steps talking to remote services: upload, release and announce.
//!
//! Each step goes through the matching collaborator in
//! [`Services`](crate::release::services::Services). A dry run logs what
//! would be sent instead.

use super::{context::ReleaseContext, workflow::ReleaseArtifact};
use crate::release::{
    error::Result,
    props::{PropertyContext, keys},
    services::Announcement,
};
use std::path::PathBuf;

/// Release properties extended with the keys describing `artifact`.
fn artifact_props(props: &PropertyContext, artifact: &ReleaseArtifact) -> PropertyContext {
    let mut props = props.clone();
    props.put(keys::ARTIFACT_FILE, artifact.file_name());
    props.put(keys::ARTIFACT_PLATFORM, artifact.platform.as_str());
    props
}

/// Hands every artifact to every enabled uploader.
pub(crate) fn upload(ctx: &ReleaseContext, artifacts: &[ReleaseArtifact]) -> Result<Vec<String>> {
    let props = ctx.props()?;
    let mut uploaded = Vec::new();
    for config in ctx.model().upload.iter().filter(|u| u.is_enabled()) {
        log::info!("  uploading to {} ({})", config.name, config.kind);
        for artifact in artifacts {
            if ctx.is_dry_run() {
                log::info!("    dry-run: would upload {}", artifact.file_name());
                continue;
            }
            let props = artifact_props(&props, artifact);
            ctx.services()
                .uploader
                .upload(config, &artifact.path, &props)?;
            log::info!("    ✓ {}", artifact.file_name());
            uploaded.push(format!("{}:{}", config.name, artifact.file_name()));
        }
    }
    Ok(uploaded)
}

/// Creates the release on the hosting service and attaches `assets` when
/// the service is configured to upload them.
pub(crate) fn release(ctx: &ReleaseContext, assets: &[PathBuf]) -> Result<bool> {
    let service = &ctx.model().release;
    if !service.is_release_supported() {
        log::info!("  {} has no releases, skipping", service.service);
        return Ok(false);
    }

    let props = ctx.props()?;
    let tag = props.tag_name();
    if ctx.is_dry_run() {
        log::info!("  dry-run: would create release {}", tag);
        return Ok(false);
    }

    let repository = &ctx.services().repository;
    let token = repository.resolve_token();
    repository.create_or_find_repository(
        service.owner(),
        service.name(&ctx.model().project),
        token.as_deref(),
    )?;
    repository.create_release(&props)?;
    log::info!("  ✓ created release {}", tag);

    if service.upload_assets() {
        for asset in assets {
            repository.upload_asset(&tag, asset)?;
            log::info!("    ✓ attached {}", ctx.relativize(asset));
        }
    }
    Ok(true)
}

/// Sends the release message through every enabled announcer.
pub(crate) fn announce(ctx: &ReleaseContext) -> Result<Vec<String>> {
    let props = ctx.props()?;
    let mut announced = Vec::new();
    for config in ctx.model().announce.iter().filter(|a| a.is_enabled()) {
        let message = config.resolve_message(&props)?;
        if ctx.is_dry_run() {
            log::info!("  dry-run: would announce on {}: {}", config.name(), message);
            continue;
        }
        ctx.services()
            .announcer
            .announce(&Announcement::from_config(config, message))?;
        log::info!("  ✓ announced on {}", config.name());
        announced.push(config.name().to_string());
    }
    Ok(announced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{builder::context::tests::context, services::recording::RecordingServices};

    const MODEL: &str = r#"
        [project]
        name = "app"
        version = "1.2.0"

        [release]
        owner = "acme"
        upload_assets = true

        [[upload]]
        kind = "http"
        name = "mirror"
        upload_url = "https://dl.acme.io/{{artifactFile}}"
        download_url = "https://dl.acme.io/{{artifactFile}}"

        [[announce]]
        kind = "log"
        message = "{{projectName}} {{projectVersion}} is out"
    "#;

    fn artifacts(dir: &std::path::Path) -> Vec<ReleaseArtifact> {
        vec![ReleaseArtifact {
            path: dir.join("app-1.2.0.zip"),
            platform: String::new(),
        }]
    }

    #[test]
    fn uploads_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = context(MODEL, dir.path(), &recording);
        let uploaded = upload(&ctx, &artifacts(dir.path())).unwrap();
        assert_eq!(uploaded, vec!["mirror:app-1.2.0.zip"]);
        assert_eq!(recording.journal(), vec!["upload mirror app-1.2.0.zip"]);
    }

    #[test]
    fn release_attaches_assets() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = context(MODEL, dir.path(), &recording);
        let created = release(&ctx, &[dir.path().join("app-1.2.0.zip")]).unwrap();
        assert!(created);
        assert_eq!(
            recording.journal(),
            vec!["repository acme/app", "release v1.2.0", "asset v1.2.0 app-1.2.0.zip"]
        );
    }

    #[test]
    fn announce_renders_the_message() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = context(MODEL, dir.path(), &recording);
        assert_eq!(announce(&ctx).unwrap(), vec!["log"]);
        assert_eq!(recording.journal(), vec!["announce log app 1.2.0 is out"]);
    }
}
