//! Validation pass over the release model.
//!
//! Runs once per release, before anything is written:
//! - checks project, release service, signing, uploaders and announcers
//! - layers global platform replacements and packager defaults into every
//!   distribution
//! - resolves every `enabled` flag exactly once
//! - applies the per-packager rules in [`packagers`]
//!
//! Problems are collected into one [`ValidationErrors`] so the user sees all
//! of them at once. The model is read-only after this pass.

mod packagers;

use crate::release::{
    error::{Result, ValidationErrors},
    props::PropertyContext,
    settings::{
        Artifact, Distribution, DistributionType, Java, Model, PackagerType, Packagers, Platform,
        Project, ReleaseService,
    },
};
use std::{collections::HashSet, path::Path};

/// Model wide inputs every distribution check reads.
pub(crate) struct Scope<'a> {
    pub project: &'a Project,
    pub release: &'a ReleaseService,
    pub basedir: &'a Path,
}

/// Read-only view of the distribution whose packagers are being validated.
pub(crate) struct Target<'a> {
    pub name: &'a str,
    pub distribution_type: DistributionType,
    pub artifacts: &'a [Artifact],
    pub java: &'a Java,
    /// Model and distribution properties, for templated names.
    pub props: &'a PropertyContext,
}

impl Target<'_> {
    pub fn prefix(&self, packager_type: PackagerType) -> String {
        format!("distribution.{}.{}", self.name, packager_type)
    }
}

/// Validates `model` in place. Fails with every configuration error found.
pub fn validate_model(model: &mut Model, basedir: &Path) -> Result<()> {
    let mut errors = ValidationErrors::new();
    validate_into(model, basedir, &mut errors);
    errors.into_result()
}

pub(crate) fn validate_into(model: &mut Model, basedir: &Path, errors: &mut ValidationErrors) {
    log::debug!("validating release model");
    model.project.validate(errors);
    model.release.validate(&model.project, errors);
    model.signing.validate(&model.project, errors);
    for (index, uploader) in model.upload.iter_mut().enumerate() {
        uploader.validate(index, &model.project, errors);
    }
    for (index, announcer) in model.announce.iter_mut().enumerate() {
        announcer.validate(index, &model.project, errors);
    }

    if model.distributions.is_empty() {
        errors.warning("no distributions configured, nothing to release");
    }

    let base_props = match model.props() {
        Ok(props) => props,
        Err(e) => {
            errors.configuration(format!("project properties could not be resolved: {}", e));
            PropertyContext::new()
        }
    };

    let Model {
        project,
        release,
        platform,
        packagers,
        distributions,
        ..
    } = model;
    let scope = Scope {
        project,
        release,
        basedir,
    };

    let mut seen = HashSet::new();
    for distribution in distributions.iter_mut() {
        if !seen.insert(distribution.name.clone()) {
            errors.configuration(format!(
                "distribution.{} is defined more than once",
                distribution.name
            ));
            continue;
        }
        validate_distribution(&scope, packagers, platform, &base_props, distribution, errors);
    }

    packagers::post_validate_brew(distributions, &base_props, errors);
}

fn validate_distribution(
    scope: &Scope<'_>,
    globals: &Packagers,
    global_platform: &Platform,
    base_props: &PropertyContext,
    distribution: &mut Distribution,
    errors: &mut ValidationErrors,
) {
    if distribution.name.trim().is_empty() {
        errors.configuration("distribution.name must not be blank");
        return;
    }
    let prefix = format!("distribution.{}", distribution.name);
    if !distribution.resolve_enabled(scope.project) {
        log::debug!("{} is disabled", prefix);
        return;
    }
    log::debug!("validating {}", prefix);

    distribution.java.inherit(&scope.project.java);
    distribution.platform.merge_from(global_platform);

    if distribution.artifacts.is_empty() {
        errors.configuration(format!("{}.artifacts must not be empty", prefix));
    }
    for (index, artifact) in distribution.artifacts.iter().enumerate() {
        if artifact.path.trim().is_empty() {
            errors.configuration(format!("{}.artifacts[{}].path must not be blank", prefix, index));
        }
    }

    let mut props = base_props.clone();
    props.put_all(&distribution.props());

    let Distribution {
        name,
        distribution_type,
        artifacts,
        java,
        packagers,
        ..
    } = distribution;
    let target = Target {
        name,
        distribution_type: *distribution_type,
        artifacts,
        java,
        props: &props,
    };

    for packager_type in PackagerType::ALL {
        let packager = packagers.get_or_insert(packager_type);
        if let Some(global) = globals.get(packager_type) {
            packager.merge_from(global);
        }
        packagers::validate_packager(scope, &target, packager, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{
        error::Error,
        settings::{Active, PackagerKind},
    };

    fn model(toml_text: &str) -> Model {
        toml::from_str(toml_text).unwrap()
    }

    const BASE: &str = r#"
        [project]
        name = "app"
        version = "1.2.3"

        [release]
        owner = "acme"
    "#;

    #[test]
    fn globals_flow_into_every_distribution() {
        let mut model = model(&format!(
            "{}{}",
            BASE,
            r#"
            [packagers.scoop]
            active = "ALWAYS"
            checkver_url = "https://global"

            [[distributions]]
            name = "cli"
            [[distributions.artifacts]]
            path = "cli.zip"

            [[distributions]]
            name = "daemon"
            [[distributions.artifacts]]
            path = "daemon.zip"
            [distributions.packagers.scoop]
            checkver_url = "https://own"
            "#
        ));
        let dir = tempfile::tempdir().unwrap();
        validate_model(&mut model, dir.path()).unwrap();

        let checkver = |dist: &str| {
            let packager = model
                .distribution(dist)
                .and_then(|d| d.packagers.get(PackagerType::Scoop))
                .unwrap();
            assert!(packager.is_enabled());
            match &packager.kind {
                PackagerKind::Scoop(s) => s.checkver_url.clone().unwrap(),
                other => panic!("unexpected {:?}", other),
            }
        };
        assert_eq!(checkver("cli"), "https://global");
        assert_eq!(checkver("daemon"), "https://own");

        let tap = model.distributions[0]
            .packagers
            .get(PackagerType::Scoop)
            .and_then(|p| p.tap())
            .unwrap();
        assert_eq!(tap.canonical_repo_name(), "acme/scoop-bucket");
        assert!(tap.is_enabled());
    }

    #[test]
    fn errors_are_collected_not_short_circuited() {
        let mut model = model(
            r#"
            [project]
            version = "not-semver"

            [[distributions]]
            name = "cli"

            [[distributions]]
            name = "cli"
            "#,
        );
        let dir = tempfile::tempdir().unwrap();
        let err = validate_model(&mut model, dir.path()).unwrap_err();
        let Error::Configuration(errors) = err else {
            panic!("expected configuration errors");
        };
        let messages = errors.messages().join("\n");
        assert!(messages.contains("project.name"));
        assert!(messages.contains("project.version"));
        assert!(messages.contains("release.github.owner"));
        assert!(messages.contains("distribution.cli.artifacts"));
        assert!(messages.contains("more than once"));
    }

    #[test]
    fn taps_are_disabled_without_release_support() {
        let mut model = model(
            r#"
            [project]
            name = "app"
            version = "1.0.0"

            [release]
            service = "generic"

            [packagers.brew]
            active = "ALWAYS"
            [packagers.docker]
            active = "ALWAYS"

            [[distributions]]
            name = "app"
            [[distributions.artifacts]]
            path = "app.zip"
            "#,
        );
        let dir = tempfile::tempdir().unwrap();
        validate_model(&mut model, dir.path()).unwrap();

        let dist = &model.distributions[0];
        let brew = dist.packagers.get(PackagerType::Brew).unwrap();
        assert!(!brew.is_enabled());
        assert_eq!(brew.common.active, Some(Active::Never));
        assert!(dist.packagers.get(PackagerType::Docker).unwrap().is_enabled());
    }

    #[test]
    fn disabled_distribution_skips_packager_checks() {
        let mut model = model(&format!(
            "{}{}",
            BASE,
            r#"
            [packagers.snap]
            active = "ALWAYS"

            [[distributions]]
            name = "old"
            active = "NEVER"
            [[distributions.artifacts]]
            path = "old.tar.gz"
            "#
        ));
        let dir = tempfile::tempdir().unwrap();
        validate_model(&mut model, dir.path()).unwrap();
        assert!(!model.distributions[0].is_enabled());
    }
}
