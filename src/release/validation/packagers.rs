//! Per-packager validation rules.

use super::{Scope, Target};
use crate::release::{
    builder::candidates::candidate_artifacts,
    error::ValidationErrors,
    props::{PropertyContext, class_name},
    settings::{
        Artifact, Brew, Chocolatey, Distribution, DistributionType, Docker, Macports, Packager,
        PackagerKind, PackagerType, Sdkman, Snap, inherit_text, platform::is_mac,
    },
    templates,
};
use std::{collections::BTreeMap, path::Path};

/// Repository basename and default tap name per packager.
fn tap_defaults(packager_type: PackagerType, distribution: &str) -> (&'static str, String) {
    match packager_type {
        PackagerType::Brew => ("homebrew", "homebrew-tap".into()),
        PackagerType::Snap => ("snap", format!("{}-snap", distribution)),
        PackagerType::Spec => ("spec", "spec".into()),
        PackagerType::Macports => ("macports", "macports".into()),
        PackagerType::Chocolatey => ("chocolatey", "chocolatey-bucket".into()),
        PackagerType::Jbang => ("jbang", "jbang-catalog".into()),
        PackagerType::Scoop => ("scoop", "scoop-bucket".into()),
        PackagerType::Gofish => ("gofish", "fish-food".into()),
        PackagerType::Docker | PackagerType::Sdkman => ("", String::new()),
    }
}

pub(super) fn validate_packager(
    scope: &Scope<'_>,
    target: &Target<'_>,
    packager: &mut Packager,
    errors: &mut ValidationErrors,
) {
    let packager_type = packager.packager_type();
    let prefix = target.prefix(packager_type);

    if let Some(tap) = packager.tap_mut() {
        let (basename, tap_name) = tap_defaults(packager_type, target.name);
        tap.configure(basename, &tap_name);
        inherit_text(&mut tap.owner, &scope.release.owner);
    }
    match &mut packager.kind {
        PackagerKind::Chocolatey(c) => c.resolve_env(),
        PackagerKind::Sdkman(s) => s.resolve_env(),
        _ => {}
    }

    if !packager.resolve_enabled(scope.project, target.distribution_type) {
        if let PackagerKind::Brew(brew) = &mut packager.kind {
            brew.cask.disable();
        }
        return;
    }
    if packager.tap().is_some() && !scope.release.is_release_supported() {
        log::warn!(
            "{} disabled: release service {} can't host repositories",
            prefix,
            scope.release.service
        );
        packager.disable();
        if let PackagerKind::Brew(brew) = &mut packager.kind {
            brew.cask.disable();
        }
        return;
    }
    if let Some(tap) = packager.tap_mut() {
        tap.resolve_enabled(scope.project);
    }
    log::debug!("validating {}", prefix);

    if let Some(dir) = packager
        .common
        .template_directory
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        if !scope.basedir.join(dir).is_dir() {
            errors.configuration(format!(
                "{}.template_directory {} does not exist",
                prefix, dir
            ));
        }
    }

    let candidates: Vec<Artifact> = candidate_artifacts(target.artifacts, target.distribution_type, packager)
        .into_iter()
        .cloned()
        .collect();

    let disable = match &mut packager.kind {
        PackagerKind::Brew(brew) => {
            validate_brew(target, &prefix, brew, &candidates, errors);
            false
        }
        PackagerKind::Snap(snap) => validate_snap(scope.basedir, &prefix, snap, &candidates, errors),
        PackagerKind::Sdkman(sdkman) => {
            validate_sdkman(scope, &prefix, sdkman, errors);
            false
        }
        PackagerKind::Jbang(_) => {
            if target.java.main_class.as_deref().is_none_or(|c| c.trim().is_empty()) {
                errors.configuration(format!(
                    "distribution.{}.java.main_class must not be blank, required by jbang",
                    target.name
                ));
            }
            false
        }
        PackagerKind::Chocolatey(chocolatey) => {
            validate_chocolatey(scope, &prefix, chocolatey, &candidates, errors);
            false
        }
        PackagerKind::Docker(docker) => {
            validate_docker(&prefix, docker, &candidates, errors);
            false
        }
        PackagerKind::Macports(macports) => {
            validate_macports(scope, &prefix, macports, &candidates, errors);
            false
        }
        PackagerKind::Scoop(_) | PackagerKind::Spec(_) => {
            validate_artifact_platforms(&prefix, &candidates, errors);
            false
        }
        PackagerKind::Gofish(_) => false,
    };
    if disable {
        packager.disable();
    }
}

/// More than one candidate only works when every candidate names its platform.
fn validate_artifact_platforms(prefix: &str, candidates: &[Artifact], errors: &mut ValidationErrors) {
    if candidates.len() > 1 && candidates.iter().any(|a| !a.has_platform()) {
        errors.configuration(format!(
            "{}: {} artifacts are candidates but not all of them declare a platform",
            prefix,
            candidates.len()
        ));
    }
}

fn validate_brew(
    target: &Target<'_>,
    prefix: &str,
    brew: &mut Brew,
    candidates: &[Artifact],
    errors: &mut ValidationErrors,
) {
    if matches!(
        target.distribution_type,
        DistributionType::SingleJar | DistributionType::JavaBinary | DistributionType::NativePackage
    ) && brew.is_multi_platform()
    {
        log::warn!("{}.multi_platform is not supported for {} distributions", prefix, target.distribution_type.as_str());
        brew.multi_platform = Some(false);
    }
    if brew.is_multi_platform() {
        brew.cask.disable();
    }

    let formula_name = match brew.resolved_formula_name(target.name, target.props) {
        Ok(name) => name,
        Err(e) => {
            errors.configuration(format!("{}.formula_name could not be rendered: {}", prefix, e));
            class_name(target.name)
        }
    };
    validate_cask(target, prefix, brew, &formula_name, errors);

    if !brew.cask.is_enabled() {
        validate_artifact_platforms(prefix, candidates, errors);
    }
}

/// Counts macOS `.dmg`, `.pkg` and `.zip` artifacts to decide whether a cask
/// is generated and fills its defaults.
fn validate_cask(
    target: &Target<'_>,
    prefix: &str,
    brew: &mut Brew,
    formula_name: &str,
    errors: &mut ValidationErrors,
) {
    let cask = &mut brew.cask;
    if target.distribution_type == DistributionType::SingleJar {
        cask.disable();
        return;
    }
    if cask.is_enabled_set() && !cask.is_enabled() {
        return;
    }

    let skip_key = PackagerType::Brew.skip_key();
    let mut dmg = Vec::new();
    let mut pkg = Vec::new();
    let mut zip = Vec::new();
    for artifact in target
        .artifacts
        .iter()
        .filter(|a| a.active && is_mac(a.platform()) && !a.is_skipped_by(&skip_key))
    {
        match artifact.extension() {
            Some(".dmg") => dmg.push(artifact),
            Some(".pkg") => pkg.push(artifact),
            Some(".zip") => zip.push(artifact),
            _ => {}
        }
    }

    let total = dmg.len() + pkg.len() + zip.len();
    if total == 0 {
        cask.disable();
        return;
    }
    for (found, ext) in [(&dmg, "dmg"), (&pkg, "pkg"), (&zip, "zip")] {
        if found.len() > 1 {
            errors.configuration(format!(
                "{}.cask: {} macOS .{} artifacts found, only one is supported",
                prefix,
                found.len(),
                ext
            ));
            cask.disable();
            return;
        }
    }
    if total > 1 {
        errors.configuration(format!(
            "{}.cask: only one of .dmg, .pkg or .zip may be declared for macOS, found {}",
            prefix, total
        ));
        cask.disable();
        return;
    }
    if zip.len() == 1 && !cask.is_enabled_set() {
        cask.disable();
        return;
    }
    cask.enable();

    if let Some(artifact) = pkg.first() {
        if is_blank(&cask.pkg_name) {
            cask.pkg_name = Some(rendered_file_name(artifact, target.props));
        }
    }
    if !is_blank(&cask.pkg_name) {
        cask.pkg_name = cask.pkg_name.take().map(|name| with_suffix(name, ".pkg"));
    } else if is_blank(&cask.app_name) {
        cask.app_name = Some(format!("{}.app", formula_name));
    } else {
        cask.app_name = cask.app_name.take().map(|name| with_suffix(name, ".app"));
    }
    if !zip.is_empty() {
        cask.app_name = None;
        cask.pkg_name = None;
    }
    if cask.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        cask.name = Some(formula_name.to_lowercase());
    }
    if cask.display_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        cask.display_name = Some(formula_name.to_string());
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn with_suffix(name: String, suffix: &str) -> String {
    if name.ends_with(suffix) { name } else { format!("{}{}", name, suffix) }
}

fn rendered_file_name(artifact: &Artifact, props: &PropertyContext) -> String {
    let rendered = templates::render_str("artifact path", &artifact.path, props)
        .unwrap_or_else(|_| artifact.path.clone());
    Path::new(&rendered)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(rendered)
}

/// Returns whether the packager must be disabled.
fn validate_snap(
    basedir: &Path,
    prefix: &str,
    snap: &mut Snap,
    candidates: &[Artifact],
    errors: &mut ValidationErrors,
) -> bool {
    for (field, value) in [
        ("base", &snap.base),
        ("grade", &snap.grade),
        ("confinement", &snap.confinement),
    ] {
        if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
            errors.configuration(format!("{}.{} must not be blank", prefix, field));
        }
    }
    if !snap.is_remote_build() {
        match snap.exported_login.as_deref().filter(|l| !l.trim().is_empty()) {
            None => errors.configuration(format!(
                "{}.exported_login must not be blank unless remote_build is set",
                prefix
            )),
            Some(login) if !basedir.join(login).exists() => errors.configuration(format!(
                "{}.exported_login {} does not exist",
                prefix, login
            )),
            Some(_) => {}
        }
    }
    for (index, arch) in snap.architectures.iter().enumerate() {
        if !arch.has_build_on() {
            errors.configuration(format!(
                "{}.architectures[{}].build_on must not be empty",
                prefix, index
            ));
        }
    }

    validate_artifact_platforms(prefix, candidates, errors);
    match candidates.len() {
        0 => {
            log::debug!("{} has no candidate artifacts, disabling", prefix);
            true
        }
        1 => false,
        n => {
            errors.configuration(format!(
                "{}: snap packages a single artifact, {} candidates found",
                prefix, n
            ));
            true
        }
    }
}

fn validate_sdkman(scope: &Scope<'_>, prefix: &str, sdkman: &mut Sdkman, errors: &mut ValidationErrors) {
    inherit_text(&mut sdkman.candidate, &Some(scope.project.name().to_string()));
    for (field, value) in [
        ("consumer_key", &sdkman.consumer_key),
        ("consumer_token", &sdkman.consumer_token),
    ] {
        if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
            errors.configuration(format!("{}.{} must not be blank", prefix, field));
        }
    }
}

fn validate_chocolatey(
    scope: &Scope<'_>,
    prefix: &str,
    chocolatey: &mut Chocolatey,
    candidates: &[Artifact],
    errors: &mut ValidationErrors,
) {
    inherit_text(&mut chocolatey.username, &scope.release.owner);
    if !chocolatey.is_remote_build()
        && chocolatey.api_key.as_deref().is_none_or(|k| k.trim().is_empty())
    {
        errors.configuration(format!(
            "{}.api_key must not be blank unless remote_build is set",
            prefix
        ));
    }
    validate_artifact_platforms(prefix, candidates, errors);
}

fn validate_docker(prefix: &str, docker: &Docker, candidates: &[Artifact], errors: &mut ValidationErrors) {
    for registry in &docker.registries {
        if registry.server_name.trim().is_empty() {
            errors.configuration(format!("{}.registries.server_name must not be blank", prefix));
        }
        if registry.username.as_deref().is_none_or(|u| u.trim().is_empty()) {
            errors.configuration(format!(
                "{}.registries.{}.username must not be blank",
                prefix, registry.server_name
            ));
        }
    }
    validate_artifact_platforms(prefix, candidates, errors);
}

fn validate_macports(
    scope: &Scope<'_>,
    prefix: &str,
    macports: &mut Macports,
    candidates: &[Artifact],
    errors: &mut ValidationErrors,
) {
    if macports.maintainers.is_empty() {
        macports.maintainers = scope.project.maintainers.clone();
    }
    validate_artifact_platforms(prefix, candidates, errors);
}

/// Formula and cask names must be unique across enabled distributions.
pub(super) fn post_validate_brew(
    distributions: &[Distribution],
    base_props: &PropertyContext,
    errors: &mut ValidationErrors,
) {
    let mut formulas: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut casks: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for distribution in distributions.iter().filter(|d| d.is_enabled()) {
        let Some(packager) = distribution
            .packagers
            .get(PackagerType::Brew)
            .filter(|p| p.is_enabled())
        else {
            continue;
        };
        let PackagerKind::Brew(brew) = &packager.kind else {
            continue;
        };
        let mut props = base_props.clone();
        props.put_all(&distribution.props());
        if let Ok(name) = brew.resolved_formula_name(&distribution.name, &props) {
            formulas.entry(name).or_default().push(&distribution.name);
        }
        if brew.cask.is_enabled() {
            if let Some(name) = brew.cask.name.clone() {
                casks.entry(name).or_default().push(&distribution.name);
            }
        }
    }

    for (kind, names) in [("formula", formulas), ("cask", casks)] {
        for (name, owners) in names.into_iter().filter(|(_, owners)| owners.len() > 1) {
            errors.configuration(format!(
                "brew {} {} is generated by more than one distribution: {}",
                kind,
                name,
                owners.join(", ")
            ));
        }
    }
}
