//! Snapcraft packages.
//!
//! Local builds run `snapcraft` in the package directory and upload the
//! resulting `.snap` to the store. Remote builds only generate
//! `snap/snapcraft.yaml` and push it to a repository watched by the store's
//! build service.

use super::{ToolProcessor, copy_prepared, tap, variant};
use crate::release::{
    builder::{ReleaseContext, tool_detection::HAS_SNAPCRAFT},
    error::Result,
    props::{PropertyContext, keys},
    services::CommandLine,
    settings::{Distribution, Packager, PackagerType, Snap},
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

pub struct SnapProcessor;

fn architectures(snap: &Snap) -> Vec<Value> {
    snap.architectures
        .iter()
        .map(|arch| {
            json!({
                "buildOn": arch.build_on.join(", "),
                "runOn": arch.run_on.join(", "),
                "ignoreError": arch.ignore_error,
            })
        })
        .collect()
}

/// Store channel receiving the upload.
fn channel(grade: &str) -> &'static str {
    if grade == "stable" { "stable" } else { "edge" }
}

fn snap_file(props: &PropertyContext) -> String {
    format!("{}-{}.snap", props.text("snapPackageName"), props.effective_version())
}

fn find_snap(package: &Path, props: &PropertyContext) -> Result<PathBuf> {
    let expected = package.join(snap_file(props));
    if expected.is_file() {
        return Ok(expected);
    }
    let pattern = package.join("*.snap");
    let mut found = glob::glob(&pattern.to_string_lossy())?.filter_map(std::result::Result::ok);
    match found.next() {
        Some(path) => Ok(path),
        None => crate::bail!("no .snap file found in {}", package.display()),
    }
}

impl ToolProcessor for SnapProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Snap
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let snap = variant!(packager, Snap);

        let package_name = snap
            .package_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| distribution.name.clone());
        props.put("snapPackageName", package_name);
        props.put("snapBase", snap.base.clone().unwrap_or_default());
        props.put("snapGrade", snap.grade.clone().unwrap_or_default());
        props.put("snapConfinement", snap.confinement.clone().unwrap_or_default());
        props.put("snapRemoteBuild", snap.is_remote_build());

        props.put("snapHasArchitectures", !snap.architectures.is_empty());
        props.put("snapArchitectures", architectures(snap));
        props.put("snapHasLocalPlugs", !snap.local_plugs.is_empty());
        props.put("snapLocalPlugs", snap.local_plugs.clone());
        props.put("snapHasLocalSlots", !snap.local_slots.is_empty());
        props.put("snapLocalSlots", snap.local_slots.clone());
        props.put("snapHasPlugs", !snap.plugs.is_empty());
        props.put("snapPlugs", serde_json::to_value(&snap.plugs)?);
        props.put("snapHasSlots", !snap.slots.is_empty());
        props.put("snapSlots", serde_json::to_value(&snap.slots)?);
        Ok(())
    }

    fn package(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        let snap = variant!(packager, Snap);
        let mut files = copy_prepared(ctx, distribution, packager)?;
        if snap.is_remote_build() {
            return Ok(files);
        }
        if !cfg!(target_os = "linux") || !*HAS_SNAPCRAFT {
            log::warn!("snapcraft is not available, {} is packaged without a .snap", distribution.name);
            return Ok(files);
        }

        let package = ctx.package_directory(&distribution.name, PackagerType::Snap);
        let output = package.join(snap_file(props));
        let command = CommandLine::new("snapcraft")
            .args(["snap", "--output"])
            .arg(output.to_string_lossy())
            .current_dir(&package);
        ctx.services().runner.run(&command)?;
        log::info!("✓ built {}", output.display());
        files.push(output);
        Ok(files)
    }

    fn publish(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<()> {
        let snap = variant!(packager, Snap);
        if snap.is_remote_build() {
            return tap::publish(ctx, distribution, packager, props);
        }

        let package = ctx.package_directory(&distribution.name, PackagerType::Snap);
        let release = format!("--release={}", channel(&props.text("snapGrade")));
        if ctx.is_dry_run() {
            log::info!("dry-run: would upload {} with {}", snap_file(props), release);
            return Ok(());
        }

        let file = find_snap(&package, props)?;
        let login = ctx
            .basedir()
            .join(snap.exported_login.as_deref().unwrap_or_default());
        let runner = &ctx.services().runner;
        runner.run(
            &CommandLine::new("snapcraft")
                .args(["login", "--with"])
                .arg(login.to_string_lossy()),
        )?;
        runner.run(
            &CommandLine::new("snapcraft")
                .arg("upload")
                .arg(release)
                .arg(file.to_string_lossy()),
        )?;
        log::info!(
            "✓ uploaded {} {}",
            props.text("snapPackageName"),
            props.text(keys::PROJECT_VERSION)
        );
        Ok(())
    }
}
