//! Chocolatey packages.
//!
//! The nuspec and install script are generated under a directory named after
//! the package. Packing needs `choco`, which only runs on Windows; elsewhere
//! the generated sources can still be pushed to a bucket repository whose CI
//! builds them (`remote_build`).

use super::{ToolProcessor, copy_prepared, or_default, tap, variant};
use crate::release::{
    builder::{ReleaseContext, tool_detection::HAS_CHOCO},
    error::Result,
    props::{PropertyContext, keys},
    services::CommandLine,
    settings::{Chocolatey, Distribution, Packager, PackagerKind, PackagerType},
    templates::{self, trim_tpl},
};
use std::path::PathBuf;

pub struct ChocolateyProcessor;

fn nupkg_name(props: &PropertyContext) -> String {
    format!(
        "{}.{}.nupkg",
        props.text("chocolateyPackageName"),
        props.text(keys::PROJECT_VERSION)
    )
}

fn push_commands(chocolatey: &Chocolatey, nupkg: &str) -> Vec<CommandLine> {
    vec![
        CommandLine::new("choco")
            .args(["apikey", "-k"])
            .secret_arg(chocolatey.api_key.clone().unwrap_or_default())
            .args(["-source", chocolatey.source()]),
        CommandLine::new("choco")
            .args(["push", nupkg])
            .args(["-s", chocolatey.source()]),
    ]
}

impl ToolProcessor for ChocolateyProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Chocolatey
    }

    fn fill_props(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let chocolatey = variant!(packager, Chocolatey);
        props.put(
            "chocolateyPackageName",
            or_default(&chocolatey.package_name, &distribution.name),
        );
        props.put("chocolateyUsername", chocolatey.username.clone().unwrap_or_default());
        props.put(
            "chocolateyTitle",
            or_default(&chocolatey.title, ctx.model().project.name()),
        );
        let icon = templates::render_str(
            "chocolatey icon url",
            chocolatey.icon_url.as_deref().unwrap_or_default(),
            props,
        )?;
        props.put("chocolateyIconUrl", icon);
        props.put("chocolateySource", chocolatey.source());
        props.put("chocolateyRemoteBuild", chocolatey.is_remote_build());
        Ok(())
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        let package = PathBuf::from(props.text("chocolateyPackageName"));
        match (&packager.kind, template) {
            (PackagerKind::Chocolatey(_), "binary.nuspec.tpl") => Some(
                package.join(format!("{}.nuspec", props.text("chocolateyPackageName"))),
            ),
            _ => Some(package.join(trim_tpl(template))),
        }
    }

    fn package(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        let chocolatey = variant!(packager, Chocolatey);
        let mut files = copy_prepared(ctx, distribution, packager)?;
        if chocolatey.is_remote_build() {
            return Ok(files);
        }
        if !cfg!(windows) || !*HAS_CHOCO {
            log::warn!("choco is not available, {} is not packed", distribution.name);
            return Ok(files);
        }

        let name = props.text("chocolateyPackageName");
        let workdir = ctx
            .package_directory(&distribution.name, PackagerType::Chocolatey)
            .join(&name);
        let command = CommandLine::new("choco")
            .arg("pack")
            .arg(format!("{}.nuspec", name))
            .args(["--outputdirectory", "."])
            .current_dir(&workdir);
        ctx.services().runner.run(&command)?;
        let nupkg = workdir.join(nupkg_name(props));
        log::info!("✓ packed {}", nupkg.display());
        files.push(nupkg);
        Ok(files)
    }

    fn publish(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<()> {
        let chocolatey = variant!(packager, Chocolatey);
        if chocolatey.is_remote_build() {
            return tap::publish(ctx, distribution, packager, props);
        }

        let nupkg = nupkg_name(props);
        if ctx.is_dry_run() {
            log::info!("dry-run: would push {} to {}", nupkg, chocolatey.source());
            return Ok(());
        }
        let workdir = ctx
            .package_directory(&distribution.name, PackagerType::Chocolatey)
            .join(props.text("chocolateyPackageName"));
        if !workdir.join(&nupkg).is_file() {
            crate::bail!("{} was not packed, cannot push it", nupkg);
        }
        for command in push_commands(chocolatey, &nupkg) {
            ctx.services().runner.run(&command.current_dir(&workdir))?;
        }
        log::info!("✓ pushed {} to {}", nupkg, chocolatey.source());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{
        platform::{
            processor_for,
            tests::{fixture, props_for},
        },
        services::recording::RecordingServices,
    };
    use std::fs;

    const MODEL: &str = r#"
        [project]
        name = "app"
        version = "1.4.0"
        description = "An app"
        authors = ["Duke"]

        [release]
        owner = "acme"

        [packagers.chocolatey]
        active = "ALWAYS"
        api_key = "choco-key"
        title = "Acme App"

        [[distributions]]
        name = "app"
        [[distributions.artifacts]]
        path = "dist/app-1.4.0-windows-x86_64.zip"
        platform = "windows-x86_64"
    "#;

    #[test]
    fn sources_are_generated_per_package() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixture(
            MODEL,
            dir.path(),
            &["dist/app-1.4.0-windows-x86_64.zip"],
            &RecordingServices::new(),
        );
        let props = props_for(&ctx, PackagerType::Chocolatey);
        assert_eq!(props.text("chocolateyUsername"), "acme");
        assert_eq!(props.text("chocolateyTitle"), "Acme App");
        assert_eq!(props.text("chocolateySource"), "https://push.chocolatey.org/");

        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Chocolatey).unwrap();
        processor_for(PackagerType::Chocolatey)
            .prepare(&ctx, distribution, packager, &props)
            .unwrap();
        let prepared = ctx.prepare_directory("app", PackagerType::Chocolatey);
        let nuspec = fs::read_to_string(prepared.join("app/app.nuspec")).unwrap();
        assert!(nuspec.contains("<id>app</id>"));
        assert!(nuspec.contains("<owners>acme</owners>"));
        assert!(!nuspec.contains("<iconUrl>"));
        let script = fs::read_to_string(prepared.join("app/tools/chocolateyinstall.ps1")).unwrap();
        assert!(script.contains("app-1.4.0-windows-x86_64.zip"));
    }

    #[test]
    fn push_sets_the_api_key_first() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = fixture(MODEL, dir.path(), &["dist/app-1.4.0-windows-x86_64.zip"], &recording);
        let props = props_for(&ctx, PackagerType::Chocolatey);
        let workdir = ctx.package_directory("app", PackagerType::Chocolatey).join("app");
        fs::create_dir_all(&workdir).unwrap();
        fs::write(workdir.join("app.1.4.0.nupkg"), "nupkg").unwrap();

        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Chocolatey).unwrap();
        processor_for(PackagerType::Chocolatey)
            .publish(&ctx, distribution, packager, &props)
            .unwrap();

        assert_eq!(
            recording.runner.commands(),
            vec![
                "choco apikey -k ******** -source https://push.chocolatey.org/",
                "choco push app.1.4.0.nupkg -s https://push.chocolatey.org/",
            ]
        );
    }

    #[test]
    fn unpacked_package_cannot_be_pushed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixture(
            MODEL,
            dir.path(),
            &["dist/app-1.4.0-windows-x86_64.zip"],
            &RecordingServices::new(),
        );
        let props = props_for(&ctx, PackagerType::Chocolatey);
        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Chocolatey).unwrap();
        let err = processor_for(PackagerType::Chocolatey)
            .publish(&ctx, distribution, packager, &props)
            .unwrap_err();
        assert!(err.to_string().contains("app.1.4.0.nupkg"));
    }
}
