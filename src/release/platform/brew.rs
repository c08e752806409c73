//! Homebrew formulae and casks.
//!
//! A distribution produces either a formula, single or multi-platform, or a
//! cask when a macOS installer artifact was found during validation. The
//! generated files land in `Formula/` or `Casks/` of the tap, next to a
//! README.

use super::{ToolProcessor, render_all, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::{PropertyContext, hyphenated, keys},
    settings::{
        Brew, Cask, Distribution, DistributionType, Packager, PackagerKind, PackagerType, platform,
    },
    templates::{self, trim_tpl},
};
use serde_json::{Value, json};
use std::path::PathBuf;

pub struct BrewProcessor;

/// Ruby condition selecting the artifact built for `platform`.
fn platform_condition(platform: &str) -> Option<&'static str> {
    let mac = platform::is_mac(platform);
    let linux = platform::is_linux(platform);
    let arm = platform::is_arm(platform);
    let intel = platform::is_intel(platform);
    match (mac, linux, arm, intel) {
        (true, _, true, _) => Some("OS.mac? && Hardware::CPU.arm?"),
        (true, _, _, true) => Some("OS.mac? && Hardware::CPU.intel?"),
        (_, true, true, _) => Some("OS.linux? && Hardware::CPU.arm?"),
        (_, true, _, true) => Some("OS.linux? && Hardware::CPU.intel?"),
        _ => None,
    }
}

fn dependencies(brew: &Brew, distribution: &Distribution) -> Vec<String> {
    let mut dependencies: Vec<String> = brew.dependencies.iter().map(ToString::to_string).collect();
    let needs_jdk = matches!(
        distribution.distribution_type,
        DistributionType::JavaBinary | DistributionType::SingleJar
    );
    if needs_jdk && !brew.dependencies.iter().any(|d| d.key.starts_with("openjdk")) {
        let jdk = match distribution.java.version.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(version) => format!("\"openjdk@{}\"", version.trim()),
            None => "\"openjdk\"".to_string(),
        };
        dependencies.push(jdk);
    }
    dependencies
}

fn multi_platform_entries(props: &PropertyContext) -> Vec<Value> {
    let artifacts = props
        .get(keys::ARTIFACTS)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    artifacts
        .iter()
        .filter_map(|artifact| {
            let platform = artifact["platform"].as_str().unwrap_or_default();
            let condition = platform_condition(platform)?;
            Some(json!({
                "condition": condition,
                "url": artifact["url"],
                "checksum": artifact["checksumSha256"],
            }))
        })
        .collect()
}

fn fill_cask_props(cask: &Cask, props: &mut PropertyContext) -> Result<()> {
    props.put("brewCaskEnabled", cask.is_enabled());
    if !cask.is_enabled() {
        return Ok(());
    }
    let render = |name: &str, value: &Option<String>, props: &PropertyContext| -> Result<String> {
        templates::render_str(name, value.as_deref().unwrap_or_default(), props)
    };
    let name = render("cask name", &cask.name, props)?;
    let display_name = render("cask display name", &cask.display_name, props)?;
    let pkg = render("cask pkg", &cask.pkg_name, props)?;
    let app = render("cask app", &cask.app_name, props)?;
    let appcast = render("cask appcast", &cask.appcast, props)?;

    props.put("brewCaskName", name);
    props.put("brewCaskDisplayName", display_name);
    props.put("brewCaskHasPkg", !pkg.is_empty());
    props.put("brewCaskHasApp", !app.is_empty());
    props.put("brewCaskHasBinary", pkg.is_empty() && app.is_empty());
    props.put("brewCaskPkg", pkg);
    props.put("brewCaskApp", app);
    props.put("brewCaskHasAppcast", !appcast.is_empty());
    props.put("brewCaskAppcast", appcast);
    props.put("brewCaskUninstall", serde_json::to_value(&cask.uninstall)?);
    props.put("brewCaskZap", serde_json::to_value(&cask.zap)?);
    Ok(())
}

impl ToolProcessor for BrewProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Brew
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let brew = variant!(packager, Brew);

        let tap_name = props.text("brewRepositoryName");
        props.put(
            "brewRepositoryAlias",
            tap_name.strip_prefix("homebrew-").unwrap_or(&tap_name).to_string(),
        );

        let formula_name = brew.resolved_formula_name(&distribution.name, props)?;
        props.put("brewFormulaNameHyphenated", hyphenated(&formula_name));
        props.put("brewFormulaName", formula_name);

        let dependencies = dependencies(brew, distribution);
        props.put("brewDependencies", dependencies);
        let livecheck = render_all("brew livecheck", &brew.livecheck, props)?;
        props.put("brewHasLivecheck", !livecheck.is_empty());
        props.put("brewLivecheck", livecheck);
        props.put(
            "brewSingleJar",
            distribution.distribution_type == DistributionType::SingleJar,
        );

        if brew.is_multi_platform() {
            props.put("brewMultiPlatform", multi_platform_entries(props));
        }
        fill_cask_props(&brew.cask, props)
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        let PackagerKind::Brew(brew) = &packager.kind else {
            return None;
        };
        let cask = brew.cask.is_enabled();
        let formula = PathBuf::from("Formula").join(format!("{}.rb", props.text("brewFormulaNameHyphenated")));
        match template {
            "formula.rb.tpl" if !cask && !brew.is_multi_platform() => Some(formula),
            "formula-multi.rb.tpl" if !cask && brew.is_multi_platform() => Some(formula),
            "cask.rb.tpl" if cask => {
                Some(PathBuf::from("Casks").join(format!("{}.rb", props.text("brewCaskName"))))
            }
            "formula.rb.tpl" | "formula-multi.rb.tpl" | "cask.rb.tpl" => None,
            other => Some(PathBuf::from(trim_tpl(other))),
        }
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

    const FORMULA: &str = r#"
        [project]
        name = "tool"
        version = "2.0.0"
        description = "A tool"
        license = "MIT"

        [release]
        owner = "acme"

        [packagers.brew]
        active = "ALWAYS"
        livecheck = ["url :stable"]
        [[packagers.brew.dependencies]]
        key = ":xz"

        [[distributions]]
        name = "my-tool"
        [[distributions.artifacts]]
        path = "dist/my-tool-2.0.0.zip"
    "#;

    #[test]
    fn formula_props_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixture(FORMULA, dir.path(), &["dist/my-tool-2.0.0.zip"], &RecordingServices::new());
        let props = props_for(&ctx, PackagerType::Brew);

        assert_eq!(props.text("brewFormulaName"), "MyTool");
        assert_eq!(props.text("brewFormulaNameHyphenated"), "my-tool");
        assert_eq!(props.text("brewRepositoryAlias"), "tap");
        assert!(!props.flag("brewCaskEnabled"));
        assert_eq!(props.get("brewDependencies"), Some(&json!([":xz"])));

        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Brew).unwrap();
        let processor = processor_for(PackagerType::Brew);
        let written = processor.prepare(&ctx, distribution, packager, &props).unwrap();
        assert_eq!(written.len(), 2);

        let formula = ctx
            .prepare_directory("my-tool", PackagerType::Brew)
            .join("Formula/my-tool.rb");
        let text = fs::read_to_string(formula).unwrap();
        assert!(text.contains("class MyTool < Formula"));
        assert!(text.contains("depends_on :xz"));
        assert!(text.contains("url \"https://github.com/acme/tool/releases/download/v2.0.0/my-tool-2.0.0.zip\""));
        assert!(text.contains("    url :stable"));
    }

    #[test]
    fn cask_replaces_the_formula() {
        let dir = tempfile::tempdir().unwrap();
        let model = FORMULA
            .replace("name = \"my-tool\"", "name = \"my-tool\"\ntype = \"NATIVE_PACKAGE\"")
            .replace(
                "path = \"dist/my-tool-2.0.0.zip\"",
                "path = \"dist/MyTool-2.0.0.dmg\"\nplatform = \"osx-x86_64\"",
            );
        let ctx = fixture(&model, dir.path(), &["dist/MyTool-2.0.0.dmg"], &RecordingServices::new());
        let props = props_for(&ctx, PackagerType::Brew);
        assert!(props.flag("brewCaskEnabled"));
        assert_eq!(props.text("brewCaskName"), "mytool");
        assert_eq!(props.text("brewCaskApp"), "MyTool.app");

        let packager = ctx.model().distributions[0]
            .packagers
            .get(PackagerType::Brew)
            .unwrap();
        let processor = processor_for(PackagerType::Brew);
        assert_eq!(
            processor.output_path(packager, &props, "cask.rb.tpl"),
            Some(PathBuf::from("Casks/mytool.rb"))
        );
        assert_eq!(processor.output_path(packager, &props, "formula.rb.tpl"), None);
        assert_eq!(
            processor.output_path(packager, &props, "README.md.tpl"),
            Some(PathBuf::from("README.md"))
        );
    }

    #[test]
    fn multi_platform_conditions() {
        assert_eq!(platform_condition("osx-aarch_64"), Some("OS.mac? && Hardware::CPU.arm?"));
        assert_eq!(platform_condition("linux-x86_64"), Some("OS.linux? && Hardware::CPU.intel?"));
        assert_eq!(platform_condition(""), None);
    }
}
