//! GoFish food recipes.

use super::{ToolProcessor, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::{PropertyContext, keys},
    settings::{Distribution, Packager, PackagerKind, PackagerType, platform},
    templates::trim_tpl,
};
use serde_json::{Value, json};
use std::path::PathBuf;

pub struct GofishProcessor;

/// GoFish names operating systems and architectures after Go's `GOOS` and
/// `GOARCH`.
fn go_os_arch(platform: &str) -> Vec<(&'static str, &'static str)> {
    if platform.trim().is_empty() {
        return vec![("darwin", "amd64"), ("linux", "amd64"), ("windows", "amd64")];
    }
    let os = if platform::is_mac(platform) {
        "darwin"
    } else if platform::is_windows(platform) {
        "windows"
    } else {
        "linux"
    };
    let arch = if platform::is_arm(platform) { "arm64" } else { "amd64" };
    vec![(os, arch)]
}

fn packages(props: &PropertyContext) -> Vec<Value> {
    props
        .get(keys::ARTIFACTS)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(|artifact| {
            go_os_arch(artifact["platform"].as_str().unwrap_or_default())
                .into_iter()
                .map(move |(os, arch)| {
                    json!({
                        "os": os,
                        "arch": arch,
                        "url": artifact["url"],
                        "checksum": artifact["checksumSha256"],
                        "fileName": artifact["fileName"],
                    })
                })
        })
        .collect()
}

impl ToolProcessor for GofishProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Gofish
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        _distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let _gofish = variant!(packager, Gofish);
        props.put("gofishPackages", packages(props));
        Ok(())
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        match (&packager.kind, template) {
            (PackagerKind::Gofish(_), "food.lua.tpl") => Some(
                PathBuf::from("Food").join(format!("{}.lua", props.distribution_name())),
            ),
            _ => Some(PathBuf::from(trim_tpl(template))),
        }
    }
}
