//! JBang catalogs.

use super::{ToolProcessor, or_default, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::PropertyContext,
    settings::{Distribution, DistributionType, Packager, PackagerType},
};

pub struct JbangProcessor;

/// Maven coordinates when the distribution declares them, the download URL
/// otherwise.
fn script_ref(distribution: &Distribution, version: &str, props: &PropertyContext) -> String {
    let java = &distribution.java;
    match (java.group_id.as_deref(), java.artifact_id.as_deref()) {
        (Some(group), Some(artifact))
            if distribution.distribution_type == DistributionType::SingleJar
                && !group.trim().is_empty()
                && !artifact.trim().is_empty() =>
        {
            format!("{}:{}:{}", group, artifact, version)
        }
        _ => props.distribution_url(),
    }
}

impl ToolProcessor for JbangProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Jbang
    }

    fn fill_props(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let jbang = variant!(packager, Jbang);
        let project = &ctx.model().project;

        let mut alias = or_default(&jbang.alias, &distribution.name);
        if project.is_snapshot() {
            alias.push_str("-snapshot");
        }
        props.put("jbangAliasName", alias);
        let script = script_ref(distribution, project.version(), props);
        props.put("jbangScriptRef", script);
        Ok(())
    }
}
