//! RPM spec files.

use super::{ToolProcessor, or_default, variant};
use crate::release::{
    builder::{ReleaseContext, archive},
    error::Result,
    props::{PropertyContext, keys},
    settings::{Distribution, DistributionType, Packager, PackagerKind, PackagerType},
    templates::trim_tpl,
};
use std::path::{Path, PathBuf};

pub struct SpecProcessor;

/// `Mon Jan 02 2006`, the date format of `%changelog` entries.
fn changelog_date() -> String {
    chrono::Local::now().format("%a %b %d %Y").to_string()
}

impl ToolProcessor for SpecProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Spec
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let spec = variant!(packager, Spec);

        props.put("specPackageName", or_default(&spec.package_name, &distribution.name));
        props.put("specRelease", spec.release());
        props.put("specRequires", spec.requires.clone());
        props.put(
            "specNoarch",
            distribution.distribution_type == DistributionType::JavaBinary,
        );
        props.put("specChangelogDate", changelog_date());

        let artifact = props.text(keys::DISTRIBUTION_ARTIFACT);
        let listing = archive::list(Path::new(&artifact))?;
        props.put("specDirectories", listing.directories);
        props.put("specBinaries", listing.binaries);
        props.put("specFiles", listing.files);
        Ok(())
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        match (&packager.kind, template) {
            (PackagerKind::Spec(_), "app.spec.tpl") => {
                Some(PathBuf::from(format!("{}.spec", props.text("specPackageName"))))
            }
            _ => Some(PathBuf::from(trim_tpl(template))),
        }
    }
}
