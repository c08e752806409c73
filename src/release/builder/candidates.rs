//! Candidate artifact resolution.
//!
//! A candidate is an artifact a packager can consume: active, with one of the
//! packager's extensions, on a platform it supports, and not skipped through
//! its `skip<Packager>` extra property.

use crate::release::settings::{Artifact, DistributionType, Packager, compare_by_platform};

/// Candidates of `artifacts` for `packager`, sorted by platform and then by
/// extension preference.
pub fn candidate_artifacts<'a>(
    artifacts: &'a [Artifact],
    distribution_type: DistributionType,
    packager: &Packager,
) -> Vec<&'a Artifact> {
    let extensions = packager.supported_extensions(distribution_type);
    let skip_key = packager.skip_key();
    let mut candidates: Vec<&Artifact> = artifacts
        .iter()
        .filter(|a| a.active)
        .filter(|a| a.extension().is_some_and(|ext| extensions.contains(&ext)))
        .filter(|a| packager.supports_platform(a.platform()))
        .filter(|a| !a.is_skipped_by(&skip_key))
        .collect();
    sort_candidates(&mut candidates, extensions);
    candidates
}

/// Stable sort: platform first, then the index of the extension in `extensions`.
pub fn sort_candidates(candidates: &mut [&Artifact], extensions: &[&str]) {
    let priority = |artifact: &Artifact| {
        artifact
            .extension()
            .and_then(|ext| extensions.iter().position(|e| *e == ext))
            .unwrap_or(usize::MAX)
    };
    candidates.sort_by(|a, b| compare_by_platform(a, b).then_with(|| priority(a).cmp(&priority(b))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::settings::PackagerType;
    use serde_json::Value;

    #[test]
    fn groups_by_platform_then_extension_priority() {
        let artifacts = [
            Artifact::new("app-osx.zip", Some("osx")),
            Artifact::new("app-linux.tar", Some("linux")),
            Artifact::new("app-osx.dmg", Some("osx")),
        ];
        let mut candidates: Vec<&Artifact> = artifacts.iter().collect();
        sort_candidates(&mut candidates, &[".dmg", ".zip", ".tar"]);

        let paths: Vec<&str> = candidates.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["app-linux.tar", "app-osx.dmg", "app-osx.zip"]);
    }

    #[test]
    fn filters_inactive_foreign_and_skipped() {
        let mut skipped = Artifact::new("app-osx-aarch_64.zip", Some("osx-aarch_64"));
        skipped
            .extra_properties
            .insert("skipBrew".into(), Value::from(true));
        let mut inactive = Artifact::new("app-old.zip", None);
        inactive.active = false;
        let artifacts = vec![
            Artifact::new("app-osx-x86_64.zip", Some("osx-x86_64")),
            Artifact::new("app-linux-x86_64.zip", Some("linux-x86_64")),
            Artifact::new("app.tar.gz", None),
            skipped,
            inactive,
            Artifact::new("app.zip", None),
        ];

        let brew = Packager::new(PackagerType::Brew);
        let candidates = candidate_artifacts(&artifacts, DistributionType::Binary, &brew);
        let paths: Vec<&str> = candidates.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["app.zip", "app-osx-x86_64.zip"]);
    }

    #[test]
    fn unsupported_type_has_no_candidates() {
        let artifacts = vec![Artifact::new("app.zip", None)];
        let snap = Packager::new(PackagerType::Snap);
        assert!(candidate_artifacts(&artifacts, DistributionType::SingleJar, &snap).is_empty());
    }
}
