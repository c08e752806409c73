//! Property-fill pipeline.
//!
//! Builds the [`PropertyContext`] handed to the template engine for one
//! (distribution, packager) pair:
//! 1. project, platform and distribution properties
//! 2. release service properties, which win over step 1
//! 3. per-artifact properties for every candidate, primary family from the
//!    first one
//! 4. packager specific properties, repository tap included
//! 5. the packager's extra properties, templated against everything above
//! 6. the reverse repository host fallback
//!
//! A pair without candidate artifacts yields an empty context and must not be
//! processed any further.

use super::{candidates::candidate_artifacts, context::ReleaseContext};
use crate::release::{
    error::Result,
    platform::{self, ToolProcessor},
    props::{PropertyContext, capitalize, keys},
    settings::{
        Algorithm, Artifact, Distribution, Packager, file_type, platform::split_os_arch,
        prefixed_properties,
    },
    templates,
};
use serde_json::{Map, Value};

/// Builds the properties of `packager` for `distribution`.
pub fn fill_props(
    ctx: &ReleaseContext,
    distribution: &Distribution,
    packager: &Packager,
    processor: &dyn ToolProcessor,
) -> Result<PropertyContext> {
    let mut props = ctx.model().props()?;
    log::debug!("filling distribution properties");
    props.put_all(&distribution.props());

    log::debug!("filling release service properties");
    let service_props = ctx.props()?;
    props.put_all(&service_props);

    log::debug!("filling artifact properties");
    let candidates = candidate_artifacts(&distribution.artifacts, distribution.distribution_type, packager);
    if candidates.is_empty() {
        log::warn!(
            "no matching artifacts for {} in distribution {}",
            capitalize(packager.name()),
            distribution.name
        );
        return Ok(PropertyContext::new());
    }
    add_artifacts(ctx, distribution, packager, &candidates, &mut props)?;

    let packager_type = packager.packager_type();
    props.put(
        keys::PREPARE_DIRECTORY,
        ctx.prepare_directory(&distribution.name, packager_type)
            .display()
            .to_string(),
    );
    props.put(
        keys::PACKAGE_DIRECTORY,
        ctx.package_directory(&distribution.name, packager_type)
            .display()
            .to_string(),
    );

    log::debug!("filling {} properties", packager.name());
    platform::tap::fill_props(ctx, packager, &mut props)?;
    processor.fill_props(ctx, distribution, packager, &mut props)?;

    let extra = prefixed_properties(packager.name(), &packager.common.extra_properties);
    templates::apply_templates(&mut props, &extra)?;

    if props.reverse_repo_host().trim().is_empty() {
        if let Some(host) = packager.common.extra_properties.get(keys::REVERSE_REPO_HOST) {
            props.put(keys::REVERSE_REPO_HOST, host.clone());
        }
    }
    Ok(props)
}

/// Key qualifier for a platform tag: `osx-x86_64` becomes `OsxX86_64`.
pub fn platform_qualifier(platform: &str) -> String {
    platform
        .split('-')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// Splits `file_name` around the version it contains.
///
/// The effective version is tried first, then the raw one. Without a match
/// both parts are empty.
pub fn split_name_version(file_name: &str, effective_version: &str, version: &str) -> (String, String) {
    let mut found = (String::new(), String::new());
    for candidate in [effective_version, version] {
        if candidate.is_empty() {
            continue;
        }
        if let Some(index) = file_name.find(candidate) {
            let name = file_name[..index].trim_end_matches('-');
            found = (name.to_string(), candidate.to_string());
            // A blank name retries with the raw version.
            if !name.is_empty() {
                break;
            }
        }
    }
    found
}

/// Values describing one candidate artifact, keyed without prefix.
struct ArtifactValues {
    platform: String,
    platform_replaced: String,
    name: String,
    version: String,
    os: String,
    arch: String,
    file: String,
    file_name: String,
    file_extension: String,
    file_format: String,
    size: u64,
    url: String,
    path: String,
    checksums: Vec<(Algorithm, String)>,
}

impl ArtifactValues {
    /// `(suffix, value)` pairs shared by every key family.
    fn entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = vec![
            ("Name".into(), self.name.clone().into()),
            ("Version".into(), self.version.clone().into()),
            ("Os".into(), self.os.clone().into()),
            ("Arch".into(), self.arch.clone().into()),
            ("File".into(), self.file.clone().into()),
            ("Size".into(), self.size.into()),
            ("FileName".into(), self.file_name.clone().into()),
            ("FileExtension".into(), self.file_extension.clone().into()),
            ("FileFormat".into(), self.file_format.clone().into()),
        ];
        for (algorithm, digest) in &self.checksums {
            entries.push((format!("Checksum{}", algorithm.key_suffix()), digest.clone().into()));
        }
        entries.push(("Url".into(), self.url.clone().into()));
        entries
    }

    /// Object appended to the `artifacts` list.
    fn to_object(&self) -> Value {
        let mut object = Map::new();
        object.insert("platform".into(), self.platform.clone().into());
        object.insert("platformReplaced".into(), self.platform_replaced.clone().into());
        object.insert("path".into(), self.path.clone().into());
        for (suffix, value) in self.entries() {
            let mut chars = suffix.chars();
            let key = match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
                None => suffix,
            };
            object.insert(key, value);
        }
        Value::Object(object)
    }
}

fn add_artifacts(
    ctx: &ReleaseContext,
    distribution: &Distribution,
    packager: &Packager,
    candidates: &[&Artifact],
    props: &mut PropertyContext,
) -> Result<()> {
    let project_version = ctx.model().project.version().to_string();
    let effective_version = props.effective_version();
    let mut algorithms = ctx.model().checksum.algorithms();
    if !algorithms.contains(&Algorithm::Sha256) {
        algorithms.push(Algorithm::Sha256);
    }
    let url_template = packager
        .common
        .download_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| ctx.model().release.download_url_template());

    let mut listed = Vec::new();
    for (index, artifact) in candidates.iter().enumerate() {
        let platform = artifact.platform().to_string();
        let platform_replaced = distribution.platform.apply_replacements(&platform);
        let qualifiers = {
            let mut q = vec![platform_qualifier(&platform)];
            let replaced = platform_qualifier(&platform_replaced);
            if !q.contains(&replaced) {
                q.push(replaced);
            }
            q
        };

        for (key, value) in artifact
            .resolved_extra_properties(&format!("artifact{}", qualifiers[0]))
            .iter()
        {
            props.put_if_absent(key.clone(), value.clone());
        }

        let path = artifact.effective_path(ctx.basedir(), props)?;
        let size = ctx.checksums().size(&path)?;
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = file_type::file_name_without_extension(&file).to_string();
        let file_extension = file[file_name.len()..].to_string();
        let file_format = file_type::format_of(&file_extension).to_string();
        let (name, version) = split_name_version(&file_name, &effective_version, &project_version);
        let (os, arch) = split_os_arch(&platform);

        let mut checksums = Vec::new();
        for algorithm in &algorithms {
            checksums.push((*algorithm, ctx.checksums().checksum(&path, *algorithm)?));
        }

        let mut url_props = props.clone();
        url_props.put(keys::ARTIFACT_FILE, file.as_str());
        url_props.put(keys::ARTIFACT_FILE_NAME, file_name.as_str());
        url_props.put(keys::ARTIFACT_NAME, name.as_str());
        url_props.put(keys::ARTIFACT_VERSION, version.as_str());
        url_props.put(keys::ARTIFACT_OS, os.as_str());
        url_props.put(keys::ARTIFACT_ARCH, arch.as_str());
        url_props.put(keys::ARTIFACT_PLATFORM, platform.as_str());
        let url = match &url_template {
            Some(template) => templates::render_str("download url", template, &url_props)?,
            None => String::new(),
        };

        let values = ArtifactValues {
            platform,
            platform_replaced,
            name,
            version,
            os,
            arch,
            file,
            file_name,
            file_extension,
            file_format,
            size,
            url,
            path: path.display().to_string(),
            checksums,
        };

        for qualifier in &qualifiers {
            for (suffix, value) in values.entries() {
                props.put_if_absent(format!("artifact{}{}", qualifier, suffix), value);
            }
        }

        let uploaders: Vec<_> = ctx.model().upload.iter().filter(|u| u.is_enabled()).collect();
        for uploader in &uploaders {
            if let Some(download) = ctx.services().uploader.resolve_download_url(uploader, &url_props)? {
                for qualifier in &qualifiers {
                    props.put(uploader.url_key(&format!("artifact{}", qualifier)), download.as_str());
                }
                if index == 0 {
                    props.put(uploader.url_key("distribution"), download.as_str());
                }
            }
        }

        if index == 0 {
            put_primary(props, &values);
            let mut own = artifact.resolved_extra_properties("");
            let source = own.clone();
            templates::apply_templates(&mut own, &source)?;
            for (key, value) in own.iter() {
                props.put_if_absent(key.clone(), value.clone());
            }
        }
        listed.push(values.to_object());
    }
    props.put(keys::ARTIFACTS, Value::Array(listed));
    Ok(())
}

/// The canonical single-artifact view: `distribution*` and unqualified
/// `artifact*` keys.
fn put_primary(props: &mut PropertyContext, values: &ArtifactValues) {
    props.put(keys::DISTRIBUTION_ARTIFACT, values.path.as_str());
    props.put(keys::DISTRIBUTION_URL, values.url.as_str());
    props.put(keys::DISTRIBUTION_SIZE, values.size);
    for (algorithm, digest) in &values.checksums {
        if *algorithm == Algorithm::Sha256 {
            props.put(keys::DISTRIBUTION_SHA_256, digest.as_str());
        }
        props.put(format!("distributionChecksum{}", algorithm.key_suffix()), digest.as_str());
    }

    for prefix in ["distributionArtifact", "artifact"] {
        props.put(format!("{}Platform", prefix), values.platform.as_str());
        props.put(format!("{}PlatformReplaced", prefix), values.platform_replaced.as_str());
        for (suffix, value) in values.entries() {
            props.put(format!("{}{}", prefix, suffix), value);
        }
    }
}
