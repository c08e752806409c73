//! Packager configuration shared by every packager kind.

use super::{
    Active, Brew, Chocolatey, CommitAuthor, DistributionType, Docker, EnabledState, ExtraProperties,
    Gofish, Jbang, Macports, RepositoryTap, Scoop, Sdkman, Snap, Spec, inherit, inherit_list,
    inherit_text, merge_extra_properties, project::Project,
};
use crate::release::props::capitalize;
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Every supported package manager or channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackagerType {
    Brew,
    Chocolatey,
    Docker,
    Gofish,
    Jbang,
    Macports,
    Scoop,
    Sdkman,
    Snap,
    Spec,
}

impl PackagerType {
    pub const ALL: [PackagerType; 10] = [
        PackagerType::Brew,
        PackagerType::Chocolatey,
        PackagerType::Docker,
        PackagerType::Gofish,
        PackagerType::Jbang,
        PackagerType::Macports,
        PackagerType::Scoop,
        PackagerType::Sdkman,
        PackagerType::Snap,
        PackagerType::Spec,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackagerType::Brew => "brew",
            PackagerType::Chocolatey => "chocolatey",
            PackagerType::Docker => "docker",
            PackagerType::Gofish => "gofish",
            PackagerType::Jbang => "jbang",
            PackagerType::Macports => "macports",
            PackagerType::Scoop => "scoop",
            PackagerType::Sdkman => "sdkman",
            PackagerType::Snap => "snap",
            PackagerType::Spec => "spec",
        }
    }

    /// Artifact extra property that excludes the artifact: `skipBrew`.
    pub fn skip_key(self) -> String {
        format!("skip{}", capitalize(self.as_str()))
    }
}

impl fmt::Display for PackagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        PackagerType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown packager `{}`", s))
    }
}

/// Attributes every packager carries.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct PackagerCommon {
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    pub continue_on_error: Option<bool>,
    /// Overrides the release service download URL template.
    pub download_url: Option<String>,
    pub extra_properties: ExtraProperties,
    pub template_directory: Option<String>,
    /// Template file names that are not materialized.
    pub skip_templates: Vec<String>,
    pub commit_author: CommitAuthor,
}

impl PackagerCommon {
    pub fn merge_from(&mut self, parent: &PackagerCommon) {
        inherit(&mut self.active, &parent.active);
        inherit(&mut self.continue_on_error, &parent.continue_on_error);
        inherit_text(&mut self.download_url, &parent.download_url);
        inherit_text(&mut self.template_directory, &parent.template_directory);
        inherit_list(&mut self.skip_templates, &parent.skip_templates);
        merge_extra_properties(&mut self.extra_properties, &parent.extra_properties);
        self.commit_author.merge_from(&parent.commit_author);
    }

    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error.unwrap_or(false)
    }
}

/// Variant specific behavior of a packager configuration.
pub trait PackagerConfig {
    fn packager_type(&self) -> PackagerType;

    /// Extensions accepted for `distribution_type`, in order of preference.
    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str];

    fn supports_distribution(&self, distribution_type: DistributionType) -> bool {
        !self.supported_extensions(distribution_type).is_empty()
    }

    /// Whether an artifact tagged with `platform` can be handled. Blank tags
    /// are passed as empty strings.
    fn supports_platform(&self, platform: &str) -> bool;

    /// Whether publishing makes sense for snapshot releases.
    fn supports_snapshot(&self) -> bool {
        false
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        None
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        None
    }

    /// Fills fields left unset from the global configuration.
    fn merge_from(&mut self, parent: &Self)
    where
        Self: Sized;
}

/// Configuration of one packager kind.
#[derive(Debug, Clone)]
pub enum PackagerKind {
    Brew(Brew),
    Chocolatey(Chocolatey),
    Docker(Docker),
    Gofish(Gofish),
    Jbang(Jbang),
    Macports(Macports),
    Scoop(Scoop),
    Sdkman(Sdkman),
    Snap(Snap),
    Spec(Spec),
}

macro_rules! dispatch {
    ($kind:expr, $config:ident => $body:expr) => {
        match $kind {
            PackagerKind::Brew($config) => $body,
            PackagerKind::Chocolatey($config) => $body,
            PackagerKind::Docker($config) => $body,
            PackagerKind::Gofish($config) => $body,
            PackagerKind::Jbang($config) => $body,
            PackagerKind::Macports($config) => $body,
            PackagerKind::Scoop($config) => $body,
            PackagerKind::Sdkman($config) => $body,
            PackagerKind::Snap($config) => $body,
            PackagerKind::Spec($config) => $body,
        }
    };
}

impl PackagerKind {
    pub fn new(packager_type: PackagerType) -> Self {
        match packager_type {
            PackagerType::Brew => PackagerKind::Brew(Brew::default()),
            PackagerType::Chocolatey => PackagerKind::Chocolatey(Chocolatey::default()),
            PackagerType::Docker => PackagerKind::Docker(Docker::default()),
            PackagerType::Gofish => PackagerKind::Gofish(Gofish::default()),
            PackagerType::Jbang => PackagerKind::Jbang(Jbang::default()),
            PackagerType::Macports => PackagerKind::Macports(Macports::default()),
            PackagerType::Scoop => PackagerKind::Scoop(Scoop::default()),
            PackagerType::Sdkman => PackagerKind::Sdkman(Sdkman::default()),
            PackagerType::Snap => PackagerKind::Snap(Snap::default()),
            PackagerType::Spec => PackagerKind::Spec(Spec::default()),
        }
    }

    fn config(&self) -> &dyn PackagerConfig {
        dispatch!(self, c => c as &dyn PackagerConfig)
    }

    fn config_mut(&mut self) -> &mut dyn PackagerConfig {
        dispatch!(self, c => c as &mut dyn PackagerConfig)
    }

    /// Merges `parent` into `self`. Kinds that differ are left untouched.
    fn merge_from(&mut self, parent: &PackagerKind) {
        match (self, parent) {
            (PackagerKind::Brew(c), PackagerKind::Brew(p)) => c.merge_from(p),
            (PackagerKind::Chocolatey(c), PackagerKind::Chocolatey(p)) => c.merge_from(p),
            (PackagerKind::Docker(c), PackagerKind::Docker(p)) => c.merge_from(p),
            (PackagerKind::Gofish(c), PackagerKind::Gofish(p)) => c.merge_from(p),
            (PackagerKind::Jbang(c), PackagerKind::Jbang(p)) => c.merge_from(p),
            (PackagerKind::Macports(c), PackagerKind::Macports(p)) => c.merge_from(p),
            (PackagerKind::Scoop(c), PackagerKind::Scoop(p)) => c.merge_from(p),
            (PackagerKind::Sdkman(c), PackagerKind::Sdkman(p)) => c.merge_from(p),
            (PackagerKind::Snap(c), PackagerKind::Snap(p)) => c.merge_from(p),
            (PackagerKind::Spec(c), PackagerKind::Spec(p)) => c.merge_from(p),
            _ => {}
        }
    }
}

/// A packager attached to a distribution or declared globally.
#[derive(Debug, Clone)]
pub struct Packager {
    pub common: PackagerCommon,
    pub kind: PackagerKind,
}

impl Packager {
    pub fn new(packager_type: PackagerType) -> Self {
        Self {
            common: PackagerCommon::default(),
            kind: PackagerKind::new(packager_type),
        }
    }

    pub fn packager_type(&self) -> PackagerType {
        self.kind.config().packager_type()
    }

    pub fn name(&self) -> &'static str {
        self.packager_type().as_str()
    }

    pub fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        self.kind.config().supported_extensions(distribution_type)
    }

    pub fn supports_distribution(&self, distribution_type: DistributionType) -> bool {
        self.kind.config().supports_distribution(distribution_type)
    }

    pub fn supports_platform(&self, platform: &str) -> bool {
        self.kind.config().supports_platform(platform)
    }

    pub fn supports_snapshot(&self) -> bool {
        self.kind.config().supports_snapshot()
    }

    pub fn skip_key(&self) -> String {
        self.packager_type().skip_key()
    }

    pub fn tap(&self) -> Option<&RepositoryTap> {
        self.kind.config().tap()
    }

    pub fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        self.kind.config_mut().tap_mut()
    }

    /// Layers this packager over `parent`. Applying it twice changes nothing.
    pub fn merge_from(&mut self, parent: &Packager) {
        self.common.merge_from(&parent.common);
        self.kind.merge_from(&parent.kind);
    }

    /// Resolves `enabled` once. Packagers default to `NEVER` and are never
    /// enabled for a distribution type they can't handle.
    pub fn resolve_enabled(&mut self, project: &Project, distribution_type: DistributionType) -> bool {
        let active = *self.common.active.get_or_insert(Active::Never);
        let supported = self.supports_distribution(distribution_type);
        self.common
            .enabled
            .resolve(|| supported && active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.common.enabled.is_enabled()
    }

    pub fn disable(&mut self) {
        self.common.active = Some(Active::Never);
        self.common.enabled.disable();
    }

    pub fn continue_on_error(&self) -> bool {
        self.common.continue_on_error()
    }
}

/// Packagers keyed by type, iterated in a fixed order.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(from = "PackagersSection")]
pub struct Packagers {
    entries: BTreeMap<PackagerType, Packager>,
}

impl Packagers {
    /// One default packager of every kind.
    pub fn with_defaults() -> Self {
        Self {
            entries: PackagerType::ALL
                .into_iter()
                .map(|t| (t, Packager::new(t)))
                .collect(),
        }
    }

    pub fn get(&self, packager_type: PackagerType) -> Option<&Packager> {
        self.entries.get(&packager_type)
    }

    pub fn get_mut(&mut self, packager_type: PackagerType) -> Option<&mut Packager> {
        self.entries.get_mut(&packager_type)
    }

    /// Returns the packager of `packager_type`, inserting a default one.
    pub fn get_or_insert(&mut self, packager_type: PackagerType) -> &mut Packager {
        self.entries
            .entry(packager_type)
            .or_insert_with(|| Packager::new(packager_type))
    }

    pub fn insert(&mut self, packager: Packager) {
        self.entries.insert(packager.packager_type(), packager);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packager> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Packager> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration section for one packager kind.
#[derive(Debug, serde::Deserialize)]
struct Section<T> {
    #[serde(flatten)]
    common: PackagerCommon,
    #[serde(flatten)]
    config: T,
}

/// Wire layout of `[packagers]` and `[distributions.packagers]`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PackagersSection {
    brew: Option<Section<Brew>>,
    chocolatey: Option<Section<Chocolatey>>,
    docker: Option<Section<Docker>>,
    gofish: Option<Section<Gofish>>,
    jbang: Option<Section<Jbang>>,
    macports: Option<Section<Macports>>,
    scoop: Option<Section<Scoop>>,
    sdkman: Option<Section<Sdkman>>,
    snap: Option<Section<Snap>>,
    spec: Option<Section<Spec>>,
}

impl From<PackagersSection> for Packagers {
    fn from(section: PackagersSection) -> Self {
        fn add<T>(packagers: &mut Packagers, section: Option<Section<T>>, wrap: fn(T) -> PackagerKind) {
            if let Some(Section { common, config }) = section {
                packagers.insert(Packager {
                    common,
                    kind: wrap(config),
                });
            }
        }

        let mut packagers = Packagers::default();
        add(&mut packagers, section.brew, PackagerKind::Brew);
        add(&mut packagers, section.chocolatey, PackagerKind::Chocolatey);
        add(&mut packagers, section.docker, PackagerKind::Docker);
        add(&mut packagers, section.gofish, PackagerKind::Gofish);
        add(&mut packagers, section.jbang, PackagerKind::Jbang);
        add(&mut packagers, section.macports, PackagerKind::Macports);
        add(&mut packagers, section.scoop, PackagerKind::Scoop);
        add(&mut packagers, section.sdkman, PackagerKind::Sdkman);
        add(&mut packagers, section.snap, PackagerKind::Snap);
        add(&mut packagers, section.spec, PackagerKind::Spec);
        packagers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn type_names_and_skip_keys() {
        assert_eq!("Brew".parse::<PackagerType>().unwrap(), PackagerType::Brew);
        assert!("nix".parse::<PackagerType>().is_err());
        assert_eq!(PackagerType::Macports.skip_key(), "skipMacports");
    }

    #[test]
    fn child_scalars_win_and_unset_ones_inherit() {
        let mut parent = Packager::new(PackagerType::Brew);
        parent.common.active = Some(Active::Always);
        parent.common.continue_on_error = Some(true);
        parent.common.download_url = Some("https://parent".into());

        let mut child = Packager::new(PackagerType::Brew);
        child.common.download_url = Some("https://child".into());
        child.merge_from(&parent);

        assert_eq!(child.common.active, Some(Active::Always));
        assert!(child.continue_on_error());
        assert_eq!(child.common.download_url.as_deref(), Some("https://child"));
    }

    #[test]
    fn merging_twice_equals_merging_once() {
        let mut parent = Packager::new(PackagerType::Spec);
        parent.common.skip_templates = vec!["README.md.tpl".into()];
        parent
            .common
            .extra_properties
            .insert("a".into(), Value::from(1));

        let mut once = Packager::new(PackagerType::Spec);
        once.common
            .extra_properties
            .insert("a".into(), Value::from(2));
        once.merge_from(&parent);
        let mut twice = once.clone();
        twice.merge_from(&parent);

        assert_eq!(once.common.skip_templates, twice.common.skip_templates);
        assert_eq!(once.common.extra_properties, twice.common.extra_properties);
        assert_eq!(twice.common.extra_properties["a"], 2);
    }

    #[test]
    fn unsupported_distribution_never_enables() {
        let project = Project::for_tests("app", "1.0.0");
        let mut sdkman = Packager::new(PackagerType::Sdkman);
        sdkman.common.active = Some(Active::Always);
        assert!(!sdkman.resolve_enabled(&project, DistributionType::Binary));

        let mut brew = Packager::new(PackagerType::Brew);
        assert!(!brew.resolve_enabled(&project, DistributionType::Binary));
        assert_eq!(brew.common.active, Some(Active::Never));
    }

    #[test]
    fn sections_deserialize_common_and_variant_fields() {
        let packagers: Packagers = toml::from_str(
            r#"
            [snap]
            active = "ALWAYS"
            continue_on_error = true
            grade = "devel"

            [scoop]
            bucket = { name = "my-bucket" }
            "#,
        )
        .unwrap();

        assert_eq!(packagers.len(), 2);
        let snap = packagers.get(PackagerType::Snap).unwrap();
        assert!(snap.continue_on_error());
        match &snap.kind {
            PackagerKind::Snap(s) => assert_eq!(s.grade.as_deref(), Some("devel")),
            other => panic!("unexpected {:?}", other),
        }
        let scoop = packagers.get(PackagerType::Scoop).unwrap();
        assert_eq!(scoop.tap().and_then(|t| t.name.as_deref()), Some("my-bucket"));
    }
}
