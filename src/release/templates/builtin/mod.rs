//! Templates compiled into the binary, used when a project ships none.

use crate::release::settings::PackagerType;

type Templates = &'static [(&'static str, &'static str)];

// Entries are sorted by name, matching the order of a directory walk.

const BREW: Templates = &[
    ("README.md.tpl", include_str!("brew/README.md.tpl")),
    ("cask.rb.tpl", include_str!("brew/cask.rb.tpl")),
    ("formula-multi.rb.tpl", include_str!("brew/formula-multi.rb.tpl")),
    ("formula.rb.tpl", include_str!("brew/formula.rb.tpl")),
];

const CHOCOLATEY: Templates = &[
    ("binary.nuspec.tpl", include_str!("chocolatey/binary.nuspec.tpl")),
    (
        "tools/chocolateyinstall.ps1.tpl",
        include_str!("chocolatey/tools/chocolateyinstall.ps1.tpl"),
    ),
];

const DOCKER: Templates = &[("Dockerfile.tpl", include_str!("docker/Dockerfile.tpl"))];

const GOFISH: Templates = &[("food.lua.tpl", include_str!("gofish/food.lua.tpl"))];

const JBANG: Templates = &[(
    "jbang-catalog.json.tpl",
    include_str!("jbang/jbang-catalog.json.tpl"),
)];

const MACPORTS: Templates = &[("Portfile.tpl", include_str!("macports/Portfile.tpl"))];

const SCOOP: Templates = &[("bucket.json.tpl", include_str!("scoop/bucket.json.tpl"))];

const SNAP: Templates = &[(
    "snap/snapcraft.yaml.tpl",
    include_str!("snap/snap/snapcraft.yaml.tpl"),
)];

const SPEC: Templates = &[("app.spec.tpl", include_str!("spec/app.spec.tpl"))];

/// Built-in templates of `packager_type` as `(name, content)` pairs.
pub fn builtin_templates(packager_type: PackagerType) -> Templates {
    match packager_type {
        PackagerType::Brew => BREW,
        PackagerType::Chocolatey => CHOCOLATEY,
        PackagerType::Docker => DOCKER,
        PackagerType::Gofish => GOFISH,
        PackagerType::Jbang => JBANG,
        PackagerType::Macports => MACPORTS,
        PackagerType::Scoop => SCOOP,
        PackagerType::Sdkman => &[],
        PackagerType::Snap => SNAP,
        PackagerType::Spec => SPEC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_templated_packager_ships_templates() {
        for packager_type in PackagerType::ALL {
            let templates = builtin_templates(packager_type);
            assert_eq!(templates.is_empty(), packager_type == PackagerType::Sdkman);
            let mut names: Vec<&str> = templates.iter().map(|(name, _)| *name).collect();
            let declared = names.clone();
            names.sort();
            assert_eq!(names, declared, "{} templates are not sorted", packager_type);
        }
    }
}
