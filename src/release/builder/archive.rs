//! Listing the contents of distribution archives.
//!
//! RPM specs enumerate every installed file, so the spec packager needs the
//! layout of the artifact it wraps. Paths are reported relative to the
//! archive's single top-level directory.

use crate::release::{
    error::{ErrorExt, Result},
    settings::file_type,
};
use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, Read},
    path::{Component, Path, PathBuf},
};
use zip::ZipArchive;

/// Layout of an archive below its top-level directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveListing {
    /// Every directory, parents before children.
    pub directories: Vec<String>,
    /// File names directly under `bin/`.
    pub binaries: Vec<String>,
    /// Every other file.
    pub files: Vec<String>,
}

struct RawEntry {
    path: PathBuf,
    is_dir: bool,
}

/// Lists `archive`. Formats without a reader yield an empty listing.
pub fn list(archive: &Path) -> Result<ArchiveListing> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let entries = match file_type::extension_of(&name) {
        Some(".zip") | Some(".jar") => zip_entries(archive)?,
        Some(".tar") => {
            let file = File::open(archive).fs_context("opening archive", archive)?;
            tar_entries(BufReader::new(file), archive)?
        }
        Some(".tar.gz") | Some(".tgz") => {
            let file = File::open(archive).fs_context("opening archive", archive)?;
            tar_entries(flate2::read::GzDecoder::new(BufReader::new(file)), archive)?
        }
        other => {
            log::warn!(
                "cannot list {} archives, {} is described without its contents",
                other.unwrap_or("unknown"),
                name
            );
            return Ok(ArchiveListing::default());
        }
    };
    Ok(layout(entries))
}

fn tar_entries<R: Read>(reader: R, archive: &Path) -> Result<Vec<RawEntry>> {
    let mut tar = tar::Archive::new(reader);
    let mut entries = Vec::new();
    for entry in tar.entries().fs_context("reading tar entries", archive)? {
        let entry = entry.fs_context("reading tar entry", archive)?;
        let path = entry.path().fs_context("reading tar entry path", archive)?.into_owned();
        entries.push(RawEntry {
            path,
            is_dir: entry.header().entry_type().is_dir(),
        });
    }
    Ok(entries)
}

fn zip_entries(archive: &Path) -> Result<Vec<RawEntry>> {
    let file = File::open(archive).fs_context("opening archive", archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let mut entries = Vec::new();
    for index in 0..zip.len() {
        let file = zip.by_index(index)?;
        let Some(path) = file.enclosed_name() else {
            continue;
        };
        entries.push(RawEntry {
            path,
            is_dir: file.is_dir(),
        });
    }
    Ok(entries)
}

/// Drops the top-level directory and sorts what remains into the listing.
fn layout(entries: Vec<RawEntry>) -> ArchiveListing {
    let mut directories = BTreeSet::new();
    let mut binaries = BTreeSet::new();
    let mut files = BTreeSet::new();

    for entry in entries {
        let parts: Vec<String> = entry
            .path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .skip(1)
            .collect();
        if parts.is_empty() {
            continue;
        }

        let parent_depth = if entry.is_dir { parts.len() } else { parts.len() - 1 };
        for depth in 1..=parent_depth {
            directories.insert(parts[..depth].join("/"));
        }
        if entry.is_dir {
            continue;
        }
        if parts.len() == 2 && parts[0] == "bin" {
            binaries.insert(parts[1].clone());
        } else {
            files.insert(parts.join("/"));
        }
    }

    ArchiveListing {
        directories: directories.into_iter().collect(),
        binaries: binaries.into_iter().collect(),
        files: files.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn tar_gz_layout_below_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app-1.0.0.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("app-1.0.0/bin/app", "#!/bin/sh"),
                ("app-1.0.0/lib/app.jar", "jar"),
                ("app-1.0.0/lib/ext/extra.jar", "jar"),
                ("app-1.0.0/LICENSE", "MIT"),
            ],
        );

        let listing = list(&archive).unwrap();
        assert_eq!(listing.binaries, vec!["app"]);
        assert_eq!(listing.directories, vec!["bin", "lib", "lib/ext"]);
        assert_eq!(
            listing.files,
            vec!["LICENSE", "lib/app.jar", "lib/ext/extra.jar"]
        );
    }

    #[test]
    fn zip_layout_without_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app.zip");
        let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("app/bin/app.bat", options).unwrap();
        zip.write_all(b"@echo off").unwrap();
        zip.start_file("app/README.md", options).unwrap();
        zip.write_all(b"readme").unwrap();
        zip.finish().unwrap();

        let listing = list(&archive).unwrap();
        assert_eq!(listing.binaries, vec!["app.bat"]);
        assert_eq!(listing.directories, vec!["bin"]);
        assert_eq!(listing.files, vec!["README.md"]);
    }

    #[test]
    fn unreadable_formats_list_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app.tar.xz");
        std::fs::write(&archive, "xz").unwrap();
        assert_eq!(list(&archive).unwrap(), ArchiveListing::default());
    }
}
