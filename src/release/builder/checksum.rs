//! Artifact checksum calculation.
//!
//! Digests are computed at most once per (path, algorithm) per run and kept
//! in a [`ChecksumCache`] owned by the release context. The artifact entities
//! themselves are never mutated.
//!
//! [`write_checksum_files`] produces the published checksum files:
//! `<output>/checksums/<name>` with one `<digest>  <file>` line per artifact,
//! one such file per algorithm, plus `<file>.<alg>` files in individual mode.

use super::context::ReleaseContext;
use crate::release::{
    error::{ErrorExt, Result},
    settings::Algorithm,
};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::{
    cell::RefCell,
    collections::HashMap,
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

/// Calculates the hex encoded digest of a file.
pub fn calculate(path: &Path, algorithm: Algorithm) -> Result<String> {
    match algorithm {
        Algorithm::Md5 => {
            let content = fs::read(path).fs_context("reading file for hash calculation", path)?;
            Ok(format!("{:x}", md5::compute(content)))
        }
        Algorithm::Sha1 => digest_file::<Sha1>(path),
        Algorithm::Sha256 => digest_file::<Sha256>(path),
        Algorithm::Sha384 => digest_file::<Sha384>(path),
        Algorithm::Sha512 => digest_file::<Sha512>(path),
    }
}

/// Reads the file in 8KB chunks.
fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Per-run memo of digests and sizes.
#[derive(Debug, Default)]
pub struct ChecksumCache {
    digests: RefCell<HashMap<(PathBuf, Algorithm), String>>,
}

impl ChecksumCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checksum(&self, path: &Path, algorithm: Algorithm) -> Result<String> {
        let key = (path.to_path_buf(), algorithm);
        if let Some(digest) = self.digests.borrow().get(&key) {
            return Ok(digest.clone());
        }
        let digest = calculate(path, algorithm)?;
        self.digests.borrow_mut().insert(key, digest.clone());
        Ok(digest)
    }

    pub fn size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).fs_context("reading file metadata", path)?.len())
    }

    /// Number of digests computed so far.
    pub fn len(&self) -> usize {
        self.digests.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.borrow().is_empty()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes checksum files for `artifacts`, returning every file written.
pub fn write_checksum_files(ctx: &ReleaseContext, artifacts: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let checksum = &ctx.model().checksum;
    let directory = ctx.checksums_directory();
    fs::create_dir_all(&directory).fs_context("creating checksums directory", &directory)?;

    let mut written = Vec::new();
    for algorithm in checksum.algorithms() {
        let mut lines = String::new();
        for artifact in artifacts {
            let digest = ctx.checksums().checksum(artifact, algorithm)?;
            let name = file_name(artifact);
            lines.push_str(&format!("{}  {}\n", digest, name));

            if checksum.is_individual() {
                let individual = directory.join(format!("{}.{}", name, algorithm.formatted()));
                fs::write(&individual, format!("{}\n", digest))
                    .fs_context("writing checksum file", &individual)?;
                written.push(individual);
            }
        }

        let target = directory.join(checksum.resolved_name(algorithm));
        fs::write(&target, lines).fs_context("writing checksum file", &target)?;
        log::debug!("wrote {} digests to {}", algorithm, target.display());
        written.push(target);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abc.txt");
        fs::write(&file, "abc").unwrap();

        assert_eq!(
            calculate(&file, Algorithm::Md5).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            calculate(&file, Algorithm::Sha1).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            calculate(&file, Algorithm::Sha256).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn cache_computes_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.zip");
        fs::write(&file, "abc").unwrap();

        let cache = ChecksumCache::new();
        let first = cache.checksum(&file, Algorithm::Sha256).unwrap();
        fs::write(&file, "changed").unwrap();
        assert_eq!(cache.checksum(&file, Algorithm::Sha256).unwrap(), first);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size(&file).unwrap(), 7);
    }

    #[test]
    fn missing_file_is_a_tool_error() {
        let err = calculate(Path::new("/no/such/file"), Algorithm::Sha256).unwrap_err();
        assert_eq!(err.kind(), crate::release::ErrorKind::ToolExecution);
    }

    fn written_names(files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|f| file_name(f)).collect()
    }

    #[test]
    fn single_algorithm_uses_the_plain_name() {
        use crate::release::{builder::context::tests::context, services::recording::RecordingServices};

        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("app-1.0.0.zip");
        fs::write(&artifact, "abc").unwrap();
        let ctx = context(
            "[project]\nname = \"app\"\nversion = \"1.0.0\"\n[release]\nowner = \"acme\"\n",
            dir.path(),
            &RecordingServices::new(),
        );

        let files = write_checksum_files(&ctx, &[artifact]).unwrap();
        assert_eq!(written_names(&files), vec!["checksums.txt"]);
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  app-1.0.0.zip\n"
        );
    }

    #[test]
    fn several_algorithms_and_individual_files() {
        use crate::release::{builder::context::tests::context, services::recording::RecordingServices};

        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("app.zip");
        fs::write(&artifact, "abc").unwrap();
        let ctx = context(
            r#"
            [project]
            name = "app"
            version = "1.0.0"
            [release]
            owner = "acme"
            [checksum]
            individual = true
            algorithms = ["md5", "sha256"]
            "#,
            dir.path(),
            &RecordingServices::new(),
        );

        let files = write_checksum_files(&ctx, &[artifact]).unwrap();
        assert_eq!(
            written_names(&files),
            vec!["app.zip.md5", "checksums_md5.txt", "app.zip.sha256", "checksums_sha256.txt"]
        );
        assert_eq!(
            fs::read_to_string(ctx.checksums_directory().join("app.zip.md5")).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72\n"
        );
    }
}
