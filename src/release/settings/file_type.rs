//! Known artifact file extensions.

/// Every extension the packagers understand. Multi-part extensions come
/// first so the longest match is found by a linear scan.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    ".tar.bz2", ".tar.gz", ".tar.xz", ".tbz2", ".tgz", ".txz", ".tar", ".zip", ".jar", ".dmg",
    ".pkg", ".msi", ".exe", ".deb", ".rpm", ".nupkg",
];

/// Returns the known extension `file` ends with, dot included.
pub fn extension_of(file: &str) -> Option<&'static str> {
    KNOWN_EXTENSIONS.iter().copied().find(|ext| file.ends_with(ext))
}

/// Strips a known extension from `file`. Unknown extensions are kept.
pub fn file_name_without_extension(file: &str) -> &str {
    match extension_of(file) {
        Some(ext) => &file[..file.len() - ext.len()],
        None => file,
    }
}

/// `.tar.gz` becomes `tar.gz`.
pub fn format_of(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}
