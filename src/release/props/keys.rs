//! Well-known property keys.
//!
//! The merge engine reads a handful of keys back out of the context. Those
//! reads go through the typed accessors below instead of string literals.

use super::PropertyContext;

pub const PROJECT_NAME: &str = "projectName";
pub const PROJECT_NAME_CAPITALIZED: &str = "projectNameCapitalized";
pub const PROJECT_VERSION: &str = "projectVersion";
pub const PROJECT_EFFECTIVE_VERSION: &str = "projectEffectiveVersion";
pub const PROJECT_SNAPSHOT: &str = "projectSnapshot";
pub const TIMESTAMP: &str = "timestamp";

pub const DISTRIBUTION_NAME: &str = "distributionName";
pub const DISTRIBUTION_TYPE: &str = "distributionType";
pub const DISTRIBUTION_EXECUTABLE: &str = "distributionExecutable";
pub const DISTRIBUTION_ARTIFACT: &str = "distributionArtifact";
pub const DISTRIBUTION_URL: &str = "distributionUrl";
pub const DISTRIBUTION_SIZE: &str = "distributionSize";
pub const DISTRIBUTION_SHA_256: &str = "distributionSha256";

pub const ARTIFACTS: &str = "artifacts";
pub const ARTIFACT_PLATFORM: &str = "artifactPlatform";
pub const ARTIFACT_PLATFORM_REPLACED: &str = "artifactPlatformReplaced";
pub const ARTIFACT_NAME: &str = "artifactName";
pub const ARTIFACT_VERSION: &str = "artifactVersion";
pub const ARTIFACT_OS: &str = "artifactOs";
pub const ARTIFACT_ARCH: &str = "artifactArch";
pub const ARTIFACT_FILE: &str = "artifactFile";
pub const ARTIFACT_FILE_NAME: &str = "artifactFileName";
pub const ARTIFACT_FILE_EXTENSION: &str = "artifactFileExtension";
pub const ARTIFACT_FILE_FORMAT: &str = "artifactFileFormat";

pub const REPO_HOST: &str = "repoHost";
pub const REPO_OWNER: &str = "repoOwner";
pub const REPO_NAME: &str = "repoName";
pub const REPO_BRANCH: &str = "repoBranch";
pub const REPO_CANONICAL_NAME: &str = "repoCanonicalName";
pub const REPO_URL: &str = "repoUrl";
pub const REPO_CLONE_URL: &str = "repoCloneUrl";
pub const TAG_NAME: &str = "tagName";
pub const RELEASE_NAME: &str = "releaseName";
pub const RELEASE_NOTES_URL: &str = "releaseNotesUrl";
pub const LATEST_RELEASE_URL: &str = "latestReleaseUrl";
pub const REVERSE_REPO_HOST: &str = "reverseRepoHost";

pub const PREPARE_DIRECTORY: &str = "prepareDirectory";
pub const PACKAGE_DIRECTORY: &str = "packageDirectory";

impl PropertyContext {
    pub fn project_name(&self) -> String {
        self.text(PROJECT_NAME)
    }

    pub fn project_version(&self) -> String {
        self.text(PROJECT_VERSION)
    }

    /// Snapshot label for snapshot builds, the plain version otherwise.
    pub fn effective_version(&self) -> String {
        self.text(PROJECT_EFFECTIVE_VERSION)
    }

    pub fn distribution_name(&self) -> String {
        self.text(DISTRIBUTION_NAME)
    }

    pub fn distribution_url(&self) -> String {
        self.text(DISTRIBUTION_URL)
    }

    /// File name of the primary candidate artifact.
    pub fn artifact_file(&self) -> String {
        self.text(ARTIFACT_FILE)
    }

    /// File name of the primary candidate artifact without its extension.
    pub fn artifact_file_name(&self) -> String {
        self.text(ARTIFACT_FILE_NAME)
    }

    pub fn artifact_name(&self) -> String {
        self.text(ARTIFACT_NAME)
    }

    pub fn tag_name(&self) -> String {
        self.text(TAG_NAME)
    }

    pub fn reverse_repo_host(&self) -> String {
        self.text(REVERSE_REPO_HOST)
    }
}
