use crate::error::{RollError, Result};
use crate::publish::{ArchivePublisher, Release};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the manifest kept at the root of the release directory
pub const MANIFEST_FILE_NAME: &str = "releases.json";

/// Index of everything published into a release directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    /// Channel name -> commit hash of the channel's current release
    #[serde(default)]
    pub current_release: BTreeMap<String, String>,

    /// Newest first
    #[serde(default)]
    pub releases: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub hash: String,
    pub channel: String,
    pub version: String,
    pub release_date: String,
    /// Archive path relative to the release directory
    pub archive: String,
}

impl ReleaseManifest {
    /// Read a manifest, or an empty one when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(ReleaseManifest::default());
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            RollError::publish(format!("Cannot parse {}: {}", path.display(), e))
        })
    }

    /// Write the manifest through a temporary file so readers never see a partial one
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| RollError::publish(format!("Cannot serialize manifest: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text + "\n")?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// The entry a channel currently points at
    pub fn current(&self, channel: &str) -> Option<&ReleaseEntry> {
        let hash = self.current_release.get(channel)?;
        self.releases
            .iter()
            .find(|entry| entry.channel == channel && &entry.hash == hash)
    }

    /// Record a new release and make it current for its channel.
    ///
    /// Rejects versions that do not move the channel forward.
    pub fn record(&mut self, entry: ReleaseEntry) -> Result<()> {
        let new_version = semver::Version::parse(&entry.version).map_err(|e| {
            RollError::publish(format!("Invalid version '{}': {}", entry.version, e))
        })?;

        if let Some(current) = self.current(&entry.channel) {
            let current_version = semver::Version::parse(&current.version).map_err(|e| {
                RollError::publish(format!(
                    "Manifest holds invalid version '{}' for channel {}: {}",
                    current.version, current.channel, e
                ))
            })?;
            if new_version <= current_version {
                return Err(RollError::publish(format!(
                    "{} is not newer than the current {} release {}",
                    new_version, entry.channel, current_version
                )));
            }
        }

        self.current_release
            .insert(entry.channel.clone(), entry.hash.clone());
        self.releases.insert(0, entry);
        Ok(())
    }
}

/// Publishes by copying one artifact into a directory tree:
/// `<destination>/<channel>/v<version>/<artifact file name>`
pub struct DirectoryPublisher {
    artifact: PathBuf,
    destination: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(artifact: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        DirectoryPublisher {
            artifact: artifact.into(),
            destination: destination.into(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.destination.join(MANIFEST_FILE_NAME)
    }

    fn archive_relative_path(&self, release: &Release) -> Result<PathBuf> {
        let file_name = self.artifact.file_name().ok_or_else(|| {
            RollError::publish(format!("{} has no file name", self.artifact.display()))
        })?;
        Ok(PathBuf::from(&release.channel)
            .join(&release.tag)
            .join(file_name))
    }
}

impl ArchivePublisher for DirectoryPublisher {
    fn check_access(&self) -> Result<()> {
        let metadata = fs::metadata(&self.destination).map_err(|e| {
            RollError::access(format!("{}: {}", self.destination.display(), e))
        })?;

        if !metadata.is_dir() {
            return Err(RollError::access(format!(
                "{} is not a directory",
                self.destination.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(RollError::access(format!(
                "{} is read-only",
                self.destination.display()
            )));
        }
        if !self.artifact.is_file() {
            return Err(RollError::access(format!(
                "Artifact {} does not exist",
                self.artifact.display()
            )));
        }
        Ok(())
    }

    fn publish(&self, release: &Release) -> Result<()> {
        let manifest_path = self.manifest_path();
        let mut manifest = ReleaseManifest::load(&manifest_path)?;

        let relative = self.archive_relative_path(release)?;
        let entry = ReleaseEntry {
            hash: release.commit.clone(),
            channel: release.channel.clone(),
            version: release.version.to_string(),
            release_date: chrono::Utc::now().to_rfc3339(),
            archive: relative.to_string_lossy().replace('\\', "/"),
        };
        // Validate against the manifest before touching the tree
        manifest.record(entry)?;

        let target = self.destination.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RollError::publish(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        fs::copy(&self.artifact, &target).map_err(|e| {
            RollError::publish(format!(
                "Cannot copy {} to {}: {}",
                self.artifact.display(),
                target.display(),
                e
            ))
        })?;
        log::info!("copied {} to {}", self.artifact.display(), target.display());

        manifest.save(&manifest_path)?;
        log::info!("updated {}", manifest_path.display());
        Ok(())
    }
}
