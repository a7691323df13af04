//! Archive publishing backends
//!
//! The release gate only cares whether the publisher grants access and
//! whether a publish succeeded; everything else is up to the backend.
//!
//! - [command::CommandPublisher]: runs external commands (e.g. a cloud upload script)
//! - [directory::DirectoryPublisher]: copies an artifact into a release directory
//!   and maintains its `releases.json` manifest
//! - [mock::MockPublisher]: scripted backend for tests

pub mod command;
pub mod directory;
pub mod mock;

pub use command::CommandPublisher;
pub use directory::DirectoryPublisher;
pub use mock::MockPublisher;

use crate::config::{PublishBackend, PublishConfig};
use crate::domain::SemanticVersion;
use crate::error::{RollError, Result};

/// What is being published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: SemanticVersion,
    pub tag: String,
    /// Full hash of the tagged commit
    pub commit: String,
    pub channel: String,
}

pub trait ArchivePublisher {
    /// Verify the operator may publish, before anything is tagged
    ///
    /// Failures are reported as [RollError::Access].
    fn check_access(&self) -> Result<()>;

    /// Publish the release artifacts
    ///
    /// Failures are reported as [RollError::Publish].
    fn publish(&self, release: &Release) -> Result<()>;
}

/// Stands in when no publisher could be configured; every call fails.
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Unavailable {
            reason: reason.into(),
        }
    }
}

impl ArchivePublisher for Unavailable {
    fn check_access(&self) -> Result<()> {
        Err(RollError::config(self.reason.clone()))
    }

    fn publish(&self, _release: &Release) -> Result<()> {
        Err(RollError::config(self.reason.clone()))
    }
}

/// Build the configured publisher.
///
/// # Returns
/// * `Err(RollError::Config)` - no `[publish]` section, or the selected
///   backend is missing a required setting
pub fn from_config(config: Option<&PublishConfig>) -> Result<Box<dyn ArchivePublisher>> {
    let config = config.ok_or_else(|| {
        RollError::config("No [publish] section configured; cannot publish a release")
    })?;

    match config.backend {
        PublishBackend::Command => {
            if config.command.is_empty() {
                return Err(RollError::config(
                    "publish.command must name the program that publishes a release",
                ));
            }
            Ok(Box::new(CommandPublisher::new(
                config.access_check.clone(),
                config.command.clone(),
            )))
        }
        PublishBackend::Directory => {
            let artifact = config.artifact.clone().ok_or_else(|| {
                RollError::config("publish.artifact is required for the directory backend")
            })?;
            let destination = config.destination.clone().ok_or_else(|| {
                RollError::config("publish.destination is required for the directory backend")
            })?;
            Ok(Box::new(DirectoryPublisher::new(artifact, destination)))
        }
    }
}
