use crate::error::{RollError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    /// Compute the next version for the given increment level.
    ///
    /// Components below the incremented one are reset to zero:
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    ///
    /// The incremented component must be below `u32::MAX`, which
    /// [TagDescription::parse](crate::domain::TagDescription::parse) guarantees.
    pub fn increment(&self, level: IncrementLevel) -> Self {
        match level {
            IncrementLevel::Major => SemanticVersion {
                major: self.major + 1,
                minor: 0,
                patch: 0,
            },
            IncrementLevel::Minor => SemanticVersion {
                major: self.major,
                minor: self.minor + 1,
                patch: 0,
            },
            IncrementLevel::Patch => SemanticVersion {
                major: self.major,
                minor: self.minor,
                patch: self.patch + 1,
            },
        }
    }

    /// Name of the lightweight tag for this version (e.g. "v1.5.0")
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl From<SemanticVersion> for semver::Version {
    fn from(version: SemanticVersion) -> Self {
        semver::Version::new(
            u64::from(version.major),
            u64::from(version.minor),
            u64::from(version.patch),
        )
    }
}

/// Which version component a roll increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementLevel {
    Major,
    Minor,
    Patch,
}

impl FromStr for IncrementLevel {
    type Err = RollError;

    /// Accepts "major"/"minor"/"patch" and the literal tokens "x"/"y"/"z"
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" | "x" => Ok(IncrementLevel::Major),
            "minor" | "y" => Ok(IncrementLevel::Minor),
            "patch" | "z" => Ok(IncrementLevel::Patch),
            other => Err(RollError::config(format!(
                "Unknown increment level '{}' (expected major, minor, patch, x, y or z)",
                other
            ))),
        }
    }
}

impl fmt::Display for IncrementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncrementLevel::Major => write!(f, "major"),
            IncrementLevel::Minor => write!(f, "minor"),
            IncrementLevel::Patch => write!(f, "patch"),
        }
    }
}
