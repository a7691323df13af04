use crate::domain::SemanticVersion;
use crate::error::{RollError, Result};
use regex::Regex;

/// Shape of `git describe --tags --long` output for a version tag.
/// Anchored at the start only, so a trailing `-dirty` suffix is tolerated.
const DESCRIBE_PATTERN: &str = r"^v([0-9]+)\.([0-9]+)\.([0-9]+)-([0-9]+)-g([0-9a-f]+)";

/// Nearest version tag of a commit, plus how far the commit is from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescription {
    pub version: SemanticVersion,
    pub commits_since_tag: u32,
    pub commit_hash: String,
}

impl TagDescription {
    /// Parse a describe string such as `v1.4.2-3-gabc1234`
    pub fn parse(describe: &str) -> Result<Self> {
        let re = Regex::new(DESCRIBE_PATTERN).map_err(|e| RollError::parse(e.to_string()))?;

        let captures = re.captures(describe.trim()).ok_or_else(|| {
            RollError::parse(format!(
                "'{}' does not match v<major>.<minor>.<patch>-<commits>-g<hash>",
                describe.trim()
            ))
        })?;

        let number = |index: usize, what: &str| -> Result<u32> {
            let text = captures.get(index).map(|m| m.as_str()).unwrap_or_default();
            text.parse::<u32>().map_err(|_| {
                RollError::parse(format!("Invalid {} '{}' in '{}'", what, text, describe))
            })
        };

        // Every component must have a successor so that increment stays total
        let component = |index: usize, what: &str| -> Result<u32> {
            let value = number(index, what)?;
            if value == u32::MAX {
                return Err(RollError::parse(format!(
                    "{} {} in '{}' cannot be incremented",
                    what, value, describe
                )));
            }
            Ok(value)
        };

        let version = SemanticVersion::new(
            component(1, "major version")?,
            component(2, "minor version")?,
            component(3, "patch version")?,
        );
        let commits_since_tag = number(4, "commit count")?;
        let commit_hash = captures
            .get(5)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(TagDescription {
            version,
            commits_since_tag,
            commit_hash,
        })
    }

    /// True when the described commit is itself the tagged commit
    pub fn is_tagged_commit(&self) -> bool {
        self.commits_since_tag == 0
    }
}
