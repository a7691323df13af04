//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! operations the release gate needs, allowing the gate to run against a
//! real repository or against an in-memory mock in tests.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A recording mock for testing
//!
//! # Usage
//!
//! ```rust
//! # use roll_dev::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> roll_dev::Result<()> {
//! let describe = repo.describe_tags("HEAD")?;
//! let commit = repo.rev_parse("HEAD")?;
//! repo.create_tag("v1.5.0", &commit)?;
//! # let _ = describe;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockRepository, RepoCall};
pub use repository::Git2Repository;

use crate::error::Result;

/// Version-control operations consumed by the release gate
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures (like `git2::Error`) to [crate::error::RollError]
/// variants, keeping the underlying message so it can be shown to the
/// operator.
pub trait Repository {
    /// Fetch URL of the named remote
    ///
    /// # Returns
    /// * `Ok(Some(url))` - The remote exists and has a URL
    /// * `Ok(None)` - No such remote, or it has no (UTF-8) URL
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    /// Paths with uncommitted changes, untracked files included.
    ///
    /// An empty list means the working tree is clean.
    fn dirty_paths(&self) -> Result<Vec<String>>;

    /// Fetch all branches and tags from a remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Hard-reset the current branch, index and working tree to a revision
    fn reset_hard(&self, rev: &str) -> Result<()>;

    /// Describe a revision against the nearest `v*.*.*` tag on its first-parent
    /// history, always in long format
    ///
    /// Produces strings like `v1.4.2-3-gabc1234`; a tagged commit yields a
    /// distance of `0` rather than the bare tag name.
    fn describe_tags(&self, rev: &str) -> Result<String>;

    /// Resolve a revision to a full commit hash
    fn rev_parse(&self, rev: &str) -> Result<String>;

    /// Create a lightweight tag pointing at a revision
    ///
    /// Fails if the tag already exists.
    fn create_tag(&self, name: &str, rev: &str) -> Result<()>;

    /// Delete a local tag
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push `src` to the `dst` reference on a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g. "upstream")
    /// * `src` - Local reference to push (e.g. "refs/tags/v1.5.0", "HEAD")
    /// * `dst` - Remote reference to update (e.g. "refs/heads/dev")
    fn push_ref(&self, remote: &str, src: &str, dst: &str) -> Result<()>;
}
