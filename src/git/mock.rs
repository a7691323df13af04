use crate::error::{RollError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A mutating repository operation, as recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Fetch { remote: String },
    ResetHard { rev: String },
    CreateTag { name: String, rev: String },
    DeleteTag { name: String },
    PushRef { remote: String, src: String, dst: String },
}

/// Mock repository for testing without actual git operations
///
/// Queries answer from configured state; mutating calls are recorded in
/// order so tests can assert on side-effect ordering.
pub struct MockRepository {
    remotes: HashMap<String, String>,
    dirty: Vec<String>,
    describe: Option<String>,
    revisions: HashMap<String, String>,
    tags: RefCell<HashMap<String, String>>,
    calls: RefCell<Vec<RepoCall>>,
    failing_pushes: HashSet<String>,
    fail_fetch: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            remotes: HashMap::new(),
            dirty: Vec::new(),
            describe: None,
            revisions: HashMap::new(),
            tags: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            failing_pushes: HashSet::new(),
            fail_fetch: false,
        }
    }

    /// Add a remote with the given URL
    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    /// Mark a path as modified in the working tree
    pub fn add_dirty_path(&mut self, path: impl Into<String>) {
        self.dirty.push(path.into());
    }

    /// Set the describe string returned for any revision
    pub fn set_describe(&mut self, describe: impl Into<String>) {
        self.describe = Some(describe.into());
    }

    /// Make a revision resolve to a commit hash
    pub fn add_revision(&mut self, rev: impl Into<String>, hash: impl Into<String>) {
        self.revisions.insert(rev.into(), hash.into());
    }

    /// Add an existing tag
    pub fn add_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.tags.get_mut().insert(name.into(), hash.into());
    }

    /// Make pushes to the given destination reference fail
    pub fn fail_push_to(&mut self, dst: impl Into<String>) {
        self.failing_pushes.insert(dst.into());
    }

    /// Make fetches fail
    pub fn fail_fetch(&mut self) {
        self.fail_fetch = true;
    }

    /// Mutating calls made so far, oldest first
    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.borrow().clone()
    }

    /// Names of the tags currently present
    pub fn tag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tags.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Pushes made so far as (src, dst) pairs
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                RepoCall::PushRef { src, dst, .. } => Some((src.clone(), dst.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RepoCall) {
        self.calls.borrow_mut().push(call);
    }

    fn resolve(&self, rev: &str) -> Result<String> {
        if let Some(hash) = self.revisions.get(rev) {
            return Ok(hash.clone());
        }
        // A full hash resolves to itself once it is known
        if self.revisions.values().any(|hash| hash == rev) {
            return Ok(rev.to_string());
        }
        Err(RollError::Git(git2::Error::from_str(&format!(
            "revspec '{}' not found",
            rev
        ))))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remotes.get(remote).cloned())
    }

    fn dirty_paths(&self) -> Result<Vec<String>> {
        Ok(self.dirty.clone())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.record(RepoCall::Fetch {
            remote: remote.to_string(),
        });
        if self.fail_fetch {
            return Err(RollError::Git(git2::Error::from_str("could not read from remote")));
        }
        Ok(())
    }

    fn reset_hard(&self, rev: &str) -> Result<()> {
        self.resolve(rev)?;
        self.record(RepoCall::ResetHard {
            rev: rev.to_string(),
        });
        Ok(())
    }

    fn describe_tags(&self, rev: &str) -> Result<String> {
        self.resolve(rev)?;
        self.describe
            .clone()
            .ok_or_else(|| RollError::parse("No tags can describe this commit"))
    }

    fn rev_parse(&self, rev: &str) -> Result<String> {
        self.resolve(rev)
    }

    fn create_tag(&self, name: &str, rev: &str) -> Result<()> {
        let hash = self.resolve(rev)?;
        self.record(RepoCall::CreateTag {
            name: name.to_string(),
            rev: rev.to_string(),
        });

        let mut tags = self.tags.borrow_mut();
        if tags.contains_key(name) {
            return Err(RollError::Git(git2::Error::from_str(&format!(
                "tag '{}' already exists",
                name
            ))));
        }
        tags.insert(name.to_string(), hash);
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.record(RepoCall::DeleteTag {
            name: name.to_string(),
        });
        match self.tags.borrow_mut().remove(name) {
            Some(_) => Ok(()),
            None => Err(RollError::Git(git2::Error::from_str(&format!(
                "tag '{}' not found",
                name
            )))),
        }
    }

    fn push_ref(&self, remote: &str, src: &str, dst: &str) -> Result<()> {
        self.record(RepoCall::PushRef {
            remote: remote.to_string(),
            src: src.to_string(),
            dst: dst.to_string(),
        });
        if self.failing_pushes.contains(dst) {
            return Err(RollError::push(format!("remote rejected {}", dst)));
        }
        Ok(())
    }
}
