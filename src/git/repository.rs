use crate::error::{RollError, Result};
use git2::{ObjectType, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn commit_object(&self, rev: &str) -> Result<git2::Object<'_>> {
        let object = self.repo.revparse_single(rev)?;
        Ok(object.peel(ObjectType::Commit)?)
    }
}

/// Credentials for fetch and push: SSH keys from ~/.ssh, then the SSH agent,
/// then libgit2's default credentials.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(found) => Ok(found.url().map(|url| url.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn dirty_paths(&self) -> Result<Vec<String>> {
        let mut options = git2::StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;

        Ok(statuses
            .iter()
            .filter(|entry| {
                let status = entry.status();
                !status.is_empty() && !status.contains(git2::Status::IGNORED)
            })
            .map(|entry| entry.path().unwrap_or("(non-utf8 path)").to_string())
            .collect())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        let mut found = self
            .repo
            .find_remote(remote)
            .map_err(|e| RollError::precondition(format!("Cannot find remote '{}': {}", remote, e)))?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks());

        // All remote branches into remote-tracking refs, and all tags
        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];

        found.fetch(&refspecs, Some(&mut fetch_options), None)?;
        Ok(())
    }

    fn reset_hard(&self, rev: &str) -> Result<()> {
        let commit = self.commit_object(rev)?;
        self.repo.reset(&commit, git2::ResetType::Hard, None)?;
        Ok(())
    }

    fn describe_tags(&self, rev: &str) -> Result<String> {
        let commit = self.commit_object(rev)?;

        // Only version tags count, and only along the first-parent history
        let mut options = git2::DescribeOptions::new();
        options
            .describe_tags()
            .pattern("v*.*.*")
            .only_follow_first_parent(true);

        let mut format = git2::DescribeFormatOptions::new();
        format.always_use_long_format(true);

        commit
            .describe(&options)
            .and_then(|describe| describe.format(Some(&format)))
            .map_err(|e| RollError::parse(format!("Cannot describe '{}': {}", rev, e)))
    }

    fn rev_parse(&self, rev: &str) -> Result<String> {
        Ok(self.commit_object(rev)?.id().to_string())
    }

    fn create_tag(&self, name: &str, rev: &str) -> Result<()> {
        let commit = self.commit_object(rev)?;
        self.repo.tag_lightweight(name, &commit, false)?;
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo.tag_delete(name)?;
        Ok(())
    }

    fn push_ref(&self, remote: &str, src: &str, dst: &str) -> Result<()> {
        let mut found = self
            .repo
            .find_remote(remote)
            .map_err(|e| RollError::push(format!("Cannot find remote '{}': {}", remote, e)))?;

        let mut callbacks = remote_callbacks();
        // A rejected reference is reported here, not as a push error
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => {
                log::warn!("remote rejected {}: {}", refname, message);
                Err(git2::Error::from_str(&format!(
                    "remote rejected {}: {}",
                    refname, message
                )))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("{}:{}", src, dst);
        found
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    RollError::push(format!("Network error pushing {}: {}", refspec, e))
                }
                _ => RollError::push(format!("Cannot push {}: {}", refspec, e)),
            })
    }
}
