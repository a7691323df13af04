//! Dev-roll workflow orchestration
//!
//! The [ReleaseGate] verifies the repository, works out the next version,
//! and orders the side effects of a roll:
//!
//! 1. local tag, before the operator is asked
//! 2. publish, after the operator confirmed
//! 3. push the tag, then push the commit to the dev branch
//!
//! A local tag that never got published is deleted again. Pushes that fail
//! after a successful publish are reported as-is; the artifact is already
//! public at that point and nothing is rolled back.

use std::cell::RefCell;

use log::{debug, info, warn};

use crate::config::Config;
use crate::domain::{GateState, IncrementLevel, RollOutcome, SemanticVersion, TagDescription};
use crate::error::{RollError, Result};
use crate::git::Repository;
use crate::publish::{ArchivePublisher, Release};
use crate::ui::{self, Prompter};

/// Arguments for one roll
///
/// Mirrors the CLI arguments in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct RollRequest {
    pub increment: IncrementLevel,

    /// Revision to roll; `None` uses `upstream.default_commit`
    pub commit: Option<String>,

    /// Stop after computing the next version
    pub just_print: bool,
}

/// Sequences preconditions, confirmation and publishing for a dev roll
pub struct ReleaseGate<'a, R, P, O>
where
    R: Repository + ?Sized,
    P: ArchivePublisher + ?Sized,
    O: Prompter + ?Sized,
{
    config: &'a Config,
    repo: &'a R,
    publisher: &'a P,
    prompter: &'a O,
    trail: RefCell<Vec<GateState>>,
}

impl<'a, R, P, O> ReleaseGate<'a, R, P, O>
where
    R: Repository + ?Sized,
    P: ArchivePublisher + ?Sized,
    O: Prompter + ?Sized,
{
    pub fn new(config: &'a Config, repo: &'a R, publisher: &'a P, prompter: &'a O) -> Self {
        ReleaseGate {
            config,
            repo,
            publisher,
            prompter,
            trail: RefCell::new(vec![GateState::Init]),
        }
    }

    /// Current state of the gate
    pub fn state(&self) -> GateState {
        self.trail
            .borrow()
            .last()
            .copied()
            .unwrap_or(GateState::Init)
    }

    /// Every state the gate passed through, starting with `Init`
    pub fn trail(&self) -> Vec<GateState> {
        self.trail.borrow().clone()
    }

    fn advance(&self, to: GateState) {
        debug!("gate: {} -> {}", self.state(), to);
        self.trail.borrow_mut().push(to);
    }

    /// Run the whole roll. Never panics on workflow failures; they come back
    /// as [RollOutcome::Failed].
    pub fn run(&self, request: &RollRequest) -> RollOutcome {
        match self.drive(request) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.advance(GateState::Failed);
                RollOutcome::Failed(e)
            }
        }
    }

    fn drive(&self, request: &RollRequest) -> Result<RollOutcome> {
        let commit = request
            .commit
            .as_deref()
            .unwrap_or(self.config.upstream.default_commit.as_str());

        self.verify()?;
        self.sync_to(commit)?;
        self.advance(GateState::Verified);

        let raw = self.repo.describe_tags("HEAD")?;
        debug!("describe HEAD: {}", raw.trim());
        let description = TagDescription::parse(&raw)?;

        if description.is_tagged_commit() {
            info!("{} is already tagged as v{}", commit, description.version);
            ui::display_success(&format!(
                "Version {} has already been released",
                description.version
            ));
            self.advance(GateState::AlreadyReleased);
            return Ok(RollOutcome::AlreadyReleased {
                version: description.version,
            });
        }

        let version = description.version.increment(request.increment);
        ui::display_proposed_version(
            &description.version,
            &version,
            description.commits_since_tag,
        );

        if request.just_print {
            println!("{}", version);
            self.advance(GateState::Done);
            return Ok(RollOutcome::Printed { version });
        }

        self.publisher.check_access()?;

        let hash = self.repo.rev_parse("HEAD")?;
        let tag = version.tag_name();
        self.repo.create_tag(&tag, &hash)?;
        info!("created local tag {} at {}", tag, hash);
        self.advance(GateState::TaggedLocally);

        // From here until the publish succeeds, every exit must drop the tag
        match self.confirm_and_publish(&version, &tag, &hash, &description) {
            Ok(true) => {}
            Ok(false) => {
                self.rollback_tag(&tag);
                ui::display_status("Roll aborted; nothing was published");
                self.advance(GateState::Aborted);
                return Ok(RollOutcome::Aborted { tag });
            }
            Err(e) => {
                self.rollback_tag(&tag);
                return Err(e);
            }
        }

        self.push(&tag)?;
        self.advance(GateState::Done);
        ui::display_success(&format!("Rolled the dev channel to {}", version));

        Ok(RollOutcome::Published { tag, commit: hash })
    }

    /// The upstream remote must be the expected repository, and the working
    /// tree must be clean before anything is reset.
    fn verify(&self) -> Result<()> {
        let remote = &self.config.upstream.remote;
        let expected = self.config.expected_upstream_url()?;

        match self.repo.remote_url(remote)? {
            Some(url) if url.trim() == expected => {}
            Some(url) => {
                return Err(RollError::precondition(format!(
                    "remote '{}' points at {} but must point at {}",
                    remote,
                    url.trim(),
                    expected
                )))
            }
            None => {
                return Err(RollError::precondition(format!(
                    "no remote named '{}'; add it with: git remote add {} {}",
                    remote, remote, expected
                )))
            }
        }

        let dirty = self.repo.dirty_paths()?;
        if !dirty.is_empty() {
            ui::display_dirty_paths(&dirty);
            return Err(RollError::precondition(format!(
                "the working tree has {} uncommitted change(s); commit or stash them first",
                dirty.len()
            )));
        }
        Ok(())
    }

    fn sync_to(&self, commit: &str) -> Result<()> {
        let remote = &self.config.upstream.remote;
        ui::display_status(&format!("Fetching {}...", remote));
        self.repo.fetch(remote)?;
        self.repo.reset_hard(commit)?;
        info!("reset working tree to {}", commit);
        Ok(())
    }

    /// `Ok(false)` when the operator declined.
    fn confirm_and_publish(
        &self,
        version: &SemanticVersion,
        tag: &str,
        hash: &str,
        description: &TagDescription,
    ) -> Result<bool> {
        let token = &self.config.confirmation.token;
        let question = ui::confirmation_question(version, ui::short_hash(hash), token);
        let answer = self.prompter.ask(&question)?;

        if !ui::is_affirmative(&answer, token) {
            info!("operator declined the roll to {}", version);
            return Ok(false);
        }
        self.advance(GateState::Confirmed);

        let channel = self
            .config
            .publish
            .as_ref()
            .map(|p| p.channel.clone())
            .unwrap_or_else(|| "dev".to_string());
        let release = Release {
            version: *version,
            tag: tag.to_string(),
            commit: hash.to_string(),
            channel,
        };

        ui::display_status(&format!(
            "Publishing {} ({} commits after v{})...",
            tag, description.commits_since_tag, description.version
        ));
        self.publisher.publish(&release)?;
        self.advance(GateState::Published);
        ui::display_success(&format!("Published {}", tag));
        Ok(true)
    }

    fn rollback_tag(&self, tag: &str) {
        match self.repo.delete_tag(tag) {
            Ok(()) => warn!("deleted local tag {}", tag),
            Err(e) => ui::display_warning(&format!(
                "Could not delete local tag {}: {}; remove it with: git tag -d {}",
                tag, e, tag
            )),
        }
    }

    fn push(&self, tag: &str) -> Result<()> {
        let remote = &self.config.upstream.remote;
        let dev_branch = &self.config.upstream.dev_branch;
        let tag_ref = format!("refs/tags/{}", tag);
        let branch_ref = format!("refs/heads/{}", dev_branch);

        let pushed = self
            .repo
            .push_ref(remote, &tag_ref, &tag_ref)
            .and_then(|()| {
                info!("pushed {} to {}", tag, remote);
                self.advance(GateState::PushedTag);
                self.repo.push_ref(remote, "HEAD", &branch_ref)
            });

        if let Err(e) = pushed {
            ui::display_manual_push_instruction(tag, remote, dev_branch);
            return Err(match e {
                RollError::Push(_) => e,
                other => RollError::push(other.to_string()),
            });
        }

        info!("pushed HEAD to {}/{}", remote, dev_branch);
        self.advance(GateState::PushedBranch);
        Ok(())
    }
}
