use crate::error::{RollError, Result};
use crate::publish::{ArchivePublisher, Release};
use std::cell::RefCell;

/// Scripted publisher for testing the release gate
#[derive(Default)]
pub struct MockPublisher {
    deny_access: Option<String>,
    fail_publish: Option<String>,
    access_checks: RefCell<usize>,
    published: RefCell<Vec<Release>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the access check fail with the given reason
    pub fn deny_access(&mut self, reason: impl Into<String>) {
        self.deny_access = Some(reason.into());
    }

    /// Make publishing fail with the given reason
    pub fn fail_publish(&mut self, reason: impl Into<String>) {
        self.fail_publish = Some(reason.into());
    }

    pub fn access_checks(&self) -> usize {
        *self.access_checks.borrow()
    }

    /// Every publish attempt, successful or not
    pub fn published(&self) -> Vec<Release> {
        self.published.borrow().clone()
    }
}

impl ArchivePublisher for MockPublisher {
    fn check_access(&self) -> Result<()> {
        *self.access_checks.borrow_mut() += 1;
        match &self.deny_access {
            Some(reason) => Err(RollError::access(reason.clone())),
            None => Ok(()),
        }
    }

    fn publish(&self, release: &Release) -> Result<()> {
        self.published.borrow_mut().push(release.clone());
        match &self.fail_publish {
            Some(reason) => Err(RollError::publish(reason.clone())),
            None => Ok(()),
        }
    }
}
