//! Pass bookkeeping guarding the sweep

use std::collections::{HashMap, HashSet};

use super::error::ReconcileError;
use crate::model::CourseId;

/// Proof that every course of a pass was processed without failure.
/// Only [`super::OfferingScraper::finish_pass`] issues one.
#[derive(Debug, PartialEq, Eq)]
pub struct CompletedPass {
    id: u64,
    processed: usize,
}

impl CompletedPass {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

#[derive(Debug, Default)]
pub(crate) struct PassTracker {
    active: Option<u64>,
    last_id: u64,
    processed: HashSet<CourseId>,
    failed: HashMap<CourseId, String>,
}

impl PassTracker {
    pub(crate) fn begin(&mut self) -> u64 {
        self.last_id += 1;
        self.active = Some(self.last_id);
        self.processed.clear();
        self.failed.clear();
        self.last_id
    }

    pub(crate) fn active(&self) -> Option<u64> {
        self.active
    }

    pub(crate) fn record_success(&mut self, course: CourseId) {
        if self.active.is_some() {
            self.failed.remove(&course);
            self.processed.insert(course);
        }
    }

    pub(crate) fn record_failure(&mut self, course: CourseId, reason: String) {
        if self.active.is_some() {
            self.processed.remove(&course);
            self.failed.insert(course, reason);
        }
    }

    pub(crate) fn failures(&self) -> Vec<(CourseId, String)> {
        let mut failures: Vec<(CourseId, String)> =
            self.failed.iter().map(|(id, reason)| (*id, reason.clone())).collect();
        failures.sort();
        failures
    }

    pub(crate) fn complete(&self, expected: usize) -> Result<CompletedPass, ReconcileError> {
        let id = self.active.ok_or(ReconcileError::NoActivePass)?;

        if !self.failed.is_empty() || self.processed.len() < expected {
            return Err(ReconcileError::IncompletePass {
                processed: self.processed.len(),
                expected,
                failed: self.failed.len(),
            });
        }

        Ok(CompletedPass {
            id,
            processed: self.processed.len(),
        })
    }

    /// Check the token against the active pass and close it
    pub(crate) fn close(&mut self, pass: &CompletedPass) -> Result<(), ReconcileError> {
        if self.active != Some(pass.id) {
            return Err(ReconcileError::PassMismatch {
                active: self.active,
                presented: pass.id,
            });
        }
        self.active = None;
        Ok(())
    }
}
