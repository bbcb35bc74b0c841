//! Reconciliation: classify each source contact against the destination.
//!
//! Destination contacts are indexed by identity key, then source contacts are
//! walked in input order:
//!
//! - no destination match → [`ChangeKind::Create`]
//! - match with different content → [`ChangeKind::Update`]
//! - content-equal match → nothing
//!
//! Destination contacts with no matching source contact are left alone.

use std::collections::HashMap;

use serde::Serialize;

use crate::contact::CanonicalContact;
use crate::request::{ChangeKind, ChangeRequest};

/// Compute the ordered writes that make `destination` match `source`.
///
/// If two destination contacts share an identity key, the later one wins.
/// Destination contacts without an identity key are never matched.
pub fn reconcile(
    source: &[CanonicalContact],
    destination: &[CanonicalContact],
) -> Vec<ChangeRequest> {
    let mut by_key: HashMap<&str, &CanonicalContact> = HashMap::with_capacity(destination.len());
    for contact in destination {
        let Some(key) = contact.identity_key() else {
            tracing::debug!("skipping destination contact without identity key");
            continue;
        };
        if by_key.insert(key, contact).is_some() {
            tracing::warn!("duplicate destination identity key '{key}'; keeping the last one");
        }
    }

    let mut changes = Vec::new();
    for contact in source {
        let matched = contact.identity_key().and_then(|key| by_key.get(key));
        match matched {
            None => {
                tracing::debug!("create: {:?}", contact.identity_key());
                changes.push(ChangeRequest::create(contact.clone()));
            }
            Some(existing) if !contact.content_equals(existing) => {
                tracing::debug!("update: {:?}", contact.identity_key());
                changes.push(ChangeRequest::update(contact.clone(), (*existing).clone()));
            }
            Some(_) => tracing::trace!("unchanged: {:?}", contact.identity_key()),
        }
    }
    changes
}

/// Counts of how a reconcile run classified the source contacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub creates: usize,
    pub updates: usize,
    pub unchanged: usize,
}

impl ReconcileSummary {
    /// Summarize `changes` produced from `source_len` source contacts.
    pub fn from_changes(source_len: usize, changes: &[ChangeRequest]) -> Self {
        let creates = changes
            .iter()
            .filter(|c| c.kind() == ChangeKind::Create)
            .count();
        let updates = changes.len() - creates;
        Self {
            creates,
            updates,
            unchanged: source_len.saturating_sub(changes.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.creates == 0 && self.updates == 0
    }
}
