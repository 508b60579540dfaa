// src/pipeline/reconcile.rs

//! Work list reconciliation.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::Result;
use crate::models::QuestionId;
use crate::storage::{ResultStore, load_question_ids};

/// Remaining work computed at startup.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Size of the target ID universe
    pub total: usize,
    /// Target IDs already present in the store
    pub processed: usize,
    /// IDs still to fetch, ascending
    pub pending: Vec<QuestionId>,
}

/// Target IDs not yet present in the store, ascending.
pub fn pending_ids(
    targets: &BTreeSet<QuestionId>,
    processed: &HashSet<QuestionId>,
) -> Vec<QuestionId> {
    targets
        .iter()
        .filter(|id| !processed.contains(id))
        .copied()
        .collect()
}

/// Compute the work list from the ID source and the result store.
///
/// A missing or unreadable source is fatal. An unreadable store is logged
/// and treated as empty, so the run reprocesses rather than aborts.
pub fn reconcile(ids_path: &Path, store: &dyn ResultStore) -> Result<Reconciliation> {
    let targets = load_question_ids(ids_path)?;
    log::info!(
        "Loaded {} total bounty question IDs from {}",
        targets.len(),
        ids_path.display()
    );

    let processed = if store.exists() {
        match store.processed_ids() {
            Ok(ids) => {
                log::info!("Found {} already processed question IDs", ids.len());
                ids
            }
            Err(e) => {
                log::error!("Error reading processed results: {}", e);
                HashSet::new()
            }
        }
    } else {
        HashSet::new()
    };

    let pending = pending_ids(&targets, &processed);
    log::info!("Found {} unprocessed question IDs", pending.len());

    Ok(Reconciliation {
        total: targets.len(),
        processed: targets.len() - pending.len(),
        pending,
    })
}
