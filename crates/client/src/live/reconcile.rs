// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot reconciliation shared by all live entity kinds.

use std::collections::BTreeMap;
use std::sync::Arc;

use wl_core::Snapshot;

use super::property::Property;
use super::registry::Registry;
use crate::error::{Error, Result};

/// Live entities associated with another, keyed by identifier.
pub type EntitySet<L> = BTreeMap<String, Arc<L>>;

/// A live entity that can absorb snapshots of itself.
pub trait Reconcile: Send + Sync + Sized + 'static {
    type Snapshot: Snapshot;

    /// Entity kind, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Copy every attribute present in `snapshot` that differs.
    ///
    /// Fails with [`Error::ApplyMismatch`] if the snapshot describes a
    /// different entity.
    fn apply(&self, snapshot: &Self::Snapshot) -> Result<()>;

    /// The registered entity for `id`, created empty if needed.
    fn live(registry: &Arc<Registry>, id: &str) -> Arc<Self>;
}

/// Guard for [`Reconcile::apply`] implementations.
pub fn check_identity(kind: &str, own: &str, incoming: &str) -> Result<()> {
    if own == incoming {
        Ok(())
    } else {
        Err(Error::ApplyMismatch {
            from: format!("{} {}", kind, incoming),
            onto: format!("{} {}", kind, own),
        })
    }
}

/// Reconcile a held association with an incoming list of snapshots.
///
/// Held entities present in `incoming` are updated in place, held entities
/// missing from it are dropped, and new identifiers are attached from the
/// registry. `None` means the collection was not sent and leaves `held`
/// untouched; `Some(&[])` empties it.
///
/// Every snapshot is applied even if one fails; the first failure is
/// returned. Observers of `held` are notified only if membership changed.
pub fn attach_or_apply_changes<L: Reconcile>(
    held: &Property<EntitySet<L>>,
    incoming: Option<&[L::Snapshot]>,
    registry: &Arc<Registry>,
) -> Result<()> {
    let Some(incoming) = incoming else {
        return Ok(());
    };

    let mut current = held.get();
    let mut next = EntitySet::new();
    let mut first_error = None;
    for snapshot in incoming {
        let id = snapshot.id();
        let entity = match current.remove(id) {
            Some(existing) => existing,
            None => next
                .get(id)
                .cloned()
                .unwrap_or_else(|| L::live(registry, id)),
        };
        if let Err(e) = entity.apply(snapshot) {
            first_error.get_or_insert(e);
        }
        next.insert(id.to_string(), entity);
    }

    held.modify(|set| {
        let same = set.len() == next.len()
            && set
                .iter()
                .zip(next.iter())
                .all(|((a, x), (b, y))| a == b && Arc::ptr_eq(x, y));
        if same {
            false
        } else {
            *set = next;
            true
        }
    });

    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
