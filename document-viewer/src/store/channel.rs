//! Replay-latest views over the store's state.
//!
//! Every subscription is a `watch` receiver on the same snapshot channel. A new
//! subscription starts out marked as changed, so its first `next()` yields the
//! current value right away instead of waiting for the next mutation. Intermediate
//! values may be skipped; a subscriber always catches up to the latest.

use super::StoreSnapshot;
use crate::models::Document;
use std::sync::Arc;
use tokio::sync::watch;

/// One observable channel projected out of the store snapshot.
pub struct Subscription<T> {
    rx: watch::Receiver<StoreSnapshot>,
    project: fn(&StoreSnapshot) -> T,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        mut rx: watch::Receiver<StoreSnapshot>,
        project: fn(&StoreSnapshot) -> T,
    ) -> Self {
        rx.mark_changed();
        Self { rx, project }
    }

    /// Latest value, without consuming the pending notification.
    pub fn current(&self) -> T {
        (self.project)(&self.rx.borrow())
    }

    /// Wait for a value not yet seen by this subscription.
    ///
    /// Returns `None` once the store and all its tasks are gone.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some((self.project)(&self.rx.borrow_and_update()))
    }
}

pub type DocumentsSubscription = Subscription<Arc<Vec<Document>>>;

pub type TotalSubscription = Subscription<u64>;

pub(crate) fn project_documents(snapshot: &StoreSnapshot) -> Arc<Vec<Document>> {
    snapshot.documents().clone()
}

pub(crate) fn project_total(snapshot: &StoreSnapshot) -> u64 {
    snapshot.total()
}

/// The documents and total channels held as one unit.
///
/// Dropping the group releases both subscriptions at once. Reads always take both
/// values from a single snapshot, so a consumer never pairs a new total with an old
/// document list.
pub struct SubscriptionGroup {
    documents: DocumentsSubscription,
    total: TotalSubscription,
}

impl SubscriptionGroup {
    pub(crate) fn new(documents: DocumentsSubscription, total: TotalSubscription) -> Self {
        Self { documents, total }
    }

    /// Latest snapshot; marks both channels as seen.
    pub fn latest(&mut self) -> StoreSnapshot {
        let _ = self.total.rx.borrow_and_update();
        self.documents.rx.borrow_and_update().clone()
    }

    /// Wait until either channel has an unseen value, then return the latest snapshot.
    pub async fn changed(&mut self) -> Option<StoreSnapshot> {
        tokio::select! {
            changed = self.documents.rx.changed() => changed.ok()?,
            changed = self.total.rx.changed() => changed.ok()?,
        }
        Some(self.latest())
    }
}
