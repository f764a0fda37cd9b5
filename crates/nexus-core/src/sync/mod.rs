//! Offline-first sync: the reconciliation engine and the remote push queue.

mod push_queue;
mod reconcile;

pub use push_queue::{PushJob, PushQueue};
pub use reconcile::{
    bootstrap_uploads, reconcile, same_collection, sort_for_display, Reconciliation,
};
