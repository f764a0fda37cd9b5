//! Last-writer-wins merge of the local and remote note collections.
//!
//! Everything here is pure: the caller supplies both snapshots and the
//! outstanding local deletes and uploads, and applies the returned plan.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{ConflictWinner, Note, NoteId, SyncConflict};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Authoritative collection, most recently updated first
    pub merged: Vec<Note>,
    /// Local versions strictly newer than their remote counterpart, or
    /// never confirmed by the remote
    pub to_push: Vec<Note>,
    /// Local notes missing remotely, treated as deleted elsewhere
    pub dropped: Vec<NoteId>,
    /// Remote rows whose local delete has not landed yet
    pub redeletes: Vec<NoteId>,
    /// Pending deletes that landed, or lost to a newer remote edit
    pub cleared_deletes: Vec<NoteId>,
    /// Pending uploads the remote already holds at that version or newer
    pub cleared_uploads: Vec<NoteId>,
    /// Ids seen on both sides with differing content
    pub conflicts: Vec<SyncConflict>,
    /// Whether `merged` differs from the local snapshot
    pub local_changed: bool,
}

/// Merge `local` with `remote`; the remote store decides which ids exist.
///
/// For ids on both sides the local version wins only when its `updated_at`
/// is strictly greater; ties go to the remote copy. A local note missing
/// remotely is read as deleted elsewhere, unless its upload is still
/// pending, in which case it is kept and pushed again.
pub fn reconcile(
    local: &[Note],
    remote: &[Note],
    pending_deletes: &HashMap<NoteId, DateTime<Utc>>,
    pending_uploads: &HashMap<NoteId, DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Reconciliation {
    let remote_index = index_newest(remote);
    let local_index: HashMap<&NoteId, &Note> = local.iter().map(|note| (&note.id, note)).collect();

    let mut plan = Reconciliation::default();

    let mut remote_ids: Vec<&NoteId> = remote_index.keys().copied().collect();
    remote_ids.sort();

    for id in remote_ids {
        let remote_note = remote_index[id];

        if pending_uploads
            .get(id)
            .is_some_and(|stamp| remote_note.updated_at >= *stamp)
        {
            plan.cleared_uploads.push(id.clone());
        }

        if let Some(deleted_at) = pending_deletes.get(id) {
            if remote_note.updated_at > *deleted_at {
                plan.cleared_deletes.push(id.clone());
            } else {
                plan.redeletes.push(id.clone());
                continue;
            }
        }

        match local_index.get(id) {
            Some(local_note) if local_note.updated_at > remote_note.updated_at => {
                plan.conflicts
                    .push(conflict(local_note, remote_note, ConflictWinner::Local, now));
                plan.merged.push((*local_note).clone());
                plan.to_push.push((*local_note).clone());
            }
            Some(local_note) => {
                if *local_note != remote_note {
                    plan.conflicts
                        .push(conflict(local_note, remote_note, ConflictWinner::Remote, now));
                }
                plan.merged.push(remote_note.clone());
            }
            None => plan.merged.push(remote_note.clone()),
        }
    }

    // Deletes whose row is already gone remotely have landed
    let mut settled: Vec<NoteId> = pending_deletes
        .keys()
        .filter(|id| !remote_index.contains_key(id))
        .cloned()
        .collect();
    settled.sort();
    plan.cleared_deletes.extend(settled);

    for note in local {
        if remote_index.contains_key(&note.id) {
            continue;
        }
        if pending_uploads.contains_key(&note.id) && !pending_deletes.contains_key(&note.id) {
            plan.merged.push(note.clone());
            plan.to_push.push(note.clone());
        } else {
            plan.dropped.push(note.id.clone());
        }
    }

    // Ledger entries for notes that exist on neither side are stale
    let local_ids: HashSet<&NoteId> = local.iter().map(|note| &note.id).collect();
    let mut stale: Vec<NoteId> = pending_uploads
        .keys()
        .filter(|id| !local_ids.contains(id) && !remote_index.contains_key(id))
        .cloned()
        .collect();
    stale.sort();
    plan.cleared_uploads.extend(stale);

    sort_for_display(&mut plan.merged);
    plan.local_changed = !same_collection(local, &plan.merged);
    plan
}

/// Local notes the first sync against a remote must upload before
/// remote absence can be read as deletion: ids unknown remotely, or
/// strictly newer locally.
pub fn bootstrap_uploads(local: &[Note], remote: &[Note]) -> Vec<Note> {
    let remote_index = index_newest(remote);
    local
        .iter()
        .filter(|note| {
            remote_index
                .get(&note.id)
                .map_or(true, |remote_note| note.updated_at > remote_note.updated_at)
        })
        .cloned()
        .collect()
}

/// Canonical display order: most recently touched first, ties by id
pub fn sort_for_display(notes: &mut [Note]) {
    notes.sort_by(|a, b| match b.updated_at.cmp(&a.updated_at) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}

/// Compare two collections as id-keyed sets, ignoring order
pub fn same_collection(left: &[Note], right: &[Note]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let index: HashMap<&NoteId, &Note> = left.iter().map(|note| (&note.id, note)).collect();
    index.len() == right.len()
        && right
            .iter()
            .all(|note| index.get(&note.id).is_some_and(|other| *other == note))
}

/// Index by id; when the remote returns an id twice the newer row counts
fn index_newest(notes: &[Note]) -> HashMap<&NoteId, &Note> {
    let mut index: HashMap<&NoteId, &Note> = HashMap::with_capacity(notes.len());
    for note in notes {
        index
            .entry(&note.id)
            .and_modify(|existing| {
                if note.updated_at > existing.updated_at {
                    *existing = note;
                }
            })
            .or_insert(note);
    }
    index
}

fn conflict(
    local: &Note,
    remote: &Note,
    winner: ConflictWinner,
    now: DateTime<Utc>,
) -> SyncConflict {
    SyncConflict {
        id: 0,
        note_id: local.id.clone(),
        local_updated_at: local.updated_at,
        remote_updated_at: remote.updated_at,
        resolved_at: now,
        winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 15, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn note(id: &str, title: &str, updated: i64) -> Note {
        let mut note = Note::new("work", title);
        note.id = NoteId::from(id);
        note.created_at = at(0);
        note.updated_at = at(updated);
        note
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|note| note.id.as_str()).collect()
    }

    fn empty() -> HashMap<NoteId, DateTime<Utc>> {
        HashMap::new()
    }

    #[test]
    fn newer_remote_wins_without_push() {
        let local = vec![note("1", "local", 1)];
        let remote = vec![note("1", "remote", 2)];

        let plan = reconcile(&local, &remote, &empty(), &empty(), at(10));

        assert_eq!(plan.merged, remote);
        assert!(plan.to_push.is_empty());
        assert!(plan.local_changed);
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].winner, ConflictWinner::Remote);
    }

    #[test]
    fn newer_local_wins_and_is_pushed() {
        let local = vec![note("1", "local", 2)];
        let remote = vec![note("1", "remote", 1)];

        let plan = reconcile(&local, &remote, &empty(), &empty(), at(10));

        assert_eq!(plan.merged, local);
        assert_eq!(plan.to_push, local);
        assert!(!plan.local_changed);
        assert_eq!(plan.conflicts[0].winner, ConflictWinner::Local);
    }

    #[test]
    fn equal_timestamps_resolve_to_remote() {
        let local = vec![note("1", "local", 5)];
        let remote = vec![note("1", "remote", 5)];

        let plan = reconcile(&local, &remote, &empty(), &empty(), at(10));

        assert_eq!(plan.merged[0].title, "remote");
        assert!(plan.to_push.is_empty());
    }

    #[test]
    fn local_only_notes_are_dropped_as_deleted_elsewhere() {
        let local = vec![note("1", "kept", 1), note("2", "gone", 1)];
        let remote = vec![note("1", "kept", 1)];

        let plan = reconcile(&local, &remote, &empty(), &empty(), at(10));

        assert_eq!(ids(&plan.merged), vec!["1"]);
        assert_eq!(plan.dropped, vec![NoteId::from("2")]);
        assert!(plan.local_changed);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn remote_only_notes_are_adopted() {
        let remote = vec![note("9", "from elsewhere", 3)];

        let plan = reconcile(&[], &remote, &empty(), &empty(), at(10));

        assert_eq!(plan.merged, remote);
        assert!(plan.local_changed);
        assert!(plan.to_push.is_empty());
    }

    #[test]
    fn merged_membership_matches_remote_ids() {
        let local = vec![
            note("a", "la", 5),
            note("b", "lb", 1),
            note("c", "lc", 1),
        ];
        let remote = vec![note("a", "ra", 4), note("b", "rb", 2), note("d", "rd", 1)];

        let plan = reconcile(&local, &remote, &empty(), &empty(), at(10));

        let mut merged_ids = ids(&plan.merged);
        merged_ids.sort_unstable();
        assert_eq!(merged_ids, vec!["a", "b", "d"]);
        assert_eq!(ids(&plan.to_push), vec!["a"]);
        assert_eq!(plan.dropped, vec![NoteId::from("c")]);
    }

    #[test]
    fn merged_is_sorted_most_recent_first() {
        let remote = vec![note("a", "old", 1), note("b", "new", 9), note("c", "mid", 5)];

        let plan = reconcile(&[], &remote, &empty(), &empty(), at(10));

        assert_eq!(ids(&plan.merged), vec!["b", "c", "a"]);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let local = vec![note("1", "local", 1), note("2", "gone", 1)];
        let remote = vec![note("1", "remote", 2), note("3", "new", 3)];

        let first = reconcile(&local, &remote, &empty(), &empty(), at(10));
        let second = reconcile(&first.merged, &remote, &empty(), &empty(), at(11));

        assert_eq!(second.merged, first.merged);
        assert!(!second.local_changed);
        assert!(second.to_push.is_empty());
        assert!(second.conflicts.is_empty());
    }

    #[test]
    fn pending_delete_hides_stale_remote_row_and_reissues_delete() {
        let remote = vec![note("1", "stale", 1)];
        let pending = HashMap::from([(NoteId::from("1"), at(2))]);

        let plan = reconcile(&[], &remote, &pending, &empty(), at(10));

        assert!(plan.merged.is_empty());
        assert_eq!(plan.redeletes, vec![NoteId::from("1")]);
        assert!(!plan.local_changed);
    }

    #[test]
    fn remote_edit_after_delete_wins_over_pending_delete() {
        let remote = vec![note("1", "edited elsewhere", 5)];
        let pending = HashMap::from([(NoteId::from("1"), at(2))]);

        let plan = reconcile(&[], &remote, &pending, &empty(), at(10));

        assert_eq!(plan.merged, remote);
        assert_eq!(plan.cleared_deletes, vec![NoteId::from("1")]);
        assert!(plan.redeletes.is_empty());
    }

    #[test]
    fn pending_delete_without_remote_row_is_settled() {
        let pending = HashMap::from([(NoteId::from("1"), at(2))]);

        let plan = reconcile(&[], &[], &pending, &empty(), at(10));

        assert_eq!(plan.cleared_deletes, vec![NoteId::from("1")]);
        assert!(plan.redeletes.is_empty());
    }

    #[test]
    fn unconfirmed_local_note_is_kept_and_pushed_again() {
        let local = vec![note("1", "written offline", 3), note("2", "synced before", 1)];
        let uploads = HashMap::from([(NoteId::from("1"), at(3))]);

        let plan = reconcile(&local, &[], &empty(), &uploads, at(10));

        assert_eq!(ids(&plan.merged), vec!["1"]);
        assert_eq!(ids(&plan.to_push), vec!["1"]);
        assert_eq!(plan.dropped, vec![NoteId::from("2")]);
        assert!(plan.cleared_uploads.is_empty());
    }

    #[test]
    fn upload_seen_remotely_is_confirmed() {
        let local = vec![note("1", "sent", 3)];
        let remote = vec![note("1", "sent", 3)];
        let uploads = HashMap::from([
            (NoteId::from("1"), at(3)),
            (NoteId::from("gone"), at(1)),
        ]);

        let plan = reconcile(&local, &remote, &empty(), &uploads, at(10));

        assert_eq!(plan.cleared_uploads, vec![NoteId::from("1"), NoteId::from("gone")]);
        assert!(plan.to_push.is_empty());
        assert!(!plan.local_changed);
    }

    #[test]
    fn upload_behind_remote_version_stays_pending() {
        let local = vec![note("1", "newer here", 5)];
        let remote = vec![note("1", "older there", 2)];
        let uploads = HashMap::from([(NoteId::from("1"), at(5))]);

        let plan = reconcile(&local, &remote, &empty(), &uploads, at(10));

        assert_eq!(ids(&plan.to_push), vec!["1"]);
        assert!(plan.cleared_uploads.is_empty());
    }

    #[test]
    fn duplicate_remote_rows_use_newest() {
        let remote = vec![note("1", "older", 1), note("1", "newer", 2)];

        let plan = reconcile(&[], &remote, &empty(), &empty(), at(10));

        assert_eq!(plan.merged.len(), 1);
        assert_eq!(plan.merged[0].title, "newer");
    }

    #[test]
    fn bootstrap_uploads_local_only_and_newer_notes() {
        let local = vec![note("1", "same", 1), note("2", "local only", 1), note("3", "newer", 5)];
        let remote = vec![note("1", "same", 1), note("3", "older", 2)];

        let uploads = bootstrap_uploads(&local, &remote);

        assert_eq!(ids(&uploads), vec!["2", "3"]);
    }

    #[test]
    fn same_collection_ignores_order() {
        let a = note("a", "x", 1);
        let b = note("b", "y", 2);
        assert!(same_collection(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));

        let mut changed = b.clone();
        changed.title = "z".to_string();
        assert!(!same_collection(&[a.clone(), b], &[a, changed]));
    }
}
