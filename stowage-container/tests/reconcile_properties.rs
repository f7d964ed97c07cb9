//! Property tests for reconciliation and explicit moves.

use proptest::prelude::*;
use std::collections::HashSet;
use stowage_container::{move_item, reconcile};
use stowage_model::{ObjectId, SubObjectRef, TypeKey};

fn fresh(n: usize) -> Vec<SubObjectRef> {
    (0..n)
        .map(|_| SubObjectRef::new(ObjectId::new(), TypeKey::from_static("prop::Item")))
        .collect()
}

fn slots(refs: &[SubObjectRef]) -> Vec<Option<SubObjectRef>> {
    refs.iter().cloned().map(Some).collect()
}

/// A container list, the storage snapshot, and which list entries survive.
fn scenario() -> impl Strategy<Value = (Vec<SubObjectRef>, Vec<bool>, Vec<SubObjectRef>, bool)> {
    (prop::collection::vec(any::<bool>(), 0..24), 0usize..8, any::<bool>()).prop_map(
        |(kept, extra, reversed)| (fresh(kept.len()), kept, fresh(extra), reversed),
    )
}

fn snapshot_of(
    current: &[SubObjectRef],
    kept: &[bool],
    extra: &[SubObjectRef],
    reversed: bool,
) -> Vec<SubObjectRef> {
    let mut snapshot: Vec<SubObjectRef> = current
        .iter()
        .zip(kept)
        .filter(|(_, k)| **k)
        .map(|(r, _)| r.clone())
        .chain(extra.iter().cloned())
        .collect();
    // Storage order carries no meaning.
    if reversed {
        snapshot.reverse();
    }
    snapshot
}

// ── Reconciliation ───────────────────────────────────────────────

proptest! {
    #[test]
    fn reconcile_is_idempotent((current, kept, extra, reversed) in scenario()) {
        let snapshot = snapshot_of(&current, &kept, &extra, reversed);
        let first = reconcile(&slots(&current), &snapshot);
        let second = reconcile(&slots(&first.items), &snapshot);

        prop_assert_eq!(&second.items, &first.items);
        prop_assert!(second.report.is_empty());
    }

    #[test]
    fn survivors_keep_relative_order((current, kept, extra, reversed) in scenario()) {
        let snapshot = snapshot_of(&current, &kept, &extra, reversed);
        let result = reconcile(&slots(&current), &snapshot);

        let survivors: Vec<SubObjectRef> = current
            .iter()
            .zip(&kept)
            .filter(|(_, k)| **k)
            .map(|(r, _)| r.clone())
            .collect();
        prop_assert_eq!(&result.items[..survivors.len()], survivors.as_slice());
    }

    #[test]
    fn discoveries_append_in_storage_order((current, kept, extra, reversed) in scenario()) {
        let snapshot = snapshot_of(&current, &kept, &extra, reversed);
        let result = reconcile(&slots(&current), &snapshot);

        let known: HashSet<ObjectId> = current.iter().map(SubObjectRef::id).collect();
        let discovered: Vec<SubObjectRef> = snapshot
            .iter()
            .filter(|r| !known.contains(&r.id()))
            .cloned()
            .collect();
        let tail = &result.items[result.items.len() - discovered.len()..];

        prop_assert_eq!(tail, discovered.as_slice());
        prop_assert_eq!(&result.report.added, &discovered);
    }

    #[test]
    fn result_matches_storage_membership((current, kept, extra, reversed) in scenario()) {
        let snapshot = snapshot_of(&current, &kept, &extra, reversed);
        let result = reconcile(&slots(&current), &snapshot);

        let stored: HashSet<ObjectId> = snapshot.iter().map(SubObjectRef::id).collect();
        let listed: HashSet<ObjectId> = result.items.iter().map(SubObjectRef::id).collect();
        prop_assert_eq!(result.items.len(), snapshot.len());
        prop_assert_eq!(listed, stored);
        prop_assert_eq!(
            result.report.removed.len(),
            kept.iter().filter(|k| !**k).count()
        );
    }

    #[test]
    fn unresolved_entries_are_always_dropped(
        (current, kept, extra, reversed) in scenario(),
        gaps in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
    ) {
        let snapshot = snapshot_of(&current, &kept, &extra, reversed);
        let mut items = slots(&current);
        for gap in &gaps {
            let at = gap.index(items.len() + 1);
            items.insert(at, None);
        }
        let result = reconcile(&items, &snapshot);

        prop_assert_eq!(result.items.len(), snapshot.len());
        prop_assert_eq!(
            result.report.removed.iter().filter(|r| r.is_none()).count(),
            gaps.len()
        );
    }
}

// ── Moves ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn move_lands_subject_before_target(
        len in 1usize..12,
        subject in any::<prop::sample::Index>(),
        target in any::<Option<prop::sample::Index>>(),
    ) {
        let refs = fresh(len);
        let subject = refs[subject.index(len)].clone();
        let target = target.map(|t| refs[t.index(len)].clone());
        let mut items = slots(&refs);

        move_item(&mut items, &subject, target.as_ref());

        // Same membership.
        prop_assert_eq!(items.len(), len);
        let members: HashSet<ObjectId> = items.iter().flatten().map(SubObjectRef::id).collect();
        prop_assert_eq!(members.len(), len);

        let at = items.iter().position(|s| s.as_ref() == Some(&subject)).unwrap();
        match &target {
            Some(t) if *t != subject => {
                prop_assert_eq!(items[at + 1].as_ref(), Some(t));
            }
            Some(_) => {
                prop_assert_eq!(items, slots(&refs));
                return Ok(());
            }
            None => {
                prop_assert_eq!(at, len - 1);
            }
        }

        // Everyone else keeps their relative order.
        let others: Vec<&SubObjectRef> = refs.iter().filter(|r| **r != subject).collect();
        let after: Vec<&SubObjectRef> = items.iter().flatten().filter(|r| **r != subject).collect();
        prop_assert_eq!(after, others);
    }

    #[test]
    fn move_reports_change_accurately(
        len in 1usize..10,
        subject in any::<prop::sample::Index>(),
        target in any::<Option<prop::sample::Index>>(),
    ) {
        let refs = fresh(len);
        let subject = refs[subject.index(len)].clone();
        let target = target.map(|t| refs[t.index(len)].clone());
        let mut items = slots(&refs);

        let changed = move_item(&mut items, &subject, target.as_ref());
        prop_assert_eq!(changed, items != slots(&refs));
    }

    #[test]
    fn moving_unknown_subject_is_noop(len in 0usize..10) {
        let refs = fresh(len);
        let stranger = fresh(1).remove(0);
        let mut items = slots(&refs);

        prop_assert!(!move_item(&mut items, &stranger, refs.first()));
        prop_assert_eq!(items, slots(&refs));
    }
}
