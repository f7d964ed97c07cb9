//! Explicit reordering of a container's item list.

use stowage_model::SubObjectRef;

/// Moves `subject` to just before `target`, or to the end when `target` is
/// `None` or not in the list. Other entries keep their relative order.
///
/// Does nothing when `subject` is its own target or is not in the list.
/// Returns whether the list changed.
pub fn move_item(
    items: &mut Vec<Option<SubObjectRef>>,
    subject: &SubObjectRef,
    target: Option<&SubObjectRef>,
) -> bool {
    if target == Some(subject) {
        return false;
    }
    let Some(from) = index_of(items, subject) else {
        return false;
    };

    let moving = items.remove(from);
    let to = target
        .and_then(|t| index_of(items, t))
        .unwrap_or(items.len());
    items.insert(to, moving);
    to != from
}

fn index_of(items: &[Option<SubObjectRef>], needle: &SubObjectRef) -> Option<usize> {
    items.iter().position(|slot| slot.as_ref() == Some(needle))
}
