use crate::models::{Entry, EntryKey, PlanDocument, is_valid_entry_key};

/// A single change made to a plan while in edit mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Move { from: usize, to: usize },
    Add(Entry),
    Remove(EntryKey),
    Replace(Entry),
}

/// Drag-and-drop reorder: the item at `from` ends up at index `to` of the
/// returned list. Out-of-range indices leave the order untouched.
pub fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut reordered = items.to_vec();
    if from >= items.len() || to >= items.len() || from == to {
        return reordered;
    }
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    reordered
}

/// Applies `edit` to `draft`, returning whether anything changed.
pub fn apply_edit(draft: &mut PlanDocument, edit: DraftEdit) -> bool {
    let changed = match edit {
        DraftEdit::Move { from, to } => {
            let reordered = reorder(&draft.entries, from, to);
            let changed = reordered != draft.entries;
            draft.entries = reordered;
            changed
        }
        DraftEdit::Add(entry) => {
            // keys identify entries on the store, so they must stay unique
            if !is_valid_entry_key(&entry.key) || draft.contains(&entry.key) {
                false
            } else {
                draft.entries.push(entry);
                true
            }
        }
        DraftEdit::Remove(key) => {
            let before = draft.entries.len();
            draft.entries.retain(|entry| entry.key != key);
            draft.entries.len() != before
        }
        DraftEdit::Replace(entry) => match draft.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => {
                let changed = *slot != entry;
                *slot = entry;
                changed
            }
            None => false,
        },
    };

    if changed {
        draft.recompute_totals();
    }
    changed
}
