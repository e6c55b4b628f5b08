//! Navigation over the ordered sub-interactive ids.
//!
//! Positions clamp at both ends; nothing wraps around.

use shared_types::SubInteractiveId;

/// `current` if it is still present, otherwise the first id.
pub fn current_or_first(
    ids: &[SubInteractiveId],
    current: Option<&SubInteractiveId>,
) -> Option<SubInteractiveId> {
    current
        .filter(|id| ids.contains(id))
        .cloned()
        .or_else(|| ids.first().cloned())
}

/// The id after `current`, staying on the last one.
pub fn next_id(ids: &[SubInteractiveId], current: Option<&SubInteractiveId>) -> Option<SubInteractiveId> {
    let index = position(ids, current)?;
    ids.get((index + 1).min(ids.len() - 1)).cloned()
}

/// The id before `current`, staying on the first one.
pub fn previous_id(ids: &[SubInteractiveId], current: Option<&SubInteractiveId>) -> Option<SubInteractiveId> {
    let index = position(ids, current)?;
    ids.get(index.saturating_sub(1)).cloned()
}

fn position(ids: &[SubInteractiveId], current: Option<&SubInteractiveId>) -> Option<usize> {
    if ids.is_empty() {
        return None;
    }
    let current = current_or_first(ids, current)?;
    ids.iter().position(|id| *id == current)
}
