//! Positional alignment of desired entries with live NICs.

use crate::nic::{AlignedPair, CurrentNic, DesiredNic};

/// Pair `desired[i]` with `current[i]`, padding the shorter side with absent
/// entries. The result has `max(desired.len(), current.len())` elements.
///
/// No content matching happens here: reordering `desired` changes which live
/// NIC gets updated and which gets deleted.
pub fn align<'a>(desired: &'a [DesiredNic], current: &'a [CurrentNic]) -> Vec<AlignedPair<'a>> {
    let len = desired.len().max(current.len());
    (0..len)
        .filter_map(|idx| match (desired.get(idx), current.get(idx)) {
            (Some(desired), Some(current)) => Some(AlignedPair::Both { desired, current }),
            (Some(desired), None) => Some(AlignedPair::DesiredOnly(desired)),
            (None, Some(current)) => Some(AlignedPair::CurrentOnly(current)),
            (None, None) => None,
        })
        .collect()
}
