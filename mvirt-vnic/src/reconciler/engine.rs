//! Turns aligned positions into create/update/delete actions.

use crate::nic::{AlignedPair, NicAction};

/// Name given to the NIC at a zero-based position: `nic1`, `nic2`, ...
pub fn nic_name(idx: usize) -> String {
    format!("nic{}", idx + 1)
}

/// One action per aligned position, in position order.
///
/// Every paired position becomes an update, even when nothing changed.
/// Network references are passed through unresolved.
pub fn reconcile(aligned: &[AlignedPair<'_>]) -> Vec<NicAction> {
    aligned
        .iter()
        .enumerate()
        .map(|(idx, pair)| match *pair {
            AlignedPair::Both { desired, current } => NicAction::Update {
                target_id: current.id.clone(),
                name: nic_name(idx),
                settings: desired.settings(),
            },
            AlignedPair::DesiredOnly(desired) => NicAction::Create {
                name: nic_name(idx),
                settings: desired.settings(),
            },
            AlignedPair::CurrentOnly(current) => NicAction::Delete {
                target_id: current.id.clone(),
            },
        })
        .collect()
}
