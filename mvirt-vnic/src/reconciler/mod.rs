//! vNIC reconciliation.
//!
//! Compares the requested NIC layout with the NICs the destination VM
//! already has and converges them position by position:
//! - [`align`] pairs both lists by index
//! - [`reconcile`] derives one create/update/delete action per position
//! - [`reconcile_nics`] runs the whole thing against a [`BackendAdapter`]

pub mod align;
pub mod current;
pub mod engine;

use tracing::{debug, error, info};

use crate::adapter::BackendAdapter;
use crate::clients::NicLister;
use crate::error::Result;
use crate::nic::{CurrentNic, DesiredNic, NicAction};

pub use align::align;
pub use current::{destination_nics, sort_by_name};
pub use engine::{nic_name, reconcile};

/// Compute the actions needed to turn `current` into `desired`. `current`
/// must already be sorted by name.
pub fn plan(desired: &[DesiredNic], current: &[CurrentNic]) -> Vec<NicAction> {
    reconcile(&align(desired, current))
}

/// Check every desired entry before anything is sent to the backend.
pub fn validate_desired(desired: &[DesiredNic]) -> Result<()> {
    desired.iter().try_for_each(DesiredNic::validate)
}

/// Validate `desired`, order `current` by name and plan the actions.
pub fn plan_nics(desired: &[DesiredNic], mut current: Vec<CurrentNic>) -> Result<Vec<NicAction>> {
    validate_desired(desired)?;
    sort_by_name(&mut current);
    Ok(plan(desired, &current))
}

/// Bring the VM's NICs in line with `desired`.
///
/// `None` means "inherit the template's NICs" and touches nothing, unlike an
/// empty list which removes every NIC. Actions are applied in position order
/// and the first failure aborts the rest of the run; already applied actions
/// are not rolled back.
pub async fn reconcile_nics(
    desired: Option<&[DesiredNic]>,
    lister: &dyn NicLister,
    vm_id: &str,
    adapter: &dyn BackendAdapter,
) -> Result<()> {
    let Some(desired) = desired else {
        info!(vm = %vm_id, "NIC settings will be inherited from the template");
        return Ok(());
    };

    validate_desired(desired)?;

    let current = destination_nics(lister, vm_id).await?;
    let current_count = current.len();
    let actions = plan_nics(desired, current)?;
    info!(
        vm = %vm_id,
        adapter = adapter.name(),
        desired = desired.len(),
        current = current_count,
        actions = actions.len(),
        "Reconciling NICs"
    );

    for (idx, action) in actions.iter().enumerate() {
        debug!(vm = %vm_id, position = idx, action = action.kind(), "Applying NIC action");
        if let Err(e) = adapter.apply(action).await {
            error!(
                vm = %vm_id,
                position = idx,
                action = action.kind(),
                "NIC reconciliation aborted: {}",
                e
            );
            return Err(e);
        }
    }

    Ok(())
}
