//! mvirt-vnic: vNIC reconciliation for freshly provisioned VMs.
//!
//! Aligns the requested NIC layout with the NICs a new VM inherited from its
//! template and applies the resulting create/update/delete actions through
//! the legacy (v3) or modern (v4) backend API.

pub mod adapter;
pub mod clients;
pub mod error;
pub mod nic;
pub mod provision;
pub mod reconciler;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use adapter::{BackendAdapter, LegacyAdapter, ModernAdapter};
pub use clients::{ApiVersion, Connection, Provider};
pub use error::{Result, VnicError};
pub use nic::{AlignedPair, CurrentNic, DesiredNic, NO_PROFILE, NicAction, NicSettings};
pub use provision::{Destination, NetworkConfigurator, ProvisionOptions};
pub use reconciler::{
    align, destination_nics, plan, plan_nics, reconcile, reconcile_nics, validate_desired,
};
