//! Backend adapters - apply a single [`NicAction`] through one API generation.
//!
//! The two generations manage NICs differently:
//! - [`LegacyAdapter`] (v3): resolves network names itself, supports the
//!   interface model hint, destroys NIC objects directly
//! - [`ModernAdapter`] (v4): attaches NICs to vnic profiles through the VM's
//!   NICs sub-resource
//!
//! One adapter is picked per run; runs never mix generations.

pub mod legacy;
pub mod modern;

use async_trait::async_trait;

use crate::error::Result;
use crate::nic::NicAction;

pub use legacy::LegacyAdapter;
pub use modern::ModernAdapter;

/// Applies reconciliation actions to the backend.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Adapter name for logs.
    fn name(&self) -> &'static str;

    /// Apply one action as a single remote call. No retries.
    async fn apply(&self, action: &NicAction) -> Result<()>;
}
