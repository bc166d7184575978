//! NIC calls of the legacy (v3) API.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Option map sent on NIC create and in-place update. Absent fields are
/// never put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegacyNicOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

#[async_trait]
pub trait LegacyNicApi: Send + Sync {
    /// Create a NIC on the VM.
    async fn create_nic(&self, vm_id: &str, options: &LegacyNicOptions) -> Result<()>;

    /// Apply options to an existing NIC in place.
    async fn apply_options(&self, nic_id: &str, options: &LegacyNicOptions) -> Result<()>;

    /// Destroy a NIC object.
    async fn destroy_nic(&self, nic_id: &str) -> Result<()>;
}
