//! The VM-scoped NICs sub-resource of the modern (v4) API.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Reference to a vnic profile. A `None` id detaches the NIC from any profile
/// and is serialized as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VnicProfileRef {
    pub id: Option<String>,
}

/// NIC body for add and update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModernNic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnic_profile: Option<VnicProfileRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

#[async_trait]
pub trait NicsService: Send + Sync {
    async fn add(&self, nic: &ModernNic) -> Result<()>;

    async fn update(&self, nic_id: &str, nic: &ModernNic) -> Result<()>;

    async fn remove(&self, nic_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_profile_is_sent_explicitly() {
        let nic = ModernNic {
            name: Some("nic1".to_string()),
            vnic_profile: Some(VnicProfileRef { id: None }),
            mac_address: None,
        };
        assert_eq!(
            serde_json::to_value(&nic).unwrap(),
            serde_json::json!({"name": "nic1", "vnic_profile": {"id": null}})
        );
    }
}
