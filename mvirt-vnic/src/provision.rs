//! Provisioning driver - configures the network adapters of a freshly
//! provisioned VM.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adapter::{LegacyAdapter, ModernAdapter};
use crate::clients::{ApiVersion, Connection, Provider};
use crate::error::{Result, VnicError};
use crate::nic::DesiredNic;
use crate::reconciler::reconcile_nics;

/// Network-related provisioning options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionOptions {
    /// Requested NIC layout. `None` keeps the template's NICs untouched.
    /// A `null` slot is only valid in first position, where the dialog VLAN
    /// fills it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<Option<DesiredNic>>>,
    /// Network picked in the provisioning dialog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
    /// MAC address picked in the provisioning dialog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl ProvisionOptions {
    fn requested_vlan(&self) -> Option<&str> {
        self.vlan.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Turn the dialog's VLAN choice into the first NIC, unless the first
    /// slot is already taken.
    pub fn apply_dialog_nic(&mut self) {
        let Some(vlan) = self.requested_vlan().map(str::to_string) else {
            return;
        };

        let networks = self.networks.get_or_insert_with(Vec::new);
        if networks.is_empty() {
            networks.push(None);
        }
        if networks[0].is_none() {
            info!(vlan = %vlan, "Using dialog VLAN for the first NIC");
            let mut nic = DesiredNic::new(vlan);
            nic.mac_address = self.mac_address.clone();
            networks[0] = Some(nic);
        }
    }

    /// The requested NIC layout, or `None` to inherit the template's NICs.
    /// Fails on slots left empty.
    pub fn desired_nics(&self) -> Result<Option<Vec<DesiredNic>>> {
        let Some(networks) = &self.networks else {
            return Ok(None);
        };

        networks
            .iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.clone().ok_or_else(|| {
                    VnicError::InvalidDesiredState(format!("NIC slot {} is empty", idx + 1))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// The VM being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub vm_id: String,
    pub cluster_id: String,
}

/// Configures NICs on a destination VM through a provider.
pub struct NetworkConfigurator<'a> {
    provider: &'a dyn Provider,
    destination: Destination,
}

impl<'a> NetworkConfigurator<'a> {
    pub fn new(provider: &'a dyn Provider, destination: Destination) -> Self {
        Self {
            provider,
            destination,
        }
    }

    /// API generation used for this provider.
    pub fn api_version(&self) -> ApiVersion {
        if self.provider.supports_profile_update() {
            ApiVersion::V4
        } else {
            ApiVersion::V3
        }
    }

    async fn connect(&self, version: ApiVersion) -> Result<Box<dyn Connection>> {
        self.provider
            .connect(version)
            .await
            .map_err(VnicError::backend("connect"))
    }

    /// Reconcile the VM's NICs with the requested layout.
    pub async fn configure_network_adapters(&self, options: &mut ProvisionOptions) -> Result<()> {
        options.apply_dialog_nic();

        let Some(desired) = options.desired_nics()? else {
            info!(vm = %self.destination.vm_id, "NIC settings will be inherited from the template");
            return Ok(());
        };
        let desired = desired.as_slice();

        let version = self.api_version();
        info!(
            vm = %self.destination.vm_id,
            api = %version,
            "Configuring {} requested NICs",
            desired.len()
        );

        let conn = self.connect(version).await?;
        let vm_id = self.destination.vm_id.as_str();
        match version {
            ApiVersion::V3 => {
                let adapter = LegacyAdapter::new(
                    conn.networks(),
                    conn.legacy_nics(),
                    &self.destination.cluster_id,
                    vm_id,
                );
                reconcile_nics(Some(desired), conn.nic_lister(), vm_id, &adapter).await
            }
            ApiVersion::V4 => {
                let adapter = ModernAdapter::new(conn.vm_nics(vm_id), vm_id);
                reconcile_nics(Some(desired), conn.nic_lister(), vm_id, &adapter).await
            }
        }
    }

    /// MAC address of the VM's NIC attached to the dialog's VLAN, if any.
    pub async fn mac_address_of_nic_on_requested_vlan(
        &self,
        options: &ProvisionOptions,
    ) -> Result<Option<String>> {
        let Some(vlan) = options.requested_vlan() else {
            return Ok(None);
        };

        let conn = self.connect(self.api_version()).await?;
        let network = conn
            .networks()
            .find_network(&self.destination.cluster_id, vlan)
            .await
            .map_err(VnicError::backend("find_network"))?;
        let Some(network) = network else {
            warn!(cluster = %self.destination.cluster_id, "Cannot find network name={}", vlan);
            return Ok(None);
        };

        let nics = conn
            .nic_lister()
            .list_nics(&self.destination.vm_id)
            .await
            .map_err(VnicError::backend("list_nics"))?;
        let nic = nics
            .into_iter()
            .find(|n| n.network_id.as_deref() == Some(network.id.as_str()));
        match nic {
            Some(nic) => Ok(nic.mac_address),
            None => {
                warn!(vm = %self.destination.vm_id, "Cannot find NIC with network id={}", network.id);
                Ok(None)
            }
        }
    }
}
