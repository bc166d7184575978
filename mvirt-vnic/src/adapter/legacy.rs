//! Legacy (v3) adapter.

use async_trait::async_trait;
use tracing::{info, warn};

use super::BackendAdapter;
use crate::clients::{LegacyNicApi, LegacyNicOptions, Network, NetworkResolver};
use crate::error::{Result, VnicError};
use crate::nic::{NicAction, NicSettings};

/// Applies actions through the v3 API, resolving network names in the
/// destination cluster at apply time.
pub struct LegacyAdapter<'a> {
    networks: &'a dyn NetworkResolver,
    nics: &'a dyn LegacyNicApi,
    cluster_id: String,
    vm_id: String,
}

impl<'a> LegacyAdapter<'a> {
    pub fn new(
        networks: &'a dyn NetworkResolver,
        nics: &'a dyn LegacyNicApi,
        cluster_id: impl Into<String>,
        vm_id: impl Into<String>,
    ) -> Self {
        Self {
            networks,
            nics,
            cluster_id: cluster_id.into(),
            vm_id: vm_id.into(),
        }
    }

    async fn resolve(&self, name: &str) -> Result<Network> {
        let network = self
            .networks
            .find_network(&self.cluster_id, name)
            .await
            .map_err(VnicError::backend("find_network"))?;

        network.ok_or_else(|| {
            warn!(cluster = %self.cluster_id, "Cannot find network name={}", name);
            VnicError::NetworkNotFound {
                name: name.to_string(),
            }
        })
    }

    async fn options(&self, name: &str, settings: &NicSettings) -> Result<LegacyNicOptions> {
        let network = self.resolve(&settings.network).await?;
        Ok(LegacyNicOptions {
            name: Some(name.to_string()),
            interface: settings.interface.clone(),
            network_id: Some(network.id),
            mac_address: settings.mac_address.clone(),
        })
    }
}

#[async_trait]
impl BackendAdapter for LegacyAdapter<'_> {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn apply(&self, action: &NicAction) -> Result<()> {
        match action {
            NicAction::Create { name, settings } => {
                let options = self.options(name, settings).await?;
                info!(vm = %self.vm_id, "Creating NIC with options: {:?}", options);
                self.nics
                    .create_nic(&self.vm_id, &options)
                    .await
                    .map_err(VnicError::backend("create_nic"))
            }
            NicAction::Update {
                target_id,
                name,
                settings,
            } => {
                let options = self.options(name, settings).await?;
                info!(vm = %self.vm_id, nic = %target_id, "Updating NIC with options: {:?}", options);
                self.nics
                    .apply_options(target_id, &options)
                    .await
                    .map_err(VnicError::backend("apply_options"))
            }
            NicAction::Delete { target_id } => {
                info!(vm = %self.vm_id, nic = %target_id, "Destroying unneeded NIC");
                self.nics
                    .destroy_nic(target_id)
                    .await
                    .map_err(VnicError::backend("destroy_nic"))
            }
        }
    }
}
