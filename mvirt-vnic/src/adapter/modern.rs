//! Modern (v4) adapter.

use async_trait::async_trait;
use tracing::{debug, info};

use super::BackendAdapter;
use crate::clients::{ModernNic, NicsService, VnicProfileRef};
use crate::error::{Result, VnicError};
use crate::nic::{NO_PROFILE, NicAction, NicSettings};

/// Applies actions through the NICs sub-resource of one VM. Network
/// references are vnic profile ids and are sent as given.
pub struct ModernAdapter<'a> {
    nics: Box<dyn NicsService + 'a>,
    vm_id: String,
}

impl<'a> ModernAdapter<'a> {
    pub fn new(nics: Box<dyn NicsService + 'a>, vm_id: impl Into<String>) -> Self {
        Self {
            nics,
            vm_id: vm_id.into(),
        }
    }
}

/// Build the NIC body. [`NO_PROFILE`] becomes a null profile reference.
fn nic_body(name: &str, settings: &NicSettings) -> ModernNic {
    if let Some(interface) = &settings.interface {
        debug!(nic = %name, "Ignoring interface {} (not supported by the v4 API)", interface);
    }

    let profile_id = (settings.network != NO_PROFILE).then(|| settings.network.clone());
    ModernNic {
        name: Some(name.to_string()),
        vnic_profile: Some(VnicProfileRef { id: profile_id }),
        mac_address: settings.mac_address.clone(),
    }
}

#[async_trait]
impl BackendAdapter for ModernAdapter<'_> {
    fn name(&self) -> &'static str {
        "modern"
    }

    async fn apply(&self, action: &NicAction) -> Result<()> {
        match action {
            NicAction::Create { name, settings } => {
                let nic = nic_body(name, settings);
                info!(vm = %self.vm_id, "Adding NIC: {:?}", nic);
                self.nics
                    .add(&nic)
                    .await
                    .map_err(VnicError::backend("add"))
            }
            NicAction::Update {
                target_id,
                name,
                settings,
            } => {
                let nic = nic_body(name, settings);
                info!(vm = %self.vm_id, nic = %target_id, "Updating NIC: {:?}", nic);
                self.nics
                    .update(target_id, &nic)
                    .await
                    .map_err(VnicError::backend("update"))
            }
            NicAction::Delete { target_id } => {
                info!(vm = %self.vm_id, nic = %target_id, "Removing unneeded NIC");
                self.nics
                    .remove(target_id)
                    .await
                    .map_err(VnicError::backend("remove"))
            }
        }
    }
}
