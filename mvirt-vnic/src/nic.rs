//! vNIC data model: desired entries, live NICs and the actions between them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VnicError};

/// Network reference meaning "attach to no vnic profile".
pub const NO_PROFILE: &str = "<Empty>";

/// One entry of the requested NIC layout. Its index in the list is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredNic {
    /// Network name (legacy API), vnic profile id (modern API) or [`NO_PROFILE`].
    pub network: String,
    /// Driver/model hint such as `virtio` or `e1000`. Only the legacy API honours it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Requested MAC address. The backend assigns one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl DesiredNic {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            ..Default::default()
        }
    }

    pub fn with_mac_address(mut self, mac_address: impl Into<String>) -> Self {
        self.mac_address = Some(mac_address.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Check the entry before any backend call is made.
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.network) {
            return Err(VnicError::InvalidDesiredState(
                "NIC network is required".to_string(),
            ));
        }
        if let Some(mac) = non_blank(&self.mac_address)
            && !is_valid_mac(&mac)
        {
            return Err(VnicError::InvalidDesiredState(format!(
                "invalid MAC address '{}' for network {}",
                mac, self.network
            )));
        }
        Ok(())
    }

    /// Settings to send, with blank optional fields dropped.
    pub fn settings(&self) -> NicSettings {
        NicSettings {
            network: self.network.clone(),
            mac_address: non_blank(&self.mac_address),
            interface: non_blank(&self.interface),
        }
    }
}

/// A NIC as it currently exists on the destination VM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentNic {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

/// Settings carried by create and update actions. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicSettings {
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

/// A single step of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NicAction {
    Create {
        name: String,
        #[serde(flatten)]
        settings: NicSettings,
    },
    Update {
        target_id: String,
        name: String,
        #[serde(flatten)]
        settings: NicSettings,
    },
    Delete {
        target_id: String,
    },
}

impl NicAction {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NicAction::Create { .. } => "create",
            NicAction::Update { .. } => "update",
            NicAction::Delete { .. } => "delete",
        }
    }
}

/// Desired entry and live NIC sharing one list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedPair<'a> {
    Both {
        desired: &'a DesiredNic,
        current: &'a CurrentNic,
    },
    DesiredOnly(&'a DesiredNic),
    CurrentOnly(&'a CurrentNic),
}

impl<'a> AlignedPair<'a> {
    pub fn desired(&self) -> Option<&'a DesiredNic> {
        match *self {
            AlignedPair::Both { desired, .. } | AlignedPair::DesiredOnly(desired) => Some(desired),
            AlignedPair::CurrentOnly(_) => None,
        }
    }

    pub fn current(&self) -> Option<&'a CurrentNic> {
        match *self {
            AlignedPair::Both { current, .. } | AlignedPair::CurrentOnly(current) => Some(current),
            AlignedPair::DesiredOnly(_) => None,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !is_blank(v)).map(str::to_string)
}

/// Six hex octets separated by `:` or `-`. Anything else is rejected before
/// reaching the backend.
fn is_valid_mac(mac: &str) -> bool {
    let octets: Vec<&str> = mac.split([':', '-']).collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}
