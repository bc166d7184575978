//! Seams to the virtualization backend.
//!
//! The reconciler never speaks the backend wire protocol itself. It goes
//! through these traits:
//! - [`Provider`]: capability query and session acquisition
//! - [`Connection`]: one authenticated session, released on drop
//! - [`legacy::LegacyNicApi`]: NIC calls of the v3 API
//! - [`modern::NicsService`]: the VM-scoped NICs sub-resource of the v4 API

pub mod legacy;
pub mod modern;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crate::nic::CurrentNic;

pub use legacy::{LegacyNicApi, LegacyNicOptions};
pub use modern::{ModernNic, NicsService, VnicProfileRef};

/// Backend API generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V3,
    V4,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V3 => write!(f, "v3"),
            ApiVersion::V4 => write!(f, "v4"),
        }
    }
}

/// A logical network as known by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub id: String,
    pub name: String,
}

/// Looks up logical networks by name.
#[async_trait]
pub trait NetworkResolver: Send + Sync {
    /// Find a network attached to the given cluster.
    async fn find_network(&self, cluster_id: &str, name: &str) -> Result<Option<Network>>;
}

/// Lists the NICs of a VM. The order of the result is unspecified.
#[async_trait]
pub trait NicLister: Send + Sync {
    async fn list_nics(&self, vm_id: &str) -> Result<Vec<CurrentNic>>;
}

/// One backend session.
pub trait Connection: Send + Sync {
    fn networks(&self) -> &dyn NetworkResolver;

    fn nic_lister(&self) -> &dyn NicLister;

    fn legacy_nics(&self) -> &dyn LegacyNicApi;

    /// NICs sub-resource of the given VM.
    fn vm_nics<'a>(&'a self, vm_id: &str) -> Box<dyn NicsService + 'a>;
}

/// The management system hosting the destination VM.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Whether NICs can be attached to vnic profiles (v4 NIC management).
    fn supports_profile_update(&self) -> bool;

    /// Open a session. It is closed when the returned value is dropped.
    async fn connect(&self, version: ApiVersion) -> Result<Box<dyn Connection>>;
}
