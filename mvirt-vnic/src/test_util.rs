//! In-memory backend for tests.
//!
//! [`FakeProvider`] keeps live NIC state per VM, applies every call to it and
//! records the mutating calls so tests can assert on the exact sequence sent
//! to the backend.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::clients::{
    ApiVersion, Connection, LegacyNicApi, LegacyNicOptions, ModernNic, Network, NetworkResolver,
    NicLister, NicsService, Provider,
};
use crate::nic::CurrentNic;

/// A mutating call received by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateNic {
        vm_id: String,
        options: LegacyNicOptions,
    },
    ApplyOptions {
        nic_id: String,
        options: LegacyNicOptions,
    },
    DestroyNic {
        nic_id: String,
    },
    AddNic {
        vm_id: String,
        nic: ModernNic,
    },
    UpdateNic {
        vm_id: String,
        nic_id: String,
        nic: ModernNic,
    },
    RemoveNic {
        vm_id: String,
        nic_id: String,
    },
}

#[derive(Default)]
struct State {
    /// (cluster id, network)
    networks: Vec<(String, Network)>,
    nics: BTreeMap<String, Vec<CurrentNic>>,
    calls: Vec<BackendCall>,
    queries: usize,
    connections: Vec<ApiVersion>,
    open_connections: usize,
    fail_on: HashSet<String>,
}

/// Fake management system. Clones share state.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<State>>,
    profile_update: bool,
}

impl FakeProvider {
    /// Backend without vnic profile support.
    pub fn legacy() -> Self {
        Self::default()
    }

    /// Backend with vnic profile support.
    pub fn modern() -> Self {
        Self {
            profile_update: true,
            ..Self::default()
        }
    }

    pub fn with_network(self, cluster_id: &str, name: &str, id: &str) -> Self {
        self.lock().networks.push((
            cluster_id.to_string(),
            Network {
                id: id.to_string(),
                name: name.to_string(),
            },
        ));
        self
    }

    pub fn with_nic(self, vm_id: &str, id: &str, name: &str, network_id: &str, mac: &str) -> Self {
        self.lock()
            .nics
            .entry(vm_id.to_string())
            .or_default()
            .push(CurrentNic {
                id: id.to_string(),
                name: name.to_string(),
                network_id: Some(network_id.to_string()),
                mac_address: Some(mac.to_string()),
            });
        self
    }

    /// Make every call of the named operation fail.
    pub fn fail_on(self, operation: &str) -> Self {
        self.lock().fail_on.insert(operation.to_string());
        self
    }

    /// Mutating calls received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Number of read-only calls (listings and lookups).
    pub fn queries(&self) -> usize {
        self.lock().queries
    }

    /// API versions of every session opened so far.
    pub fn connections(&self) -> Vec<ApiVersion> {
        self.lock().connections.clone()
    }

    /// Sessions opened but not yet released.
    pub fn open_connections(&self) -> usize {
        self.lock().open_connections
    }

    /// Live NICs of a VM, in insertion order.
    pub fn nics(&self, vm_id: &str) -> Vec<CurrentNic> {
        self.lock().nics.get(vm_id).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.lock().fail_on.contains(operation) {
            bail!("injected failure in {}", operation);
        }
        Ok(())
    }

    fn find_nic<'s>(state: &'s mut State, nic_id: &str) -> Result<&'s mut CurrentNic> {
        match state.nics.values_mut().flatten().find(|n| n.id == nic_id) {
            Some(nic) => Ok(nic),
            None => bail!("NIC {} does not exist", nic_id),
        }
    }

    fn drop_nic(state: &mut State, nic_id: &str) -> Result<()> {
        for nics in state.nics.values_mut() {
            if let Some(pos) = nics.iter().position(|n| n.id == nic_id) {
                nics.remove(pos);
                return Ok(());
            }
        }
        bail!("NIC {} does not exist", nic_id)
    }
}

#[async_trait]
impl NetworkResolver for FakeProvider {
    async fn find_network(&self, cluster_id: &str, name: &str) -> Result<Option<Network>> {
        self.check("find_network")?;
        let mut state = self.lock();
        state.queries += 1;
        Ok(state
            .networks
            .iter()
            .find(|(cluster, network)| cluster == cluster_id && network.name == name)
            .map(|(_, network)| network.clone()))
    }
}

#[async_trait]
impl NicLister for FakeProvider {
    /// Returns NICs newest first, like a backend with no ordering guarantee.
    async fn list_nics(&self, vm_id: &str) -> Result<Vec<CurrentNic>> {
        self.check("list_nics")?;
        let mut state = self.lock();
        state.queries += 1;
        let mut nics = state.nics.get(vm_id).cloned().unwrap_or_default();
        nics.reverse();
        Ok(nics)
    }
}

#[async_trait]
impl LegacyNicApi for FakeProvider {
    async fn create_nic(&self, vm_id: &str, options: &LegacyNicOptions) -> Result<()> {
        self.check("create_nic")?;
        let mut state = self.lock();
        state.calls.push(BackendCall::CreateNic {
            vm_id: vm_id.to_string(),
            options: options.clone(),
        });
        state
            .nics
            .entry(vm_id.to_string())
            .or_default()
            .push(CurrentNic {
                id: uuid::Uuid::new_v4().to_string(),
                name: options.name.clone().unwrap_or_default(),
                network_id: options.network_id.clone(),
                mac_address: options.mac_address.clone(),
            });
        Ok(())
    }

    async fn apply_options(&self, nic_id: &str, options: &LegacyNicOptions) -> Result<()> {
        self.check("apply_options")?;
        let mut state = self.lock();
        state.calls.push(BackendCall::ApplyOptions {
            nic_id: nic_id.to_string(),
            options: options.clone(),
        });
        let nic = Self::find_nic(&mut state, nic_id)?;
        if let Some(name) = &options.name {
            nic.name = name.clone();
        }
        if let Some(network_id) = &options.network_id {
            nic.network_id = Some(network_id.clone());
        }
        if let Some(mac) = &options.mac_address {
            nic.mac_address = Some(mac.clone());
        }
        Ok(())
    }

    async fn destroy_nic(&self, nic_id: &str) -> Result<()> {
        self.check("destroy_nic")?;
        let mut state = self.lock();
        state.calls.push(BackendCall::DestroyNic {
            nic_id: nic_id.to_string(),
        });
        Self::drop_nic(&mut state, nic_id)
    }
}

impl Connection for FakeProvider {
    fn networks(&self) -> &dyn NetworkResolver {
        self
    }

    fn nic_lister(&self) -> &dyn NicLister {
        self
    }

    fn legacy_nics(&self) -> &dyn LegacyNicApi {
        self
    }

    fn vm_nics<'a>(&'a self, vm_id: &str) -> Box<dyn NicsService + 'a> {
        Box::new(FakeNicsService {
            provider: self,
            vm_id: vm_id.to_string(),
        })
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn supports_profile_update(&self) -> bool {
        self.profile_update
    }

    async fn connect(&self, version: ApiVersion) -> Result<Box<dyn Connection>> {
        self.check("connect")?;
        {
            let mut state = self.lock();
            state.connections.push(version);
            state.open_connections += 1;
        }
        Ok(Box::new(FakeConnection {
            provider: self.clone(),
        }))
    }
}

/// Session handed out by [`FakeProvider::connect`]; released on drop.
struct FakeConnection {
    provider: FakeProvider,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.provider.lock().open_connections -= 1;
    }
}

impl Connection for FakeConnection {
    fn networks(&self) -> &dyn NetworkResolver {
        &self.provider
    }

    fn nic_lister(&self) -> &dyn NicLister {
        &self.provider
    }

    fn legacy_nics(&self) -> &dyn LegacyNicApi {
        &self.provider
    }

    fn vm_nics<'a>(&'a self, vm_id: &str) -> Box<dyn NicsService + 'a> {
        self.provider.vm_nics(vm_id)
    }
}

struct FakeNicsService<'a> {
    provider: &'a FakeProvider,
    vm_id: String,
}

impl FakeNicsService<'_> {
    fn apply_body(nic: &mut CurrentNic, body: &ModernNic) {
        if let Some(name) = &body.name {
            nic.name = name.clone();
        }
        if let Some(profile) = &body.vnic_profile {
            nic.network_id = profile.id.clone();
        }
        if let Some(mac) = &body.mac_address {
            nic.mac_address = Some(mac.clone());
        }
    }
}

#[async_trait]
impl NicsService for FakeNicsService<'_> {
    async fn add(&self, nic: &ModernNic) -> Result<()> {
        self.provider.check("add")?;
        let mut state = self.provider.lock();
        state.calls.push(BackendCall::AddNic {
            vm_id: self.vm_id.clone(),
            nic: nic.clone(),
        });
        let mut created = CurrentNic {
            id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        };
        Self::apply_body(&mut created, nic);
        state
            .nics
            .entry(self.vm_id.clone())
            .or_default()
            .push(created);
        Ok(())
    }

    async fn update(&self, nic_id: &str, nic: &ModernNic) -> Result<()> {
        self.provider.check("update")?;
        let mut state = self.provider.lock();
        state.calls.push(BackendCall::UpdateNic {
            vm_id: self.vm_id.clone(),
            nic_id: nic_id.to_string(),
            nic: nic.clone(),
        });
        let existing = FakeProvider::find_nic(&mut state, nic_id)?;
        Self::apply_body(existing, nic);
        Ok(())
    }

    async fn remove(&self, nic_id: &str) -> Result<()> {
        self.provider.check("remove")?;
        let mut state = self.provider.lock();
        state.calls.push(BackendCall::RemoveNic {
            vm_id: self.vm_id.clone(),
            nic_id: nic_id.to_string(),
        });
        FakeProvider::drop_nic(&mut state, nic_id)
    }
}
