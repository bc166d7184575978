//! End-to-end NIC reconciliation against the in-memory backend.
//!
//! Run with: cargo test -p mvirt-vnic --features test-util

use mvirt_vnic::clients::{LegacyNicOptions, ModernNic, VnicProfileRef};
use mvirt_vnic::test_util::{BackendCall, FakeProvider};
use mvirt_vnic::{
    ApiVersion, DesiredNic, Destination, NetworkConfigurator, ProvisionOptions, VnicError,
};

const VM: &str = "vm-42";
const CLUSTER: &str = "cluster-1";

fn destination() -> Destination {
    Destination {
        vm_id: VM.to_string(),
        cluster_id: CLUSTER.to_string(),
    }
}

fn legacy_options(name: &str, network_id: &str) -> LegacyNicOptions {
    LegacyNicOptions {
        name: Some(name.to_string()),
        interface: None,
        network_id: Some(network_id.to_string()),
        mac_address: None,
    }
}

fn modern_nic(name: &str, profile: &str) -> ModernNic {
    ModernNic {
        name: Some(name.to_string()),
        vnic_profile: Some(VnicProfileRef {
            id: Some(profile.to_string()),
        }),
        mac_address: None,
    }
}

/// Backend with three template NICs whose listing comes back unsorted.
fn legacy_backend() -> FakeProvider {
    FakeProvider::legacy()
        .with_network(CLUSTER, "a", "net-a")
        .with_network(CLUSTER, "b", "net-b")
        .with_network(CLUSTER, "c", "net-c")
        .with_nic(VM, "x", "nic1", "net-template", "00:1a:4a:00:00:01")
        .with_nic(VM, "y", "nic2", "net-template", "00:1a:4a:00:00:02")
        .with_nic(VM, "z", "nic3", "net-template", "00:1a:4a:00:00:03")
}

fn networks(names: &[&str]) -> ProvisionOptions {
    ProvisionOptions {
        networks: Some(names.iter().map(|n| Some(DesiredNic::new(*n))).collect()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fewer_desired_updates_then_deletes() {
    let fake = legacy_backend();
    let configurator = NetworkConfigurator::new(&fake, destination());

    configurator
        .configure_network_adapters(&mut networks(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            BackendCall::ApplyOptions {
                nic_id: "x".to_string(),
                options: legacy_options("nic1", "net-a"),
            },
            BackendCall::ApplyOptions {
                nic_id: "y".to_string(),
                options: legacy_options("nic2", "net-b"),
            },
            BackendCall::DestroyNic {
                nic_id: "z".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_more_desired_updates_then_creates() {
    let fake = FakeProvider::modern().with_nic(VM, "x", "nic1", "p0", "00:1a:4a:00:00:01");
    let configurator = NetworkConfigurator::new(&fake, destination());

    configurator
        .configure_network_adapters(&mut networks(&["p1", "p2", "p3"]))
        .await
        .unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            BackendCall::UpdateNic {
                vm_id: VM.to_string(),
                nic_id: "x".to_string(),
                nic: modern_nic("nic1", "p1"),
            },
            BackendCall::AddNic {
                vm_id: VM.to_string(),
                nic: modern_nic("nic2", "p2"),
            },
            BackendCall::AddNic {
                vm_id: VM.to_string(),
                nic: modern_nic("nic3", "p3"),
            },
        ]
    );
    assert_eq!(fake.nics(VM).len(), 3);
    assert_eq!(fake.connections(), vec![ApiVersion::V4]);
}

#[tokio::test]
async fn test_failed_resolution_aborts_remaining_actions() {
    let fake = FakeProvider::legacy()
        .with_network(CLUSTER, "a", "net-a")
        .with_network(CLUSTER, "c", "net-c")
        .with_nic(VM, "x", "nic1", "net-template", "00:1a:4a:00:00:01");
    let configurator = NetworkConfigurator::new(&fake, destination());

    let err = configurator
        .configure_network_adapters(&mut networks(&["a", "missing", "c"]))
        .await
        .unwrap_err();

    match err {
        VnicError::NetworkNotFound { name } => assert_eq!(name, "missing"),
        other => panic!("expected NetworkNotFound, got {other:?}"),
    }
    // First action stays committed, third is never attempted
    assert_eq!(
        fake.calls(),
        vec![BackendCall::ApplyOptions {
            nic_id: "x".to_string(),
            options: legacy_options("nic1", "net-a"),
        }]
    );
    assert_eq!(fake.open_connections(), 0);
}

#[tokio::test]
async fn test_backend_failure_stops_the_run() {
    let fake = legacy_backend().fail_on("destroy_nic");
    let configurator = NetworkConfigurator::new(&fake, destination());

    let err = configurator
        .configure_network_adapters(&mut networks(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VnicError::Backend {
            operation: "destroy_nic",
            ..
        }
    ));
    // Update of x went through; destroying y failed and z was never attempted
    assert_eq!(fake.calls().len(), 1);
    assert_eq!(fake.nics(VM).len(), 3);
}

#[tokio::test]
async fn test_rerun_produces_same_updates() {
    let fake = FakeProvider::modern()
        .with_nic(VM, "x", "eth0", "p0", "00:1a:4a:00:00:01")
        .with_nic(VM, "y", "eth1", "p0", "00:1a:4a:00:00:02");
    let configurator = NetworkConfigurator::new(&fake, destination());

    configurator
        .configure_network_adapters(&mut networks(&["p1", "p2"]))
        .await
        .unwrap();
    let first = fake.calls();

    configurator
        .configure_network_adapters(&mut networks(&["p1", "p2"]))
        .await
        .unwrap();
    let all = fake.calls();

    assert_eq!(first.len(), 2);
    assert_eq!(&all[2..], first.as_slice());
}

#[tokio::test]
async fn test_absent_mac_keeps_existing_address() {
    let fake = legacy_backend();
    let configurator = NetworkConfigurator::new(&fake, destination());

    let mut options = ProvisionOptions {
        networks: Some(vec![
            Some(DesiredNic::new("a")),
            Some(DesiredNic::new("b").with_mac_address("00:1a:4a:00:00:bb")),
            Some(DesiredNic::new("c").with_interface("virtio")),
        ]),
        ..Default::default()
    };
    configurator
        .configure_network_adapters(&mut options)
        .await
        .unwrap();

    let nics = fake.nics(VM);
    assert_eq!(nics[0].mac_address.as_deref(), Some("00:1a:4a:00:00:01"));
    assert_eq!(nics[1].mac_address.as_deref(), Some("00:1a:4a:00:00:bb"));
    assert_eq!(nics[2].mac_address.as_deref(), Some("00:1a:4a:00:00:03"));
    assert_eq!(nics[2].network_id.as_deref(), Some("net-c"));
}

#[tokio::test]
async fn test_invalid_desired_entry_touches_nothing() {
    let fake = legacy_backend();
    let configurator = NetworkConfigurator::new(&fake, destination());

    let mut options = ProvisionOptions {
        networks: Some(vec![
            Some(DesiredNic::new("a")),
            Some(DesiredNic::new("b").with_mac_address("not-a-mac")),
        ]),
        ..Default::default()
    };
    let err = configurator
        .configure_network_adapters(&mut options)
        .await
        .unwrap_err();

    assert!(matches!(err, VnicError::InvalidDesiredState(_)));
    assert!(fake.calls().is_empty());
    assert_eq!(fake.queries(), 0);
}

#[tokio::test]
async fn test_unset_networks_inherit_template() {
    let fake = legacy_backend();
    let configurator = NetworkConfigurator::new(&fake, destination());

    configurator
        .configure_network_adapters(&mut ProvisionOptions::default())
        .await
        .unwrap();

    assert!(fake.connections().is_empty());
    assert!(fake.calls().is_empty());
    assert_eq!(fake.nics(VM).len(), 3);
}
