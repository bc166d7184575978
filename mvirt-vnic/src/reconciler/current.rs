//! Live NIC listing for the destination VM.

use tracing::debug;

use crate::clients::NicLister;
use crate::error::{Result, VnicError};
use crate::nic::CurrentNic;

/// Order NICs by name. The backend returns them in no particular order, and
/// positional pairing needs a stable one.
pub fn sort_by_name(nics: &mut [CurrentNic]) {
    nics.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Fetch the VM's NICs, sorted by name.
pub async fn destination_nics(lister: &dyn NicLister, vm_id: &str) -> Result<Vec<CurrentNic>> {
    let mut nics = lister
        .list_nics(vm_id)
        .await
        .map_err(VnicError::backend("list_nics"))?;
    sort_by_name(&mut nics);
    debug!(vm = %vm_id, count = nics.len(), "Listed destination NICs");
    Ok(nics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unordered;

    #[async_trait]
    impl NicLister for Unordered {
        async fn list_nics(&self, _vm_id: &str) -> anyhow::Result<Vec<CurrentNic>> {
            Ok(["nic3", "nic1", "nic2"]
                .iter()
                .map(|name| CurrentNic {
                    id: format!("id-{name}"),
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect())
        }
    }

    struct Broken;

    #[async_trait]
    impl NicLister for Broken {
        async fn list_nics(&self, _vm_id: &str) -> anyhow::Result<Vec<CurrentNic>> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn test_sorted_by_name() {
        let nics = destination_nics(&Unordered, "vm-1").await.unwrap();
        let names: Vec<_> = nics.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["nic1", "nic2", "nic3"]);
    }

    #[tokio::test]
    async fn test_list_failure_is_backend_error() {
        let err = destination_nics(&Broken, "vm-1").await.unwrap_err();
        assert!(matches!(
            err,
            VnicError::Backend {
                operation: "list_nics",
                ..
            }
        ));
    }
}
