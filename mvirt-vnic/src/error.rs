//! Error types for vNIC reconciliation.

use thiserror::Error;

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum VnicError {
    /// A referenced network could not be resolved in the destination cluster.
    #[error("Unable to find specified network: <{name}>")]
    NetworkNotFound { name: String },

    /// A remote create/update/delete/list call failed.
    #[error("Backend {operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A desired entry is malformed.
    #[error("Invalid desired NIC state: {0}")]
    InvalidDesiredState(String),
}

impl VnicError {
    /// Wrap a collaborator error with the remote operation that produced it.
    pub fn backend(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| VnicError::Backend { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, VnicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_not_found_names_network() {
        let err = VnicError::NetworkNotFound {
            name: "vlan-42".to_string(),
        };
        assert_eq!(err.to_string(), "Unable to find specified network: <vlan-42>");
    }

    #[test]
    fn test_backend_error_names_operation() {
        let err = VnicError::backend("remove")(anyhow::anyhow!("conflict"));
        assert_eq!(err.to_string(), "Backend remove failed: conflict");
    }
}
