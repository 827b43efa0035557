use std::{collections::HashSet, net::SocketAddr, path::Path, time::Duration};

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::client::ClientError;

/// Identity of one cluster member, conventionally its `host:port` address.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReplicaId(pub String);

impl From<&str> for ReplicaId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<SocketAddr> for ReplicaId {
    fn from(value: SocketAddr) -> Self {
        Self(value.to_string())
    }
}

impl ReplicaId {
    pub fn socket_addr(&self) -> crate::Result<SocketAddr> {
        self.0
            .parse()
            .map_err(|err| crate::err!("replica {self} is not a socket address: {err}"))
    }
}

/// Static membership and fault bound of the cluster.
///
/// Only obtainable through [`ClusterConfig::new`], so every instance satisfies
/// `replicas.len() >= 3 * num_faulty + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    replicas: Vec<ReplicaId>,
    num_faulty: usize,
    request_timeout: Duration,
}

impl ClusterConfig {
    pub fn new(
        replicas: impl Into<Vec<ReplicaId>>,
        num_faulty: usize,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let replicas = replicas.into();
        if replicas.is_empty() {
            return Err(ClientError::Configuration("empty replica set".into()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicated) = replicas.iter().find(|&id| !seen.insert(id)) {
            return Err(ClientError::Configuration(format!(
                "replica {duplicated} listed more than once"
            )));
        }
        let Some(min_replicas) = num_faulty.checked_mul(3).and_then(|n| n.checked_add(1)) else {
            return Err(ClientError::Configuration(format!(
                "cannot tolerate {num_faulty} faulty replicas"
            )));
        };
        if replicas.len() < min_replicas {
            return Err(ClientError::Configuration(format!(
                "{} replicas cannot tolerate {num_faulty} faulty (need at least {min_replicas})",
                replicas.len(),
            )));
        }
        if request_timeout.is_zero() {
            return Err(ClientError::Configuration("zero request timeout".into()));
        }
        Ok(Self {
            replicas,
            num_faulty,
            request_timeout,
        })
    }

    pub fn replicas(&self) -> &[ReplicaId] {
        &self.replicas
    }

    pub fn num_replica(&self) -> usize {
        self.replicas.len()
    }

    pub fn num_faulty(&self) -> usize {
        self.num_faulty
    }

    /// Matching responses needed before a result is trusted.
    pub fn quorum_size(&self) -> usize {
        self.num_faulty + 1
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn primary(&self, view_num: u64) -> &ReplicaId {
        &self.replicas[(view_num % self.replicas.len() as u64) as usize]
    }
}

/// On-disk client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub client_id: String,
    /// Where replicas push their replies. No inbox means only the unary
    /// replies of contacted replicas are counted.
    #[serde(default)]
    pub inbox: Option<SocketAddr>,
    pub replicas: Vec<ReplicaId>,
    pub num_faulty: usize,
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| crate::err!("read config {}: {err}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn cluster(&self) -> Result<ClusterConfig, ClientError> {
        ClusterConfig::new(
            self.replicas.clone(),
            self.num_faulty,
            Duration::from_millis(self.request_timeout_ms),
        )
    }
}
