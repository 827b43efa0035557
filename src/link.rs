use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpStream;

use crate::{
    aggregator::ReplicaResponse,
    config::{ClusterConfig, ReplicaId},
    net,
    request::ClientRequest,
};

/// Outbound channel to one replica.
///
/// A link sends once and never retries; retrying is the caller's business. A
/// replica that never answers simply leaves the returned future pending.
#[async_trait::async_trait]
pub trait ReplicaLink
where
    Self: Send + Sync + 'static,
{
    fn replica(&self) -> &ReplicaId;

    /// The `ClientRequestPBFT` unary call.
    async fn client_request(&self, request: ClientRequest) -> crate::Result<ReplicaResponse>;
}

#[derive(Debug, Clone)]
pub struct TcpLink {
    replica: ReplicaId,
    addr: SocketAddr,
}

impl TcpLink {
    pub fn new(replica: ReplicaId) -> crate::Result<Self> {
        let addr = replica.socket_addr()?;
        Ok(Self { replica, addr })
    }

    pub fn for_cluster(config: &ClusterConfig) -> crate::Result<Vec<Arc<dyn ReplicaLink>>> {
        config
            .replicas()
            .iter()
            .map(|replica| Ok(Arc::new(Self::new(replica.clone())?) as Arc<dyn ReplicaLink>))
            .collect()
    }
}

#[async_trait::async_trait]
impl ReplicaLink for TcpLink {
    fn replica(&self) -> &ReplicaId {
        &self.replica
    }

    async fn client_request(&self, request: ClientRequest) -> crate::Result<ReplicaResponse> {
        let mut connection = net::framed(TcpStream::connect(self.addr).await?);
        net::send(&mut connection, &request).await?;
        let Some(response) = net::recv::<ReplicaResponse>(&mut connection).await? else {
            crate::bail!("replica {} closed connection before reply", self.replica)
        };
        // the peer we dialed may not vote on behalf of another replica
        if response.from_replica != self.replica {
            crate::bail!(
                "replica {} answered as {}",
                self.replica,
                response.from_replica
            )
        }
        Ok(response)
    }
}
