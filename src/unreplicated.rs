//! A single, non-replicated replica answering `ClientRequestPBFT` calls.
//!
//! It executes every new request directly against its app, with none of the
//! pre-prepare/prepare/commit phases. Running several of them side by side
//! gives independent replicas that agree as long as every one of them sees the
//! same requests, which is what the client's broadcast phase provides.

use std::{collections::HashMap, net::SocketAddr};

use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    aggregator::ReplicaResponse,
    app::App,
    config::ReplicaId,
    model::{event_channel, EventSender, EventSource},
    net,
    request::ClientRequest,
};

#[derive(Debug, Clone)]
pub struct Replica {
    pub id: ReplicaId,
    pub view_num: u64,
    /// Client inbox that also receives a copy of every reply.
    pub inbox: Option<SocketAddr>,
}

#[derive(Debug)]
pub struct Submit(ClientRequest, oneshot::Sender<ReplicaResponse>);

pub async fn run_replica(replica: Replica, app: impl App, listener: TcpListener) -> crate::Result<()> {
    let (event, source) = event_channel();
    tracing::info!(id = %replica.id, addr = %listener.local_addr()?, "replica up");
    tokio::try_join!(replica_loop(replica, app, source), serve(listener, event))?;
    Ok(())
}

async fn serve(listener: TcpListener, event: EventSender<Submit>) -> crate::Result<()> {
    loop {
        let (stream, remote) = listener.accept().await?;
        let event = event.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_connection(net::framed(stream), event).await {
                tracing::warn!(%remote, "client connection: {err}")
            }
        });
    }
}

async fn serve_connection(
    mut connection: net::Connection,
    event: EventSender<Submit>,
) -> crate::Result<()> {
    while let Some(request) = net::recv::<ClientRequest>(&mut connection).await? {
        let (sender, receiver) = oneshot::channel();
        event.send(Submit(request, sender))?;
        // a stale request gets no reply
        let Ok(response) = receiver.await else {
            break;
        };
        net::send(&mut connection, &response).await?
    }
    Ok(())
}

pub async fn replica_loop(
    replica: Replica,
    mut app: impl App,
    mut source: EventSource<Submit>,
) -> crate::Result<()> {
    let mut replies = HashMap::<String, ReplicaResponse>::new();
    while let Some(Submit(request, sender)) = source.option_next().await {
        let response = match replies.get(&request.client_id) {
            Some(reply) if reply.timestamp > request.timestamp => {
                tracing::debug!(client = %request.client_id, "ignore stale request");
                continue;
            }
            Some(reply) if reply.timestamp == request.timestamp => reply.clone(),
            _ => {
                let result = app.execute(&request.operation);
                let response =
                    ReplicaResponse::new(replica.id.clone(), &request, result, replica.view_num);
                replies.insert(request.client_id.clone(), response.clone());
                tracing::debug!(client = %request.client_id, timestamp = request.timestamp, "executed");
                response
            }
        };
        if let Some(inbox) = replica.inbox {
            let response = response.clone();
            tokio::spawn(async move {
                if let Err(err) = net::push_reply(inbox, &response).await {
                    tracing::warn!(%inbox, "push reply: {err}")
                }
            });
        }
        // the client may have given up on this connection
        let _ = sender.send(response);
    }
    Ok(())
}
