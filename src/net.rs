//! Length-delimited bincode frames over TCP, and the client's reply inbox.

use std::net::SocketAddr;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::{aggregator::ReplicaResponse, model::EventSender, router::RouterEvent};

pub type Connection = Framed<TcpStream, LengthDelimitedCodec>;

pub fn framed(stream: TcpStream) -> Connection {
    Framed::new(stream, LengthDelimitedCodec::new())
}

pub async fn send<M: Serialize>(connection: &mut Connection, message: &M) -> crate::Result<()> {
    let buf = bincode::serialize(message)?;
    connection.send(Bytes::from(buf)).await?;
    Ok(())
}

/// `None` when the peer closed the connection cleanly.
pub async fn recv<M: DeserializeOwned>(connection: &mut Connection) -> crate::Result<Option<M>> {
    let Some(frame) = connection.next().await else {
        return Ok(None);
    };
    Ok(Some(bincode::deserialize(&frame?)?))
}

/// Pushes one reply to a client inbox.
pub async fn push_reply(inbox: SocketAddr, response: &ReplicaResponse) -> crate::Result<()> {
    let mut connection = framed(TcpStream::connect(inbox).await?);
    send(&mut connection, response).await
}

/// Accepts replica connections and forwards every decoded reply to the router.
///
/// A malformed peer only loses its own connection.
pub async fn serve_inbox(
    listener: TcpListener,
    router: EventSender<RouterEvent>,
) -> crate::Result<()> {
    loop {
        let (stream, remote) = listener.accept().await?;
        let router = router.clone();
        tokio::spawn(async move {
            let mut connection = framed(stream);
            loop {
                match recv::<ReplicaResponse>(&mut connection).await {
                    Ok(Some(response)) => {
                        if router.send(RouterEvent::Reply(response)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(%remote, "inbox connection: {err}");
                        break;
                    }
                }
            }
        });
    }
}
