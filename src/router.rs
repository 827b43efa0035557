//! Routes replies pushed to the client inbox to the call they answer.
//!
//! The table of in-flight calls is owned by the router loop and only changed
//! through its event channel.

use std::collections::HashMap;

use crate::{
    aggregator::ReplicaResponse,
    client::CallEvent,
    model::{EventSender, EventSource},
};

/// `(client_id, timestamp)` of a logical request.
pub type CallKey = (String, i64);

#[derive(Debug)]
pub enum RouterEvent {
    Register(CallKey, EventSender<CallEvent>),
    Deregister(CallKey),
    Reply(ReplicaResponse),
}

pub async fn router_loop(mut source: EventSource<RouterEvent>) -> crate::Result<()> {
    let mut calls = HashMap::<CallKey, EventSender<CallEvent>>::new();
    while let Some(event) = source.option_next().await {
        match event {
            RouterEvent::Register(key, sender) => {
                calls.insert(key, sender);
            }
            RouterEvent::Deregister(key) => {
                calls.remove(&key);
            }
            RouterEvent::Reply(response) => {
                let key = (response.client_id.clone(), response.timestamp);
                let Some(sender) = calls.get(&key) else {
                    tracing::debug!(
                        replica = %response.from_replica,
                        timestamp = response.timestamp,
                        "drop reply of no in-flight call"
                    );
                    continue;
                };
                if sender.send(CallEvent::Response(response)).is_err() {
                    calls.remove(&key);
                }
            }
        }
    }
    Ok(())
}

/// Keeps a call registered with the router until dropped.
#[derive(Debug)]
pub struct Registration {
    router: EventSender<RouterEvent>,
    key: CallKey,
}

impl Registration {
    pub fn new(
        router: EventSender<RouterEvent>,
        key: CallKey,
        sender: EventSender<CallEvent>,
    ) -> crate::Result<Self> {
        router.send(RouterEvent::Register(key.clone(), sender))?;
        Ok(Self { router, key })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        // router gone means nothing left to deregister from
        let _ = self
            .router
            .send(RouterEvent::Deregister(self.key.clone()));
    }
}
