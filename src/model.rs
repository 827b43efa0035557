use derive_more::From;

/// Receiving half of an event loop's input.
#[derive(Debug, From)]
pub struct EventSource<M>(tokio::sync::mpsc::UnboundedReceiver<M>);

impl<M> EventSource<M> {
    pub async fn next(&mut self) -> crate::Result<M> {
        self.0
            .recv()
            .await
            .ok_or(crate::err!("unexpected source closing"))
    }

    pub async fn option_next(&mut self) -> Option<M> {
        self.0.recv().await
    }
}

#[derive(Debug, From)]
pub struct EventSender<M>(tokio::sync::mpsc::UnboundedSender<M>);

impl<M> Clone for EventSender<M> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<M> EventSender<M> {
    pub fn send(&self, event: impl Into<M>) -> crate::Result<()> {
        self.0
            .send(event.into())
            .map_err(|_| crate::err!("unexpected event channel closing"))
    }
}

/// Unbounded, so a producer such as a link task or the inbox never waits on
/// the loop it feeds.
pub fn event_channel<M>() -> (EventSender<M>, EventSource<M>) {
    let channel = tokio::sync::mpsc::unbounded_channel();
    (EventSender(channel.0), EventSource(channel.1))
}
