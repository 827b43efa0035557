use std::future::Future;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Spawns long-lived tasks whose failure should bring the process down.
#[derive(Debug, Clone)]
pub struct BackgroundSpawner {
    err_sender: UnboundedSender<crate::Error>,
    token: CancellationToken,
}

impl BackgroundSpawner {
    pub fn spawn(&self, task: impl Future<Output = crate::Result<()>> + Send + 'static) {
        let err_sender = self.err_sender.clone();
        let token = self.token.clone();
        let mut task = tokio::spawn(task);
        tokio::spawn(async move {
            let result = tokio::select! {
                result = &mut task => result,
                () = token.cancelled() => {
                    task.abort();
                    task.await
                }
            };
            let err = match result {
                Err(err) if !err.is_cancelled() => err.into(),
                Ok(Err(err)) => err,
                _ => return,
            };
            // monitor may already be gone during shutdown
            let _ = err_sender.send(err);
        });
    }
}

#[derive(Debug)]
pub struct BackgroundMonitor {
    err_sender: UnboundedSender<crate::Error>,
    err_receiver: UnboundedReceiver<crate::Error>,
    token: CancellationToken,
}

impl Default for BackgroundMonitor {
    fn default() -> Self {
        let (err_sender, err_receiver) = unbounded_channel();
        Self {
            err_sender,
            err_receiver,
            token: CancellationToken::new(),
        }
    }
}

impl BackgroundMonitor {
    pub fn spawner(&self) -> BackgroundSpawner {
        BackgroundSpawner {
            err_sender: self.err_sender.clone(),
            token: self.token.clone(),
        }
    }

    /// Resolves with the first background error, cancelling all other tasks.
    pub async fn wait(&mut self) -> crate::Result<()> {
        match self.err_receiver.recv().await {
            Some(err) => {
                self.token.cancel();
                Err(err)
            }
            None => Ok(()),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel()
    }
}

/// Tasks bound to the lifetime of one call. Dropping the group abandons every
/// task still running in it.
#[derive(Debug)]
pub struct TaskGroup {
    token: CancellationToken,
}

impl TaskGroup {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = task => {}
                () = token.cancelled() => {}
            }
        });
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.token.cancel()
    }
}
