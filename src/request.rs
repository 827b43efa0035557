use std::{
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

/// One logical operation submitted to the cluster.
///
/// `(client_id, timestamp)` identifies the request; resending the same pair is
/// a retry of the same operation, never a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientRequest {
    pub operation: String,
    pub timestamp: i64,
    pub client_id: String,
}

/// Source of strictly increasing request timestamps for one client process.
///
/// Timestamps follow wall clock nanoseconds when the clock moves forward and
/// are bumped past the last issued value otherwise, so they are never reused.
#[derive(Debug, Default)]
pub struct TimestampCounter(Mutex<i64>);

impl TimestampCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after `last`, e.g. a timestamp recovered from a previous run.
    pub fn starting_after(last: i64) -> Self {
        Self(Mutex::new(last))
    }

    pub fn next(&self) -> crate::Result<i64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as i64)
            .unwrap_or_default();
        // a poisoned counter still holds a valid last value
        let mut last = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(after_last) = last.checked_add(1) else {
            crate::bail!("timestamp counter exhausted")
        };
        *last = now.max(after_last);
        Ok(*last)
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    counter: Arc<TimestampCounter>,
}

impl RequestBuilder {
    pub fn new(counter: Arc<TimestampCounter>) -> Self {
        Self { counter }
    }

    pub fn build(
        &self,
        operation: impl Into<String>,
        client_id: impl Into<String>,
    ) -> crate::Result<ClientRequest> {
        Ok(ClientRequest {
            operation: operation.into(),
            timestamp: self.counter.next()?,
            client_id: client_id.into(),
        })
    }
}
