//! Byzantine quorum detection over replica responses of a single request.
//!
//! Responses are bucketed by result digest. A replica votes at most once: the
//! first response it delivers for the request decides its bucket, later ones
//! are dropped. With at most `f` faulty replicas a bucket of `f + 1` voters
//! holds at least one honest replica, so its result is trusted.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::{config::ReplicaId, request::ClientRequest};

pub type Digest = [u8; 32];

pub fn digest(payload: &[u8]) -> Digest {
    Sha256::digest(payload).into()
}

/// Reply of one replica to a `ClientRequest`, as carried by the RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaResponse {
    pub from_replica: ReplicaId,
    pub client_id: String,
    pub timestamp: i64,
    pub result_digest: Digest,
    pub result: Vec<u8>,
    pub view_num: u64,
    pub err: Option<String>,
}

impl ReplicaResponse {
    pub fn new(
        from_replica: ReplicaId,
        request: &ClientRequest,
        result: Vec<u8>,
        view_num: u64,
    ) -> Self {
        Self {
            from_replica,
            client_id: request.client_id.clone(),
            timestamp: request.timestamp,
            result_digest: digest(&result),
            result,
            view_num,
            err: None,
        }
    }

    pub fn failed(
        from_replica: ReplicaId,
        request: &ClientRequest,
        err: impl Into<String>,
        view_num: u64,
    ) -> Self {
        Self {
            from_replica,
            client_id: request.client_id.clone(),
            timestamp: request.timestamp,
            result_digest: Default::default(),
            result: Default::default(),
            view_num,
            err: Some(err.into()),
        }
    }

    pub fn answers(&self, request: &ClientRequest) -> bool {
        self.client_id == request.client_id && self.timestamp == request.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Counted,
    /// The replica already voted for this request.
    Duplicate,
    /// Carries an error, or a digest that does not match its payload.
    Invalid,
}

#[derive(Debug, Clone)]
struct Bucket {
    // voter -> view it reported
    voters: BTreeMap<ReplicaId, u64>,
    result: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ResponseAggregator {
    quorum_size: usize,
    votes: HashMap<ReplicaId, Digest>,
    buckets: HashMap<Digest, Bucket>,
    winner: Option<Digest>,
}

impl ResponseAggregator {
    pub fn new(num_faulty: usize) -> Self {
        Self {
            quorum_size: num_faulty + 1,
            votes: Default::default(),
            buckets: Default::default(),
            winner: None,
        }
    }

    pub fn accept(&mut self, response: ReplicaResponse) -> Accepted {
        if response.err.is_some() || digest(&response.result) != response.result_digest {
            tracing::debug!(replica = %response.from_replica, "drop invalid response");
            return Accepted::Invalid;
        }
        if let Some(voted) = self.votes.get(&response.from_replica) {
            if *voted != response.result_digest {
                tracing::warn!(replica = %response.from_replica, "replica changed its result");
            }
            return Accepted::Duplicate;
        }
        self.votes
            .insert(response.from_replica.clone(), response.result_digest);
        let bucket = self
            .buckets
            .entry(response.result_digest)
            .or_insert_with(|| Bucket {
                voters: Default::default(),
                result: response.result,
            });
        bucket.voters.insert(response.from_replica, response.view_num);
        if self.winner.is_none() && bucket.voters.len() >= self.quorum_size {
            self.winner = Some(response.result_digest)
        }
        Accepted::Counted
    }

    pub fn has_quorum(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winning_digest(&self) -> Option<&Digest> {
        self.winner.as_ref()
    }

    pub fn winning_result(&self) -> Option<&[u8]> {
        Some(&self.buckets[self.winner.as_ref()?].result)
    }

    /// Highest view that at least `f + 1` voters of the winning bucket have
    /// reached, so at least one honest replica vouches for it.
    pub fn winning_view(&self) -> Option<u64> {
        let bucket = &self.buckets[self.winner.as_ref()?];
        let mut views = bucket.voters.values().copied().collect::<Vec<_>>();
        views.sort_unstable_by(|a, b| b.cmp(a));
        views.get(self.quorum_size - 1).copied()
    }

    pub fn into_winning_result(mut self) -> Option<Vec<u8>> {
        Some(self.buckets.remove(&self.winner?)?.result)
    }

    pub fn voters(&self, digest: &Digest) -> impl Iterator<Item = &ReplicaId> {
        self.buckets
            .get(digest)
            .into_iter()
            .flat_map(|bucket| bucket.voters.keys())
    }

    pub fn has_voted(&self, replica: &ReplicaId) -> bool {
        self.votes.contains_key(replica)
    }

    pub fn num_voted(&self) -> usize {
        self.votes.len()
    }

    pub fn largest_bucket(&self) -> usize {
        self.buckets
            .values()
            .map(|bucket| bucket.voters.len())
            .max()
            .unwrap_or_default()
    }

    /// Whether some bucket can still reach quorum if `pending` more replicas vote.
    pub fn can_reach_quorum(&self, pending: usize) -> bool {
        self.has_quorum() || self.largest_bucket() + pending >= self.quorum_size
    }
}
