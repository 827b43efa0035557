//! Drives one logical call from submission to a trusted result.
//!
//! A call first goes to the believed primary only. If no quorum forms before
//! the request timeout, or the primary link fails, the same request (same
//! `(client_id, timestamp)`) is broadcast to every replica with a fresh
//! aggregator and a fresh deadline. A second miss is terminal.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering::Relaxed},
        Arc,
    },
};

use derive_more::Display;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    aggregator::{Accepted, ReplicaResponse, ResponseAggregator},
    config::{ClusterConfig, ReplicaId},
    link::ReplicaLink,
    model::{event_channel, EventSender},
    request::{ClientRequest, RequestBuilder, TimestampCounter},
    router::{Registration, RouterEvent},
    task::TaskGroup,
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Unreachable {
    #[display(fmt = "no result reached a matching quorum")]
    NoQuorum,
    #[display(fmt = "every replica link failed")]
    Transport,
}

/// Failure visible to the caller of [`Client::invoke`].
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[display(fmt = "invalid configuration: {}", _0)]
    Configuration(String),
    #[display(fmt = "quorum unreachable: {}", cause)]
    QuorumUnreachable { cause: Unreachable },
    #[display(fmt = "call cancelled")]
    Cancelled,
}

impl std::error::Error for ClientError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[display(fmt = "primary")]
    Primary,
    #[display(fmt = "broadcast")]
    Broadcast,
}

#[derive(Debug)]
pub enum CallEvent {
    Response(ReplicaResponse),
    LinkFailed {
        replica: ReplicaId,
        phase: Phase,
        err: crate::Error,
    },
}

#[derive(Debug)]
enum Step {
    Wait,
    Escalate,
    Done(ResponseAggregator),
    Fail(Unreachable),
}

/// Per-call quorum state. Owned by the task running the call.
#[derive(Debug)]
struct Call {
    request: ClientRequest,
    config: Arc<ClusterConfig>,
    phase: Phase,
    primary: ReplicaId,
    aggregator: ResponseAggregator,
    failed: HashSet<ReplicaId>,
}

impl Call {
    fn new(request: ClientRequest, config: Arc<ClusterConfig>, primary: ReplicaId) -> Self {
        Self {
            aggregator: ResponseAggregator::new(config.num_faulty()),
            request,
            config,
            phase: Phase::Primary,
            primary,
            failed: Default::default(),
        }
    }

    fn escalate(&mut self) {
        self.phase = Phase::Broadcast;
        self.aggregator = ResponseAggregator::new(self.config.num_faulty());
        self.failed.clear();
    }

    fn on_event(&mut self, event: CallEvent) -> Step {
        match event {
            CallEvent::Response(response) => {
                if !response.answers(&self.request) {
                    tracing::debug!(replica = %response.from_replica, "drop response of another request");
                    return Step::Wait;
                }
                if let Some(err) = &response.err {
                    tracing::warn!(replica = %response.from_replica, "replica error: {err}");
                    return self.on_failure(response.from_replica);
                }
                if self.aggregator.accept(response) == Accepted::Counted
                    && self.aggregator.has_quorum()
                {
                    let aggregator = std::mem::replace(
                        &mut self.aggregator,
                        ResponseAggregator::new(self.config.num_faulty()),
                    );
                    return Step::Done(aggregator);
                }
                self.check_feasible()
            }
            CallEvent::LinkFailed {
                replica,
                phase,
                err,
            } => {
                tracing::warn!(%replica, %phase, "link failed: {err}");
                if phase != self.phase {
                    return Step::Wait;
                }
                self.on_failure(replica)
            }
        }
    }

    fn on_failure(&mut self, replica: ReplicaId) -> Step {
        match self.phase {
            // nobody else will hear of the request
            Phase::Primary if replica == self.primary => Step::Escalate,
            Phase::Primary => Step::Wait,
            Phase::Broadcast => {
                self.failed.insert(replica);
                self.check_feasible()
            }
        }
    }

    fn check_feasible(&self) -> Step {
        if self.phase == Phase::Primary {
            return Step::Wait;
        }
        let pending = self
            .config
            .replicas()
            .iter()
            .filter(|&replica| !self.aggregator.has_voted(replica) && !self.failed.contains(replica))
            .count();
        if self.aggregator.can_reach_quorum(pending) {
            Step::Wait
        } else if self.aggregator.num_voted() == 0 {
            // nobody disagreed, links just failed
            Step::Fail(Unreachable::Transport)
        } else {
            Step::Fail(Unreachable::NoQuorum)
        }
    }

    fn on_timeout(&self) -> Step {
        match self.phase {
            Phase::Primary => Step::Escalate,
            Phase::Broadcast => Step::Fail(Unreachable::NoQuorum),
        }
    }
}

/// Client side of a PBFT cluster.
///
/// Calls may be issued concurrently from multiple tasks; they share nothing
/// but the configuration, the timestamp counter and the cached view number.
pub struct Client {
    id: String,
    config: Arc<ClusterConfig>,
    builder: RequestBuilder,
    links: HashMap<ReplicaId, Arc<dyn ReplicaLink>>,
    router: Option<EventSender<RouterEvent>>,
    view_num: AtomicU64,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("view_num", &self.view_num)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(
        id: impl Into<String>,
        config: ClusterConfig,
        links: impl IntoIterator<Item = Arc<dyn ReplicaLink>>,
        counter: Arc<TimestampCounter>,
    ) -> Result<Self, ClientError> {
        let links = links
            .into_iter()
            .map(|link| (link.replica().clone(), link))
            .collect::<HashMap<_, _>>();
        if let Some(missing) = config.replicas().iter().find(|&id| !links.contains_key(id)) {
            return Err(ClientError::Configuration(format!(
                "no link to replica {missing}"
            )));
        }
        if links.len() != config.num_replica() {
            return Err(ClientError::Configuration(
                "link to replica outside the cluster".into(),
            ));
        }
        Ok(Self {
            id: id.into(),
            config: config.into(),
            builder: RequestBuilder::new(counter),
            links,
            router: None,
            view_num: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        })
    }

    /// Also count replies pushed to the inbox served by `router`.
    pub fn with_inbox(self, router: EventSender<RouterEvent>) -> Self {
        Self {
            router: Some(router),
            ..self
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Highest view seen in a trusted result.
    pub fn view_num(&self) -> u64 {
        self.view_num.load(Relaxed)
    }

    /// Cancels every in-flight and future call.
    pub fn shutdown(&self) {
        self.shutdown.cancel()
    }

    pub async fn invoke(&self, operation: impl Into<String>) -> Result<Vec<u8>, ClientError> {
        self.invoke_with_cancel(operation, CancellationToken::new())
            .await
    }

    pub async fn invoke_with_cancel(
        &self,
        operation: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<Vec<u8>, ClientError> {
        let request = self
            .builder
            .build(operation, self.id.clone())
            .map_err(|err| ClientError::Configuration(err.to_string()))?;
        let (event, mut source) = event_channel();
        let _registration = self.router.as_ref().and_then(|router| {
            let key = (request.client_id.clone(), request.timestamp);
            Registration::new(router.clone(), key, event.clone())
                .map_err(|err| tracing::warn!("inbox unavailable: {err}"))
                .ok()
        });
        let tasks = TaskGroup::new(&self.shutdown);

        let primary = self.config.primary(self.view_num()).clone();
        let mut call = Call::new(request, self.config.clone(), primary.clone());
        self.dispatch(&tasks, &event, &call.request, Phase::Primary, &[primary]);
        let mut deadline = Instant::now() + self.config.request_timeout();
        loop {
            let step = tokio::select! {
                Some(event) = source.option_next() => call.on_event(event),
                () = sleep_until(deadline) => call.on_timeout(),
                () = cancel.cancelled() => return Err(ClientError::Cancelled),
                () = tasks.token().cancelled() => return Err(ClientError::Cancelled),
            };
            match step {
                Step::Wait => {}
                Step::Escalate => {
                    tracing::info!(
                        timestamp = call.request.timestamp,
                        primary = %call.primary,
                        "suspect primary, escalate to broadcast"
                    );
                    call.escalate();
                    self.dispatch(
                        &tasks,
                        &event,
                        &call.request,
                        Phase::Broadcast,
                        self.config.replicas(),
                    );
                    deadline = Instant::now() + self.config.request_timeout();
                }
                Step::Done(aggregator) => {
                    if let Some(view_num) = aggregator.winning_view() {
                        self.view_num.fetch_max(view_num, Relaxed);
                    }
                    tracing::info!(timestamp = call.request.timestamp, phase = %call.phase, "quorum reached");
                    // a winning aggregator always holds its result
                    return aggregator
                        .into_winning_result()
                        .ok_or(ClientError::QuorumUnreachable {
                            cause: Unreachable::NoQuorum,
                        });
                }
                Step::Fail(cause) => {
                    tracing::warn!(timestamp = call.request.timestamp, %cause, "call failed");
                    return Err(ClientError::QuorumUnreachable { cause });
                }
            }
        }
    }

    fn dispatch(
        &self,
        tasks: &TaskGroup,
        event: &EventSender<CallEvent>,
        request: &ClientRequest,
        phase: Phase,
        replicas: &[ReplicaId],
    ) {
        tracing::info!(
            client = %self.id,
            timestamp = request.timestamp,
            %phase,
            replicas = ?replicas,
            "dispatch"
        );
        for replica in replicas {
            let link = self.links[replica].clone();
            let event = event.clone();
            let request = request.clone();
            tasks.spawn(async move {
                let replica = link.replica().clone();
                let call_event = match link.client_request(request).await {
                    Ok(response) if response.from_replica == replica => {
                        CallEvent::Response(response)
                    }
                    Ok(response) => CallEvent::LinkFailed {
                        err: crate::err!("replica answered as {}", response.from_replica),
                        replica,
                        phase,
                    },
                    Err(err) => CallEvent::LinkFailed {
                        replica,
                        phase,
                        err,
                    },
                };
                // the call may be over already
                let _ = event.send(call_event);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use crate::{model::EventSource, router::router_loop};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Reply(&'static str),
        Silent,
        Fail,
        FailAfter(Duration),
    }

    struct MockLink {
        replica: ReplicaId,
        // behavior of the n-th request, the last one repeats
        script: Vec<Behavior>,
        view_num: u64,
        requests: Mutex<Vec<ClientRequest>>,
        // replies other replicas push to the inbox once this one is contacted
        forward: Option<(EventSender<RouterEvent>, Vec<(ReplicaId, &'static str)>)>,
    }

    impl MockLink {
        fn new(index: usize, script: impl Into<Vec<Behavior>>) -> Self {
            Self {
                replica: replica(index),
                script: script.into(),
                view_num: 0,
                requests: Default::default(),
                forward: None,
            }
        }

        fn requests(&self) -> Vec<ClientRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ReplicaLink for MockLink {
        fn replica(&self) -> &ReplicaId {
            &self.replica
        }

        async fn client_request(&self, request: ClientRequest) -> crate::Result<ReplicaResponse> {
            let behavior = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request.clone());
                self.script[(requests.len() - 1).min(self.script.len() - 1)]
            };
            if let Some((router, forward)) = &self.forward {
                for (from, result) in forward {
                    let response = ReplicaResponse::new(
                        from.clone(),
                        &request,
                        result.as_bytes().to_vec(),
                        self.view_num,
                    );
                    router.send(RouterEvent::Reply(response))?
                }
            }
            match behavior {
                Behavior::Reply(result) => Ok(ReplicaResponse::new(
                    self.replica.clone(),
                    &request,
                    result.into(),
                    self.view_num,
                )),
                Behavior::Silent => std::future::pending().await,
                Behavior::Fail => Err(crate::err!("connection refused")),
                Behavior::FailAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    Err(crate::err!("connection reset"))
                }
            }
        }
    }

    fn replica(index: usize) -> ReplicaId {
        ReplicaId(format!("replica-{index}"))
    }

    fn new_client(links: &[Arc<MockLink>], num_faulty: usize) -> Client {
        let config = ClusterConfig::new(
            (0..links.len()).map(replica).collect::<Vec<_>>(),
            num_faulty,
            TIMEOUT,
        )
        .unwrap();
        Client::new(
            "client-0",
            config,
            links.iter().map(|link| link.clone() as Arc<dyn ReplicaLink>),
            Arc::new(TimestampCounter::new()),
        )
        .unwrap()
    }

    fn inbox() -> (EventSender<RouterEvent>, EventSource<RouterEvent>) {
        event_channel()
    }

    fn assert_same_request(links: &[Arc<MockLink>]) {
        let requests = links
            .iter()
            .flat_map(|link| link.requests())
            .collect::<Vec<_>>();
        assert!(!requests.is_empty());
        for request in &requests {
            assert_eq!(request, &requests[0]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn primary_and_one_replica_agree() {
        let (router, source) = inbox();
        tokio::spawn(router_loop(source));
        let mut primary = MockLink::new(0, [Behavior::Reply("D1")]);
        primary.forward = Some((router.clone(), vec![(replica(1), "D1")]));
        let links = [
            Arc::new(primary),
            Arc::new(MockLink::new(1, [Behavior::Silent])),
            Arc::new(MockLink::new(2, [Behavior::Silent])),
            Arc::new(MockLink::new(3, [Behavior::Silent])),
        ];
        let client = new_client(&links, 1).with_inbox(router);
        let start = Instant::now();
        assert_eq!(client.invoke("put:k:v").await.unwrap(), b"D1");
        assert!(start.elapsed() < TIMEOUT);
        // fast path never contacts the other replicas directly
        assert_eq!(links[0].requests().len(), 1);
        for link in &links[1..] {
            assert!(link.requests().is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn primary_alone_is_not_trusted() {
        let links = [
            Arc::new(MockLink::new(0, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(1, [Behavior::Silent])),
            Arc::new(MockLink::new(2, [Behavior::Silent])),
            Arc::new(MockLink::new(3, [Behavior::Silent])),
        ];
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(
            client.invoke("put:k:v").await,
            Err(ClientError::QuorumUnreachable {
                cause: Unreachable::NoQuorum
            })
        );
        assert_eq!(start.elapsed(), 2 * TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn escalate_after_silent_primary() {
        let links = [
            Arc::new(MockLink::new(0, [Behavior::Silent, Behavior::Reply("D1")])),
            Arc::new(MockLink::new(1, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(2, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(3, [Behavior::Reply("D2")])),
        ];
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(client.invoke("put:k:v").await.unwrap(), b"D1");
        assert!(start.elapsed() >= TIMEOUT);
        assert!(start.elapsed() < 2 * TIMEOUT);
        assert_eq!(links[0].requests().len(), 2);
        assert_same_request(&links);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_primary_escalates_without_waiting() {
        let links = [
            Arc::new(MockLink::new(0, [Behavior::Fail])),
            Arc::new(MockLink::new(1, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(2, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(3, [Behavior::Silent])),
        ];
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(client.invoke("get:k:").await.unwrap(), b"D1");
        assert!(start.elapsed() < TIMEOUT);
        assert_same_request(&links);
    }

    #[tokio::test(start_paused = true)]
    async fn all_links_failing_fails_fast() {
        let links = (0..4)
            .map(|i| Arc::new(MockLink::new(i, [Behavior::Fail])))
            .collect::<Vec<_>>();
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(
            client.invoke("put:k:v").await,
            Err(ClientError::QuorumUnreachable {
                cause: Unreachable::Transport
            })
        );
        assert!(start.elapsed() < TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn hopeless_disagreement_fails_fast() {
        let links = [
            Arc::new(MockLink::new(0, [Behavior::Silent, Behavior::Reply("D0")])),
            Arc::new(MockLink::new(1, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(2, [Behavior::Fail])),
            Arc::new(MockLink::new(3, [Behavior::Reply("D3")])),
        ];
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(
            client.invoke("put:k:v").await,
            Err(ClientError::QuorumUnreachable {
                cause: Unreachable::NoQuorum
            })
        );
        assert!(start.elapsed() < 2 * TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn late_primary_failure_is_ignored_after_escalation() {
        // the primary-phase request to replica 0 fails only after broadcast began
        let links = [
            Arc::new(MockLink::new(
                0,
                [Behavior::FailAfter(TIMEOUT + TIMEOUT / 2), Behavior::Silent],
            )),
            Arc::new(MockLink::new(1, [Behavior::Reply("D1")])),
            Arc::new(MockLink::new(2, [Behavior::Reply("D2")])),
            Arc::new(MockLink::new(3, [Behavior::Fail])),
        ];
        let client = new_client(&links, 1);
        let start = Instant::now();
        assert_eq!(
            client.invoke("put:k:v").await,
            Err(ClientError::QuorumUnreachable {
                cause: Unreachable::NoQuorum
            })
        );
        // replica 0 may still vote in broadcast, so only the deadline ends the call
        assert_eq!(start.elapsed(), 2 * TIMEOUT);
        assert_eq!(links[0].requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lone_voter_cannot_move_view() {
        let mut links = [
            MockLink::new(0, [Behavior::Fail]),
            MockLink::new(1, [Behavior::Reply("D1")]),
            MockLink::new(2, [Behavior::Reply("D1")]),
            MockLink::new(3, [Behavior::Silent]),
        ];
        links[1].view_num = u64::MAX - 2;
        let links = links.map(Arc::new);
        let client = new_client(&links, 1);
        assert_eq!(client.invoke("put:k:v").await.unwrap(), b"D1");
        assert_eq!(client.view_num(), 0);
    }

    struct Impersonate(MockLink, ReplicaId);

    #[async_trait::async_trait]
    impl ReplicaLink for Impersonate {
        fn replica(&self) -> &ReplicaId {
            self.0.replica()
        }

        async fn client_request(&self, request: ClientRequest) -> crate::Result<ReplicaResponse> {
            let mut response = self.0.client_request(request).await?;
            response.from_replica = self.1.clone();
            Ok(response)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn impersonating_replica_casts_no_vote() {
        // replica 0 answers "evil" in the name of replica 1, which is silent
        let links: Vec<Arc<dyn ReplicaLink>> = vec![
            Arc::new(Impersonate(
                MockLink::new(0, [Behavior::Reply("evil")]),
                replica(1),
            )),
            Arc::new(MockLink::new(1, [Behavior::Silent])),
            Arc::new(MockLink::new(2, [Behavior::Reply("evil")])),
            Arc::new(MockLink::new(3, [Behavior::Reply("D1")])),
        ];
        let config =
            ClusterConfig::new((0..4).map(replica).collect::<Vec<_>>(), 1, TIMEOUT).unwrap();
        let client =
            Client::new("client-0", config, links, Arc::new(TimestampCounter::new())).unwrap();
        let start = Instant::now();
        assert_eq!(
            client.invoke("put:k:v").await,
            Err(ClientError::QuorumUnreachable {
                cause: Unreachable::NoQuorum
            })
        );
        // the forged reply counts as a failed primary, so broadcast starts at once
        assert_eq!(start.elapsed(), TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cancellation() {
        let links = (0..4)
            .map(|i| Arc::new(MockLink::new(i, [Behavior::Silent])))
            .collect::<Vec<_>>();
        let client = new_client(&links, 1);
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let (result, ()) = tokio::join!(client.invoke_with_cancel("put:k:v", cancel.clone()), async {
            tokio::time::sleep(TIMEOUT / 2).await;
            cancel.cancel()
        });
        assert_eq!(result, Err(ClientError::Cancelled));
        assert_eq!(start.elapsed(), TIMEOUT / 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_calls() {
        let links = (0..4)
            .map(|i| Arc::new(MockLink::new(i, [Behavior::Silent])))
            .collect::<Vec<_>>();
        let client = new_client(&links, 1);
        client.shutdown();
        assert_eq!(client.invoke("put:k:v").await, Err(ClientError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn follow_reported_view() {
        let (router, source) = inbox();
        tokio::spawn(router_loop(source));
        let mut links = (0..4)
            .map(|i| MockLink::new(i, [Behavior::Silent, Behavior::Reply("D1")]))
            .collect::<Vec<_>>();
        for link in &mut links {
            link.view_num = 5;
        }
        links[1].script = vec![Behavior::Reply("D1")];
        links[1].forward = Some((router.clone(), vec![(replica(2), "D1")]));
        let links = links.into_iter().map(Arc::new).collect::<Vec<_>>();
        let client = new_client(&links, 1).with_inbox(router);

        client.invoke("put:k:v").await.unwrap();
        assert_eq!(client.view_num(), 5);
        // view 5 on four replicas makes replica 1 the primary
        let start = Instant::now();
        client.invoke("put:k:w").await.unwrap();
        assert!(start.elapsed() < TIMEOUT);
        assert_eq!(links[1].requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_calls_stay_apart() {
        let (router, source) = inbox();
        tokio::spawn(router_loop(source));
        let mut primary = MockLink::new(0, [Behavior::Reply("D1")]);
        primary.forward = Some((router.clone(), vec![(replica(1), "D1")]));
        let links = [
            Arc::new(primary),
            Arc::new(MockLink::new(1, [Behavior::Silent])),
            Arc::new(MockLink::new(2, [Behavior::Silent])),
            Arc::new(MockLink::new(3, [Behavior::Silent])),
        ];
        let client = new_client(&links, 1).with_inbox(router);
        let (a, b) = tokio::join!(client.invoke("put:a:1"), client.invoke("put:b:2"));
        assert_eq!(a.unwrap(), b"D1");
        assert_eq!(b.unwrap(), b"D1");
        let requests = links[0].requests();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].timestamp, requests[1].timestamp);
    }

    #[test]
    fn reject_incomplete_links() {
        let config = ClusterConfig::new((0..4).map(replica).collect::<Vec<_>>(), 1, TIMEOUT).unwrap();
        let links = (0..3)
            .map(|i| Arc::new(MockLink::new(i, [Behavior::Silent])) as Arc<dyn ReplicaLink>)
            .collect::<Vec<_>>();
        let result = Client::new("client-0", config, links, Arc::new(TimestampCounter::new()));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ClientError::QuorumUnreachable {
                cause: Unreachable::Transport
            }
            .to_string(),
            "quorum unreachable: every replica link failed"
        );
        assert_eq!(
            ClientError::Configuration("empty replica set".into()).to_string(),
            "invalid configuration: empty replica set"
        );
    }
}
