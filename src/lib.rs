pub mod aggregator;
pub mod app;
pub mod client;
pub mod config;
pub mod link;
pub mod model;
pub mod net;
pub mod request;
pub mod router;
pub mod task;
pub mod unreplicated;

pub use anyhow::{anyhow as err, bail, Error, Result};

pub use crate::aggregator::{Digest, ReplicaResponse, ResponseAggregator};
pub use crate::client::{Client, ClientError, Unreachable};
pub use crate::config::{ClusterConfig, Config, ReplicaId};
pub use crate::link::{ReplicaLink, TcpLink};
pub use crate::request::{ClientRequest, RequestBuilder, TimestampCounter};
