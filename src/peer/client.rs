use super::local::LocalPeer;
use super::registry::Peer;
use crate::llm::{api_error, build_provider_client_with_timeout};
use crate::protocol::{PeerId, TaskRequest, TaskResponse};
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<TaskResponse>> + Send + 'a>>;

/// Transport from validator to peer. A failed query is scored as an absent response.
pub trait PeerClient: Send + Sync {
    fn query<'a>(&'a self, peer: &'a Peer, request: &'a TaskRequest) -> QueryFuture<'a>;
}

/// In-process peers keyed by id, for simulation and tests.
#[derive(Default)]
pub struct LocalNetwork {
    peers: HashMap<PeerId, LocalPeer>,
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, peer: LocalPeer) {
        self.peers.insert(peer.id().clone(), peer);
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl PeerClient for LocalNetwork {
    fn query<'a>(&'a self, peer: &'a Peer, request: &'a TaskRequest) -> QueryFuture<'a> {
        Box::pin(async move {
            let local = self
                .peers
                .get(&peer.id)
                .with_context(|| format!("peer {} is not reachable", peer.id))?;
            Ok(local.respond(request).await)
        })
    }
}

/// Posts the task as JSON to `<address>/task` and normalizes whatever comes back.
pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn task_url(address: &str) -> String {
        let base = address.trim_end_matches('/');
        if base.ends_with("/task") {
            base.to_string()
        } else {
            format!("{base}/task")
        }
    }
}

impl PeerClient for HttpPeerClient {
    fn query<'a>(&'a self, peer: &'a Peer, request: &'a TaskRequest) -> QueryFuture<'a> {
        Box::pin(async move {
            let address = peer
                .address
                .as_deref()
                .with_context(|| format!("peer {} has no address", peer.id))?;
            let response = self
                .client
                .post(Self::task_url(address))
                .json(request)
                .send()
                .await
                .with_context(|| format!("request to peer {} failed", peer.id))?;
            if !response.status().is_success() {
                return Err(api_error(peer.id.as_str(), response).await);
            }
            let reply: Value = response
                .json()
                .await
                .with_context(|| format!("peer {} sent an unreadable reply", peer.id))?;
            Ok(TaskResponse::from_wire(
                peer.id.clone(),
                request.task_type,
                &reply,
            ))
        })
    }
}
