use crate::error::RegistryError;
use crate::protocol::PeerId;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// A registered peer as the network reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    /// Network slot index.
    pub uid: u16,
    #[serde(default)]
    pub stake: f64,
    /// Where to reach the peer over HTTP, when remote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Peer {
    pub fn new(id: impl Into<PeerId>, uid: u16, stake: f64) -> Self {
        Self {
            id: id.into(),
            uid,
            stake,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

pub trait PeerRegistry: Send + Sync {
    /// Current peer set. Losing the registry is the one error that stops a validation step.
    fn peers(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Peer>, RegistryError>> + Send + '_>>;
}

/// A fixed peer list.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    peers: Vec<Peer>,
}

impl StaticRegistry {
    pub fn new(peers: Vec<Peer>) -> Self {
        Self { peers }
    }
}

impl PeerRegistry for StaticRegistry {
    fn peers(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Peer>, RegistryError>> + Send + '_>> {
        Box::pin(async move {
            if self.peers.is_empty() {
                return Err(RegistryError::Empty);
            }
            Ok(self.peers.clone())
        })
    }
}
