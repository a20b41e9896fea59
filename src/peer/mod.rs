//! Peers: who can be queried, how to reach them, and the miner-side responder.

pub mod client;
pub mod local;
pub mod registry;

pub use client::{HttpPeerClient, LocalNetwork, PeerClient, QueryFuture};
pub use local::{LocalPeer, normalize_generated};
pub use registry::{Peer, PeerRegistry, StaticRegistry};
