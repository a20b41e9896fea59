//! Task and response types exchanged between validators and peers.
//!
//! Peer replies are untrusted and loosely typed; they are normalized into
//! [`TaskResponse`] here so nothing downstream branches on wire shape.

pub mod canonical;
pub mod response;
pub mod task;

pub use canonical::canonical_json;
pub use response::{GenerationMode, ModelInfo, OutputData, PeerId, TaskResponse};
pub use task::{TaskRequest, TaskType};
