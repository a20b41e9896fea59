use crate::peer::Peer;
use crate::protocol::PeerId;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// Where computed weights go. Publishing them on a chain is someone else's job.
pub trait WeightSink: Send + Sync {
    fn name(&self) -> &str;

    fn submit<'a>(
        &'a self,
        weights: &'a BTreeMap<PeerId, f64>,
        peers: &'a [Peer],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

/// Logs each weight with the peer's slot.
pub struct LogWeightSink;

impl WeightSink for LogWeightSink {
    fn name(&self) -> &str {
        "log"
    }

    fn submit<'a>(
        &'a self,
        weights: &'a BTreeMap<PeerId, f64>,
        peers: &'a [Peer],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            for (peer, weight) in weights {
                let uid = peers.iter().find(|p| &p.id == peer).map(|p| p.uid);
                tracing::info!(peer = %peer, uid = ?uid, weight, "weight");
            }
            Ok(())
        })
    }
}

/// Keeps every submitted weight map.
#[derive(Default)]
pub struct MemoryWeightSink {
    submissions: Mutex<Vec<BTreeMap<PeerId, f64>>>,
}

impl MemoryWeightSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<BTreeMap<PeerId, f64>> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<BTreeMap<PeerId, f64>> {
        self.submissions.lock().ok()?.last().cloned()
    }
}

impl WeightSink for MemoryWeightSink {
    fn name(&self) -> &str {
        "memory"
    }

    fn submit<'a>(
        &'a self,
        weights: &'a BTreeMap<PeerId, f64>,
        _peers: &'a [Peer],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if let Ok(mut guard) = self.submissions.lock() {
                guard.push(weights.clone());
            }
            Ok(())
        })
    }
}

impl<T: WeightSink + ?Sized> WeightSink for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submit<'a>(
        &'a self,
        weights: &'a BTreeMap<PeerId, f64>,
        peers: &'a [Peer],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        (**self).submit(weights, peers)
    }
}
