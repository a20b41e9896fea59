use super::similarity::bigram_jaccard;
use crate::config::PlagiarismConfig;
use crate::protocol::{OutputData, PeerId, TaskResponse};
use crate::reputation::HistoryStore;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlagiarismKind {
    /// Near-identical to another peer's reply in the same batch.
    CrossPeerCopy,
    /// Near-identical to a recent historical response.
    TemplateReuse,
    Original,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlagiarismVerdict {
    pub flagged: bool,
    pub kind: PlagiarismKind,
    /// Similarity that triggered the flag, or the highest seen when original.
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_peer: Option<PeerId>,
}

impl PlagiarismVerdict {
    fn original(similarity: f64) -> Self {
        Self {
            flagged: false,
            kind: PlagiarismKind::Original,
            similarity,
            matched_peer: None,
        }
    }
}

pub struct PlagiarismDetector {
    config: PlagiarismConfig,
}

impl PlagiarismDetector {
    pub fn new(config: PlagiarismConfig) -> Self {
        Self { config }
    }

    /// Compares `response` with the rest of its batch, then with recent history.
    ///
    /// Absent or empty responses and error reports are never plagiarism, and
    /// never count as the source of a copy.
    pub fn check(
        &self,
        response: &TaskResponse,
        batch: &[TaskResponse],
        history: &HistoryStore,
    ) -> PlagiarismVerdict {
        let Some(output) = response.output.as_ref().filter(|o| comparable(o)) else {
            return PlagiarismVerdict::original(0.0);
        };
        let current = output.canonical();
        let mut highest = 0.0_f64;

        for other in batch {
            if other.responder == response.responder {
                continue;
            }
            let Some(other_output) = other.output.as_ref().filter(|o| comparable(o)) else {
                continue;
            };
            let similarity = bigram_jaccard(&current, &other_output.canonical());
            if similarity > self.config.cross_peer_threshold {
                return PlagiarismVerdict {
                    flagged: true,
                    kind: PlagiarismKind::CrossPeerCopy,
                    similarity,
                    matched_peer: Some(other.responder.clone()),
                };
            }
            highest = highest.max(similarity);
        }

        for entry in history.recent(self.config.history_window) {
            let similarity = bigram_jaccard(&current, &entry.canonical);
            if similarity > self.config.history_threshold {
                return PlagiarismVerdict {
                    flagged: true,
                    kind: PlagiarismKind::TemplateReuse,
                    similarity,
                    matched_peer: Some(entry.peer.clone()),
                };
            }
            highest = highest.max(similarity);
        }

        PlagiarismVerdict::original(highest)
    }
}

fn comparable(output: &OutputData) -> bool {
    !output.is_empty() && !output.is_error_report()
}
