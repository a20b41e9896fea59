use super::selection::select_peers;
use super::sink::{LogWeightSink, WeightSink};
use super::stats::ValidatorStats;
use super::tasks::random_task;
use crate::config::{Config, ValidatorConfig};
use crate::error::RegistryError;
use crate::narrative::EvaluationMethod;
use crate::observability::{NoopObserver, Observer, ObserverEvent, ObserverMetric};
use crate::peer::{Peer, PeerClient, PeerRegistry};
use crate::protocol::{PeerId, TaskRequest, TaskResponse, TaskType};
use crate::reputation::{HistoryStore, ReputationTracker, WeightCalculator};
use crate::scoring::{EvaluationStatus, ScoreBreakdown, ScoringPipeline};
use futures_util::future::join_all;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

const STATS_LOG_EVERY: u64 = 10;

/// What one validation step did.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: u64,
    pub batch_id: Uuid,
    pub task_type: TaskType,
    pub scores: Vec<(PeerId, ScoreBreakdown)>,
    /// Set when this step triggered a weight computation.
    pub weights: Option<BTreeMap<PeerId, f64>>,
}

/// Drives task dispatch, scoring and reputation for a set of peers.
///
/// Owns the history and reputation state and mutates them only from
/// [`Validator::step`], one response at a time.
pub struct Validator {
    config: ValidatorConfig,
    registry: Arc<dyn PeerRegistry>,
    client: Arc<dyn PeerClient>,
    pipeline: ScoringPipeline,
    tracker: ReputationTracker,
    history: HistoryStore,
    weights: WeightCalculator,
    sink: Box<dyn WeightSink>,
    observer: Arc<dyn Observer>,
    rng: StdRng,
    stats: ValidatorStats,
    stakes: HashMap<PeerId, f64>,
    last_peers: Vec<Peer>,
}

impl Validator {
    pub fn new(config: &Config, registry: Arc<dyn PeerRegistry>, client: Arc<dyn PeerClient>) -> Self {
        Self {
            config: config.validator.clone(),
            registry,
            client,
            pipeline: ScoringPipeline::from_config(config),
            tracker: ReputationTracker::from_config(&config.reputation),
            history: HistoryStore::new(config.reputation.history_capacity),
            weights: WeightCalculator::new(&config.reputation),
            sink: Box::new(LogWeightSink),
            observer: Arc::new(NoopObserver),
            rng: StdRng::from_rng(&mut rand::rng()),
            stats: ValidatorStats::default(),
            stakes: HashMap::new(),
            last_peers: Vec::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ScoringPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn WeightSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn stats(&self) -> ValidatorStats {
        self.stats
    }

    pub fn tracker(&self) -> &ReputationTracker {
        &self.tracker
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn pipeline(&self) -> &ScoringPipeline {
        &self.pipeline
    }

    /// Runs one step with a randomly drawn task.
    pub async fn step(&mut self) -> Result<StepReport, RegistryError> {
        let request = random_task(&self.config.task_distribution, &mut self.rng);
        self.step_with(request).await
    }

    /// Runs one step for `request`. Only registry failure is an error; every
    /// per-peer problem is folded into that peer's score.
    pub async fn step_with(&mut self, request: TaskRequest) -> Result<StepReport, RegistryError> {
        let started = Instant::now();
        let peers = self.registry.peers().await?;
        self.stakes = peers.iter().map(|p| (p.id.clone(), p.stake)).collect();
        self.last_peers.clone_from(&peers);

        let batch_id = Uuid::new_v4();
        self.stats.steps += 1;
        let step = self.stats.steps;

        let selected = select_peers(
            &peers,
            &self.tracker,
            self.config.sample_size,
            self.config.exploit_share,
            &mut self.rng,
        );
        self.observer.record_metric(&ObserverMetric::ActivePeers(
            u64::try_from(selected.len()).unwrap_or(u64::MAX),
        ));

        let mut report = StepReport {
            step,
            batch_id,
            task_type: request.task_type,
            scores: Vec::with_capacity(selected.len()),
            weights: None,
        };

        if selected.is_empty() {
            tracing::warn!(%batch_id, "no available peers");
        } else {
            tracing::info!(
                %batch_id,
                task_type = %request.task_type,
                peers = selected.len(),
                "dispatching task"
            );
            let dispatch_started = Instant::now();
            let responses = self.dispatch(&request, &selected).await;
            self.observer
                .record_metric(&ObserverMetric::BatchLatency(dispatch_started.elapsed()));

            for response in &responses {
                let breakdown = self.score_one(&request, response, &responses).await;
                report.scores.push((response.responder.clone(), breakdown));
            }
            self.observer.record_metric(&ObserverMetric::HistorySize(
                u64::try_from(self.history.len()).unwrap_or(u64::MAX),
            ));
        }

        self.stats.blacklisted = self.tracker.blacklisted().len();

        let frequency = self.config.weight_update_frequency.max(1);
        if step % frequency == 0 {
            report.weights = Some(self.update_weights().await);
        }

        if step % STATS_LOG_EVERY == 0 {
            tracing::info!(
                steps = self.stats.steps,
                responses = self.stats.responses,
                successful = self.stats.successful,
                cumulative_reward = self.stats.cumulative_reward,
                blacklisted = self.stats.blacklisted,
                "validator stats"
            );
        }

        self.observer.record_event(&ObserverEvent::StepCompleted {
            step,
            task_type: request.task_type,
            responses: report.scores.len(),
            duration: started.elapsed(),
        });
        Ok(report)
    }

    /// Queries every selected peer concurrently, each under its own deadline.
    async fn dispatch(&self, request: &TaskRequest, peers: &[Peer]) -> Vec<TaskResponse> {
        let deadline = Duration::from_secs(self.config.batch_timeout_secs.max(1));
        let client = &self.client;
        let queries = peers.iter().map(|peer| async move {
            match tokio::time::timeout(deadline, client.query(peer, request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::warn!(peer = %peer.id, "peer query failed: {e:#}");
                    TaskResponse::absent(peer.id.clone(), request.task_type)
                }
                Err(_) => {
                    tracing::warn!(peer = %peer.id, timeout_secs = deadline.as_secs(), "peer timed out");
                    TaskResponse::absent(peer.id.clone(), request.task_type)
                }
            }
        });
        join_all(queries).await
    }

    async fn score_one(
        &mut self,
        request: &TaskRequest,
        response: &TaskResponse,
        batch: &[TaskResponse],
    ) -> ScoreBreakdown {
        let breakdown = self
            .pipeline
            .score(request, response, batch, &self.history)
            .await;
        let peer = &response.responder;

        if breakdown.status == EvaluationStatus::Plagiarized {
            let outcome = self.tracker.record_violation(peer);
            let similarity = breakdown.plagiarism.as_ref().map_or(0.0, |v| v.similarity);
            self.observer.record_event(&ObserverEvent::PlagiarismFlagged {
                peer: peer.clone(),
                similarity,
                violation_count: outcome.violation_count,
            });
            if outcome.newly_blacklisted {
                tracing::warn!(peer = %peer, violations = outcome.violation_count, "peer blacklisted");
                self.observer
                    .record_event(&ObserverEvent::PeerBlacklisted { peer: peer.clone() });
            }
        } else if let Some(output) = &response.output
            && breakdown.status != EvaluationStatus::GenerationFailed
        {
            self.history
                .record(peer.clone(), request.task_type, output, breakdown.total);
        }

        if let Some(detail) = &breakdown.narrative_detail
            && detail.method == EvaluationMethod::Fallback
        {
            self.observer.record_event(&ObserverEvent::JudgeDegraded {
                reason: format!("narrative fallback for {peer}"),
            });
        }

        self.tracker.update_score(peer, breakdown.total);
        self.stats.responses += 1;
        self.stats.cumulative_reward += breakdown.total;
        if breakdown.total > 0.0 {
            self.stats.successful += 1;
        }

        self.observer.record_event(&ObserverEvent::ResponseScored {
            peer: peer.clone(),
            task_type: request.task_type,
            status: breakdown.status,
            score: breakdown.total,
        });
        breakdown
    }

    /// Computes weights from current reputation and hands them to the sink.
    pub async fn update_weights(&mut self) -> BTreeMap<PeerId, f64> {
        let ema = self.tracker.active_scores();
        let weights = self.weights.compute(&ema, &self.stakes, &self.history);
        self.stats.weight_updates += 1;

        let top_weight = weights.values().copied().fold(0.0_f64, f64::max);
        self.observer.record_event(&ObserverEvent::WeightsComputed {
            peers: weights.len(),
            top_weight,
        });

        if let Err(e) = self.sink.submit(&weights, &self.last_peers).await {
            tracing::warn!(sink = self.sink.name(), "failed to submit weights: {e:#}");
        }
        weights
    }

    /// Steps until `max_steps` is reached or Ctrl-C arrives.
    pub async fn run(&mut self) -> Result<ValidatorStats, RegistryError> {
        let interval_secs = self.config.query_interval_secs;
        tracing::info!(
            interval_secs,
            sample_size = self.config.sample_size,
            max_steps = ?self.config.max_steps,
            "validator starting"
        );

        loop {
            if let Some(max) = self.config.max_steps
                && self.stats.steps >= max
            {
                break;
            }

            self.step().await?;

            if interval_secs > 0 {
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("shutdown requested");
                        break;
                    }
                }
            }
        }

        self.observer.flush();
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use crate::observability::CountingObserver;
    use crate::peer::{LocalNetwork, LocalPeer, QueryFuture, StaticRegistry};
    use crate::validator::MemoryWeightSink;

    fn config() -> Config {
        let mut config = Config::default();
        config.validator.sample_size = 10;
        config.validator.batch_timeout_secs = 5;
        config.validator.weight_update_frequency = 2;
        // Only byte-identical outputs count as copies here.
        config.scoring.plagiarism.cross_peer_threshold = 0.999;
        config.scoring.plagiarism.history_threshold = 0.999;
        config
    }

    fn network(peers: &[(&str, u64)]) -> (Vec<Peer>, LocalNetwork) {
        let mut network = LocalNetwork::new();
        let mut roster = Vec::new();
        for (uid, (id, seed)) in (0_u16..).zip(peers) {
            network.insert(LocalPeer::new(*id, Box::new(MockGenerator::with_seed(*seed)), 5));
            roster.push(Peer::new(*id, uid, 10.0));
        }
        (roster, network)
    }

    fn validator(roster: Vec<Peer>, client: Arc<dyn PeerClient>) -> Validator {
        Validator::new(&config(), Arc::new(StaticRegistry::new(roster)), client).with_seed(9)
    }

    fn status_of(report: &StepReport, peer: &str) -> Option<EvaluationStatus> {
        report
            .scores
            .iter()
            .find(|(id, _)| id.as_str() == peer)
            .map(|(_, b)| b.status)
    }

    #[tokio::test]
    async fn identical_peers_are_flagged_then_blacklisted() {
        let (roster, network) = network(&[("twin-a", 5), ("twin-b", 5), ("honest", 77)]);
        let observer = Arc::new(CountingObserver::new());
        let mut validator = validator(roster, Arc::new(network)).with_observer(observer.clone());

        for _ in 0..3 {
            let report = validator
                .step_with(TaskRequest::blueprint("a lighthouse mystery"))
                .await
                .unwrap();
            assert_eq!(status_of(&report, "twin-a"), Some(EvaluationStatus::Plagiarized));
            assert_eq!(status_of(&report, "twin-b"), Some(EvaluationStatus::Plagiarized));
        }

        assert!(validator.tracker().is_blacklisted(&PeerId::new("twin-a")));
        assert!(validator.tracker().is_blacklisted(&PeerId::new("twin-b")));
        assert_eq!(validator.stats().blacklisted, 2);
        assert_eq!(observer.counts().blacklisted, 2);

        let report = validator
            .step_with(TaskRequest::blueprint("a lighthouse mystery"))
            .await
            .unwrap();
        assert_eq!(report.scores.len(), 1);
        assert_eq!(report.scores[0].0.as_str(), "honest");
    }

    #[tokio::test]
    async fn unreachable_peer_is_absent_not_a_violation() {
        let (mut roster, network) = network(&[("alive", 1)]);
        roster.push(Peer::new("ghost", 9, 0.0));
        let mut validator = validator(roster, Arc::new(network));

        let report = validator
            .step_with(TaskRequest::blueprint("a desert caravan"))
            .await
            .unwrap();
        assert_eq!(status_of(&report, "ghost"), Some(EvaluationStatus::Absent));
        let ghost = validator.tracker().state(&PeerId::new("ghost")).unwrap();
        assert_eq!(ghost.violation_count, 0);
        assert!(ghost.ema_score.abs() < f64::EPSILON);
        assert_eq!(validator.history().len(), 1);
    }

    #[tokio::test]
    async fn empty_registry_stops_the_step() {
        let mut validator = validator(Vec::new(), Arc::new(LocalNetwork::new()));
        let err = validator.step().await.unwrap_err();
        assert!(matches!(err, RegistryError::Empty));
    }

    #[tokio::test]
    async fn weights_are_submitted_on_schedule() {
        let (roster, network) = network(&[("a", 1), ("b", 2), ("c", 3)]);
        let sink = Arc::new(MemoryWeightSink::new());
        let mut validator = validator(roster, Arc::new(network)).with_sink(Box::new(sink.clone()));

        let first = validator.step().await.unwrap();
        assert!(first.weights.is_none());
        let second = validator.step().await.unwrap();
        let weights = second.weights.unwrap();

        assert_eq!(sink.submissions().len(), 1);
        assert_eq!(sink.last().unwrap(), weights);
        let total: f64 = weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(validator.stats().weight_updates, 1);
    }

    struct Stalled;

    impl PeerClient for Stalled {
        fn query<'a>(&'a self, _peer: &'a Peer, _request: &'a TaskRequest) -> QueryFuture<'a> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(anyhow::anyhow!("unreachable"))
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_peer_times_out_as_absent() {
        let mut validator = validator(vec![Peer::new("slow", 0, 1.0)], Arc::new(Stalled));
        let report = validator
            .step_with(TaskRequest::blueprint("x"))
            .await
            .unwrap();
        assert_eq!(status_of(&report, "slow"), Some(EvaluationStatus::Absent));
        assert_eq!(validator.stats().successful, 0);
    }

    #[tokio::test]
    async fn run_stops_at_max_steps() {
        let (roster, network) = network(&[("a", 1), ("b", 2)]);
        let mut config = config();
        config.validator.query_interval_secs = 0;
        config.validator.max_steps = Some(3);
        let mut validator = Validator::new(
            &config,
            Arc::new(StaticRegistry::new(roster)),
            Arc::new(network),
        )
        .with_seed(4);
        let stats = validator.run().await.unwrap();
        assert_eq!(stats.steps, 3);
        assert_eq!(stats.responses, 6);
    }
}
