use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use storyfi::Config;
use storyfi::generator::{MockGenerator, create_generator};
use storyfi::observability::create_observer;
use storyfi::peer::{LocalNetwork, LocalPeer, Peer, StaticRegistry};
use storyfi::protocol::{ModelInfo, OutputData, PeerId, TaskResponse, TaskType};
use storyfi::reputation::HistoryStore;
use storyfi::scoring::ScoringPipeline;
use storyfi::validator::{Validator, build_task};

const DEFAULT_GENERATION_TIME: f64 = 5.0;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Score {
            task,
            input,
            generation_time,
            model_info,
            prompt,
        } => {
            score_file(
                &config,
                &task,
                &input,
                generation_time,
                model_info.as_deref(),
                &prompt,
            )
            .await
        }
        Commands::Simulate {
            peers,
            steps,
            copycats,
            seed,
        } => simulate(config, peers, steps, copycats, seed).await,
        Commands::Generate { task, prompt } => generate(&config, &task, &prompt).await,
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn score_file(
    config: &Config,
    task: &str,
    input: &Path,
    generation_time: Option<f64>,
    model_info: Option<&str>,
    prompt: &str,
) -> Result<()> {
    let task_type = TaskType::parse(task)?;
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let declared = model_info
        .map(|text| serde_json::from_str::<Value>(text).context("--model-info is not valid JSON"))
        .transpose()?
        .map(|value| ModelInfo::from_value(&value));

    let responder = PeerId::new("offline");
    let mut response = match serde_json::from_str::<Value>(&raw) {
        Ok(reply @ Value::Object(_)) if reply.get("output_data").is_some() => {
            let mut response = TaskResponse::from_wire(responder, task_type, &reply);
            if let Some(secs) = generation_time {
                response.generation_time = secs.max(0.0);
            }
            response
        }
        _ => TaskResponse::new(
            responder,
            task_type,
            OutputData::parse(&raw),
            generation_time.unwrap_or(DEFAULT_GENERATION_TIME),
            ModelInfo::default(),
        ),
    };
    if let Some(declared) = declared {
        response.model_info = declared;
    }

    let request = build_task(task_type, prompt);
    let pipeline = ScoringPipeline::from_config(config);
    let history = HistoryStore::new(config.reputation.history_capacity);
    let breakdown = pipeline
        .score(&request, &response, std::slice::from_ref(&response), &history)
        .await;
    print_json(&breakdown)
}

async fn simulate(
    mut config: Config,
    peers: usize,
    steps: u64,
    copycats: usize,
    seed: Option<u64>,
) -> Result<()> {
    if peers == 0 {
        bail!("simulate needs at least one peer");
    }
    if copycats > peers {
        bail!("--copycats ({copycats}) cannot exceed --peers ({peers})");
    }
    let seed = seed.unwrap_or_else(rand::random);
    let total = peers + copycats;

    let mut network = LocalNetwork::new();
    let mut roster = Vec::with_capacity(total);
    for index in 0..total {
        // Copycats share a seed with an honest peer and so produce identical output.
        let source = if index < peers { index } else { index - peers };
        let id = if index < peers {
            format!("peer-{index:02}")
        } else {
            format!("copycat-{source:02}")
        };
        #[allow(clippy::cast_precision_loss)]
        let quality = 0.6 + 0.4 * (source as f64 / peers as f64);
        let generator = MockGenerator::with_seed(seed.wrapping_add(source as u64)).with_quality(quality);
        network.insert(LocalPeer::new(
            id.as_str(),
            Box::new(generator),
            config.generator.timeout_secs,
        ));
        #[allow(clippy::cast_precision_loss)]
        let stake = 100.0 * (index + 1) as f64;
        let uid = u16::try_from(index).context("too many peers")?;
        roster.push(Peer::new(id, uid, stake));
    }

    config.validator.query_interval_secs = 0;
    config.validator.max_steps = Some(steps);
    config.validator.sample_size = config.validator.sample_size.max(total);

    let observer = Arc::from(create_observer(&config.observability));
    let mut validator = Validator::new(
        &config,
        Arc::new(StaticRegistry::new(roster)),
        Arc::new(network),
    )
    .with_observer(observer)
    .with_seed(seed);

    let stats = validator.run().await?;
    let weights = validator.update_weights().await;
    let narrative = validator.pipeline().narrative().map(|n| n.stats());

    print_json(&json!({
        "seed": seed,
        "stats": stats,
        "success_rate": stats.success_rate(),
        "blacklisted": validator.tracker().blacklisted(),
        "weights": weights,
        "narrative": narrative,
    }))
}

async fn generate(config: &Config, task: &str, prompt: &str) -> Result<()> {
    let task_type = TaskType::parse(task)?;
    let generator = create_generator(&config.generator)?;
    if !generator.health_check().await {
        tracing::warn!(generator = generator.name(), "generator reports not ready");
    }
    let peer = LocalPeer::new("local", generator, config.generator.timeout_secs);
    let response = peer.respond(&build_task(task_type, prompt)).await;
    let output = response
        .output
        .as_ref()
        .and_then(OutputData::as_object)
        .cloned()
        .map(Value::Object);

    print_json(&json!({
        "output_data": output,
        "generation_time": response.generation_time,
        "model_info": response.model_info,
    }))
}
