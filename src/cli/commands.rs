use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `StoryFi` - scoring and reputation for a story-generation network.
#[derive(Parser, Debug)]
#[command(name = "storyfi")]
#[command(version)]
#[command(about = "Score story-generation responses and simulate validator rounds.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.storyfi/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one recorded response offline and print its breakdown
    Score {
        /// Task type (blueprint, characters, story_arc, chapters)
        #[arg(short, long)]
        task: String,

        /// JSON file holding the output object, or a full reply with `output_data`
        #[arg(short, long)]
        input: PathBuf,

        /// Seconds the peer took to respond (default 5.0 for bare output files)
        #[arg(long)]
        generation_time: Option<f64>,

        /// Declared model info as inline JSON, e.g. '{"mode":"local","name":"qwen2.5-7b"}'
        #[arg(long)]
        model_info: Option<String>,

        /// Story request the response answers
        #[arg(long, default_value = "")]
        prompt: String,
    },

    /// Run validator rounds against in-process mock peers
    Simulate {
        /// Number of mock peers
        #[arg(long, default_value = "8")]
        peers: usize,

        /// Validation steps to run
        #[arg(long, default_value = "20")]
        steps: u64,

        /// Peers that duplicate another peer's output
        #[arg(long, default_value = "0")]
        copycats: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate one task with the configured generator, as a peer would answer it
    Generate {
        /// Task type (blueprint, characters, story_arc, chapters)
        #[arg(short, long)]
        task: String,

        /// Story request
        #[arg(short, long)]
        prompt: String,
    },

    /// Print the effective configuration
    Config,
}
