#[path = "support/fixtures.rs"]
mod fixtures;
#[path = "backends/generator.rs"]
mod generator;
#[path = "backends/judge.rs"]
mod judge;
#[path = "backends/peer.rs"]
mod peer;
