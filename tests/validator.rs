#[path = "support/fixtures.rs"]
mod fixtures;
#[path = "validator/http.rs"]
mod http;
#[path = "validator/simulation.rs"]
mod simulation;
