use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// "mock" | "endpoint" | "script" | "api"
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// HTTP endpoint for `endpoint` mode.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub endpoint_headers: BTreeMap<String, String>,
    /// Executable for `script` mode.
    #[serde(default)]
    pub script_path: Option<PathBuf>,
    #[serde(default)]
    pub script_args: Vec<String>,
    #[serde(default)]
    pub script_env: BTreeMap<String, String>,
    /// Provider name for `api` mode: "openai" | "zhipu" | "ollama" | "compatible:<base url>"
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_mode() -> String {
    "mock".into()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f64 {
    0.8
}

fn default_max_tokens() -> u32 {
    4000
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            timeout_secs: default_timeout_secs(),
            endpoint: None,
            endpoint_headers: BTreeMap::new(),
            script_path: None,
            script_args: Vec::new(),
            script_env: BTreeMap::new(),
            provider: None,
            base_url: None,
            model: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}
