use super::Config;
use crate::error::ConfigError;
use crate::scoring::policy::ModelPolicy;
use anyhow::Context;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// `~/.storyfi/config.toml`, when a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|u| u.home_dir().join(".storyfi").join("config.toml"))
    }

    /// Strict load of one file, including its policy and prompt side files.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.load_side_files();
        Ok(config)
    }

    /// Loads `path` (or the default location), falling back to built-in defaults.
    ///
    /// Never fails: a missing or corrupt file is logged and replaced by defaults,
    /// then environment overrides apply and invalid values are repaired.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let resolved = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match resolved {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable; using defaults");
                Self {
                    config_path: path,
                    ..Self::default()
                }
            }),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Self {
                    config_path: path,
                    ..Self::default()
                }
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        for repair in config.sanitize() {
            tracing::warn!("config: {repair}");
        }
        config
    }

    fn load_side_files(&mut self) {
        if let Some(policy_path) = self.resolve_relative(self.policy_path.clone()) {
            match load_policy(&policy_path) {
                Ok(policy) => self.policy = policy,
                Err(e) => {
                    tracing::warn!(path = %policy_path.display(), error = %e, "model policy unreadable; using permissive defaults");
                    self.policy = ModelPolicy::default();
                }
            }
        }

        if let Some(prompt_path) = self.resolve_relative(self.narrative.prompt_path.clone()) {
            match fs::read_to_string(&prompt_path) {
                Ok(prompt) if !prompt.trim().is_empty() => {
                    self.narrative.evaluation_prompt = Some(prompt);
                }
                Ok(_) => {
                    tracing::warn!(path = %prompt_path.display(), "evaluation prompt file is empty; using built-in prompt");
                }
                Err(e) => {
                    tracing::warn!(path = %prompt_path.display(), error = %e, "evaluation prompt unreadable; using built-in prompt");
                }
            }
        }
    }

    /// Side-file paths are relative to the config file's directory.
    fn resolve_relative(&self, path: Option<PathBuf>) -> Option<PathBuf> {
        let path = path?;
        if path.is_absolute() {
            return Some(path);
        }
        Some(
            self.config_path
                .parent()
                .map_or_else(|| path.clone(), |dir| dir.join(&path)),
        )
    }
}

fn load_policy(path: &Path) -> anyhow::Result<ModelPolicy> {
    let contents = fs::read_to_string(path).context("Failed to read policy file")?;
    toml::from_str(&contents).context("Failed to parse policy file")
}
