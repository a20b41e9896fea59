use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("STORYFI_JUDGE_BACKEND")
            && !backend.is_empty()
        {
            self.narrative.backend = backend;
        }

        if let Ok(model) = std::env::var("STORYFI_JUDGE_MODEL")
            && !model.is_empty()
        {
            self.narrative.model = Some(model);
        }

        if let Ok(alpha_str) = std::env::var("STORYFI_EMA_ALPHA")
            && let Ok(alpha) = alpha_str.parse::<f64>()
            && alpha > 0.0
            && alpha <= 1.0
        {
            self.reputation.ema_alpha = alpha;
        }

        if let Ok(temp_str) = std::env::var("STORYFI_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && temp.is_finite()
            && temp > 0.0
        {
            self.reputation.temperature = temp;
        }

        if let Ok(interval_str) = std::env::var("STORYFI_QUERY_INTERVAL")
            && let Ok(interval) = interval_str.parse::<u64>()
        {
            self.validator.query_interval_secs = interval;
        }

        if let Ok(timeout_str) = std::env::var("STORYFI_BATCH_TIMEOUT")
            && let Ok(timeout) = timeout_str.parse::<u64>()
            && timeout > 0
        {
            self.validator.batch_timeout_secs = timeout;
        }

        if let Ok(level) = std::env::var("STORYFI_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
