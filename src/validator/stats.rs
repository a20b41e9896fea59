use serde::Serialize;

/// Running totals for one validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ValidatorStats {
    pub steps: u64,
    pub responses: u64,
    /// Responses that scored above zero.
    pub successful: u64,
    pub cumulative_reward: f64,
    pub blacklisted: usize,
    pub weight_updates: u64,
}

impl ValidatorStats {
    pub fn success_rate(&self) -> f64 {
        if self.responses == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.successful as f64 / self.responses as f64;
        rate
    }

    pub fn average_reward(&self) -> f64 {
        if self.responses == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let average = self.cumulative_reward / self.responses as f64;
        average
    }
}
