use super::traits::Judge;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const MAX_BACKOFF_MS: u64 = 10_000;

/// Bounds a judge with a per-attempt timeout and a fixed number of retries.
///
/// Errors, timeouts and blank replies are retried with doubling backoff.
pub struct ReliableJudge {
    inner: Box<dyn Judge>,
    max_retries: u32,
    base_backoff_ms: u64,
    timeout: Duration,
}

impl ReliableJudge {
    pub fn new(inner: Box<dyn Judge>, max_retries: u32, base_backoff_ms: u64, timeout_secs: u64) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff_ms,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    async fn attempt(&self, prompt: &str) -> anyhow::Result<String> {
        let reply = tokio::time::timeout(self.timeout, self.inner.evaluate(prompt))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} judge timed out after {}s",
                    self.inner.name(),
                    self.timeout.as_secs()
                )
            })??;
        if reply.trim().is_empty() {
            anyhow::bail!("{} judge returned an empty reply", self.inner.name());
        }
        Ok(reply)
    }
}

impl Judge for ReliableJudge {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut backoff_ms = self.base_backoff_ms;
            let mut failures = Vec::new();

            for attempt in 0..=self.max_retries {
                match self.attempt(prompt).await {
                    Ok(reply) => {
                        if attempt > 0 {
                            tracing::info!(judge = self.inner.name(), attempt, "judge recovered after retry");
                        }
                        return Ok(reply);
                    }
                    Err(e) => {
                        tracing::warn!(
                            judge = self.inner.name(),
                            attempt = attempt + 1,
                            max_attempts = self.max_retries + 1,
                            "judge attempt failed: {e}"
                        );
                        failures.push(format!("attempt {}: {e}", attempt + 1));
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                            backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                        }
                    }
                }
            }

            anyhow::bail!(
                "{} judge failed after {} attempts: {}",
                self.inner.name(),
                self.max_retries + 1,
                failures.join("; ")
            )
        })
    }
}
