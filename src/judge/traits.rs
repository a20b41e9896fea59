use std::future::Future;
use std::pin::Pin;

pub trait Judge: Send + Sync {
    /// Backend identifier used in logs.
    fn name(&self) -> &str;

    /// Sends a rendered evaluation prompt and returns the raw reply text.
    fn evaluate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
