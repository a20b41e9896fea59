use super::traits::{ContentGenerator, GenerateFuture, GeneratedContent, content_field};
use crate::error::GenerationError;
use crate::protocol::{GenerationMode, ModelInfo, TaskRequest};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;

const MAX_STDERR_CHARS: usize = 500;

/// Runs an executable with the task request as JSON on stdin.
///
/// The script prints `{"content": ...}` on stdout. It is killed when the
/// deadline passes.
pub struct ScriptGenerator {
    path: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    timeout: Duration,
}

impl ScriptGenerator {
    pub fn new(
        path: impl Into<PathBuf>,
        args: Vec<String>,
        env: BTreeMap<String, String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            path: path.into(),
            args,
            env,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    fn backend_error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::Backend {
            generator: self.name().to_string(),
            message: message.into(),
        }
    }

    async fn run(&self, input: Vec<u8>) -> Result<std::process::Output, GenerationError> {
        let mut child = tokio::process::Command::new(&self.path)
            .args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.backend_error(format!("failed to start {}: {e}", self.path.display())))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&input)
                .await
                .map_err(|e| self.backend_error(format!("failed to write stdin: {e}")))?;
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(self.backend_error(format!("script failed: {e}"))),
            Err(_) => Err(GenerationError::Timeout {
                generator: self.name().to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

impl ContentGenerator for ScriptGenerator {
    fn name(&self) -> &str {
        "script"
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::Custom
    }

    fn model_info(&self) -> ModelInfo {
        let mut info = ModelInfo::new(GenerationMode::Custom, "custom");
        info.provider = Some("custom".into());
        info.parameters.insert(
            "script_path".into(),
            Value::from(self.path.display().to_string()),
        );
        info
    }

    fn generate<'a>(&'a self, request: &'a TaskRequest) -> GenerateFuture<'a> {
        Box::pin(async move {
            let started = Instant::now();
            let input = serde_json::to_vec(request)
                .map_err(|e| GenerationError::Config(format!("unserializable request: {e}")))?;
            let output = self.run(input).await?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr: String = stderr.chars().take(MAX_STDERR_CHARS).collect();
                return Err(self.backend_error(format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim()
                )));
            }

            let reply: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
                GenerationError::InvalidOutput {
                    generator: self.name().to_string(),
                    message: format!("stdout is not JSON: {e}"),
                }
            })?;

            let mut metadata = Map::new();
            metadata.insert(
                "script_path".into(),
                Value::from(self.path.display().to_string()),
            );
            Ok(GeneratedContent {
                generated_content: content_field(self.name(), &reply)?,
                model: "custom".into(),
                mode: GenerationMode::Custom,
                generation_time: started.elapsed().as_secs_f64(),
                metadata,
            })
        })
    }

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let Ok(meta) = std::fs::metadata(&self.path) else {
                return false;
            };
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                meta.is_file() && meta.permissions().mode() & 0o111 != 0
            }
            #[cfg(not(unix))]
            {
                meta.is_file()
            }
        })
    }
}
