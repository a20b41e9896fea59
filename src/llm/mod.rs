//! Chat-completion clients shared by the narrative judge and the API generator.

pub mod compatible;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod scrub;
pub mod traits;

pub use compatible::{AuthStyle, OpenAiCompatibleProvider};
pub use factory::{create_provider, provider_base_url, resolve_api_key};
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use ollama::OllamaProvider;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::{ChatProvider, ChatRequestOptions};
