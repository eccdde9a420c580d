use std::future::Future;
use std::pin::Pin;

use snafu::Snafu;

/// Provider id of the offline responder; the default when none is configured.
pub const SIMULATED_PROVIDER_ID: &str = "simulated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub provider_id: String,
    pub api_key: String,
    pub endpoint: String,
    pub model_id: Option<String>,
    /// System instructions sent ahead of each prompt by remote providers.
    pub preamble: Option<String>,
    pub simulated_delay_ms: u64,
    pub simulated_max_chars: usize,
}

impl GeneratorConfig {
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
            model_id: None,
            preamble: None,
            simulated_delay_ms: crate::simulated::DEFAULT_SIMULATED_DELAY_MS,
            simulated_max_chars: crate::simulated::DEFAULT_SIMULATED_MAX_CHARS,
        }
    }

    pub fn simulated() -> Self {
        Self::new(SIMULATED_PROVIDER_ID, "", "")
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into().trim().to_string();
        self.model_id = if model_id.is_empty() {
            None
        } else {
            Some(model_id)
        };
        self
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        let preamble = preamble.into();
        self.preamble = if preamble.trim().is_empty() {
            None
        } else {
            Some(preamble)
        };
        self
    }

    pub fn with_simulation(mut self, delay_ms: u64, max_chars: usize) -> Self {
        self.simulated_delay_ms = delay_ms;
        self.simulated_max_chars = max_chars;
        self
    }
}

/// One prompt handed to a generator.
///
/// `session_tag` identifies the chat session on the backend side; it is not
/// interpreted by the generator beyond forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRequest {
    pub session_tag: u64,
    pub prompt: String,
}

impl ResponseRequest {
    pub fn new(session_tag: u64, prompt: impl Into<String>) -> Self {
        Self {
            session_tag,
            prompt: prompt.into(),
        }
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type GeneratorResult<T> = Result<T, GeneratorError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GeneratorError {
    #[snafu(display("missing API key for provider '{provider_id}'"))]
    MissingApiKey {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("provider '{provider_id}' is not supported"))]
    UnsupportedProvider {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("response request for session {session_tag} has an empty prompt"))]
    EmptyPrompt {
        stage: &'static str,
        session_tag: u64,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("completions failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
}

/// Asynchronous response-generation collaborator consumed by the chat session.
///
/// Exactly one outcome is produced per call. Implementations must not retry on
/// their own; the caller owns timeout policy.
pub trait ResponseGenerator: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn generate<'a>(&'a self, request: ResponseRequest) -> BoxFuture<'a, GeneratorResult<String>>;
}
