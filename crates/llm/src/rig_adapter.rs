use futures::StreamExt;
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::openai;
use rig::streaming::StreamedAssistantContent;
use snafu::{ResultExt, ensure};

use super::generator::{
    BoxFuture, CompletionsFailedSnafu, EmptyPromptSnafu, GeneratorConfig, GeneratorError,
    GeneratorResult, HttpClientSnafu, MissingApiKeySnafu, ResponseGenerator, ResponseRequest,
};

pub const RIG_OPENAI_PROVIDER_ID: &str = "openai";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

type RigStreamingResponse = rig::streaming::StreamingCompletionResponse<
    rig::providers::openai::responses_api::streaming::StreamingCompletionResponse,
>;

/// Chat-completions backed responder.
///
/// Each request is sent as a single user turn; the first choice's text is the
/// answer. Streaming is used internally and the text deltas are concatenated.
pub struct RigResponder {
    config: GeneratorConfig,
}

impl RigResponder {
    pub fn new(config: GeneratorConfig) -> GeneratorResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-responder-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self { config })
    }

    pub fn preamble(&self) -> Option<&str> {
        self.config.preamble.as_deref()
    }

    pub fn model_id(&self) -> &str {
        self.config
            .model_id
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    fn build_client(config: &GeneratorConfig) -> GeneratorResult<openai::Client> {
        let mut builder = openai::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    async fn open_stream(&self, request: &ResponseRequest) -> GeneratorResult<RigStreamingResponse> {
        let client = Self::build_client(&self.config)?;
        let model = client.completion_model(self.model_id().to_string());

        let prompt = RigMessage::user(request.prompt.clone());
        let mut builder = model.completion_request(prompt);

        if let Some(preamble) = &self.config.preamble {
            builder = builder.preamble(preamble.clone());
        }

        builder.stream().await.context(CompletionsFailedSnafu {
            stage: "open-stream",
        })
    }

    fn text_fragment<R>(item: StreamedAssistantContent<R>) -> Option<String>
    where
        R: Clone + Unpin,
    {
        match item {
            StreamedAssistantContent::Text(text) => Some(text.text),
            // Only the visible answer is shown in the chat log.
            StreamedAssistantContent::Reasoning(_)
            | StreamedAssistantContent::ReasoningDelta { .. }
            | StreamedAssistantContent::ToolCall { .. }
            | StreamedAssistantContent::ToolCallDelta { .. }
            | StreamedAssistantContent::Final(_) => None,
        }
    }

    async fn collect_answer(&self, request: ResponseRequest) -> GeneratorResult<String> {
        ensure!(
            !request.prompt.trim().is_empty(),
            EmptyPromptSnafu {
                stage: "rig-generate",
                session_tag: request.session_tag,
            }
        );

        let mut stream = self.open_stream(&request).await.inspect_err(|error| {
            tracing::error!(
                provider_id = %self.config.provider_id,
                model_id = %self.model_id(),
                session_tag = request.session_tag,
                error = %error,
                "failed to open provider stream"
            );
        })?;

        let mut answer = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(item) => {
                    if let Some(fragment) = Self::text_fragment(item) {
                        answer.push_str(&fragment);
                    }
                }
                Err(source) => {
                    tracing::warn!(
                        session_tag = request.session_tag,
                        error = %source,
                        "provider stream emitted an error chunk"
                    );
                    return Err(GeneratorError::CompletionsFailed {
                        stage: "stream-chunk",
                        source,
                    });
                }
            }
        }

        Ok(Self::answer_or_fallback(answer, &request.prompt))
    }

    fn answer_or_fallback(answer: String, prompt: &str) -> String {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            format!("Response received for: \"{prompt}\"")
        } else {
            trimmed.to_string()
        }
    }
}

impl ResponseGenerator for RigResponder {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        "Rig OpenAI"
    }

    fn generate<'a>(&'a self, request: ResponseRequest) -> BoxFuture<'a, GeneratorResult<String>> {
        Box::pin(self.collect_answer(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn requires_an_api_key() {
        let result = RigResponder::new(GeneratorConfig::new("openai", "  ", ""));
        assert!(matches!(
            result,
            Err(GeneratorError::MissingApiKey { .. })
        ));
    }

    #[::core::prelude::v1::test]
    fn falls_back_to_default_model() {
        let responder = RigResponder::new(GeneratorConfig::new("openai", "sk-test", ""))
            .expect("api key is present");
        assert_eq!(responder.model_id(), DEFAULT_OPENAI_MODEL);

        let responder = RigResponder::new(
            GeneratorConfig::new("openai", "sk-test", "").with_model("gpt-4o"),
        )
        .expect("api key is present");
        assert_eq!(responder.model_id(), "gpt-4o");
    }

    #[::core::prelude::v1::test]
    fn preamble_comes_from_the_config() {
        let responder = RigResponder::new(
            GeneratorConfig::new("openai", "sk-test", "")
                .with_preamble("You are a banking assistant."),
        )
        .expect("api key is present");
        assert_eq!(responder.preamble(), Some("You are a banking assistant."));

        let responder = RigResponder::new(
            GeneratorConfig::new("openai", "sk-test", "").with_preamble("   "),
        )
        .expect("api key is present");
        assert_eq!(responder.preamble(), None);
    }

    #[::core::prelude::v1::test]
    fn empty_answer_echoes_the_prompt() {
        assert_eq!(
            RigResponder::answer_or_fallback("  \n".to_string(), "When will my fixed deposit mature?"),
            "Response received for: \"When will my fixed deposit mature?\""
        );
        assert_eq!(
            RigResponder::answer_or_fallback(" Due on the 5th. ".to_string(), "EMI?"),
            "Due on the 5th."
        );
    }
}
