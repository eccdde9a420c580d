use std::time::Duration;

use rand::Rng;
use snafu::ensure;

use super::generator::{
    BoxFuture, EmptyPromptSnafu, GeneratorResult, ResponseGenerator, ResponseRequest,
    SIMULATED_PROVIDER_ID,
};

pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 1_000;
pub const DEFAULT_SIMULATED_MAX_CHARS: usize = 200;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

/// Offline responder that answers every prompt with a random-length slice of
/// placeholder text after a fixed delay.
pub struct SimulatedResponder {
    delay: Duration,
    max_chars: usize,
}

impl SimulatedResponder {
    pub fn new(delay: Duration, max_chars: usize) -> Self {
        Self {
            delay,
            max_chars: max_chars.max(1),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn pick_length(&self) -> usize {
        rand::thread_rng().gen_range(1..=self.max_chars)
    }

    fn placeholder(length: usize) -> String {
        LOREM.chars().take(length).collect()
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_SIMULATED_DELAY_MS),
            DEFAULT_SIMULATED_MAX_CHARS,
        )
    }
}

impl ResponseGenerator for SimulatedResponder {
    fn id(&self) -> &str {
        SIMULATED_PROVIDER_ID
    }

    fn name(&self) -> &str {
        "Simulated"
    }

    fn generate<'a>(&'a self, request: ResponseRequest) -> BoxFuture<'a, GeneratorResult<String>> {
        Box::pin(async move {
            ensure!(
                !request.prompt.trim().is_empty(),
                EmptyPromptSnafu {
                    stage: "simulated-generate",
                    session_tag: request.session_tag,
                }
            );

            // Draw before suspending; the thread-local rng is not Send.
            let length = self.pick_length();
            tokio::time::sleep(self.delay).await;

            tracing::debug!(
                session_tag = request.session_tag,
                length,
                "simulated response ready"
            );
            Ok(Self::placeholder(length))
        })
    }
}
