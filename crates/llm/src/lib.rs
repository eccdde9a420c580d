use std::sync::Arc;
use std::time::Duration;

mod generator;
mod rig_adapter;
mod simulated;

pub use generator::{
    BoxFuture, GeneratorConfig, GeneratorError, GeneratorResult, ResponseGenerator,
    ResponseRequest, SIMULATED_PROVIDER_ID,
};
pub use rig_adapter::{DEFAULT_OPENAI_MODEL, RIG_OPENAI_PROVIDER_ID, RigResponder};
pub use simulated::{DEFAULT_SIMULATED_DELAY_MS, DEFAULT_SIMULATED_MAX_CHARS, SimulatedResponder};

pub fn create_generator(mut config: GeneratorConfig) -> GeneratorResult<Arc<dyn ResponseGenerator>> {
    if config.provider_id.trim().is_empty() {
        config.provider_id = SIMULATED_PROVIDER_ID.to_string();
    }

    match config.provider_id.as_str() {
        SIMULATED_PROVIDER_ID => Ok(Arc::new(SimulatedResponder::new(
            Duration::from_millis(config.simulated_delay_ms),
            config.simulated_max_chars,
        ))),
        "openai" | "rig-openai" => {
            config.provider_id = RIG_OPENAI_PROVIDER_ID.to_string();
            Ok(Arc::new(RigResponder::new(config)?))
        }
        _ => Err(GeneratorError::UnsupportedProvider {
            stage: "create-generator",
            provider_id: config.provider_id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn blank_provider_defaults_to_simulation() {
        let generator = create_generator(GeneratorConfig::new("", "", ""))
            .expect("simulated generator needs no credentials");
        assert_eq!(generator.id(), SIMULATED_PROVIDER_ID);
    }

    #[::core::prelude::v1::test]
    fn openai_aliases_resolve_to_rig() {
        let generator = create_generator(GeneratorConfig::new("rig-openai", "sk-test", ""))
            .expect("api key is present");
        assert_eq!(generator.id(), RIG_OPENAI_PROVIDER_ID);
        assert_eq!(generator.name(), "Rig OpenAI");
    }

    #[::core::prelude::v1::test]
    fn unknown_provider_is_rejected() {
        let result = create_generator(GeneratorConfig::new("graphql-agent", "key", ""));
        assert!(matches!(
            result,
            Err(GeneratorError::UnsupportedProvider { ref provider_id, .. }) if provider_id == "graphql-agent"
        ));
    }
}
