use std::time::Duration;

use chatbot_llm::GeneratorError;
use snafu::Snafu;

use crate::chat::message::MessageId;

/// Why a submitted prompt did not produce a response.
///
/// Every variant surfaces to the user as the same inline failure message.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResolutionError {
    #[snafu(display("response generation failed on `{stage}`: {source}"))]
    Generator {
        stage: &'static str,
        source: GeneratorError,
    },
    #[snafu(display("response generation timed out after {after:?} on `{stage}`"))]
    TimedOut {
        stage: &'static str,
        after: Duration,
    },
}

pub type ResolutionResult = Result<String, ResolutionError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SpeechError {
    #[snafu(display("speech service is not available on `{stage}`"))]
    Unavailable { stage: &'static str },
    #[snafu(display("message {message_id} has no text to speak"))]
    EmptyText {
        stage: &'static str,
        message_id: MessageId,
    },
    #[snafu(display("message {message_id} is not in the current session"))]
    UnknownMessage {
        stage: &'static str,
        message_id: MessageId,
    },
    #[snafu(display("speech is busy on `{stage}`: {details}"))]
    Busy {
        stage: &'static str,
        details: &'static str,
    },
    #[snafu(display("speech recognition failed: {message}"))]
    Recognition {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("speech playback failed: {message}"))]
    Playback {
        stage: &'static str,
        message: String,
    },
}

pub type SpeechResult<T> = Result<T, SpeechError>;
