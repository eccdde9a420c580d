use chatbot_llm::BoxFuture;

use crate::chat::error::{SpeechError, SpeechResult};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Platform speech collaborator.
///
/// `recognize` resolves with one transcript, which the session treats like a
/// typed submission. `speak` resolves when playback ends or is stopped.
pub trait SpeechService: Send + Sync {
    fn recognize<'a>(&'a self, locale: &'a str) -> BoxFuture<'a, SpeechResult<String>>;
    fn speak<'a>(&'a self, text: &'a str, locale: &'a str) -> BoxFuture<'a, SpeechResult<()>>;
    fn stop<'a>(&'a self) -> BoxFuture<'a, SpeechResult<()>>;
}

/// Speech service for hosts without a speech engine; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSpeech;

impl SpeechService for UnavailableSpeech {
    fn recognize<'a>(&'a self, _locale: &'a str) -> BoxFuture<'a, SpeechResult<String>> {
        Box::pin(async {
            Err(SpeechError::Unavailable {
                stage: "recognize",
            })
        })
    }

    fn speak<'a>(&'a self, _text: &'a str, _locale: &'a str) -> BoxFuture<'a, SpeechResult<()>> {
        Box::pin(async { Err(SpeechError::Unavailable { stage: "speak" }) })
    }

    fn stop<'a>(&'a self) -> BoxFuture<'a, SpeechResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
