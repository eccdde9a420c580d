/// Background job reporting contracts.
pub mod error;
pub mod events;
/// Domain entities and the request state machine.
pub mod message;
pub mod message_input;
pub mod message_list;
pub mod session;
pub mod speech;
pub mod suggestions;
pub mod task;
pub mod ticker;

pub use error::{ResolutionError, ResolutionResult, SpeechError, SpeechResult};
pub use events::{SessionChange, SessionEvent, SubmitOutcome, SubmitRejection};
pub use message::{
    Message, MessageId, MessageKind, RequestId, RequestState, RequestTarget, RequestTransition,
    RequestTransitionRejection, RequestTransitionResult, SessionId,
};
pub use message_input::{DraftInput, InputAffordance};
pub use message_list::MessageList;
pub use session::{ChatSession, SessionConfig};
pub use speech::{SpeechService, UnavailableSpeech};
pub use suggestions::{PRECONFIGURED_QUERIES, Suggestion, suggestion_strip};
pub use task::TaskHandle;
pub use ticker::{LOADING_MESSAGES, LoadingTicker};
