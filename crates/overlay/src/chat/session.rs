use std::sync::Arc;
use std::time::Duration;

use chatbot_llm::{ResponseGenerator, ResponseRequest};
use snafu::{OptionExt, ResultExt, ensure};
use tokio::sync::mpsc;

use crate::chat::error::{
    BusySnafu, EmptyTextSnafu, GeneratorSnafu, SpeechResult, TimedOutSnafu, UnknownMessageSnafu,
};
use crate::chat::events::{SessionChange, SessionEvent, SubmitOutcome, SubmitRejection};
use crate::chat::message::{
    Message, MessageId, RequestId, RequestState, RequestTarget, RequestTransition, SessionId,
};
use crate::chat::message_input::{DraftInput, InputAffordance};
use crate::chat::speech::{DEFAULT_LOCALE, SpeechService, UnavailableSpeech};
use crate::chat::suggestions::{Suggestion, preconfigured_query};
use crate::chat::task::TaskHandle;
use crate::chat::ticker::{DEFAULT_TICKER_INTERVAL_MS, LoadingTicker};
use crate::settings::OverlayConfig;

pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub overlay: OverlayConfig,
    pub ticker_interval: Duration,
    pub response_timeout: Duration,
    pub locale: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            ticker_interval: Duration::from_millis(DEFAULT_TICKER_INTERVAL_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Resources tied to the one outstanding prompt.
///
/// Dropping it aborts the resolution job and the loading ticker together.
struct InFlight {
    target: RequestTarget,
    prompt: String,
    ticker: Option<LoadingTicker>,
    _resolution: TaskHandle,
}

struct SpeechJob {
    target: RequestTarget,
    message_id: Option<MessageId>,
    _job: TaskHandle,
}

/// Chat session controller behind the overlay.
///
/// All state changes happen either in the public operations or in
/// [`ChatSession::handle_event`]; background jobs only send [`SessionEvent`]s.
pub struct ChatSession {
    config: SessionConfig,
    generator: Arc<dyn ResponseGenerator>,
    speech: Arc<dyn SpeechService>,
    events: mpsc::UnboundedSender<SessionEvent>,
    session_id: SessionId,
    request_state: RequestState,
    in_flight: Option<InFlight>,
    messages: Vec<Message>,
    draft: DraftInput,
    suggestions_visible: bool,
    recording: Option<SpeechJob>,
    playback: Option<SpeechJob>,
    next_session_id: u64,
    next_request_id: u64,
    next_message_id: u64,
}

impl ChatSession {
    /// Creates an idle session and the receiver its background jobs report to.
    pub fn new(
        config: SessionConfig,
        generator: Arc<dyn ResponseGenerator>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let session = Self {
            config,
            generator,
            speech: Arc::new(UnavailableSpeech),
            events,
            session_id: SessionId::new(1),
            request_state: RequestState::Idle,
            in_flight: None,
            messages: Vec::new(),
            draft: DraftInput::new(),
            suggestions_visible: true,
            recording: None,
            playback: None,
            next_session_id: 2,
            next_request_id: 1,
            next_message_id: 1,
        };
        (session, events_rx)
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechService>) -> Self {
        self.speech = speech;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.request_state.is_loading()
    }

    pub fn pending_target(&self) -> Option<RequestTarget> {
        self.request_state.active_target()
    }

    /// Current loading placeholder, if a prompt is pending and the ticker is enabled.
    pub fn loading_text(&self) -> Option<&'static str> {
        self.in_flight
            .as_ref()
            .and_then(|in_flight| in_flight.ticker.as_ref())
            .map(LoadingTicker::text)
    }

    pub fn draft(&self) -> &str {
        self.draft.text()
    }

    pub fn affordance(&self) -> InputAffordance {
        self.draft.affordance()
    }

    pub fn suggestions_visible(&self) -> bool {
        self.config.overlay.enable_suggestions && self.suggestions_visible
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.playback.is_some()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft.set(text);
    }

    pub fn hide_suggestions(&mut self) {
        self.suggestions_visible = false;
    }

    pub fn show_suggestions(&mut self) {
        self.suggestions_visible = true;
    }

    /// Submits typed text. On acceptance the draft is cleared.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.start_request(text);
        if outcome.is_accepted() {
            self.draft.clear();
        }
        outcome
    }

    /// Submits the current draft.
    pub fn send_draft(&mut self) -> SubmitOutcome {
        let text = self.draft.text().to_string();
        self.submit(&text)
    }

    /// Submits one of the canned queries; the draft is left untouched.
    pub fn submit_preconfigured_query(&mut self, index: usize) -> SubmitOutcome {
        match preconfigured_query(index) {
            Some(query) => self.start_request(query),
            None => {
                tracing::debug!(index, "ignoring unknown preconfigured query");
                SubmitOutcome::Rejected(SubmitRejection::UnknownQuery)
            }
        }
    }

    pub fn submit_suggestion(&mut self, suggestion: Suggestion) -> SubmitOutcome {
        self.submit_preconfigured_query(suggestion.index)
    }

    /// Routes one background event. Events from an earlier session or for a
    /// request that is no longer pending are discarded.
    pub fn handle_event(&mut self, event: SessionEvent) -> SessionChange {
        if event.session_id() != self.session_id {
            tracing::debug!(
                session_id = %self.session_id,
                event_target = %event.target(),
                "discarding event from a closed session"
            );
            return SessionChange::None;
        }

        match event {
            SessionEvent::LoadingTick(target) => self.advance_ticker(target),
            SessionEvent::Resolved { target, outcome } => self.resolve(target, outcome),
            SessionEvent::Transcribed { target, result } => self.finish_recording(target, result),
            SessionEvent::SpeechFinished { target, result } => {
                self.finish_playback(target, result)
            }
        }
    }

    /// Settles the pending prompt with exactly one terminal message.
    ///
    /// The ticker stops and the loading flag clears in the same call that
    /// appends the message.
    pub fn resolve(
        &mut self,
        target: RequestTarget,
        outcome: crate::chat::error::ResolutionResult,
    ) -> SessionChange {
        let next_state = match self.request_state.apply(RequestTransition::Settle(target)) {
            Ok(state) => state,
            Err(rejection) => {
                tracing::debug!(
                    request = %target,
                    rejection = ?rejection,
                    "discarding stale resolution"
                );
                return SessionChange::None;
            }
        };

        let Some(in_flight) = self.in_flight.take() else {
            tracing::error!(request = %target, "loading state had no in-flight request");
            self.request_state = next_state;
            return SessionChange::Messages;
        };

        let message_id = self.allocate_message_id();
        let message = match outcome {
            Ok(text) => Message::response(message_id, text),
            Err(error) => {
                tracing::warn!(
                    request = %in_flight.target,
                    error = %error,
                    "response generation failed"
                );
                Message::send_failure(message_id, &in_flight.prompt)
            }
        };

        drop(in_flight);
        self.messages.push(message);
        self.request_state = next_state;
        SessionChange::Messages
    }

    /// Discards everything tied to the current visibility period and starts a
    /// fresh session id so late events cannot land in the new one.
    pub fn reset(&mut self) {
        let previous = self.session_id;
        self.in_flight = None;
        self.recording = None;
        if self.playback.take().is_some() {
            self.spawn_speech_stop();
        }
        self.request_state = self
            .request_state
            .apply(RequestTransition::Reset)
            .unwrap_or_default();
        self.messages.clear();
        self.draft.clear();
        self.suggestions_visible = true;
        self.session_id = SessionId::new(self.next_session_id);
        self.next_session_id = self.next_session_id.saturating_add(1);

        tracing::debug!(
            previous_session_id = %previous,
            session_id = %self.session_id,
            "chat session reset"
        );
    }

    /// Starts speech recognition; the transcript is submitted like typed text.
    pub fn start_recording(&mut self) -> SpeechResult<RequestTarget> {
        ensure!(
            !self.is_loading(),
            BusySnafu {
                stage: "start-recording",
                details: "a response is pending",
            }
        );
        ensure!(
            self.recording.is_none(),
            BusySnafu {
                stage: "start-recording",
                details: "already recording",
            }
        );

        let target = self.allocate_target();
        let speech = self.speech.clone();
        let locale = self.config.locale.clone();
        let events = self.events.clone();
        let job = TaskHandle::spawn(async move {
            let result = speech.recognize(&locale).await;
            let _ = events.send(SessionEvent::Transcribed { target, result });
        });

        self.recording = Some(SpeechJob {
            target,
            message_id: None,
            _job: job,
        });
        Ok(target)
    }

    pub fn stop_recording(&mut self) -> bool {
        self.recording.take().is_some()
    }

    /// Speaks a message, or stops playback when something is already being spoken.
    pub fn press_message(&mut self, message_id: MessageId) -> SpeechResult<()> {
        if self.playback.take().is_some() {
            self.spawn_speech_stop();
            return Ok(());
        }

        let text = self
            .messages
            .iter()
            .find(|message| message.id == message_id)
            .map(|message| message.text.clone())
            .context(UnknownMessageSnafu {
                stage: "press-message",
                message_id,
            })?;
        ensure!(
            !text.trim().is_empty(),
            EmptyTextSnafu {
                stage: "press-message",
                message_id,
            }
        );

        let target = self.allocate_target();
        let speech = self.speech.clone();
        let locale = self.config.locale.clone();
        let events = self.events.clone();
        let job = TaskHandle::spawn(async move {
            let result = speech.speak(&text, &locale).await;
            let _ = events.send(SessionEvent::SpeechFinished { target, result });
        });

        self.playback = Some(SpeechJob {
            target,
            message_id: Some(message_id),
            _job: job,
        });
        Ok(())
    }

    pub fn speaking_message(&self) -> Option<MessageId> {
        self.playback.as_ref().and_then(|playback| playback.message_id)
    }

    fn start_request(&mut self, text: &str) -> SubmitOutcome {
        let prompt = text.trim();
        if prompt.is_empty() {
            return SubmitOutcome::Rejected(SubmitRejection::EmptyText);
        }

        let target = self.allocate_target();
        self.request_state = match self.request_state.apply(RequestTransition::Start(target)) {
            Ok(state) => state,
            Err(rejection) => {
                tracing::debug!(rejection = ?rejection, "submission rejected while loading");
                return SubmitOutcome::Rejected(SubmitRejection::AlreadyLoading);
            }
        };

        let message_id = self.allocate_message_id();
        self.messages.push(Message::user(message_id, prompt));

        let ticker = self.config.overlay.enable_loading_ticker.then(|| {
            LoadingTicker::start(target, self.config.ticker_interval, self.events.clone())
        });
        let resolution = self.spawn_resolution(target, prompt.to_string());

        self.in_flight = Some(InFlight {
            target,
            prompt: prompt.to_string(),
            ticker,
            _resolution: resolution,
        });

        tracing::debug!(request = %target, message_id = %message_id, "prompt submitted");
        SubmitOutcome::Accepted(target)
    }

    fn spawn_resolution(&self, target: RequestTarget, prompt: String) -> TaskHandle {
        let generator = self.generator.clone();
        let events = self.events.clone();
        let timeout = self.config.response_timeout;
        let request = ResponseRequest::new(target.session_id.0, prompt);

        TaskHandle::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, generator.generate(request)).await {
                Ok(result) => result.context(GeneratorSnafu {
                    stage: "generate-response",
                }),
                Err(_elapsed) => TimedOutSnafu {
                    stage: "await-response",
                    after: timeout,
                }
                .fail(),
            };
            let _ = events.send(SessionEvent::Resolved { target, outcome });
        })
    }

    fn spawn_speech_stop(&self) {
        let speech = self.speech.clone();
        // Fire and forget; playback state is already cleared.
        tokio::spawn(async move {
            if let Err(error) = speech.stop().await {
                tracing::warn!(error = %error, "failed to stop speech playback");
            }
        });
    }

    fn advance_ticker(&mut self, target: RequestTarget) -> SessionChange {
        if !self.request_state.accepts(target) {
            return SessionChange::None;
        }

        match self
            .in_flight
            .as_mut()
            .and_then(|in_flight| in_flight.ticker.as_mut())
        {
            Some(ticker) if ticker.target() == target => {
                ticker.advance();
                SessionChange::LoadingText
            }
            _ => SessionChange::None,
        }
    }

    fn finish_recording(
        &mut self,
        target: RequestTarget,
        result: SpeechResult<String>,
    ) -> SessionChange {
        match &self.recording {
            Some(recording) if recording.target == target => {
                self.recording = None;
            }
            _ => return SessionChange::None,
        }

        match result {
            Ok(transcript) => match self.start_request(&transcript) {
                SubmitOutcome::Accepted(_) => SessionChange::Messages,
                SubmitOutcome::Rejected(rejection) => {
                    tracing::debug!(rejection = ?rejection, "transcript not submitted");
                    SessionChange::Speech
                }
            },
            Err(error) => {
                tracing::warn!(error = %error, "speech recognition failed");
                SessionChange::Speech
            }
        }
    }

    fn finish_playback(&mut self, target: RequestTarget, result: SpeechResult<()>) -> SessionChange {
        match &self.playback {
            Some(playback) if playback.target == target => {
                self.playback = None;
            }
            _ => return SessionChange::None,
        }

        if let Err(error) = result {
            tracing::warn!(error = %error, "speech playback failed");
        }
        SessionChange::Speech
    }

    fn allocate_target(&mut self) -> RequestTarget {
        let target = RequestTarget::new(self.session_id, RequestId::new(self.next_request_id));
        self.next_request_id = self.next_request_id.saturating_add(1);
        target
    }

    fn allocate_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chatbot_llm::{BoxFuture, GeneratorError, GeneratorResult};

    use super::*;
    use crate::chat::error::SpeechError;
    use crate::chat::message::MessageKind;
    use crate::chat::suggestions::PRECONFIGURED_QUERIES;
    use crate::chat::ticker::LOADING_MESSAGES;

    #[derive(Clone, Copy)]
    enum Script {
        Answer,
        Fail,
        Hang,
    }

    struct ScriptedGenerator {
        delay: Duration,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(delay_ms: u64, script: Script) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(delay_ms),
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ResponseGenerator for ScriptedGenerator {
        fn id(&self) -> &str {
            "scripted"
        }

        fn name(&self) -> &str {
            "Scripted"
        }

        fn generate<'a>(
            &'a self,
            request: ResponseRequest,
        ) -> BoxFuture<'a, GeneratorResult<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                match self.script {
                    Script::Answer => Ok(format!("answer to {}", request.prompt)),
                    Script::Fail => Err(GeneratorError::UnsupportedProvider {
                        stage: "scripted",
                        provider_id: "offline".to_string(),
                    }),
                    Script::Hang => std::future::pending().await,
                }
            })
        }
    }

    struct ScriptedSpeech {
        transcript: &'static str,
    }

    impl SpeechService for ScriptedSpeech {
        fn recognize<'a>(&'a self, _locale: &'a str) -> BoxFuture<'a, SpeechResult<String>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(self.transcript.to_string())
            })
        }

        fn speak<'a>(&'a self, _text: &'a str, _locale: &'a str) -> BoxFuture<'a, SpeechResult<()>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
        }

        fn stop<'a>(&'a self) -> BoxFuture<'a, SpeechResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn session_with(
        generator: Arc<ScriptedGenerator>,
        config: SessionConfig,
    ) -> (ChatSession, mpsc::UnboundedReceiver<SessionEvent>) {
        ChatSession::new(config, generator)
    }

    async fn run_until_idle(
        session: &mut ChatSession,
        events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        while session.is_loading() {
            let event = events.recv().await.expect("session keeps its sender alive");
            session.handle_event(event);
        }
    }

    fn kinds(session: &ChatSession) -> Vec<MessageKind> {
        session.messages().iter().map(|message| message.kind).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn submit_appends_user_message_then_one_response() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(1_000, Script::Answer), SessionConfig::default());

        let outcome = session.submit("  What is my balance?  ");
        assert!(outcome.is_accepted());
        assert!(session.is_loading());
        assert_eq!(session.pending_target(), outcome.target());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, "What is my balance?");
        assert_eq!(session.loading_text(), Some(LOADING_MESSAGES[0]));

        run_until_idle(&mut session, &mut events).await;

        assert!(!session.is_loading());
        assert_eq!(session.loading_text(), None);
        assert_eq!(kinds(&session), vec![MessageKind::User, MessageKind::Response]);
        assert_eq!(session.messages()[1].text, "answer to What is my balance?");
        assert_ne!(session.messages()[0].id, session.messages()[1].id);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_text_is_a_no_op() {
        let generator = ScriptedGenerator::new(10, Script::Answer);
        let (mut session, _events) = session_with(generator.clone(), SessionConfig::default());

        session.set_draft(" \n ");
        assert_eq!(
            session.send_draft(),
            SubmitOutcome::Rejected(SubmitRejection::EmptyText)
        );
        assert_eq!(
            session.submit(""),
            SubmitOutcome::Rejected(SubmitRejection::EmptyText)
        );

        assert!(session.messages().is_empty());
        assert!(!session.is_loading());
        assert_eq!(session.draft(), " \n ");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_tap_while_loading_is_rejected() {
        let generator = ScriptedGenerator::new(500, Script::Answer);
        let (mut session, mut events) = session_with(generator.clone(), SessionConfig::default());

        assert!(session.submit_preconfigured_query(4).is_accepted());
        assert_eq!(
            session.submit_preconfigured_query(4),
            SubmitOutcome::Rejected(SubmitRejection::AlreadyLoading)
        );
        assert_eq!(
            session.submit("anything else"),
            SubmitOutcome::Rejected(SubmitRejection::AlreadyLoading)
        );

        run_until_idle(&mut session, &mut events).await;

        let user_messages = session
            .messages()
            .iter()
            .filter(|message| message.kind == MessageKind::User)
            .collect::<Vec<_>>();
        assert_eq!(user_messages.len(), 1);
        assert_eq!(user_messages[0].text, "When is my next loan EMI due?");
        assert_eq!(session.messages().len(), 2);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_appends_error_quoting_the_prompt() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(200, Script::Fail), SessionConfig::default());

        session.submit("What is my balance?");
        run_until_idle(&mut session, &mut events).await;

        assert_eq!(kinds(&session), vec![MessageKind::User, MessageKind::Error]);
        assert_eq!(
            session.messages()[1].text,
            "Failed to send: \"What is my balance?\". Please try again."
        );

        // The session stays usable after a failure.
        assert!(session.submit("again").is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_generator_times_out_into_the_error_path() {
        let config = SessionConfig {
            response_timeout: Duration::from_secs(2),
            ..SessionConfig::default()
        };
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(0, Script::Hang), config);
        let started = tokio::time::Instant::now();

        session.submit("When will my fixed deposit mature?");
        run_until_idle(&mut session, &mut events).await;

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(kinds(&session), vec![MessageKind::User, MessageKind::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_mid_loading_discards_the_late_resolution() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(1_000, Script::Answer), SessionConfig::default());

        let target = session
            .submit("What is my balance?")
            .target()
            .expect("submission accepted");
        let closed_session = session.session_id();
        session.reset();

        assert!(session.messages().is_empty());
        assert!(!session.is_loading());
        assert_eq!(session.loading_text(), None);
        assert_ne!(session.session_id(), closed_session);

        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(event) = events.try_recv() {
            assert_eq!(session.handle_event(event), SessionChange::None);
        }

        // Even a resolution delivered by hand cannot resurrect the old session.
        assert_eq!(
            session.handle_event(SessionEvent::Resolved {
                target,
                outcome: Ok("late".to_string()),
            }),
            SessionChange::None
        );
        assert!(session.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_cycles_every_placeholder_and_stops_with_loading() {
        // Long enough for more than one full cycle of placeholders.
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(12_400, Script::Answer), SessionConfig::default());

        session.submit("Give me summary of my overall relationship with bank.");
        let mut shown = vec![session.loading_text().expect("ticker enabled")];

        while session.is_loading() {
            let event = events.recv().await.expect("sender alive");
            if session.handle_event(event) == SessionChange::LoadingText {
                shown.push(session.loading_text().expect("still loading"));
            }
        }

        assert_eq!(shown.len(), 16);
        assert_eq!(&shown[..LOADING_MESSAGES.len()], &LOADING_MESSAGES[..]);
        assert_eq!(shown[14], LOADING_MESSAGES[0]);
        assert_eq!(shown[15], LOADING_MESSAGES[1]);
        assert_eq!(session.loading_text(), None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(event) = events.try_recv() {
            assert_eq!(session.handle_event(event), SessionChange::None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_ticker_keeps_loading_semantics() {
        let mut config = SessionConfig::default();
        config.overlay.enable_loading_ticker = false;
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(2_000, Script::Answer), config);

        session.submit("What is my total account balance?");
        assert!(session.is_loading());
        assert_eq!(session.loading_text(), None);

        run_until_idle(&mut session, &mut events).await;
        assert_eq!(kinds(&session), vec![MessageKind::User, MessageKind::Response]);
    }

    #[tokio::test(start_paused = true)]
    async fn draft_is_cleared_by_send_but_not_by_suggestions() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(100, Script::Answer), SessionConfig::default());

        session.set_draft("half typed");
        assert_eq!(session.affordance(), InputAffordance::Send);
        let suggestion = crate::chat::suggestions::suggestion_strip(1)
            .nth(1)
            .expect("strip has entries");
        assert!(session.submit_suggestion(suggestion).is_accepted());
        assert_eq!(session.draft(), "half typed");
        assert_eq!(session.messages()[0].text, PRECONFIGURED_QUERIES[1]);

        run_until_idle(&mut session, &mut events).await;

        assert!(session.send_draft().is_accepted());
        assert_eq!(session.draft(), "");
        assert_eq!(session.affordance(), InputAffordance::Microphone);
        assert_eq!(
            session.submit_preconfigured_query(99),
            SubmitOutcome::Rejected(SubmitRejection::UnknownQuery)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_suggestions_and_keeps_ids_unique() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(100, Script::Answer), SessionConfig::default());

        session.hide_suggestions();
        assert!(!session.suggestions_visible());
        session.submit("first");
        run_until_idle(&mut session, &mut events).await;
        let first_ids = session
            .messages()
            .iter()
            .map(|message| message.id)
            .collect::<Vec<_>>();

        session.reset();
        assert!(session.suggestions_visible());
        session.submit("second");
        run_until_idle(&mut session, &mut events).await;

        assert_eq!(session.messages().len(), 2);
        assert!(
            session
                .messages()
                .iter()
                .all(|message| !first_ids.contains(&message.id))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn assistant_variant_never_shows_suggestions() {
        let config = SessionConfig {
            overlay: OverlayConfig::assistant(),
            ..SessionConfig::default()
        };
        let (mut session, _events) = session_with(ScriptedGenerator::new(1, Script::Answer), config);

        session.show_suggestions();
        assert!(!session.suggestions_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_is_submitted_like_typed_text() {
        let (session, mut events) =
            session_with(ScriptedGenerator::new(300, Script::Answer), SessionConfig::default());
        let mut session = session.with_speech(Arc::new(ScriptedSpeech {
            transcript: " When will my fixed deposit mature? ",
        }));

        session.start_recording().expect("idle session can record");
        assert!(session.is_recording());
        assert!(matches!(
            session.start_recording(),
            Err(SpeechError::Busy { .. })
        ));

        let event = events.recv().await.expect("transcript arrives");
        assert_eq!(session.handle_event(event), SessionChange::Messages);
        assert!(!session.is_recording());
        assert!(session.is_loading());
        assert_eq!(
            session.messages()[0].text,
            "When will my fixed deposit mature?"
        );

        assert!(matches!(
            session.start_recording(),
            Err(SpeechError::Busy { .. })
        ));
        run_until_idle(&mut session, &mut events).await;
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pressing_a_message_toggles_playback() {
        let (session, mut events) =
            session_with(ScriptedGenerator::new(100, Script::Answer), SessionConfig::default());
        let mut session = session.with_speech(Arc::new(ScriptedSpeech { transcript: "" }));

        assert!(matches!(
            session.press_message(MessageId::new(42)),
            Err(SpeechError::UnknownMessage { .. })
        ));

        session.submit("What is my balance?");
        run_until_idle(&mut session, &mut events).await;
        let response_id = session.messages()[1].id;

        session.press_message(response_id).expect("message exists");
        assert_eq!(session.speaking_message(), Some(response_id));

        session.press_message(response_id).expect("second press stops");
        assert!(!session.is_speaking());

        session.press_message(response_id).expect("speaks again");
        let event = events.recv().await.expect("playback finishes");
        assert_eq!(session.handle_event(event), SessionChange::Speech);
        assert!(!session.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_speech_reports_failure_without_messages() {
        let (mut session, mut events) =
            session_with(ScriptedGenerator::new(100, Script::Answer), SessionConfig::default());

        session.start_recording().expect("idle session can record");
        let event = events.recv().await.expect("recognition result arrives");

        assert_eq!(session.handle_event(event), SessionChange::Speech);
        assert!(!session.is_recording());
        assert!(session.messages().is_empty());
    }
}
