use std::sync::Arc;

use chatbot_llm::ResponseGenerator;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::chat::{ChatSession, SessionChange, SessionEvent, SpeechService};
use crate::settings::ChatSettings;

/// Scroll offset at which the toggle button starts moving.
pub const FAB_TRACK_START: f32 = 150.0;
/// Scroll offset at which the toggle button reaches full displacement.
pub const FAB_TRACK_END: f32 = 350.0;
/// Horizontal displacement of the toggle button once fully tucked away.
pub const FAB_MAX_DISPLACEMENT: f32 = 90.0;
/// Compile-time validation of the toggle track defaults.
const _: () = {
    assert!(FAB_TRACK_START >= 0.0);
    assert!(FAB_TRACK_START < FAB_TRACK_END);
    assert!(FAB_MAX_DISPLACEMENT > 0.0);
};

/// Scroll-to-displacement mapping for the floating toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FabTrack {
    #[serde(default = "default_track_start")]
    pub start: f32,
    #[serde(default = "default_track_end")]
    pub end: f32,
    #[serde(default = "default_max_displacement")]
    pub max_displacement: f32,
}

impl Default for FabTrack {
    fn default() -> Self {
        Self {
            start: FAB_TRACK_START,
            end: FAB_TRACK_END,
            max_displacement: FAB_MAX_DISPLACEMENT,
        }
    }
}

impl FabTrack {
    /// Falls back to the defaults when the configured track is unusable.
    pub fn normalized(self) -> Self {
        let finite =
            self.start.is_finite() && self.end.is_finite() && self.max_displacement.is_finite();
        if finite && self.start < self.end {
            self
        } else {
            Self::default()
        }
    }
}

/// Computes how far the toggle button slides out of view for a scroll offset.
/// The result is clamped to `[0, track.max_displacement]`.
///
/// # Arguments
/// * `scroll_y` - Vertical scroll offset of the host page
/// * `track` - Offsets where the slide starts and ends
///
/// # Returns
/// `0` up to `track.start`, the full displacement from `track.end`, linear in between.
pub fn fab_displacement(scroll_y: f32, track: &FabTrack) -> f32 {
    let span = track.end - track.start;
    if span <= 0.0 || scroll_y.is_nan() {
        return 0.0;
    }

    let progress = ((scroll_y - track.start) / span).clamp(0.0, 1.0);
    progress * track.max_displacement
}

/// Host page around the chat overlay.
///
/// Owns the session and its event receiver. Hiding the overlay resets the
/// session, so anything still in flight is discarded.
pub struct HostShell {
    visible: bool,
    scroll_offset: f32,
    fab_track: FabTrack,
    session: ChatSession,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl HostShell {
    pub fn new(
        session: ChatSession,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        fab_track: FabTrack,
        open_on_launch: bool,
    ) -> Self {
        Self {
            visible: open_on_launch,
            scroll_offset: 0.0,
            fab_track: fab_track.normalized(),
            session,
            events,
        }
    }

    pub fn from_settings(
        settings: &ChatSettings,
        generator: Arc<dyn ResponseGenerator>,
        speech: Arc<dyn SpeechService>,
    ) -> Self {
        let (session, events) = ChatSession::new(settings.session_config(), generator);
        Self::new(
            session.with_speech(speech),
            events,
            settings.host.fab_track,
            settings.host.open_on_launch,
        )
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        if self.visible {
            return;
        }
        self.visible = true;
        tracing::info!(session_id = %self.session.session_id(), "chat overlay opened");
    }

    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.session.reset();
        tracing::info!("chat overlay closed");
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
        self.visible
    }

    pub fn set_scroll_offset(&mut self, scroll_y: f32) {
        self.scroll_offset = scroll_y;
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn toggle_displacement(&self) -> f32 {
        fab_displacement(self.scroll_offset, &self.fab_track)
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Waits for the next background event. The session keeps a sender alive,
    /// so this only yields `None` if the session was torn down.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Routes an event to the session. Events from a session closed by
    /// [`HostShell::hide`] carry a stale session id and are dropped there.
    pub fn dispatch(&mut self, event: SessionEvent) -> SessionChange {
        self.session.handle_event(event)
    }
}

fn default_track_start() -> f32 {
    FAB_TRACK_START
}

fn default_track_end() -> f32 {
    FAB_TRACK_END
}

fn default_max_displacement() -> f32 {
    FAB_MAX_DISPLACEMENT
}
