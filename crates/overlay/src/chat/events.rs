use crate::chat::error::{ResolutionResult, SpeechResult};
use crate::chat::message::{RequestTarget, SessionId};

/// Events produced by background jobs and consumed by the owning session.
///
/// Jobs never touch session state directly; each event names the target it
/// was spawned for and is dropped unless that target is still current.
#[derive(Debug)]
pub enum SessionEvent {
    /// Periodic advance of the loading placeholder.
    LoadingTick(RequestTarget),
    /// The single outcome of one submitted prompt.
    Resolved {
        target: RequestTarget,
        outcome: ResolutionResult,
    },
    /// Speech recognition finished for one recording.
    Transcribed {
        target: RequestTarget,
        result: SpeechResult<String>,
    },
    /// Playback of a spoken message ended.
    SpeechFinished {
        target: RequestTarget,
        result: SpeechResult<()>,
    },
}

impl SessionEvent {
    pub fn target(&self) -> RequestTarget {
        match self {
            Self::LoadingTick(target) => *target,
            Self::Resolved { target, .. }
            | Self::Transcribed { target, .. }
            | Self::SpeechFinished { target, .. } => *target,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.target().session_id
    }
}

/// Why a submission was turned away without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyText,
    AlreadyLoading,
    UnknownQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(RequestTarget),
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn target(&self) -> Option<RequestTarget> {
        match self {
            Self::Accepted(target) => Some(*target),
            Self::Rejected(_) => None,
        }
    }
}

/// What the host should redraw after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// The event was stale or carried nothing new.
    None,
    /// Only the loading placeholder advanced.
    LoadingText,
    /// Messages were appended or session flags changed.
    Messages,
    /// Recording or speaking flags changed.
    Speech,
}
