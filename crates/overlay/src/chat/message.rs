use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// Macro keeps all ID wrappers structurally identical.
macro_rules! define_chat_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

define_chat_id!(
    /// Identifier for one overlay visibility period.
    ///
    /// A fresh value is minted on every reset so late events can be rejected.
    SessionId
);
define_chat_id!(
    /// Identifier for one asynchronous job started by a session.
    RequestId
);
define_chat_id!(
    /// Stable identifier for one message, never reused within a controller.
    MessageId
);

/// Routing key carried by every asynchronous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTarget {
    pub session_id: SessionId,
    pub request_id: RequestId,
}

impl RequestTarget {
    pub const fn new(session_id: SessionId, request_id: RequestId) -> Self {
        Self {
            session_id,
            request_id,
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.session_id, self.request_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    User,
    Response,
    Error,
}

/// Immutable chat log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub timestamp_ms: u64,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(id: MessageId, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp_ms: now_unix_millis(),
            kind,
        }
    }

    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, MessageKind::User, text)
    }

    pub fn response(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, MessageKind::Response, text)
    }

    /// Creates the inline failure entry for a prompt that could not be answered.
    pub fn send_failure(id: MessageId, original: &str) -> Self {
        Self::new(id, MessageKind::Error, failure_text(original))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, MessageKind::Response | MessageKind::Error)
    }
}

pub fn failure_text(original: &str) -> String {
    format!("Failed to send: \"{original}\". Please try again.")
}

pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Request lifecycle for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading(RequestTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransition {
    Start(RequestTarget),
    Settle(RequestTarget),
    Reset,
}

/// Rejection reason for illegal request transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransitionRejection {
    AlreadyLoading {
        active: RequestTarget,
        attempted: RequestTarget,
    },
    NotLoading {
        attempted: RequestTarget,
    },
    TargetMismatch {
        active: RequestTarget,
        attempted: RequestTarget,
    },
}

pub type RequestTransitionResult = Result<RequestState, RequestTransitionRejection>;

impl RequestState {
    pub fn active_target(&self) -> Option<RequestTarget> {
        match self {
            Self::Loading(target) => Some(*target),
            Self::Idle => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Returns true when an event for `target` may mutate the session.
    pub fn accepts(&self, target: RequestTarget) -> bool {
        matches!(self, Self::Loading(active) if *active == target)
    }

    /// Applies one transition.
    ///
    /// Only an idle state may start a request; settling must name the active
    /// target exactly.
    pub fn apply(&self, transition: RequestTransition) -> RequestTransitionResult {
        match transition {
            RequestTransition::Start(target) => match self {
                Self::Idle => Ok(Self::Loading(target)),
                Self::Loading(active) => Err(RequestTransitionRejection::AlreadyLoading {
                    active: *active,
                    attempted: target,
                }),
            },
            RequestTransition::Settle(target) => match self {
                Self::Loading(active) if *active == target => Ok(Self::Idle),
                Self::Loading(active) => Err(RequestTransitionRejection::TargetMismatch {
                    active: *active,
                    attempted: target,
                }),
                Self::Idle => Err(RequestTransitionRejection::NotLoading { attempted: target }),
            },
            RequestTransition::Reset => Ok(Self::Idle),
        }
    }
}
