//! Notification store: a single transient message with a severity.
//!
//! There is no queue. Showing a message replaces whatever was displayed,
//! and hiding clears the text but leaves the kind as it was.

use auth_store_core::effect::Effect;
use auth_store_core::reducer::Reducer;
use auth_store_core::{SmallVec, smallvec};
use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded
    #[default]
    Success,
    /// Operation failed
    Error,
    /// Neutral information
    Info,
    /// Something needs attention
    Warning,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

/// State owned by the notification store
///
/// `open == false` implies `message` is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Whether a message is displayed
    pub open: bool,
    /// Displayed text
    pub message: String,
    /// Severity of the last shown message
    pub kind: NotificationKind,
}

/// Inputs to the notification reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationAction {
    /// Display `message`, replacing any current one
    Show {
        /// Text to display
        message: String,
        /// Severity
        kind: NotificationKind,
    },
    /// Close the notification
    Hide,
}

/// Notification reducer. Purely synchronous.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationReducer;

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = NotificationAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NotificationAction::Show { message, kind } => {
                tracing::debug!(%kind, "Showing notification");
                state.open = true;
                state.message = message;
                state.kind = kind;
            },
            NotificationAction::Hide => {
                state.open = false;
                state.message.clear();
            },
        }
        smallvec![Effect::None]
    }
}
