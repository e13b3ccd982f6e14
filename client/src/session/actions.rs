//! Session actions.
//!
//! Each operation is a request action plus the two actions that settle it.
//! All three carry the same [`RequestId`] so a caller can wait for the
//! outcome of its own request.

use crate::types::{BasicIdentity, Credentials, NewUser, RequestId, UserId, UserProfile};

/// The four asynchronous session operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /login`
    Login,
    /// `POST /register`
    Register,
    /// `POST /logout`
    Logout,
    /// `GET /users/{id}`
    FetchProfile,
}

impl Operation {
    /// Message recorded when the failure carries none of its own
    #[must_use]
    pub const fn default_error_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::Logout => "Logout failed",
            Self::FetchProfile => "Get user profile data failed",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Logout => "logout",
            Self::FetchProfile => "fetch_profile",
        })
    }
}

/// Inputs to the session reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Start a login
    LoginRequested {
        /// Correlation id
        request_id: RequestId,
        /// Phone number and password
        credentials: Credentials,
    },
    /// Login succeeded and the identity is already persisted
    LoginFulfilled {
        /// Correlation id
        request_id: RequestId,
        /// Identity returned by the API
        identity: BasicIdentity,
    },
    /// Login failed
    LoginRejected {
        /// Correlation id
        request_id: RequestId,
        /// Message to record
        message: String,
    },

    /// Start a registration
    RegisterRequested {
        /// Correlation id
        request_id: RequestId,
        /// Registration payload
        new_user: NewUser,
    },
    /// Registration succeeded and the identity is already persisted
    RegisterFulfilled {
        /// Correlation id
        request_id: RequestId,
        /// Identity returned by the API
        identity: BasicIdentity,
    },
    /// Registration failed
    RegisterRejected {
        /// Correlation id
        request_id: RequestId,
        /// Message to record
        message: String,
    },

    /// Start a logout
    LogoutRequested {
        /// Correlation id
        request_id: RequestId,
    },
    /// Logout confirmed by the API and the persisted identity removed
    LogoutFulfilled {
        /// Correlation id
        request_id: RequestId,
    },
    /// Logout failed; the session is kept
    LogoutRejected {
        /// Correlation id
        request_id: RequestId,
        /// Message to record
        message: String,
    },

    /// Start fetching a profile
    ProfileRequested {
        /// Correlation id
        request_id: RequestId,
        /// Whose profile
        user_id: UserId,
    },
    /// Profile fetched
    ProfileFulfilled {
        /// Correlation id
        request_id: RequestId,
        /// Profile returned by the API
        profile: UserProfile,
    },
    /// Profile fetch failed
    ProfileRejected {
        /// Correlation id
        request_id: RequestId,
        /// Message to record
        message: String,
    },
}

impl SessionAction {
    /// Correlation id carried by every variant
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::LoginRequested { request_id, .. }
            | Self::LoginFulfilled { request_id, .. }
            | Self::LoginRejected { request_id, .. }
            | Self::RegisterRequested { request_id, .. }
            | Self::RegisterFulfilled { request_id, .. }
            | Self::RegisterRejected { request_id, .. }
            | Self::LogoutRequested { request_id }
            | Self::LogoutFulfilled { request_id }
            | Self::LogoutRejected { request_id, .. }
            | Self::ProfileRequested { request_id, .. }
            | Self::ProfileFulfilled { request_id, .. }
            | Self::ProfileRejected { request_id, .. } => *request_id,
        }
    }

    /// Operation this action belongs to
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::LoginRequested { .. } | Self::LoginFulfilled { .. } | Self::LoginRejected { .. } => {
                Operation::Login
            },
            Self::RegisterRequested { .. }
            | Self::RegisterFulfilled { .. }
            | Self::RegisterRejected { .. } => Operation::Register,
            Self::LogoutRequested { .. }
            | Self::LogoutFulfilled { .. }
            | Self::LogoutRejected { .. } => Operation::Logout,
            Self::ProfileRequested { .. }
            | Self::ProfileFulfilled { .. }
            | Self::ProfileRejected { .. } => Operation::FetchProfile,
        }
    }

    /// Whether this action settles a request (fulfilled or rejected)
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(
            self,
            Self::LoginRequested { .. }
                | Self::RegisterRequested { .. }
                | Self::LogoutRequested { .. }
                | Self::ProfileRequested { .. }
        )
    }

    /// Whether this action settles the request `request_id`
    #[must_use]
    pub fn settles(&self, request_id: RequestId) -> bool {
        self.is_settled() && self.request_id() == request_id
    }

    /// Failure message, for rejected actions
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::LoginRejected { message, .. }
            | Self::RegisterRejected { message, .. }
            | Self::LogoutRejected { message, .. }
            | Self::ProfileRejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_matches_only_terminal_actions_of_same_request() {
        let id = RequestId::next();
        let other = RequestId::next();

        assert!(!SessionAction::LogoutRequested { request_id: id }.settles(id));
        assert!(SessionAction::LogoutFulfilled { request_id: id }.settles(id));
        assert!(!SessionAction::LogoutFulfilled { request_id: other }.settles(id));
        assert!(
            SessionAction::ProfileRejected {
                request_id: id,
                message: "Get user profile data failed".to_string(),
            }
            .settles(id)
        );
    }

    #[test]
    fn test_operation_and_message() {
        let action = SessionAction::RegisterRejected {
            request_id: RequestId::next(),
            message: "Phone number already registered".to_string(),
        };

        assert_eq!(action.operation(), Operation::Register);
        assert_eq!(action.rejection_message(), Some("Phone number already registered"));
        assert_eq!(Operation::Register.default_error_message(), "Registration failed");
    }
}
