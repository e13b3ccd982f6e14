//! Session store: authenticated identity, profile and request lifecycle.
//!
//! The four operations (login, register, logout, fetch profile) are each a
//! `Requested` action that starts an API call plus a `Fulfilled`/`Rejected`
//! pair that settles it. See [`SessionReducer`] for the transitions.

mod actions;
mod environment;
mod reducer;
mod state;

pub use actions::{Operation, SessionAction};
pub use environment::SessionEnvironment;
pub use reducer::SessionReducer;
pub use state::{SessionState, USER_INFO_KEY, clear_identity, load_identity, persist_identity};
