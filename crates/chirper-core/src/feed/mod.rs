//! Feed view-state and the controller that keeps it in sync with the backend.
//!
//! The pure pieces ([`FeedState`], [`FollowSet`], [`Composer`],
//! [`EditSession`], [`ChirpAction`]) hold no I/O and can be driven directly.
//! [`Feed`] wires them to a [`FeedBackend`](crate::api::FeedBackend), and
//! [`spawn_refresh_loop`] keeps the first page fresh in the background.

mod actions;
mod compose;
mod controller;
mod follows;
mod poller;
mod state;

#[cfg(test)]
mod fake;

pub use actions::ChirpAction;
pub use compose::{check_message, Composer, EditSession, MESSAGE_FIELD};
pub use controller::{Feed, FeedSnapshot, SubmitOutcome};
pub use follows::FollowSet;
pub use poller::spawn_refresh_loop;
pub use state::FeedState;
