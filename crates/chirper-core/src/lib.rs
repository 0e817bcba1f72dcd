//! Chirper Core - headless client for the Chirper feed API.
//!
//! This crate owns everything a Chirper front-end needs besides drawing:
//! the REST client, the feed's view-state (pagination, edits, deletions,
//! followings), form state for composing and editing, and the periodic
//! refresh loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use chirper_core::{ChirperClient, ClientSettings, Feed};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> chirper_core::Result<()> {
//!     let settings = ClientSettings::from_env()?;
//!     let feed = Feed::new(Arc::new(ChirperClient::new(&settings)?));
//!
//!     feed.start().await?;
//!     while feed.load_next_page().await? {}
//!
//!     for chirp in feed.chirps().await {
//!         println!("{}: {}", chirp.user.name, chirp.message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cancel;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod models;
pub mod network;

pub use api::{ChirperClient, FeedBackend, FollowOutcome};
pub use cancel::{CancellationToken, CancelledError};
pub use config::{ClientSettings, FeedConfig, NetworkConfig};
pub use error::{ChirperError, Result};
pub use feed::{
    spawn_refresh_loop, ChirpAction, Composer, EditSession, Feed, FeedSnapshot, FeedState,
    FollowSet, SubmitOutcome,
};
pub use models::{Chirp, ChirpAuthor, ChirpId, Page, User, UserId, ValidationErrors};
