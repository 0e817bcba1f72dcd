//! Backend access.
//!
//! [`FeedBackend`] is the seam between the feed controller and the network:
//! [`ChirperClient`] implements it over HTTP, tests implement it in memory.

mod client;

pub use client::ChirperClient;

use crate::error::Result;
use crate::models::{Chirp, ChirpId, FollowResponse, Page, User, UserId};
use async_trait::async_trait;

/// Result of asking the backend to follow someone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The backend confirmed the follow.
    Followed,
    /// The request went through but the backend declined it.
    Declined {
        status: String,
        message: Option<String>,
    },
}

impl From<FollowResponse> for FollowOutcome {
    fn from(response: FollowResponse) -> Self {
        if response.is_success() {
            FollowOutcome::Followed
        } else {
            FollowOutcome::Declined {
                status: response.status,
                message: response.message,
            }
        }
    }
}

/// Every call the feed makes against the backend.
#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// The authenticated user.
    async fn current_user(&self) -> Result<User>;

    /// One page of the feed; `None` asks for the first page without a query.
    async fn list_chirps(&self, page: Option<u32>) -> Result<Page<Chirp>>;

    /// Publish a new chirp. The backend's reply body is not used.
    async fn create_chirp(&self, message: &str) -> Result<()>;

    /// Edit a chirp's message and return the stored version.
    async fn update_chirp(&self, id: ChirpId, message: &str) -> Result<Chirp>;

    async fn delete_chirp(&self, id: ChirpId) -> Result<()>;

    /// Ids of every user the current user follows.
    async fn my_followings(&self) -> Result<Vec<UserId>>;

    async fn follow(&self, user_id: UserId) -> Result<FollowOutcome>;

    async fn unfollow(&self, user_id: UserId) -> Result<()>;
}
