//! HTTP implementation of [`FeedBackend`].
//!
//! ## API Surface
//!
//! - `GET    /user`            - authenticated user
//! - `GET    /chirps[?page=N]` - paginated feed
//! - `POST   /chirps`          - publish
//! - `PATCH  /chirps/{id}`     - edit, returns the chirp
//! - `DELETE /chirps/{id}`     - delete
//! - `GET    /myfollowings`    - followed user ids
//! - `POST   /userfollow`      - follow
//! - `DELETE /userfollow/{id}` - unfollow

use super::{FeedBackend, FollowOutcome};
use crate::config::ClientSettings;
use crate::error::Result;
use crate::models::{
    Chirp, ChirpId, FollowRequest, FollowResponse, MessageBody, Page, User, UserId,
};
use crate::network::{retry_async, HttpClient, RateLimitState, RetryConfig};
use async_trait::async_trait;
use tracing::{debug, info};

/// Client for the Chirper REST API.
pub struct ChirperClient {
    http: HttpClient,
    retry: RetryConfig,
}

impl ChirperClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(settings)?,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy used for reads.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn rate_limit_state(&self) -> RateLimitState {
        self.http.rate_limit_state()
    }

    fn chirps_path(page: Option<u32>) -> String {
        match page {
            Some(page) => format!("chirps?page={}", page),
            None => "chirps".to_string(),
        }
    }
}

#[async_trait]
impl FeedBackend for ChirperClient {
    async fn current_user(&self) -> Result<User> {
        retry_async(&self.retry, || self.http.get_json::<User>("user")).await
    }

    async fn list_chirps(&self, page: Option<u32>) -> Result<Page<Chirp>> {
        let path = Self::chirps_path(page);
        let listing: Page<Chirp> =
            retry_async(&self.retry, || self.http.get_json::<Page<Chirp>>(&path)).await?;
        debug!(
            "Fetched {} chirps (page {}/{})",
            listing.data.len(),
            listing.current_page,
            listing.last_page
        );
        Ok(listing)
    }

    async fn create_chirp(&self, message: &str) -> Result<()> {
        self.http
            .post_discard("chirps", &MessageBody { message })
            .await?;
        info!("Chirp published");
        Ok(())
    }

    async fn update_chirp(&self, id: ChirpId, message: &str) -> Result<Chirp> {
        let chirp: Chirp = self
            .http
            .patch_json(&format!("chirps/{}", id), &MessageBody { message })
            .await?;
        info!("Chirp {} updated", id);
        Ok(chirp)
    }

    async fn delete_chirp(&self, id: ChirpId) -> Result<()> {
        self.http.delete(&format!("chirps/{}", id)).await?;
        info!("Chirp {} deleted", id);
        Ok(())
    }

    async fn my_followings(&self) -> Result<Vec<UserId>> {
        retry_async(&self.retry, || {
            self.http.get_json::<Vec<UserId>>("myfollowings")
        })
        .await
    }

    async fn follow(&self, user_id: UserId) -> Result<FollowOutcome> {
        let response: FollowResponse = self
            .http
            .post_json(
                "userfollow",
                &FollowRequest {
                    followed_id: user_id,
                },
            )
            .await?;
        let outcome = FollowOutcome::from(response);
        info!("Follow user {}: {:?}", user_id, outcome);
        Ok(outcome)
    }

    async fn unfollow(&self, user_id: UserId) -> Result<()> {
        self.http.delete(&format!("userfollow/{}", user_id)).await?;
        info!("Unfollowed user {}", user_id);
        Ok(())
    }
}
