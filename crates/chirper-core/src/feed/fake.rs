//! In-memory backend used by the controller and poller tests.

use crate::api::{FeedBackend, FollowOutcome};
use crate::error::{ChirperError, Result};
use crate::models::{Chirp, ChirpAuthor, ChirpId, Page, User, UserId, ValidationErrors};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::Mutex;

pub const ME: UserId = 1;

#[derive(Default)]
pub struct FakeData {
    /// Newest first, like the real feed.
    pub chirps: Vec<Chirp>,
    pub per_page: usize,
    pub followings: BTreeSet<UserId>,
    pub next_id: ChirpId,
    pub list_calls: Vec<Option<u32>>,
    pub reject_create: Option<ValidationErrors>,
    pub follow_status: Option<String>,
    pub fail_lists: bool,
    /// Delay applied once to the next paged (`Some(n)`) list call.
    pub slow_page: Option<std::time::Duration>,
}

pub struct FakeBackend {
    pub data: Mutex<FakeData>,
}

pub fn chirp(id: ChirpId, author: UserId, message: &str) -> Chirp {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id as i64);
    Chirp {
        id,
        user_id: Some(author),
        message: message.to_string(),
        created_at: at,
        updated_at: at,
        user: ChirpAuthor {
            id: author,
            name: format!("user{}", author),
        },
    }
}

impl FakeBackend {
    /// `count` chirps (ids `count..=1`, newest first) alternating between `ME` and user 2.
    pub fn with_chirps(count: u64, per_page: usize) -> Self {
        let chirps = (1..=count)
            .rev()
            .map(|id| chirp(id, if id % 2 == 0 { ME } else { 2 }, &format!("chirp {}", id)))
            .collect();
        Self {
            data: Mutex::new(FakeData {
                chirps,
                per_page,
                next_id: count + 1,
                ..Default::default()
            }),
        }
    }

    pub fn list_calls(&self) -> Vec<Option<u32>> {
        self.data.lock().unwrap().list_calls.clone()
    }
}

#[async_trait]
impl FeedBackend for FakeBackend {
    async fn current_user(&self) -> Result<User> {
        Ok(User {
            id: ME,
            name: "me".into(),
            email: None,
        })
    }

    async fn list_chirps(&self, page: Option<u32>) -> Result<Page<Chirp>> {
        let delay = {
            let mut data = self.data.lock().unwrap();
            data.list_calls.push(page);
            match page {
                Some(_) => data.slow_page.take(),
                None => None,
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let data = self.data.lock().unwrap();
        if data.fail_lists {
            return Err(ChirperError::network("backend down"));
        }
        let per_page = data.per_page.max(1);
        let current = page.unwrap_or(1).max(1);
        let last = data.chirps.len().div_ceil(per_page).max(1) as u32;
        let start = (current as usize - 1) * per_page;
        let slice = data.chirps.iter().skip(start).take(per_page).cloned().collect();
        Ok(Page {
            data: slice,
            current_page: current,
            last_page: last,
            per_page: Some(per_page as u32),
            total: Some(data.chirps.len() as u64),
            next_page_url: None,
        })
    }

    async fn create_chirp(&self, message: &str) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        if let Some(errors) = data.reject_create.clone() {
            return Err(ChirperError::Validation { errors });
        }
        let id = data.next_id;
        data.next_id += 1;
        data.chirps.insert(0, chirp(id, ME, message));
        Ok(())
    }

    async fn update_chirp(&self, id: ChirpId, message: &str) -> Result<Chirp> {
        let mut data = self.data.lock().unwrap();
        let chirp = data
            .chirps
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChirperError::NotFound {
                path: format!("/chirps/{}", id),
            })?;
        chirp.message = message.to_string();
        chirp.updated_at = chirp.created_at + Duration::hours(1);
        Ok(chirp.clone())
    }

    async fn delete_chirp(&self, id: ChirpId) -> Result<()> {
        self.data.lock().unwrap().chirps.retain(|c| c.id != id);
        Ok(())
    }

    async fn my_followings(&self) -> Result<Vec<UserId>> {
        Ok(self.data.lock().unwrap().followings.iter().copied().collect())
    }

    async fn follow(&self, user_id: UserId) -> Result<FollowOutcome> {
        let mut data = self.data.lock().unwrap();
        match data.follow_status.clone() {
            Some(status) => Ok(FollowOutcome::Declined {
                status,
                message: None,
            }),
            None => {
                data.followings.insert(user_id);
                Ok(FollowOutcome::Followed)
            }
        }
    }

    async fn unfollow(&self, user_id: UserId) -> Result<()> {
        self.data.lock().unwrap().followings.remove(&user_id);
        Ok(())
    }
}
