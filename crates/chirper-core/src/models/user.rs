use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// The authenticated user, from `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for `POST /userfollow`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FollowRequest {
    pub followed_id: UserId,
}

/// Reply to `POST /userfollow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FollowResponse {
    pub const SUCCESS: &'static str = "success";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}
