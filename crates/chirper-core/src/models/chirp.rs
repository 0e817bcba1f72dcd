use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChirpId = u64;

/// The author block embedded in every chirp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChirpAuthor {
    pub id: UserId,
    pub name: String,
}

/// A single feed post as returned by `GET /chirps` and `PATCH /chirps/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: ChirpId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: ChirpAuthor,
}

impl Chirp {
    /// A chirp counts as edited once its update timestamp moves off the creation time.
    pub fn is_edited(&self) -> bool {
        self.created_at != self.updated_at
    }

    pub fn author_id(&self) -> UserId {
        self.user.id
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.user.id == user_id
    }
}

/// Request body for creating or editing a chirp.
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody<'a> {
    pub message: &'a str,
}
