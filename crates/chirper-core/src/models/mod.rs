//! Data types mirroring the backend's JSON payloads.

mod chirp;
mod page;
mod user;
mod validation;

pub use chirp::{Chirp, ChirpAuthor, ChirpId, MessageBody};
pub use page::Page;
pub use user::{FollowRequest, FollowResponse, User, UserId};
pub use validation::{ValidationBody, ValidationErrors};
