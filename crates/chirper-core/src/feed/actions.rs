//! Which menu entries a chirp offers to the current user.

use super::follows::FollowSet;
use crate::models::{Chirp, UserId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChirpAction {
    Edit,
    Delete,
    Follow,
    Unfollow,
}

impl ChirpAction {
    pub fn label(&self) -> &'static str {
        match self {
            ChirpAction::Edit => "Edit",
            ChirpAction::Delete => "Delete",
            ChirpAction::Follow => "Follow This Account",
            ChirpAction::Unfollow => "UnFollow",
        }
    }

    /// Actions for one chirp: own chirps can be edited and deleted, anyone
    /// else's author can be followed or unfollowed.
    pub fn for_chirp(
        chirp: &Chirp,
        current_user: Option<UserId>,
        followings: &FollowSet,
    ) -> Vec<ChirpAction> {
        match current_user {
            Some(me) if chirp.is_authored_by(me) => vec![ChirpAction::Edit, ChirpAction::Delete],
            _ if followings.contains(chirp.author_id()) => vec![ChirpAction::Unfollow],
            _ => vec![ChirpAction::Follow],
        }
    }
}

impl fmt::Display for ChirpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
