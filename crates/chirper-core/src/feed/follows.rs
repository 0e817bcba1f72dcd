//! The set of authors the current user follows.

use crate::models::UserId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSet {
    ids: BTreeSet<UserId>,
}

impl FollowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with what the server reported.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = UserId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Returns `false` if the id was already present.
    pub fn add(&mut self, id: UserId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: UserId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<UserId> for FollowSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
