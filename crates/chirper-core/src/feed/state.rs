//! List state for the feed: the chirps on screen and the pagination cursor.

use crate::models::{Chirp, ChirpId, Page};
use std::collections::HashSet;

/// Chirps currently shown, in server order, plus where pagination stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    chirps: Vec<Chirp>,
    /// Last page merged into `chirps`.
    page: u32,
    /// Server's `last_page`; 0 until the first load.
    page_count: u32,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            chirps: Vec::new(),
            page: 1,
            page_count: 0,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chirps(&self) -> &[Chirp] {
        &self.chirps
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn len(&self) -> usize {
        self.chirps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chirps.is_empty()
    }

    pub fn get(&self, id: ChirpId) -> Option<&Chirp> {
        self.chirps.iter().find(|c| c.id == id)
    }

    /// Page number the next "load more" should request.
    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    /// Whether the server has pages past the cursor.
    pub fn has_more(&self) -> bool {
        self.page < self.page_count
    }

    /// Replace everything with the first page (initial load and periodic refresh).
    pub fn replace_with_first_page(&mut self, listing: Page<Chirp>) {
        self.page_count = listing.last_page;
        self.page = 1;
        self.chirps = listing.data;
    }

    /// Append a later page. Chirps already on screen that reappear in the page
    /// are dropped from their old position, so the incoming copy wins.
    pub fn merge_next_page(&mut self, listing: Page<Chirp>) {
        self.page_count = listing.last_page;
        self.page = self.page.max(listing.current_page);

        let incoming: HashSet<ChirpId> = listing.data.iter().map(|c| c.id).collect();
        self.chirps.retain(|c| !incoming.contains(&c.id));
        self.chirps.extend(listing.data);
    }

    /// Apply an edit returned by the server. Only the message and update time
    /// change; position and authorship stay as they were.
    pub fn apply_update(&mut self, updated: &Chirp) -> bool {
        match self.chirps.iter_mut().find(|c| c.id == updated.id) {
            Some(chirp) => {
                chirp.message = updated.message.clone();
                chirp.updated_at = updated.updated_at;
                true
            }
            None => false,
        }
    }

    /// Drop a deleted chirp. Returns whether it was present.
    pub fn remove(&mut self, id: ChirpId) -> bool {
        let before = self.chirps.len();
        self.chirps.retain(|c| c.id != id);
        self.chirps.len() != before
    }
}
