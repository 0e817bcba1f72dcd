//! Form state for writing a new chirp and editing an existing one.

use crate::config::FeedConfig;
use crate::models::{Chirp, ChirpId, ValidationErrors};

/// Field name the backend reports message errors under.
pub const MESSAGE_FIELD: &str = "message";

/// Reject blank messages before they reach the backend.
pub fn check_message(message: &str) -> Result<(), ValidationErrors> {
    if message.trim().is_empty() {
        Err(ValidationErrors::single(
            MESSAGE_FIELD,
            FeedConfig::REQUIRED_MESSAGE,
        ))
    } else {
        Ok(())
    }
}

/// The "new chirp" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    pub draft: String,
    pub errors: ValidationErrors,
    pub processing: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(&self) -> &'static str {
        FeedConfig::COMPOSER_PLACEHOLDER
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn begin_submit(&mut self) {
        self.errors.clear();
        self.processing = true;
    }

    pub fn finish_success(&mut self) {
        self.draft.clear();
        self.processing = false;
    }

    pub fn finish_validation(&mut self, errors: ValidationErrors) {
        self.errors = errors;
        self.processing = false;
    }

    pub fn finish(&mut self) {
        self.processing = false;
    }
}

/// Inline editor opened on one chirp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    chirp_id: ChirpId,
    original: String,
    pub draft: String,
    pub errors: ValidationErrors,
    pub processing: bool,
}

impl EditSession {
    pub fn open(chirp: &Chirp) -> Self {
        Self {
            chirp_id: chirp.id,
            original: chirp.message.clone(),
            draft: chirp.message.clone(),
            errors: ValidationErrors::default(),
            processing: false,
        }
    }

    pub fn chirp_id(&self) -> ChirpId {
        self.chirp_id
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Throw away the edit: draft back to the stored message, no errors.
    pub fn cancel(&mut self) {
        self.draft = self.original.clone();
        self.errors.clear();
        self.processing = false;
    }

    pub fn begin_submit(&mut self) {
        self.errors.clear();
        self.processing = true;
    }

    /// The server accepted the edit; it becomes the new baseline.
    pub fn finish_saved(&mut self, saved: &Chirp) {
        self.original = saved.message.clone();
        self.draft = saved.message.clone();
        self.errors.clear();
        self.processing = false;
    }

    pub fn finish_validation(&mut self, errors: ValidationErrors) {
        self.errors = errors;
        self.processing = false;
    }

    pub fn finish(&mut self) {
        self.processing = false;
    }
}
