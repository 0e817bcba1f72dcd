use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to messages, as sent in a 422 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a single field with a single message.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Messages attached to `field`, empty when the field is fine.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// One line per field: `field: first; second`.
    pub fn summary(&self) -> String {
        self.iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body of a 422 response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: ValidationErrors,
}
