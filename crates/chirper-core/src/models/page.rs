use serde::{Deserialize, Serialize};

/// Paginated listing envelope.
///
/// Only the fields the feed relies on are modelled; the backend sends more
/// (`links`, `path`, `from`, `to`, ...) and those are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next_page_url: Option<String>,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paginator_envelope() {
        let json = r#"{
            "current_page": 2,
            "data": [1, 2, 3],
            "first_page_url": "http://x/api/chirps?page=1",
            "from": 4,
            "last_page": 5,
            "links": [],
            "next_page_url": "http://x/api/chirps?page=3",
            "path": "http://x/api/chirps",
            "per_page": 3,
            "prev_page_url": null,
            "to": 6,
            "total": 14
        }"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.last_page, 5);
        assert_eq!(page.data, vec![1, 2, 3]);
        assert_eq!(page.total, Some(14));
        assert!(page.has_next());
    }

    #[test]
    fn test_missing_fields_default_to_single_page() {
        let page: Page<String> = serde_json::from_str(r#"{"data": ["a"], "last_page": 1}"#).unwrap();
        assert_eq!(page.current_page, 1);
        assert!(page.per_page.is_none());
        assert!(!page.has_next());
    }
}
