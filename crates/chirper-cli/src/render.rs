//! Text rendering of feed state.

use chirper_core::display::{edited_marker, relative_time};
use chirper_core::{Chirp, ChirpAction, FeedSnapshot, ValidationErrors};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// One chirp: header line with author, age and actions, then the message.
pub fn chirp(chirp: &Chirp, actions: &[ChirpAction], now: DateTime<Utc>) -> String {
    let mut out = format!(
        "#{} {} · {}{}",
        chirp.id,
        chirp.user.name,
        relative_time(chirp.created_at, now),
        edited_marker(chirp)
    );
    if !actions.is_empty() {
        let labels: Vec<&str> = actions.iter().map(ChirpAction::label).collect();
        let _ = write!(out, "  [{}]", labels.join(" | "));
    }
    for line in chirp.message.lines() {
        let _ = write!(out, "\n    {}", line);
    }
    out
}

pub fn feed(snapshot: &FeedSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    if let Some(user) = &snapshot.user {
        let _ = writeln!(
            out,
            "Signed in as {} · following {}",
            user.name,
            snapshot.followings.len()
        );
    }
    if snapshot.chirps.is_empty() {
        out.push_str("No chirps yet.\n");
    }
    for item in &snapshot.chirps {
        let _ = writeln!(out, "{}\n", chirp(item, &snapshot.actions_for(item), now));
    }
    if snapshot.has_more {
        let _ = writeln!(
            out,
            "Load More... (page {} of {})",
            snapshot.page, snapshot.page_count
        );
    }
    out
}

/// Field errors, one message per line.
pub fn errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{}: {}", field, m)))
        .collect::<Vec<_>>()
        .join("\n")
}
