//! Subcommand handlers.

use crate::render;
use crate::Command;
use anyhow::{bail, Context as _, Result};
use chirper_core::{
    spawn_refresh_loop, CancellationToken, ChirperClient, ClientSettings, Feed, FeedBackend,
    FollowOutcome, SubmitOutcome,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared handles for one CLI invocation.
pub struct Context {
    backend: Arc<ChirperClient>,
    json: bool,
}

impl Context {
    pub fn connect(settings: &ClientSettings, json: bool) -> Result<Self> {
        let backend = ChirperClient::new(settings).context("failed to build API client")?;
        Ok(Self {
            backend: Arc::new(backend),
            json,
        })
    }

    fn feed(&self) -> Feed {
        Feed::new(self.backend.clone())
    }

    fn print_json(&self, value: &serde_json::Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Feed { pages } => show_feed(ctx, pages).await,
        Command::Post { message } => post(ctx, &message).await,
        Command::Edit { id, message } => edit(ctx, id, &message).await,
        Command::Delete { id } => {
            ctx.backend.delete_chirp(id).await?;
            if ctx.json {
                ctx.print_json(&json!({ "deleted": id }))
            } else {
                println!("Deleted chirp #{}", id);
                Ok(())
            }
        }
        Command::Follow { user_id } => follow(ctx, user_id).await,
        Command::Unfollow { user_id } => {
            ctx.backend.unfollow(user_id).await?;
            if ctx.json {
                ctx.print_json(&json!({ "unfollowed": user_id }))
            } else {
                println!("Unfollowed user {}", user_id);
                Ok(())
            }
        }
        Command::Followings => {
            let ids = ctx.backend.my_followings().await?;
            if ctx.json {
                ctx.print_json(&json!(ids))
            } else {
                for id in ids {
                    println!("{}", id);
                }
                Ok(())
            }
        }
        Command::Watch { interval_secs } => watch(ctx, Duration::from_secs(interval_secs)).await,
    }
}

async fn show_feed(ctx: &Context, pages: u32) -> Result<()> {
    let feed = ctx.feed();
    feed.start().await?;
    for _ in 1..pages {
        if !feed.load_next_page().await? {
            break;
        }
    }
    print_feed(ctx, &feed).await
}

async fn print_feed(ctx: &Context, feed: &Feed) -> Result<()> {
    let snapshot = feed.snapshot().await;
    if ctx.json {
        ctx.print_json(&json!({
            "page": snapshot.page,
            "last_page": snapshot.page_count,
            "has_more": snapshot.has_more,
            "followings": snapshot.followings.iter().collect::<Vec<_>>(),
            "chirps": snapshot.chirps,
        }))
    } else {
        print!("{}", render::feed(&snapshot, Utc::now()));
        Ok(())
    }
}

async fn post(ctx: &Context, message: &str) -> Result<()> {
    let feed = ctx.feed();
    match feed.submit_chirp(message).await? {
        SubmitOutcome::Accepted(()) => {
            let newest = feed.chirps().await.into_iter().next();
            if ctx.json {
                ctx.print_json(&json!({ "posted": true, "latest": newest }))
            } else {
                println!("Chirp posted.");
                Ok(())
            }
        }
        SubmitOutcome::Invalid(errors) => {
            bail!("chirp rejected:\n{}", render::errors(&errors))
        }
    }
}

async fn edit(ctx: &Context, id: u64, message: &str) -> Result<()> {
    let feed = ctx.feed();
    match feed.update_chirp(id, message).await? {
        SubmitOutcome::Accepted(chirp) => {
            if ctx.json {
                ctx.print_json(&serde_json::to_value(&chirp)?)
            } else {
                println!("{}", render::chirp(&chirp, &[], Utc::now()));
                Ok(())
            }
        }
        SubmitOutcome::Invalid(errors) => bail!("edit rejected:\n{}", render::errors(&errors)),
    }
}

async fn follow(ctx: &Context, user_id: u64) -> Result<()> {
    match ctx.backend.follow(user_id).await? {
        FollowOutcome::Followed => {
            if ctx.json {
                ctx.print_json(&json!({ "followed": user_id }))
            } else {
                println!("Now following user {}", user_id);
                Ok(())
            }
        }
        FollowOutcome::Declined { status, message } => bail!(
            "follow declined ({}): {}",
            status,
            message.unwrap_or_default()
        ),
    }
}

async fn watch(ctx: &Context, period: Duration) -> Result<()> {
    let feed = Arc::new(ctx.feed());
    let mut changes = feed.subscribe();
    feed.start().await?;
    changes.borrow_and_update();
    print_feed(ctx, &feed).await?;

    let cancel = CancellationToken::new();
    let poller = spawn_refresh_loop(feed.clone(), period, cancel.clone());
    info!("Refreshing every {:?}, Ctrl-C to stop", period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                changes.borrow_and_update();
                print_feed(ctx, &feed).await?;
            }
        }
    }

    cancel.cancel();
    poller.await?;
    Ok(())
}
