//! The feed controller: owns view-state and routes user actions to the backend.

use super::actions::ChirpAction;
use super::compose::{check_message, Composer, EditSession};
use super::follows::FollowSet;
use super::state::FeedState;
use crate::api::{FeedBackend, FollowOutcome};
use crate::error::{ChirperError, Result};
use crate::models::{Chirp, ChirpId, User, UserId, ValidationErrors};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// What happened to a submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    Accepted(T),
    /// Rejected by local checks or a 422; the errors are also stored on the form.
    Invalid(ValidationErrors),
}

impl<T> SubmitOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// Point-in-time copy of everything needed to render the feed.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub user: Option<User>,
    pub chirps: Vec<Chirp>,
    pub page: u32,
    pub page_count: u32,
    pub has_more: bool,
    pub followings: FollowSet,
    pub composer: Composer,
}

impl FeedSnapshot {
    pub fn actions_for(&self, chirp: &Chirp) -> Vec<ChirpAction> {
        ChirpAction::for_chirp(chirp, self.user.as_ref().map(|u| u.id), &self.followings)
    }
}

/// Paginated feed bound to one backend.
///
/// Cheap to share behind an `Arc`: the refresh loop and user actions lock
/// only the piece of state they touch.
pub struct Feed {
    backend: Arc<dyn FeedBackend>,
    user: RwLock<Option<User>>,
    state: RwLock<FeedState>,
    followings: RwLock<FollowSet>,
    composer: RwLock<Composer>,
    loading_next: AtomicBool,
    /// Bumped after every change to the rendered state.
    revision: watch::Sender<u64>,
}

impl Feed {
    pub fn new(backend: Arc<dyn FeedBackend>) -> Self {
        Self {
            backend,
            user: RwLock::new(None),
            state: RwLock::new(FeedState::new()),
            followings: RwLock::new(FollowSet::new()),
            composer: RwLock::new(Composer::new()),
            loading_next: AtomicBool::new(false),
            revision: watch::Sender::new(0),
        }
    }

    /// Receiver that observes a new value whenever the feed changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    async fn user_id(&self) -> Option<UserId> {
        self.user.read().await.as_ref().map(|u| u.id)
    }

    /// Fetch the authenticated user from the backend.
    pub async fn load_user(&self) -> Result<User> {
        let user = self.backend.current_user().await?;
        info!("Signed in as {} (id {})", user.name, user.id);
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Resolve the user if needed, then load followings and the first page.
    pub async fn start(&self) -> Result<()> {
        if self.user_id().await.is_none() {
            self.load_user().await?;
        }
        self.load_followings().await?;
        self.refresh().await
    }

    /// Replace the followed-id set with the server's. No-op without a user.
    pub async fn load_followings(&self) -> Result<()> {
        if self.user_id().await.is_none() {
            debug!("No user yet, skipping followings");
            return Ok(());
        }
        let ids = self.backend.my_followings().await?;
        debug!("Following {} users", ids.len());
        self.followings.write().await.replace(ids);
        self.bump();
        Ok(())
    }

    /// Re-fetch the first page and replace the list with it.
    pub async fn refresh(&self) -> Result<()> {
        let listing = self.backend.list_chirps(None).await?;
        debug!(
            "Refreshed feed: {} chirps, {} pages",
            listing.data.len(),
            listing.last_page
        );
        self.state.write().await.replace_with_first_page(listing);
        self.bump();
        Ok(())
    }

    /// Load the page after the cursor and merge it in.
    ///
    /// Returns `false` when there was nothing to load or a load is already running.
    pub async fn load_next_page(&self) -> Result<bool> {
        let next = {
            let state = self.state.read().await;
            if !state.has_more() {
                return Ok(false);
            }
            state.next_page()
        };

        let Some(_loading) = InFlight::acquire(&self.loading_next) else {
            debug!("Page load already in flight");
            return Ok(false);
        };

        let listing = self.backend.list_chirps(Some(next)).await?;
        debug!("Loaded page {} with {} chirps", next, listing.data.len());
        self.state.write().await.merge_next_page(listing);
        self.bump();
        Ok(true)
    }

    /// Publish a chirp through the composer. On success the draft is cleared
    /// and the first page reloaded so the new chirp shows up.
    pub async fn submit_chirp(&self, message: &str) -> Result<SubmitOutcome<()>> {
        {
            let mut composer = self.composer.write().await;
            composer.set_draft(message);
            if let Err(errors) = check_message(message) {
                composer.errors = errors.clone();
                drop(composer);
                self.bump();
                return Ok(SubmitOutcome::Invalid(errors));
            }
            composer.begin_submit();
        }
        self.bump();

        match self.backend.create_chirp(message).await {
            Ok(()) => {
                self.composer.write().await.finish_success();
                self.bump();
                if let Err(e) = self.refresh().await {
                    warn!("Chirp posted but refresh failed: {}", e);
                }
                Ok(SubmitOutcome::Accepted(()))
            }
            Err(ChirperError::Validation { errors }) => {
                self.composer
                    .write()
                    .await
                    .finish_validation(errors.clone());
                self.bump();
                Ok(SubmitOutcome::Invalid(errors))
            }
            Err(e) => {
                self.composer.write().await.finish();
                self.bump();
                Err(e)
            }
        }
    }

    /// Edit a chirp and fold the server's copy into the list.
    pub async fn update_chirp(&self, id: ChirpId, message: &str) -> Result<SubmitOutcome<Chirp>> {
        if let Err(errors) = check_message(message) {
            return Ok(SubmitOutcome::Invalid(errors));
        }
        match self.backend.update_chirp(id, message).await {
            Ok(chirp) => {
                if self.state.write().await.apply_update(&chirp) {
                    self.bump();
                } else {
                    debug!("Updated chirp {} is not on screen", id);
                }
                Ok(SubmitOutcome::Accepted(chirp))
            }
            Err(ChirperError::Validation { errors }) => Ok(SubmitOutcome::Invalid(errors)),
            Err(e) => Err(e),
        }
    }

    /// Run an edit session's draft through [`Feed::update_chirp`], keeping the
    /// session's errors and processing flag in step. Returns `true` once saved.
    pub async fn save_edit(&self, session: &mut EditSession) -> Result<bool> {
        session.begin_submit();
        let draft = session.draft.clone();
        match self.update_chirp(session.chirp_id(), &draft).await {
            Ok(SubmitOutcome::Accepted(chirp)) => {
                session.finish_saved(&chirp);
                Ok(true)
            }
            Ok(SubmitOutcome::Invalid(errors)) => {
                session.finish_validation(errors);
                Ok(false)
            }
            Err(e) => {
                session.finish();
                Err(e)
            }
        }
    }

    pub async fn delete_chirp(&self, id: ChirpId) -> Result<()> {
        self.backend.delete_chirp(id).await?;
        if self.state.write().await.remove(id) {
            self.bump();
        }
        Ok(())
    }

    /// Follow an author; the local set only changes if the backend says "success".
    pub async fn follow(&self, user_id: UserId) -> Result<FollowOutcome> {
        let outcome = self.backend.follow(user_id).await?;
        match &outcome {
            FollowOutcome::Followed => {
                self.followings.write().await.add(user_id);
                self.bump();
            }
            FollowOutcome::Declined { status, message } => {
                warn!(
                    "Follow of user {} declined: {} {}",
                    user_id,
                    status,
                    message.as_deref().unwrap_or("")
                );
            }
        }
        Ok(outcome)
    }

    pub async fn unfollow(&self, user_id: UserId) -> Result<()> {
        self.backend.unfollow(user_id).await?;
        if self.followings.write().await.remove(user_id) {
            self.bump();
        }
        Ok(())
    }

    pub async fn is_following(&self, user_id: UserId) -> bool {
        self.followings.read().await.contains(user_id)
    }

    pub async fn chirps(&self) -> Vec<Chirp> {
        self.state.read().await.chirps().to_vec()
    }

    pub async fn composer(&self) -> Composer {
        self.composer.read().await.clone()
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let user = self.user.read().await.clone();
        let state = self.state.read().await.clone();
        let followings = self.followings.read().await.clone();
        let composer = self.composer.read().await.clone();
        FeedSnapshot {
            user,
            has_more: state.has_more(),
            page: state.page(),
            page_count: state.page_count(),
            chirps: state.chirps().to_vec(),
            followings,
            composer,
        }
    }
}

/// Holds the in-flight flag for one page load and releases it on drop, so an
/// abandoned load does not block the next one.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::SeqCst)).then(|| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::compose::MESSAGE_FIELD;
    use crate::feed::fake::{FakeBackend, ME};
    use std::time::Duration;

    fn feed_with(count: u64, per_page: usize) -> (Arc<FakeBackend>, Feed) {
        let backend = Arc::new(FakeBackend::with_chirps(count, per_page));
        let feed = Feed::new(backend.clone());
        (backend, feed)
    }

    fn ids(chirps: &[Chirp]) -> Vec<ChirpId> {
        chirps.iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_start_loads_user_followings_and_first_page() {
        let (backend, feed) = feed_with(5, 2);
        backend.data.lock().unwrap().followings.insert(2);

        feed.start().await.unwrap();

        let snap = feed.snapshot().await;
        assert_eq!(snap.user.as_ref().map(|u| u.id), Some(ME));
        assert_eq!(ids(&snap.chirps), vec![5, 4]);
        assert_eq!(snap.page_count, 3);
        assert!(snap.has_more);
        assert!(snap.followings.contains(2));
        assert_eq!(backend.list_calls(), vec![None]);
    }

    #[tokio::test]
    async fn test_followings_skipped_without_user() {
        let (backend, feed) = feed_with(1, 5);
        backend.data.lock().unwrap().followings.insert(2);
        feed.load_followings().await.unwrap();
        assert!(!feed.is_following(2).await);
    }

    #[tokio::test]
    async fn test_infinite_scroll_until_exhausted() {
        let (backend, feed) = feed_with(5, 2);
        feed.start().await.unwrap();

        assert!(feed.load_next_page().await.unwrap());
        assert!(feed.load_next_page().await.unwrap());
        assert!(!feed.load_next_page().await.unwrap());

        assert_eq!(ids(&feed.chirps().await), vec![5, 4, 3, 2, 1]);
        assert_eq!(backend.list_calls(), vec![None, Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_next_page_dedupes_shifted_chirps() {
        let (backend, feed) = feed_with(4, 2);
        feed.start().await.unwrap();

        // Someone else posts, shifting chirp 4 onto page 2.
        {
            let mut data = backend.data.lock().unwrap();
            let fresh = crate::feed::fake::chirp(10, 2, "late");
            data.chirps.insert(0, fresh);
        }
        feed.load_next_page().await.unwrap();

        // Page 2 is now [3, 2]; the 3 already on screen moves to the end.
        assert_eq!(ids(&feed.chirps().await), vec![4, 3, 2]);
        assert_eq!(feed.snapshot().await.page_count, 3);
    }

    #[tokio::test]
    async fn test_submit_posts_and_refreshes() {
        let (backend, feed) = feed_with(2, 10);
        feed.start().await.unwrap();

        let outcome = feed.submit_chirp("brand new").await.unwrap();
        assert!(outcome.is_accepted());

        let chirps = feed.chirps().await;
        assert_eq!(chirps[0].message, "brand new");
        let composer = feed.composer().await;
        assert!(composer.draft.is_empty());
        assert!(!composer.processing);
        assert_eq!(backend.list_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_blank_is_rejected_locally() {
        let (backend, feed) = feed_with(1, 10);
        let outcome = feed.submit_chirp("   ").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert!(!feed.composer().await.errors.for_field(MESSAGE_FIELD).is_empty());
        assert_eq!(backend.data.lock().unwrap().next_id, 2);
    }

    #[tokio::test]
    async fn test_submit_validation_error_keeps_draft() {
        let (backend, feed) = feed_with(1, 10);
        backend.data.lock().unwrap().reject_create = Some(ValidationErrors::single(
            MESSAGE_FIELD,
            "The message may not be greater than 255 characters.",
        ));

        let outcome = feed.submit_chirp("too long").await.unwrap();
        match outcome {
            SubmitOutcome::Invalid(errors) => assert_eq!(errors.for_field(MESSAGE_FIELD).len(), 1),
            other => panic!("expected Invalid, got {:?}", other),
        }
        let composer = feed.composer().await;
        assert_eq!(composer.draft, "too long");
        assert!(!composer.processing);
        assert!(!composer.errors.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates() {
        let (backend, feed) = feed_with(1, 10);
        backend.data.lock().unwrap().fail_lists = true;
        assert!(feed.refresh().await.is_err());
    }

    #[tokio::test]
    async fn test_edit_session_saves_and_marks_edited() {
        let (_backend, feed) = feed_with(3, 10);
        feed.start().await.unwrap();

        let target = feed.chirps().await.into_iter().find(|c| c.id == 2).unwrap();
        let mut session = EditSession::open(&target);
        session.draft = "reworded".into();

        assert!(feed.save_edit(&mut session).await.unwrap());
        assert!(!session.processing);
        assert!(!session.is_dirty());

        let stored = feed.chirps().await.into_iter().find(|c| c.id == 2).unwrap();
        assert_eq!(stored.message, "reworded");
        assert!(stored.is_edited());
    }

    #[tokio::test]
    async fn test_edit_blank_keeps_session_open() {
        let (_backend, feed) = feed_with(1, 10);
        feed.start().await.unwrap();
        let target = feed.chirps().await.remove(0);
        let mut session = EditSession::open(&target);
        session.draft.clear();

        assert!(!feed.save_edit(&mut session).await.unwrap());
        assert!(!session.errors.is_empty());
        assert_eq!(feed.chirps().await[0].message, target.message);
    }

    #[tokio::test]
    async fn test_update_missing_chirp_errors() {
        let (_backend, feed) = feed_with(1, 10);
        let err = feed.update_chirp(99, "x").await.unwrap_err();
        assert!(matches!(err, ChirperError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_locally() {
        let (_backend, feed) = feed_with(3, 10);
        feed.start().await.unwrap();
        feed.delete_chirp(2).await.unwrap();
        assert_eq!(ids(&feed.chirps().await), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let (_backend, feed) = feed_with(3, 10);
        feed.start().await.unwrap();

        assert_eq!(feed.follow(2).await.unwrap(), FollowOutcome::Followed);
        assert!(feed.is_following(2).await);

        let snap = feed.snapshot().await;
        let theirs = snap.chirps.iter().find(|c| c.author_id() == 2).unwrap();
        assert_eq!(snap.actions_for(theirs), vec![ChirpAction::Unfollow]);
        let mine = snap.chirps.iter().find(|c| c.author_id() == ME).unwrap();
        assert_eq!(
            snap.actions_for(mine),
            vec![ChirpAction::Edit, ChirpAction::Delete]
        );

        feed.unfollow(2).await.unwrap();
        assert!(!feed.is_following(2).await);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (_backend, feed) = feed_with(3, 10);
        let mut rx = feed.subscribe();
        assert!(!rx.has_changed().unwrap());

        feed.refresh().await.unwrap();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        feed.delete_chirp(99).await.unwrap();
        assert!(!rx.has_changed().unwrap());
        feed.delete_chirp(3).await.unwrap();
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_declined_follow_leaves_set_alone() {
        let (backend, feed) = feed_with(1, 10);
        backend.data.lock().unwrap().follow_status = Some("error".into());
        let outcome = feed.follow(2).await.unwrap();
        assert!(matches!(outcome, FollowOutcome::Declined { .. }));
        assert!(!feed.is_following(2).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_page_load_does_not_block_the_next() {
        let (backend, feed) = feed_with(4, 2);
        feed.start().await.unwrap();
        backend.data.lock().unwrap().slow_page = Some(Duration::from_secs(60));

        let abandoned = tokio::time::timeout(Duration::from_secs(1), feed.load_next_page()).await;
        assert!(abandoned.is_err());
        assert!(feed.snapshot().await.has_more);

        assert!(feed.load_next_page().await.unwrap());
        assert_eq!(ids(&feed.chirps().await), vec![4, 3, 2, 1]);
        assert_eq!(backend.list_calls(), vec![None, Some(2), Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_page_loads_fetch_once() {
        let (backend, feed) = feed_with(6, 2);
        feed.start().await.unwrap();
        backend.data.lock().unwrap().slow_page = Some(Duration::from_secs(5));

        let (first, second, third) = tokio::join!(
            feed.load_next_page(),
            feed.load_next_page(),
            feed.load_next_page()
        );
        assert!(first.unwrap());
        assert!(!second.unwrap());
        assert!(!third.unwrap());
        assert_eq!(backend.list_calls(), vec![None, Some(2)]);

        // The guard is released once the first load finishes.
        assert!(feed.load_next_page().await.unwrap());
        assert_eq!(backend.list_calls(), vec![None, Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_composer_changes_notify_subscribers() {
        let (backend, feed) = feed_with(1, 10);
        let mut rx = feed.subscribe();

        feed.submit_chirp("").await.unwrap();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        backend.data.lock().unwrap().reject_create =
            Some(ValidationErrors::single(MESSAGE_FIELD, "Too long."));
        feed.submit_chirp("long").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(feed.snapshot().await.composer.errors.for_field(MESSAGE_FIELD), ["Too long."]);
    }
}
