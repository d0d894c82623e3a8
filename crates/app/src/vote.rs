//! Upvote button controller.
//!
//! Drives the pure [`VoteState`] machine against the persistence client.
//! One controller exists per mounted print; it serializes toggles so at most
//! one remote mutation is outstanding for its (user, print) pair.

use std::sync::{Arc, Mutex, MutexGuard};

use showcase_backend::{BackendError, PersistenceClient};
use showcase_core::navigation::Navigation;
use showcase_core::types::PrintId;
use showcase_core::vote::{RemoteResult, UpvoteRecord, VoteCommand, VoteState, VoteView};

use crate::error::{AppError, AppResult};

/// Terminal result of a toggle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The insert went through; the count includes the new vote.
    Voted(VoteView),
    /// The delete went through.
    Unvoted(VoteView),
    /// The vote already existed server-side. The flag is set, the count is
    /// unchanged.
    AlreadyVoted(VoteView),
    /// Another toggle is still in flight; nothing was sent.
    Busy(VoteView),
    /// No signed-in user; nothing was sent.
    SignInRequired(Navigation),
}

/// Upvote state for one print, as seen by the current user.
pub struct VoteController {
    client: Arc<dyn PersistenceClient>,
    print_id: PrintId,
    state: Arc<Mutex<VoteState>>,
}

impl VoteController {
    /// Controller seeded with values the caller already holds.
    pub fn new(
        client: Arc<dyn PersistenceClient>,
        print_id: impl Into<PrintId>,
        initial_count: u64,
        initial_has_voted: bool,
    ) -> Self {
        Self {
            client,
            print_id: print_id.into(),
            state: Arc::new(Mutex::new(VoteState::new(initial_count, initial_has_voted))),
        }
    }

    /// Controller seeded from a fresh server snapshot.
    pub async fn mount(
        client: Arc<dyn PersistenceClient>,
        print_id: impl Into<PrintId>,
        user_id: Option<&str>,
    ) -> AppResult<Self> {
        let print_id = print_id.into();
        let snapshot = client.vote_snapshot(&print_id, user_id).await?;
        tracing::debug!(
            print_id = %print_id,
            upvote_count = snapshot.upvote_count,
            has_voted = snapshot.has_voted,
            "Vote controller mounted",
        );
        Ok(Self::new(
            client,
            print_id,
            snapshot.upvote_count,
            snapshot.has_voted,
        ))
    }

    pub fn print_id(&self) -> &str {
        &self.print_id
    }

    pub fn view(&self) -> VoteView {
        lock(&self.state).view()
    }

    /// Toggle the current user's vote.
    ///
    /// Without a user id the caller is sent to sign in and nothing changes.
    /// Remote failures revert the local state and are returned as errors.
    /// The remote call runs on its own task, so the state settles even if
    /// the returned future is dropped.
    pub async fn toggle_vote(&self, user_id: Option<&str>) -> AppResult<VoteOutcome> {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            tracing::debug!(print_id = %self.print_id, "Vote refused: not signed in");
            return Ok(VoteOutcome::SignInRequired(Navigation::login_for_print(
                &self.print_id,
            )));
        };

        let command = {
            let mut state = lock(&self.state);
            match state.begin_toggle() {
                Some((pending, command)) => {
                    *state = pending;
                    command
                }
                None => return Ok(VoteOutcome::Busy(state.view())),
            }
        };

        let vote = UpvoteRecord::new(user_id, self.print_id.clone());
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let response = match command {
                VoteCommand::Insert => client.insert_upvote(&vote).await,
                VoteCommand::Delete => client.delete_upvote(&vote).await,
            };
            let result = classify(command, &response);
            let view = {
                let mut state = lock(&state);
                *state = state.resolve(result);
                state.view()
            };

            let print_id = &vote.print_id;
            let user_id = &vote.user_id;
            match response {
                Ok(()) if command == VoteCommand::Insert => {
                    tracing::info!(%print_id, %user_id, count = view.count, "Upvote added");
                    Ok(VoteOutcome::Voted(view))
                }
                Ok(()) => {
                    tracing::info!(%print_id, %user_id, count = view.count, "Upvote removed");
                    Ok(VoteOutcome::Unvoted(view))
                }
                Err(_) if result == RemoteResult::Conflict => {
                    tracing::info!(%print_id, %user_id, count = view.count, "Upvote already recorded");
                    Ok(VoteOutcome::AlreadyVoted(view))
                }
                Err(err) => {
                    tracing::error!(%print_id, %user_id, error = %err, "Upvote toggle failed");
                    Err(AppError::Backend(err))
                }
            }
        });

        task.await
            .map_err(|e| AppError::Internal(format!("vote task failed: {e}")))?
    }
}

/// Map a remote response onto the state machine's input. Only an insert can
/// conflict; a delete error of any kind is a failure.
fn classify(command: VoteCommand, response: &Result<(), BackendError>) -> RemoteResult {
    match response {
        Ok(()) => RemoteResult::Succeeded,
        Err(err) if command == VoteCommand::Insert && err.is_unique_violation() => {
            RemoteResult::Conflict
        }
        Err(_) => RemoteResult::Failed,
    }
}

fn lock(state: &Mutex<VoteState>) -> MutexGuard<'_, VoteState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insert_conflicts_count_as_conflict() {
        let conflict: Result<(), BackendError> = Err(BackendError::Conflict("dup".into()));
        assert_eq!(classify(VoteCommand::Insert, &conflict), RemoteResult::Conflict);
        assert_eq!(classify(VoteCommand::Delete, &conflict), RemoteResult::Failed);

        let down: Result<(), BackendError> = Err(BackendError::Unavailable("down".into()));
        assert_eq!(classify(VoteCommand::Insert, &down), RemoteResult::Failed);
        assert_eq!(classify(VoteCommand::Delete, &Ok(())), RemoteResult::Succeeded);
    }
}
