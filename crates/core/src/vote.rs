//! Upvote toggle state machine.
//!
//! The local vote state is one of four values: `{voted, unvoted} × {idle,
//! pending}`. User clicks go through [`VoteState::begin_toggle`], remote
//! responses through [`VoteState::resolve`]. Both are pure so the
//! duplicate-conflict branch can be exercised without a backend.

use serde::{Deserialize, Serialize};

use crate::types::{PrintId, UserId};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Row in the `upvotes` table. At most one may exist per (user, print).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpvoteRecord {
    pub user_id: UserId,
    pub print_id: PrintId,
}

impl UpvoteRecord {
    pub fn new(user_id: impl Into<UserId>, print_id: impl Into<PrintId>) -> Self {
        Self {
            user_id: user_id.into(),
            print_id: print_id.into(),
        }
    }
}

/// Server-side values a vote button is mounted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct VoteSnapshot {
    pub upvote_count: u64,
    pub has_voted: bool,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Local mirror of a print's vote state for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Unvoted { count: u64 },
    Voted { count: u64 },
    /// Insert in flight; entered from `Unvoted`.
    Adding { count: u64 },
    /// Delete in flight; entered from `Voted`.
    Removing { count: u64 },
}

/// Remote mutation requested by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCommand {
    Insert,
    Delete,
}

/// Classified response to a [`VoteCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteResult {
    Succeeded,
    /// Duplicate key: the vote already exists server-side.
    Conflict,
    Failed,
}

/// Flat view of a [`VoteState`] for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteView {
    pub count: u64,
    pub has_voted: bool,
    pub pending: bool,
}

impl VoteState {
    /// Idle state from a server snapshot.
    pub fn new(count: u64, has_voted: bool) -> Self {
        if has_voted {
            Self::Voted { count }
        } else {
            Self::Unvoted { count }
        }
    }

    pub fn from_snapshot(snapshot: VoteSnapshot) -> Self {
        Self::new(snapshot.upvote_count, snapshot.has_voted)
    }

    pub fn count(self) -> u64 {
        match self {
            Self::Unvoted { count }
            | Self::Voted { count }
            | Self::Adding { count }
            | Self::Removing { count } => count,
        }
    }

    /// Whether the user's vote is (still) recorded. A pending state reports
    /// the value it was entered from.
    pub fn has_voted(self) -> bool {
        matches!(self, Self::Voted { .. } | Self::Removing { .. })
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Adding { .. } | Self::Removing { .. })
    }

    pub fn view(self) -> VoteView {
        VoteView {
            count: self.count(),
            has_voted: self.has_voted(),
            pending: self.is_pending(),
        }
    }

    /// Start a toggle. Returns the pending state and the remote mutation to
    /// issue, or `None` while another mutation is outstanding.
    pub fn begin_toggle(self) -> Option<(Self, VoteCommand)> {
        match self {
            Self::Unvoted { count } => Some((Self::Adding { count }, VoteCommand::Insert)),
            Self::Voted { count } => Some((Self::Removing { count }, VoteCommand::Delete)),
            Self::Adding { .. } | Self::Removing { .. } => None,
        }
    }

    /// Settle a pending state with the remote result.
    ///
    /// A conflict on insert settles as voted without touching the count:
    /// the existing server-side vote is already part of it. Any failure
    /// returns to the state the toggle started from. Idle states are
    /// returned unchanged.
    pub fn resolve(self, result: RemoteResult) -> Self {
        match (self, result) {
            (Self::Adding { count }, RemoteResult::Succeeded) => Self::Voted {
                count: count.saturating_add(1),
            },
            (Self::Adding { count }, RemoteResult::Conflict) => Self::Voted { count },
            (Self::Adding { count }, RemoteResult::Failed) => Self::Unvoted { count },
            (Self::Removing { count }, RemoteResult::Succeeded) => Self::Unvoted {
                count: count.saturating_sub(1),
            },
            // Deletes cannot conflict; anything but success reverts.
            (Self::Removing { count }, RemoteResult::Conflict | RemoteResult::Failed) => {
                Self::Voted { count }
            }
            (idle, _) => idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn toggle(state: VoteState, result: RemoteResult) -> VoteState {
        let (pending, _) = state.begin_toggle().expect("idle state should accept a toggle");
        pending.resolve(result)
    }

    #[test]
    fn insert_success_increments() {
        let next = toggle(VoteState::new(142, false), RemoteResult::Succeeded);
        assert_eq!(next.view(), VoteView { count: 143, has_voted: true, pending: false });
    }

    #[test]
    fn insert_conflict_sets_flag_without_incrementing() {
        let next = toggle(VoteState::new(142, false), RemoteResult::Conflict);
        assert_eq!(next.view(), VoteView { count: 142, has_voted: true, pending: false });
    }

    #[test]
    fn insert_failure_reverts() {
        let next = toggle(VoteState::new(142, false), RemoteResult::Failed);
        assert_eq!(next, VoteState::Unvoted { count: 142 });
    }

    #[test]
    fn delete_success_decrements() {
        let next = toggle(VoteState::new(10, true), RemoteResult::Succeeded);
        assert_eq!(next.view(), VoteView { count: 9, has_voted: false, pending: false });
    }

    #[test]
    fn delete_failure_reverts() {
        let next = toggle(VoteState::new(10, true), RemoteResult::Failed);
        assert_eq!(next, VoteState::Voted { count: 10 });
    }

    #[test]
    fn delete_never_goes_below_zero() {
        let next = toggle(VoteState::new(0, true), RemoteResult::Succeeded);
        assert_eq!(next, VoteState::Unvoted { count: 0 });
    }

    #[test]
    fn round_trip_returns_to_original() {
        let start = VoteState::new(5, false);
        let voted = toggle(start, RemoteResult::Succeeded);
        let back = toggle(voted, RemoteResult::Succeeded);
        assert_eq!(back, start);
    }

    #[test]
    fn begin_toggle_picks_command_from_flag() {
        assert_matches!(
            VoteState::new(1, false).begin_toggle(),
            Some((VoteState::Adding { count: 1 }, VoteCommand::Insert))
        );
        assert_matches!(
            VoteState::new(1, true).begin_toggle(),
            Some((VoteState::Removing { count: 1 }, VoteCommand::Delete))
        );
    }

    #[test]
    fn pending_state_refuses_second_toggle() {
        let (pending, _) = VoteState::new(3, false).begin_toggle().unwrap();
        assert!(pending.is_pending());
        assert!(pending.begin_toggle().is_none());
    }

    #[test]
    fn pending_view_keeps_prior_values() {
        let (pending, _) = VoteState::new(3, true).begin_toggle().unwrap();
        assert_eq!(pending.view(), VoteView { count: 3, has_voted: true, pending: true });
    }

    #[test]
    fn resolve_on_idle_is_a_no_op() {
        let idle = VoteState::new(8, true);
        assert_eq!(idle.resolve(RemoteResult::Succeeded), idle);
        assert_eq!(idle.resolve(RemoteResult::Conflict), idle);
    }

    #[test]
    fn from_snapshot() {
        let s = VoteState::from_snapshot(VoteSnapshot { upvote_count: 4, has_voted: true });
        assert_eq!(s, VoteState::Voted { count: 4 });
    }
}
