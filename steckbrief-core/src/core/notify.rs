//! Observer interface between the view state and whatever renders it.

use crate::{AssignState, ParentRole, SearchResult, SteckbriefData, SteckbriefError};
use std::time::Duration;

/// Which result list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultList {
    /// The main person search.
    Main,
    /// The candidate search of one parent slot.
    Parent(ParentRole),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient, user-visible message (a "snackbar").
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// How long to show the notice; `None` keeps it until dismissed.
    pub duration: Option<Duration>,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            duration: None,
        }
    }

    /// The short confirmation shown after a successful update.
    #[must_use]
    pub fn saved() -> Self {
        Self {
            duration: Some(Duration::from_secs(2)),
            ..Self::info("Gespeichert")
        }
    }

    #[must_use]
    pub fn error(context: &str, error: &SteckbriefError) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: format!("{context}: {}", error.user_message()),
            duration: None,
        }
    }
}

/// Receives every state change of a [`ProfileView`](crate::ProfileView).
///
/// All methods default to doing nothing so renderers only implement what
/// they show. Calls arrive on the task that caused the change; implementors
/// must not block.
pub trait ProfileObserver: Send + Sync {
    /// The displayed record was replaced, or cleared (`None`).
    fn on_profile_changed(&self, _snapshot: Option<&SteckbriefData>) {}

    /// A search result list was replaced in full.
    fn on_results_changed(&self, _list: ResultList, _results: &[SearchResult]) {}

    /// A parent slot switched between viewing and assigning.
    fn on_assign_state_changed(&self, _role: ParentRole, _state: AssignState) {}

    fn on_notice(&self, _notice: &Notice) {}
}

/// Observer that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ProfileObserver for NullObserver {}
