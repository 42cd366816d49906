//! Holds the one Steckbrief currently on display.

use crate::{Notice, PersonApi, PersonId, ProfileObserver, Result, SteckbriefData};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// What became of a finished [`ProfileStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response became the displayed snapshot.
    Applied,
    /// A later `load` or `clear` was issued first; the response was discarded.
    Superseded,
}

struct StoreState {
    snapshot: Option<SteckbriefData>,
    /// Ticket of the most recently issued `load` or `clear`.
    latest: u64,
}

/// The display snapshot of at most one person.
///
/// Every `load` takes a ticket when it is issued. A response is applied only
/// if its ticket is still the latest one, so when loads overlap the last one
/// issued wins regardless of the order in which responses arrive. `clear`
/// also takes a ticket, which keeps a deleted person from being resurrected
/// by a load that was still in flight.
pub struct ProfileStore {
    api: Arc<dyn PersonApi>,
    observer: Arc<dyn ProfileObserver>,
    state: Mutex<StoreState>,
}

impl ProfileStore {
    #[must_use]
    pub fn new(api: Arc<dyn PersonApi>, observer: Arc<dyn ProfileObserver>) -> Self {
        Self {
            api,
            observer,
            state: Mutex::new(StoreState {
                snapshot: None,
                latest: 0,
            }),
        }
    }

    /// Fetches the Steckbrief of `id` and, if no newer `load`/`clear` was
    /// issued meanwhile, replaces the snapshot with it.
    ///
    /// The ticket is taken when this method is called, not when the returned
    /// future is first polled.
    ///
    /// On failure the previous snapshot stays as it is and an error notice
    /// is sent, unless the load had already been superseded.
    pub fn load(&self, id: PersonId) -> impl Future<Output = Result<LoadOutcome>> + Send + '_ {
        let ticket = self.issue();
        async move {
            log::debug!("loading steckbrief {id} (ticket {ticket})");
            let response = self.api.steckbrief(id).await;
            self.complete(ticket, id, response)
        }
    }

    /// Drops the snapshot and invalidates every load still in flight.
    pub fn clear(&self) {
        {
            let mut state = self.state.lock();
            state.latest += 1;
            state.snapshot = None;
        }
        self.observer.on_profile_changed(None);
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<SteckbriefData> {
        self.state.lock().snapshot.clone()
    }

    /// Id of the displayed person, if any.
    #[must_use]
    pub fn current_id(&self) -> Option<PersonId> {
        self.state.lock().snapshot.as_ref().map(|s| s.person.id)
    }

    fn issue(&self) -> u64 {
        let mut state = self.state.lock();
        state.latest += 1;
        state.latest
    }

    fn complete(
        &self,
        ticket: u64,
        id: PersonId,
        response: Result<SteckbriefData>,
    ) -> Result<LoadOutcome> {
        let data = {
            let mut state = self.state.lock();
            if state.latest != ticket {
                log::info!("discarding stale steckbrief {id} (ticket {ticket}, latest {})", state.latest);
                return Ok(LoadOutcome::Superseded);
            }
            match response {
                Ok(data) => {
                    state.snapshot = Some(data.clone());
                    data
                }
                Err(e) => {
                    drop(state);
                    log::warn!("loading steckbrief {id} failed: {e}");
                    self.observer.on_notice(&Notice::error("Fehler beim Laden", &e));
                    return Err(e);
                }
            }
        };
        self.observer.on_profile_changed(Some(&data));
        Ok(LoadOutcome::Applied)
    }
}
