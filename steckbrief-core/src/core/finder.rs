//! Debounced person search with a single, fully replaced result list.

use crate::{
    DebounceConfig, Notice, PersonApi, ProfileObserver, ResultList, SearchDebouncer, SearchResult,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One search box: its text, its debounce timer, its in-flight request and
/// its result list. Finders never share any of this with each other.
///
/// A query that arrives while an earlier search is still running supersedes
/// it: the earlier request is abandoned and its response never reaches the
/// result list. [`clear`](PersonFinder::clear) abandons a running search
/// the same way.
pub struct PersonFinder {
    list: ResultList,
    debouncer: SearchDebouncer,
    query: Mutex<String>,
    results: Arc<Mutex<Vec<SearchResult>>>,
    /// Bumped by `clear`; a response started under an older value is dropped.
    generation: Arc<AtomicU64>,
    observer: Arc<dyn ProfileObserver>,
    cancel: CancellationToken,
}

impl PersonFinder {
    /// Starts the debounce and search tasks on the current tokio runtime.
    ///
    /// Both tasks stop when `cancel` is cancelled.
    #[must_use]
    pub fn spawn(
        list: ResultList,
        api: Arc<dyn PersonApi>,
        observer: Arc<dyn ProfileObserver>,
        config: DebounceConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (debouncer, queries) = SearchDebouncer::spawn(config, cancel.clone());
        let results = Arc::new(Mutex::new(Vec::new()));
        let generation = Arc::new(AtomicU64::new(0));
        tokio::spawn(run_searches(
            list,
            api,
            Arc::clone(&observer),
            Arc::clone(&results),
            Arc::clone(&generation),
            queries,
            cancel.clone(),
        ));
        Self {
            list,
            debouncer,
            query: Mutex::new(String::new()),
            results,
            generation,
            observer,
            cancel,
        }
    }

    #[must_use]
    pub fn list(&self) -> ResultList {
        self.list
    }

    /// Feeds the current text of the search box.
    pub fn input(&self, text: &str) {
        *self.query.lock() = text.to_string();
        self.debouncer.push(text);
    }

    /// Empties the search box as if the user had deleted the text, and
    /// drops the current results. A search still in flight never publishes.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.input("");
        self.replace_results(Vec::new());
    }

    /// Empties the search box without feeding the change into the query
    /// stream. The result list is left as it is.
    pub fn reset_silently(&self) {
        self.query.lock().clear();
    }

    #[must_use]
    pub fn query(&self) -> String {
        self.query.lock().clone()
    }

    #[must_use]
    pub fn results(&self) -> Vec<SearchResult> {
        self.results.lock().clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn replace_results(&self, found: Vec<SearchResult>) {
        publish(self.list, &self.results, self.observer.as_ref(), found);
    }
}

fn publish(
    list: ResultList,
    results: &Mutex<Vec<SearchResult>>,
    observer: &dyn ProfileObserver,
    found: Vec<SearchResult>,
) {
    *results.lock() = found.clone();
    observer.on_results_changed(list, &found);
}

async fn run_searches(
    list: ResultList,
    api: Arc<dyn PersonApi>,
    observer: Arc<dyn ProfileObserver>,
    results: Arc<Mutex<Vec<SearchResult>>>,
    generation: Arc<AtomicU64>,
    mut queries: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let mut next: Option<String> = None;
    loop {
        let query = match next.take() {
            Some(query) => query,
            None => tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                query = queries.recv() => match query {
                    Some(query) => query,
                    None => return,
                },
            },
        };

        let started = generation.load(Ordering::SeqCst);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            newer = queries.recv() => match newer {
                Some(newer) => {
                    log::debug!("{list:?}: search for {query:?} superseded by {newer:?}");
                    next = Some(newer);
                    continue;
                }
                None => return,
            },
            outcome = api.search(&query) => outcome,
        };

        if generation.load(Ordering::SeqCst) != started {
            log::debug!("{list:?}: dropping response for {query:?}, list was cleared meanwhile");
            continue;
        }

        match outcome {
            Ok(found) => {
                log::debug!("{list:?}: {} result(s) for {query:?}", found.len());
                publish(list, &results, observer.as_ref(), found);
            }
            Err(e) => {
                log::warn!("{list:?}: search for {query:?} failed: {e}");
                publish(list, &results, observer.as_ref(), Vec::new());
                observer.on_notice(&Notice::error("Suche fehlgeschlagen", &e));
            }
        }
    }
}
