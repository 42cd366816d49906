//! The Steckbrief profile view: one displayed person, a main search and the
//! parent slots, plus every command the view offers.

use crate::{
    AncestorNode, AssignState, ClientSettings, Confirm, Confirmation, DebounceConfig, Decision,
    DocumentOpener, EditRequest, FieldKind, FieldPrompt, FieldValue, LoadOutcome, NewPerson,
    Notice, ParentRole, PartialUpdate, Person, PersonApi, PersonField, PersonFinder, PersonId,
    PersonRecords, ProfileObserver, ProfileStore, RelationshipEditor, Result, ResultList,
    SearchResult, SteckbriefData, SteckbriefError,
};
use reqwest::Url;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State and commands of one profile view.
///
/// A `ProfileView` owns everything the view needs: the displayed record,
/// the main search and one candidate search per parent role. Renderers
/// follow along through the [`ProfileObserver`] passed at construction.
///
/// Every remote failure is reported twice: as an error notice to the
/// observer, and as the `Err` of the command that caused it. Nothing is
/// changed optimistically; after a successful mutation the displayed record
/// is reloaded from the backend.
///
/// Must be created inside a tokio runtime. Dropping the view (or calling
/// [`ProfileView::shutdown`]) stops all of its timers and searches.
pub struct ProfileView {
    records: PersonRecords,
    store: ProfileStore,
    search: PersonFinder,
    parents: RelationshipEditor,
    observer: Arc<dyn ProfileObserver>,
    opener: Arc<dyn DocumentOpener>,
    generations: u32,
    cancel: CancellationToken,
}

impl ProfileView {
    #[must_use]
    pub fn new(
        api: Arc<dyn PersonApi>,
        observer: Arc<dyn ProfileObserver>,
        opener: Arc<dyn DocumentOpener>,
        settings: &ClientSettings,
    ) -> Self {
        let cancel = CancellationToken::new();
        let config = DebounceConfig {
            quiet: settings.search_debounce(),
            min_chars: settings.min_query_chars,
        };
        let search = PersonFinder::spawn(
            ResultList::Main,
            Arc::clone(&api),
            Arc::clone(&observer),
            config,
            cancel.child_token(),
        );
        let parents = RelationshipEditor::spawn(Arc::clone(&api), Arc::clone(&observer), config, &cancel);
        Self {
            records: PersonRecords::new(Arc::clone(&api)),
            store: ProfileStore::new(api, Arc::clone(&observer)),
            search,
            parents,
            observer,
            opener,
            generations: settings.stammbaum_generations,
            cancel,
        }
    }

    /// Builds a view that talks HTTP to `settings.api_base_url` and opens
    /// documents with the system handler.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Config`] for unusable settings.
    #[cfg(feature = "system-opener")]
    pub fn connect(settings: &ClientSettings, observer: Arc<dyn ProfileObserver>) -> Result<Self> {
        let api = crate::HttpPersonApi::new(settings)?;
        Ok(Self::new(Arc::new(api), observer, Arc::new(crate::SystemOpener), settings))
    }

    // ── displayed record ─────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> Option<SteckbriefData> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn current_id(&self) -> Option<PersonId> {
        self.store.current_id()
    }

    /// Loads `id`, e.g. a parent, sibling or child shown in the profile.
    pub async fn navigate_to(&self, id: PersonId) -> Result<LoadOutcome> {
        self.store.load(id).await
    }

    /// Reloads the displayed person, if there is one.
    pub async fn refresh(&self) -> Result<Option<LoadOutcome>> {
        match self.current_id() {
            Some(id) => self.store.load(id).await.map(Some),
            None => Ok(None),
        }
    }

    // ── main search ──────────────────────────────────────────────────

    pub fn search_input(&self, text: &str) {
        self.search.input(text);
    }

    #[must_use]
    pub fn search_query(&self) -> String {
        self.search.query()
    }

    #[must_use]
    pub fn search_results(&self) -> Vec<SearchResult> {
        self.search.results()
    }

    /// Loads the selected person and empties the search box without
    /// starting another search.
    pub async fn select_search_result(&self, result: &SearchResult) -> Result<LoadOutcome> {
        let load = self.store.load(result.id);
        self.search.reset_silently();
        load.await
    }

    // ── records ──────────────────────────────────────────────────────

    /// Creates a person and shows it.
    ///
    /// Invalid input is reported without contacting the backend.
    pub async fn create_person(&self, person: NewPerson) -> Result<Person> {
        let created = self
            .records
            .create(person)
            .await
            .map_err(|e| self.report("Anlegen fehlgeschlagen", e))?;
        self.observer.on_notice(&Notice::info("Person angelegt"));
        self.reload(created.id).await;
        Ok(created)
    }

    /// Sends `update` for the displayed person and reloads it.
    pub async fn update_person(&self, update: &PartialUpdate) -> Result<Person> {
        let id = self.require_current()?.person.id;
        self.save(id, update).await
    }

    /// Edits one field of the displayed person through `prompt`.
    ///
    /// Returns `Ok(None)` if the prompt was cancelled; nothing is sent then.
    /// Otherwise exactly one update carrying only `key` is sent.
    pub async fn edit_field(
        &self,
        key: &str,
        label: &str,
        prompt: &dyn FieldPrompt,
    ) -> Result<Option<Person>> {
        let field: PersonField = key.parse()?;
        let kind = match field {
            PersonField::Geschlecht => FieldKind::geschlecht(),
            _ => FieldKind::infer(key),
        };
        self.edit_field_as(key, label, kind, prompt).await
    }

    /// Like [`edit_field`](Self::edit_field) with an explicit editor kind.
    pub async fn edit_field_as(
        &self,
        key: &str,
        label: &str,
        kind: FieldKind,
        prompt: &dyn FieldPrompt,
    ) -> Result<Option<Person>> {
        let field: PersonField = key.parse()?;
        let person = self.require_current()?.person;
        let current = person
            .field_value(key)
            .unwrap_or_else(|| FieldValue::Text(String::new()));
        let request = EditRequest::new(key, label, current).with_kind(kind);

        let Some(value) = prompt.prompt(&request).await.into_saved() else {
            log::debug!("edit of {key} on person {} cancelled", person.id);
            return Ok(None);
        };
        let update = PartialUpdate::single(field, value)
            .map_err(|e| self.report("Speichern fehlgeschlagen", e))?;
        self.save(person.id, &update).await.map(Some)
    }

    /// Deletes the displayed person once the user confirms.
    ///
    /// On success the view shows nobody; no reload follows.
    pub async fn delete_person(&self, confirm: &dyn Confirm) -> Result<Decision> {
        let person = self.require_current()?.person;
        let request = Confirmation::DeletePerson {
            id: person.id,
            name: person.display_name(),
        };
        if !confirm.confirm(&request).await {
            log::info!("deletion of person {} declined", person.id);
            return Ok(Decision::Declined);
        }
        self.records
            .delete(person.id)
            .await
            .map_err(|e| self.report("Löschen fehlgeschlagen", e))?;
        self.store.clear();
        self.observer.on_notice(&Notice::info("Person gelöscht"));
        Ok(Decision::Applied)
    }

    #[must_use]
    pub fn person_records(&self) -> &PersonRecords {
        &self.records
    }

    // ── parents ──────────────────────────────────────────────────────

    #[must_use]
    pub fn assign_state(&self, role: ParentRole) -> AssignState {
        self.parents.state(role)
    }

    pub fn toggle_parent_edit(&self, role: ParentRole) -> AssignState {
        self.parents.toggle_edit(role)
    }

    pub fn parent_search_input(&self, role: ParentRole, text: &str) {
        self.parents.search_input(role, text);
    }

    #[must_use]
    pub fn parent_search_query(&self, role: ParentRole) -> String {
        self.parents.finder(role).query()
    }

    #[must_use]
    pub fn parent_results(&self, role: ParentRole) -> Vec<SearchResult> {
        self.parents.results(role)
    }

    /// Assigns `candidate` as the displayed person's `role`, or unassigns it
    /// for `None`, then reloads.
    pub async fn set_parent(&self, role: ParentRole, candidate: Option<&SearchResult>) -> Result<Person> {
        let id = self.require_current()?.person.id;
        let updated = self
            .parents
            .set_parent(id, role, candidate)
            .await
            .map_err(|e| self.report("Zuordnung fehlgeschlagen", e))?;
        self.observer.on_notice(&Notice::saved());
        self.reload(id).await;
        Ok(updated)
    }

    /// Unassigns the displayed person's `role` once the user confirms.
    pub async fn remove_parent(&self, role: ParentRole, confirm: &dyn Confirm) -> Result<Decision> {
        let data = self.require_current()?;
        let id = data.person.id;
        let current = match role {
            ParentRole::Vater => data.eltern.vater.as_ref(),
            ParentRole::Mutter => data.eltern.mutter.as_ref(),
        }
        .map(|p| p.display_name());

        let decision = self
            .parents
            .remove_parent(id, role, current, confirm)
            .await
            .map_err(|e| self.report("Entfernen fehlgeschlagen", e))?;
        if decision == Decision::Applied {
            self.observer.on_notice(&Notice::saved());
            self.reload(id).await;
        }
        Ok(decision)
    }

    // ── family tree ──────────────────────────────────────────────────

    /// URL of the family-tree PDF for the displayed person.
    pub fn stammbaum_url(&self) -> Result<Url> {
        let id = self.require_current()?.person.id;
        self.records.api().stammbaum_pdf_url(id, self.generations)
    }

    /// Hands the family-tree PDF of the displayed person to the document opener.
    pub fn open_stammbaum(&self) -> Result<()> {
        let url = self.stammbaum_url()?;
        self.opener
            .open(&url)
            .map_err(|e| self.report("Stammbaum konnte nicht geöffnet werden", e))
    }

    /// Ancestors of the displayed person, `depth` generations up.
    pub async fn ancestors(&self, depth: u32) -> Result<AncestorNode> {
        let id = self.require_current()?.person.id;
        self.records
            .ancestors(id, depth)
            .await
            .map_err(|e| self.report("Fehler beim Laden", e))
    }

    // ── lifecycle ────────────────────────────────────────────────────

    /// Stops every debounce timer and search of this view. Further input
    /// is ignored.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            log::debug!("profile view shutting down");
        }
        self.cancel.cancel();
    }

    // ── helpers ──────────────────────────────────────────────────────

    fn require_current(&self) -> Result<SteckbriefData> {
        self.store
            .snapshot()
            .ok_or_else(|| SteckbriefError::Validation("Keine Person ausgewählt".to_string()))
    }

    async fn save(&self, id: PersonId, update: &PartialUpdate) -> Result<Person> {
        let updated = self
            .records
            .update(id, update)
            .await
            .map_err(|e| self.report("Speichern fehlgeschlagen", e))?;
        self.observer.on_notice(&Notice::saved());
        self.reload(id).await;
        Ok(updated)
    }

    /// Reloads after a mutation. A failed reload has already been reported
    /// by the store and does not fail the mutation.
    async fn reload(&self, id: PersonId) {
        if let Err(e) = self.store.load(id).await {
            log::debug!("reload of person {id} after mutation failed: {e}");
        }
    }

    fn report(&self, context: &str, error: SteckbriefError) -> SteckbriefError {
        log::warn!("{context}: {error}");
        self.observer.on_notice(&Notice::error(context, &error));
        error
    }
}

impl Drop for ProfileView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
