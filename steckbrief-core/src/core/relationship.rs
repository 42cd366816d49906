//! Assigning and removing a person's parents.
//!
//! Each parent role has its own small state machine and its own candidate
//! search. Nothing is shared between the two roles, so working on the
//! father's slot can never disturb the mother's and vice versa.

use crate::{
    Confirm, Confirmation, DebounceConfig, Decision, PartialUpdate, Person, PersonApi,
    PersonField, PersonFinder, PersonId, PersonRecords, ProfileObserver, Result, ResultList,
    SearchResult,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Which parent slot of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRole {
    Vater,
    Mutter,
}

impl ParentRole {
    pub const ALL: [ParentRole; 2] = [Self::Vater, Self::Mutter];

    /// The person field holding this parent's id.
    #[must_use]
    pub fn field(self) -> PersonField {
        match self {
            Self::Vater => PersonField::VaterId,
            Self::Mutter => PersonField::MutterId,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vater => "Vater",
            Self::Mutter => "Mutter",
        }
    }

    /// Genitive with article, for use inside sentences.
    #[must_use]
    pub fn genitive(self) -> &'static str {
        match self {
            Self::Vater => "des Vaters",
            Self::Mutter => "der Mutter",
        }
    }
}

impl fmt::Display for ParentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State of one parent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignState {
    /// The current assignment is shown.
    #[default]
    Viewing,
    /// The candidate search is open and waiting for a selection.
    Assigning,
}

struct RoleSlot {
    state: Mutex<AssignState>,
    finder: PersonFinder,
}

/// The per-role assignment state machines of one profile view.
pub struct RelationshipEditor {
    records: PersonRecords,
    observer: Arc<dyn ProfileObserver>,
    vater: RoleSlot,
    mutter: RoleSlot,
}

impl RelationshipEditor {
    /// Starts one candidate search per role. Each search runs under its own
    /// child of `cancel`.
    #[must_use]
    pub fn spawn(
        api: Arc<dyn PersonApi>,
        observer: Arc<dyn ProfileObserver>,
        config: DebounceConfig,
        cancel: &CancellationToken,
    ) -> Self {
        let slot = |role: ParentRole| RoleSlot {
            state: Mutex::new(AssignState::Viewing),
            finder: PersonFinder::spawn(
                ResultList::Parent(role),
                Arc::clone(&api),
                Arc::clone(&observer),
                config,
                cancel.child_token(),
            ),
        };
        let vater = slot(ParentRole::Vater);
        let mutter = slot(ParentRole::Mutter);
        Self {
            records: PersonRecords::new(Arc::clone(&api)),
            observer,
            vater,
            mutter,
        }
    }

    fn slot(&self, role: ParentRole) -> &RoleSlot {
        match role {
            ParentRole::Vater => &self.vater,
            ParentRole::Mutter => &self.mutter,
        }
    }

    #[must_use]
    pub fn state(&self, role: ParentRole) -> AssignState {
        *self.slot(role).state.lock()
    }

    #[must_use]
    pub fn finder(&self, role: ParentRole) -> &PersonFinder {
        &self.slot(role).finder
    }

    /// Opens or closes the candidate search of `role`. The search text is
    /// emptied either way.
    pub fn toggle_edit(&self, role: ParentRole) -> AssignState {
        let slot = self.slot(role);
        let next = {
            let mut state = slot.state.lock();
            *state = match *state {
                AssignState::Viewing => AssignState::Assigning,
                AssignState::Assigning => AssignState::Viewing,
            };
            *state
        };
        slot.finder.clear();
        log::debug!("{role} slot now {next:?}");
        self.observer.on_assign_state_changed(role, next);
        next
    }

    pub fn search_input(&self, role: ParentRole, text: &str) {
        self.slot(role).finder.input(text);
    }

    #[must_use]
    pub fn results(&self, role: ParentRole) -> Vec<SearchResult> {
        self.slot(role).finder.results()
    }

    /// Sets `role` of `child` to `candidate`, or unassigns it for `None`.
    ///
    /// On success the slot returns to [`AssignState::Viewing`] with an empty
    /// search. On failure the slot is left as it was.
    pub async fn set_parent(
        &self,
        child: PersonId,
        role: ParentRole,
        candidate: Option<&SearchResult>,
    ) -> Result<Person> {
        let update = PartialUpdate::parent(role.field(), candidate.map(|c| c.id));
        let updated = self.records.update(child, &update).await?;
        self.finish_assignment(role);
        Ok(updated)
    }

    /// Unassigns `role` of `child` after the user confirmed it.
    ///
    /// A declined confirmation sends nothing and changes nothing.
    pub async fn remove_parent(
        &self,
        child: PersonId,
        role: ParentRole,
        current: Option<String>,
        confirm: &dyn Confirm,
    ) -> Result<Decision> {
        let request = Confirmation::RemoveParent { role, name: current };
        if !confirm.confirm(&request).await {
            log::info!("removal of {role} for person {child} declined");
            return Ok(Decision::Declined);
        }
        self.records
            .update(child, &PartialUpdate::parent(role.field(), None))
            .await?;
        Ok(Decision::Applied)
    }

    fn finish_assignment(&self, role: ParentRole) {
        let slot = self.slot(role);
        let was = std::mem::replace(&mut *slot.state.lock(), AssignState::Viewing);
        slot.finder.clear();
        if was != AssignState::Viewing {
            self.observer.on_assign_state_changed(role, AssignState::Viewing);
        }
    }

    pub fn shutdown(&self) {
        self.vater.finder.shutdown();
        self.mutter.finder.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{Call, Event, FakeApi, RecordingObserver, ScriptedConfirm};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::sleep;

    fn editor(api: &Arc<FakeApi>, observer: &Arc<RecordingObserver>) -> RelationshipEditor {
        RelationshipEditor::spawn(
            Arc::clone(api) as Arc<dyn PersonApi>,
            Arc::clone(observer) as Arc<dyn ProfileObserver>,
            DebounceConfig::default(),
            &CancellationToken::new(),
        )
    }

    async fn settle() {
        sleep(Duration::from_millis(400)).await;
    }

    fn assign_events(observer: &RecordingObserver) -> Vec<(ParentRole, AssignState)> {
        observer
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Assign(role, state) => Some((role, state)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_roles_map_to_their_fields() {
        assert_eq!(ParentRole::Vater.field(), PersonField::VaterId);
        assert_eq!(ParentRole::Mutter.field(), PersonField::MutterId);
        assert_eq!(ParentRole::Mutter.genitive(), "der Mutter");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_flips_one_role_only() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        assert_eq!(editor.toggle_edit(ParentRole::Vater), AssignState::Assigning);
        assert_eq!(editor.state(ParentRole::Mutter), AssignState::Viewing);
        assert_eq!(editor.toggle_edit(ParentRole::Vater), AssignState::Viewing);
        assert_eq!(
            assign_events(&observer),
            vec![
                (ParentRole::Vater, AssignState::Assigning),
                (ParentRole::Vater, AssignState::Viewing),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entering_assign_clears_only_own_query() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        editor.search_input(ParentRole::Vater, "Karl");
        editor.search_input(ParentRole::Mutter, "Anna");
        settle().await;
        assert_eq!(editor.results(ParentRole::Vater)[0].id, 1);

        editor.toggle_edit(ParentRole::Vater);
        assert_eq!(editor.finder(ParentRole::Vater).query(), "");
        assert!(editor.results(ParentRole::Vater).is_empty());
        assert_eq!(editor.finder(ParentRole::Mutter).query(), "Anna");
        assert_eq!(editor.results(ParentRole::Mutter)[0].id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_parent_sends_role_key_and_returns_to_viewing() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        editor.toggle_edit(ParentRole::Vater);
        editor.search_input(ParentRole::Vater, "Otto");
        settle().await;
        let candidate = editor.results(ParentRole::Vater)[0].clone();
        api.clear_calls();

        let updated = editor.set_parent(3, ParentRole::Vater, Some(&candidate)).await.unwrap();
        assert_eq!(updated.vater_id, Some(5));
        assert_eq!(api.calls(), vec![Call::Update(3, json!({ "vater_id": 5 }))]);
        assert_eq!(editor.state(ParentRole::Vater), AssignState::Viewing);
        assert_eq!(editor.finder(ParentRole::Vater).query(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_slot_discards_search_in_flight() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        editor.toggle_edit(ParentRole::Vater);
        let slow = api.hold_search("Karl");
        editor.search_input(ParentRole::Vater, "Karl");
        settle().await;

        assert_eq!(editor.toggle_edit(ParentRole::Vater), AssignState::Viewing);
        let _ = slow.send(());
        settle().await;

        assert_eq!(editor.finder(ParentRole::Vater).query(), "");
        assert!(editor.results(ParentRole::Vater).is_empty());
        assert_eq!(observer.last_results(ResultList::Parent(ParentRole::Vater)), Some(vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_set_parent_keeps_assigning() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        editor.toggle_edit(ParentRole::Mutter);
        api.fail("update");
        assert!(editor.set_parent(3, ParentRole::Mutter, None).await.is_err());
        assert_eq!(editor.state(ParentRole::Mutter), AssignState::Assigning);
        assert_eq!(api.get(3).unwrap().mutter_id, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_removal_sends_nothing() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);
        let confirm = ScriptedConfirm::no();

        let decision = editor
            .remove_parent(3, ParentRole::Vater, Some("Karl Mustermann".to_string()), &confirm)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Declined);
        assert!(api.calls().is_empty());
        assert_eq!(api.get(3).unwrap().vater_id, Some(1));
        assert_eq!(confirm.asked().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_removal_sends_null() {
        let api = Arc::new(FakeApi::family());
        let observer = Arc::new(RecordingObserver::default());
        let editor = editor(&api, &observer);

        let decision = editor
            .remove_parent(3, ParentRole::Mutter, None, &ScriptedConfirm::yes())
            .await
            .unwrap();
        assert_eq!(decision, Decision::Applied);
        assert_eq!(api.calls(), vec![Call::Update(3, json!({ "mutter_id": null }))]);
        assert_eq!(api.get(3).unwrap().mutter_id, None);
        assert_eq!(api.get(3).unwrap().vater_id, Some(1));
    }
}
