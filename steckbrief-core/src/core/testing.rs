//! In-memory stand-ins for the backend and the UI seams, shared by the unit tests.

use crate::{
    AncestorNode, AssignState, Confirm, Confirmation, DocumentOpener, EditOutcome, EditRequest,
    Eltern, FieldPrompt, NewPerson, Notice, NoticeKind, ParentRole, PartialUpdate, Person,
    PersonApi, PersonId, PersonRef, ProfileObserver, Relative, Result, ResultList, SearchResult,
    SteckbriefData, SteckbriefError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Search(String),
    Steckbrief(PersonId),
    Person(PersonId),
    List,
    Create(serde_json::Value),
    Update(PersonId, serde_json::Value),
    Delete(PersonId),
    Ancestors(PersonId, u32),
}

pub(crate) fn person(id: PersonId, vorname: &str, nachname: &str) -> Person {
    Person {
        id,
        vorname: vorname.to_string(),
        nachname: nachname.to_string(),
        geburtsdatum: None,
        geschlecht: Default::default(),
        vater_id: None,
        mutter_id: None,
        extra: BTreeMap::new(),
    }
}

fn to_ref(p: &Person) -> PersonRef {
    PersonRef {
        id: p.id,
        vorname: p.vorname.clone(),
        nachname: p.nachname.clone(),
    }
}

fn to_relative(p: &Person) -> Relative {
    Relative {
        id: p.id,
        vorname: p.vorname.clone(),
        nachname: p.nachname.clone(),
        geburtsdatum: p.geburtsdatum,
    }
}

/// A backend that keeps its records in memory and logs every call.
#[derive(Default)]
pub(crate) struct FakeApi {
    people: Mutex<BTreeMap<PersonId, Person>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    search_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    steckbrief_gates: Mutex<HashMap<PersonId, oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub(crate) fn with_people(people: impl IntoIterator<Item = Person>) -> Self {
        let api = Self::default();
        api.people.lock().extend(people.into_iter().map(|p| (p.id, p)));
        api
    }

    /// The Mustermann family: Karl (1) and Anna (2) are parents of Max (3) and Erika (4).
    pub(crate) fn family() -> Self {
        let mut max = person(3, "Max", "Mustermann");
        max.vater_id = Some(1);
        max.mutter_id = Some(2);
        max.geburtsdatum = chrono::NaiveDate::from_ymd_opt(1950, 4, 2);
        let mut erika = person(4, "Erika", "Mustermann");
        erika.vater_id = Some(1);
        erika.mutter_id = Some(2);
        Self::with_people([
            person(1, "Karl", "Mustermann"),
            person(2, "Anna", "Mustermann"),
            max,
            erika,
            person(5, "Otto", "Normalverbraucher"),
        ])
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub(crate) fn get(&self, id: PersonId) -> Option<Person> {
        self.people.lock().get(&id).cloned()
    }

    /// Makes every call of `op` fail with a network error until [`heal`](Self::heal).
    pub(crate) fn fail(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub(crate) fn heal(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    /// Holds the next search for `query` until the returned sender fires or drops.
    pub(crate) fn hold_search(&self, query: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().insert(query.to_string(), rx);
        tx
    }

    /// Holds the next Steckbrief load of `id` until the returned sender fires or drops.
    pub(crate) fn hold_steckbrief(&self, id: PersonId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steckbrief_gates.lock().insert(id, rx);
        tx
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().contains(op) {
            return Err(SteckbriefError::Network(format!("injected {op} failure")));
        }
        Ok(())
    }

    fn build_steckbrief(&self, id: PersonId) -> Result<SteckbriefData> {
        let people = self.people.lock();
        let person = people.get(&id).cloned().ok_or(SteckbriefError::NotFound(id))?;
        let lookup = |pid: Option<PersonId>| pid.and_then(|pid| people.get(&pid)).map(to_ref);
        let eltern = Eltern {
            vater: lookup(person.vater_id),
            mutter: lookup(person.mutter_id),
        };
        let geschwister = people
            .values()
            .filter(|p| p.id != id)
            .filter(|p| {
                (person.vater_id.is_some() && p.vater_id == person.vater_id)
                    || (person.mutter_id.is_some() && p.mutter_id == person.mutter_id)
            })
            .map(to_relative)
            .collect();
        let kinder = people
            .values()
            .filter(|p| p.vater_id == Some(id) || p.mutter_id == Some(id))
            .map(to_relative)
            .collect();
        Ok(SteckbriefData {
            person,
            eltern,
            geschwister,
            kinder,
            extra: BTreeMap::new(),
        })
    }
}

#[async_trait]
impl PersonApi for FakeApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.record(Call::Search(query.to_string()));
        let gate = self.search_gates.lock().remove(query);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check("search")?;
        let needle = query.to_lowercase();
        let mut found: Vec<Person> = self
            .people
            .lock()
            .values()
            .filter(|p| {
                p.vorname.to_lowercase().contains(&needle) || p.nachname.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.nachname, &a.vorname).cmp(&(&b.nachname, &b.vorname)));
        Ok(found.iter().take(15).map(to_ref).collect())
    }

    async fn steckbrief(&self, id: PersonId) -> Result<SteckbriefData> {
        self.record(Call::Steckbrief(id));
        let gate = self.steckbrief_gates.lock().remove(&id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check("steckbrief")?;
        self.build_steckbrief(id)
    }

    async fn person(&self, id: PersonId) -> Result<Person> {
        self.record(Call::Person(id));
        self.check("person")?;
        self.get(id).ok_or(SteckbriefError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Person>> {
        self.record(Call::List);
        self.check("list")?;
        Ok(self.people.lock().values().cloned().collect())
    }

    async fn create(&self, new: &NewPerson) -> Result<Person> {
        self.record(Call::Create(serde_json::to_value(new)?));
        self.check("create")?;
        let mut people = self.people.lock();
        let id = people.keys().next_back().copied().unwrap_or(0) + 1;
        let created = Person {
            geburtsdatum: new.geburtsdatum,
            geschlecht: new.geschlecht,
            vater_id: new.vater_id,
            mutter_id: new.mutter_id,
            ..person(id, &new.vorname, &new.nachname)
        };
        people.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: PersonId, update: &PartialUpdate) -> Result<Person> {
        let changes = serde_json::to_value(update)?;
        self.record(Call::Update(id, changes.clone()));
        self.check("update")?;
        let mut people = self.people.lock();
        let current = people.get(&id).ok_or(SteckbriefError::NotFound(id))?;
        let mut merged = serde_json::to_value(current)?;
        if let (Some(target), Some(source)) = (merged.as_object_mut(), changes.as_object()) {
            for (k, v) in source {
                target.insert(k.clone(), v.clone());
            }
        }
        let updated: Person = serde_json::from_value(merged)?;
        people.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: PersonId) -> Result<()> {
        self.record(Call::Delete(id));
        self.check("delete")?;
        let mut people = self.people.lock();
        people.remove(&id).ok_or(SteckbriefError::NotFound(id))?;
        for p in people.values_mut() {
            if p.vater_id == Some(id) {
                p.vater_id = None;
            }
            if p.mutter_id == Some(id) {
                p.mutter_id = None;
            }
        }
        Ok(())
    }

    async fn ancestors(&self, id: PersonId, depth: u32) -> Result<AncestorNode> {
        self.record(Call::Ancestors(id, depth));
        self.check("ancestors")?;
        fn walk(people: &BTreeMap<PersonId, Person>, id: Option<PersonId>, depth: u32) -> Option<Box<AncestorNode>> {
            let person = people.get(&id?)?.clone();
            let (vater, mutter) = if depth > 0 {
                (walk(people, person.vater_id, depth - 1), walk(people, person.mutter_id, depth - 1))
            } else {
                (None, None)
            };
            Some(Box::new(AncestorNode { vater, mutter, person }))
        }
        let people = self.people.lock();
        walk(&people, Some(id), depth)
            .map(|node| *node)
            .ok_or(SteckbriefError::NotFound(id))
    }

    fn stammbaum_pdf_url(&self, id: PersonId, generations: u32) -> Result<Url> {
        Url::parse(&format!("http://fake.local/api/stammbaum/{id}/pdf/?gen={generations}"))
            .map_err(|e| SteckbriefError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Profile(Option<PersonId>),
    Results(ResultList, Vec<PersonId>),
    Assign(ParentRole, AssignState),
    Notice(Notice),
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.kind == NoticeKind::Error)
            .map(|n| n.message)
            .collect()
    }

    pub(crate) fn last_results(&self, list: ResultList) -> Option<Vec<PersonId>> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::Results(l, ids) if l == list => Some(ids),
            _ => None,
        })
    }
}

impl ProfileObserver for RecordingObserver {
    fn on_profile_changed(&self, snapshot: Option<&SteckbriefData>) {
        self.events.lock().push(Event::Profile(snapshot.map(|s| s.person.id)));
    }

    fn on_results_changed(&self, list: ResultList, results: &[SearchResult]) {
        let ids = results.iter().map(|r| r.id).collect();
        self.events.lock().push(Event::Results(list, ids));
    }

    fn on_assign_state_changed(&self, role: ParentRole, state: AssignState) {
        self.events.lock().push(Event::Assign(role, state));
    }

    fn on_notice(&self, notice: &Notice) {
        self.events.lock().push(Event::Notice(notice.clone()));
    }
}

/// Answers every confirmation with a fixed decision and remembers the questions.
pub(crate) struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<Confirmation>>,
}

impl ScriptedConfirm {
    pub(crate) fn yes() -> Self {
        Self { answer: true, asked: Mutex::new(Vec::new()) }
    }

    pub(crate) fn no() -> Self {
        Self { answer: false, asked: Mutex::new(Vec::new()) }
    }

    pub(crate) fn asked(&self) -> Vec<Confirmation> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, request: &Confirmation) -> bool {
        self.asked.lock().push(request.clone());
        self.answer
    }
}

/// Closes every edit prompt with a fixed outcome and remembers what it was shown.
pub(crate) struct ScriptedPrompt {
    outcome: EditOutcome,
    seen: Mutex<Vec<EditRequest>>,
}

impl ScriptedPrompt {
    pub(crate) fn closing_with(outcome: EditOutcome) -> Self {
        Self { outcome, seen: Mutex::new(Vec::new()) }
    }

    pub(crate) fn seen(&self) -> Vec<EditRequest> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl FieldPrompt for ScriptedPrompt {
    async fn prompt(&self, request: &EditRequest) -> EditOutcome {
        self.seen.lock().push(request.clone());
        self.outcome.clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub(crate) fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl DocumentOpener for RecordingOpener {
    fn open(&self, url: &Url) -> Result<()> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}
