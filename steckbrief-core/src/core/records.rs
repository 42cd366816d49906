//! Create/read/update/delete of person records, with client-side checks
//! applied before anything goes on the wire.

use crate::{
    AncestorNode, NewPerson, PartialUpdate, Person, PersonApi, PersonId, Result, SteckbriefData,
};
use std::sync::Arc;

/// Thin front over [`PersonApi`] for the mutating and record-level calls.
///
/// Payloads that fail validation are rejected with
/// [`SteckbriefError::Validation`](crate::SteckbriefError::Validation) and
/// never reach the backend.
#[derive(Clone)]
pub struct PersonRecords {
    api: Arc<dyn PersonApi>,
}

impl PersonRecords {
    #[must_use]
    pub fn new(api: Arc<dyn PersonApi>) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<dyn PersonApi> {
        &self.api
    }

    /// # Errors
    ///
    /// Fails with `Validation` if `vorname` or `nachname` is empty, otherwise
    /// with whatever the backend call returns.
    pub async fn create(&self, person: NewPerson) -> Result<Person> {
        let person = person.validated()?;
        let created = self.api.create(&person).await?;
        log::info!("created person {} ({})", created.id, created.display_name());
        Ok(created)
    }

    /// # Errors
    ///
    /// Fails with `NotFound` for an unknown id.
    pub async fn read(&self, id: PersonId) -> Result<SteckbriefData> {
        self.api.steckbrief(id).await
    }

    /// Sends a merge-update of the keys in `update`.
    ///
    /// # Errors
    ///
    /// Fails with `Validation` for an empty update.
    pub async fn update(&self, id: PersonId, update: &PartialUpdate) -> Result<Person> {
        update.ensure_not_empty()?;
        let updated = self.api.update(id, update).await?;
        log::info!("updated person {id} ({} field(s))", update.len());
        Ok(updated)
    }

    pub async fn delete(&self, id: PersonId) -> Result<()> {
        self.api.delete(id).await?;
        log::info!("deleted person {id}");
        Ok(())
    }

    pub async fn person(&self, id: PersonId) -> Result<Person> {
        self.api.person(id).await
    }

    pub async fn list(&self) -> Result<Vec<Person>> {
        self.api.list().await
    }

    /// Ancestor tree of `id`, `depth` generations above the person.
    pub async fn ancestors(&self, id: PersonId, depth: u32) -> Result<AncestorNode> {
        self.api.ancestors(id, depth).await
    }
}
