//! The contract with the Personen backend.
//!
//! [`PersonApi`] is the seam every component talks through. The production
//! implementation is [`HttpPersonApi`](crate::HttpPersonApi); tests use an
//! in-memory fake.

use crate::{
    AncestorNode, NewPerson, PartialUpdate, Person, PersonId, Result, SearchResult, SteckbriefData,
};
use async_trait::async_trait;

/// One call per backend endpoint. Each call maps to exactly one request.
#[async_trait]
pub trait PersonApi: Send + Sync {
    /// `GET /api/personen/search/?q={query}`
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// `GET /api/personen/{id}/steckbrief/`
    ///
    /// Fails with [`SteckbriefError::NotFound`](crate::SteckbriefError::NotFound)
    /// when the backend answers 404.
    async fn steckbrief(&self, id: PersonId) -> Result<SteckbriefData>;

    /// `GET /api/personen/{id}/`
    async fn person(&self, id: PersonId) -> Result<Person>;

    /// `GET /api/personen/`
    async fn list(&self) -> Result<Vec<Person>>;

    /// `POST /api/personen/`
    async fn create(&self, person: &NewPerson) -> Result<Person>;

    /// `PUT /api/personen/{id}/` with only the changed keys.
    async fn update(&self, id: PersonId, update: &PartialUpdate) -> Result<Person>;

    /// `DELETE /api/personen/{id}/`
    async fn delete(&self, id: PersonId) -> Result<()>;

    /// `GET /api/personen/{id}/stammbaum-json/?tiefe={depth}`
    async fn ancestors(&self, id: PersonId, depth: u32) -> Result<AncestorNode>;

    /// Address of the family-tree PDF (`/api/stammbaum/{id}/pdf/?gen={n}`).
    ///
    /// The document is opened by the host, never fetched through this trait.
    fn stammbaum_pdf_url(&self, id: PersonId, generations: u32) -> Result<reqwest::Url>;
}
