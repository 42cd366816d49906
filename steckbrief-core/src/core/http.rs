//! reqwest-backed [`PersonApi`] talking JSON to the Personen backend.

use crate::{
    AncestorNode, ClientSettings, NewPerson, PartialUpdate, Person, PersonApi, PersonId, Result,
    SearchResult, SteckbriefData, SteckbriefError,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the Personen REST API.
///
/// Every request carries the timeout from [`ClientSettings`]; a request that
/// runs out of time fails with [`SteckbriefError::Timeout`], distinct from
/// other transport failures.
pub struct HttpPersonApi {
    client: Client,
    base: Url,
    timeout_secs: u64,
}

impl HttpPersonApi {
    /// Builds a client for `settings.api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Config`] if the settings fail
    /// [`ClientSettings::validate`], the base URL does not parse, or the
    /// underlying client cannot be constructed.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        settings.validate()?;
        let mut raw = settings.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| SteckbriefError::Config(format!("invalid apiBaseUrl '{raw}': {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| SteckbriefError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base,
            timeout_secs: settings.request_timeout_secs,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| SteckbriefError::Config(format!("invalid endpoint '{path}': {e}")))
    }

    fn transport_error(&self, e: reqwest::Error) -> SteckbriefError {
        if e.is_timeout() {
            SteckbriefError::Timeout(self.timeout_secs)
        } else {
            SteckbriefError::Network(e.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SteckbriefError::Validation(format!("Unerwartetes Antwortformat: {e}")))
    }
}

#[async_trait]
impl PersonApi for HttpPersonApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = self.endpoint("api/personen/search/")?;
        log::debug!("GET {url} q={query:?}");
        let response = self.send(self.client.get(url).query(&[("q", query)])).await?;
        self.read_json(response).await
    }

    async fn steckbrief(&self, id: PersonId) -> Result<SteckbriefData> {
        let url = self.endpoint(&format!("api/personen/{id}/steckbrief/"))?;
        log::debug!("GET {url}");
        let response = self.send(self.client.get(url)).await.map_err(|e| not_found(e, id))?;
        self.read_json(response).await
    }

    async fn person(&self, id: PersonId) -> Result<Person> {
        let url = self.endpoint(&format!("api/personen/{id}/"))?;
        log::debug!("GET {url}");
        let response = self.send(self.client.get(url)).await.map_err(|e| not_found(e, id))?;
        self.read_json(response).await
    }

    async fn list(&self) -> Result<Vec<Person>> {
        let url = self.endpoint("api/personen/")?;
        log::debug!("GET {url}");
        let response = self.send(self.client.get(url)).await?;
        self.read_json(response).await
    }

    async fn create(&self, person: &NewPerson) -> Result<Person> {
        let url = self.endpoint("api/personen/")?;
        log::debug!("POST {url}");
        let response = self.send(self.client.post(url).json(person)).await?;
        self.read_json(response).await
    }

    async fn update(&self, id: PersonId, update: &PartialUpdate) -> Result<Person> {
        let url = self.endpoint(&format!("api/personen/{id}/"))?;
        log::debug!("PUT {url} ({} fields)", update.len());
        let response = self
            .send(self.client.put(url).json(update))
            .await
            .map_err(|e| not_found(e, id))?;
        self.read_json(response).await
    }

    async fn delete(&self, id: PersonId) -> Result<()> {
        let url = self.endpoint(&format!("api/personen/{id}/"))?;
        log::debug!("DELETE {url}");
        self.send(self.client.delete(url)).await.map_err(|e| not_found(e, id))?;
        Ok(())
    }

    async fn ancestors(&self, id: PersonId, depth: u32) -> Result<AncestorNode> {
        let url = self.endpoint(&format!("api/personen/{id}/stammbaum-json/"))?;
        log::debug!("GET {url} tiefe={depth}");
        let response = self
            .send(self.client.get(url).query(&[("tiefe", depth)]))
            .await
            .map_err(|e| not_found(e, id))?;
        self.read_json(response).await
    }

    fn stammbaum_pdf_url(&self, id: PersonId, generations: u32) -> Result<Url> {
        let mut url = self.endpoint(&format!("api/stammbaum/{id}/pdf/"))?;
        url.query_pairs_mut().append_pair("gen", &generations.to_string());
        Ok(url)
    }
}

/// Turns a non-2xx response into a [`SteckbriefError::Server`], lifting the
/// backend's `{"detail": ...}` message when there is one.
fn server_error(status: u16, body: &str) -> SteckbriefError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string());
    SteckbriefError::Server { status, detail }
}

fn not_found(e: SteckbriefError, id: PersonId) -> SteckbriefError {
    match e {
        SteckbriefError::Server { status: 404, .. } => SteckbriefError::NotFound(id),
        other => other,
    }
}
