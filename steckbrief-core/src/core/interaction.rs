//! User decisions the core has to wait for, and handing documents to the host.
//!
//! Destructive operations go through an explicit two-step exchange: the core
//! describes what it is about to do as a [`Confirmation`], awaits the answer
//! from a [`Confirm`] implementation, and only proceeds on `true`.

use crate::{ParentRole, PersonId, Result};
use async_trait::async_trait;
use reqwest::Url;

/// A destructive action awaiting the user's approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeletePerson { id: PersonId, name: String },
    RemoveParent { role: ParentRole, name: Option<String> },
}

impl Confirmation {
    /// The question to put to the user.
    #[must_use]
    pub fn question(&self) -> String {
        match self {
            Self::DeletePerson { name, .. } => format!("Person „{name}“ wirklich löschen?"),
            Self::RemoveParent { role, name: Some(name) } => {
                format!("Zuordnung {} „{name}“ wirklich entfernen?", role.genitive())
            }
            Self::RemoveParent { .. } => "Zuordnung dieses Elternteils wirklich entfernen?".to_string(),
        }
    }
}

/// Asks the user to approve a [`Confirmation`].
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, request: &Confirmation) -> bool;
}

/// What happened to a confirmation-gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The user agreed and the request succeeded.
    Applied,
    /// The user declined; nothing was sent.
    Declined,
}

/// Opens a URL outside the view (a browser tab, the system PDF viewer).
pub trait DocumentOpener: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the host refuses to open the URL.
    fn open(&self, url: &Url) -> Result<()>;
}

/// Opens URLs with the operating system's default handler.
#[cfg(feature = "system-opener")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

#[cfg(feature = "system-opener")]
impl DocumentOpener for SystemOpener {
    fn open(&self, url: &Url) -> Result<()> {
        log::info!("opening {url}");
        open::that(url.as_str())?;
        Ok(())
    }
}
