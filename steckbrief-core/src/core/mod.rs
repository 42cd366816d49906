//! Internal domain modules for the Steckbrief core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod api;
pub mod debounce;
pub mod error;
pub mod field_editor;
pub mod finder;
pub mod http;
pub mod interaction;
pub mod notify;
pub mod person;
pub mod records;
pub mod relationship;
pub mod settings;
pub mod store;
pub mod update;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

#[doc(inline)]
pub use api::PersonApi;
#[doc(inline)]
pub use debounce::{DebounceConfig, SearchDebouncer};
#[doc(inline)]
pub use error::{Result, SteckbriefError};
#[doc(inline)]
pub use field_editor::{EditOutcome, EditRequest, FieldKind, FieldPrompt, SelectOption};
#[doc(inline)]
pub use finder::PersonFinder;
#[doc(inline)]
pub use http::HttpPersonApi;
#[doc(inline)]
pub use interaction::{Confirm, Confirmation, Decision, DocumentOpener};
#[cfg(feature = "system-opener")]
#[doc(inline)]
pub use interaction::SystemOpener;
#[doc(inline)]
pub use notify::{Notice, NoticeKind, NullObserver, ProfileObserver, ResultList};
#[doc(inline)]
pub use person::{
    AncestorNode, Eltern, FieldValue, Geschlecht, Person, PersonId, PersonRef, Relative,
    SearchResult, SteckbriefData,
};
#[doc(inline)]
pub use records::PersonRecords;
#[doc(inline)]
pub use relationship::{AssignState, ParentRole, RelationshipEditor};
#[doc(inline)]
pub use settings::{
    load_settings, load_settings_from, save_settings, save_settings_to, settings_file_path,
    ClientSettings,
};
#[doc(inline)]
pub use store::{LoadOutcome, ProfileStore};
#[doc(inline)]
pub use update::{NewPerson, PartialUpdate, PersonField};
#[doc(inline)]
pub use view::ProfileView;
