//! Client core for Steckbrief, a person-records and family-tree application.
//!
//! The primary entry point is [`ProfileView`], which owns the state of one
//! profile view: the displayed person, the main search and the parent
//! assignment slots. All backend traffic goes through the [`PersonApi`]
//! trait; [`HttpPersonApi`] is the REST implementation.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    api::PersonApi,
    debounce::{DebounceConfig, SearchDebouncer},
    error::{Result, SteckbriefError},
    field_editor::{EditOutcome, EditRequest, FieldKind, FieldPrompt, SelectOption},
    finder::PersonFinder,
    http::HttpPersonApi,
    interaction::{Confirm, Confirmation, Decision, DocumentOpener},
    notify::{Notice, NoticeKind, NullObserver, ProfileObserver, ResultList},
    person::{
        AncestorNode, Eltern, FieldValue, Geschlecht, Person, PersonId, PersonRef, Relative,
        SearchResult, SteckbriefData,
    },
    records::PersonRecords,
    relationship::{AssignState, ParentRole, RelationshipEditor},
    settings::{
        load_settings, load_settings_from, save_settings, save_settings_to, settings_file_path,
        ClientSettings,
    },
    store::{LoadOutcome, ProfileStore},
    update::{NewPerson, PartialUpdate, PersonField},
    view::ProfileView,
};

#[cfg(feature = "system-opener")]
#[doc(inline)]
pub use crate::core::interaction::SystemOpener;
