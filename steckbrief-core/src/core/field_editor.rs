//! Describes a single-field edit dialog and the value it hands back.
//!
//! The core decides what kind of editor a field needs and what it starts
//! with; presenting it is up to a [`FieldPrompt`] implementation.

use crate::{FieldValue, Geschlecht};
use async_trait::async_trait;
use chrono::NaiveDate;

/// One entry of a selection-list editor.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: FieldValue,
    pub label: String,
}

/// The editor a field is presented with.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text. The default for every key that is not recognised as a date.
    Text,
    /// Calendar-constrained date picker.
    Date,
    /// Tri-state toggle.
    Boolean,
    /// Fixed list of choices.
    Select(Vec<SelectOption>),
}

impl FieldKind {
    /// Picks the editor for `key` when the caller did not ask for one.
    ///
    /// Keys containing `datum` (e.g. `geburtsdatum`, `sterbedatum`) get the
    /// date editor; everything else is free text.
    #[must_use]
    pub fn infer(key: &str) -> Self {
        if key.to_lowercase().contains("datum") {
            Self::Date
        } else {
            Self::Text
        }
    }

    /// Selection list with the three [`Geschlecht`] values.
    #[must_use]
    pub fn geschlecht() -> Self {
        Self::Select(
            Geschlecht::ALL
                .into_iter()
                .map(|g| SelectOption {
                    value: FieldValue::Flag(g.into()),
                    label: g.label().to_string(),
                })
                .collect(),
        )
    }
}

/// Everything the dialog for one field needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub field_key: String,
    pub label: String,
    pub title: String,
    /// The value the editor starts with, already converted for `kind`.
    pub current_value: FieldValue,
    pub kind: FieldKind,
}

impl EditRequest {
    /// Builds a request with the editor inferred from `field_key`.
    #[must_use]
    pub fn new(field_key: impl Into<String>, label: impl Into<String>, current: FieldValue) -> Self {
        let field_key = field_key.into();
        let kind = FieldKind::infer(&field_key);
        let label = label.into();
        Self {
            title: format!("{label} bearbeiten"),
            current_value: seed(&kind, current),
            field_key,
            label,
            kind,
        }
    }

    /// Replaces the inferred editor and re-seeds the current value for it.
    #[must_use]
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.current_value = seed(&kind, self.current_value);
        self.kind = kind;
        self
    }
}

/// How an edit dialog was closed.
///
/// `Cancelled` never compares equal to a saved value, including an empty
/// text, a cleared date or an unknown flag.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Saved(FieldValue),
    Cancelled,
}

impl EditOutcome {
    #[must_use]
    pub fn into_saved(self) -> Option<FieldValue> {
        match self {
            Self::Saved(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Shows an [`EditRequest`] to the user and waits for the dialog to close.
#[async_trait]
pub trait FieldPrompt: Send + Sync {
    async fn prompt(&self, request: &EditRequest) -> EditOutcome;
}

fn seed(kind: &FieldKind, current: FieldValue) -> FieldValue {
    match (kind, current) {
        (FieldKind::Date, FieldValue::Text(text)) => FieldValue::Date(parse_date(&text)),
        (FieldKind::Date, date @ FieldValue::Date(_)) => date,
        (FieldKind::Date, _) => FieldValue::Date(None),
        (FieldKind::Boolean, FieldValue::Text(text)) => FieldValue::Flag(parse_flag(&text)),
        (FieldKind::Boolean, flag @ FieldValue::Flag(_)) => flag,
        (FieldKind::Boolean, _) => FieldValue::Flag(None),
        (_, other) => other,
    }
}

/// Reads `true`/`false`, `ja`/`nein` or `1`/`0`. Anything else is unknown.
fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "ja" | "1" => Some(true),
        "false" | "nein" | "0" => Some(false),
        _ => None,
    }
}

/// Reads a date given as ISO (`2024-03-15`), German (`15.03.2024`) or an
/// ISO timestamp. Unparseable or empty text yields `None`.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d.%m.%Y"))
        .ok()
        .or_else(|| {
            let day = text.get(..10)?;
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        })
}
