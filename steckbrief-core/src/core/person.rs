//! Wire types for person records, the Steckbrief read model and field values.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Backend-assigned identity of a person record. The client never invents one.
pub type PersonId = i64;

/// Tri-state gender as stored by the backend (`true`, `false` or `null`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Geschlecht {
    Maennlich,
    Weiblich,
    #[default]
    Unbekannt,
}

impl From<Option<bool>> for Geschlecht {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Maennlich,
            Some(false) => Self::Weiblich,
            None => Self::Unbekannt,
        }
    }
}

impl From<Geschlecht> for Option<bool> {
    fn from(value: Geschlecht) -> Self {
        match value {
            Geschlecht::Maennlich => Some(true),
            Geschlecht::Weiblich => Some(false),
            Geschlecht::Unbekannt => None,
        }
    }
}

impl Geschlecht {
    pub const ALL: [Geschlecht; 3] = [Self::Maennlich, Self::Weiblich, Self::Unbekannt];

    /// Label shown in selection lists.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Maennlich => "Männlich",
            Self::Weiblich => "Weiblich",
            Self::Unbekannt => "Unbekannt",
        }
    }
}

/// A full person record as returned by `GET /api/personen/{id}/` and embedded
/// in the Steckbrief.
///
/// Keys the client has no typed slot for (e.g. `created_at`, additional date
/// fields) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub vorname: String,
    pub nachname: String,
    #[serde(default)]
    pub geburtsdatum: Option<NaiveDate>,
    #[serde(default)]
    pub geschlecht: Geschlecht,
    #[serde(default, deserialize_with = "nonzero_id")]
    pub vater_id: Option<PersonId>,
    #[serde(default, deserialize_with = "nonzero_id")]
    pub mutter_id: Option<PersonId>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Person {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.vorname, self.nachname)
    }

    /// Returns the current value of the field stored under `key`, or `None`
    /// if the record has no such key.
    ///
    /// Untyped extra keys are returned as they arrived: strings as
    /// [`FieldValue::Text`], booleans and `null` as [`FieldValue::Flag`],
    /// integers as [`FieldValue::Reference`]. Other JSON shapes are not
    /// editable and yield `None`.
    #[must_use]
    pub fn field_value(&self, key: &str) -> Option<FieldValue> {
        match key {
            "vorname" => Some(FieldValue::Text(self.vorname.clone())),
            "nachname" => Some(FieldValue::Text(self.nachname.clone())),
            "geburtsdatum" => Some(FieldValue::Date(self.geburtsdatum)),
            "geschlecht" => Some(FieldValue::Flag(self.geschlecht.into())),
            "vater_id" => Some(FieldValue::Reference(self.vater_id)),
            "mutter_id" => Some(FieldValue::Reference(self.mutter_id)),
            other => match self.extra.get(other)? {
                serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
                serde_json::Value::Bool(b) => Some(FieldValue::Flag(Some(*b))),
                serde_json::Value::Null => Some(FieldValue::Flag(None)),
                serde_json::Value::Number(n) => n.as_i64().map(|id| FieldValue::Reference(Some(id))),
                _ => None,
            },
        }
    }
}

/// Lightweight projection of a person: identity plus name.
///
/// Used for autocomplete lists and for the parent entries of a Steckbrief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
    pub vorname: String,
    pub nachname: String,
}

/// One entry of a search result list. Order is whatever the backend returned.
pub type SearchResult = PersonRef;

impl PersonRef {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.vorname, self.nachname)
    }
}

/// A sibling or child listed on a Steckbrief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relative {
    pub id: PersonId,
    pub vorname: String,
    pub nachname: String,
    #[serde(default)]
    pub geburtsdatum: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Eltern {
    #[serde(default)]
    pub vater: Option<PersonRef>,
    #[serde(default)]
    pub mutter: Option<PersonRef>,
}

/// The profile read model returned by `GET /api/personen/{id}/steckbrief/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteckbriefData {
    pub person: Person,
    #[serde(default)]
    pub eltern: Eltern,
    #[serde(default)]
    pub geschwister: Vec<Relative>,
    #[serde(default)]
    pub kinder: Vec<Relative>,
    /// Derived display fields the backend may add in the future.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A node of the recursive ancestor tree from `/stammbaum-json/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorNode {
    #[serde(default)]
    pub vater: Option<Box<AncestorNode>>,
    #[serde(default)]
    pub mutter: Option<Box<AncestorNode>>,
    #[serde(flatten)]
    pub person: Person,
}

impl AncestorNode {
    /// Number of generations in this tree, counting the root person as one.
    #[must_use]
    pub fn generations(&self) -> usize {
        let vater = self.vater.as_ref().map_or(0, |n| n.generations());
        let mutter = self.mutter.as_ref().map_or(0, |n| n.generations());
        1 + vater.max(mutter)
    }
}

/// A typed value for a single person field.
///
/// Serializes to the plain JSON the backend expects: a string, an ISO date,
/// a boolean, an integer id, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(Option<NaiveDate>),
    Flag(Option<bool>),
    Reference(Option<PersonId>),
}

/// Treats a parent id of `0` the same as a missing parent.
fn nonzero_id<'de, D>(deserializer: D) -> std::result::Result<Option<PersonId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PersonId>::deserialize(deserializer)?.filter(|id| *id != 0))
}
