//! Outbound payloads: partial updates with an enumerated key set, and the
//! create request.

use crate::{FieldValue, Geschlecht, PersonId, Result, SteckbriefError};
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The person fields the backend accepts in `PUT /api/personen/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PersonField {
    Vorname,
    Nachname,
    Geburtsdatum,
    Geschlecht,
    VaterId,
    MutterId,
}

impl PersonField {
    pub const ALL: [PersonField; 6] = [
        Self::Vorname,
        Self::Nachname,
        Self::Geburtsdatum,
        Self::Geschlecht,
        Self::VaterId,
        Self::MutterId,
    ];

    /// The JSON key used on the wire.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Vorname => "vorname",
            Self::Nachname => "nachname",
            Self::Geburtsdatum => "geburtsdatum",
            Self::Geschlecht => "geschlecht",
            Self::VaterId => "vater_id",
            Self::MutterId => "mutter_id",
        }
    }

    /// Whether `value` has the shape this field stores.
    #[must_use]
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (Self::Vorname | Self::Nachname, FieldValue::Text(_))
                | (Self::Geburtsdatum, FieldValue::Date(_))
                | (Self::Geschlecht, FieldValue::Flag(_))
                | (Self::VaterId | Self::MutterId, FieldValue::Reference(_))
        )
    }

    fn is_required(self) -> bool {
        matches!(self, Self::Vorname | Self::Nachname)
    }
}

impl fmt::Display for PersonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PersonField {
    type Err = SteckbriefError;

    fn from_str(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| SteckbriefError::Validation(format!("Feld '{key}' kann nicht bearbeitet werden")))
    }
}

/// A merge-update carrying only the changed keys.
///
/// Every value is checked against its field's shape when it is set, so a
/// `PartialUpdate` that exists is always well-formed. It may still be empty;
/// [`PartialUpdate::ensure_not_empty`] guards the send path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    fields: BTreeMap<PersonField, FieldValue>,
}

impl PartialUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an update changing exactly one field.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Validation`] if the value does not fit the field.
    pub fn single(field: PersonField, value: FieldValue) -> Result<Self> {
        let mut update = Self::new();
        update.set(field, value)?;
        Ok(update)
    }

    /// Builds `{ vater_id | mutter_id: id | null }`.
    #[must_use]
    pub fn parent(field: PersonField, parent: Option<PersonId>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field, FieldValue::Reference(parent.filter(|id| *id != 0)));
        Self { fields }
    }

    /// Sets `field` to `value`, replacing any earlier value for that field.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Validation`] if the value has the wrong shape,
    /// or if a required name field would become empty.
    pub fn set(&mut self, field: PersonField, value: FieldValue) -> Result<()> {
        if !field.accepts(&value) {
            return Err(SteckbriefError::Validation(format!(
                "Ungültiger Wert für Feld '{field}'"
            )));
        }
        if field.is_required() {
            if let FieldValue::Text(s) = &value {
                if s.trim().is_empty() {
                    return Err(SteckbriefError::Validation(format!(
                        "Feld '{field}' darf nicht leer sein"
                    )));
                }
            }
        }
        let value = match value {
            FieldValue::Reference(Some(0)) => FieldValue::Reference(None),
            other => other,
        };
        self.fields.insert(field, value);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, field: PersonField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// # Errors
    ///
    /// Returns [`SteckbriefError::Validation`] if no field is set.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SteckbriefError::Validation(
                "Keine Daten zum Update angegeben".to_string(),
            ));
        }
        Ok(())
    }
}

impl Serialize for PartialUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

/// Body of `POST /api/personen/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPerson {
    pub vorname: String,
    pub nachname: String,
    pub geschlecht: Geschlecht,
    pub geburtsdatum: Option<NaiveDate>,
    pub vater_id: Option<PersonId>,
    pub mutter_id: Option<PersonId>,
}

impl NewPerson {
    #[must_use]
    pub fn new(vorname: impl Into<String>, nachname: impl Into<String>) -> Self {
        Self {
            vorname: vorname.into(),
            nachname: nachname.into(),
            geschlecht: Geschlecht::Unbekannt,
            geburtsdatum: None,
            vater_id: None,
            mutter_id: None,
        }
    }

    #[must_use]
    pub fn with_geschlecht(mut self, geschlecht: Geschlecht) -> Self {
        self.geschlecht = geschlecht;
        self
    }

    #[must_use]
    pub fn with_geburtsdatum(mut self, date: NaiveDate) -> Self {
        self.geburtsdatum = Some(date);
        self
    }

    /// Checks the required name fields and normalizes `0` parent ids to none.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Validation`] naming the first empty required field.
    pub fn validated(mut self) -> Result<Self> {
        for (label, value) in [("Vorname", &self.vorname), ("Nachname", &self.nachname)] {
            if value.trim().is_empty() {
                return Err(SteckbriefError::Validation(format!(
                    "{label} darf nicht leer sein"
                )));
            }
        }
        self.vater_id = self.vater_id.filter(|id| *id != 0);
        self.mutter_id = self.mutter_id.filter(|id| *id != 0);
        Ok(self)
    }
}
