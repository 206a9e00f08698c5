//! Value held by a reference field of a form

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::reference::ReferenceEntity;

/// What a combo-box field currently contains.
///
/// While the user types, the field holds raw text; once a candidate is picked
/// it holds the entity itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    RawText(String),
    Selected(ReferenceEntity),
}

impl FieldValue {
    /// Text typed by the user; an empty string collapses to `Empty`
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::RawText(value)
        }
    }

    /// String the candidate filter compares against
    pub fn query(&self) -> &str {
        match self {
            FieldValue::Empty => "",
            FieldValue::RawText(text) => text,
            FieldValue::Selected(entity) => &entity.name,
        }
    }

    pub fn selected(&self) -> Option<&ReferenceEntity> {
        match self {
            FieldValue::Selected(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, FieldValue::Selected(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl From<Option<ReferenceEntity>> for FieldValue {
    fn from(entity: Option<ReferenceEntity>) -> Self {
        entity.map_or(FieldValue::Empty, FieldValue::Selected)
    }
}

// On the wire a field is "" when empty, a string while typed, or the nested
// entity object once selected.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Empty => serializer.serialize_str(""),
            FieldValue::RawText(text) => serializer.serialize_str(text),
            FieldValue::Selected(entity) => entity.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireFieldValue {
    Text(String),
    Entity(ReferenceEntity),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<WireFieldValue>::deserialize(deserializer)? {
            None => FieldValue::Empty,
            Some(WireFieldValue::Text(text)) => FieldValue::text(text),
            Some(WireFieldValue::Entity(entity)) => FieldValue::Selected(entity),
        })
    }
}
