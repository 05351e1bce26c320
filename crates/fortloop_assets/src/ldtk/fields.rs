//! Custom field extraction.
//!
//! LDtk stores custom fields as a list of `{ __identifier, __type, __value }`
//! instances. [`collect`] folds the list into a JSON object keyed by
//! identifier and lets serde map it onto a user struct, so a level with
//! fields `Float` and `Multilines` deserializes into
//!
//! ```
//! #[derive(serde::Deserialize)]
//! struct LevelNotes {
//!     #[serde(rename = "Float")]
//!     float: f32,
//!     #[serde(rename = "Multilines")]
//!     multilines: Option<String>,
//! }
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::FieldInstance;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Failed to convert custom fields: {0}")]
    Convert(#[from] serde_json::Error),

    #[error("Duplicate field identifier: {0}")]
    Duplicate(String),
}

/// Value of an `EntityRef` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_iid: String,
    #[serde(default)]
    pub layer_iid: String,
    #[serde(default)]
    pub level_iid: String,
    #[serde(default)]
    pub world_iid: String,
}

/// Value of a `Tile` field and of an entity's editor tile: a rectangle
/// inside a tileset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRect {
    pub tileset_uid: i64,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

pub(super) fn find<'a>(fields: &'a [FieldInstance], identifier: &str) -> Option<&'a serde_json::Value> {
    fields
        .iter()
        .find(|field| field.identifier == identifier)
        .map(|field| &field.value)
}

pub(super) fn collect<T: DeserializeOwned>(fields: &[FieldInstance]) -> Result<T, FieldError> {
    let mut object = serde_json::Map::with_capacity(fields.len());
    for field in fields {
        if object
            .insert(field.identifier.clone(), field.value.clone())
            .is_some()
        {
            return Err(FieldError::Duplicate(field.identifier.clone()));
        }
    }
    Ok(serde_json::from_value(serde_json::Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ldtk::{Level, Project};

    #[derive(Debug, Deserialize)]
    struct LevelNotes {
        #[serde(rename = "Float")]
        float: f32,
        #[serde(rename = "Multilines")]
        multilines: Option<String>,
        #[serde(rename = "Tile", default)]
        tile: Vec<TileRect>,
    }

    fn field(identifier: &str, field_type: &str, value: serde_json::Value) -> FieldInstance {
        FieldInstance {
            identifier: identifier.to_string(),
            field_type: field_type.to_string(),
            value,
        }
    }

    #[test]
    fn test_level_fields_into_struct() {
        let project = Project::from_slice(crate::ldtk::tests::PROJECT.as_bytes()).expect("parse");
        let level: &Level = &project.worlds[0].levels[0];

        let notes: LevelNotes = level.fields().expect("fields");
        assert_eq!(notes.float, 1.5);
        assert_eq!(notes.multilines.as_deref(), Some("a\nb"));
        assert!(notes.tile.is_empty());
    }

    #[test]
    fn test_tile_array_field() {
        let fields = vec![
            field("Float", "Float", json!(0.25)),
            field("Multilines", "String", serde_json::Value::Null),
            field(
                "Tile",
                "Array<Tile>",
                json!([
                    { "tilesetUid": 1, "x": 16, "y": 0, "w": 16, "h": 16 },
                    { "tilesetUid": 1, "x": 32, "y": 16, "w": 16, "h": 16 }
                ]),
            ),
        ];

        let notes: LevelNotes = collect(&fields).expect("fields");
        assert_eq!(notes.multilines, None);
        assert_eq!(notes.tile.iter().map(|t| t.x).collect::<Vec<_>>(), vec![16, 32]);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let fields = vec![field("Float", "Float", json!("not a number"))];
        let result: Result<LevelNotes, _> = collect(&fields);
        assert!(matches!(result, Err(FieldError::Convert(_))));
    }

    #[test]
    fn test_duplicate_identifier_is_an_error() {
        let fields = vec![
            field("Float", "Float", json!(1.0)),
            field("Float", "Float", json!(2.0)),
        ];
        let result: Result<LevelNotes, _> = collect(&fields);
        assert!(matches!(result, Err(FieldError::Duplicate(name)) if name == "Float"));
    }

    #[test]
    fn test_find_field() {
        let fields = vec![field("Speed", "Int", json!(3))];
        assert_eq!(find(&fields, "Speed"), Some(&json!(3)));
        assert_eq!(find(&fields, "Missing"), None);
    }
}
