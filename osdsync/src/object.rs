//! Wire and declarative forms of a saved object.
//!
//! [`SavedObject`] is what the dashboards API sends and receives: attributes are
//! a JSON object. [`DeclaredObject`] is the form kept in desired state: the
//! attributes are an opaque JSON string, so comparing desired and observed
//! state is a plain string comparison.

use osdsync_core::{Error, FieldViolation, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Saved object type whose `fields` attribute is derived by the server.
pub const INDEX_PATTERN_TYPE: &str = "index-pattern";

/// Attribute of an index pattern holding the server computed field list.
pub const INDEX_PATTERN_FIELDS: &str = "fields";

/// A typed link from one saved object to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Id of the referenced object.
    pub id: String,
    /// Name of the reference inside the referencing object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type of the referenced object.
    #[serde(rename = "type")]
    pub object_type: String,
}

/// Saved object as exchanged with the dashboards API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    /// Type of the object, e.g. `search` or `index-pattern`.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Caller assigned id.
    pub id: String,
    /// Attributes of the object.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Map<String, Value>,
    /// References to other objects. Order is kept as received.
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
}

/// Body of a save request. Type and id travel in the path.
#[derive(Debug, Serialize)]
pub struct SavePayload<'a> {
    /// Attributes to store.
    pub attributes: &'a Map<String, Value>,
    /// References to store.
    pub references: &'a [Reference],
}

/// Saved object as declared in desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredObject {
    /// Type of the object.
    pub object_type: String,
    /// Caller assigned id.
    pub id: String,
    /// Attributes encoded as a JSON object string.
    pub attributes: String,
    /// References to other objects.
    pub references: Vec<Reference>,
}

impl SavedObject {
    /// Create a saved object without references.
    pub fn new(object_type: &str, id: &str, attributes: Map<String, Value>) -> Self {
        Self {
            object_type: object_type.to_string(),
            id: id.to_string(),
            attributes,
            references: Vec::new(),
        }
    }

    /// Set the references.
    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    /// Build the body of a save request.
    pub fn payload(&self) -> SavePayload<'_> {
        SavePayload {
            attributes: &self.attributes,
            references: &self.references,
        }
    }

    /// Check type and id before any request is built.
    pub fn validate(&self) -> Result<()> {
        validate_identity(&self.object_type, &self.id)
    }

    /// Drop the server computed field list of an index pattern.
    ///
    /// Objects of any other type are left untouched.
    pub fn strip_index_pattern_fields(&mut self) {
        if self.object_type == INDEX_PATTERN_TYPE {
            self.attributes.remove(INDEX_PATTERN_FIELDS);
        }
    }
}

impl Reference {
    /// Create a reference without a name.
    pub fn new(object_type: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            object_type: object_type.to_string(),
        }
    }

    /// Set the reference name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl TryFrom<DeclaredObject> for SavedObject {
    type Error = Error;

    /// An empty attributes string is read as an empty object.
    fn try_from(obj: DeclaredObject) -> Result<Self> {
        let mut violations = identity_violations(&obj.object_type, &obj.id);

        let attributes = if obj.attributes.trim().is_empty() {
            Some(Map::new())
        } else {
            match serde_json::from_str::<Value>(&obj.attributes) {
                Ok(Value::Object(map)) => Some(map),
                Ok(_) => {
                    violations.push(FieldViolation::new(
                        "attributes",
                        "must be a JSON object",
                    ));
                    None
                }
                Err(e) => {
                    violations.push(FieldViolation::new(
                        "attributes",
                        format!("is not valid JSON: {e}"),
                    ));
                    None
                }
            }
        };

        for (idx, r) in obj.references.iter().enumerate() {
            if r.id.is_empty() {
                violations.push(FieldViolation::new(
                    format!("references[{idx}].id"),
                    "must not be empty",
                ));
            }
            if r.object_type.is_empty() {
                violations.push(FieldViolation::new(
                    format!("references[{idx}].type"),
                    "must not be empty",
                ));
            }
        }

        match attributes {
            Some(attributes) if violations.is_empty() => Ok(SavedObject {
                object_type: obj.object_type,
                id: obj.id,
                attributes,
                references: obj.references,
            }),
            _ => Err(Error::validation_failed(violations)),
        }
    }
}

impl TryFrom<SavedObject> for DeclaredObject {
    type Error = Error;

    /// Attributes are rendered with keys in sorted order.
    fn try_from(obj: SavedObject) -> Result<Self> {
        let attributes = serde_json::to_string(&obj.attributes).map_err(|e| {
            Error::unexpected(format!(
                "cannot encode attributes of {}/{}",
                obj.object_type, obj.id
            ))
            .with_source(e)
        })?;

        Ok(DeclaredObject {
            object_type: obj.object_type,
            id: obj.id,
            attributes,
            references: obj.references,
        })
    }
}

/// Reject an empty type or id.
pub(crate) fn validate_identity(object_type: &str, id: &str) -> Result<()> {
    let violations = identity_violations(object_type, id);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::validation_failed(violations))
    }
}

fn identity_violations(object_type: &str, id: &str) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if object_type.is_empty() {
        violations.push(FieldViolation::new("type", "must not be empty"));
    }
    if id.is_empty() {
        violations.push(FieldViolation::new("id", "must not be empty"));
    }
    violations
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
