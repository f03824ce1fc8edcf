//! Resource collectors
//!
//! Each submodule maps raw JSON:API records for one resource into the
//! normalized `roster_core` shape.

pub mod applications;
pub mod branches;
pub mod projects;
pub mod role_assignments;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A JSON:API relationship object
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Relationship {
    #[serde(default)]
    data: Option<Linkage>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Linkage {
    One(Identifier),
    Many(Vec<Identifier>),
}

#[derive(Debug, Deserialize)]
struct Identifier {
    #[serde(deserialize_with = "id_string")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    related: Option<String>,
}

impl Relationship {
    /// Ids of a to-many relationship (or the single id of a to-one)
    pub(crate) fn ids(&self) -> Vec<String> {
        match &self.data {
            Some(Linkage::Many(ids)) => ids.iter().map(|i| i.id.clone()).collect(),
            Some(Linkage::One(one)) => vec![one.id.clone()],
            None => Vec::new(),
        }
    }

    /// Id of a to-one relationship
    pub(crate) fn id(&self) -> Option<String> {
        match &self.data {
            Some(Linkage::One(one)) => Some(one.id.clone()),
            Some(Linkage::Many(ids)) => ids.first().map(|i| i.id.clone()),
            None => None,
        }
    }

    /// The `links.related` URL, if any
    pub(crate) fn related(&self) -> Option<String> {
        self.links.as_ref()?.related.clone()
    }
}

/// Accept ids sent either as strings or as numbers
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

/// Render a JSON scalar as plain text
pub(crate) fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
