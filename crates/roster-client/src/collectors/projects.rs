//! Projects collector

use super::{id_string, plain_text, Relationship};
use roster_core::Project;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Projects are listed 500 per page
pub const PAGE_SIZE: usize = 500;

#[derive(Deserialize)]
struct RawProject {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    relationships: Relationships,
}

#[derive(Default, Deserialize)]
struct Attributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    project_type: Option<String>,
    #[serde(default)]
    properties: Option<BTreeMap<String, Value>>,
}

#[derive(Default, Deserialize)]
struct Relationships {
    #[serde(default)]
    branches: Relationship,
}

/// Map one raw project; property values are flattened to text
pub fn normalize(raw: Value) -> Option<Project> {
    let raw: RawProject = serde_json::from_value(raw).ok()?;
    let properties = raw
        .attributes
        .properties
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), plain_text(value)))
        .collect();

    Some(Project::new(
        raw.id,
        raw.attributes.name.unwrap_or_default(),
        raw.attributes.project_type.unwrap_or_default(),
        properties,
        raw.relationships.branches.related(),
    ))
}
