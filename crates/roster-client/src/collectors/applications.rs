//! Applications collector

use super::{id_string, Relationship};
use roster_core::Application;
use serde::Deserialize;
use serde_json::Value;

/// Applications are listed 25 per page
pub const PAGE_SIZE: usize = 25;

#[derive(Deserialize)]
struct RawApplication {
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
    #[serde(default)]
    description: Option<String>,
}

#[derive(Default, Deserialize)]
struct Relationships {
    #[serde(default)]
    projects: Relationship,
}

/// Map one raw application; the projects relationship becomes a flat id list
pub fn normalize(raw: Value) -> Option<Application> {
    let raw: RawApplication = serde_json::from_value(raw).ok()?;
    Some(Application {
        id: raw.id,
        name: raw.attributes.name.unwrap_or_default(),
        description: raw.attributes.description.unwrap_or_default(),
        project_ids: raw.relationships.projects.ids(),
    })
}
