//! Branches collector
//!
//! Branches come from their own endpoint whose offset is part of the URL
//! template. Each record names its owning project through a relationship.

use super::Relationship;
use roster_core::Branch;
use serde::Deserialize;
use serde_json::Value;

/// Branches are listed 500 per page
pub const PAGE_SIZE: usize = 500;

#[derive(Deserialize)]
struct RawBranch {
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    relationships: Relationships,
}

#[derive(Default, Deserialize)]
struct Attributes {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Default, Deserialize)]
struct Relationships {
    #[serde(default)]
    project: Relationship,
}

/// Map one raw branch; records without an owning project are rejected
pub fn normalize(raw: Value) -> Option<Branch> {
    let raw: RawBranch = serde_json::from_value(raw).ok()?;
    Some(Branch {
        name: raw.attributes.name.unwrap_or_default(),
        project_id: raw.relationships.project.id()?,
    })
}
