//! Normalized platform records and the flattened report row

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of branch-name columns carried by each report row
pub const BRANCH_COLUMNS: usize = 5;

/// Application name used when a project belongs to no application
pub const NO_APPLICATION: &str = "No Application Name";

/// Key and value substituted when a project has no properties
pub const PLACEHOLDER_PROPERTY: (&str, &str) = ("none", "none");

/// An application grouping one or more projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ids of the projects this application contains
    #[serde(default)]
    pub project_ids: Vec<String>,
}

/// A scanned project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: String,
    /// Free-form properties; never empty once normalized
    pub properties: BTreeMap<String, String>,
    /// Link to the project's branch collection, if the platform sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches_link: Option<String>,
}

impl Project {
    /// Build a project, substituting the placeholder pair for empty properties
    #[must_use]
    pub fn new(
        id: String,
        name: String,
        project_type: String,
        mut properties: BTreeMap<String, String>,
        branches_link: Option<String>,
    ) -> Self {
        if properties.is_empty() {
            properties.insert(
                PLACEHOLDER_PROPERTY.0.to_string(),
                PLACEHOLDER_PROPERTY.1.to_string(),
            );
        }
        Self {
            id,
            name,
            project_type,
            properties,
            branches_link,
        }
    }
}

/// A branch belonging to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub project_id: String,
}

/// Whether a principal is an individual or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    #[serde(rename = "User")]
    User,
    #[serde(rename = "GroupName")]
    Group,
}

impl PrincipalKind {
    /// Title used in the final report's type column
    #[must_use]
    pub fn report_label(self) -> &'static str {
        match self {
            Self::User => "Individual User",
            Self::Group => "Group",
        }
    }

    /// Title used in the role-details export
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "GroupName",
        }
    }
}

/// A user or group holding a role on one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub project_id: String,
    pub project_name: String,
    pub kind: PrincipalKind,
    pub name: String,
    /// Empty for groups
    #[serde(default)]
    pub email: String,
}

/// One line of the final project access report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub application_name: String,
    pub project_name: String,
    pub project_id: String,
    pub principal_type: String,
    pub name: String,
    pub email: String,
    pub branch_names: [String; BRANCH_COLUMNS],
}

/// The four platform resources the pipeline collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Applications,
    Projects,
    Branches,
    RoleAssignments,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Applications,
        Resource::Projects,
        Resource::Branches,
        Resource::RoleAssignments,
    ];

    /// File name of the structured snapshot
    #[must_use]
    pub fn snapshot_file(self) -> &'static str {
        match self {
            Self::Applications => "applications.json",
            Self::Projects => "projects.json",
            Self::Branches => "branches.json",
            Self::RoleAssignments => "role_assignments.json",
        }
    }

    /// File name of the flattened tabular export
    #[must_use]
    pub fn table_file(self) -> &'static str {
        match self {
            Self::Applications => "applications.csv",
            Self::Projects => "project_properties.csv",
            Self::Branches => "branches.csv",
            Self::RoleAssignments => "user_group_role_details.csv",
        }
    }

    /// Key used in configuration and log fields
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Projects => "projects",
            Self::Branches => "branches",
            Self::RoleAssignments => "role_assignments",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "applications" => Ok(Self::Applications),
            "projects" => Ok(Self::Projects),
            "branches" => Ok(Self::Branches),
            "role_assignments" => Ok(Self::RoleAssignments),
            _ => Err(format!("Invalid resource: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_properties_get_placeholder() {
        let project = Project::new(
            "p1".to_string(),
            "web".to_string(),
            "sast".to_string(),
            BTreeMap::new(),
            None,
        );
        assert_eq!(project.properties.len(), 1);
        assert_eq!(project.properties.get("none"), Some(&"none".to_string()));
    }

    #[test]
    fn test_principal_kind_serialization() {
        let json = serde_json::to_string(&PrincipalKind::Group).unwrap();
        assert_eq!(json, "\"GroupName\"");
        let kind: PrincipalKind = serde_json::from_str("\"User\"").unwrap();
        assert_eq!(kind, PrincipalKind::User);
    }

    #[test]
    fn test_resource_from_str() {
        assert_eq!(
            "role-assignments".parse::<Resource>().unwrap(),
            Resource::RoleAssignments
        );
        assert_eq!("Projects".parse::<Resource>().unwrap(), Resource::Projects);
        assert!("users".parse::<Resource>().is_err());
    }
}
