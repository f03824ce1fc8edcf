//! Role-assignments collector
//!
//! One request per project, filtered by the project's resource URN. The
//! platform answers with a compound document whose `included` array holds
//! the expanded users and groups. These requests are not paginated; when a
//! response advertises a next page the result is logged as truncated.

use crate::auth::SessionToken;
use crate::endpoints::Endpoints;
use crate::transport::HttpTransport;
use roster_core::{Principal, PrincipalKind, Project};
use serde::Deserialize;

/// Relationships expanded into the `included` array
pub const INCLUDE: &str = "role,user,group";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoleDocument {
    #[serde(default)]
    included: Vec<Included>,
    #[serde(default)]
    links: Option<DocumentLinks>,
}

#[derive(Debug, Deserialize)]
struct Included {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: PrincipalAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentLinks {
    #[serde(default)]
    next: Option<String>,
}

impl PrincipalAttributes {
    /// Display name, then first and last name, then email
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            full
        }
    }
}

impl RoleDocument {
    /// Whether the platform reported more assignments than it returned
    pub(crate) fn is_truncated(&self) -> bool {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_deref())
            .is_some_and(|next| !next.is_empty())
    }

    /// Bucket included resources into users then groups, tagged with the project
    pub(crate) fn principals(&self, project: &Project) -> Vec<Principal> {
        let mut users = Vec::new();
        let mut groups = Vec::new();

        for resource in &self.included {
            let kind = match resource.kind.to_lowercase().as_str() {
                "user" | "users" => PrincipalKind::User,
                "group" | "groups" => PrincipalKind::Group,
                _ => continue,
            };
            let name = resource.attributes.display_name();
            if name.is_empty() {
                tracing::debug!(project_id = %project.id, kind = kind.as_str(), "Skipped unnamed principal");
                continue;
            }
            let principal = Principal {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                kind,
                name,
                email: match kind {
                    PrincipalKind::User => resource.attributes.email.clone().unwrap_or_default(),
                    PrincipalKind::Group => String::new(),
                },
            };
            match kind {
                PrincipalKind::User => users.push(principal),
                PrincipalKind::Group => groups.push(principal),
            }
        }

        users.extend(groups);
        users
    }
}

/// Fetch the principals holding a role on one project
///
/// Failures are logged and yield no principals for that project.
pub(crate) async fn fetch_for_project(
    transport: &HttpTransport,
    token: &SessionToken,
    endpoints: &Endpoints,
    project: &Project,
) -> Vec<Principal> {
    let query = vec![
        (
            "filter[resource]".to_string(),
            endpoints.resource_urn(&project.id),
        ),
        ("include".to_string(), INCLUDE.to_string()),
    ];

    let response = match transport
        .get(&endpoints.role_assignments, token, &query)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(project_id = %project.id, error = %e, "Role assignment request failed");
            return Vec::new();
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(project_id = %project.id, %status, body = %body, "Role assignment request rejected");
        return Vec::new();
    }

    let document: RoleDocument = match response.json().await {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(project_id = %project.id, error = %e, "Role assignment response was not a JSON:API document");
            return Vec::new();
        }
    };

    if document.is_truncated() {
        tracing::warn!(
            project_id = %project.id,
            "Role assignments span more than one page; only the first page was read"
        );
    }

    let principals = document.principals(project);
    tracing::debug!(project_id = %project.id, principals = principals.len(), "Fetched role assignments");
    principals
}
