//! Endpoint URL templates
//!
//! Every template carries a `{customer}` placeholder that is replaced by the
//! tenant identifier before use. The branch template also carries
//! `{offset}`, and the resource URN template carries `{project_id}`.

use crate::error::{ClientError, ClientResult};
use crate::pagination::PageUrl;
use serde::{Deserialize, Serialize};

const CUSTOMER: &str = "{customer}";
const OFFSET: &str = "{offset}";
const PROJECT_ID: &str = "{project_id}";

/// Unresolved templates, as read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTemplates {
    /// Password login endpoint
    pub auth_v1: String,
    /// Access-token login endpoint
    pub auth_v2: String,
    pub applications: String,
    pub projects: String,
    /// Branch listing with the page offset embedded in the URL
    pub branches: String,
    pub role_assignments: String,
    /// URN identifying a project as a role-assignment resource
    pub resource_urn: String,
}

/// Templates with the tenant substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth_v1: String,
    pub auth_v2: String,
    pub applications: String,
    pub projects: String,
    pub branches: String,
    pub role_assignments: String,
    resource_urn: String,
}

impl EndpointTemplates {
    /// Validate every template and substitute the tenant
    ///
    /// # Errors
    /// Returns `Configuration` if the tenant is blank or a template lacks a
    /// required placeholder
    pub fn resolve(&self, tenant: &str) -> ClientResult<Endpoints> {
        let tenant = tenant.trim();
        if tenant.is_empty() {
            return Err(ClientError::Configuration(
                "tenant identifier is not set".to_string(),
            ));
        }

        let url = |name: &str, template: &str| -> ClientResult<String> {
            require(name, template, CUSTOMER)?;
            Ok(template.replace(CUSTOMER, tenant))
        };

        require("branches", &self.branches, OFFSET)?;
        require("resource_urn", &self.resource_urn, PROJECT_ID)?;

        Ok(Endpoints {
            auth_v1: url("auth_v1", &self.auth_v1)?,
            auth_v2: url("auth_v2", &self.auth_v2)?,
            applications: url("applications", &self.applications)?,
            projects: url("projects", &self.projects)?,
            branches: url("branches", &self.branches)?,
            role_assignments: url("role_assignments", &self.role_assignments)?,
            resource_urn: self.resource_urn.replace(CUSTOMER, tenant),
        })
    }
}

fn require(name: &str, template: &str, placeholder: &str) -> ClientResult<()> {
    if template.contains(placeholder) {
        Ok(())
    } else {
        Err(ClientError::Configuration(format!(
            "endpoint '{name}' must contain {placeholder}: {template}"
        )))
    }
}

impl Endpoints {
    #[must_use]
    pub fn applications_pages(&self) -> PageUrl {
        PageUrl::Query(self.applications.clone())
    }

    #[must_use]
    pub fn projects_pages(&self) -> PageUrl {
        PageUrl::Query(self.projects.clone())
    }

    #[must_use]
    pub fn branches_pages(&self) -> PageUrl {
        PageUrl::Template(self.branches.clone())
    }

    /// URN used to filter role assignments down to one project
    #[must_use]
    pub fn resource_urn(&self, project_id: &str) -> String {
        self.resource_urn.replace(PROJECT_ID, project_id)
    }
}
