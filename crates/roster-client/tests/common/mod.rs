//! Shared fixtures for client tests against a mock platform

#![allow(dead_code)]

use roster_client::{
    ClientSettings, Credentials, EndpointTemplates, Endpoints, HttpTransport, PlatformClient,
    RetryPolicy, SessionToken,
};
use secrecy::Secret;
use serde_json::{json, Value};
use std::time::Duration;

pub const TENANT: &str = "acme";
pub const TOKEN: &str = "session-token";

/// Templates pointing at the mock server, tenant as a path segment
pub fn templates(base: &str) -> EndpointTemplates {
    EndpointTemplates {
        auth_v1: format!("{base}/{{customer}}/api/v1/auth"),
        auth_v2: format!("{base}/{{customer}}/api/v2/auth"),
        applications: format!("{base}/{{customer}}/api/applications"),
        projects: format!("{base}/{{customer}}/api/projects"),
        branches: format!("{base}/{{customer}}/api/branches?page[limit]={{limit}}&page[offset]={{offset}}"),
        role_assignments: format!("{base}/{{customer}}/api/roleassignments"),
        resource_urn: "urn:{customer}:project:{project_id}".to_string(),
    }
}

pub fn endpoints(base: &str) -> Endpoints {
    templates(base)
        .resolve(TENANT)
        .expect("Failed to resolve endpoints")
}

pub fn credentials(password: Option<&str>, token: Option<&str>) -> Credentials {
    Credentials {
        tenant: TENANT.to_string(),
        email: "ops@acme.test".to_string(),
        password: password.map(|p| Secret::new(p.to_string())),
        access_token: token.map(|t| Secret::new(t.to_string())),
    }
}

/// Retries kept fast so failing-page tests finish quickly
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
    }
}

pub fn settings(page_size: usize) -> ClientSettings {
    ClientSettings {
        applications_page_size: page_size,
        projects_page_size: page_size,
        branches_page_size: page_size,
        max_pages: 100,
        concurrency: 2,
        timeout: Duration::from_secs(5),
        retry: fast_retry(1),
    }
}

pub fn transport(settings: &ClientSettings) -> HttpTransport {
    HttpTransport::new(settings.timeout, settings.retry.clone()).expect("Failed to build transport")
}

pub fn client(base: &str, settings: ClientSettings) -> PlatformClient {
    PlatformClient::with_token(
        transport(&settings),
        endpoints(base),
        SessionToken::new(TOKEN.to_string()),
        settings,
    )
}

/// A JSON:API page of applications with sequential ids
pub fn application_page(start: usize, count: usize) -> Value {
    let data: Vec<Value> = (start..start + count)
        .map(|n| {
            json!({
                "id": format!("a{n}"),
                "type": "applications",
                "attributes": {"name": format!("App {n}"), "description": ""},
                "relationships": {"projects": {"data": [{"id": format!("P{n}")}]}}
            })
        })
        .collect();
    json!({ "data": data })
}

pub fn project_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "type": "projects",
        "attributes": {"name": name, "type": "sast", "properties": {}}
    })
}

pub fn branch_json(project_id: &str, name: &str) -> Value {
    json!({
        "id": format!("{project_id}-{name}"),
        "type": "branches",
        "attributes": {"name": name},
        "relationships": {"project": {"data": {"id": project_id, "type": "projects"}}}
    })
}
