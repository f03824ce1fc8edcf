//! Authenticated platform client

use crate::auth::{authenticate, SessionToken};
use crate::collectors::{applications, branches, projects, role_assignments};
use crate::credentials::Credentials;
use crate::endpoints::Endpoints;
use crate::error::ClientResult;
use crate::pagination::{Pager, Paged};
use crate::transport::{HttpTransport, RetryPolicy};
use futures::stream::{self, StreamExt};
use roster_core::{Application, Branch, Principal, Project};
use std::time::Duration;

/// Tunables for a run
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub applications_page_size: usize,
    pub projects_page_size: usize,
    pub branches_page_size: usize,
    /// Hard ceiling on pages read per collection
    pub max_pages: usize,
    /// Role-assignment requests in flight at once
    pub concurrency: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            applications_page_size: applications::PAGE_SIZE,
            projects_page_size: projects::PAGE_SIZE,
            branches_page_size: branches::PAGE_SIZE,
            max_pages: 10_000,
            concurrency: 4,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Client bound to one tenant and one session
#[derive(Debug, Clone)]
pub struct PlatformClient {
    transport: HttpTransport,
    endpoints: Endpoints,
    token: SessionToken,
    settings: ClientSettings,
}

impl PlatformClient {
    /// Build the transport and log in
    ///
    /// # Errors
    /// Returns an error if the transport cannot be built or login fails
    pub async fn connect(
        credentials: &Credentials,
        endpoints: Endpoints,
        settings: ClientSettings,
    ) -> ClientResult<Self> {
        let transport = HttpTransport::new(settings.timeout, settings.retry.clone())?;
        let token = authenticate(&transport, &endpoints, credentials).await?;
        Ok(Self::with_token(transport, endpoints, token, settings))
    }

    /// Use an already obtained session token
    #[must_use]
    pub fn with_token(
        transport: HttpTransport,
        endpoints: Endpoints,
        token: SessionToken,
        settings: ClientSettings,
    ) -> Self {
        Self {
            transport,
            endpoints,
            token,
            settings,
        }
    }

    fn pager(&self) -> Pager<'_> {
        Pager {
            transport: &self.transport,
            token: &self.token,
            max_pages: self.settings.max_pages,
        }
    }

    pub async fn applications(&self) -> Paged<Application> {
        self.pager()
            .fetch_all(
                &self.endpoints.applications_pages(),
                self.settings.applications_page_size,
                applications::normalize,
            )
            .await
    }

    pub async fn projects(&self) -> Paged<Project> {
        self.pager()
            .fetch_all(
                &self.endpoints.projects_pages(),
                self.settings.projects_page_size,
                projects::normalize,
            )
            .await
    }

    pub async fn branches(&self) -> Paged<Branch> {
        self.pager()
            .fetch_all(
                &self.endpoints.branches_pages(),
                self.settings.branches_page_size,
                branches::normalize,
            )
            .await
    }

    /// Principals for every project, in project order
    ///
    /// Up to `concurrency` projects are requested at once.
    pub async fn role_assignments(&self, projects: &[Project]) -> Vec<Principal> {
        let per_project: Vec<Vec<Principal>> = stream::iter(projects)
            .map(|project| {
                role_assignments::fetch_for_project(
                    &self.transport,
                    &self.token,
                    &self.endpoints,
                    project,
                )
            })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        per_project.into_iter().flatten().collect()
    }
}
