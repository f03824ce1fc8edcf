//! Fetch pipeline
//!
//! Every stage is planned against the snapshot store before any request is
//! made, so prompts never interleave with network work. Applications and
//! branches are then collected alongside projects, and role assignments
//! follow once the project list is known.

use crate::settings::Settings;
use anyhow::{Context, Result};
use roster_client::{ClientSettings, Credentials, Endpoints, Paged, PlatformClient};
use roster_core::output::Tabular;
use roster_core::{
    build_report_from_store, plan_stage, write_report, Application, Branch, Confirm, Principal,
    Project, Resource, SnapshotStore, StageAction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

/// How a fetch run ended
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The report was written
    Completed { report: PathBuf, rows: usize },
    /// The operator refused to overwrite this resource's snapshot
    Declined(Resource),
    /// This resource came back empty and nothing downstream was built
    Empty(Resource),
}

/// Per-resource actions for one run
#[derive(Debug, Clone, Copy)]
struct Plan {
    applications: StageAction,
    projects: StageAction,
    branches: StageAction,
    role_assignments: StageAction,
}

impl Plan {
    /// Decide every stage up front; `Err` names the first declined resource
    fn build(
        store: &SnapshotStore,
        settings: &Settings,
        confirm: &dyn Confirm,
    ) -> std::result::Result<Self, Resource> {
        let mut actions = [StageAction::Fetch; 4];
        for (slot, resource) in actions.iter_mut().zip(Resource::ALL) {
            let mode = settings.snapshots.mode(resource);
            let action = plan_stage(store, resource, mode, confirm);
            if action == StageAction::Declined {
                return Err(resource);
            }
            *slot = action;
        }
        let [applications, projects, branches, role_assignments] = actions;
        Ok(Self {
            applications,
            projects,
            branches,
            role_assignments,
        })
    }

    fn get(&self, resource: Resource) -> StageAction {
        match resource {
            Resource::Applications => self.applications,
            Resource::Projects => self.projects,
            Resource::Branches => self.branches,
            Resource::RoleAssignments => self.role_assignments,
        }
    }

    fn needs_network(&self) -> bool {
        Resource::ALL
            .iter()
            .any(|resource| self.get(*resource) == StageAction::Fetch)
    }
}

/// Record counts per stage
#[derive(Debug, Default)]
struct Collected {
    applications: usize,
    projects: usize,
    branches: usize,
    principals: usize,
}

impl Collected {
    fn first_empty(&self) -> Option<Resource> {
        [
            (Resource::Applications, self.applications),
            (Resource::Projects, self.projects),
            (Resource::Branches, self.branches),
            (Resource::RoleAssignments, self.principals),
        ]
        .into_iter()
        .find(|(_, count)| *count == 0)
        .map(|(resource, _)| resource)
    }
}

/// Run every stage and build the project report
///
/// # Errors
/// Returns an error on invalid credentials or endpoints, failed login, or
/// store I/O failure
pub fn run_fetch(settings: &Settings, confirm: &dyn Confirm) -> Result<Outcome> {
    let credentials = settings.credentials();
    credentials.auth_mode()?;
    let endpoints = settings
        .endpoint_templates()?
        .resolve(&credentials.tenant)?;

    let store = SnapshotStore::open(settings.run_dir())?;
    let plan = match Plan::build(&store, settings, confirm) {
        Ok(plan) => plan,
        Err(resource) => {
            tracing::info!(resource = %resource, "Overwrite declined, stopping");
            return Ok(Outcome::Declined(resource));
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let collected = runtime.block_on(collect(
        &store,
        plan,
        &credentials,
        endpoints,
        settings.client_settings(),
    ))?;

    if let Some(resource) = collected.first_empty() {
        tracing::warn!(resource = %resource, "No records collected, pipeline stopped");
        return Ok(Outcome::Empty(resource));
    }

    let (report, rows) = build(&store)?;
    Ok(Outcome::Completed { report, rows })
}

/// Rebuild the report from snapshots already on disk
///
/// # Errors
/// Returns an error if the run directory or any snapshot is missing
pub fn run_report(settings: &Settings) -> Result<(PathBuf, usize)> {
    let store = SnapshotStore::existing(settings.run_dir())?;
    build(&store)
}

fn build(store: &SnapshotStore) -> Result<(PathBuf, usize)> {
    let rows = build_report_from_store(store)?;
    let path = write_report(store, &rows)?;
    Ok((path, rows.len()))
}

async fn collect(
    store: &SnapshotStore,
    plan: Plan,
    credentials: &Credentials,
    endpoints: Endpoints,
    client_settings: ClientSettings,
) -> Result<Collected> {
    let client = if plan.needs_network() {
        Some(PlatformClient::connect(credentials, endpoints, client_settings).await?)
    } else {
        tracing::info!("Reusing every snapshot, skipping login");
        None
    };

    let stages = Stages {
        store,
        plan,
        client: client.as_ref(),
    };
    let (applications, branches, projects) = tokio::join!(
        stages.applications(),
        stages.branches(),
        stages.projects_and_principals(),
    );
    let (projects, principals) = projects?;

    Ok(Collected {
        applications: applications?.len(),
        projects: projects.len(),
        branches: branches?.len(),
        principals: principals.len(),
    })
}

struct Stages<'a> {
    store: &'a SnapshotStore,
    plan: Plan,
    client: Option<&'a PlatformClient>,
}

impl Stages<'_> {
    fn client(&self) -> Result<&PlatformClient> {
        self.client.context("No platform session for a fetch stage")
    }

    async fn applications(&self) -> Result<Vec<Application>> {
        let resource = Resource::Applications;
        match self.plan.get(resource) {
            StageAction::Reuse => self.reuse(resource),
            _ => self.persist(resource, self.client()?.applications().await),
        }
    }

    async fn branches(&self) -> Result<Vec<Branch>> {
        let resource = Resource::Branches;
        match self.plan.get(resource) {
            StageAction::Reuse => self.reuse(resource),
            _ => self.persist(resource, self.client()?.branches().await),
        }
    }

    async fn projects_and_principals(&self) -> Result<(Vec<Project>, Vec<Principal>)> {
        let resource = Resource::Projects;
        let projects: Vec<Project> = match self.plan.get(resource) {
            StageAction::Reuse => self.reuse(resource)?,
            _ => self.persist(resource, self.client()?.projects().await)?,
        };
        let resource = Resource::RoleAssignments;
        if projects.is_empty() {
            if self.plan.get(resource) == StageAction::Fetch {
                self.store.remove(resource)?;
            }
            return Ok((projects, Vec::new()));
        }

        let principals = match self.plan.get(resource) {
            StageAction::Reuse => self.reuse(resource)?,
            _ => {
                let principals = self.client()?.role_assignments(&projects).await;
                self.save(resource, principals)?
            }
        };
        Ok((projects, principals))
    }

    fn reuse<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>> {
        let records: Vec<T> = self.store.load(resource)?;
        tracing::info!(resource = %resource, records = records.len(), "Reusing snapshot");
        Ok(records)
    }

    fn persist<T: Serialize + Tabular>(
        &self,
        resource: Resource,
        paged: Paged<T>,
    ) -> Result<Vec<T>> {
        if paged.stop.is_complete() {
            tracing::info!(
                resource = %resource,
                pages = paged.pages,
                records = paged.items.len(),
                "Collected"
            );
        } else {
            tracing::warn!(
                resource = %resource,
                pages = paged.pages,
                records = paged.items.len(),
                stop = %paged.stop,
                "Collection ended early, keeping partial results"
            );
        }
        self.save(resource, paged.items)
    }

    /// Write a fetched stage; an empty result clears any earlier snapshot
    fn save<T: Serialize + Tabular>(&self, resource: Resource, records: Vec<T>) -> Result<Vec<T>> {
        if records.is_empty() {
            tracing::warn!(resource = %resource, "Nothing collected, earlier snapshot removed");
            self.store.remove(resource)?;
        } else {
            self.store.save(resource, &records)?;
        }
        Ok(records)
    }
}
