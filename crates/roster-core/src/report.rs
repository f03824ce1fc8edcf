//! Correlator and report builder
//!
//! Joins applications, projects, branches and principals on project id and
//! emits one row per principal per project.

use crate::error::RosterResult;
use crate::model::{
    Application, Branch, Principal, PrincipalKind, Project, ReportRow, Resource, BRANCH_COLUMNS,
    NO_APPLICATION,
};
use crate::output::Table;
use crate::store::{SnapshotStore, REPORT_FILE};
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything known about one project, gathered before emitting rows
#[derive(Debug, Default)]
struct ProjectAggregate {
    name: String,
    branches: Vec<String>,
    users: Vec<Principal>,
    groups: Vec<Principal>,
}

/// Project aggregates kept in first-seen order
#[derive(Debug, Default)]
struct Aggregates {
    order: Vec<String>,
    by_id: HashMap<String, ProjectAggregate>,
}

impl Aggregates {
    fn entry(&mut self, project_id: &str) -> &mut ProjectAggregate {
        if !self.by_id.contains_key(project_id) {
            self.order.push(project_id.to_string());
        }
        self.by_id.entry(project_id.to_string()).or_default()
    }
}

/// Correlate the four collections into report rows
///
/// Rows follow project first-seen order; within a project all users come
/// before all groups, each in collection order. When a project id is listed
/// by several applications the last one wins.
#[must_use]
pub fn build_report(
    applications: &[Application],
    projects: &[Project],
    branches: &[Branch],
    principals: &[Principal],
) -> Vec<ReportRow> {
    let mut aggregates = Aggregates::default();

    for project in projects {
        aggregates.entry(&project.id).name.clone_from(&project.name);
    }
    for branch in branches {
        aggregates
            .entry(&branch.project_id)
            .branches
            .push(branch.name.clone());
    }
    for principal in principals {
        let aggregate = aggregates.entry(&principal.project_id);
        if aggregate.name.is_empty() {
            aggregate.name.clone_from(&principal.project_name);
        }
        match principal.kind {
            PrincipalKind::User => aggregate.users.push(principal.clone()),
            PrincipalKind::Group => aggregate.groups.push(principal.clone()),
        }
    }

    let mut owners: HashMap<&str, &str> = HashMap::new();
    for application in applications {
        for project_id in &application.project_ids {
            owners.insert(project_id, &application.name);
        }
    }

    let mut rows = Vec::new();
    for project_id in &aggregates.order {
        let Some(aggregate) = aggregates.by_id.get(project_id) else {
            continue;
        };
        let application_name = owners
            .get(project_id.as_str())
            .copied()
            .unwrap_or(NO_APPLICATION);
        let branch_names = branch_slots(&aggregate.branches);

        for principal in aggregate.users.iter().chain(&aggregate.groups) {
            let email = match principal.kind {
                PrincipalKind::User => principal.email.clone(),
                PrincipalKind::Group => String::new(),
            };
            rows.push(ReportRow {
                application_name: application_name.to_string(),
                project_name: aggregate.name.clone(),
                project_id: project_id.clone(),
                principal_type: principal.kind.report_label().to_string(),
                name: principal.name.clone(),
                email,
                branch_names: branch_names.clone(),
            });
        }
    }

    rows
}

/// First `BRANCH_COLUMNS` names, padded with empty strings
fn branch_slots(branches: &[String]) -> [String; BRANCH_COLUMNS] {
    std::array::from_fn(|i| branches.get(i).cloned().unwrap_or_default())
}

/// Correlate from the snapshots persisted in a store
///
/// # Errors
/// Returns an error if any of the four snapshots is missing or unreadable
pub fn build_report_from_store(store: &SnapshotStore) -> RosterResult<Vec<ReportRow>> {
    let applications: Vec<Application> = store.load(Resource::Applications)?;
    let projects: Vec<Project> = store.load(Resource::Projects)?;
    let branches: Vec<Branch> = store.load(Resource::Branches)?;
    let principals: Vec<Principal> = store.load(Resource::RoleAssignments)?;

    let rows = build_report(&applications, &projects, &branches, &principals);
    tracing::info!(
        applications = applications.len(),
        projects = projects.len(),
        branches = branches.len(),
        principals = principals.len(),
        rows = rows.len(),
        "Correlated snapshots"
    );
    Ok(rows)
}

/// Write the final report CSV into the store
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_report(store: &SnapshotStore, rows: &[ReportRow]) -> RosterResult<PathBuf> {
    let path = store.write_table(REPORT_FILE, &Table::from_records(rows))?;
    tracing::info!(rows = rows.len(), path = %path.display(), "Wrote project report");
    Ok(path)
}
