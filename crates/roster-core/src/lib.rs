//! Roster Core - inventory model and project access report
//!
//! This crate holds the normalized platform records, the on-disk snapshot
//! store, the per-resource snapshot policy, and the correlator that joins
//! everything into one row per principal per project.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines
)]

pub mod error;
pub mod model;
pub mod output;
pub mod policy;
pub mod report;
pub mod store;

pub use error::{RosterError, RosterResult};
pub use model::{
    Application, Branch, Principal, PrincipalKind, Project, ReportRow, Resource, BRANCH_COLUMNS,
    NO_APPLICATION,
};
pub use policy::{plan_stage, AssumeNo, AssumeYes, Confirm, SnapshotMode, StageAction};
pub use report::{build_report, build_report_from_store, write_report};
pub use store::SnapshotStore;
