//! Run settings
//!
//! Layered from an optional `roster.toml` (or the `--config` path) and
//! `ROSTER__*` environment variables, after loading `.env`.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use roster_client::{ClientSettings, Credentials, EndpointTemplates, RetryPolicy};
use roster_core::{Resource, SnapshotMode};
use secrecy::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Tenant identifier substituted for `{customer}`
    pub tenant: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(default)]
    pub access_token: Option<Secret<String>>,
    #[serde(default)]
    pub endpoints: Option<EndpointTemplates>,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub snapshots: SnapshotModes,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub log: LogSettings,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub applications_page_size: usize,
    pub projects_page_size: usize,
    pub branches_page_size: usize,
    pub max_pages: usize,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_initial_ms: u64,
    pub retry_max_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            applications_page_size: client.applications_page_size,
            projects_page_size: client.projects_page_size,
            branches_page_size: client.branches_page_size,
            max_pages: client.max_pages,
            concurrency: client.concurrency,
            timeout_secs: client.timeout.as_secs(),
            retry_attempts: client.retry.max_attempts,
            retry_initial_ms: 500,
            retry_max_ms: 10_000,
        }
    }
}

/// Snapshot mode per resource
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotModes {
    pub applications: SnapshotMode,
    pub projects: SnapshotMode,
    pub branches: SnapshotMode,
    pub role_assignments: SnapshotMode,
}

impl Default for SnapshotModes {
    fn default() -> Self {
        Self {
            applications: SnapshotMode::PromptOnConflict,
            projects: SnapshotMode::ReuseIfPresent,
            branches: SnapshotMode::PromptOnConflict,
            role_assignments: SnapshotMode::PromptOnConflict,
        }
    }
}

impl SnapshotModes {
    #[must_use]
    pub fn mode(&self, resource: Resource) -> SnapshotMode {
        match resource {
            Resource::Applications => self.applications,
            Resource::Projects => self.projects,
            Resource::Branches => self.branches,
            Resource::RoleAssignments => self.role_assignments,
        }
    }

    /// Apply one mode to every resource
    pub fn override_all(&mut self, mode: SnapshotMode) {
        self.applications = mode;
        self.projects = mode;
        self.branches = mode;
        self.role_assignments = mode;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or a required key is missing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("roster").required(false),
        };
        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("ROSTER").separator("__"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tenant.trim().is_empty() {
            bail!("Configuration error: tenant is not set");
        }
        let fetch = &self.fetch;
        for (name, size) in [
            ("applications_page_size", fetch.applications_page_size),
            ("projects_page_size", fetch.projects_page_size),
            ("branches_page_size", fetch.branches_page_size),
            ("max_pages", fetch.max_pages),
            ("concurrency", fetch.concurrency),
        ] {
            if size == 0 {
                bail!("Configuration error: fetch.{name} must be greater than zero");
            }
        }
        Ok(())
    }

    /// Run-scoped directory for this tenant's snapshots
    #[must_use]
    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(self.tenant.trim())
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            tenant: self.tenant.trim().to_string(),
            email: self.email.clone(),
            password: self.password.clone(),
            access_token: self.access_token.clone(),
        }
    }

    /// # Errors
    /// Returns an error if no `[endpoints]` section is configured
    pub fn endpoint_templates(&self) -> Result<&EndpointTemplates> {
        self.endpoints
            .as_ref()
            .context("Configuration error: [endpoints] section is missing")
    }

    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        let fetch = &self.fetch;
        ClientSettings {
            applications_page_size: fetch.applications_page_size,
            projects_page_size: fetch.projects_page_size,
            branches_page_size: fetch.branches_page_size,
            max_pages: fetch.max_pages,
            concurrency: fetch.concurrency,
            timeout: Duration::from_secs(fetch.timeout_secs),
            retry: RetryPolicy {
                max_attempts: fetch.retry_attempts,
                initial_interval: Duration::from_millis(fetch.retry_initial_ms),
                max_interval: Duration::from_millis(fetch.retry_max_ms),
            },
        }
    }
}
