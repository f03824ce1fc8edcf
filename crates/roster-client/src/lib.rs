//! Roster Client - platform API access
//!
//! Authenticates against the scanning platform, pages through its JSON:API
//! resources, and normalizes them into `roster_core` records.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod auth;
pub mod client;
pub mod collectors;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod pagination;
pub mod transport;

pub use auth::{authenticate, SessionToken};
pub use client::{ClientSettings, PlatformClient};
pub use credentials::{AuthMode, Credentials};
pub use endpoints::{EndpointTemplates, Endpoints};
pub use error::{ClientError, ClientResult};
pub use pagination::{PageStop, PageUrl, Paged};
pub use transport::{HttpTransport, RetryPolicy};

/// Media type sent in the `accept` header of every resource request
pub const JSON_API: &str = "application/vnd.api+json";
