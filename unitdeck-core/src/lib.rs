//! Core library for the unitdeck console: credential storage, the
//! authenticated API client, the service snapshot registry with its sort
//! directives, and serialized lifecycle dispatch.

mod auth;
mod client;
mod credentials;
mod dispatch;
mod error;
mod models;
mod registry;
mod session;
mod sort;
#[cfg(test)]
mod testutil;
mod unitfile;

pub use auth::{login, logout};
pub use client::ApiClient;
pub use credentials::{cookie_is_live, default_state_dir, CredentialStore};
pub use dispatch::{ActionDispatcher, PendingActions, PendingSlot, ServiceAction};
pub use error::{ClientError, Result};
pub use models::{
    ControlReply, ControlRequest, CreateRequest, EnabledRepr, Enablement, LoginRequest,
    ServiceRecord, ServiceUnit, UnitDetails,
};
pub use registry::ServiceRegistry;
pub use session::{NullGuard, SessionGuard};
pub use sort::{SortDirective, SortField, SortOrder};
pub use unitfile::{
    normalize_unit_name, splice_description, CreateServiceForm, UNIT_SUFFIX, UNIT_TEMPLATE,
};
