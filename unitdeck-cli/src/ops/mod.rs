mod auth;
mod create;
mod lifecycle;
mod output;
mod services;
mod shell;
pub mod ui;

pub use auth::{login, logout};
pub use create::{create_service, create_service_interactive};
pub use lifecycle::{control_service, delete_service};
pub use output::OutputFormat;
pub use services::{list_services, show_service};
pub use shell::shell_loop;

use unitdeck_core::ClientError;

/// Single rendering point for operation failures. Session expiry is never
/// shown as an inline error; the terminal guard already announced it and
/// pointed at the login command.
pub fn render_error(err: &anyhow::Error) {
    if matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::AuthExpired)
    ) {
        return;
    }
    ui::print_error(&format!("{err}"));
}
