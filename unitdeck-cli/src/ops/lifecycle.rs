//! Lifecycle commands: start, stop, restart, enable, disable, delete.

use unitdeck_core::{
    ActionDispatcher, ApiClient, ClientError, ServiceAction, ServiceRegistry,
};

use super::output::{print_json, OutputFormat};
use super::ui::{
    finish_progress_error, finish_progress_success, format_enabled, format_status, print_header,
    print_kv_colored, print_progress, print_success, print_warning, KvColor,
};
use crossterm::style::Stylize;

/// Send one control command and echo the refreshed state for the row.
pub async fn control_service(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    dispatcher: &ActionDispatcher,
    name: &str,
    action: ServiceAction,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            let reply = dispatcher.control(client, registry, name, action).await?;
            print_json(&reply)?;
        }
        OutputFormat::Table => {
            print_header(&format!(
                "⚙️  {} SERVICE: {}",
                action.as_str().to_uppercase(),
                name.to_uppercase()
            ));

            print_progress(&format!("Sending {action}"));
            match dispatcher.control(client, registry, name, action).await {
                Ok(_) => {
                    finish_progress_success(&format!("{action} completed"));
                    println!();
                    print_refreshed_state(registry, name);
                }
                Err(err) => {
                    finish_pending_line(&err, &format!("Failed to {action}"));
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

/// Delete a service via its dedicated endpoint.
pub async fn delete_service(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    dispatcher: &ActionDispatcher,
    name: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            let reply = dispatcher.delete(client, registry, name).await?;
            print_json(&reply)?;
        }
        OutputFormat::Table => {
            print_header(&format!("🗑️  DELETE SERVICE: {}", name.to_uppercase()));
            print_warning(&format!("This will permanently remove '{}'", name));
            println!();

            print_progress("Deleting service");
            match dispatcher.delete(client, registry, name).await {
                Ok(_) => {
                    finish_progress_success("Service deleted");
                    println!();
                    print_success(&format!("'{}' is gone; {} services remain.", name, registry.len()));
                    println!();
                }
                Err(err) => {
                    finish_pending_line(&err, "Delete failed");
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

/// Close the progress line. Session expiry already printed its own notice
/// through the guard, so it only gets a bare line break.
fn finish_pending_line(err: &ClientError, label: &str) {
    if matches!(err, ClientError::AuthExpired) {
        println!();
    } else {
        finish_progress_error(label);
        println!();
    }
}

fn print_refreshed_state(registry: &ServiceRegistry, name: &str) {
    match registry.get(name) {
        Some(unit) => {
            println!("  {:<14} {}", "Status:".dark_grey(), format_status(&unit.status));
            println!(
                "  {:<14} {}",
                "Enabled:".dark_grey(),
                format_enabled(unit.enabled.on)
            );
            println!();
        }
        // Not in the refreshed snapshot; the remote decides what exists.
        None => {
            print_kv_colored("Status", "no longer listed", KvColor::Grey);
            println!();
        }
    }
}
