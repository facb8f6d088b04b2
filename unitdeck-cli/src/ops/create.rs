//! Service creation: file-based and interactive.

use std::fs;
use std::path::PathBuf;

use crossterm::style::Stylize;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input};
use unitdeck_core::{
    normalize_unit_name, ActionDispatcher, ApiClient, CreateServiceForm, ServiceRegistry,
    UNIT_TEMPLATE,
};

use super::output::OutputFormat;
use super::ui::{print_header, print_hint, print_progress, print_success};
use super::ui::{finish_progress_error, finish_progress_success};

/// Create a service from a unit file on disk.
pub async fn create_service(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    dispatcher: &ActionDispatcher,
    name: String,
    description: Option<String>,
    file: PathBuf,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let unit_text = fs::read_to_string(&file)?;
    let form = CreateServiceForm {
        name,
        description: description.unwrap_or_default(),
        unit_text,
    };
    submit(client, registry, dispatcher, &form, output).await
}

/// Interactive creation: prompt for the basics, open the editor seeded
/// with the default unit skeleton, preview, confirm, submit.
pub async fn create_service_interactive(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    dispatcher: &ActionDispatcher,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    print_header("🚀 CREATE NEW SERVICE");

    let name: String = Input::with_theme(&theme)
        .with_prompt("Service name (\".service\" is appended if missing)")
        .validate_with(|v: &String| -> Result<(), &str> {
            if v.trim().is_empty() {
                Err("name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let description: String = Input::with_theme(&theme)
        .with_prompt("Description (optional)")
        .allow_empty(true)
        .interact_text()?;

    let unit_text = match Editor::new().edit(UNIT_TEMPLATE)? {
        Some(text) => text,
        None => {
            println!("  {} Service creation cancelled.", "✗".red());
            return Ok(());
        }
    };

    let form = CreateServiceForm {
        name,
        description,
        unit_text,
    };

    if !preview_and_confirm(&theme, &form)? {
        println!("  {} Service creation cancelled.", "✗".red());
        return Ok(());
    }

    submit(client, registry, dispatcher, &form, output).await
}

async fn submit(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    dispatcher: &ActionDispatcher,
    form: &CreateServiceForm,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            dispatcher.create(client, registry, form).await?;
            super::output::print_json(&registry.units())?;
        }
        OutputFormat::Table => {
            let unit_name = normalize_unit_name(form.name.trim());
            print_progress("Creating service");
            match dispatcher.create(client, registry, form).await {
                Ok(()) => {
                    finish_progress_success("Service created");
                    println!();
                    print_success(&format!("'{}' was submitted to the host.", unit_name));
                    print_hint(&format!("Use 'start {}' to bring it up", unit_name));
                    println!();
                }
                Err(err) => {
                    if matches!(err, unitdeck_core::ClientError::AuthExpired) {
                        println!();
                    } else {
                        finish_progress_error("Create failed");
                        println!();
                    }
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

fn preview_and_confirm(theme: &ColorfulTheme, form: &CreateServiceForm) -> anyhow::Result<bool> {
    // Assemble before the confirm so the preview shows the exact payload.
    let request = form.assemble()?;

    print_header("📋 PREVIEW");
    println!("  {} {}", "Name:".dark_grey(), request.name.as_str().white().bold());
    if !request.description.is_empty() {
        println!("  {} {}", "Description:".dark_grey(), request.description.as_str());
    }
    println!();
    for line in request.command.lines() {
        println!("    {}", line.yellow());
    }
    println!();

    Ok(Confirm::with_theme(theme)
        .with_prompt("Create this service?")
        .default(true)
        .interact()?)
}
