//! Service listing and inspection.

use unitdeck_core::{ApiClient, ServiceRegistry, SortDirective, UnitDetails};

use super::output::{print_json, OutputFormat};
use super::ui::{
    format_enabled, format_status, print_empty, print_header, print_hint, print_kv,
    print_section, print_table_header, print_warning, truncate,
};
use crossterm::style::Stylize;

/// Fetch the current list and render it under the given directive.
pub async fn list_services(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    directive: &SortDirective,
    output: OutputFormat,
) -> anyhow::Result<()> {
    registry.refresh(client).await?;
    render_list(registry, directive, output)
}

/// Render the registry snapshot without touching the network.
pub fn render_list(
    registry: &ServiceRegistry,
    directive: &SortDirective,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let view = registry.sorted(directive);

    match output {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Table => {
            print_header("📋 SERVICES");

            if view.is_empty() {
                print_empty("No services reported. Use 'create' to add one.");
                return Ok(());
            }

            let active = view.iter().filter(|u| u.is_active()).count();
            println!(
                "  Total: {}  |  {} active  |  {} down  |  sorted by {} {}",
                view.len().to_string().white().bold(),
                active.to_string().green(),
                (view.len() - active).to_string().dark_grey(),
                directive.field,
                directive.order,
            );
            println!();

            print_table_header(&[("NAME", 28), ("STATUS", 12), ("ENABLED", 10), ("DESCRIPTION", 30)]);

            for unit in &view {
                // Status/enabled widths absorb the ANSI escape overhead.
                println!(
                    "  {:<28} {:<21} {:<19} {}",
                    truncate(&unit.name, 28).cyan(),
                    format_status(&unit.status),
                    format_enabled(unit.enabled.on),
                    truncate(&unit.description, 30).dark_grey(),
                );
            }
            println!();
            print_hint("Use 'show <name>' to inspect a service");
        }
    }
    Ok(())
}

/// Fetch and render one service in detail, including whatever could be
/// made of its opaque details payload.
pub async fn show_service(
    client: &ApiClient,
    registry: &mut ServiceRegistry,
    name: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    registry.refresh(client).await?;
    let Some(unit) = registry.get(name) else {
        anyhow::bail!("service not found: {name}");
    };

    match output {
        OutputFormat::Json => print_json(unit)?,
        OutputFormat::Table => {
            print_header(&format!("📦 SERVICE: {}", unit.name.to_uppercase()));

            print_section("State");
            println!("  {:<14} {}", "Status:".dark_grey(), format_status(&unit.status));
            println!(
                "  {:<14} {}",
                "Enabled:".dark_grey(),
                format_enabled(unit.enabled.on)
            );
            if !unit.description.is_empty() {
                print_kv("Description", &unit.description);
            }

            print_section("Details");
            match &unit.details {
                UnitDetails::Empty => print_empty("No additional details reported."),
                UnitDetails::Parsed(value) => {
                    let pretty = serde_json::to_string_pretty(value)?;
                    for line in pretty.lines() {
                        println!("  {}", line.dark_grey());
                    }
                }
                UnitDetails::Unparsed { raw, error } => {
                    print_warning(&format!("details are not valid JSON: {error}"));
                    for line in raw.lines() {
                        println!("  {}", line.dark_grey());
                    }
                }
            }
            println!();
            if unit.is_active() {
                print_hint(&format!("Use 'stop {}' or 'restart {}' to cycle it", name, name));
            } else {
                print_hint(&format!("Use 'start {}' to bring it up", name));
            }
        }
    }
    Ok(())
}

/// Service names for shell completion; empty on any failure.
pub async fn fetch_service_names(client: &ApiClient) -> Vec<String> {
    let mut registry = ServiceRegistry::new();
    match registry.refresh(client).await {
        Ok(()) => registry
            .units()
            .iter()
            .map(|unit| unit.name.clone())
            .collect(),
        Err(_) => Vec::new(),
    }
}
