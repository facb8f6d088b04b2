mod guard;
mod ops;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unitdeck_core::{
    default_state_dir, ActionDispatcher, ApiClient, CredentialStore, ServiceAction,
    ServiceRegistry, SortDirective, SortField, SortOrder,
};

use guard::TerminalGuard;
use ops::OutputFormat;

/// Console for a remote service-management API.
#[derive(Parser)]
#[command(
    name = "unitdeck",
    author,
    version,
    about = "Manage host services over the unitdeck API"
)]
struct Cli {
    /// API base url
    #[arg(long, env = "UD_API_BASE", default_value = "http://127.0.0.1:8000")]
    api_base: String,

    /// Directory holding the stored session credential
    #[arg(long, env = "UD_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Drop the stored session
    Logout,
    /// List services
    List {
        /// Sort field: name, status, enabled, description
        #[arg(long, default_value = "name")]
        sort: String,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },
    /// Show one service in detail
    Show { name: String },
    /// Start a service
    Start { name: String },
    /// Stop a service
    Stop { name: String },
    /// Restart a service
    Restart { name: String },
    /// Enable a service at boot
    Enable { name: String },
    /// Disable a service at boot
    Disable { name: String },
    /// Delete a service
    Delete { name: String },
    /// Create a service (interactive unless --file is given)
    Create {
        /// Service name; ".service" is appended if missing
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Unit file to submit
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Enter the interactive console (ud>)
    Shell,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {}
        Err(err) => {
            ops::render_error(&err);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(|| default_state_dir(dirs_next::config_dir().as_deref()));
    tracing::debug!(dir = %state_dir.display(), "using state directory");
    let store = CredentialStore::new(state_dir);
    let client = ApiClient::new(&cli.api_base, store, Arc::new(TerminalGuard))?;

    let mut registry = ServiceRegistry::new();
    let dispatcher = ActionDispatcher::new();

    match cli.command {
        Commands::Login { username, password } => {
            ops::login(&client, &username, password).await?
        }
        Commands::Logout => ops::logout(&client)?,
        Commands::List { sort, desc } => {
            let field: SortField = sort.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let directive = SortDirective {
                field,
                order: if desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                },
            };
            ops::list_services(&client, &mut registry, &directive, cli.output).await?
        }
        Commands::Show { name } => {
            ops::show_service(&client, &mut registry, &name, cli.output).await?
        }
        Commands::Start { name } => {
            ops::control_service(
                &client,
                &mut registry,
                &dispatcher,
                &name,
                ServiceAction::Start,
                cli.output,
            )
            .await?
        }
        Commands::Stop { name } => {
            ops::control_service(
                &client,
                &mut registry,
                &dispatcher,
                &name,
                ServiceAction::Stop,
                cli.output,
            )
            .await?
        }
        Commands::Restart { name } => {
            ops::control_service(
                &client,
                &mut registry,
                &dispatcher,
                &name,
                ServiceAction::Restart,
                cli.output,
            )
            .await?
        }
        Commands::Enable { name } => {
            ops::control_service(
                &client,
                &mut registry,
                &dispatcher,
                &name,
                ServiceAction::Enable,
                cli.output,
            )
            .await?
        }
        Commands::Disable { name } => {
            ops::control_service(
                &client,
                &mut registry,
                &dispatcher,
                &name,
                ServiceAction::Disable,
                cli.output,
            )
            .await?
        }
        Commands::Delete { name } => {
            ops::delete_service(&client, &mut registry, &dispatcher, &name, cli.output).await?
        }
        Commands::Create {
            name,
            description,
            file,
        } => match file {
            Some(path) => {
                let name =
                    name.ok_or_else(|| anyhow::anyhow!("--name is required with --file"))?;
                ops::create_service(
                    &client,
                    &mut registry,
                    &dispatcher,
                    name,
                    description,
                    path,
                    cli.output,
                )
                .await?
            }
            None => {
                ops::create_service_interactive(&client, &mut registry, &dispatcher, cli.output)
                    .await?
            }
        },
        Commands::Shell => ops::shell_loop(&client, cli.output).await?,
    }

    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses() {
        let args = ["unitdeck", "list"];
        let _ = Cli::parse_from(args);
    }

    #[test]
    fn clap_parses_sorted_list() {
        let args = ["unitdeck", "list", "--sort", "enabled", "--desc"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Commands::List { sort, desc } => {
                assert_eq!(sort, "enabled");
                assert!(desc);
            }
            _ => panic!("expected list"),
        }
    }
}
