//! Interactive console (`ud>`).

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use crossterm::style::Stylize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor};
use unitdeck_core::{
    ActionDispatcher, ApiClient, ServiceAction, ServiceRegistry, SortDirective, SortField,
};

use super::auth::{login, logout};
use super::create::create_service_interactive;
use super::lifecycle::{control_service, delete_service};
use super::output::OutputFormat;
use super::render_error;
use super::services::{fetch_service_names, list_services, render_list, show_service};
use super::ui::{print_error, print_header};

/// All available commands for completion.
const COMMANDS: &[&str] = &[
    "list", "ls", "show", "info", "sort", "start", "stop", "restart", "enable", "disable",
    "delete", "rm", "create", "new", "refresh", "login", "logout", "help", "exit", "quit",
];

/// Commands that take a service name as their argument.
const SERVICE_NAME_COMMANDS: &[&str] = &[
    "show", "info", "start", "stop", "restart", "enable", "disable", "delete", "rm",
];

const SORT_FIELDS: &[&str] = &["name", "status", "enabled", "description"];

/// Custom completer for the unitdeck shell.
#[derive(Clone)]
struct UdCompleter {
    service_names: Arc<Mutex<Vec<String>>>,
}

impl UdCompleter {
    fn new() -> Self {
        Self {
            service_names: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn update_services(&self, names: Vec<String>) {
        if let Ok(mut held) = self.service_names.lock() {
            *held = names;
        }
    }

    fn services(&self) -> Vec<String> {
        self.service_names
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

fn candidates(options: &[String], prefix: &str) -> Vec<Pair> {
    options
        .iter()
        .filter(|option| option.starts_with(prefix))
        .map(|option| Pair {
            display: option.clone(),
            replacement: option.clone(),
        })
        .collect()
}

impl Completer for UdCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let tokens: Vec<&str> = line_to_cursor.split_whitespace().collect();
        let start = line_to_cursor.rfind(' ').map(|i| i + 1).unwrap_or(0);

        // First word: complete commands.
        if tokens.is_empty() || (tokens.len() == 1 && !line_to_cursor.ends_with(' ')) {
            let prefix = tokens.first().copied().unwrap_or("");
            let commands: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();
            return Ok((start, candidates(&commands, prefix)));
        }

        let cmd = tokens[0];
        let prefix = if line_to_cursor.ends_with(' ') {
            ""
        } else {
            tokens.get(1).copied().unwrap_or("")
        };

        if SERVICE_NAME_COMMANDS.contains(&cmd) {
            return Ok((start, candidates(&self.services(), prefix)));
        }
        if cmd == "sort" {
            let fields: Vec<String> = SORT_FIELDS.iter().map(|f| f.to_string()).collect();
            return Ok((start, candidates(&fields, prefix)));
        }

        Ok((pos, vec![]))
    }
}

impl Hinter for UdCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() <= 1 && !line.ends_with(' ') {
            let prefix = tokens.first().copied().unwrap_or("");
            if !prefix.is_empty() {
                for cmd in COMMANDS {
                    if cmd.starts_with(prefix) && *cmd != prefix {
                        return Some(cmd[prefix.len()..].to_string());
                    }
                }
            }
            return None;
        }

        let cmd = tokens.first().copied().unwrap_or("");
        if SERVICE_NAME_COMMANDS.contains(&cmd)
            && (tokens.len() == 1 || (tokens.len() == 2 && !line.ends_with(' ')))
        {
            let prefix = if line.ends_with(' ') {
                ""
            } else {
                tokens.get(1).copied().unwrap_or("")
            };
            if !prefix.is_empty() {
                for name in self.services() {
                    if name.starts_with(prefix) && name != prefix {
                        return Some(name[prefix.len()..].to_string());
                    }
                }
            }
        }

        None
    }
}

impl Highlighter for UdCompleter {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(format!("\x1b[1;36m{}\x1b[0m", prompt))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }
}

impl Validator for UdCompleter {}

impl rustyline::Helper for UdCompleter {}

/// Per-session view and control state. The sort directive lives here: it
/// is never persisted and orders whatever snapshot the registry holds.
struct ShellState {
    registry: ServiceRegistry,
    dispatcher: ActionDispatcher,
    directive: SortDirective,
}

/// Interactive loop with auto-completion, history, and in-place sort
/// toggling. Session expiry drops back to this prompt; `login` resumes.
pub async fn shell_loop(client: &ApiClient, output: OutputFormat) -> anyhow::Result<()> {
    print_shell_banner();

    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let completer = UdCompleter::new();
    let mut rl: Editor<UdCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(completer.clone()));

    let history_path = dirs_next::cache_dir().map(|p| p.join("unitdeck").join("history.txt"));
    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.load_history(path);
    }

    let mut state = ShellState {
        registry: ServiceRegistry::new(),
        dispatcher: ActionDispatcher::new(),
        directive: SortDirective::default(),
    };

    // Seed completion when a session already exists.
    if client.store().get().is_some() {
        completer.update_services(fetch_service_names(client).await);
    }

    loop {
        match rl.readline("ud> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if matches!(line, "exit" | "quit") {
                    println!();
                    println!("  {} Goodbye!", "👋".yellow());
                    println!();
                    break;
                }
                if line == "help" {
                    print_help();
                    continue;
                }

                let tokens = match shell_words::split(line) {
                    Ok(t) if !t.is_empty() => t,
                    _ => continue,
                };

                let cmd = tokens[0].as_str();
                let args = &tokens[1..];

                let result = execute_command(client, output, &mut state, cmd, args).await;

                // Refresh completion after anything that can change the list.
                if matches!(
                    cmd,
                    "list" | "ls" | "refresh" | "create" | "new" | "delete" | "rm" | "login"
                ) && client.store().get().is_some()
                {
                    completer.update_services(fetch_service_names(client).await);
                }

                if let Err(err) = result {
                    render_error(&err);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                print_error(&format!("Error: {:?}", err));
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

async fn execute_command(
    client: &ApiClient,
    output: OutputFormat,
    state: &mut ShellState,
    cmd: &str,
    args: &[String],
) -> anyhow::Result<()> {
    match cmd {
        "list" | "ls" => {
            list_services(client, &mut state.registry, &state.directive, output).await
        }
        "refresh" => {
            state.registry.refresh(client).await?;
            render_list(&state.registry, &state.directive, output)
        }
        "sort" => match args {
            [field] => {
                let field: SortField = field.parse().map_err(|e: String| anyhow!(e))?;
                state.directive.toggle(field);
                // View-state change only: reorder the snapshot we have.
                render_list(&state.registry, &state.directive, output)
            }
            _ => Err(anyhow!("usage: sort <name|status|enabled|description>")),
        },
        "show" | "info" => match args {
            [name] => show_service(client, &mut state.registry, name, output).await,
            _ => Err(anyhow!("usage: show <name>")),
        },
        "start" | "stop" | "restart" | "enable" | "disable" => match args {
            [name] => {
                let action: ServiceAction = cmd.parse().map_err(|e: String| anyhow!(e))?;
                control_service(
                    client,
                    &mut state.registry,
                    &state.dispatcher,
                    name,
                    action,
                    output,
                )
                .await
            }
            _ => Err(anyhow!("usage: {cmd} <name>")),
        },
        "delete" | "rm" => match args {
            [name] => {
                delete_service(client, &mut state.registry, &state.dispatcher, name, output).await
            }
            _ => Err(anyhow!("usage: delete <name>")),
        },
        "create" | "new" => {
            create_service_interactive(client, &mut state.registry, &state.dispatcher, output)
                .await
        }
        "login" => match args {
            [username] => login(client, username, None).await,
            [username, password] => login(client, username, Some(password.clone())).await,
            _ => Err(anyhow!("usage: login <username> [password]")),
        },
        "logout" => logout(client),
        _ => {
            print_error(&format!("Unknown command: '{}'. Type 'help' for usage.", cmd));
            Ok(())
        }
    }
}

fn print_shell_banner() {
    println!();
    println!(
        "{}",
        "╔══════════════════════════════════════════════════════════════╗".dark_cyan()
    );
    println!(
        "{}",
        "║                     🛠  UNITDECK CONSOLE                      ║".dark_cyan()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════════════╝".dark_cyan()
    );
    println!();
    println!(
        "  {}  Interactive mode. Type {} for commands, {} to leave.",
        "ℹ".blue(),
        "help".cyan(),
        "exit".cyan()
    );
    println!(
        "  {} Press {} for auto-completion.",
        "💡".yellow(),
        "Tab".cyan()
    );
    println!();
}

fn print_help() {
    print_header("📖 COMMAND REFERENCE");

    println!("  {}", "SERVICES".white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
    print_cmd("list", "ls", "Fetch and render the service list");
    print_cmd("refresh", "", "Re-render from a fresh snapshot");
    print_cmd("sort <field>", "", "Toggle ordering (same field flips)");
    print_cmd("show <name>", "info", "Inspect one service");
    print_cmd("create", "new", "Create a service interactively");
    print_cmd("delete <name>", "rm", "Remove a service");
    println!();

    println!("  {}", "LIFECYCLE".white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
    print_cmd("start <name>", "", "Start a service");
    print_cmd("stop <name>", "", "Stop a service");
    print_cmd("restart <name>", "", "Restart a service");
    print_cmd("enable <name>", "", "Enable at boot");
    print_cmd("disable <name>", "", "Disable at boot");
    println!();

    println!("  {}", "SESSION".white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
    print_cmd("login <user> [pass]", "", "Sign in and store the token");
    print_cmd("logout", "", "Drop the stored session");
    println!();

    println!("  {}", "SHELL".white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
    print_cmd("help", "", "Show this help");
    print_cmd("exit", "quit", "Leave the console");
    println!();
}

fn print_cmd(cmd: &str, alias: &str, desc: &str) {
    if alias.is_empty() {
        println!("    {:<24} {}", cmd.cyan(), desc.dark_grey());
    } else {
        println!(
            "    {:<24} {} {}",
            cmd.cyan(),
            desc.dark_grey(),
            format!("(alias: {})", alias).dark_grey().italic()
        );
    }
}
