//! Terminal output helpers.

use crossterm::style::Stylize;

/// Calculate display width of a string (accounting for wide chars).
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Print a section header with box drawing characters.
pub fn print_header(title: &str) {
    let inner_width: usize = 58;
    let title_width = display_width(title);
    let total_padding = inner_width.saturating_sub(title_width);
    let left_pad = total_padding / 2;
    let right_pad = total_padding - left_pad;

    println!();
    println!("{}", format!("╔{}╗", "═".repeat(inner_width)).dark_cyan());
    println!(
        "{}",
        format!(
            "║{}{}{}║",
            " ".repeat(left_pad),
            title,
            " ".repeat(right_pad)
        )
        .dark_cyan()
    );
    println!("{}", format!("╚{}╝", "═".repeat(inner_width)).dark_cyan());
    println!();
}

/// Print a small section title.
pub fn print_section(title: &str) {
    println!();
    println!("  {} {}", "▸".dark_cyan(), title.white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).dark_grey(), value);
}

/// Print a key-value pair with colored value.
pub fn print_kv_colored(key: &str, value: &str, color: KvColor) {
    let styled_value = match color {
        KvColor::Green => value.green().to_string(),
        KvColor::Red => value.red().to_string(),
        KvColor::Yellow => value.yellow().to_string(),
        KvColor::Cyan => value.cyan().to_string(),
        KvColor::White => value.white().bold().to_string(),
        KvColor::Grey => value.dark_grey().to_string(),
    };
    println!("  {:<14} {}", format!("{}:", key).dark_grey(), styled_value);
}

#[derive(Clone, Copy)]
#[allow(dead_code)]
pub enum KvColor {
    Green,
    Red,
    Yellow,
    Cyan,
    White,
    Grey,
}

/// Print a spinner-style progress message (use \r to update).
pub fn print_progress(msg: &str) {
    print!("  {} {}...", "⏳".yellow(), msg);
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

/// Clear the progress line and print success.
pub fn finish_progress_success(msg: &str) {
    println!("\r  {} {}                    ", "✓".green(), msg);
}

/// Clear the progress line and print error.
pub fn finish_progress_error(msg: &str) {
    println!("\r  {} {}                    ", "✗".red(), msg);
}

/// Active services get the green badge; everything else reads as down,
/// matching the remote's `active`/other status vocabulary.
pub fn format_status(status: &str) -> String {
    if status == "active" {
        "● active".green().to_string()
    } else {
        format!("○ {}", status).red().to_string()
    }
}

pub fn format_enabled(on: bool) -> String {
    if on {
        "enabled".blue().to_string()
    } else {
        "disabled".dark_grey().to_string()
    }
}

/// Print a table header.
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join(" ");
    println!("  {}", header.white().bold());
    let separator: String = columns
        .iter()
        .map(|(_, width)| "─".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    println!("  {}", separator.dark_grey());
}

/// Print an empty state message.
pub fn print_empty(msg: &str) {
    println!();
    println!("  {}", msg.dark_grey().italic());
    println!();
}

/// Print a hint/tip message.
pub fn print_hint(msg: &str) {
    println!("  {} {}", "💡".yellow(), msg.dark_grey());
}

/// Truncate on a character boundary, appending an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!(
            "{}...",
            text.chars().take(max_chars.saturating_sub(3)).collect::<String>()
        )
    } else {
        text.to_string()
    }
}
