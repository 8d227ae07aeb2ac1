//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Diagnostics (errors, event logs) go to stderr; stdout carries data only.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold) to stderr
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().cyan().bold());
}

/// Print an observed event (event name in yellow, indented) to stderr
pub fn event(name: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("  {} {}", name.yellow(), msg);
}

/// Print a key/value line (green key)
pub fn field(key: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", key.green(), msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
