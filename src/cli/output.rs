//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::node::Node;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One line per node: id, parent and a leaf marker
pub fn node_line(node: &Node) -> String {
    let parent = node
        .parent_id()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".into());
    let kind = if node.is_leaf() { "leaf" } else { "inner" };
    format!("{}\tparent={}\t{}", node.id(), parent, kind)
}

/// Print a node line with the id highlighted
pub fn node(node: &Node) {
    let line = node_line(node);
    match line.split_once('\t') {
        Some((id, rest)) => println!("{}\t{}", id.green().bold(), rest),
        None => println!("{}", line),
    }
}
