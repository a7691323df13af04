//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::domain::SemanticVersion;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format and print a non-fatal warning.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Text of the confirmation question shown before anything is published.
pub fn confirmation_question(version: &SemanticVersion, short_hash: &str, token: &str) -> String {
    format!(
        "About to tag commit {} as {} and publish it to the dev channel.\nType '{}' to continue: ",
        short_hash, version, token
    )
}

/// Display the version change a roll will make.
pub fn display_proposed_version(current: &SemanticVersion, next: &SemanticVersion, commits: u32) {
    println!("\n{}", style("Proposed dev roll:").bold());
    println!("  From: {} ({} commits since)", style(current).red(), commits);
    println!("  To:   {}", style(next).green());
}

/// Display the paths that keep the working tree from being clean.
pub fn display_dirty_paths(paths: &[String]) {
    println!("{}", style("Uncommitted changes:").underlined());
    for path in paths.iter().take(20) {
        println!("  {}", path);
    }
    if paths.len() > 20 {
        println!("  ... and {} more", paths.len() - 20);
    }
}

/// Display how to finish a roll by hand after a failed push.
pub fn display_manual_push_instruction(tag: &str, remote: &str, dev_branch: &str) {
    println!(
        "\n{} The release is already published. To finish the roll, run:\n  {}\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan(),
        style(format!("git push {} HEAD:{}", remote, dev_branch)).cyan()
    );
}

/// Shorten a commit hash for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..10).unwrap_or(hash)
}
