//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI.

use crate::controller::{Outcome, SortReport};
use crate::counters::OpSnapshot;
use crate::registry::{SortCatalog, SortDescriptor};
use crate::utils::bench::format_duration;
use terminal_size::{terminal_size, Width};

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " Visual Sort ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!(
        "║{}{}{}║",
        " ".repeat(padding),
        title,
        " ".repeat(right_padding)
    );
    println!("╚{}╝", border);
    println!();
}

fn flags(sort: &SortDescriptor) -> String {
    let mut flags = Vec::new();
    if sort.is_nondeterministic() {
        flags.push("nondeterministic");
    }
    if sort.is_multi_threaded() {
        flags.push("multi-threaded");
    }
    flags.join(", ")
}

/// Print sort info box
pub fn print_sort_info_box(sort: &SortDescriptor) {
    let term_width = get_term_width();
    let max_content_width = term_width.saturating_sub(4).max(40);

    let mut lines = vec![
        format!("Sort:      {}", sort.name()),
        sort.description().to_string(),
        format!("Max size:  {}", sort.max_size()),
    ];
    for requirement in sort.requirements() {
        lines.push(format!("Requires:  {}", requirement.description));
    }
    let flags = flags(sort);
    if !flags.is_empty() {
        lines.push(format!("Flags:     {}", flags));
    }

    let content_width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(60)
        .min(max_content_width);
    let border = "─".repeat(content_width + 2);

    println!("┌{}┐", border);
    for (i, line) in lines.iter().enumerate() {
        if i == 2 {
            println!("├{}┤", border);
        }
        println!(
            "│ {:<width$} │",
            truncate(line, content_width),
            width = content_width
        );
    }
    println!("└{}┘", border);
    println!();
}

/// Print the catalog with indices, limits and flags
pub fn print_catalog(catalog: &SortCatalog) {
    let term_width = get_term_width();
    let desc_width = term_width.saturating_sub(38).max(20);

    println!("Available sorts:");
    println!();
    for (index, sort) in catalog.all().iter().enumerate() {
        let flags = flags(sort);
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags)
        };
        println!(
            "  {:>2}  {:<16} max {:<6} {}{}",
            index,
            sort.name(),
            sort.max_size(),
            truncate(sort.description(), desc_width),
            flags
        );
    }
}

fn counters_cell(snapshot: Option<OpSnapshot>) -> [String; 4] {
    match snapshot {
        Some(s) => [
            s.compares.to_string(),
            s.reads.to_string(),
            s.writes.to_string(),
            s.steps.to_string(),
        ],
        None => std::array::from_fn(|_| "-".to_string()),
    }
}

/// Print the per-pass counters and the verdict of one session
pub fn print_report(report: &SortReport) {
    let term_width = get_term_width();
    let table_width = term_width.saturating_sub(4).clamp(36, 76);

    let seed = report
        .seed
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    println!("  {} (size {}, seed {})", report.name, report.size, seed);
    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:<10} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Pass", "Time", "Compares", "Reads", "Writes", "Steps"
    );
    println!("  {}", "─".repeat(table_width));

    let time = |d: Option<std::time::Duration>| d.map_or_else(|| "-".to_string(), format_duration);
    let rows = [
        ("baseline", time(report.baseline), counters_cell(None)),
        ("counting", "-".to_string(), counters_cell(report.counted)),
        (
            "animated",
            time(report.animated_elapsed),
            counters_cell(report.animated),
        ),
    ];
    for (pass, time, [compares, reads, writes, steps]) in rows {
        println!(
            "  {:<10} {:>12} {:>12} {:>12} {:>12} {:>12}",
            pass, time, compares, reads, writes, steps
        );
    }
    println!("  {}", "─".repeat(table_width));

    let verdict = match &report.outcome {
        Outcome::Rejected(violations) => {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            format!("rejected: {}", reasons.join("; "))
        }
        Outcome::Failed { pass, error } => format!("failed during the {} pass: {}", pass, error),
        Outcome::Cancelled => "sort ended prematurely".to_string(),
        Outcome::Verified { correct: true, .. } => "sorted correctly".to_string(),
        Outcome::Verified { mismatches, .. } => {
            format!("NOT sorted: {} slots differ from the reference", mismatches)
        }
    };
    println!("  {}", truncate(&verdict, table_width));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("much too long", 8), "much ...");
    }
}
