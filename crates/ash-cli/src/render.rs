//! Terminal rendering of reports

use std::path::Path;

use ash_core::{ItemOutcome, ItemStatus, NodeReport, StatusCounts, SyncReport};
use colored::{ColoredString, Colorize};

fn tag(status: ItemStatus) -> ColoredString {
    let tag = format!("[{}]", status.tag());
    match status {
        ItemStatus::Ok => tag.green().bold(),
        ItemStatus::New => tag.cyan().bold(),
        ItemStatus::Skipped => tag.yellow().bold(),
        ItemStatus::Removed => tag.magenta().bold(),
        ItemStatus::Error => tag.red().bold(),
    }
}

/// `[TAG] name : message`
pub fn outcome_line(outcome: &ItemOutcome) -> String {
    if outcome.message.is_empty() {
        format!("{:>6} {}", tag(outcome.status), outcome.name)
    } else {
        format!(
            "{:>6} {} : {}",
            tag(outcome.status),
            outcome.name,
            outcome.message
        )
    }
}

fn display_dir(dir: &Path, base: &Path) -> String {
    match dir.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => dir.display().to_string(),
    }
}

pub fn print_node(node: &NodeReport, base: &Path) {
    let d = node.diff;
    println!(
        "{} {} {}",
        "=>".blue().bold(),
        display_dir(&node.dir, base).cyan(),
        format!(
            "({}: +{} -{} ~{})",
            node.node.name, d.added, d.removed, d.renamed
        )
        .dimmed()
    );
    if node.outcomes.is_empty() {
        println!("   {}", "nothing to do".dimmed());
    }
    for outcome in &node.outcomes {
        println!("   {}", outcome_line(outcome));
    }
}

pub fn summary_line(counts: &StatusCounts) -> String {
    format!(
        "{} ok, {} new, {} skipped, {} removed, {} errors",
        counts.ok, counts.new, counts.skipped, counts.removed, counts.error
    )
}

pub fn print_report(report: &SyncReport, base: &Path) {
    for node in &report.nodes {
        print_node(node, base);
    }
    let counts = report.counts();
    println!();
    let summary = summary_line(&counts);
    if counts.error > 0 {
        println!("{} {}", "Done with errors:".red().bold(), summary);
    } else {
        println!("{} {}", "Done:".green().bold(), summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_line_has_tag_name_and_message() {
        colored::control::set_override(false);
        let line = outcome_line(&ItemOutcome::created("Lab1", "cloned"));
        assert_eq!(line, " [NEW] Lab1 : cloned");
    }

    #[test]
    fn summary_lists_every_status() {
        let counts = StatusCounts {
            ok: 2,
            new: 1,
            skipped: 0,
            removed: 3,
            error: 1,
        };
        assert_eq!(
            summary_line(&counts),
            "2 ok, 1 new, 0 skipped, 3 removed, 1 errors"
        );
    }

    #[test]
    fn dirs_are_shown_relative_to_base() {
        let base = Path::new("/work/course");
        assert_eq!(display_dir(base, base), ".");
        assert_eq!(display_dir(&base.join("A"), base), "A");
        assert_eq!(display_dir(Path::new("/elsewhere"), base), "/elsewhere");
    }
}
