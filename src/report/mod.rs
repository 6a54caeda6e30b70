pub mod types;

pub use types::Report;

use crate::github::RepoRef;
use crate::pipeline::types::{Person, Reviewer};
use crate::pipeline::PullRequestRecord;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Bundle one repository's records into a Report.
pub fn build(
    repo: &RepoRef,
    version: &str,
    pull_requests: Vec<PullRequestRecord>,
    generated_at: DateTime<Utc>,
) -> Report {
    Report {
        organization: repo.owner.clone(),
        slug: repo.slug().to_string(),
        version: version.to_string(),
        generated_at,
        pull_requests,
    }
}

/// Output the report to the terminal, or as markdown into `output_dir`.
/// Returns the written path, if any.
#[instrument(skip(report), fields(slug = %report.slug, pull_requests = report.pull_requests.len()))]
pub fn output(report: &Report, output_dir: Option<&Path>) -> Result<Option<PathBuf>, ReportError> {
    match output_dir {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(None)
        }
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(report.file_name());
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, &path)?;
            Ok(Some(path))
        }
    }
}

/// Terminal layout:
///
/// Pull Request Report: acme/widgets v2.8
/// Generated: 01/02/2023 10:00:00 | Pull requests: 2
///
/// ═══ #101 Add feature ═══
/// ...
fn print_terminal_report(report: &Report) {
    println!();
    println!(
        "{} {}/{} {}",
        "Pull Request Report:".bold(),
        report.organization,
        report.slug,
        report.version.cyan().bold()
    );
    println!(
        "Generated: {} | Pull requests: {}",
        format_time(report.generated_at),
        report.pull_requests.len()
    );
    println!();

    for pr in &report.pull_requests {
        println!("═══ #{} {} ═══", pr.number, pr.title.bold());
        println!("  URL: {}", pr.url);
        println!(
            "  Created: {} by {}",
            format_time(pr.created_at),
            colorize_person(&pr.creator)
        );
        println!(
            "  Merged: {} by {}",
            format_time(pr.merged_at),
            colorize_person(&pr.merged_by)
        );
        if !pr.commit.is_empty() {
            println!("  Commit: {}", pr.commit.yellow());
        }
        if !pr.files.is_empty() {
            println!("  Files:");
            for file in &pr.files {
                println!("    • {}", file);
            }
        }
        if pr.reviewers.is_empty() {
            println!("  Reviewers: {}", "none".red());
        } else {
            println!("  Reviewers:");
            for reviewer in &pr.reviewers {
                println!("    • {}", reviewer_line(reviewer));
            }
        }
        println!();
    }
}

/// Write the report as a markdown file:
///
/// # Pull Request Report: widgets v2.8
/// **Organization:** acme | **Generated:** 01/02/2023 10:00:00
///
/// ## #101 Add feature
/// ...
fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!(
        "# Pull Request Report: {} {}\n\n",
        report.slug, report.version
    ));
    md.push_str(&format!(
        "**Organization:** {} | **Generated:** {} | **Pull requests:** {}\n\n",
        report.organization,
        format_time(report.generated_at),
        report.pull_requests.len()
    ));

    let approvers = report.approvers();
    if !approvers.is_empty() {
        md.push_str(&format!("**Approvers:** {}\n\n", approvers.join(", ")));
    }

    for pr in &report.pull_requests {
        md.push_str(&format!("## [#{}]({}) {}\n\n", pr.number, pr.url, pr.title));
        if !pr.description.trim().is_empty() {
            md.push_str(pr.description.trim());
            md.push_str("\n\n");
        }
        md.push_str(&format!(
            "- **Created:** {} by {}\n",
            format_time(pr.created_at),
            person_label(&pr.creator)
        ));
        md.push_str(&format!(
            "- **Merged:** {} by {}\n",
            format_time(pr.merged_at),
            person_label(&pr.merged_by)
        ));
        if !pr.commit.is_empty() {
            md.push_str(&format!("- **Commit:** `{}`\n", pr.commit));
        }
        md.push('\n');

        if !pr.files.is_empty() {
            md.push_str("**Files:**\n\n");
            for file in &pr.files {
                md.push_str(&format!("- `{}`\n", file));
            }
            md.push('\n');
        }

        md.push_str("**Reviewers:**\n\n");
        if pr.reviewers.is_empty() {
            md.push_str("None.\n\n");
        } else {
            for reviewer in &pr.reviewers {
                md.push_str(&format!("- {}\n", reviewer_line(reviewer)));
            }
            md.push('\n');
        }
    }

    std::fs::write(path, md)?;
    Ok(())
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%m/%d/%Y %H:%M:%S").to_string()
}

/// `Name (user)`, or just the user when the name is unknown.
fn person_label(person: &Person) -> String {
    if person.name.is_empty() {
        person.user.clone()
    } else {
        format!("{} ({})", person.name, person.user)
    }
}

/// `Name (user) STATE: updated_at`
fn reviewer_line(reviewer: &Reviewer) -> String {
    let name = if reviewer.name.is_empty() {
        String::new()
    } else {
        format!("{} ", reviewer.name)
    };
    format!(
        "{}({}) {}: {}",
        name,
        reviewer.user,
        reviewer.state,
        format_time(reviewer.updated_at)
    )
}

/// Sentinel identities stand out in terminal output.
fn colorize_person(person: &Person) -> colored::ColoredString {
    if person.is_former_employee() {
        person_label(person).red().bold()
    } else {
        person_label(person).green()
    }
}
