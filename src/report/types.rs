use chrono::{DateTime, Utc};

use crate::pipeline::PullRequestRecord;

/// Everything the renderer needs for one repository's release report.
#[derive(Debug)]
pub struct Report {
    /// Owner of the repository
    pub organization: String,
    /// Repository name
    pub slug: String,
    /// Version label of the release being reported (the "until" value)
    pub version: String,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Merged pull requests, in pipeline order
    pub pull_requests: Vec<PullRequestRecord>,
}

impl Report {
    /// File name used when the report is written to an output directory.
    pub fn file_name(&self) -> String {
        format!("pr_report_{}_{}.md", self.slug, self.version)
    }

    /// Distinct people who approved at least one pull request, in first-seen order.
    pub fn approvers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for reviewer in self.pull_requests.iter().flat_map(|pr| &pr.reviewers) {
            if !seen.contains(&reviewer.user.as_str()) {
                seen.push(reviewer.user.as_str());
            }
        }
        seen
    }
}
