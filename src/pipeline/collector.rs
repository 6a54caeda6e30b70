use tracing::{debug, instrument};

use super::types::{Candidate, Cutoff};
use super::PipelineError;
use crate::github::{RepoRef, SourceHost};

/// Lists the pull requests closed since the cutoff.
pub struct PullRequestCollector<'a> {
    host: &'a dyn SourceHost,
}

impl<'a> PullRequestCollector<'a> {
    pub fn new(host: &'a dyn SourceHost) -> Self {
        Self { host }
    }

    /// Return candidate numbers in host order, first page only.
    ///
    /// The host's last entry is the pull request that produced the "since"
    /// tag itself and is always dropped. This relies on the host listing
    /// that pull request last; nothing here verifies it.
    #[instrument(skip(self), fields(repo = %repo, cutoff = %cutoff))]
    pub async fn collect(
        &self,
        repo: &RepoRef,
        cutoff: Cutoff,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let mut issues = self.host.closed_issues_since(repo, cutoff.at()).await?;

        if let Some(tagged) = issues.pop() {
            debug!(number = tagged.number, "dropping the since tag's own pull request");
        }

        Ok(issues
            .into_iter()
            .map(|issue| Candidate {
                number: issue.number,
                title: issue.title,
            })
            .collect())
    }
}
