use tracing::{debug, instrument, warn};

use super::types::{Candidate, Person, PullRequestRecord, Reviewer};
use super::PipelineError;
use crate::github::types::PullRequestNode;
use crate::github::{RepoRef, SourceHost};

/// Why a candidate produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    NotMerged,
    OtherBranch(String),
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::NotMerged => write!(f, "not merged"),
            Exclusion::OtherBranch(branch) => write!(f, "targets `{branch}`"),
        }
    }
}

/// Outcome of enriching one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Included(PullRequestRecord),
    Excluded(Exclusion),
    /// The host returned no pull request; enumeration has run past valid
    /// data and the remaining candidates must not be enriched.
    UpstreamGap,
}

/// Fetches full detail for candidates and keeps the ones merged into the
/// release branch.
pub struct PullRequestEnricher<'a> {
    host: &'a dyn SourceHost,
    release_branch: String,
}

impl<'a> PullRequestEnricher<'a> {
    pub fn new(host: &'a dyn SourceHost, release_branch: impl Into<String>) -> Self {
        Self {
            host,
            release_branch: release_branch.into(),
        }
    }

    /// Enrich candidates one at a time, in order, stopping at the first
    /// upstream gap. Records gathered before the gap are returned.
    pub async fn enrich_all(
        &self,
        repo: &RepoRef,
        candidates: &[Candidate],
    ) -> Result<Vec<PullRequestRecord>, PipelineError> {
        let mut records = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.enrich(repo, candidate).await? {
                Enrichment::Included(record) => records.push(record),
                Enrichment::Excluded(reason) => {
                    debug!(number = candidate.number, title = %candidate.title, %reason, "excluding pull request");
                }
                Enrichment::UpstreamGap => {
                    warn!(
                        number = candidate.number,
                        skipped = candidates.len() - index - 1,
                        "pull request not found, stopping enrichment"
                    );
                    break;
                }
            }
        }

        Ok(records)
    }

    #[instrument(skip(self, candidate), fields(repo = %repo, number = candidate.number))]
    pub async fn enrich(
        &self,
        repo: &RepoRef,
        candidate: &Candidate,
    ) -> Result<Enrichment, PipelineError> {
        let Some(pull) = self.host.pull_request(repo, candidate.number).await? else {
            return Ok(Enrichment::UpstreamGap);
        };

        Ok(match self.check(&pull) {
            Some(reason) => Enrichment::Excluded(reason),
            None => match normalize(pull) {
                Some(record) => Enrichment::Included(record),
                None => Enrichment::Excluded(Exclusion::NotMerged),
            },
        })
    }

    fn check(&self, pull: &PullRequestNode) -> Option<Exclusion> {
        if !pull.merged {
            return Some(Exclusion::NotMerged);
        }
        if pull.base_ref_name != self.release_branch {
            return Some(Exclusion::OtherBranch(pull.base_ref_name.clone()));
        }
        None
    }
}

/// Build the record. `None` if the host gave no merge time.
fn normalize(pull: PullRequestNode) -> Option<PullRequestRecord> {
    let merged_at = pull.merged_at?;

    let files = pull
        .files
        .map(|files| files.nodes.into_iter().map(|f| f.path).collect())
        .unwrap_or_default();

    let reviewers = pull
        .reviews
        .map(|reviews| {
            reviews
                .nodes
                .into_iter()
                .map(|review| {
                    let person = Person::from(review.author);
                    Reviewer {
                        user: person.user,
                        name: person.name,
                        state: review.state,
                        updated_at: review.updated_at,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Some(PullRequestRecord {
        number: pull.number,
        title: pull.title,
        description: pull.body.unwrap_or_default(),
        url: pull.url,
        creator: Person::from(pull.author),
        created_at: pull.created_at,
        merged_at,
        merged_by: Person::from(pull.merged_by),
        commit: pull.merge_commit.and_then(|c| c.oid).unwrap_or_default(),
        files,
        reviewers,
    })
}
