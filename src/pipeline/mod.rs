pub mod collector;
pub mod enricher;
pub mod tag;
pub mod types;

pub use collector::PullRequestCollector;
pub use enricher::PullRequestEnricher;
pub use tag::TagResolver;
pub use types::PullRequestRecord;

use thiserror::Error;
use tracing::{info, instrument};

use crate::github::{GitHubError, RepoRef, SourceHost};

/// Failures that abort the pipeline for one repository.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("The repository `{slug}` doesn't contain the `{tag}` tag")]
    NotFound { slug: String, tag: String },

    #[error("The `{tag}` tag in `{slug}` points at a commit without a committed date")]
    IncompleteData { slug: String, tag: String },

    #[error("The `{tag}` tag in `{slug}` points at a {kind} object, expected a commit")]
    UnsupportedTarget {
        slug: String,
        tag: String,
        kind: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] GitHubError),
}

/// Run tag resolution, collection and enrichment for one repository and
/// return the records in candidate order.
#[instrument(skip(host), fields(repo = %repo))]
pub async fn run(
    host: &dyn SourceHost,
    repo: &RepoRef,
    since_tag: &str,
    release_branch: &str,
) -> Result<Vec<PullRequestRecord>, PipelineError> {
    let cutoff = TagResolver::new(host).resolve(repo, since_tag).await?;
    info!(%cutoff, "resolved since tag");

    let candidates = PullRequestCollector::new(host).collect(repo, cutoff).await?;
    info!(candidates = candidates.len(), "collected candidate pull requests");

    let records = PullRequestEnricher::new(host, release_branch)
        .enrich_all(repo, &candidates)
        .await?;
    info!(records = records.len(), "enriched pull requests");

    Ok(records)
}
