use tracing::{debug, instrument};

use super::types::Cutoff;
use super::PipelineError;
use crate::github::types::{CommitNode, GitObject};
use crate::github::{RepoRef, SourceHost};

/// Resolves a tag name to the committed date of the commit it marks.
pub struct TagResolver<'a> {
    host: &'a dyn SourceHost,
}

impl<'a> TagResolver<'a> {
    pub fn new(host: &'a dyn SourceHost) -> Self {
        Self { host }
    }

    /// Look up `refs/tags/{tag}` and return the cutoff.
    ///
    /// Annotated tags are unwrapped once. The committed date is used rather
    /// than the authored date, so rebased or cherry-picked commits anchor at
    /// the time they landed.
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn resolve(&self, repo: &RepoRef, tag: &str) -> Result<Cutoff, PipelineError> {
        let qualified_name = format!("refs/tags/{tag}");
        let reference = self
            .host
            .tag_ref(repo, &qualified_name)
            .await?
            .ok_or_else(|| PipelineError::NotFound {
                slug: repo.slug().to_string(),
                tag: tag.to_string(),
            })?;

        let commit = target_commit(&reference.target).ok_or_else(|| {
            PipelineError::UnsupportedTarget {
                slug: repo.slug().to_string(),
                tag: tag.to_string(),
                kind: unwrapped_kind(&reference.target),
            }
        })?;
        debug!(name = %reference.name, oid = %commit.oid, "tag resolved to commit");

        commit
            .committed_date
            .map(Cutoff::new)
            .ok_or_else(|| PipelineError::IncompleteData {
                slug: repo.slug().to_string(),
                tag: tag.to_string(),
            })
    }
}

/// The commit a tag target names, following at most one annotated tag.
fn target_commit(target: &GitObject) -> Option<&CommitNode> {
    match target {
        GitObject::Commit(commit) => Some(commit),
        GitObject::Tag(annotated) => match annotated.target.as_deref() {
            Some(GitObject::Commit(commit)) => Some(commit),
            _ => None,
        },
        GitObject::Other => None,
    }
}

fn unwrapped_kind(target: &GitObject) -> &'static str {
    match target {
        GitObject::Tag(annotated) => match annotated.target.as_deref() {
            Some(GitObject::Tag(_)) => "nested tag",
            Some(inner) => inner.kind(),
            None => "empty tag",
        },
        other => other.kind(),
    }
}
