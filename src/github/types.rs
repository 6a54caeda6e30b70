use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner + name of a repository on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The repository slug used in log lines and report file names.
    pub fn slug(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagQueryVariables<'a> {
    pub owner: &'a str,
    pub repository: &'a str,
    pub qualified_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TagQueryData {
    pub repository: Option<TagQueryRepository>,
}

#[derive(Debug, Deserialize)]
pub struct TagQueryRepository {
    #[serde(rename = "ref")]
    pub reference: Option<TagRef>,
}

/// A `refs/tags/...` reference and the object it points at.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub target: GitObject,
}

/// The object behind a ref, discriminated by its GraphQL `__typename`.
///
/// Lightweight tags point straight at a `Commit`; annotated tags point at a
/// `Tag` object whose own target is (usually) the commit.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum GitObject {
    Commit(CommitNode),
    Tag(AnnotatedTagNode),
    #[serde(other)]
    Other,
}

impl GitObject {
    pub fn kind(&self) -> &'static str {
        match self {
            GitObject::Commit(_) => "commit",
            GitObject::Tag(_) => "tag",
            GitObject::Other => "non-commit",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub oid: String,
    pub committed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedTagNode {
    #[serde(default)]
    pub target: Option<Box<GitObject>>,
}

/// One entry of the REST closed-issues listing. Pull requests are issues too.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSummary {
    pub number: u64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestQueryVariables<'a> {
    pub owner: &'a str,
    pub repository: &'a str,
    pub number: u64,
    pub page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestQueryData {
    pub repository: Option<PullRequestQueryRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestQueryRepository {
    pub pull_request: Option<PullRequestNode>,
}

/// Full pull request detail as returned by the GraphQL API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
    pub merged: bool,
    pub base_ref_name: String,
    pub author: Option<Actor>,
    pub merged_by: Option<Actor>,
    pub merge_commit: Option<MergeCommit>,
    #[serde(default)]
    pub files: Option<Connection<ChangedFile>>,
    #[serde(default)]
    pub reviews: Option<Connection<Review>>,
}

/// A user, bot or organization. `name` only exists on `User`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeCommit {
    pub oid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: Option<Actor>,
    pub state: String,
    pub updated_at: DateTime<Utc>,
}
