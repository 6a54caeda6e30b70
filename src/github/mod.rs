pub mod queries;
pub mod types;

pub use types::{IssueSummary, PullRequestNode, RepoRef, TagRef};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use types::{
    GraphQlRequest, GraphQlResponse, PullRequestQueryData, PullRequestQueryVariables,
    TagQueryData, TagQueryVariables,
};

/// Public GitHub REST endpoint; GraphQL lives under `/graphql`.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for the nested file and review collections of a pull request.
pub const PAGE_SIZE: usize = 10;

const USER_AGENT: &str = "pr-report";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub GraphQL query returned no data: {0}")]
    GraphQl(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid repository `{0}`, expected `name` or `owner/name`")]
    InvalidRepo(String),
}

/// The read-only queries the pipeline needs from a source-control host.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Look up a fully-qualified ref (`refs/tags/...`). `None` if it does not exist.
    async fn tag_ref(
        &self,
        repo: &RepoRef,
        qualified_name: &str,
    ) -> Result<Option<TagRef>, GitHubError>;

    /// First page of closed issues and pull requests updated since `since`,
    /// in the order the host returns them.
    async fn closed_issues_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueSummary>, GitHubError>;

    /// Full detail for one pull request. `None` if the number does not
    /// resolve to a pull request.
    async fn pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<PullRequestNode>, GitHubError>;
}

/// Parse a `--repos` entry. A bare name is owned by `default_owner`.
pub fn parse_repo(entry: &str, default_owner: &str) -> Result<RepoRef, GitHubError> {
    let segments: Vec<_> = entry.trim().split('/').collect();
    match segments.as_slice() {
        [name] if !name.is_empty() => Ok(RepoRef::new(default_owner, *name)),
        [owner, name] if !owner.is_empty() && !name.is_empty() => {
            Ok(RepoRef::new(*owner, *name))
        }
        _ => Err(GitHubError::InvalidRepo(entry.to_string())),
    }
}

/// Authenticated client for the GitHub REST and GraphQL APIs.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    graphql_url: Url,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, api_url: &str) -> Result<Self, GitHubError> {
        let base = api_url.trim_end_matches('/');
        let api_url =
            Url::parse(base).map_err(|_| GitHubError::InvalidUrl(api_url.to_string()))?;
        let graphql_url = Url::parse(&format!("{base}/graphql"))
            .map_err(|_| GitHubError::InvalidUrl(api_url.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_url,
            graphql_url,
            token: token.into(),
        })
    }

    /// POST a GraphQL document. Partial responses (data plus errors) are
    /// accepted; GitHub reports unresolvable nodes that way.
    async fn graphql<V, T>(&self, query: &str, variables: V) -> Result<T, GitHubError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.graphql_url.clone())
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<GraphQlResponse<T>>().await?;
        let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();

        match body.data {
            Some(data) => {
                if !messages.is_empty() {
                    debug!(errors = ?messages, "GraphQL response carried errors alongside data");
                }
                Ok(data)
            }
            None => Err(GitHubError::GraphQl(messages.join("; "))),
        }
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn tag_ref(
        &self,
        repo: &RepoRef,
        qualified_name: &str,
    ) -> Result<Option<TagRef>, GitHubError> {
        debug!("querying tag ref");
        let data: TagQueryData = self
            .graphql(
                queries::TAG_QUERY,
                TagQueryVariables {
                    owner: &repo.owner,
                    repository: &repo.name,
                    qualified_name,
                },
            )
            .await?;

        Ok(data.repository.and_then(|r| r.reference))
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn closed_issues_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueSummary>, GitHubError> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!(
            "{}/repos/{}/{}/issues",
            self.api_url.as_str().trim_end_matches('/'),
            repo.owner,
            repo.name
        );

        debug!(%since, "listing closed issues");
        let issues = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .query(&[("state", "closed"), ("since", since.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<IssueSummary>>()
            .await?;
        debug!(count = issues.len(), "received closed issues");

        Ok(issues)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<PullRequestNode>, GitHubError> {
        debug!("fetching pull request detail");
        let data: PullRequestQueryData = self
            .graphql(
                queries::PULL_REQUEST_QUERY,
                PullRequestQueryVariables {
                    owner: &repo.owner,
                    repository: &repo.name,
                    number,
                    page_size: PAGE_SIZE,
                },
            )
            .await?;

        Ok(data.repository.and_then(|r| r.pull_request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use types::GitObject;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> RepoRef {
        RepoRef::new("acme", "widgets")
    }

    #[test]
    fn test_parse_repo_bare_name() {
        let repo = parse_repo("widgets", "acme").unwrap();
        assert_eq!(repo, RepoRef::new("acme", "widgets"));
    }

    #[test]
    fn test_parse_repo_with_owner() {
        let repo = parse_repo("other/gadgets", "acme").unwrap();
        assert_eq!(repo, RepoRef::new("other", "gadgets"));
    }

    #[test]
    fn test_parse_invalid_repo() {
        assert!(parse_repo("", "acme").is_err());
        assert!(parse_repo("a/b/c", "acme").is_err());
        assert!(parse_repo("/widgets", "acme").is_err());
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(matches!(
            GitHubClient::new("t", "not a url"),
            Err(GitHubError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_tag_ref_annotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "variables": {"owner": "acme", "repository": "widgets", "qualifiedName": "refs/tags/v1.0"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"repository": {"ref": {
                    "name": "v1.0",
                    "target": {
                        "__typename": "Tag",
                        "target": {"__typename": "Commit", "oid": "abc", "committedDate": "2023-01-01T00:00:00Z"}
                    }
                }}}
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let tag = client.tag_ref(&repo(), "refs/tags/v1.0").await.unwrap().unwrap();
        assert_eq!(tag.name, "v1.0");
        assert!(matches!(tag.target, GitObject::Tag(_)));
    }

    #[tokio::test]
    async fn test_tag_ref_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"repository": {"ref": null}}})),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let tag = client.tag_ref(&repo(), "refs/tags/nope").await.unwrap();
        assert!(tag.is_none());
    }

    #[tokio::test]
    async fn test_graphql_errors_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Bad credentials"}]
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let err = client.tag_ref(&repo(), "refs/tags/v1.0").await.unwrap_err();
        match err {
            GitHubError::GraphQl(message) => assert!(message.contains("Bad credentials")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_closed_issues_since_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .and(query_param("state", "closed"))
            .and(query_param("since", "2023-01-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 103, "title": "c"},
                {"number": 102, "title": "b"},
                {"number": 101, "title": "a"}
            ])))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let since = "2023-01-01T00:00:00Z".parse().unwrap();
        let issues = client.closed_issues_since(&repo(), since).await.unwrap();
        let numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![103, 102, 101]);
    }

    #[tokio::test]
    async fn test_closed_issues_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let since = "2023-01-01T00:00:00Z".parse().unwrap();
        let err = client.closed_issues_since(&repo(), since).await.unwrap_err();
        assert!(matches!(err, GitHubError::Http(_)));
    }

    #[tokio::test]
    async fn test_pull_request_not_resolved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"number": 150, "pageSize": 10}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"repository": {"pullRequest": null}},
                "errors": [{"message": "Could not resolve to a PullRequest with the number of 150."}]
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let pr = client.pull_request(&repo(), 150).await.unwrap();
        assert!(pr.is_none());
    }

    #[tokio::test]
    async fn test_pull_request_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"repository": {"pullRequest": {
                    "number": 101,
                    "title": "Add feature",
                    "createdAt": "2023-01-02T00:00:00Z",
                    "mergedAt": "2023-01-03T00:00:00Z",
                    "url": "https://github.com/acme/widgets/pull/101",
                    "body": "Adds it",
                    "merged": true,
                    "baseRefName": "master",
                    "author": {"login": "alice", "name": "Alice"},
                    "mergedBy": {"login": "bob"},
                    "mergeCommit": {"oid": "cafe"},
                    "files": {"nodes": [{"path": "a.rs"}, {"path": "b.rs"}]},
                    "reviews": {"nodes": [{
                        "author": {"login": "carol", "name": "Carol"},
                        "state": "APPROVED",
                        "updatedAt": "2023-01-02T12:00:00Z"
                    }]}
                }}}
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("secret", &server.uri()).unwrap();
        let pr = client.pull_request(&repo(), 101).await.unwrap().unwrap();
        assert_eq!(pr.number, 101);
        assert_eq!(pr.base_ref_name, "master");
        assert!(pr.merged_by.unwrap().name.is_none());
        assert_eq!(pr.reviews.unwrap().nodes.len(), 1);
    }
}
