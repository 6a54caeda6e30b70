/// Resolve a fully-qualified tag ref to its target, unwrapping one annotated tag.
pub const TAG_QUERY: &str = r#"
query TagTarget($owner: String!, $repository: String!, $qualifiedName: String!) {
  repository(owner: $owner, name: $repository) {
    ref(qualifiedName: $qualifiedName) {
      name
      target {
        __typename
        ... on Commit {
          oid
          committedDate
        }
        ... on Tag {
          target {
            __typename
            ... on Commit {
              oid
              committedDate
            }
          }
        }
      }
    }
  }
}
"#;

/// Full pull request detail. Files and approving reviews are first page only.
pub const PULL_REQUEST_QUERY: &str = r#"
query PullRequestDetail($owner: String!, $repository: String!, $number: Int!, $pageSize: Int!) {
  repository(owner: $owner, name: $repository) {
    pullRequest(number: $number) {
      number
      title
      createdAt
      mergedAt
      url
      body
      merged
      baseRefName
      author {
        login
        ... on User {
          name
        }
      }
      mergedBy {
        login
        ... on User {
          name
        }
      }
      mergeCommit {
        oid
      }
      files(first: $pageSize) {
        nodes {
          path
        }
      }
      reviews(first: $pageSize, states: APPROVED) {
        nodes {
          author {
            login
            ... on User {
              name
            }
          }
          state
          updatedAt
        }
      }
    }
  }
}
"#;
