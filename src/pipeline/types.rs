use chrono::{DateTime, SecondsFormat, Utc};

use crate::github::types::Actor;

/// Login recorded for an account that no longer exists on the host.
pub const FORMER_EMPLOYEE: &str = "FormerEmployee*";

/// Committed time of the commit behind the "since" tag.
/// Pull requests closed after this instant are in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Cutoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// A pull request number found by the collector, not yet checked for
/// merge state or base branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub number: u64,
    pub title: String,
}

/// A user reference on a record.
///
/// Built from an optional host account: an account that no longer resolves
/// (deleted user, or an empty login) becomes the [`FORMER_EMPLOYEE`] sentinel
/// with an empty name. The fields are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub user: String,
    pub name: String,
}

impl Person {
    pub fn former_employee() -> Self {
        Self {
            user: FORMER_EMPLOYEE.to_string(),
            name: String::new(),
        }
    }

    pub fn is_former_employee(&self) -> bool {
        self.user == FORMER_EMPLOYEE
    }
}

impl From<Option<Actor>> for Person {
    fn from(actor: Option<Actor>) -> Self {
        match actor {
            Some(actor) if !actor.login.is_empty() => Person {
                user: actor.login,
                name: actor.name.unwrap_or_default(),
            },
            _ => Person::former_employee(),
        }
    }
}

/// An approving review on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub user: String,
    pub name: String,
    pub state: String,
    pub updated_at: DateTime<Utc>,
}

/// The normalized form of one merged pull request that targets the
/// release branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    /// Pull request body; empty when none was written.
    pub description: String,
    pub url: String,
    pub creator: Person,
    pub created_at: DateTime<Utc>,
    pub merged_at: DateTime<Utc>,
    pub merged_by: Person,
    /// Merge commit hash; empty if the host recorded none.
    pub commit: String,
    /// Changed paths, first page only, in host order.
    pub files: Vec<String>,
    /// Approving reviews, first page only, in host order.
    pub reviewers: Vec<Reviewer>,
}
