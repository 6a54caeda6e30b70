mod config;
mod github;
mod pipeline;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

/// PR Report — collects the merged pull requests between a release tag and
/// the release branch head for one or more GitHub repositories.
#[derive(Parser, Debug)]
#[command(name = "pr-report", version, about)]
struct Cli {
    /// Tag of the previous release (e.g., v2.0)
    #[arg(short, long)]
    since: String,

    /// Label of the release being reported (e.g., v2.8)
    #[arg(short, long)]
    until: String,

    /// Comma-separated repositories, `name` or `owner/name`.
    /// Defaults to `repos` from .pr-report.toml.
    #[arg(short, long, value_delimiter = ',')]
    repos: Vec<String>,

    /// GitHub API token (defaults to config or GITHUB_TOKEN)
    #[arg(short, long)]
    token: Option<String>,

    /// Organization owning the repositories
    #[arg(long)]
    org: Option<String>,

    /// Base branch pull requests must be merged into
    #[arg(short, long)]
    branch: Option<String>,

    /// Directory to write markdown reports into; prints to the terminal otherwise
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let settings = config::Config::load()?.resolve(config::Overrides {
        token: cli.token,
        organization: cli.org,
        release_branch: cli.branch,
        output_dir: cli.output,
        repos: cli.repos,
    })?;
    info!(
        since = %cli.since,
        until = %cli.until,
        branch = %settings.release_branch,
        repos = ?settings.repos,
        "starting report run"
    );

    let client = github::GitHubClient::new(&settings.token, &settings.api_url)?;

    let mut failed = 0;
    for entry in &settings.repos {
        let repo = match github::parse_repo(entry, &settings.organization) {
            Ok(repo) => repo,
            Err(e) => {
                error!(repo = %entry, error = %e, "skipping repository");
                failed += 1;
                continue;
            }
        };

        let span = info_span!("repository", slug = %repo.slug());
        let result = pipeline::run(&client, &repo, &cli.since, &settings.release_branch)
            .instrument(span.clone())
            .await;
        let _entered = span.enter();

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "repository run failed");
                failed += 1;
                continue;
            }
        };

        if records.is_empty() {
            warn!("no merged pull requests in range, skipping report");
            continue;
        }

        let built = report::build(&repo, &cli.until, records, chrono::Utc::now());
        match report::output(&built, settings.output_dir.as_deref()) {
            Ok(Some(path)) => info!(path = %path.display(), "report written"),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "failed to write report");
                failed += 1;
            }
        }
    }

    if failed > 0 && failed == settings.repos.len() {
        return Err(format!("all {failed} repositories failed").into());
    }
    info!(repositories = settings.repos.len(), failed, "done");

    Ok(())
}
