pub mod args;
pub mod config;
pub mod error;
pub mod render;
pub mod report;

pub use args::Args;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use report::Report;

use github_client::{GithubClient, GithubClientBuilder};
use log::LevelFilter;

/// Logs at info level, or debug when `verbose` is set. `RUST_LOG` takes precedence.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("hyper", LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Info)
        .parse_default_env()
        .init();
}

pub fn github_client(config: &Config) -> Result<GithubClient> {
    let token = config
        .github_token
        .clone()
        .ok_or(ConfigError::Missing("GitHub token"))?;
    let client = GithubClientBuilder::default()
        .with_github_url(&config.api_url)
        .with_timeout(config.timeout)
        .try_with_token(token)?
        .build()?;
    Ok(client)
}

/// Validates the arguments, loads the user list and renders every template.
pub async fn generate(args: Args) -> Result<Report> {
    let mut report = Report::new(Config::from(args));
    report.validate()?;

    let client = github_client(report.config())?;
    report.load(&client).await?;

    report.write_json()?;
    report.render()?;
    Ok(report)
}
