use crate::args::Args;
use log::debug;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use userlist::loader::MAX_PAGE_SIZE;
use userlist::{Action, LoaderOptions, OrganizationKey, OwnDomains};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{templates} template files but {outputs} output files given, each template needs one output file")]
    Mismatch { templates: usize, outputs: usize },
}

/// Settings of a single run, assembled from the command line and the environment.
#[derive(Debug)]
pub struct Config {
    pub action: Option<Action>,
    pub enterprise: Option<String>,
    pub github_token: Option<SecretString>,
    pub template_files: Vec<PathBuf>,
    pub output_files: Vec<PathBuf>,
    pub own_domains: OwnDomains,
    pub api_url: String,
    pub page_size: u32,
    pub inner_page_size: u32,
    pub organization_key: OrganizationKey,
    pub organizations: Vec<String>,
    pub max_organization_requests: usize,
    pub timeout: Duration,
    pub json_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            action: None,
            enterprise: None,
            github_token: None,
            template_files: Vec::new(),
            output_files: Vec::new(),
            own_domains: OwnDomains::default(),
            api_url: github_client::DEFAULT_GITHUB_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            inner_page_size: MAX_PAGE_SIZE,
            organization_key: OrganizationKey::default(),
            organizations: Vec::new(),
            max_organization_requests: 1,
            timeout: github_client::DEFAULT_TIMEOUT,
            json_file: None,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            action: args.action,
            enterprise: args.enterprise,
            github_token: args.github_token,
            template_files: args.template_files,
            output_files: args.output_files,
            own_domains: OwnDomains::new(args.own_domains),
            api_url: args.api_url,
            page_size: args.page_size,
            inner_page_size: args.inner_page_size,
            organization_key: args.organization_key,
            organizations: args
                .organizations
                .into_iter()
                .map(|organization| organization.trim().to_string())
                .filter(|organization| !organization.is_empty())
                .collect(),
            max_organization_requests: args.max_organization_requests,
            timeout: Duration::from_secs(args.timeout),
            json_file: args.json_file,
        }
    }
}

impl Config {
    /// Checks everything a run needs before the first request goes out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.action.is_none() {
            return Err(ConfigError::Missing("Action"));
        }
        if self.enterprise.as_deref().map_or(true, |slug| slug.trim().is_empty()) {
            return Err(ConfigError::Missing("Enterprise"));
        }
        if self
            .github_token
            .as_ref()
            .map_or(true, |token| token.expose_secret().trim().is_empty())
        {
            return Err(ConfigError::Missing("GitHub token"));
        }
        if self.template_files.is_empty() {
            return Err(ConfigError::Missing("Template file"));
        }
        if self.output_files.is_empty() {
            return Err(ConfigError::Missing("Output file"));
        }
        if self.template_files.len() != self.output_files.len() {
            return Err(ConfigError::Mismatch {
                templates: self.template_files.len(),
                outputs: self.output_files.len(),
            });
        }
        debug!(
            "Valid config: enterprise {:?}, templates {:?}, outputs {:?}",
            self.enterprise, self.template_files, self.output_files
        );
        Ok(())
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            page_size: self.page_size,
            inner_page_size: self.inner_page_size,
            organization_key: self.organization_key,
            own_domains: self.own_domains.clone(),
            organizations: self.organizations.clone(),
            max_organization_requests: self.max_organization_requests.max(1),
        }
    }
}
