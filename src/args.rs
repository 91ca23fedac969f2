use clap::Parser;
use secrecy::SecretString;
use std::{
    fmt::{Debug, Display},
    path::PathBuf,
    str::FromStr,
};
use userlist::loader::MAX_PAGE_SIZE;
use userlist::{Action, OrganizationKey};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// The action to perform: members or collaborators
    #[clap(short, long, env)]
    pub action: Option<Action>,

    /// The GitHub Enterprise to query
    #[clap(short, long, env)]
    pub enterprise: Option<String>,

    /// The GitHub token to use for authentication
    #[clap(long, env, hide_env_values = true)]
    pub github_token: Option<SecretString>,

    /// Comma separated template files to render the result with
    #[clap(short, long, env, value_delimiter = ',')]
    pub template_files: Vec<PathBuf>,

    /// Comma separated output files, one per template file
    #[clap(short, long, env, value_delimiter = ',')]
    pub output_files: Vec<PathBuf>,

    /// Comma separated list of domains to consider as own domains
    #[clap(long, env, value_delimiter = ',')]
    pub own_domains: Vec<String>,

    /// Verbosity level, 0=info, 1=debug
    #[clap(short, long, env, default_value_t = 0)]
    pub verbose: u8,

    /// GitHub API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Page size of the paginated queries
    #[clap(long, env, default_value_t = MAX_PAGE_SIZE, parse(try_from_str=page_size_in_range))]
    pub page_size: u32,

    /// Organizations per member and outside collaborators per repository
    #[clap(long, env, default_value_t = MAX_PAGE_SIZE, parse(try_from_str=page_size_in_range))]
    pub inner_page_size: u32,

    /// Identity of an organization when merging: login-or-name, login or name
    #[clap(long, env, default_value = "login-or-name")]
    pub organization_key: OrganizationKey,

    /// Comma separated organization logins to restrict the collaborators action to
    #[clap(long, env, value_delimiter = ',')]
    pub organizations: Vec<String>,

    /// Maximal parallel organization requests
    #[clap(long, env, default_value_t = 1, parse(try_from_str=max_organization_requests_in_range))]
    pub max_organization_requests: usize,

    /// Request timeout in seconds
    #[clap(long, env, default_value_t = 60, parse(try_from_str=timeout_in_range))]
    pub timeout: u64,

    /// Write the loaded user list as JSON to this file, `-` for stdout
    #[clap(long, env)]
    pub json_file: Option<PathBuf>,
}

fn page_size_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, MAX_PAGE_SIZE, "page size".to_string())
}

fn max_organization_requests_in_range(value: &str) -> clap::Result<usize, String> {
    number_in_range(value, 1, 32, "max_organization_requests".to_string())
}

fn timeout_in_range(value: &str) -> clap::Result<u64, String> {
    number_in_range(value, 1, 3600, "timeout".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
