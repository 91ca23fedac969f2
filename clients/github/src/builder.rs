use crate::limiter::RateLimiter;
use crate::GithubClient;
use anyhow::Context;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;
use userlist::api::Result;

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("enterprise-userlist/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            client_builder: ClientBuilder::default(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            headers,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: secrecy::SecretString) -> Result<GithubClientBuilder> {
        let mut value = HeaderValue::from_str(&format!("bearer {}", token.expose_secret()))
            .context("Token is not a valid header value")?;
        value.set_sensitive(true);
        Ok(self.with_header_value(header::AUTHORIZATION, value))
    }

    /// Base of the REST API. The GraphQL endpoint is `<url>/graphql`, which also fits
    /// GitHub Enterprise Server bases such as `https://ghe.example.com/api`.
    pub fn with_github_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.github_url = url.as_ref().to_string();
        self
    }

    /// Upper bound of a single request. An elapsed timeout fails the request like any other
    /// transport error.
    pub fn with_timeout(mut self, timeout: Duration) -> GithubClientBuilder {
        self.timeout = timeout;
        self
    }

    fn with_header_value(mut self, key: HeaderName, val: HeaderValue) -> GithubClientBuilder {
        self.headers.insert(key, val);
        self
    }

    pub fn build(self) -> Result<GithubClient> {
        let graphql_url = graphql_url(&self.github_url)?;
        let client = self
            .client_builder
            .default_headers(self.headers)
            .timeout(self.timeout)
            .build()
            .context("Unable to build HTTP client")?;
        Ok(GithubClient {
            client,
            graphql_url,
            limiter: RateLimiter::default(),
        })
    }
}

fn graphql_url(github_url: &str) -> anyhow::Result<Url> {
    let base = format!("{}/", github_url.trim_end_matches('/'));
    let base = Url::parse(&base).with_context(|| format!("Invalid GitHub API URL {}", github_url))?;
    Ok(base.join("graphql")?)
}

#[test]
fn graphql_url_test() -> anyhow::Result<()> {
    assert_eq!(graphql_url("https://api.github.com")?.as_str(), "https://api.github.com/graphql");
    assert_eq!(
        graphql_url("https://ghe.example.com/api/")?.as_str(),
        "https://ghe.example.com/api/graphql"
    );
    assert!(graphql_url("not a url").is_err());
    Ok(())
}

#[test]
fn token_header_is_sensitive() -> anyhow::Result<()> {
    let builder = GithubClientBuilder::default().try_with_token(secrecy::SecretString::new("s3cr3t".to_string()))?;
    let value = builder.headers.get(header::AUTHORIZATION).expect("authorization header");
    assert!(value.is_sensitive());
    assert_eq!(value.to_str()?, "bearer s3cr3t");
    assert!(!format!("{:?}", value).contains("s3cr3t"));
    Ok(())
}
