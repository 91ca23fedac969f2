//! GitHub GraphQL implementation of [`userlist::api::Client`].

mod builder;
mod limiter;
mod payload;

pub use builder::{GithubClientBuilder, DEFAULT_GITHUB_URL, DEFAULT_TIMEOUT};

use anyhow::Context;
use async_trait::async_trait;
use limiter::RateLimiter;
use log::debug;
use reqwest::Client;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;
use userlist::api::{Connection, Error, MembersPage, OrganizationsPage, PageRequest, RepositoryNode, Result};

pub struct GithubClient {
    client: Client,
    graphql_url: Url,
    limiter: RateLimiter,
}

impl GithubClient {
    async fn query<D: DeserializeOwned>(&self, operation: &str, query: &str, variables: Value) -> Result<D> {
        self.limiter.wait().await;
        debug!("Querying {} with {}", operation, variables);
        let response = self
            .client
            .post(self.graphql_url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .with_context(|| format!("Unable to query {}", operation))?;
        if let Err(err) = self.limiter.reset_limiter(response.headers()).await {
            debug!("Rate limit not updated: {:#}", err);
        }
        read_response::<D>(response).await
    }
}

async fn read_response<D: DeserializeOwned>(response: Response) -> Result<D> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Status {
            status: status.as_u16(),
            body,
        });
    }
    let body = response
        .json::<payload::Response<D>>()
        .await
        .context("Unable to decode GraphQL response")?;
    into_data(body)
}

/// Any GraphQL error fails the query, even next to partial data.
fn into_data<D>(body: payload::Response<D>) -> Result<D> {
    if !body.errors.is_empty() {
        return Err(Error::GraphQl(body.errors.into_iter().map(|error| error.message).collect()));
    }
    body.data
        .ok_or_else(|| Error::GraphQl(vec!["Response carries no data".to_string()]))
}

#[async_trait]
impl userlist::api::Client for GithubClient {
    async fn members(&self, enterprise: &str, page: &PageRequest) -> Result<MembersPage> {
        let variables = json!({
            "slug": enterprise,
            "first": page.first,
            "after": page.after,
            "innerFirst": page.inner_first,
        });
        let data: payload::MembersData = self
            .query("EnterpriseMembers", payload::MEMBERS_QUERY, variables)
            .await?;
        let enterprise_data = data
            .enterprise
            .ok_or_else(|| Error::EnterpriseNotFound(enterprise.to_string()))?;
        Ok(enterprise_data.into())
    }

    async fn organizations(&self, enterprise: &str, page: &PageRequest) -> Result<OrganizationsPage> {
        let variables = json!({
            "slug": enterprise,
            "first": page.first,
            "after": page.after,
        });
        let data: payload::OrganizationsData = self
            .query("EnterpriseOrganizations", payload::ORGANIZATIONS_QUERY, variables)
            .await?;
        let enterprise_data = data
            .enterprise
            .ok_or_else(|| Error::EnterpriseNotFound(enterprise.to_string()))?;
        Ok(enterprise_data.into())
    }

    async fn repositories(&self, organization: &str, page: &PageRequest) -> Result<Connection<RepositoryNode>> {
        let variables = json!({
            "login": organization,
            "first": page.first,
            "after": page.after,
            "innerFirst": page.inner_first,
        });
        let data: payload::RepositoriesData = self
            .query("OrganizationRepositories", payload::REPOSITORIES_QUERY, variables)
            .await?;
        let organization_data = data
            .organization
            .ok_or_else(|| Error::OrganizationNotFound(organization.to_string()))?;
        Ok(organization_data.repositories.into_api())
    }
}
