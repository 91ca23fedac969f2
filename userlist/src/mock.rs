//! Scripted in-memory [`Client`] for loader tests.
//!
//! Every collection is given as a list of pages. Cursors are the index of the next page,
//! so a page reports `hasNextPage` unless it is the last one.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::api::{
    AccountNode, Client, Connection, Error, IdentityNode, MembersPage, OrganizationNode, OrganizationsPage, PageInfo,
    PageRequest, RepositoryNode, Result,
};
use crate::tree::Enterprise;

#[derive(Default)]
pub struct MockClient {
    enterprise: Enterprise,
    member_pages: Vec<Vec<IdentityNode>>,
    without_identity_provider: bool,
    organization_pages: Vec<Vec<OrganizationNode>>,
    repository_pages: HashMap<String, Vec<Vec<RepositoryNode>>>,
    /// Organization login -> index of the first failing page.
    failures: HashMap<String, usize>,
    stalled: HashSet<String>,
    enterprise_failure: bool,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(slug: &str, name: &str) -> Self {
        MockClient {
            enterprise: Enterprise::new(slug, name),
            ..Default::default()
        }
    }

    pub fn with_member_page(mut self, identities: Vec<IdentityNode>) -> Self {
        self.member_pages.push(identities);
        self
    }

    pub fn without_identity_provider(mut self) -> Self {
        self.without_identity_provider = true;
        self
    }

    pub fn with_organization_page(mut self, organizations: &[&str]) -> Self {
        let page = organizations.iter().map(|login| organization(login)).collect();
        self.organization_pages.push(page);
        self
    }

    pub fn with_repository_page(mut self, organization: &str, repositories: Vec<RepositoryNode>) -> Self {
        self.repository_pages
            .entry(organization.to_string())
            .or_default()
            .push(repositories);
        self
    }

    pub fn failing_at(mut self, organization: &str, page: usize) -> Self {
        self.failures.insert(organization.to_string(), page);
        self
    }

    /// Repository pages of `organization` claim more pages but never return a cursor.
    pub fn stalling(mut self, organization: &str) -> Self {
        self.stalled.insert(organization.to_string());
        self
    }

    pub fn failing_enterprise(mut self) -> Self {
        self.enterprise_failure = true;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }
}

fn page_index(page: &PageRequest) -> usize {
    page.after.as_deref().map_or(0, |cursor| cursor.parse().unwrap())
}

fn connection<T: Clone>(pages: &[Vec<T>], index: usize) -> Connection<T> {
    let nodes = pages.get(index).cloned().unwrap_or_default();
    let has_next_page = index + 1 < pages.len();
    let end_cursor = has_next_page.then(|| (index + 1).to_string());
    Connection::new(nodes, PageInfo { has_next_page, end_cursor })
}

pub fn organization(login: &str) -> OrganizationNode {
    OrganizationNode {
        login: login.to_string(),
        name: login.to_uppercase(),
    }
}

pub fn account(login: &str) -> AccountNode {
    AccountNode {
        login: login.to_string(),
        name: format!("{} name", login),
        email: String::new(),
        contributions: login.len() as u32,
        organizations: Connection::default(),
    }
}

pub fn member(login: &str, email: &str, organizations: &[&str]) -> IdentityNode {
    let mut user = account(login);
    user.organizations = Connection::new(
        organizations.iter().map(|login| organization(login)).collect(),
        PageInfo::default(),
    );
    IdentityNode {
        name_id: Some(email.to_string()),
        user: Some(user),
    }
}

pub fn repository(name: &str, collaborators: &[&str]) -> RepositoryNode {
    RepositoryNode {
        name: name.to_string(),
        collaborators: Connection::new(
            collaborators.iter().map(|login| account(login)).collect(),
            PageInfo::default(),
        ),
    }
}

#[async_trait]
impl Client for MockClient {
    async fn members(&self, enterprise: &str, page: &PageRequest) -> Result<MembersPage> {
        self.record(format!("members {} {:?}", enterprise, page.after));
        if self.enterprise_failure {
            return Err(Error::EnterpriseNotFound(enterprise.to_string()));
        }
        let identities = (!self.without_identity_provider).then(|| connection(&self.member_pages, page_index(page)));
        Ok(MembersPage {
            enterprise: self.enterprise.clone(),
            identities,
        })
    }

    async fn organizations(&self, enterprise: &str, page: &PageRequest) -> Result<OrganizationsPage> {
        self.record(format!("organizations {} {:?}", enterprise, page.after));
        if self.enterprise_failure {
            return Err(Error::EnterpriseNotFound(enterprise.to_string()));
        }
        Ok(OrganizationsPage {
            enterprise: self.enterprise.clone(),
            organizations: connection(&self.organization_pages, page_index(page)),
        })
    }

    async fn repositories(&self, organization: &str, page: &PageRequest) -> Result<Connection<RepositoryNode>> {
        self.record(format!("repositories {} {:?}", organization, page.after));
        let index = page_index(page);
        if self.failures.get(organization) == Some(&index) {
            return Err(Error::Other(anyhow!("connection reset while loading {}", organization)));
        }
        let pages = self.repository_pages.get(organization).map(Vec::as_slice).unwrap_or_default();
        let mut repositories = connection(pages, index);
        if self.stalled.contains(organization) {
            repositories.page_info = PageInfo {
                has_next_page: true,
                end_cursor: None,
            };
        }
        Ok(repositories)
    }
}
