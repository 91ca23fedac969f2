use async_trait::async_trait;
use derive_more::Constructor;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::tree::Enterprise;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Enterprise {0} not found")]
    EnterpriseNotFound(String),
    #[error("Organization {0} not found")]
    OrganizationNotFound(String),
    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Which people to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    /// Enterprise members known through the SAML identity provider.
    Members,
    /// Outside collaborators of every repository of every organization.
    Collaborators,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Connection {
            nodes: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

/// Cursor window of a single request. `inner_first` bounds the nested
/// connection that is fetched along with every node without paginating it.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct PageRequest {
    pub after: Option<String>,
    pub first: u32,
    pub inner_first: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationNode {
    pub login: String,
    pub name: String,
}

/// A GitHub account as returned inside a member or collaborator listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountNode {
    pub login: String,
    pub name: String,
    pub email: String,
    pub contributions: u32,
    pub organizations: Connection<OrganizationNode>,
}

/// An external identity of the enterprise SAML provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityNode {
    pub name_id: Option<String>,
    pub user: Option<AccountNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryNode {
    pub name: String,
    pub collaborators: Connection<AccountNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersPage {
    pub enterprise: Enterprise,
    /// `None` when the enterprise has no SAML identity provider.
    pub identities: Option<Connection<IdentityNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationsPage {
    pub enterprise: Enterprise,
    pub organizations: Connection<OrganizationNode>,
}

#[async_trait]
pub trait Client: Send + Sync {
    async fn members(&self, enterprise: &str, page: &PageRequest) -> Result<MembersPage>;

    async fn organizations(&self, enterprise: &str, page: &PageRequest) -> Result<OrganizationsPage>;

    /// Repositories of `organization`, each with its outside collaborators.
    async fn repositories(&self, organization: &str, page: &PageRequest) -> Result<Connection<RepositoryNode>>;
}

#[test]
fn action_parse_test() {
    assert_eq!("members".parse::<Action>().unwrap(), Action::Members);
    assert_eq!("Collaborators".parse::<Action>().unwrap(), Action::Collaborators);
    assert!("owners".parse::<Action>().is_err());
    assert_eq!(Action::Collaborators.to_string(), "collaborators");
}
