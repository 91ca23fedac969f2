use serde::Deserialize;
use userlist::api;
use userlist::tree::Enterprise;

pub const MEMBERS_QUERY: &str = r#"
query EnterpriseMembers($slug: String!, $first: Int!, $after: String, $innerFirst: Int!) {
  enterprise(slug: $slug) {
    slug
    name
    ownerInfo {
      samlIdentityProvider {
        externalIdentities(first: $first, after: $after) {
          pageInfo { hasNextPage endCursor }
          nodes {
            samlIdentity { nameId }
            user {
              login
              name
              email
              contributionsCollection { contributionCalendar { totalContributions } }
              organizations(first: $innerFirst) {
                pageInfo { hasNextPage endCursor }
                nodes { login name }
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const ORGANIZATIONS_QUERY: &str = r#"
query EnterpriseOrganizations($slug: String!, $first: Int!, $after: String) {
  enterprise(slug: $slug) {
    slug
    name
    organizations(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { login name }
    }
  }
}
"#;

pub const REPOSITORIES_QUERY: &str = r#"
query OrganizationRepositories($login: String!, $first: Int!, $after: String, $innerFirst: Int!) {
  organization(login: $login) {
    repositories(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        collaborators(first: $innerFirst, affiliation: OUTSIDE) {
          pageInfo { hasNextPage endCursor }
          nodes {
            login
            name
            email
            contributionsCollection { contributionCalendar { totalContributions } }
          }
        }
      }
    }
  }
}
"#;

#[derive(Deserialize, Debug)]
pub struct Response<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl From<PageInfo> for api::PageInfo {
    fn from(page_info: PageInfo) -> Self {
        api::PageInfo {
            has_next_page: page_info.has_next_page,
            end_cursor: page_info.end_cursor,
        }
    }
}

/// Nodes the viewer may not see come back as `null` and are dropped.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn into_api<U: From<T>>(self) -> api::Connection<U> {
        let nodes = self.nodes.into_iter().flatten().map(U::from).collect();
        api::Connection::new(nodes, self.page_info.into())
    }
}

#[derive(Deserialize, Debug)]
pub struct Organization {
    pub login: String,
    pub name: Option<String>,
}

impl From<Organization> for api::OrganizationNode {
    fn from(organization: Organization) -> Self {
        api::OrganizationNode {
            login: organization.login,
            name: organization.name.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contributions_collection: Option<ContributionsCollection>,
    pub organizations: Option<Connection<Organization>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u32,
}

impl From<Account> for api::AccountNode {
    fn from(account: Account) -> Self {
        api::AccountNode {
            login: account.login,
            name: account.name.unwrap_or_default(),
            email: account.email.unwrap_or_default(),
            contributions: account
                .contributions_collection
                .map(|collection| collection.contribution_calendar.total_contributions)
                .unwrap_or_default(),
            organizations: account.organizations.map(Connection::into_api).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct MembersData {
    pub enterprise: Option<MembersEnterprise>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MembersEnterprise {
    pub slug: String,
    pub name: String,
    pub owner_info: Option<OwnerInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub saml_identity_provider: Option<IdentityProvider>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProvider {
    pub external_identities: Connection<ExternalIdentity>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentity {
    pub saml_identity: Option<SamlIdentity>,
    pub user: Option<Account>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SamlIdentity {
    pub name_id: Option<String>,
}

impl From<ExternalIdentity> for api::IdentityNode {
    fn from(identity: ExternalIdentity) -> Self {
        api::IdentityNode {
            name_id: identity.saml_identity.and_then(|saml| saml.name_id),
            user: identity.user.map(api::AccountNode::from),
        }
    }
}

impl From<MembersEnterprise> for api::MembersPage {
    fn from(enterprise: MembersEnterprise) -> Self {
        let identities = enterprise
            .owner_info
            .and_then(|owner| owner.saml_identity_provider)
            .map(|provider| provider.external_identities.into_api());
        api::MembersPage {
            enterprise: Enterprise::new(enterprise.slug, enterprise.name),
            identities,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct OrganizationsData {
    pub enterprise: Option<OrganizationsEnterprise>,
}

#[derive(Deserialize, Debug)]
pub struct OrganizationsEnterprise {
    pub slug: String,
    pub name: String,
    pub organizations: Connection<Organization>,
}

impl From<OrganizationsEnterprise> for api::OrganizationsPage {
    fn from(enterprise: OrganizationsEnterprise) -> Self {
        api::OrganizationsPage {
            enterprise: Enterprise::new(enterprise.slug, enterprise.name),
            organizations: enterprise.organizations.into_api(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct RepositoriesData {
    pub organization: Option<RepositoriesOrganization>,
}

#[derive(Deserialize, Debug)]
pub struct RepositoriesOrganization {
    pub repositories: Connection<Repository>,
}

#[derive(Deserialize, Debug)]
pub struct Repository {
    pub name: String,
    pub collaborators: Option<Connection<Account>>,
}

impl From<Repository> for api::RepositoryNode {
    fn from(repository: Repository) -> Self {
        api::RepositoryNode {
            name: repository.name,
            collaborators: repository.collaborators.map(Connection::into_api).unwrap_or_default(),
        }
    }
}
