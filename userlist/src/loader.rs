use futures::{stream, StreamExt};
use log::{debug, info, warn};

use crate::api::{AccountNode, Action, Client, Error, IdentityNode, OrganizationNode, RepositoryNode, Result};
use crate::domains::OwnDomains;
use crate::paginator::{Paginator, Progress};
use crate::tree::{OrganizationKey, User, UserList};

/// Largest window accepted by the GitHub GraphQL API.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Window of the paginated connections: members, organizations and repositories.
    pub page_size: u32,
    /// Window of the connections fetched along with each node: the organizations of a
    /// member and the outside collaborators of a repository.
    pub inner_page_size: u32,
    pub organization_key: OrganizationKey,
    pub own_domains: OwnDomains,
    /// Organization logins to restrict the collaborators run to. Empty means all.
    pub organizations: Vec<String>,
    /// Organizations whose repositories are fetched concurrently.
    pub max_organization_requests: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            page_size: MAX_PAGE_SIZE,
            inner_page_size: MAX_PAGE_SIZE,
            organization_key: OrganizationKey::default(),
            own_domains: OwnDomains::default(),
            organizations: Vec::new(),
            max_organization_requests: 1,
        }
    }
}

/// Repositories of one organization, fetched but not yet merged.
struct Harvest {
    organization: OrganizationNode,
    repositories: Vec<RepositoryNode>,
    error: Option<Error>,
    stalled: bool,
}

pub struct Loader<'a, CLIENT>
where
    CLIENT: Client,
{
    client: &'a CLIENT,
    enterprise: String,
    options: LoaderOptions,
}

impl<'a, CLIENT> Loader<'a, CLIENT>
where
    CLIENT: Client,
{
    pub fn new(client: &'a CLIENT, enterprise: impl Into<String>, options: LoaderOptions) -> Self {
        Loader {
            client,
            enterprise: enterprise.into(),
            options,
        }
    }

    /// Builds a fresh tree for `action`.
    ///
    /// Failing to query the enterprise itself aborts the load. Failures below it end up
    /// as warnings in the returned list.
    pub async fn load(&self, action: Action) -> Result<UserList> {
        info!("Loading {} of enterprise {}", action, self.enterprise);
        let mut list = UserList::new(self.options.organization_key);
        match action {
            Action::Members => self.load_members(&mut list).await?,
            Action::Collaborators => self.load_collaborators(&mut list).await?,
        }
        info!(
            "Loaded {} users of enterprise {} with {} warnings",
            list.users().len(),
            self.enterprise,
            list.warnings().len()
        );
        Ok(list)
    }

    async fn load_members(&self, list: &mut UserList) -> Result<()> {
        let mut paginator = Paginator::new(self.options.page_size, self.options.inner_page_size);
        let mut offset = 0;
        while let Some(request) = paginator.next_page() {
            let page = self.client.members(&self.enterprise, &request).await?;
            list.set_enterprise(page.enterprise);
            let identities = match page.identities {
                Some(identities) => identities,
                None => {
                    warn!("Enterprise {} has no SAML identity provider", self.enterprise);
                    list.add_warning(format!(
                        "Enterprise {} has no SAML identity provider, no members were loaded",
                        self.enterprise
                    ));
                    return Ok(());
                }
            };
            debug!(
                "Loaded members page {} with {} identities",
                paginator.pages() + 1,
                identities.nodes.len()
            );
            let count = identities.nodes.len();
            for (index, identity) in identities.nodes.into_iter().enumerate() {
                self.add_member(list, offset + index + 1, identity);
            }
            offset += count;
            if paginator.advance(&identities.page_info) == Progress::Stalled {
                stalled(list, &format!("members of enterprise {}", self.enterprise));
            }
        }
        Ok(())
    }

    fn add_member(&self, list: &mut UserList, position: usize, identity: IdentityNode) {
        let name_id = identity.name_id.unwrap_or_default();
        let account = match identity.user {
            Some(account) => account,
            None => {
                debug!("Identity #{} ({}) has no linked account", position, name_id);
                list.add_warning(format!("SAML identity {} is not linked to a GitHub account", name_id));
                return;
            }
        };
        debug!("Processing member #{} {}", position, account.login);
        let email = if name_id.is_empty() { &account.email } else { &name_id };
        let user = list.upsert_user(self.new_user(&account, email));
        for organization in &account.organizations.nodes {
            list.create_organization(user, &organization.login, &organization.name);
        }
        if account.organizations.page_info.has_next_page {
            list.add_warning(format!(
                "User {} belongs to more than {} organizations, only the first {} were loaded",
                account.login, self.options.inner_page_size, self.options.inner_page_size
            ));
        }
    }

    async fn load_collaborators(&self, list: &mut UserList) -> Result<()> {
        let organizations = self.organizations(list).await?;
        info!(
            "Loading repositories and outside collaborators of {} organizations",
            organizations.len()
        );
        let mut harvests = stream::iter(organizations)
            .map(move |organization| self.harvest(organization))
            .buffered(self.options.max_organization_requests.max(1));
        while let Some(harvest) = harvests.next().await {
            self.merge_harvest(list, harvest);
        }
        Ok(())
    }

    /// All selected organizations of the enterprise.
    async fn organizations(&self, list: &mut UserList) -> Result<Vec<OrganizationNode>> {
        let mut organizations = Vec::new();
        let mut paginator = Paginator::new(self.options.page_size, self.options.inner_page_size);
        while let Some(request) = paginator.next_page() {
            let page = self.client.organizations(&self.enterprise, &request).await?;
            list.set_enterprise(page.enterprise);
            debug!(
                "Loaded organizations page {} with {} organizations",
                paginator.pages() + 1,
                page.organizations.nodes.len()
            );
            let progress = paginator.advance(&page.organizations.page_info);
            organizations.extend(
                page.organizations
                    .nodes
                    .into_iter()
                    .filter(|organization| self.selected(organization)),
            );
            if progress == Progress::Stalled {
                stalled(list, &format!("organizations of enterprise {}", self.enterprise));
            }
        }
        for login in &self.options.organizations {
            if !organizations.iter().any(|o| o.login.eq_ignore_ascii_case(login)) {
                warn!("Organization {} not found in enterprise {}", login, self.enterprise);
                list.add_warning(format!(
                    "Organization {} is not part of enterprise {}",
                    login, self.enterprise
                ));
            }
        }
        info!("Loaded {} organizations", organizations.len());
        Ok(organizations)
    }

    fn selected(&self, organization: &OrganizationNode) -> bool {
        self.options.organizations.is_empty()
            || self
                .options
                .organizations
                .iter()
                .any(|login| login.eq_ignore_ascii_case(&organization.login))
    }

    /// Drains the repository pages of one organization. A failing page ends the loop and
    /// keeps what was fetched before it.
    async fn harvest(&self, organization: OrganizationNode) -> Harvest {
        debug!("Loading repositories of organization {}", organization.login);
        let mut paginator = Paginator::new(self.options.page_size, self.options.inner_page_size);
        let mut harvest = Harvest {
            organization,
            repositories: Vec::new(),
            error: None,
            stalled: false,
        };
        while let Some(request) = paginator.next_page() {
            match self.client.repositories(&harvest.organization.login, &request).await {
                Ok(page) => {
                    debug!(
                        "Loaded repositories page {} of organization {} with {} repositories",
                        paginator.pages() + 1,
                        harvest.organization.login,
                        page.nodes.len()
                    );
                    harvest.stalled = paginator.advance(&page.page_info) == Progress::Stalled;
                    harvest.repositories.extend(page.nodes);
                }
                Err(err) => {
                    warn!(
                        "Unable to query repositories of organization {} - will skip the rest of it: {}",
                        harvest.organization.login, err
                    );
                    harvest.error = Some(err);
                    break;
                }
            }
        }
        harvest
    }

    fn merge_harvest(&self, list: &mut UserList, harvest: Harvest) {
        let Harvest {
            organization,
            repositories,
            error,
            stalled: was_stalled,
        } = harvest;
        let mut collaborators = 0;
        for repository in &repositories {
            debug!(
                "Processing repository {}/{} with {} outside collaborators",
                organization.login,
                repository.name,
                repository.collaborators.nodes.len()
            );
            for collaborator in &repository.collaborators.nodes {
                collaborators += 1;
                if list.find_user(&collaborator.login).is_some() {
                    debug!("Found existing user {}", collaborator.login);
                }
                let user = list.upsert_user(self.new_user(collaborator, &collaborator.email));
                let resident = list.create_organization(user, &organization.login, &organization.name);
                list.create_repository(resident, &repository.name);
            }
            if repository.collaborators.page_info.has_next_page {
                list.add_warning(format!(
                    "Repository {}/{} has more than {} outside collaborators, only the first {} were loaded",
                    organization.login, repository.name, self.options.inner_page_size, self.options.inner_page_size
                ));
            }
        }
        if was_stalled {
            stalled(list, &format!("repositories of organization {}", organization.login));
        }
        if let Some(err) = error {
            list.add_warning(format!(
                "Unable to load repositories of organization {}: {}",
                organization.login, err
            ));
        }
        if collaborators == 0 {
            debug!("No outside collaborators found in organization {}", organization.login);
        } else {
            info!(
                "Loaded {} repositories of organization {} with {} outside collaborator entries",
                repositories.len(),
                organization.login,
                collaborators
            );
        }
    }

    fn new_user(&self, account: &AccountNode, email: &str) -> User {
        User::new(account.login.as_str())
            .with_name(account.name.as_str())
            .with_email(email)
            .with_own_domain(self.options.own_domains.contains(email))
            .with_contributions(account.contributions)
    }
}

fn stalled(list: &mut UserList, scope: &str) {
    warn!("Pagination of {} stopped without a next cursor", scope);
    list.add_warning(format!(
        "Pagination of {} stopped early: more pages were reported but no cursor was returned",
        scope
    ));
}
