//! Report tree: Enterprise → Users → Organizations → Repositories, plus warnings.
//!
//! [`UserList`] is the aggregator. Every level is a [`Siblings`] collection which keeps
//! insertion order, unique identity keys and a single trailing `last` flag, so templates
//! can leave out the separator after the final item.
//!
//! Find-or-create operations hand out copyable handles instead of references. A handle
//! stays valid for the lifetime of the list that issued it because nothing is ever removed.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};

pub trait Sibling {
    fn set_last(&mut self, last: bool);
    fn is_last(&self) -> bool;
}

/// Ordered collection of sibling entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Siblings<T>(Vec<T>);

impl<T> Default for Siblings<T> {
    fn default() -> Self {
        Siblings(Vec::new())
    }
}

impl<T: Sibling> Siblings<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    pub fn find_by<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.0.iter().find(|entity| predicate(entity))
    }

    /// Appends `entity` as the new trailing element.
    pub(crate) fn push(&mut self, mut entity: T) -> usize {
        self.0.iter_mut().for_each(|sibling| sibling.set_last(false));
        entity.set_last(true);
        self.0.push(entity);
        self.0.len() - 1
    }

    /// Returns the index of the sibling `same` as `entity`, appending `entity` if there is none.
    /// A resident match is left untouched.
    pub(crate) fn upsert_by<S>(&mut self, entity: T, same: S) -> usize
    where
        S: Fn(&T, &T) -> bool,
    {
        match self.0.iter().position(|sibling| same(sibling, &entity)) {
            Some(index) => index,
            None => self.push(entity),
        }
    }

    fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.0)
    }
}

impl<'a, T> IntoIterator for &'a Siblings<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enterprise {
    pub slug: String,
    pub name: String,
}

impl Enterprise {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Enterprise {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    pub last: bool,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Repository {
            name: name.into(),
            last: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub login: String,
    pub name: String,
    pub repositories: Siblings<Repository>,
    pub last: bool,
}

impl Organization {
    pub fn new(login: impl Into<String>, name: impl Into<String>) -> Self {
        Organization {
            login: login.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repositories.push(repository);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// 1-based discovery index, assigned by the list that first stored the user.
    pub number: usize,
    pub login: String,
    pub name: String,
    pub email: String,
    pub is_own_domain: bool,
    pub contributions: u32,
    pub organizations: Siblings<Organization>,
    pub last: bool,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        User {
            login: login.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_own_domain(mut self, is_own_domain: bool) -> Self {
        self.is_own_domain = is_own_domain;
        self
    }

    pub fn with_contributions(mut self, contributions: u32) -> Self {
        self.contributions = contributions;
        self
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub message: String,
    pub last: bool,
}

macro_rules! sibling {
    ($($entity:ty),*) => {
        $(impl Sibling for $entity {
            fn set_last(&mut self, last: bool) {
                self.last = last;
            }

            fn is_last(&self) -> bool {
                self.last
            }
        })*
    };
}

sibling!(Repository, Organization, User, Warning);

/// Identity of an organization within one user's organization list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum OrganizationKey {
    /// `login`, falling back to `name` for organizations without one.
    #[default]
    LoginOrName,
    Login,
    Name,
}

impl OrganizationKey {
    pub fn of<'a>(&self, organization: &'a Organization) -> &'a str {
        match self {
            OrganizationKey::LoginOrName if !organization.login.is_empty() => &organization.login,
            OrganizationKey::LoginOrName | OrganizationKey::Name => &organization.name,
            OrganizationKey::Login => &organization.login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationHandle {
    user: usize,
    organization: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryHandle {
    user: usize,
    organization: usize,
    repository: usize,
}

impl OrganizationHandle {
    pub fn user(&self) -> UserHandle {
        UserHandle(self.user)
    }
}

impl RepositoryHandle {
    pub fn organization(&self) -> OrganizationHandle {
        OrganizationHandle {
            user: self.user,
            organization: self.organization,
        }
    }
}

/// Root of the report tree and the aggregation engine feeding it.
///
/// Not meant for concurrent writers: every mutation goes through `&mut self`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    updated: String,
    enterprise: Enterprise,
    users: Siblings<User>,
    warnings: Siblings<Warning>,
    #[serde(skip)]
    enterprise_set: bool,
    #[serde(skip)]
    organization_key: OrganizationKey,
}

impl Default for UserList {
    fn default() -> Self {
        UserList::new(OrganizationKey::default())
    }
}

impl UserList {
    pub fn new(organization_key: OrganizationKey) -> Self {
        UserList {
            updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            enterprise: Enterprise::default(),
            users: Siblings::default(),
            warnings: Siblings::default(),
            enterprise_set: false,
            organization_key,
        }
    }

    /// RFC 3339 creation time of the list.
    pub fn updated(&self) -> &str {
        &self.updated
    }

    pub fn enterprise(&self) -> &Enterprise {
        &self.enterprise
    }

    pub fn users(&self) -> &Siblings<User> {
        &self.users
    }

    pub fn warnings(&self) -> &Siblings<Warning> {
        &self.warnings
    }

    /// Sets the enterprise identity once. Later calls are ignored and return `false`.
    pub fn set_enterprise(&mut self, enterprise: Enterprise) -> bool {
        if self.enterprise_set {
            return false;
        }
        self.enterprise = enterprise;
        self.enterprise_set = true;
        true
    }

    pub fn user(&self, handle: UserHandle) -> &User {
        &self.users.0[handle.0]
    }

    pub fn organization(&self, handle: OrganizationHandle) -> &Organization {
        &self.user(handle.user()).organizations.0[handle.organization]
    }

    pub fn repository(&self, handle: RepositoryHandle) -> &Repository {
        &self.organization(handle.organization()).repositories.0[handle.repository]
    }

    pub fn find_user(&self, login: &str) -> Option<&User> {
        self.users.find_by(|user| user.login == login)
    }

    /// Looks up an organization of `user` by the key of the configured [`OrganizationKey`].
    pub fn find_organization(&self, user: UserHandle, key: &str) -> Option<&Organization> {
        let organization_key = self.organization_key;
        self.user(user)
            .organizations
            .find_by(|organization| organization_key.of(organization) == key)
    }

    pub fn find_repository(&self, organization: OrganizationHandle, name: &str) -> Option<&Repository> {
        self.organization(organization)
            .repositories
            .find_by(|repository| repository.name == name)
    }

    pub fn create_user(&mut self, login: &str) -> UserHandle {
        self.upsert_user(User::new(login))
    }

    /// Stores `user` unless a user with the same login exists.
    ///
    /// Scalar fields of a resident user are kept as first seen. Organizations carried by
    /// `user` are merged into the resident one level by level. A new user gets the next
    /// discovery number; whatever `number` the argument carried is ignored.
    pub fn upsert_user(&mut self, mut user: User) -> UserHandle {
        let organizations = user.organizations.take();
        user.number = self.users.len() + 1;
        let handle = UserHandle(self.users.upsert_by(user, |a, b| a.login == b.login));
        for organization in organizations {
            self.upsert_organization(handle, organization);
        }
        handle
    }

    pub fn create_organization(&mut self, user: UserHandle, login: &str, name: &str) -> OrganizationHandle {
        self.upsert_organization(user, Organization::new(login, name))
    }

    /// Stores `organization` under `user`, or merges its repositories into the resident
    /// organization with the same key.
    pub fn upsert_organization(&mut self, user: UserHandle, mut organization: Organization) -> OrganizationHandle {
        let key = self.organization_key;
        let repositories = organization.repositories.take();
        let organizations = &mut self.users.0[user.0].organizations;
        let index = organizations.upsert_by(organization, |a, b| key.of(a) == key.of(b));
        let handle = OrganizationHandle {
            user: user.0,
            organization: index,
        };
        for repository in repositories {
            self.upsert_repository(handle, repository);
        }
        handle
    }

    pub fn create_repository(&mut self, organization: OrganizationHandle, name: &str) -> RepositoryHandle {
        self.upsert_repository(organization, Repository::new(name))
    }

    pub fn upsert_repository(&mut self, organization: OrganizationHandle, repository: Repository) -> RepositoryHandle {
        let repositories =
            &mut self.users.0[organization.user].organizations.0[organization.organization].repositories;
        let index = repositories.upsert_by(repository, |a, b| a.name == b.name);
        RepositoryHandle {
            user: organization.user,
            organization: organization.organization,
            repository: index,
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning {
            message: message.into(),
            last: false,
        });
    }
}
