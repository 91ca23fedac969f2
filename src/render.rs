//! Template rendering of a loaded [`UserList`].
//!
//! Templates are Handlebars and see a [`ReportView`]. Escaping is off, the outputs are
//! Markdown or plain text rather than HTML.

use crate::error::{Error, Result};
use handlebars::{no_escape, Handlebars, RenderError};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;
use userlist::tree::{Organization, Repository, User, Warning};
use userlist::UserList;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView<'a> {
    pub updated: &'a str,
    pub enterprise: EnterpriseView<'a>,
    pub users: Vec<UserView<'a>>,
    pub warnings: Vec<WarningView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseView<'a> {
    pub slug: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView<'a> {
    pub number: usize,
    pub login: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub is_own_domain: bool,
    pub contributions: u32,
    pub organizations: Vec<OrganizationView<'a>>,
    pub last: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView<'a> {
    pub login: &'a str,
    pub name: &'a str,
    pub repositories: Vec<RepositoryView<'a>>,
    pub last: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryView<'a> {
    pub name: &'a str,
    pub last: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningView<'a> {
    pub message: &'a str,
    pub last: bool,
}

impl<'a> From<&'a UserList> for ReportView<'a> {
    fn from(list: &'a UserList) -> Self {
        ReportView {
            updated: list.updated(),
            enterprise: EnterpriseView {
                slug: &list.enterprise().slug,
                name: &list.enterprise().name,
            },
            users: list.users().iter().map(UserView::from).collect(),
            warnings: list.warnings().iter().map(WarningView::from).collect(),
        }
    }
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        UserView {
            number: user.number,
            login: &user.login,
            name: &user.name,
            email: &user.email,
            is_own_domain: user.is_own_domain,
            contributions: user.contributions,
            organizations: user.organizations.iter().map(OrganizationView::from).collect(),
            last: user.last,
        }
    }
}

impl<'a> From<&'a Organization> for OrganizationView<'a> {
    fn from(organization: &'a Organization) -> Self {
        OrganizationView {
            login: &organization.login,
            name: &organization.name,
            repositories: organization.repositories.iter().map(RepositoryView::from).collect(),
            last: organization.last,
        }
    }
}

impl<'a> From<&'a Repository> for RepositoryView<'a> {
    fn from(repository: &'a Repository) -> Self {
        RepositoryView {
            name: &repository.name,
            last: repository.last,
        }
    }
}

impl<'a> From<&'a Warning> for WarningView<'a> {
    fn from(warning: &'a Warning) -> Self {
        WarningView {
            message: &warning.message,
            last: warning.last,
        }
    }
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        Renderer { registry }
    }
}

impl Renderer {
    pub fn render(&self, template: &str, view: &ReportView) -> std::result::Result<String, RenderError> {
        self.registry.render_template(template, view)
    }

    /// Renders the `template` file into the `output` file, replacing it.
    pub fn render_file(&self, template: &Path, output: &Path, view: &ReportView) -> Result<()> {
        let source = fs::read_to_string(template).map_err(|source| Error::Io {
            path: template.to_path_buf(),
            source,
        })?;
        let rendered = self.render(&source, view).map_err(|source| Error::Template {
            path: template.to_path_buf(),
            source,
        })?;
        fs::write(output, rendered).map_err(|source| Error::Io {
            path: output.to_path_buf(),
            source,
        })?;
        debug!("Rendered {} into {}", template.display(), output.display());
        Ok(())
    }
}
