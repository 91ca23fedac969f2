//! Enterprise user list
//!
//! # Overview
//!
//! Enumerates the people associated with a GitHub Enterprise account and aggregates them into a
//! report tree of Enterprise → Users → Organizations → Repositories.
//!
//! Two loaders exist:
//! * `members` walks the external identities of the enterprise SAML provider. Every identity
//!   linked to a GitHub account becomes a user, together with the organizations it belongs to.
//! * `collaborators` walks every repository of every organization of the enterprise and records
//!   each outside collaborator under the organization and repository granting the access.
//!
//! Both page through an abstract [`api::Client`] and merge every page into one
//! [`tree::UserList`], which keeps users unique by login, numbers them in discovery order and
//! collects recoverable problems as warnings instead of failing the run.

pub mod api;
pub mod domains;
#[cfg(feature = "loader")]
pub mod loader;
#[cfg(test)]
mod mock;
#[cfg(feature = "loader")]
pub mod paginator;
pub mod tree;

pub use api::{Action, Client};
pub use domains::OwnDomains;
#[cfg(feature = "loader")]
pub use loader::{Loader, LoaderOptions};
pub use tree::{OrganizationKey, UserList};
