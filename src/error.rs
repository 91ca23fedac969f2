use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] userlist::api::Error),
    #[error("Configuration has not been validated")]
    NotValidated,
    #[error("User list has not been loaded")]
    NotLoaded,
    #[error("Unable to render template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: handlebars::RenderError,
    },
    #[error("{failed} of {total} templates failed to render")]
    RenderFailed { failed: usize, total: usize },
    #[error("Unable to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to serialize user list: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
