use crate::config::{Config, ConfigError};
use crate::error::{Error, Result};
use crate::render::{Renderer, ReportView};
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use userlist::{Client, Loader, UserList};

/// One run of the tool: validate the config, load the user list, then render it.
#[derive(Debug)]
pub struct Report {
    config: Config,
    validated: bool,
    user_list: Option<UserList>,
}

impl Report {
    pub fn new(config: Config) -> Self {
        Report {
            config,
            validated: false,
            user_list: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate(&mut self) -> Result<()> {
        self.validated = false;
        self.config.validate()?;
        self.validated = true;
        Ok(())
    }

    /// Loads a fresh user list, dropping the one of a previous load.
    pub async fn load<CLIENT: Client>(&mut self, client: &CLIENT) -> Result<()> {
        if !self.validated {
            return Err(Error::NotValidated);
        }
        let action = self.config.action.ok_or(ConfigError::Missing("Action"))?;
        let enterprise = self
            .config
            .enterprise
            .as_deref()
            .ok_or(ConfigError::Missing("Enterprise"))?;
        self.user_list = None;
        let loader = Loader::new(client, enterprise, self.config.loader_options());
        self.user_list = Some(loader.load(action).await?);
        Ok(())
    }

    pub fn user_list(&self) -> Result<&UserList> {
        self.user_list.as_ref().ok_or(Error::NotLoaded)
    }

    /// Renders every template into its output file.
    ///
    /// A failing pair does not stop the others; the failures are counted and reported at the end.
    pub fn render(&self) -> Result<()> {
        let view = ReportView::from(self.user_list()?);
        let renderer = Renderer::default();
        let total = self.config.template_files.len();
        let mut failed = 0;
        for (template, output) in self.config.template_files.iter().zip(&self.config.output_files) {
            info!("Rendering {} into {}", template.display(), output.display());
            if let Err(err) = renderer.render_file(template, output, &view) {
                error!("{}", err);
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(Error::RenderFailed { failed, total });
        }
        Ok(())
    }

    /// Writes the loaded user list as pretty JSON.
    pub fn print<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self.user_list()?)?;
        Ok(())
    }

    /// Dumps the user list to the configured JSON file, if any.
    pub fn write_json(&self) -> Result<()> {
        let path = match &self.config.json_file {
            Some(path) => path,
            None => return Ok(()),
        };
        if path == Path::new("-") {
            let mut stdout = io::stdout().lock();
            self.print(&mut stdout)?;
            return writeln!(stdout).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            });
        }
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.print(&mut writer)?;
        writer.flush().map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        info!("User list written to {}", path.display());
        Ok(())
    }
}
