use directories::ProjectDirs;
use std::path::PathBuf;

use crate::{Error, Result};

/// Where the shell keeps its configuration, under the XDG base directories
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/flow)
    pub config: PathBuf,

    /// Config file path (~/.config/flow/flow.conf)
    pub config_file: PathBuf,
}

impl Directories {
    /// Resolve the standard XDG paths.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self> {
        let project = ProjectDirs::from("", "", "flow")
            .ok_or_else(|| Error::Config("Failed to determine config directory".to_string()))?;
        Ok(Self::with_base(project.config_dir().to_path_buf()))
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("flow.conf"),
            config: base,
        }
    }
}
