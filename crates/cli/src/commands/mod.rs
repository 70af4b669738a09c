//! Command implementations.

mod info;
mod qibla;
mod run;
mod status;
mod validate;

pub use info::run_info;
pub use qibla::run_qibla;
pub use run::run_navigator;
pub use status::run_status;
pub use validate::run_validate;

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::NavigatorBlueprint;
use tracing::info;

use crate::error::{CliError, Result};

/// Load the blueprint at `path`, or the built-in defaults
fn load_blueprint(path: Option<&Path>) -> Result<NavigatorBlueprint> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path).map_err(|e| CliError::config_load(path, e))
        }
        None => {
            info!("No configuration file given, using defaults");
            Ok(NavigatorBlueprint::default())
        }
    }
}
