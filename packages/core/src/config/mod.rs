pub mod core_config;
pub mod manager;

use std::path::PathBuf;

use log::debug;
use manager::ConfigManager;

const CONFIG_DIR_NAME: &str = ".tenantdb";

/**
 * Initialize configuration inside given parent directory
 */
pub fn init_config(path: &PathBuf) -> Result<ConfigManager, Box<dyn std::error::Error>> {
    let path_display = path.display().to_string();

    debug!(
        "Initializing config file, provided location : {}",
        path_display
    );

    let config_path = path.join(CONFIG_DIR_NAME);

    let config_manager = ConfigManager::try_from(&config_path)?;

    debug!(
        "Done initializing config file using location {} !",
        path_display
    );

    Ok(config_manager)
}
