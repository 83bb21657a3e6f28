use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Error as IOError, Write},
    path::PathBuf,
};

use config::{Config, Environment, FileFormat};
use log::debug;

use super::core_config::CoreConfig;

const CONFIG_FILENAME: &str = "config.json";

const DB_DIR_NAME: &str = "db";

const ENV_PREFIX: &str = "TENANTDB";

/**
 * Configuration manager
 *
 * Manages config directory ( config file, database location.... )
 */
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /**
     * Create config file at given path
     */
    fn create_config_file(path: &PathBuf) -> Result<File, IOError> {
        let path_display = path.display().to_string();

        debug!("Creating config file at {}...", path_display);

        if let Some(dir_path) = path.parent() {
            create_dir_all(dir_path)?;
        }

        let file = File::create_new(path)?;

        ConfigManager::write_default_config(&file)?;

        debug!("Done writing config file at {} !", path_display);

        Ok(file)
    }

    /**
     * Write default config values to given file
     */
    fn write_default_config(file: &File) -> Result<(), IOError> {
        debug!("Writing default config values...");

        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &CoreConfig::default())?;

        writer.flush()?;

        debug!("Done writing default config values !");

        Ok(())
    }

    /**
     * Handle initializing config for first time
     */
    fn init_config(directory_path: &PathBuf) -> Result<(), IOError> {
        debug!("Initializing config directory...");

        let config_file_path = directory_path.join(CONFIG_FILENAME);

        if !config_file_path.exists() {
            debug!("Creating default config file...");

            ConfigManager::create_config_file(&config_file_path)?;

            debug!("Done creating default config file !");
        }

        debug!("Done initializing config directory !");

        Ok(())
    }

    /**
     * Get config dir path
     */
    pub fn get_path(&self) -> PathBuf {
        self.path.clone()
    }

    /**
     * Get config file path
     */
    pub fn get_config_file_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILENAME)
    }

    /**
     * Get DB config path
     */
    pub fn get_db_path(&self) -> PathBuf {
        self.path.join(DB_DIR_NAME)
    }

    /**
     * Load config from file, then environment
     */
    pub fn load(&self) -> Result<CoreConfig, Box<dyn std::error::Error>> {
        self.load_with(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(
        &self,
        environment: Environment,
    ) -> Result<CoreConfig, Box<dyn std::error::Error>> {
        debug!("Loading config...");

        let config_file_path = self.get_config_file_path();

        let config = Config::builder()
            .add_source(config::File::new(
                &config_file_path.display().to_string(),
                FileFormat::Json,
            ))
            .add_source(environment)
            .build()?;

        let core_config: CoreConfig = config.try_deserialize()?;

        debug!("Done loading config ! ({:?})", core_config);

        Ok(core_config)
    }
}

impl TryFrom<&PathBuf> for ConfigManager {
    type Error = IOError;

    /**
     * Instantiate ConfigManager while making sure config file exists
     */
    fn try_from(directory_path: &PathBuf) -> Result<Self, Self::Error> {
        debug!(
            "Building ConfigManager using path {}...",
            directory_path.display().to_string()
        );

        ConfigManager::init_config(directory_path)?;

        let manager = ConfigManager {
            path: directory_path.clone(),
        };

        debug!(
            "Done building ConfigManager using path {} !",
            directory_path.display().to_string()
        );

        Ok(manager)
    }
}
