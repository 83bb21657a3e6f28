use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use log::{debug, error, info};
use tenantdb_core::{config::core_config::CoreConfig, DbClient, Repository};

use super::{build_repository, parse_document, render_record};

/** Overwrite given fields of a record */
#[derive(Debug, Parser)]
pub struct UpdateCommand {
    pub collection: String,

    pub id: String,

    pub project_id: String,

    /// Fields to overwrite as JSON object
    pub data: String,
}

impl UpdateCommand {
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Subcommand update is being run...");

        let repository = build_repository(db_client, &self.collection, core_config);

        let patch = parse_document(&self.data)?;

        let record = repository
            .update(&self.id, &self.project_id, patch)
            .await
            .inspect_err(|err| error!("Record {} could not be updated: {}", self.id.blue(), err))?;

        info!("Record {} has been {} !", self.id.blue(), "updated".yellow());

        println!("{}", render_record(record));

        debug!("Subcommand update successfully ran !");

        Ok(())
    }
}
