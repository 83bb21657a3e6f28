use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use log::{debug, error, info};
use tenantdb_core::{
    config::core_config::CoreConfig, to_identifier, DbClient, Record, Repository, ScopedEntity,
};

use super::{build_repository, parse_document, render_record};

/** Create record in a project */
#[derive(Debug, Parser)]
pub struct CreateCommand {
    pub collection: String,

    pub project_id: String,

    /// Record fields as JSON object
    pub data: String,
}

impl CreateCommand {
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Subcommand create is being run...");

        let repository = build_repository(db_client, &self.collection, core_config);

        let project_id = to_identifier(&self.project_id)?;

        let fields = parse_document(&self.data)?;

        let payload = Record::builder()
            .set_fields(&fields)
            .set_project_id(&project_id)
            .build();

        let record = repository
            .create(payload)
            .await
            .inspect_err(|err| error!("Record could not be created: {}", err))?;

        if let Some(id) = record.id() {
            info!("Record {} has been {} !", id.to_hex().blue(), "created".green());
        }

        println!("{}", render_record(record));

        debug!("Subcommand create successfully ran !");

        Ok(())
    }
}
