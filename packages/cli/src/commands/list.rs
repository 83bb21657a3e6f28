use std::sync::Arc;

use clap::Parser;
use log::{debug, info};
use tenantdb_core::{config::core_config::CoreConfig, DbClient, Repository};

use super::{build_repository, render_record};

/** List every record of a project */
#[derive(Debug, Parser)]
pub struct ListCommand {
    pub collection: String,

    pub project_id: String,
}

impl ListCommand {
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Subcommand list is being run...");

        let repository = build_repository(db_client, &self.collection, core_config);

        let records = repository.find_all(&self.project_id).await?;

        info!("{} record(s) found", records.len());

        for record in records {
            println!("{}", render_record(record));
        }

        debug!("Subcommand list successfully ran !");

        Ok(())
    }
}
