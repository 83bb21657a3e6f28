use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use log::{debug, error, info};
use tenantdb_core::{config::core_config::CoreConfig, DbClient, Repository};

use super::{build_repository, render_record};

/** Remove record from a project */
#[derive(Debug, Parser)]
pub struct DeleteCommand {
    pub collection: String,

    pub id: String,

    pub project_id: String,
}

impl DeleteCommand {
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Subcommand delete is being run...");

        let repository = build_repository(db_client, &self.collection, core_config);

        let record = repository
            .delete(&self.id, &self.project_id)
            .await
            .inspect_err(|err| error!("Record {} could not be removed: {}", self.id.blue(), err))?;

        info!("Record {} has been {} !", self.id.blue(), "removed".red());

        println!("{}", render_record(record));

        debug!("Subcommand delete successfully ran !");

        Ok(())
    }
}
