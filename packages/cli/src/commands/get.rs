use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use log::{debug, error};
use tenantdb_core::{config::core_config::CoreConfig, DbClient, Repository};

use super::{build_repository, parse_document, render_record};

/** Display one record of a project */
#[derive(Debug, Parser)]
pub struct GetCommand {
    pub collection: String,

    pub id: String,

    pub project_id: String,

    /// Extra JSON conditions the record must match
    #[clap(long)]
    pub filter: Option<String>,
}

impl GetCommand {
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Subcommand get is being run...");

        let repository = build_repository(db_client, &self.collection, core_config);

        let extra_filter = self.filter.as_deref().map(parse_document).transpose()?;

        let record = repository
            .get(&self.id, &self.project_id, extra_filter)
            .await
            .inspect_err(|err| error!("Record {} could not be read: {}", self.id.blue(), err))?;

        println!("{}", render_record(record));

        debug!("Subcommand get successfully ran !");

        Ok(())
    }
}
