mod create;
mod delete;
mod get;
mod list;
mod update;

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use home::home_dir;
use log::debug;
use tenantdb_core::{
    bson::{Bson, Document},
    config::{core_config::CoreConfig, init_config, manager::ConfigManager},
    DbClient, Record, ScopedRepository,
};

use create::CreateCommand;
use delete::DeleteCommand;
use get::GetCommand;
use list::ListCommand;
use update::UpdateCommand;

/** Tenant scoped records over a local database */
#[derive(Debug, Parser)]
#[clap(name = "tenantdb", version)]
struct TenantdbCLI {
    /// Config directory, defaults to ~/.tenantdb
    #[clap(long, global = true)]
    dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: TenantdbCLIOptions,
}

#[derive(Debug, Subcommand)]
enum TenantdbCLIOptions {
    #[clap(name = "get")]
    Get(GetCommand),

    #[clap(name = "create")]
    Create(CreateCommand),

    #[clap(name = "list")]
    List(ListCommand),

    #[clap(name = "update")]
    Update(UpdateCommand),

    #[clap(name = "delete")]
    Delete(DeleteCommand),
}

impl TenantdbCLIOptions {
    /**
     * Run selected command
     */
    pub async fn run(
        &self,
        db_client: &Arc<DbClient>,
        core_config: &CoreConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Self::Get(get) => get.run(db_client, core_config).await,
            Self::Create(create) => create.run(db_client, core_config).await,
            Self::List(list) => list.run(db_client, core_config).await,
            Self::Update(update) => update.run(db_client, core_config).await,
            Self::Delete(delete) => delete.run(db_client, core_config).await,
        }
    }
}

/**
 * Resolve config directory from CLI argument or home directory
 */
fn resolve_config(dir: &Option<PathBuf>) -> Result<ConfigManager, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => Ok(ConfigManager::try_from(dir)?),
        None => {
            let home = home_dir().ok_or("Could not find home directory")?;

            init_config(&home)
        }
    }
}

/**
 * Build repository over named collection of records
 */
pub fn build_repository(
    db_client: &Arc<DbClient>,
    collection: &str,
    core_config: &CoreConfig,
) -> ScopedRepository<Record> {
    ScopedRepository::for_collection(db_client, collection)
        .with_strict_scope(core_config.strict_scope)
}

/**
 * Parse JSON object argument, extended JSON values such as {"$oid": ...} are understood
 */
pub fn parse_document(raw: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    match Bson::try_from(value)? {
        Bson::Document(document) => Ok(document),
        other => Err(format!("Expected JSON object, got {}", other).into()),
    }
}

/**
 * Render record as relaxed extended JSON
 */
pub fn render_record(record: Record) -> String {
    Bson::Document(record.into_document())
        .into_relaxed_extjson()
        .to_string()
}

/**
 * Parse CLI args then run command
 */
#[cfg(not(tarpaulin_include))]
pub async fn bootstrap() -> Result<(), Box<dyn std::error::Error>> {
    let args = TenantdbCLI::parse();

    let config_manager = resolve_config(&args.dir)?;

    let core_config = config_manager.load()?;

    debug!("Using config {:?}", core_config);

    let db_client = Arc::new(DbClient::open(&config_manager.get_db_path())?);

    args.command.run(&db_client, &core_config).await?;

    Ok(())
}
