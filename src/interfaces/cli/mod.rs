//! CLI interface module
//!
//! 直接连接数据库执行追踪器管理与统计，不经过 HTTP 服务。

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands, TrackerCommands};
use crate::errors::ScrolldepthError;
use crate::runtime::lifetime::startup::build_services;
use crate::storage::{SeaOrmStorage, StorageFactory};
use commands::{config_generate, create_tracker, delete_tracker, list_trackers, show_stats};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<ScrolldepthError> for CliError {
    fn from(err: ScrolldepthError) -> Self {
        match err {
            ScrolldepthError::DatabaseConfig(_) | ScrolldepthError::DatabaseConnection(_) => {
                CliError::StorageError(err.format_simple())
            }
            other => CliError::CommandError(other.format_simple()),
        }
    }
}

async fn open_storage() -> Result<Arc<SeaOrmStorage>, CliError> {
    StorageFactory::create().await.map_err(CliError::from)
}

pub async fn run_cli(cmd: Commands) -> Result<(), CliError> {
    let (trackers, dashboard) = match cmd {
        // 生成配置不需要数据库连接
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => return config_generate(output_path, force).await,
        Commands::Serve => {
            return Err(CliError::CommandError(
                "serve is handled by server mode".to_string(),
            ));
        }
        _ => {
            let (_, trackers, dashboard) = build_services(open_storage().await?);
            (trackers, dashboard)
        }
    };

    match cmd {
        Commands::Tracker { action } => match action {
            TrackerCommands::Create { owner } => create_tracker(&trackers, &owner).await,
            TrackerCommands::List { owner } => list_trackers(&trackers, &owner).await,
            TrackerCommands::Delete { id, owner } => delete_tracker(&trackers, &owner, &id).await,
        },
        Commands::Stats {
            tracker_id,
            owner,
            watch,
            json,
        } => show_stats(&dashboard, &owner, &tracker_id, watch, json).await,
        Commands::Serve | Commands::Config { .. } => Ok(()),
    }
}
