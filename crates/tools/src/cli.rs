use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gestion_core::access::{AccessAction, AreaPolicy};
use gestion_core::types::DbId;
use gestion_db::DbPool;

use crate::commands;

/// Pool size for one-shot maintenance commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

#[derive(Parser)]
#[command(name = "gestion-tools")]
#[command(about = "Diagnostics and repairs for the project-management database")]
#[command(version)]
pub struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify that every expected table and column exists
    CheckSchema,

    /// Show how the access resolver decides for one user and project
    ExplainAccess {
        #[arg(long)]
        user: DbId,
        #[arg(long)]
        project: DbId,
        #[arg(long, value_enum, default_value_t = ActionArg::View)]
        action: ActionArg,
        /// Resolve with the strict area policy instead of inheriting
        #[arg(long)]
        strict: bool,
    },

    /// Report users without an area, area mismatches and owners missing from rosters
    Audit {
        /// Judge area mismatches with the strict area policy
        #[arg(long)]
        strict: bool,
    },

    /// Insert missing memberships for project owners (dry run unless --apply)
    RepairMemberships {
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ActionArg {
    View,
    Contribute,
    Review,
}

impl From<ActionArg> for AccessAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::View => AccessAction::View,
            ActionArg::Contribute => AccessAction::Contribute,
            ActionArg::Review => AccessAction::Review,
        }
    }
}

fn policy(strict: bool) -> AreaPolicy {
    if strict {
        AreaPolicy::Strict
    } else {
        AreaPolicy::InheritFromMembership
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let pool = self.connect().await?;

        match self.command {
            Commands::CheckSchema => commands::schema::check_schema(&pool).await,
            Commands::ExplainAccess {
                user,
                project,
                action,
                strict,
            } => {
                commands::access::explain_access(&pool, user, project, action.into(), policy(strict))
                    .await
            }
            Commands::Audit { strict } => commands::audit::audit(&pool, policy(strict)).await,
            Commands::RepairMemberships { apply } => {
                commands::repair::repair_memberships(&pool, apply).await
            }
        }
    }

    async fn connect(&self) -> Result<DbPool> {
        let url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set or passed with --database-url")?;
        let pool = gestion_db::create_pool(url, CLI_MAX_CONNECTIONS)
            .await
            .context("Failed to connect to database")?;
        tracing::debug!("Connected to database");
        Ok(pool)
    }
}
