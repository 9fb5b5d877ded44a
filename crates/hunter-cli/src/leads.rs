//! `leads` commands: read and update the CRM from the terminal.

use clap::Subcommand;
use hunter_core::PipelineStatus;
use hunter_db::LeadUpdate;

use crate::search::truncate;

/// Sub-commands available under `leads`.
#[derive(Debug, Subcommand)]
pub enum LeadsCommands {
    /// List saved leads, newest first
    List {
        /// Filter by pipeline status (new, contacted, meeting, negotiation, won, lost)
        #[arg(long)]
        status: Option<PipelineStatus>,
        /// Maximum number of leads to show
        #[arg(long, default_value = "50")]
        limit: u32,
    },
    /// Move a lead to another pipeline status
    SetStatus {
        /// Lead id as shown by `leads list`
        id: i64,
        /// New pipeline status
        status: PipelineStatus,
    },
}

pub(crate) async fn run_leads(pool: &sqlx::PgPool, command: LeadsCommands) -> anyhow::Result<()> {
    match command {
        LeadsCommands::List { status, limit } => run_leads_list(pool, status, limit).await,
        LeadsCommands::SetStatus { id, status } => run_leads_set_status(pool, id, status).await,
    }
}

async fn run_leads_list(
    pool: &sqlx::PgPool,
    status: Option<PipelineStatus>,
    limit: u32,
) -> anyhow::Result<()> {
    let limit = i64::from(limit.clamp(1, 200));
    let rows = hunter_db::list_leads(pool, status, limit).await?;

    if rows.is_empty() {
        println!(
            "no leads found{}; save some with `search --save`",
            status.map(|s| format!(" with status {s}")).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{:<7}{:<13}{:<22}{:<32}{:<18}CREATED",
        "ID", "STATUS", "WEBSITE", "NAME", "PHONE"
    );
    for row in &rows {
        println!(
            "{:<7}{:<13}{:<22}{:<32}{:<18}{}",
            row.id,
            row.status,
            row.website_status.as_deref().unwrap_or("-"),
            truncate(&row.name, 30),
            row.phone.as_deref().unwrap_or("-"),
            row.created_at.format("%Y-%m-%d"),
        );
    }

    Ok(())
}

async fn run_leads_set_status(
    pool: &sqlx::PgPool,
    id: i64,
    status: PipelineStatus,
) -> anyhow::Result<()> {
    let update = LeadUpdate {
        status: Some(status),
        ..LeadUpdate::default()
    };
    match hunter_db::update_lead(pool, id, &update).await {
        Ok(row) => {
            println!("lead {} ({}) is now {}", row.id, row.name, row.status);
            Ok(())
        }
        Err(hunter_db::DbError::NotFound) => anyhow::bail!("lead {id} not found"),
        Err(e) => Err(e.into()),
    }
}
