//! `search` command: run the lead pipeline from the terminal.

use std::sync::Arc;

use hunter_core::{AppConfig, LeadSource, LookupTables};
use hunter_db::NewLead;
use hunter_scraper::{EnrichedLead, LeadPipeline, LeadQuery, LeadReport};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SearchOptions {
    pub json: bool,
    pub save: bool,
}

/// Counts from saving one report into the CRM.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SaveSummary {
    pub saved: usize,
    pub already_saved: usize,
}

/// Run one search and print the ranked leads.
///
/// # Errors
///
/// Returns an error if the lookup file or provider configuration is invalid,
/// or if saving is requested and the database is unreachable.
pub(crate) async fn run_search(
    config: &AppConfig,
    business_type: &str,
    city: &str,
    options: SearchOptions,
) -> anyhow::Result<()> {
    let query = LeadQuery::new(business_type, city);
    if query.business_type.is_empty() || query.city.is_empty() {
        anyhow::bail!("--business-type and --city must be non-empty");
    }

    // Connect before the run so a bad DATABASE_URL fails fast instead of
    // after minutes of provider calls.
    let pool = if options.save {
        Some(hunter_db::connect_pool_from_config(config).await?)
    } else {
        None
    };

    let lookups = match &config.lookups_path {
        Some(path) => hunter_core::load_lookups(path)?,
        None => LookupTables::default(),
    };
    let pipeline = LeadPipeline::from_config(config, Arc::new(lookups))?;
    let report = pipeline.run(&query).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(pool) = pool {
        let source = lead_source(pipeline.provider_name());
        let summary = save_leads(&pool, &report.leads, source).await?;
        eprintln!(
            "saved {} lead(s); {} already in the CRM",
            summary.saved, summary.already_saved
        );
    }

    Ok(())
}

pub(crate) fn lead_source(provider_name: &str) -> LeadSource {
    provider_name.parse().unwrap_or(LeadSource::Manual)
}

async fn save_leads(
    pool: &sqlx::PgPool,
    leads: &[EnrichedLead],
    source: LeadSource,
) -> anyhow::Result<SaveSummary> {
    let mut summary = SaveSummary::default();
    for lead in leads {
        let created = hunter_db::create_lead(pool, &new_lead(lead, source)).await?;
        if created.is_some() {
            summary.saved += 1;
        } else {
            tracing::debug!(place_id = %lead.place_id, "lead already saved; skipping");
            summary.already_saved += 1;
        }
    }
    Ok(summary)
}

pub(crate) fn new_lead(lead: &EnrichedLead, source: LeadSource) -> NewLead<'_> {
    NewLead {
        address: lead.address.as_deref(),
        phone: lead.phone.as_deref(),
        website: lead.website.as_deref(),
        place_id: Some(lead.place_id.as_str()),
        website_status: Some(lead.website_status.as_str()),
        source,
        ..NewLead::manual(&lead.name)
    }
}

fn print_report(report: &LeadReport) {
    if report.leads.is_empty() {
        println!("no leads found");
    } else {
        println!(
            "{:<5}{:<22}{:<32}{:<18}WEBSITE",
            "ID", "STATUS", "NAME", "PHONE"
        );
        for lead in &report.leads {
            println!(
                "{:<5}{:<22}{:<32}{:<18}{}",
                lead.id,
                lead.website_status.as_str(),
                truncate(&lead.name, 30),
                lead.phone.as_deref().unwrap_or("-"),
                lead.website.as_deref().unwrap_or("-"),
            );
        }
    }

    let stats = &report.stats;
    println!();
    println!(
        "{} unique place(s); tiles searched {}/{}; duplicates {}{}",
        stats.unique_places,
        stats.tiles_searched,
        stats.tiles_planned,
        stats.duplicates,
        if stats.ceiling_reached {
            "; result ceiling reached"
        } else {
            ""
        },
    );
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars.saturating_sub(3)).collect::<String>())
    } else {
        value.to_string()
    }
}
