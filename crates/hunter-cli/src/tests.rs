use hunter_core::{LeadSource, PipelineStatus};
use hunter_scraper::{DiscoveryPhase, EnrichedLead, WebsiteStatus};

use super::*;
use crate::search::{lead_source, new_lead, truncate};

#[test]
fn parses_search_command() {
    let cli = Cli::try_parse_from([
        "hunter-cli",
        "search",
        "--business-type",
        "autokorjaamo",
        "--city",
        "Tampere",
        "--save",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            business_type,
            city,
            json,
            save,
        }) => {
            assert_eq!(business_type, "autokorjaamo");
            assert_eq!(city, "Tampere");
            assert!(!json);
            assert!(save);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn search_requires_city() {
    let result = Cli::try_parse_from(["hunter-cli", "search", "--business-type", "kampaamo"]);
    assert!(result.is_err());
}

#[test]
fn parses_leads_list_with_status() {
    let cli = Cli::try_parse_from(["hunter-cli", "leads", "list", "--status", "contacted"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Leads {
            command: LeadsCommands::List {
                status: Some(PipelineStatus::Contacted),
                limit: 50
            }
        })
    ));
}

#[test]
fn leads_list_rejects_unknown_status() {
    let result = Cli::try_parse_from(["hunter-cli", "leads", "list", "--status", "dealing"]);
    assert!(result.is_err());
}

#[test]
fn parses_leads_set_status() {
    let cli = Cli::try_parse_from(["hunter-cli", "leads", "set-status", "7", "won"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Leads {
            command: LeadsCommands::SetStatus {
                id: 7,
                status: PipelineStatus::Won
            }
        })
    ));
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["hunter-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["hunter-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn lead_source_follows_provider_name() {
    assert_eq!(lead_source("google"), LeadSource::Google);
    assert_eq!(lead_source("nominatim"), LeadSource::Nominatim);
    assert_eq!(lead_source("fake"), LeadSource::Manual);
}

#[test]
fn new_lead_carries_search_fields() {
    let lead = EnrichedLead {
        id: 1,
        place_id: "ChIJ123".to_string(),
        name: "Pajan Auto".to_string(),
        address: Some("Hatanpään valtatie 1, Tampere".to_string()),
        phone: Some("03 123 4567".to_string()),
        website: None,
        maps_url: None,
        categories: vec!["car_repair".to_string()],
        rating: Some(4.6),
        rating_count: Some(31),
        discovery: DiscoveryPhase::GridSearch,
        website_status: WebsiteStatus::NoWebsite,
    };

    let new = new_lead(&lead, LeadSource::Google);
    assert_eq!(new.name, "Pajan Auto");
    assert_eq!(new.place_id, Some("ChIJ123"));
    assert_eq!(new.website_status, Some("NO_WEBSITE"));
    assert_eq!(new.source, LeadSource::Google);
    assert_eq!(new.status, PipelineStatus::New);
    assert!(new.company_name.is_none());
}

#[test]
fn truncate_shortens_long_names() {
    assert_eq!(truncate("Pajan Auto", 30), "Pajan Auto");
    assert_eq!(truncate("Kauneushoitola Helmi ja Kumppanit", 10), "Kauneus...");
}
