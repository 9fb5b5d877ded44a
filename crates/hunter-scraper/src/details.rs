//! Detail enrichment for discovered places.

use std::sync::Arc;

use crate::collector::DiscoveredPlace;
use crate::provider::PlaceDetailsProvider;
use crate::types::{DiscoveryPhase, PlaceDetails, RawPlace};

/// A discovered place with details applied on top.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPlace {
    pub place: RawPlace,
    pub phase: DiscoveryPhase,
    pub maps_url: Option<String>,
}

pub struct DetailEnricher {
    provider: Arc<dyn PlaceDetailsProvider>,
}

impl DetailEnricher {
    #[must_use]
    pub fn new(provider: Arc<dyn PlaceDetailsProvider>) -> Self {
        Self { provider }
    }

    /// Fetch details for `place_id`. Failures log and return empty details.
    pub async fn enrich(&self, place_id: &str) -> PlaceDetails {
        match self.provider.place_details(place_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(place_id, error = %e, "details lookup failed; keeping discovery fields");
                PlaceDetails::default()
            }
        }
    }

    /// Fetch and apply details to one discovered place.
    pub async fn enrich_place(&self, discovered: DiscoveredPlace) -> EnrichedPlace {
        let details = self.enrich(&discovered.place.place_id).await;
        apply_details(discovered, details)
    }
}

/// Overlay `details` on the discovery record.
///
/// Details are the authoritative field source; discovery values survive
/// only where details have nothing. Identity and phase never change.
#[must_use]
pub fn apply_details(discovered: DiscoveredPlace, details: PlaceDetails) -> EnrichedPlace {
    let DiscoveredPlace { place: base, phase } = discovered;
    let place = RawPlace {
        name: details
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(base.name),
        address: details.formatted_address.or(base.address),
        phone: details.phone.or(base.phone),
        website: details.website.or(base.website),
        types: details
            .types
            .filter(|t| !t.is_empty())
            .unwrap_or(base.types),
        rating: details.rating.or(base.rating),
        rating_count: details.rating_count.or(base.rating_count),
        place_id: base.place_id,
        location: base.location,
    };
    EnrichedPlace {
        place,
        phase,
        maps_url: details.url,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::ScraperError;

    struct FailingDetails;

    #[async_trait]
    impl PlaceDetailsProvider for FailingDetails {
        async fn place_details(&self, _place_id: &str) -> Result<PlaceDetails, ScraperError> {
            Err(ScraperError::Provider {
                status: "OVER_QUERY_LIMIT".to_string(),
                message: "quota".to_string(),
            })
        }
    }

    fn discovered() -> DiscoveredPlace {
        DiscoveredPlace {
            place: RawPlace {
                place_id: "p1".to_string(),
                name: "Pajan Auto".to_string(),
                address: Some("Hatanpää, Tampere".to_string()),
                types: vec!["car_repair".to_string()],
                rating: Some(4.1),
                ..RawPlace::default()
            },
            phase: DiscoveryPhase::GridSearch,
        }
    }

    #[test]
    fn details_override_discovery_fields() {
        let details = PlaceDetails {
            formatted_address: Some("Hatanpään valtatie 1, 33100 Tampere".to_string()),
            phone: Some("03 123 4567".to_string()),
            website: Some("https://pajanauto.fi".to_string()),
            url: Some("https://maps.google.com/?cid=1".to_string()),
            ..PlaceDetails::default()
        };
        let enriched = apply_details(discovered(), details);
        assert_eq!(enriched.place.name, "Pajan Auto");
        assert_eq!(
            enriched.place.address.as_deref(),
            Some("Hatanpään valtatie 1, 33100 Tampere")
        );
        assert_eq!(enriched.place.phone.as_deref(), Some("03 123 4567"));
        assert_eq!(enriched.place.rating, Some(4.1));
        assert_eq!(enriched.place.types, vec!["car_repair"]);
        assert_eq!(enriched.phase, DiscoveryPhase::GridSearch);
        assert_eq!(
            enriched.maps_url.as_deref(),
            Some("https://maps.google.com/?cid=1")
        );
    }

    #[test]
    fn blank_detail_name_keeps_discovery_name() {
        let details = PlaceDetails {
            name: Some("  ".to_string()),
            types: Some(Vec::new()),
            ..PlaceDetails::default()
        };
        let enriched = apply_details(discovered(), details);
        assert_eq!(enriched.place.name, "Pajan Auto");
        assert_eq!(enriched.place.types, vec!["car_repair"]);
    }

    #[tokio::test]
    async fn failed_lookup_degrades_to_discovery_record() {
        let enricher = DetailEnricher::new(Arc::new(FailingDetails));
        let enriched = enricher.enrich_place(discovered()).await;
        assert_eq!(enriched.place, discovered().place);
        assert!(enriched.maps_url.is_none());
    }
}
