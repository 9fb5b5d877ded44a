//! Cross-phase, cross-tile deduplication with a hard result ceiling.

use std::collections::HashMap;

use crate::types::{DiscoveryPhase, RawPlace};

/// A unique place and the phase that first produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPlace {
    pub place: RawPlace,
    pub phase: DiscoveryPhase,
}

/// Counts from one [`UniquePlaceSet::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub inserted: usize,
    /// Already present; only missing fields were filled in.
    pub duplicates: usize,
    /// New, but dropped because the ceiling was reached or the id was blank.
    pub rejected: usize,
}

/// Places keyed by provider id, in first-seen order, never larger than
/// `max_results`. Owned by a single pipeline run.
#[derive(Debug)]
pub struct UniquePlaceSet {
    places: Vec<DiscoveredPlace>,
    index: HashMap<String, usize>,
    max_results: usize,
}

impl UniquePlaceSet {
    #[must_use]
    pub fn new(max_results: usize) -> Self {
        Self {
            places: Vec::new(),
            index: HashMap::new(),
            max_results,
        }
    }

    /// Merge `incoming` under `phase`.
    ///
    /// First write wins: an existing entry keeps its phase and field values,
    /// and only fields it lacks are copied from the duplicate. New ids are
    /// rejected, not evicted, once the ceiling is reached.
    pub fn merge(
        &mut self,
        incoming: impl IntoIterator<Item = RawPlace>,
        phase: DiscoveryPhase,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for place in incoming {
            if place.place_id.trim().is_empty() {
                outcome.rejected += 1;
                continue;
            }
            if let Some(&slot) = self.index.get(&place.place_id) {
                self.places[slot].place.fill_missing_from(&place);
                outcome.duplicates += 1;
                continue;
            }
            if self.is_full() {
                outcome.rejected += 1;
                continue;
            }
            self.index.insert(place.place_id.clone(), self.places.len());
            self.places.push(DiscoveredPlace { place, phase });
            outcome.inserted += 1;
        }
        outcome
    }

    /// `true` once the ceiling is reached; callers stop issuing searches.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.places.len() >= self.max_results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    #[must_use]
    pub fn get(&self, place_id: &str) -> Option<&DiscoveredPlace> {
        self.index.get(place_id).map(|&slot| &self.places[slot])
    }

    #[must_use]
    pub fn into_places(self) -> Vec<DiscoveredPlace> {
        self.places
    }
}
