//! Resolution outcomes and the run report.

use serde::Serialize;

use crate::metrics;

/// Terminal state reached by an entry in the verify/repair pass, or by an
/// entry for which no provider had a trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// The trailer is embeddable and was kept.
    Verified,
    /// The trailer was blocked and a search result replaced it.
    Replaced,
    /// The trailer was blocked and no replacement exists; set to null.
    Removed,
    /// No provider returned a trailer; set to null without searching.
    NotFound,
    /// The stored trailer had no usable video id; set to null.
    Cleared,
}

impl EntryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryOutcome::Verified => "verified",
            EntryOutcome::Replaced => "replaced",
            EntryOutcome::Removed => "removed",
            EntryOutcome::NotFound => "not_found",
            EntryOutcome::Cleared => "cleared",
        }
    }
}

/// A provider call that failed; its entries got nothing from that provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub ids: Vec<u64>,
    pub error: String,
}

/// Summary of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Entries in scope for the run.
    pub processed: usize,
    /// Trailers acquired from the primary provider.
    pub acquired_primary: usize,
    /// Trailers acquired from the secondary provider.
    pub acquired_secondary: usize,
    /// AniList ids filled in from MyAnimeList ids.
    pub anilist_ids_found: usize,
    pub verified: usize,
    pub replaced: usize,
    pub removed: usize,
    pub not_found: usize,
    pub cleared: usize,
    /// Entries holding a trailer when the run ended.
    pub trailers_present: usize,
    pub provider_errors: Vec<ProviderFailure>,
    /// Titles whose blocked trailer had no embeddable replacement.
    pub missing_titles: Vec<String>,
}

impl ResolutionReport {
    /// Count an entry outcome.
    pub fn record(&mut self, outcome: EntryOutcome, title: &str) {
        metrics::RESOLUTION_OUTCOMES
            .with_label_values(&[outcome.as_str()])
            .inc();

        match outcome {
            EntryOutcome::Verified => self.verified += 1,
            EntryOutcome::Replaced => self.replaced += 1,
            EntryOutcome::Removed => {
                self.removed += 1;
                self.missing_titles.push(title.to_string());
            }
            EntryOutcome::NotFound => self.not_found += 1,
            EntryOutcome::Cleared => self.cleared += 1,
        }
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ResolutionReport) {
        self.processed += other.processed;
        self.acquired_primary += other.acquired_primary;
        self.acquired_secondary += other.acquired_secondary;
        self.anilist_ids_found += other.anilist_ids_found;
        self.verified += other.verified;
        self.replaced += other.replaced;
        self.removed += other.removed;
        self.not_found += other.not_found;
        self.cleared += other.cleared;
        self.trailers_present += other.trailers_present;
        self.provider_errors.extend(other.provider_errors);
        self.missing_titles.extend(other.missing_titles);
    }
}
