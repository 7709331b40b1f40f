//! The listing filter pipeline.
//!
//! Stages, in order:
//! 1. count listings per employer; employers at or under the threshold are real
//! 2. add listings whose employer loosely matches the notable-companies list,
//!    then drop duplicate rows
//! 3. keep real listings whose employer loosely matches the sponsor list
//! 4. keep real listings posted inside the recency window
//! 5. keep recent listings whose employer matches the sponsor list
//!
//! Every stage keeps source order. The clock is passed in, so a run with a
//! fixed `now` is reproducible.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::matcher::LooseMatcher;
use crate::process::{FrequencyTable, Listing, ListingColumns};
use crate::reference::ReferenceList;

/// Knobs the pipeline reads; built from `Config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    pub columns: ListingColumns,
    pub frequency_threshold: usize,
    pub window_hours: u32,
    /// Also collect recent listings from high-frequency employers.
    pub collect_noise: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            columns: ListingColumns::default(),
            frequency_threshold: 5,
            window_hours: 24,
            collect_noise: false,
        }
    }
}

/// A listing kept by the pipeline, with its employer's listing count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealJob {
    pub count: usize,
    pub listing: Listing,
}

impl RealJob {
    pub fn employer(&self) -> Option<&str> {
        self.listing.employer()
    }

    pub fn to_record(&self, columns: ListingColumns) -> Vec<String> {
        self.listing.to_record(self.count, columns)
    }
}

/// Per-stage row counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub listings: usize,
    pub distinct_employers: usize,
    pub low_frequency_rows: usize,
    /// Notable-list matches before de-duplication against the low-frequency rows.
    pub notable_added: usize,
    pub real_jobs: usize,
    pub real_jobs_sponsored: usize,
    pub recent_real_jobs: usize,
    pub recent_real_jobs_sponsored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_noise_jobs: Option<usize>,
    pub frequency_threshold: usize,
    pub window_hours: u32,
    pub now: NaiveDateTime,
    pub cutoff: NaiveDateTime,
}

impl RunSummary {
    /// The count lines printed at the end of a run.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Number of notable companies added: {}", self.notable_added),
            format!(
                "Number of real jobs (including notable companies) that sponsor H1B: {}",
                self.real_jobs_sponsored
            ),
            format!(
                "Number of recent real jobs (last {}h) saved: {}",
                self.window_hours, self.recent_real_jobs
            ),
            format!(
                "Number of H1B sponsored recent real jobs (last {}h) saved: {}",
                self.window_hours, self.recent_real_jobs_sponsored
            ),
        ];
        if let Some(n) = self.recent_noise_jobs {
            lines.push(format!(
                "Number of recent noise jobs (last {}h) saved: {}",
                self.window_hours, n
            ));
        }
        lines
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub real_jobs: Vec<RealJob>,
    pub real_jobs_sponsored: Vec<RealJob>,
    pub recent_real_jobs: Vec<RealJob>,
    pub recent_real_jobs_sponsored: Vec<RealJob>,
    /// Empty unless `FilterSettings::collect_noise` is set.
    pub recent_noise_jobs: Vec<RealJob>,
    pub summary: RunSummary,
}

/// Start of the recency window: `now - window_hours`. Inclusive.
pub fn recency_cutoff(now: NaiveDateTime, window_hours: u32) -> NaiveDateTime {
    now - Duration::hours(i64::from(window_hours))
}

/// Run every stage over already-loaded inputs.
#[tracing::instrument(level = "info", skip_all, fields(listings = listings.len()))]
pub fn run_pipeline(
    listings: &[Listing],
    notable: &ReferenceList,
    sponsors: &ReferenceList,
    settings: &FilterSettings,
    now: NaiveDateTime,
) -> PipelineOutput {
    let freq = FrequencyTable::from_listings(listings);
    debug!(top = ?freq.most_frequent(5), "most frequent employers");

    let tag = |listing: &Listing| RealJob {
        count: freq.count(listing.employer()).unwrap_or(0),
        listing: listing.clone(),
    };

    // 1) low-frequency employers
    let low_frequency: Vec<RealJob> = listings
        .iter()
        .filter(|l| freq.is_low_frequency(l.employer(), settings.frequency_threshold))
        .map(tag)
        .collect();
    info!(
        rows = low_frequency.len(),
        threshold = settings.frequency_threshold,
        "low-frequency employers"
    );

    // 2) notable companies, unioned in
    let notable_matcher = notable.matcher();
    let notable_jobs: Vec<RealJob> = listings
        .iter()
        .filter(|l| notable_matcher.matches(l.employer()))
        .map(tag)
        .collect();
    let notable_added = notable_jobs.len();
    info!(
        list = %notable.label,
        names = notable_matcher.len(),
        rows = notable_added,
        "reference-list matches"
    );

    let low_frequency_rows = low_frequency.len();
    let real_jobs = dedupe(
        low_frequency.into_iter().chain(notable_jobs),
        settings.columns,
    );
    info!(rows = real_jobs.len(), "real jobs after union");

    // 3) sponsors
    let sponsor_matcher = sponsors.matcher();
    let real_jobs_sponsored = keep_sponsored(&real_jobs, &sponsor_matcher);
    info!(
        list = %sponsors.label,
        names = sponsor_matcher.len(),
        rows = real_jobs_sponsored.len(),
        "real jobs with sponsor match"
    );

    // 4) recency
    let cutoff = recency_cutoff(now, settings.window_hours);
    let recent_real_jobs: Vec<RealJob> = real_jobs
        .iter()
        .filter(|j| j.listing.posted_since(cutoff))
        .cloned()
        .collect();
    info!(
        rows = recent_real_jobs.len(),
        window_hours = settings.window_hours,
        %cutoff,
        "recent real jobs"
    );

    // 5) recent sponsors
    let recent_real_jobs_sponsored = keep_sponsored(&recent_real_jobs, &sponsor_matcher);
    info!(
        list = %sponsors.label,
        rows = recent_real_jobs_sponsored.len(),
        "recent real jobs with sponsor match"
    );

    let recent_noise_jobs: Vec<RealJob> = if settings.collect_noise {
        let noise: Vec<RealJob> = listings
            .iter()
            .filter(|l| matches!(freq.count(l.employer()), Some(n) if n > settings.frequency_threshold))
            .filter(|l| l.posted_since(cutoff))
            .map(tag)
            .collect();
        info!(rows = noise.len(), "recent noise jobs");
        noise
    } else {
        Vec::new()
    };

    let summary = RunSummary {
        listings: listings.len(),
        distinct_employers: freq.len(),
        low_frequency_rows,
        notable_added,
        real_jobs: real_jobs.len(),
        real_jobs_sponsored: real_jobs_sponsored.len(),
        recent_real_jobs: recent_real_jobs.len(),
        recent_real_jobs_sponsored: recent_real_jobs_sponsored.len(),
        recent_noise_jobs: settings.collect_noise.then_some(recent_noise_jobs.len()),
        frequency_threshold: settings.frequency_threshold,
        window_hours: settings.window_hours,
        now,
        cutoff,
    };

    PipelineOutput {
        real_jobs,
        real_jobs_sponsored,
        recent_real_jobs,
        recent_real_jobs_sponsored,
        recent_noise_jobs,
        summary,
    }
}

/// Drop rows whose output record repeats an earlier one. First wins.
fn dedupe<I>(jobs: I, columns: ListingColumns) -> Vec<RealJob>
where
    I: IntoIterator<Item = RealJob>,
{
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut out = Vec::new();
    for job in jobs {
        if seen.insert(job.to_record(columns)) {
            out.push(job);
        } else {
            debug!(line = job.listing.line, "dropping duplicate row");
        }
    }
    out
}

fn keep_sponsored(jobs: &[RealJob], sponsors: &LooseMatcher) -> Vec<RealJob> {
    jobs.iter()
        .filter(|j| sponsors.matches(j.employer()))
        .cloned()
        .collect()
}
