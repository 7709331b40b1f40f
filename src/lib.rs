//! Separate real job listings from mass-posted noise, then cross-reference
//! them against an H1B sponsor list and a recency window.

pub mod config;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod reference;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::info;

use crate::config::Config;
use crate::pipeline::{run_pipeline, FilterSettings, RunSummary};
use crate::reference::ReferenceList;

/// Load every input named by `config`, run the pipeline with the clock
/// fixed at `now`, and write each output file.
pub fn run(config: &Config, now: NaiveDateTime) -> Result<RunSummary> {
    config.validate()?;
    let columns = config.listing_columns();

    let listings = process::load_listings(&config.listings_path, columns)?;
    let notable = ReferenceList::load(&config.notable_path, config.notable_name_column, "notable")?;
    let sponsors = ReferenceList::load(
        &config.sponsors_path,
        config.sponsor_employer_column,
        "sponsors",
    )?;

    let settings = FilterSettings {
        columns,
        frequency_threshold: config.frequency_threshold,
        window_hours: config.window_hours,
        collect_noise: config.outputs.recent_noise_jobs.is_some(),
    };
    let out = run_pipeline(&listings, &notable, &sponsors, &settings, now);

    let outs = &config.outputs;
    output::write_jobs(config.output_path(&outs.real_jobs), &out.real_jobs, columns)?;
    output::write_jobs(
        config.output_path(&outs.real_jobs_sponsored),
        &out.real_jobs_sponsored,
        columns,
    )?;
    output::write_jobs(
        config.output_path(&outs.recent_real_jobs),
        &out.recent_real_jobs,
        columns,
    )?;
    output::write_jobs(
        config.output_path(&outs.recent_real_jobs_sponsored),
        &out.recent_real_jobs_sponsored,
        columns,
    )?;
    if let Some(name) = &outs.recent_noise_jobs {
        output::write_jobs(config.output_path(name), &out.recent_noise_jobs, columns)?;
    }

    info!(out_dir = %config.out_dir.display(), "all outputs written");
    Ok(out.summary)
}
