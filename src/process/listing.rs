use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

use crate::process::date_parser::{format_timestamp, parse_timestamp};
use crate::process::utils::non_empty;

/// Which columns of the headerless listings file carry the employer name
/// and the posting timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingColumns {
    pub employer: usize,
    pub posted_at: usize,
}

impl Default for ListingColumns {
    fn default() -> Self {
        Self {
            employer: 0,
            posted_at: 5,
        }
    }
}

/// One row of the listings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// 1-based record number in the source file.
    pub line: usize,
    /// Employer name; `None` when the cell is blank or an NA token.
    pub employer: Option<String>,
    /// `None` when the timestamp cell is blank or an NA token.
    pub posted_at: Option<NaiveDateTime>,
    /// The raw row, every column as read.
    pub fields: Vec<String>,
}

impl Listing {
    pub fn employer(&self) -> Option<&str> {
        self.employer.as_deref()
    }

    /// Posted at or after `cutoff`. A listing without a timestamp never is.
    pub fn posted_since(&self, cutoff: NaiveDateTime) -> bool {
        matches!(self.posted_at, Some(t) if t >= cutoff)
    }

    /// Output layout: `count, employer, <remaining columns in source order>`.
    /// The timestamp column is re-rendered from the parsed value; missing
    /// cells are written empty.
    pub fn to_record(&self, count: usize, columns: ListingColumns) -> Vec<String> {
        let mut record = Vec::with_capacity(self.fields.len() + 1);
        record.push(count.to_string());
        record.push(self.employer.clone().unwrap_or_default());
        for (i, field) in self.fields.iter().enumerate() {
            if i == columns.employer {
                continue;
            }
            if i == columns.posted_at {
                record.push(self.posted_at.as_ref().map(format_timestamp).unwrap_or_default());
            } else {
                record.push(non_empty(field).unwrap_or_default().to_string());
            }
        }
        record
    }
}

/// Load the headerless listings CSV at `path`.
#[tracing::instrument(level = "info", skip(path, columns), fields(path = %path.as_ref().display()))]
pub fn load_listings<P: AsRef<Path>>(path: P, columns: ListingColumns) -> Result<Vec<Listing>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open listings file: {}", path.display()))?;
    let listings = read_listings(file, columns, &path.display().to_string())?;
    if listings.is_empty() {
        warn!("listings file is empty");
    }
    info!(rows = listings.len(), "loaded listings");
    Ok(listings)
}

/// Parse listings from any reader. `source` only labels error messages.
pub fn read_listings<R: Read>(
    reader: R,
    columns: ListingColumns,
    source: &str,
) -> Result<Vec<Listing>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut listings = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 1;
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", source, line))?;

        let needed = columns.employer.max(columns.posted_at) + 1;
        if record.len() < needed {
            bail!(
                "{} record {} has {} fields, expected at least {}",
                source,
                line,
                record.len(),
                needed
            );
        }

        let employer = non_empty(&record[columns.employer]).map(str::to_string);
        let posted_at = match non_empty(&record[columns.posted_at]) {
            Some(raw_ts) => match parse_timestamp(raw_ts) {
                Some(ts) => Some(ts),
                None => bail!(
                    "{} record {}: cannot parse timestamp {:?} in column {}",
                    source,
                    line,
                    raw_ts,
                    columns.posted_at
                ),
            },
            None => None,
        };

        if employer.is_none() {
            debug!(line, "listing has no employer");
        }
        if posted_at.is_none() {
            debug!(line, "listing has no timestamp");
        }

        listings.push(Listing {
            line,
            employer,
            posted_at,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(listings)
}
