use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

use crate::matcher::LooseMatcher;
use crate::process::utils::non_empty;

/// A read-only list of employer names taken from one column of a
/// headerless CSV (the notable-companies table or the H1B sponsor table).
#[derive(Debug, Clone, Default)]
pub struct ReferenceList {
    pub label: String,
    pub names: Vec<String>,
}

impl ReferenceList {
    /// Load the names in `column` of the CSV at `path`.
    #[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P, column: usize, label: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open {} file: {}", label, path.display()))?;
        let list = Self::from_reader(file, column, label)
            .with_context(|| format!("Failed to read {} file: {}", label, path.display()))?;
        if list.names.is_empty() {
            warn!(label, "reference list is empty; nothing will match it");
        }
        info!(label, names = list.names.len(), "loaded reference list");
        Ok(list)
    }

    /// Rows too short to reach `column`, and empty cells, are skipped.
    pub fn from_reader<R: Read>(reader: R, column: usize, label: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut names = Vec::new();
        let mut skipped = 0usize;
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
            match record.get(column).and_then(non_empty) {
                Some(name) => names.push(name.to_string()),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(label, skipped, "skipped rows without a name");
        }

        Ok(Self {
            label: label.to_string(),
            names,
        })
    }

    pub fn matcher(&self) -> LooseMatcher {
        LooseMatcher::new(&self.names)
    }
}
