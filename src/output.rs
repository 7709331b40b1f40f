use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use crate::pipeline::RealJob;
use crate::process::ListingColumns;

fn create_truncated(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("creating output file {}", path.display()))
}

/// Write `jobs` as headerless CSV, replacing whatever was at `path`.
/// Returns the number of rows written.
pub fn write_jobs<P: AsRef<Path>>(
    path: P,
    jobs: &[RealJob],
    columns: ListingColumns,
) -> Result<usize> {
    let path = path.as_ref();
    let file = create_truncated(path)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(BufWriter::new(file));

    for job in jobs {
        wtr.write_record(job.to_record(columns))
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    info!(path = %path.display(), rows = jobs.len(), "wrote output");
    Ok(jobs.len())
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_summary<P: AsRef<Path>, T: Serialize>(path: P, summary: &T) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(create_truncated(path)?);
    serde_json::to_writer_pretty(&mut out, summary)
        .with_context(|| format!("serializing summary to {}", path.display()))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::read_listings;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn jobs() -> Result<Vec<RealJob>> {
        let rows = read_listings(
            Cursor::new("\"Big, Co\",Analyst,SF,ft,url,2024-05-03T11:15:00\nAcme,Dev,NY,ft,url,2024-05-04 08:00\n"),
            ListingColumns::default(),
            "sample",
        )?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, listing)| RealJob {
                count: i + 1,
                listing,
            })
            .collect())
    }

    #[test]
    fn writes_headerless_csv_with_quoting() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("real.csv");
        let n = write_jobs(&path, &jobs()?, ListingColumns::default())?;
        assert_eq!(n, 2);
        assert_eq!(
            fs::read_to_string(&path)?,
            "1,\"Big, Co\",Analyst,SF,ft,url,2024-05-03 11:15:00\n\
             2,Acme,Dev,NY,ft,url,2024-05-04 08:00:00\n"
        );
        Ok(())
    }

    #[test]
    fn overwrites_previous_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("real.csv");
        fs::write(&path, "stale\nstale\nstale\n")?;
        write_jobs(&path, &[], ListingColumns::default())?;
        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn summary_is_pretty_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("summary.json");
        write_summary(&path, &serde_json::json!({ "real_jobs": 3 }))?;
        let text = fs::read_to_string(&path)?;
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["real_jobs"], 3);
        Ok(())
    }
}
