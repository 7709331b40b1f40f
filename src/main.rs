use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use jobsieve::{config::Config, output, process::date_parser::parse_timestamp};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Split job listings into real postings and mass-posted noise, then check H1B sponsors and recency"
)]
struct Args {
    /// YAML config file; every key is optional
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    listings: Option<PathBuf>,
    #[arg(long)]
    notable: Option<PathBuf>,
    #[arg(long)]
    sponsors: Option<PathBuf>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Employers with at most this many listings count as real
    #[arg(long)]
    threshold: Option<usize>,
    /// Recency window in hours
    #[arg(long)]
    window_hours: Option<u32>,
    /// Fixed run clock (local time), e.g. "2024-06-10 12:00:00"
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,
    /// Also write a JSON run summary here
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).ok_or_else(|| format!("unrecognised timestamp: {s}"))
}

impl Args {
    fn into_config(self) -> Result<(Config, Option<NaiveDateTime>, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(p) = self.listings {
            config.listings_path = p;
        }
        if let Some(p) = self.notable {
            config.notable_path = p;
        }
        if let Some(p) = self.sponsors {
            config.sponsors_path = p;
        }
        if let Some(p) = self.out_dir {
            config.out_dir = p;
        }
        if let Some(n) = self.threshold {
            config.frequency_threshold = n;
        }
        if let Some(h) = self.window_hours {
            config.window_hours = h;
        }
        Ok((config, self.now, self.summary))
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let (config, now, summary_path) = Args::parse().into_config()?;
    let now = now.unwrap_or_else(|| Local::now().naive_local());
    info!(%now, listings = %config.listings_path.display(), "startup");

    let summary = jobsieve::run(&config, now).context("filter run failed")?;

    for line in summary.report_lines() {
        println!("{line}");
    }

    if let Some(path) = summary_path {
        output::write_summary(&path, &summary)?;
        info!(path = %path.display(), "wrote run summary");
    }

    info!("all done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn no_flags_means_default_config() -> Result<()> {
        let (config, now, summary) = Args::try_parse_from(["jobsieve"])?.into_config()?;
        assert_eq!(config, Config::default());
        assert_eq!(now, None);
        assert_eq!(summary, None);
        Ok(())
    }

    #[test]
    fn flags_override_the_config_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "frequency_threshold: 3")?;
        writeln!(tmp, "window_hours: 12")?;
        writeln!(tmp, "out_dir: from_file")?;
        let path = tmp.path().to_string_lossy().to_string();

        let args = Args::try_parse_from([
            "jobsieve",
            "--config",
            path.as_str(),
            "--threshold",
            "7",
            "--listings",
            "scraped.csv",
            "--now",
            "2024-06-10 12:00:00",
            "--summary",
            "summary.json",
        ])?;
        let (config, now, summary) = args.into_config()?;

        // flag wins over the file
        assert_eq!(config.frequency_threshold, 7);
        assert_eq!(config.listings_path, PathBuf::from("scraped.csv"));
        // file wins over the default when no flag is given
        assert_eq!(config.window_hours, 12);
        assert_eq!(config.out_dir, PathBuf::from("from_file"));
        // untouched keys keep their defaults
        assert_eq!(config.sponsors_path, Config::default().sponsors_path);

        assert_eq!(now, parse_timestamp("2024-06-10 12:00:00"));
        assert_eq!(summary, Some(PathBuf::from("summary.json")));
        Ok(())
    }

    #[test]
    fn bad_now_is_rejected() {
        assert!(Args::try_parse_from(["jobsieve", "--now", "soon"]).is_err());
    }
}
