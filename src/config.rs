use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::process::ListingColumns;

/// File names written under `out_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputFiles {
    pub real_jobs: String,
    pub real_jobs_sponsored: String,
    pub recent_real_jobs: String,
    pub recent_real_jobs_sponsored: String,
    /// Recent rows from high-frequency employers. Not written unless set.
    pub recent_noise_jobs: Option<String>,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            real_jobs: "real_jobs_with_counts.csv".into(),
            real_jobs_sponsored: "real_jobs_with_h1b.csv".into(),
            recent_real_jobs: "recent_real_jobs_with_counts.csv".into(),
            recent_real_jobs_sponsored: "recent_real_jobs_with_h1b.csv".into(),
            recent_noise_jobs: None,
        }
    }
}

/// Run configuration. Every key is optional in the YAML file; the defaults
/// reproduce the fixed paths and columns of a bare run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listings_path: PathBuf,
    pub notable_path: PathBuf,
    pub sponsors_path: PathBuf,
    pub out_dir: PathBuf,
    pub outputs: OutputFiles,

    pub employer_column: usize,
    pub datetime_column: usize,
    /// Name column of the notable-companies table
    /// (`rownames,rank,name,country,...`).
    pub notable_name_column: usize,
    /// Employer column of the sponsor table (`fiscal_year,employer,...`).
    pub sponsor_employer_column: usize,

    /// Employers with at most this many listings count as real.
    pub frequency_threshold: usize,
    /// Width of the recency window, in hours back from the run clock.
    pub window_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        let columns = ListingColumns::default();
        Self {
            listings_path: "output.csv".into(),
            notable_path: "filter_files/forbes2000.csv".into(),
            sponsors_path: "filter_files/2023.csv".into(),
            out_dir: ".".into(),
            outputs: OutputFiles::default(),
            employer_column: columns.employer,
            datetime_column: columns.posted_at,
            notable_name_column: 2,
            sponsor_employer_column: 1,
            frequency_threshold: 5,
            window_hours: 24,
        }
    }
}

impl Config {
    /// Read a YAML config file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_reader(f)
            .with_context(|| format!("Failed to parse config YAML: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.employer_column != self.datetime_column,
            "employer_column and datetime_column are both {}",
            self.employer_column
        );
        ensure!(self.window_hours > 0, "window_hours must be positive");

        let outs = &self.outputs;
        let mut names = vec![
            &outs.real_jobs,
            &outs.real_jobs_sponsored,
            &outs.recent_real_jobs,
            &outs.recent_real_jobs_sponsored,
        ];
        names.extend(outs.recent_noise_jobs.as_ref());
        for (i, name) in names.iter().enumerate() {
            ensure!(!name.trim().is_empty(), "output file names must not be empty");
            ensure!(
                !names[..i].contains(name),
                "output file {:?} is configured twice",
                name
            );
        }
        Ok(())
    }

    pub fn listing_columns(&self) -> ListingColumns {
        ListingColumns {
            employer: self.employer_column,
            posted_at: self.datetime_column,
        }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let config = Config::default();
        config.validate()?;
        assert_eq!(config.frequency_threshold, 5);
        assert_eq!(config.window_hours, 24);
        assert_eq!(
            config.output_path(&config.outputs.real_jobs),
            PathBuf::from("./real_jobs_with_counts.csv")
        );
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "frequency_threshold: 3")?;
        writeln!(tmp, "out_dir: results")?;
        writeln!(tmp, "outputs:")?;
        writeln!(tmp, "  recent_noise_jobs: noise.csv")?;

        let config = Config::load(tmp.path())?;
        assert_eq!(config.frequency_threshold, 3);
        assert_eq!(config.out_dir, PathBuf::from("results"));
        assert_eq!(config.outputs.recent_noise_jobs.as_deref(), Some("noise.csv"));
        assert_eq!(config.outputs.real_jobs, "real_jobs_with_counts.csv");
        assert_eq!(config.window_hours, 24);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "threshold: 3")?;
        assert!(Config::load(tmp.path()).is_err());
        Ok(())
    }

    #[test]
    fn same_column_twice_is_invalid() {
        let config = Config {
            datetime_column: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_output_names_are_invalid() {
        let mut config = Config::default();
        config.outputs.recent_noise_jobs = Some(config.outputs.real_jobs.clone());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("configured twice"), "{err}");
    }
}
