//! Command-line options.

use clap::Parser;
use std::path::PathBuf;

/// Interactive dashboard over a data-science salaries dataset.
///
/// Examples:
///   salary-dashboard
///   salary-dashboard --dataset datasets/ds_salaries.csv
///   salary-dashboard --dataset sample_salaries.parquet --width 1600
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset to load (.csv, .tsv, .parquet or .json)
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "datasets/ds_salaries.csv",
        env = "SALARY_DASHBOARD_DATASET"
    )]
    pub dataset: PathBuf,

    /// Initial window width in points
    #[arg(long, default_value = "1280")]
    pub width: f32,

    /// Initial window height in points
    #[arg(long, default_value = "900")]
    pub height: f32,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject window sizes egui cannot lay out.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width >= 600.0) {
            return Err(format!("--width must be at least 600, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height >= 400.0) {
            return Err(format!("--height must be at least 400, got {}", self.height));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["salary-dashboard"]).unwrap();
        assert_eq!(args.width, 1280.0);
        assert_eq!(args.height, 900.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_dataset_flag() {
        let args = Args::try_parse_from(["salary-dashboard", "--dataset", "other.parquet"]).unwrap();
        assert_eq!(args.dataset, PathBuf::from("other.parquet"));
    }

    #[test]
    fn test_validation_rejects_tiny_window() {
        let args = Args::try_parse_from(["salary-dashboard", "--width", "100"]).unwrap();
        assert!(args.validate().is_err());
    }
}
