use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Where input files live, where output goes, and which period is analysed.
///
/// Loaded from a JSON file. Every field is optional and falls back to the default.
///
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the model ensemble indices, laid out as `<index>/<scenario>/*.nc`
    pub model_root: PathBuf,

    /// Directory holding the reanalysis index files, `<index>ETCCDI_*.nc`
    pub reanalysis_root: PathBuf,

    /// Directory aggregated files are written to and loaded from
    pub output_dir: PathBuf,

    /// Experiment the model files belong to
    pub scenario: String,

    pub start_year: i32,
    pub end_year: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_root: PathBuf::from("MPI-GE_ETCCDI_indices"),
            reanalysis_root: PathBuf::from("ERA5/ETCCDI_g025"),
            output_dir: PathBuf::from("data"),
            scenario: "historical".to_string(),
            start_year: 1995,
            end_year: 2014,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(Error::Config(format!(
                "start year {} is after end year {}",
                self.start_year, self.end_year
            )));
        }
        if self.scenario.is_empty() {
            return Err(Error::Config("scenario must not be empty".to_string()));
        }

        Ok(())
    }

    /// The analysis period as it appears in file names, e.g. "1995-2014"
    pub fn period(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}
