use std::fmt;
use std::str::FromStr;

use crate::{
    errors::{Error, Result},
    index::Index,
};

/// Where an ensemble of index files comes from
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// Members of a climate model ensemble
    Model,

    /// The ERA5 reanalysis, used as reference
    Reanalysis,
}

impl Source {
    /// Indices for which missing values are expected in the input, e.g. dry or wet spell
    /// lengths in grid cells where no spell ever ends. Reanalysis files must be complete.
    pub fn allows_missing(&self, index: Index) -> bool {
        match self {
            Source::Model => matches!(index, Index::Cwd | Index::Cdd | Index::Gsl | Index::Sdii),
            Source::Reanalysis => false,
        }
    }

    /// Name of the aggregated output file for `index` over the years `start` to `end`
    pub fn output_file_name(&self, index: Index, start: i32, end: i32) -> String {
        match self {
            Source::Model => format!("{index}_{start}-{end}.nc"),
            Source::Reanalysis => format!("{index}_{start}-{end}_era5.nc"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Model => f.write_str("model"),
            Source::Reanalysis => f.write_str("reanalysis"),
        }
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "model" => Ok(Source::Model),
            "reanalysis" | "era5" => Ok(Source::Reanalysis),
            _ => Err(Error::Config(format!("unknown source: {s}"))),
        }
    }
}
