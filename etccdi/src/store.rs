use std::path::{Path, PathBuf};

use glob::glob;

use crate::{
    ensemble::Ensemble,
    errors::{Error, Result},
    field::{Attributes, TimeSeries},
};

/// A trait for reading and writing labeled arrays from some kind of array file store.
///
pub trait Store {
    /// Read `variable` from the file at `path` as a time series. The variable must have a
    /// `time` dimension, which becomes axis 0.
    ///
    fn read_series(&self, path: &Path, variable: &str) -> Result<TimeSeries>;

    /// Read `variable` from the file at `path` as an ensemble. The variable must have a
    /// `member` dimension, which becomes axis 0.
    ///
    fn read_ensemble(&self, path: &Path, variable: &str) -> Result<Ensemble>;

    /// Write `ensemble` to a new file at `path`, replacing any existing file. `global` is
    /// written as file level attributes.
    ///
    fn write_ensemble(&self, path: &Path, ensemble: &Ensemble, global: &Attributes) -> Result<()>;

    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Paths matching the glob `pattern`, in no particular order
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob(pattern).map_err(|err| Error::Config(format!("{pattern}: {err}")))?;
        let mut found = vec![];
        for path in paths {
            found.push(path.map_err(|err| err.into_error())?);
        }

        Ok(found)
    }
}
