//! In-memory store and fixture builders for tests.
//!
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use glob::Pattern;
use ndarray::{Array1, Array2};
use parking_lot::Mutex;

use crate::{
    ensemble::Ensemble,
    errors::{Error, Result},
    field::{Attributes, Coordinate, TimeSeries},
    store::Store,
    time::{Calendar, Date},
};

/// A test implementation of Store that keeps everything in RAM
///
#[derive(Default)]
pub struct MemoryStore {
    series: Mutex<BTreeMap<PathBuf, TimeSeries>>,
    ensembles: Mutex<BTreeMap<PathBuf, (Ensemble, Attributes)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a series in the store as if it were a file at `path`
    pub fn insert_series<P: Into<PathBuf>>(&self, path: P, series: TimeSeries) {
        self.series.lock().insert(path.into(), series);
    }

    /// Place an ensemble in the store as if it were a file at `path`
    pub fn insert_ensemble<P: Into<PathBuf>>(&self, path: P, ensemble: Ensemble) {
        self.ensembles
            .lock()
            .insert(path.into(), (ensemble, Attributes::new()));
    }

    /// Global attributes an ensemble was written with
    pub fn global_attrs(&self, path: &Path) -> Option<Attributes> {
        self.ensembles
            .lock()
            .get(path)
            .map(|(_, global)| global.clone())
    }
}

impl Store for MemoryStore {
    fn read_series(&self, path: &Path, variable: &str) -> Result<TimeSeries> {
        let series = self.series.lock();
        match series.get(path) {
            Some(series) if series.name == variable => Ok(series.clone()),
            Some(_) => Err(Error::Store(format!(
                "{}: no variable named {variable}",
                path.display()
            ))),
            None => Err(Error::Store(format!("{}: no such file", path.display()))),
        }
    }

    fn read_ensemble(&self, path: &Path, variable: &str) -> Result<Ensemble> {
        let ensembles = self.ensembles.lock();
        match ensembles.get(path) {
            Some((ensemble, _)) if ensemble.name == variable => Ok(ensemble.clone()),
            Some(_) => Err(Error::Store(format!(
                "{}: no variable named {variable}",
                path.display()
            ))),
            None => Err(Error::Store(format!("{}: no such file", path.display()))),
        }
    }

    fn write_ensemble(&self, path: &Path, ensemble: &Ensemble, global: &Attributes) -> Result<()> {
        self.ensembles
            .lock()
            .insert(path.to_path_buf(), (ensemble.clone(), global.clone()));

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.series.lock().contains_key(path) || self.ensembles.lock().contains_key(path)
    }

    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern =
            Pattern::new(pattern).map_err(|err| Error::Config(format!("{pattern}: {err}")))?;
        let series = self.series.lock();
        let ensembles = self.ensembles.lock();

        Ok(series
            .keys()
            .chain(ensembles.keys())
            .filter(|path| pattern.matches_path(path))
            .cloned()
            .collect())
    }
}

/// A monthly series over two grid cells, starting in January of `start_year`. Values are
/// computed from the number of months since the start.
///
pub fn monthly_series<F>(start_year: i32, months: usize, values: F) -> TimeSeries
where
    F: Fn(usize) -> [f64; 2],
{
    let calendar = Calendar::ProlepticGregorian;
    let times: Vec<Date> = (0..months)
        .map(|i| Date::new(start_year + (i / 12) as i32, (i % 12) as u32 + 1, 1))
        .collect();
    series_from(times, calendar, values)
}

/// An annual series over two grid cells, one value per year starting at `start_year`.
///
pub fn annual_series<F>(start_year: i32, years: usize, values: F) -> TimeSeries
where
    F: Fn(usize) -> [f64; 2],
{
    let times: Vec<Date> = (0..years)
        .map(|i| Date::new(start_year + i as i32, 7, 1))
        .collect();
    series_from(times, Calendar::NoLeap, values)
}

fn series_from<F>(times: Vec<Date>, calendar: Calendar, values: F) -> TimeSeries
where
    F: Fn(usize) -> [f64; 2],
{
    let rows: Vec<f64> = (0..times.len()).flat_map(values).collect();
    let data = Array2::from_shape_vec((times.len(), 2), rows)
        .expect("two values per time step")
        .into_dyn();
    let spatial = vec![Coordinate::new("cell", Array1::from(vec![0.0, 1.0]))];

    TimeSeries::new("series", times, calendar, spatial, data).expect("consistent fixture")
}
