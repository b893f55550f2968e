//! Loading, aggregating and saving whole ensembles of an index.
//!
use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    aggregate::{aggregate_period, select_years},
    config::Config,
    discover::discover,
    ensemble::Ensemble,
    errors::Result,
    field::Attributes,
    index::Index,
    source::Source,
    store::Store,
    units::convert_quantity,
    validate::{check_missing, correct_calendar},
};

/// What `run` did for one index
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),

    /// The output already existed and overwriting wasn't requested
    Skipped(PathBuf),
}

/// Load every member of `index` from `source`, check and correct it, reduce it to the mean over
/// the configured period, and stack the members into one ensemble.
///
/// Members are stacked in natural file name order. The result carries the catalog metadata for
/// `index`. Temperatures are converted to °C if the input states its units.
///
pub fn load_aggregate(
    store: &dyn Store,
    config: &Config,
    index: Index,
    source: Source,
) -> Result<Ensemble> {
    info!(%index, %source, "load");
    let variable = index.variable_name();
    let files = discover(store, config, index, source)?;

    let mut members = Vec::with_capacity(files.len());
    for (member, path) in files {
        debug!(%index, member = member.as_str(), path = %path.display(), "read");
        let series = store.read_series(&path, &variable)?;
        check_missing(&series, index, source, &member)?;
        let series = correct_calendar(series, index, &member)?;
        let series = select_years(&series, config.start_year, config.end_year)?;
        let field = aggregate_period(&series, index)?;
        members.push((member, field));
    }

    let mut ensemble = Ensemble::stack(index.name(), members)?;
    if ensemble.units().is_some() {
        convert_quantity(&mut ensemble, index.quantity(), true)?;
    }
    let ensemble = ensemble.with_metadata(index);
    info!(%index, %source, members = ensemble.len(), "aggregated");

    Ok(ensemble)
}

/// Where the aggregated ensemble of `index` from `source` is saved
pub fn output_path(config: &Config, index: Index, source: Source) -> PathBuf {
    config
        .output_dir
        .join(source.output_file_name(index, config.start_year, config.end_year))
}

/// File level attributes describing how an aggregated file was made
pub fn global_attributes(config: &Config, source: Source) -> Attributes {
    let mut global = Attributes::new();
    global.insert("source".into(), source.to_string().into());
    global.insert("period".into(), config.period().into());
    if source == Source::Model {
        global.insert("scenario".into(), config.scenario.clone().into());
    }

    global
}

/// Aggregate `index` from `source` and save the result to `output_path`.
///
/// Nothing is done if the output exists already, unless `overwrite` is set.
///
pub fn run(
    store: &dyn Store,
    config: &Config,
    index: Index,
    source: Source,
    overwrite: bool,
) -> Result<Outcome> {
    let path = output_path(config, index, source);
    if !overwrite && store.exists(&path) {
        debug!(%index, path = %path.display(), "output exists, skipping");
        return Ok(Outcome::Skipped(path));
    }

    let ensemble = load_aggregate(store, config, index, source)?;
    store.write_ensemble(&path, &ensemble, &global_attributes(config, source))?;
    info!(%index, path = %path.display(), "saved");

    Ok(Outcome::Written(path))
}

/// Load a previously saved ensemble of `index` from `source`.
///
/// Temperatures are returned in °C if `celsius` is set, else in K. Other indices are returned
/// as saved.
///
pub fn load_data(
    store: &dyn Store,
    config: &Config,
    index: Index,
    source: Source,
    celsius: bool,
) -> Result<Ensemble> {
    let path = output_path(config, index, source);
    let mut ensemble = store.read_ensemble(&path, index.name())?;
    convert_quantity(&mut ensemble, index.quantity(), celsius)?;

    Ok(ensemble)
}
