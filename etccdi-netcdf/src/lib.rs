//! A concrete implementation of the `etccdi::Store` interface for NetCDF files.
//!
//! Input files are expected to follow the CF conventions: a `time` coordinate with `units` and
//! `calendar` attributes, optional coordinate variables for the spatial dimensions, and packed
//! or masked values described by `scale_factor`, `add_offset`, `_FillValue` and
//! `missing_value`.
//!
use std::path::Path;

use ndarray::{Array1, ArrayD, IxDyn};
use netcdf::{AttributeValue, Variable};
use tracing::debug;

use etccdi::{
    text_attr, AttrValue, Attributes, Calendar, Coordinate, Ensemble, Error, Result, Store,
    TimeSeries, TimeUnits, MEMBER_DIM,
};

const TIME_DIM: &str = "time";
const DEFAULT_CALENDAR: &str = "standard";

pub struct NetcdfStore;

impl NetcdfStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NetcdfStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach the offending path to errors coming out of the netcdf library
trait AtPath<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> AtPath<T> for std::result::Result<T, netcdf::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|err| Error::Store(format!("{}: {err}", path.display())))
    }
}

impl Store for NetcdfStore {
    fn read_series(&self, path: &Path, variable: &str) -> Result<TimeSeries> {
        debug!(path = %path.display(), variable, "open");
        let file = netcdf::open(path).at(path)?;
        let var = find_variable(&file, path, variable)?;
        let dims = dimensions(&var);
        if dims.first().map(|(name, _)| name.as_str()) != Some(TIME_DIM) {
            return Err(Error::Store(format!(
                "{}: {variable} has dimensions {dims:?}, expected {TIME_DIM} first",
                path.display()
            )));
        }

        let attrs = read_attributes(&var);
        let data = read_data(&var, &dims, &attrs, path)?;

        let time = find_variable(&file, path, TIME_DIM)?;
        let time_attrs = read_attributes(&time);
        let units: TimeUnits = text_attr(&time_attrs, "units")
            .ok_or_else(|| Error::TimeUnits(format!("{}: time has no units", path.display())))?
            .parse()?;
        let calendar: Calendar = text_attr(&time_attrs, "calendar")
            .unwrap_or(DEFAULT_CALENDAR)
            .parse()?;
        // Masked time steps come out as NaN, which doesn't decode
        let times = unpack(time.get_values::<f64, _>(..).at(path)?, &time_attrs)
            .into_iter()
            .map(|value| units.decode(value, calendar))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| match err {
                Error::TimeUnits(message) => {
                    Error::TimeUnits(format!("{}: {message}", path.display()))
                }
                err => err,
            })?;

        let spatial = dims[1..]
            .iter()
            .map(|(name, len)| read_coordinate(&file, name, *len, path))
            .collect::<Result<Vec<_>>>()?;

        let mut series = TimeSeries::new(variable, times, calendar, spatial, data)?;
        series.attrs = attrs;

        Ok(series)
    }

    fn read_ensemble(&self, path: &Path, variable: &str) -> Result<Ensemble> {
        debug!(path = %path.display(), variable, "open");
        let file = netcdf::open(path).at(path)?;
        let var = find_variable(&file, path, variable)?;
        let dims = dimensions(&var);
        let members = match dims.first() {
            Some((name, len)) if name == MEMBER_DIM => *len,
            _ => {
                return Err(Error::Store(format!(
                    "{}: {variable} has dimensions {dims:?}, expected {MEMBER_DIM} first",
                    path.display()
                )))
            }
        };

        let attrs = read_attributes(&var);
        let data = read_data(&var, &dims, &attrs, path)?;

        let member_var = find_variable(&file, path, MEMBER_DIM)?;
        let labels = (0..members)
            .map(|i| member_var.get_string([i]).at(path))
            .collect::<Result<Vec<_>>>()?;

        let spatial = dims[1..]
            .iter()
            .map(|(name, len)| read_coordinate(&file, name, *len, path))
            .collect::<Result<Vec<_>>>()?;

        let mut ensemble = Ensemble::new(variable, labels, spatial, data)?;
        ensemble.attrs = attrs;

        Ok(ensemble)
    }

    fn write_ensemble(&self, path: &Path, ensemble: &Ensemble, global: &Attributes) -> Result<()> {
        debug!(path = %path.display(), variable = ensemble.name.as_str(), "create");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = netcdf::create(path).at(path)?;
        file.add_dimension(MEMBER_DIM, ensemble.len()).at(path)?;
        for coord in &ensemble.spatial {
            file.add_dimension(&coord.name, coord.len()).at(path)?;
        }

        {
            let mut var = file.add_string_variable(MEMBER_DIM, &[MEMBER_DIM]).at(path)?;
            for (i, member) in ensemble.members.iter().enumerate() {
                var.put_string(member, [i]).at(path)?;
            }
        }

        for coord in &ensemble.spatial {
            let mut var = file
                .add_variable::<f64>(&coord.name, &[coord.name.as_str()])
                .at(path)?;
            let values: Vec<f64> = coord.values.iter().copied().collect();
            var.put_values(&values, ..).at(path)?;
            for (name, value) in &coord.attrs {
                var.put_attribute(name, attribute_value(value)).at(path)?;
            }
        }

        let mut dims = vec![MEMBER_DIM];
        dims.extend(ensemble.spatial.iter().map(|coord| coord.name.as_str()));
        let mut var = file.add_variable::<f64>(&ensemble.name, &dims).at(path)?;
        // Iteration order of an ndarray is logical (row major) order regardless of memory layout
        let values: Vec<f64> = ensemble.data.iter().copied().collect();
        var.put_values(&values, ..).at(path)?;
        for (name, value) in &ensemble.attrs {
            var.put_attribute(name, attribute_value(value)).at(path)?;
        }

        for (name, value) in global {
            file.add_attribute(name, attribute_value(value)).at(path)?;
        }

        Ok(())
    }
}

fn find_variable<'f>(file: &'f netcdf::File, path: &Path, name: &str) -> Result<Variable<'f>> {
    file.variable(name).ok_or_else(|| {
        Error::Store(format!("{}: no variable named {name}", path.display()))
    })
}

fn dimensions(var: &Variable) -> Vec<(String, usize)> {
    var.dimensions()
        .iter()
        .map(|dim| (dim.name(), dim.len()))
        .collect()
}

/// Read all values of `var` as f64, unpacking and masking them according to `attrs`
fn read_data(
    var: &Variable,
    dims: &[(String, usize)],
    attrs: &Attributes,
    path: &Path,
) -> Result<ArrayD<f64>> {
    let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
    let raw = var.get_values::<f64, _>(..).at(path)?;
    let values = unpack(raw, attrs);

    ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|err| Error::Store(format!("{}: {err}", path.display())))
}

/// Apply CF packing and masking attributes. Masked values become NaN.
fn unpack(mut values: Vec<f64>, attrs: &Attributes) -> Vec<f64> {
    let number = |name: &str| attrs.get(name).and_then(AttrValue::as_number);
    let masks: Vec<f64> = [number("_FillValue"), number("missing_value")]
        .into_iter()
        .flatten()
        .collect();
    let scale = number("scale_factor").unwrap_or(1.0);
    let offset = number("add_offset").unwrap_or(0.0);

    for value in values.iter_mut() {
        *value = if masks.contains(value) {
            f64::NAN
        } else {
            *value * scale + offset
        };
    }

    values
}

/// The coordinate variable for dimension `name`, or index positions if the file has none.
fn read_coordinate(file: &netcdf::File, name: &str, len: usize, path: &Path) -> Result<Coordinate> {
    match file.variable(name) {
        Some(var) if var.dimensions().len() == 1 && var.len() == len => {
            let values = var.get_values::<f64, _>(..).at(path)?;
            let mut coord = Coordinate::new(name, Array1::from(values));
            coord.attrs = read_attributes(&var);
            Ok(coord)
        }
        _ => Ok(Coordinate::new(
            name,
            Array1::from_iter((0..len).map(|i| i as f64)),
        )),
    }
}

fn read_attributes(var: &Variable) -> Attributes {
    var.attributes()
        .filter_map(|attr| {
            let value = attr.value().ok().and_then(from_attribute_value)?;
            Some((attr.name().to_string(), value))
        })
        .collect()
}

fn from_attribute_value(value: AttributeValue) -> Option<AttrValue> {
    let numbers = |values: Vec<f64>| Some(AttrValue::Numbers(values));
    match value {
        AttributeValue::Str(text) => Some(AttrValue::Text(text)),
        AttributeValue::Strs(texts) => Some(AttrValue::Text(texts.join("\n"))),
        AttributeValue::Double(x) => numbers(vec![x]),
        AttributeValue::Doubles(xs) => numbers(xs),
        AttributeValue::Float(x) => numbers(vec![x.into()]),
        AttributeValue::Floats(xs) => numbers(xs.into_iter().map(f64::from).collect()),
        AttributeValue::Int(x) => numbers(vec![x.into()]),
        AttributeValue::Ints(xs) => numbers(xs.into_iter().map(f64::from).collect()),
        AttributeValue::Short(x) => numbers(vec![x.into()]),
        AttributeValue::Shorts(xs) => numbers(xs.into_iter().map(f64::from).collect()),
        AttributeValue::Schar(x) => numbers(vec![x.into()]),
        AttributeValue::Uchar(x) => numbers(vec![x.into()]),
        AttributeValue::Longlong(x) => numbers(vec![x as f64]),
        _ => None,
    }
}

fn attribute_value(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Text(text) => AttributeValue::Str(text.clone()),
        AttrValue::Numbers(numbers) if numbers.len() == 1 => AttributeValue::Double(numbers[0]),
        AttrValue::Numbers(numbers) => AttributeValue::Doubles(numbers.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etccdi::{Date, Index};
    use ndarray::array;
    use std::error::Error as StdError;
    use tempfile::tempdir;

    type TestResult = std::result::Result<(), Box<dyn StdError>>;

    const TIMES: [f64; 3] = [0.0, 31.0, 59.0];
    const TIME_FILL: f64 = 1e20;

    /// Write a small CF style index file with three time steps on a 2x2 grid
    fn write_series(path: &Path, calendar: &str, times: &[f64], values: &[f64]) -> TestResult {
        let mut file = netcdf::create(path)?;
        file.add_dimension("time", 3)?;
        file.add_dimension("lat", 2)?;
        file.add_dimension("lon", 2)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", "days since 1850-01-01 00:00:00")?;
        time.put_attribute("calendar", calendar)?;
        time.put_attribute("_FillValue", TIME_FILL)?;
        time.put_values(times, ..)?;

        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_values(&[-45.0, 45.0], ..)?;

        let mut var = file.add_variable::<f32>("txxETCCDI", &["time", "lat", "lon"])?;
        var.put_attribute("_FillValue", -999.0_f32)?;
        var.put_attribute("units", "K")?;
        var.put_attribute("scale_factor", 0.5_f32)?;
        var.put_attribute("add_offset", 200.0_f32)?;
        let values: Vec<f32> = values.iter().map(|&x| x as f32).collect();
        var.put_values(&values, ..)?;

        Ok(())
    }

    #[test]
    fn test_read_series() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("txx.nc");
        let raw = [
            0.0, 2.0, 4.0, 6.0, //
            8.0, -999.0, 12.0, 14.0, //
            16.0, 18.0, 20.0, 22.0,
        ];
        write_series(&path, "365_day", &TIMES, &raw)?;

        let series = NetcdfStore::new().read_series(&path, "txxETCCDI")?;
        assert_eq!(series.calendar, Calendar::NoLeap);
        assert_eq!(
            series.times,
            vec![Date::new(1850, 1, 1), Date::new(1850, 2, 1), Date::new(1850, 3, 1)]
        );
        assert_eq!(series.data.shape(), &[3, 2, 2]);
        assert_eq!(series.data[[0, 0, 0]], 200.0);
        assert_eq!(series.data[[2, 1, 1]], 211.0);
        assert!(series.data[[1, 0, 1]].is_nan());

        assert_eq!(series.spatial[0].name, "lat");
        assert_eq!(series.spatial[0].values, array![-45.0, 45.0]);
        assert_eq!(text_attr(&series.spatial[0].attrs, "units"), Some("degrees_north"));
        // No coordinate variable for lon
        assert_eq!(series.spatial[1].values, array![0.0, 1.0]);
        assert_eq!(text_attr(&series.attrs, "units"), Some("K"));

        Ok(())
    }

    #[test]
    fn test_read_series_missing_variable() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("txx.nc");
        write_series(&path, "standard", &TIMES, &[0.0; 12])?;

        let result = NetcdfStore::new().read_series(&path, "tnnETCCDI");
        assert!(matches!(result, Err(Error::Store(message)) if message.contains("tnnETCCDI")));

        let result = NetcdfStore::new().read_series(&path, "lat");
        assert!(matches!(result, Err(Error::Store(message)) if message.contains("time first")));

        Ok(())
    }

    #[test]
    fn test_read_series_bad_calendar() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("txx.nc");
        write_series(&path, "martian", &TIMES, &[0.0; 12])?;

        let result = NetcdfStore::new().read_series(&path, "txxETCCDI");
        assert!(matches!(result, Err(Error::TimeUnits(_))));

        Ok(())
    }

    #[test]
    fn test_read_series_bad_times() -> TestResult {
        let dir = tempdir()?;
        let store = NetcdfStore::new();

        let path = dir.path().join("masked.nc");
        write_series(&path, "standard", &[0.0, TIME_FILL, 59.0], &[0.0; 12])?;
        let result = store.read_series(&path, "txxETCCDI");
        assert!(matches!(result, Err(Error::TimeUnits(message)) if message.contains("masked.nc")));

        // Unmasked default fill value for doubles
        let path = dir.path().join("unmasked.nc");
        write_series(&path, "noleap", &[0.0, 31.0, 9.969209968386869e36], &[0.0; 12])?;
        let result = store.read_series(&path, "txxETCCDI");
        assert!(matches!(result, Err(Error::TimeUnits(_))));

        Ok(())
    }

    #[test]
    fn test_ensemble_file() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("txx_1995-2014.nc");

        let mut lat = Coordinate::new("lat", array![-45.0, 45.0]);
        lat.attrs.insert("units".into(), "degrees_north".into());
        let ensemble = Ensemble::new(
            "txx",
            vec!["r1i1p1".to_string(), "r10i1p1".to_string()],
            vec![lat],
            array![[1.0, f64::NAN], [3.0, 4.0]].into_dyn(),
        )?
        .with_metadata(Index::Txx);
        let mut global = Attributes::new();
        global.insert("period".into(), "1995-2014".into());

        let store = NetcdfStore::new();
        store.write_ensemble(&path, &ensemble, &global)?;
        assert!(store.exists(&path));

        let loaded = store.read_ensemble(&path, "txx")?;
        assert_eq!(loaded.members, ensemble.members);
        assert_eq!(loaded.spatial, ensemble.spatial);
        assert_eq!(loaded.data[[0, 0]], 1.0);
        assert!(loaded.data[[0, 1]].is_nan());
        assert_eq!(loaded.data[[1, 1]], 4.0);
        assert_eq!(loaded.units(), Some("°C"));
        assert_eq!(text_attr(&loaded.attrs, "long_name"), Some("TXx"));

        let file = netcdf::open(&path)?;
        let period = file.attribute("period").map(|attr| attr.value());
        assert!(matches!(period, Some(Ok(AttributeValue::Str(text))) if text == "1995-2014"));

        Ok(())
    }

    #[test]
    fn test_unpack() {
        let mut attrs = Attributes::new();
        attrs.insert("missing_value".into(), 1e20.into());
        attrs.insert("scale_factor".into(), 10.0.into());
        let values = unpack(vec![1.0, 1e20, 2.5], &attrs);
        assert_eq!(values[0], 10.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 25.0);
    }
}
