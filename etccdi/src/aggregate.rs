//! Temporal reduction of index time series to a single period mean.
//!
//! Index files come at mixed frequencies: some indices are annual already, others are monthly
//! and must first be reduced to annual values in a way that depends on the index (monthly
//! maxima become annual maxima, monthly counts become annual counts, and so on). The annual
//! values are then averaged over the analysis period.
//!
//! Missing values (NaN) are skipped. A reduction over nothing but missing values is missing.
//!
use std::collections::BTreeMap;
use std::fmt::Debug;

use ndarray::{stack, ArrayD, ArrayView1, ArrayViewD, Axis};
use num_traits::Float;

use crate::{
    errors::{Error, Result},
    field::{Field, TimeSeries},
    index::{Aggregation, Index},
};

/// Reduce a sequence of values, skipping NaN
pub fn reduce<F>(values: ArrayView1<F>, aggregation: Aggregation) -> F
where
    F: Float + Debug,
{
    let mut present = values.iter().copied().filter(|value| !value.is_nan()).peekable();
    if present.peek().is_none() {
        return F::nan();
    }

    match aggregation {
        Aggregation::Sum => present.fold(F::zero(), |sum, value| sum + value),
        Aggregation::Max => present.fold(F::neg_infinity(), F::max),
        Aggregation::Min => present.fold(F::infinity(), F::min),
        Aggregation::Mean | Aggregation::Identity => {
            let (sum, count) = present.fold((F::zero(), 0_usize), |(sum, count), value| {
                (sum + value, count + 1)
            });
            sum / F::from(count).unwrap_or_else(F::nan)
        }
    }
}

/// Reduce `data` along `axis`, skipping NaN
pub fn reduce_axis<F>(data: ArrayViewD<F>, axis: Axis, aggregation: Aggregation) -> ArrayD<F>
where
    F: Float + Debug,
{
    data.map_axis(axis, |lane| reduce(lane, aggregation))
}

/// Annual values of a series, one row per year in ascending order
///
#[derive(Debug)]
pub struct Annual {
    pub years: Vec<i32>,
    pub data: ArrayD<f64>,
}

/// Reduce each calendar year of `series` to a single value.
///
/// With `Aggregation::Identity` the series is taken to be annual already, and each time step
/// is kept as is, labeled with its year.
///
pub fn annual_values(series: &TimeSeries, aggregation: Aggregation) -> Result<Annual> {
    if aggregation == Aggregation::Identity {
        return Ok(Annual {
            years: series.times.iter().map(|date| date.year).collect(),
            data: series.data.clone(),
        });
    }

    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, date) in series.times.iter().enumerate() {
        groups.entry(date.year).or_default().push(i);
    }

    let reduced: Vec<ArrayD<f64>> = groups
        .values()
        .map(|indices| {
            let group = series.data.select(Axis(0), indices);
            reduce_axis(group.view(), Axis(0), aggregation)
        })
        .collect();
    let views: Vec<ArrayViewD<f64>> = reduced.iter().map(|array| array.view()).collect();
    let data = stack(Axis(0), &views).map_err(|err| Error::GridMismatch(err.to_string()))?;

    Ok(Annual {
        years: groups.into_keys().collect(),
        data,
    })
}

/// Keep the time steps falling in the years `start` through `end`, inclusive.
///
pub fn select_years(series: &TimeSeries, start: i32, end: i32) -> Result<TimeSeries> {
    let indices: Vec<usize> = series
        .times
        .iter()
        .enumerate()
        .filter(|(_, date)| start <= date.year && date.year <= end)
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        return Err(Error::EmptyPeriod { start, end });
    }

    Ok(series.select(&indices))
}

/// Reduce a member's series to the mean over all years it covers, using the reduction
/// appropriate for `index`.
///
pub fn aggregate_period(series: &TimeSeries, index: Index) -> Result<Field> {
    if series.is_empty() {
        return Err(Error::EmptyPeriod {
            start: i32::MIN,
            end: i32::MAX,
        });
    }

    let annual = annual_values(series, index.aggregation())?;
    let data = reduce_axis(annual.data.view(), Axis(0), Aggregation::Mean);
    let mut field = Field::new(series.name.clone(), series.spatial.clone(), data)?;
    field.attrs = series.attrs.clone();

    Ok(field)
}
